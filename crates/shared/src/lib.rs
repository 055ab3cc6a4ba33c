pub mod domain;
pub mod error;
pub mod notify;
pub mod protocol;
