//! The sponsor directory: list controller, add/delete flows and card views.
//!
//! Every flow takes its collaborators explicitly: an [`AuthContext`] for the
//! current session, a [`Notifier`](shared::notify::Notifier) for toasts and the
//! [`SponsorListController`] that owns the cached list and its store.

mod add_form;
mod auth;
mod card;
mod controller;
mod delete_flow;
mod error;
mod fallback;
mod inflight;
mod page;

pub use add_form::{AddSponsorDialog, SponsorDraft, SponsorField, ValidSponsor};
pub use auth::AuthContext;
pub use card::{CardImage, DeleteTrigger, OutboundLink, SponsorCard, SponsorCardView};
pub use controller::{ListSource, SponsorListController, SponsorListSnapshot};
pub use delete_flow::DeleteConfirmation;
pub use error::DirectoryError;
pub use fallback::default_sponsors;
pub use inflight::{Action, InFlight, InFlightGuard};
pub use page::SponsorsPageView;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
