use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(SponsorId);
id_newtype!(UserId);

/// A sponsor listing as presented on the sponsors page.
///
/// `id` is absent for records that were never persisted (the built-in
/// fallback set); only records with an id can be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SponsorId>,
    pub title: String,
    pub image: String,
    pub location: String,
    pub maplink: String,
    pub text: String,
    pub websitelink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A validated row ready for insertion, tagged with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSponsor {
    pub title: String,
    pub image: String,
    pub location: String,
    pub maplink: String,
    pub text: String,
    pub websitelink: String,
    pub user_id: UserId,
}

/// An authenticated admin session handed out by the auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<String>,
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
