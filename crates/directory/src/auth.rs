use shared::domain::Session;

use crate::DirectoryError;

/// Who is looking at the page. Admin context is simply "a session exists".
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    session: Option<Session>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn signed_in(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn require_session(&self) -> Result<&Session, DirectoryError> {
        self.session.as_ref().ok_or(DirectoryError::Unauthorized)
    }
}

impl From<Option<Session>> for AuthContext {
    fn from(session: Option<Session>) -> Self {
        Self { session }
    }
}
