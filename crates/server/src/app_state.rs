use std::sync::Arc;

use axum::http::HeaderMap;
use contact::EmailDelivery;
use directory::{AuthContext, InFlight, SponsorListController};

use crate::session::SessionVerifier;

pub(crate) struct AppState {
    pub(crate) controller: Arc<SponsorListController>,
    pub(crate) mailer: Arc<dyn EmailDelivery>,
    pub(crate) sessions: SessionVerifier,
    pub(crate) inflight: InFlight,
}

impl AppState {
    pub(crate) fn auth(&self, headers: &HeaderMap) -> AuthContext {
        AuthContext::from(self.sessions.from_headers(headers))
    }
}
