use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use contact::{send_contact, ContactError, ContactForm};
use directory::{
    Action, AddSponsorDialog, AuthContext, DeleteConfirmation, DirectoryError, InFlightGuard,
    ListSource, SponsorDraft, SponsorListSnapshot, SponsorsPageView,
};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Sponsor, SponsorId},
    error::{ApiError, ErrorCode},
    notify::NotificationLog,
    protocol::{DeleteDecision, DeletePrompt, FieldError, Notification},
};
use tracing::{info, warn};

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PageResponse {
    pub(crate) page: SponsorsPageView,
    pub(crate) notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct NotificationsResponse {
    pub(crate) notifications: Vec<Notification>,
}

/// Error body. `draft` echoes the submitted form so the caller can keep it.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ErrorResponse<D> {
    pub(crate) error: ApiError,
    pub(crate) notifications: Vec<Notification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) field_errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) draft: Option<D>,
}

pub(crate) type HttpError<D = ()> = (StatusCode, Json<ErrorResponse<D>>);

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Upstream => StatusCode::BAD_GATEWAY,
    }
}

fn http_error<D>(error: ApiError, log: &NotificationLog) -> HttpError<D> {
    (
        status_for(error.code),
        Json(ErrorResponse {
            error,
            notifications: log.drain(),
            field_errors: Vec::new(),
            draft: None,
        }),
    )
}

fn directory_error<D>(err: &DirectoryError, log: &NotificationLog, draft: Option<D>) -> HttpError<D> {
    let (status, Json(mut body)) = http_error(ApiError::from(err), log);
    body.field_errors = err.field_errors().to_vec();
    body.draft = draft;
    (status, Json(body))
}

fn page(snapshot: &SponsorListSnapshot, auth: &AuthContext, log: &NotificationLog) -> PageResponse {
    PageResponse {
        page: SponsorsPageView::build(snapshot, auth),
        notifications: log.drain(),
    }
}

/// Reserves the (user, action) slot for signed-in callers. Anonymous
/// callers pass through and are turned away by the flow itself.
fn begin<D>(
    state: &AppState,
    auth: &AuthContext,
    action: Action,
    log: &NotificationLog,
) -> Result<Option<InFlightGuard>, HttpError<D>> {
    let Some(session) = auth.session() else {
        return Ok(None);
    };
    match state.inflight.try_begin(&session.user_id, action) {
        Some(guard) => Ok(Some(guard)),
        None => {
            warn!(user_id = %session.user_id, ?action, "duplicate request while one is in flight");
            Err(directory_error(&DirectoryError::Busy, log, None))
        }
    }
}

pub(crate) async fn list_sponsors(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<PageResponse> {
    let auth = state.auth(&headers);
    let log = NotificationLog::new();
    let snapshot = state.controller.load(&log).await;
    Json(page(&snapshot, &auth, &log))
}

pub(crate) async fn add_sponsor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(draft): Json<SponsorDraft>,
) -> Result<(StatusCode, Json<PageResponse>), HttpError<SponsorDraft>> {
    let auth = state.auth(&headers);
    let log = NotificationLog::new();
    let _guard = begin::<SponsorDraft>(&state, &auth, Action::AddSponsor, &log)?;

    let mut dialog = AddSponsorDialog::with_draft(draft);
    match dialog.submit(&auth, &state.controller, &log).await {
        Ok(snapshot) => Ok((StatusCode::CREATED, Json(page(&snapshot, &auth, &log)))),
        Err(err) => Err(directory_error(&err, &log, Some(dialog.draft().clone()))),
    }
}

/// Resolves a path id against the cached list, loading it first if the
/// page has never been fetched.
async fn cached_sponsor(state: &AppState, id: &SponsorId, log: &NotificationLog) -> Option<Sponsor> {
    if let Some(sponsor) = state.controller.find(id) {
        return Some(sponsor);
    }
    if state.controller.snapshot().source == ListSource::Pending {
        state.controller.load(log).await;
        return state.controller.find(id);
    }
    None
}

fn not_found<D>(id: &SponsorId, log: &NotificationLog) -> HttpError<D> {
    http_error(
        ApiError::new(ErrorCode::NotFound, format!("sponsor {id} not found")),
        log,
    )
}

pub(crate) async fn delete_prompt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeletePrompt>, HttpError> {
    let auth = state.auth(&headers);
    let log = NotificationLog::new();
    if !auth.is_admin() {
        return Err(directory_error(&DirectoryError::Unauthorized, &log, None));
    }

    let id = SponsorId(id);
    let sponsor = cached_sponsor(&state, &id, &log)
        .await
        .ok_or_else(|| not_found::<()>(&id, &log))?;

    let mut flow = DeleteConfirmation::new();
    flow.request(sponsor);
    flow.to_prompt()
        .map(Json)
        .ok_or_else(|| directory_error(&DirectoryError::MissingIdentifier, &log, None))
}

pub(crate) async fn delete_sponsor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(decision): Json<DeleteDecision>,
) -> Result<Json<PageResponse>, HttpError> {
    let auth = state.auth(&headers);
    let log = NotificationLog::new();
    if decision.confirm && !auth.is_admin() {
        DeleteConfirmation::notify_failure(&log);
        return Err(directory_error(&DirectoryError::Unauthorized, &log, None));
    }

    let id = SponsorId(id);
    let sponsor = cached_sponsor(&state, &id, &log)
        .await
        .ok_or_else(|| not_found::<()>(&id, &log))?;

    let mut flow = DeleteConfirmation::new();
    flow.request(sponsor);
    if !decision.confirm {
        flow.cancel();
        info!(%id, "delete cancelled");
        return Ok(Json(page(&state.controller.settled(), &auth, &log)));
    }

    let _guard = begin::<()>(&state, &auth, Action::DeleteSponsor, &log)?;
    let reloaded = flow
        .confirm(&auth, &state.controller, &log)
        .await
        .map_err(|err| directory_error::<()>(&err, &log, None))?;
    let snapshot = reloaded.unwrap_or_else(|| state.controller.settled());
    Ok(Json(page(&snapshot, &auth, &log)))
}

pub(crate) async fn contact(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ContactForm>,
) -> Result<Json<NotificationsResponse>, HttpError<ContactForm>> {
    let log = NotificationLog::new();
    match send_contact(&form, state.mailer.as_ref(), &log).await {
        Ok(()) => Ok(Json(NotificationsResponse {
            notifications: log.drain(),
        })),
        Err(err) => {
            let code = match &err {
                ContactError::Validation(_) => ErrorCode::Validation,
                ContactError::Delivery(_) => ErrorCode::Upstream,
            };
            let (status, Json(mut body)) = http_error(ApiError::new(code, err.to_string()), &log);
            if let ContactError::Validation(errors) = err {
                body.field_errors = errors;
            }
            body.draft = Some(form);
            Err((status, Json(body)))
        }
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
