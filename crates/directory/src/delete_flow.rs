use shared::{
    domain::Sponsor,
    notify::Notifier,
    protocol::{DeletePrompt, Notification},
};
use tracing::{error, info, warn};

use crate::{AuthContext, DirectoryError, SponsorListController, SponsorListSnapshot};

const DELETED: &str = "Sponsor deleted successfully!";
const DELETE_FAILED: &str = "Failed to delete sponsor. Please try again.";
const NO_ID: &str = "Cannot delete sponsor without an ID";

/// Two-step delete: `request` opens the prompt, `confirm` performs it.
#[derive(Debug, Default)]
pub struct DeleteConfirmation {
    target: Option<Sponsor>,
    deleting: bool,
}

impl DeleteConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, sponsor: Sponsor) {
        self.target = Some(sponsor);
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn prompt(&self) -> Option<String> {
        self.target
            .as_ref()
            .map(|sponsor| prompt_message(&sponsor.title))
    }

    /// Wire form of the open prompt. Records without an id have none.
    pub fn to_prompt(&self) -> Option<DeletePrompt> {
        let sponsor = self.target.as_ref()?;
        Some(DeletePrompt {
            sponsor_id: sponsor.id.clone()?,
            title: sponsor.title.clone(),
            message: prompt_message(&sponsor.title),
        })
    }

    /// Toast for a delete that failed or was refused, including one turned
    /// away before any prompt was opened.
    pub fn notify_failure(notifier: &dyn Notifier) {
        notifier.notify(Notification::error(DELETE_FAILED));
    }

    /// Dismisses the prompt. Nothing is sent to the store.
    pub fn cancel(&mut self) {
        if !self.deleting {
            self.target = None;
        }
    }

    /// Deletes the open target and returns the refreshed list. `None` when
    /// no prompt was open.
    pub async fn confirm(
        &mut self,
        auth: &AuthContext,
        controller: &SponsorListController,
        notifier: &dyn Notifier,
    ) -> Result<Option<SponsorListSnapshot>, DirectoryError> {
        if self.deleting {
            return Err(DirectoryError::Busy);
        }
        let Some(target) = self.target.as_ref() else {
            return Ok(None);
        };
        let Some(id) = target.id.clone() else {
            warn!(title = %target.title, "refusing to delete a sponsor without an id");
            notifier.notify(Notification::error(NO_ID));
            return Err(DirectoryError::MissingIdentifier);
        };
        let title = target.title.clone();

        self.deleting = true;
        let result = match auth.require_session() {
            Ok(session) => controller
                .store()
                .delete_sponsor(session, &id)
                .await
                .map_err(DirectoryError::Store),
            Err(err) => Err(err),
        };
        self.deleting = false;

        match result {
            Ok(()) => {
                info!(%id, %title, "sponsor deleted");
                notifier.notify(Notification::success(DELETED));
                self.target = None;
                Ok(Some(controller.load(notifier).await))
            }
            Err(err) => {
                error!(%id, error = %err, "failed to delete sponsor");
                Self::notify_failure(notifier);
                Err(err)
            }
        }
    }
}

fn prompt_message(title: &str) -> String {
    format!("Are you sure you want to delete {title}? This action cannot be undone.")
}

#[cfg(test)]
#[path = "tests/delete_flow_tests.rs"]
mod tests;
