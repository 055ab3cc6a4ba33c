use serde::{Deserialize, Serialize};
use shared::{
    domain::{NewSponsor, UserId},
    notify::Notifier,
    protocol::{FieldError, Notification},
};
use tracing::{error, info};
use url::Url;

use crate::{AuthContext, DirectoryError, SponsorListController, SponsorListSnapshot};

const ADDED: &str = "Sponsor added successfully!";
const ADD_FAILED: &str = "Failed to add sponsor. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SponsorField {
    Title,
    Image,
    Location,
    MapLink,
    Text,
    WebsiteLink,
}

impl SponsorField {
    pub const ALL: [SponsorField; 6] = [
        SponsorField::Title,
        SponsorField::Image,
        SponsorField::Location,
        SponsorField::MapLink,
        SponsorField::Text,
        SponsorField::WebsiteLink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SponsorField::Title => "title",
            SponsorField::Image => "image",
            SponsorField::Location => "location",
            SponsorField::MapLink => "maplink",
            SponsorField::Text => "text",
            SponsorField::WebsiteLink => "websitelink",
        }
    }

    fn is_url(self) -> bool {
        matches!(
            self,
            SponsorField::Image | SponsorField::MapLink | SponsorField::WebsiteLink
        )
    }

    fn message(self) -> &'static str {
        match self {
            SponsorField::Title => "Title is required",
            SponsorField::Image => "Please enter a valid image URL",
            SponsorField::Location => "Location is required",
            SponsorField::MapLink => "Please enter a valid map link URL",
            SponsorField::Text => "Discount text is required",
            SponsorField::WebsiteLink => "Please enter a valid website URL",
        }
    }
}

/// Raw add-sponsor form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub maplink: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub websitelink: String,
}

/// A draft that passed local validation. Values are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSponsor {
    title: String,
    image: String,
    location: String,
    maplink: String,
    text: String,
    websitelink: String,
}

impl ValidSponsor {
    /// The row to insert, tagged with the acting user.
    pub fn owned_by(self, user_id: UserId) -> NewSponsor {
        NewSponsor {
            title: self.title,
            image: self.image,
            location: self.location,
            maplink: self.maplink,
            text: self.text,
            websitelink: self.websitelink,
            user_id,
        }
    }
}

impl SponsorDraft {
    pub fn value(&self, field: SponsorField) -> &str {
        match field {
            SponsorField::Title => &self.title,
            SponsorField::Image => &self.image,
            SponsorField::Location => &self.location,
            SponsorField::MapLink => &self.maplink,
            SponsorField::Text => &self.text,
            SponsorField::WebsiteLink => &self.websitelink,
        }
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<ValidSponsor, Vec<FieldError>> {
        let errors: Vec<FieldError> = SponsorField::ALL
            .into_iter()
            .filter(|field| !field_is_valid(*field, self.value(*field)))
            .map(|field| FieldError {
                field: field.name().to_string(),
                message: field.message().to_string(),
            })
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidSponsor {
            title: self.title.trim().to_string(),
            image: self.image.trim().to_string(),
            location: self.location.trim().to_string(),
            maplink: self.maplink.trim().to_string(),
            text: self.text.trim().to_string(),
            websitelink: self.websitelink.trim().to_string(),
        })
    }
}

fn field_is_valid(field: SponsorField, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    !field.is_url() || Url::parse(value).is_ok()
}

/// State of the admin "Add Sponsor" dialog.
#[derive(Debug, Default)]
pub struct AddSponsorDialog {
    open: bool,
    submitting: bool,
    draft: SponsorDraft,
    field_errors: Vec<FieldError>,
}

impl AddSponsorDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dialog reopened with previously entered values, as after a failed
    /// submission.
    pub fn with_draft(draft: SponsorDraft) -> Self {
        Self {
            open: true,
            draft,
            ..Self::default()
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hides the dialog. Entered values survive until a successful submit.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn draft(&self) -> &SponsorDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut SponsorDraft {
        &mut self.draft
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Validates, inserts as the signed-in user and refreshes the list.
    ///
    /// Validation errors stay inline (no toast). Any later failure is
    /// toasted and leaves the dialog open with the draft untouched. On
    /// success the refreshed list is returned.
    pub async fn submit(
        &mut self,
        auth: &AuthContext,
        controller: &SponsorListController,
        notifier: &dyn Notifier,
    ) -> Result<SponsorListSnapshot, DirectoryError> {
        if self.submitting {
            return Err(DirectoryError::Busy);
        }

        let valid = match self.draft.validate() {
            Ok(valid) => valid,
            Err(errors) => {
                self.field_errors = errors.clone();
                return Err(DirectoryError::Validation(errors));
            }
        };
        self.field_errors.clear();

        self.submitting = true;
        let result = insert(valid, auth, controller).await;
        self.submitting = false;

        match result {
            Ok(title) => {
                info!(%title, "sponsor added");
                notifier.notify(Notification::success(ADDED));
                self.draft = SponsorDraft::default();
                self.open = false;
                Ok(controller.load(notifier).await)
            }
            Err(err) => {
                error!(error = %err, "failed to add sponsor");
                notifier.notify(Notification::error(ADD_FAILED));
                Err(err)
            }
        }
    }
}

async fn insert(
    valid: ValidSponsor,
    auth: &AuthContext,
    controller: &SponsorListController,
) -> Result<String, DirectoryError> {
    let session = auth.require_session()?;
    let sponsor = valid.owned_by(session.user_id.clone());
    controller
        .store()
        .insert_sponsor(session, &sponsor)
        .await
        .map_err(DirectoryError::Store)?;
    Ok(sponsor.title)
}

#[cfg(test)]
#[path = "tests/add_form_tests.rs"]
mod tests;
