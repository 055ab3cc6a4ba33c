//! Contact form: local validation and hand-off to the email relay.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{
    notify::Notifier,
    protocol::{FieldError, Notification},
};
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com";
pub const DEFAULT_SERVICE_ID: &str = "service_qii0r9i";
pub const DEFAULT_TEMPLATE_ID: &str = "template_se1ntd8";
pub const DEFAULT_PUBLIC_KEY: &str = "xA2mLRICgKakxEiNJ";

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// The variables the relay substitutes into the club's email template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact form has {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("email delivery failed: {0}")]
    Delivery(#[source] anyhow::Error),
}

impl ContactForm {
    pub fn validate(&self) -> Result<TemplateParams, Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.chars().count() < MIN_NAME_CHARS {
            errors.push(field_error("name", "Name must be at least 2 characters."));
        }
        if !is_valid_email(&self.email) {
            errors.push(field_error("email", "Please enter a valid email address."));
        }
        if self.message.chars().count() < MIN_MESSAGE_CHARS {
            errors.push(field_error(
                "message",
                "Message must be at least 10 characters.",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(TemplateParams {
            from_name: self.name.clone(),
            from_email: self.email.clone(),
            message: self.message.clone(),
        })
    }
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Syntactic address check: `local@label.label…tld`, no whitespace, the
/// top-level label alphabetic and at least two characters long.
pub fn is_valid_email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    if local.is_empty()
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_'+-.".contains(c))
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    labels_ok && tld_ok
}

#[async_trait]
pub trait EmailDelivery: Send + Sync {
    async fn send(&self, params: &TemplateParams) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl Default for EmailJsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            service_id: DEFAULT_SERVICE_ID.into(),
            template_id: DEFAULT_TEMPLATE_ID.into(),
            public_key: DEFAULT_PUBLIC_KEY.into(),
        }
    }
}

pub struct EmailJsClient {
    http: Client,
    config: EmailJsConfig,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
}

impl EmailJsClient {
    pub fn new(config: EmailJsConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &EmailJsConfig {
        &self.config
    }
}

#[async_trait]
impl EmailDelivery for EmailJsClient {
    async fn send(&self, params: &TemplateParams) -> anyhow::Result<()> {
        let url = format!(
            "{}/api/v1.0/email/send",
            self.config.endpoint.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .json(&SendRequest {
                service_id: &self.config.service_id,
                template_id: &self.config.template_id,
                user_id: &self.config.public_key,
                template_params: params,
            })
            .send()
            .await
            .context("email relay unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("email relay rejected message ({status}): {body}"));
        }
        Ok(())
    }
}

/// Validates and forwards one contact submission. No retry: a failed
/// delivery is reported once and the caller keeps the form contents.
pub async fn send_contact(
    form: &ContactForm,
    delivery: &dyn EmailDelivery,
    notifier: &dyn Notifier,
) -> Result<(), ContactError> {
    let params = form.validate().map_err(ContactError::Validation)?;

    match delivery.send(&params).await {
        Ok(()) => {
            info!(from_email = %params.from_email, "contact message delivered");
            notifier.notify(
                Notification::success("Message sent!")
                    .with_description("Thank you for your message. We'll get back to you soon."),
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "contact message delivery failed");
            notifier.notify(Notification::error("Message failed to send!").with_description(
                "Sorry, we were unable to send your message. Please try again later.",
            ));
            Err(ContactError::Delivery(err))
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
