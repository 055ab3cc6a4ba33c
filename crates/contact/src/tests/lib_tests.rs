use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::{notify::NotificationLog, protocol::NotificationLevel};
use tokio::{net::TcpListener, sync::Mutex};

struct ScriptedDelivery {
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedDelivery {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

#[async_trait]
impl EmailDelivery for ScriptedDelivery {
    async fn send(&self, _params: &TemplateParams) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("relay returned 400"));
        }
        Ok(())
    }
}

fn valid_form() -> ContactForm {
    ContactForm {
        name: "Jisoo".into(),
        email: "jisoo@student.example.ca".into(),
        message: "Can we book a dance workshop?".into(),
    }
}

#[test]
fn reports_every_invalid_field() {
    let form = ContactForm {
        name: "J".into(),
        email: "not-an-email".into(),
        message: "hi".into(),
    };
    let errors = form.validate().expect_err("invalid");
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "email", "message"]);
    assert_eq!(errors[0].message, "Name must be at least 2 characters.");
}

#[test]
fn valid_form_maps_to_template_params() {
    let params = valid_form().validate().expect("valid");
    assert_eq!(params.from_name, "Jisoo");
    assert_eq!(params.from_email, "jisoo@student.example.ca");
}

#[test]
fn email_syntax_checks() {
    for good in ["a@b.co", "first.last+kdt@ok.ubc.ca", "o'neil@mail-host.org"] {
        assert!(is_valid_email(good), "{good}");
    }
    for bad in [
        "",
        "plain",
        "@example.com",
        "user@",
        "user@localhost",
        "user@example.c",
        "user@exa mple.com",
        ".user@example.com",
        "us..er@example.com",
        "user@-example.com",
        "user@example.123",
    ] {
        assert!(!is_valid_email(bad), "{bad}");
    }
}

#[tokio::test]
async fn invalid_form_never_reaches_delivery() {
    let delivery = ScriptedDelivery::ok();
    let log = NotificationLog::new();
    let form = ContactForm {
        message: "short".into(),
        ..valid_form()
    };

    let err = send_contact(&form, &delivery, &log)
        .await
        .expect_err("should fail");
    assert!(matches!(err, ContactError::Validation(_)));
    assert_eq!(delivery.calls.load(Ordering::SeqCst), 0);
    assert!(log.is_empty());
}

#[tokio::test]
async fn successful_delivery_notifies_once() {
    let delivery = ScriptedDelivery::ok();
    let log = NotificationLog::new();

    send_contact(&valid_form(), &delivery, &log)
        .await
        .expect("sent");

    let notes = log.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert_eq!(notes[0].title, "Message sent!");
    assert_eq!(delivery.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_delivery_is_not_retried() {
    let delivery = ScriptedDelivery::failing();
    let log = NotificationLog::new();

    let err = send_contact(&valid_form(), &delivery, &log)
        .await
        .expect_err("should fail");
    assert!(matches!(err, ContactError::Delivery(_)));
    assert_eq!(delivery.calls.load(Ordering::SeqCst), 1);

    let notes = log.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].title, "Message failed to send!");
}

#[derive(Clone)]
struct RelayState {
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    status: StatusCode,
}

async fn handle_send(
    State(state): State<RelayState>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, &'static str) {
    state.received.lock().await.push(body);
    let text = if state.status.is_success() {
        "OK"
    } else {
        "The service ID is invalid"
    };
    (state.status, text)
}

async fn spawn_relay(status: StatusCode) -> anyhow::Result<(EmailJsClient, RelayState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = RelayState {
        received: Arc::new(Mutex::new(Vec::new())),
        status,
    };
    let app = Router::new()
        .route("/api/v1.0/email/send", post(handle_send))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let client = EmailJsClient::new(EmailJsConfig {
        endpoint: format!("http://{addr}"),
        ..EmailJsConfig::default()
    });
    Ok((client, state))
}

#[tokio::test]
async fn emailjs_client_posts_fixed_identity_and_params() {
    let (client, state) = spawn_relay(StatusCode::OK).await.expect("spawn relay");
    let params = valid_form().validate().expect("valid");

    client.send(&params).await.expect("send");

    let received = state.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["service_id"], DEFAULT_SERVICE_ID);
    assert_eq!(received[0]["template_id"], DEFAULT_TEMPLATE_ID);
    assert_eq!(received[0]["user_id"], DEFAULT_PUBLIC_KEY);
    assert_eq!(received[0]["template_params"]["from_name"], "Jisoo");
    assert_eq!(
        received[0]["template_params"]["message"],
        "Can we book a dance workshop?"
    );
}

#[tokio::test]
async fn emailjs_client_reports_rejection() {
    let (client, _state) = spawn_relay(StatusCode::BAD_REQUEST)
        .await
        .expect("spawn relay");
    let params = valid_form().validate().expect("valid");

    let err = client.send(&params).await.expect_err("should fail");
    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("service ID is invalid"));
}
