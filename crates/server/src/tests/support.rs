use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::session::Claims;

pub(crate) const TEST_SECRET: &str = "kdt-test-secret";

pub(crate) fn mint_token(sub: &str, ttl: Duration) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        email: Some(format!("{sub}@kdt.example")),
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token")
}

pub(crate) fn admin_token() -> String {
    mint_token("admin-7", Duration::hours(1))
}
