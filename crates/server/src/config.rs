use std::{collections::HashMap, fs};

use anyhow::bail;
use contact::EmailJsConfig;
use serde::Deserialize;
use storage::RestStoreConfig;

const CONFIG_FILE: &str = "site.toml";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub store_url: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_jwt_secret: Option<String>,
    pub emailjs_endpoint: String,
    pub emailjs_service_id: String,
    pub emailjs_template_id: String,
    pub emailjs_public_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        let emailjs = EmailJsConfig::default();
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            store_url: "sqlite://./data/sponsors.db".into(),
            supabase_url: None,
            supabase_anon_key: None,
            supabase_jwt_secret: None,
            emailjs_endpoint: emailjs.endpoint,
            emailjs_service_id: emailjs.service_id,
            emailjs_template_id: emailjs.template_id,
            emailjs_public_key: emailjs.public_key,
        }
    }
}

/// Where sponsor rows live for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite { database_url: String },
    Rest(RestStoreConfig),
}

impl Settings {
    pub fn store_backend(&self) -> anyhow::Result<StoreBackend> {
        let Some(base_url) = non_empty(self.supabase_url.as_deref()) else {
            return Ok(StoreBackend::Sqlite {
                database_url: normalize_store_url(&self.store_url),
            });
        };
        let Some(anon_key) = non_empty(self.supabase_anon_key.as_deref()) else {
            bail!("SUPABASE_ANON_KEY must be set when SUPABASE_URL is configured");
        };
        Ok(StoreBackend::Rest(RestStoreConfig {
            base_url: base_url.to_string(),
            anon_key: anon_key.to_string(),
        }))
    }

    pub fn emailjs(&self) -> EmailJsConfig {
        EmailJsConfig {
            endpoint: self.emailjs_endpoint.clone(),
            service_id: self.emailjs_service_id.clone(),
            template_id: self.emailjs_template_id.clone(),
            public_key: self.emailjs_public_key.clone(),
        }
    }

    pub fn jwt_secret(&self) -> Option<&str> {
        non_empty(self.supabase_jwt_secret.as_deref())
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file(&mut settings, &file_cfg);
        }
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.bind_addr = v.clone();
    }
    if let Some(v) = file_cfg.get("store_url") {
        settings.store_url = v.clone();
    }
    if let Some(v) = file_cfg.get("supabase_url") {
        settings.supabase_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("supabase_anon_key") {
        settings.supabase_anon_key = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("emailjs_endpoint") {
        settings.emailjs_endpoint = v.clone();
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SITE_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = var("STORE_URL") {
        settings.store_url = v;
    }
    if let Some(v) = var("APP__STORE_URL") {
        settings.store_url = v;
    }

    if let Some(v) = var("SUPABASE_URL") {
        settings.supabase_url = Some(v);
    }
    if let Some(v) = var("SUPABASE_ANON_KEY") {
        settings.supabase_anon_key = Some(v);
    }
    if let Some(v) = var("SUPABASE_JWT_SECRET") {
        settings.supabase_jwt_secret = Some(v);
    }

    if let Some(v) = var("EMAILJS_ENDPOINT") {
        settings.emailjs_endpoint = v;
    }
    if let Some(v) = var("EMAILJS_SERVICE_ID") {
        settings.emailjs_service_id = v;
    }
    if let Some(v) = var("EMAILJS_TEMPLATE_ID") {
        settings.emailjs_template_id = v;
    }
    if let Some(v) = var("EMAILJS_PUBLIC_KEY") {
        settings.emailjs_public_key = v;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_store_url(raw_store_url: &str) -> String {
    let raw_store_url = raw_store_url.trim();

    if raw_store_url.is_empty() {
        return Settings::default().store_url;
    }

    if let Some(path) = raw_store_url.strip_prefix("sqlite://") {
        if has_windows_drive_prefix(path) {
            return format!("sqlite:{path}");
        }
        return raw_store_url.to_string();
    }

    if raw_store_url.starts_with("sqlite::memory:") || raw_store_url.contains("://") {
        return raw_store_url.to_string();
    }

    let path = raw_store_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_store_url)
        .replace('\\', "/");
    if has_windows_drive_prefix(&path) {
        return format!("sqlite:{path}");
    }
    format!("sqlite://{path}")
}

fn has_windows_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
