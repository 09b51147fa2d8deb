use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::{error::ClientError, session::SESSION_KEY};

const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".into(),
            session_path: default_session_path(),
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("profile-gallery")
        .join(format!("{SESSION_KEY}.json"))
}

pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Ok(v) = std::env::var("APP__SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("session_path") {
        settings.session_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

/// Trims whitespace and trailing slashes so paths can be appended with
/// `format!("{base}/api/...")`.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::Config("api base url is empty".into()));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|err| ClientError::Config(format!("invalid api base url '{trimmed}': {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "unsupported scheme '{}' in api base url",
            parsed.scheme()
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slashes_and_whitespace() {
        assert_eq!(
            normalize_base_url("  https://api.example.com/// ").expect("url"),
            "https://api.example.com"
        );
    }

    #[test]
    fn rejects_empty_and_non_http_urls() {
        assert!(matches!(normalize_base_url("   "), Err(ClientError::Config(_))));
        assert!(matches!(
            normalize_base_url("ftp://files.example.com"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = ClientSettings::default();
        apply_file_overrides(
            &mut settings,
            r#"
api_base_url = "https://api.example.com"
session_path = "/tmp/session.json"
request_timeout_secs = "5"
"#,
        );
        assert_eq!(settings.api_base_url, "https://api.example.com");
        assert_eq!(settings.session_path, PathBuf::from("/tmp/session.json"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn malformed_file_keeps_defaults() {
        let mut settings = ClientSettings::default();
        apply_file_overrides(&mut settings, "api_base_url = [");
        assert_eq!(settings.api_base_url, ClientSettings::default().api_base_url);
    }

    #[test]
    fn default_session_file_uses_session_key() {
        let settings = ClientSettings::default();
        assert_eq!(
            settings.session_path.file_name().and_then(|name| name.to_str()),
            Some("currentUser.json")
        );
    }
}
