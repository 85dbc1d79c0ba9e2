use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "city-admin.toml";
pub const ITEMS_PER_PAGE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub items_per_page: u32,
    pub default_sort: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            items_per_page: ITEMS_PER_PAGE,
            default_sort: "id,asc".into(),
            auth_token: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    items_per_page: Option<u32>,
    default_sort: Option<String>,
    auth_token: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `city-admin.toml` in the working directory if present, then
/// environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if Path::new(DEFAULT_SETTINGS_FILE).exists() {
        match read_file_settings(Path::new(DEFAULT_SETTINGS_FILE)) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!("ignoring {DEFAULT_SETTINGS_FILE}: {err:#}"),
        }
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Like [`load_settings`] but the file must exist and parse.
pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, read_file_settings(path)?);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_file_settings(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.items_per_page {
        settings.items_per_page = v;
    }
    if let Some(v) = file_cfg.default_sort {
        settings.default_sort = v;
    }
    if file_cfg.auth_token.is_some() {
        settings.auth_token = file_cfg.auth_token;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CITY_ADMIN_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__ITEMS_PER_PAGE") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.items_per_page = parsed,
            Err(err) => warn!("ignoring APP__ITEMS_PER_PAGE={v:?}: {err}"),
        }
    }

    if let Some(v) = var("APP__DEFAULT_SORT") {
        settings.default_sort = v;
    }

    if let Some(v) = var("APP__AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_SECS={v:?}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "server_url = \"https://cities.example\"\nitems_per_page = 50\n"
        )
        .expect("write");

        let mut settings = Settings::default();
        apply_file_settings(&mut settings, read_file_settings(file.path()).expect("read"));
        assert_eq!(settings.server_url, "https://cities.example");
        assert_eq!(settings.items_per_page, 50);
        assert_eq!(settings.default_sort, "id,asc");
    }

    #[test]
    fn env_overrides_apply_and_ignore_malformed_numbers() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("APP__SERVER_URL", "http://override"),
                ("APP__ITEMS_PER_PAGE", "many"),
                ("APP__AUTH_TOKEN", "secret"),
                ("APP__REQUEST_TIMEOUT_SECS", "5"),
            ]),
        );
        assert_eq!(settings.server_url, "http://override");
        assert_eq!(settings.items_per_page, ITEMS_PER_PAGE);
        assert_eq!(settings.auth_token.as_deref(), Some("secret"));
        assert_eq!(settings.request_timeout_secs, 5);
    }

    #[test]
    fn malformed_timeout_keeps_previous_value() {
        let mut settings = Settings {
            request_timeout_secs: 12,
            ..Settings::default()
        };
        apply_env_overrides(&mut settings, env(&[("APP__REQUEST_TIMEOUT_SECS", "-3")]));
        assert_eq!(settings.request_timeout_secs, 12);
    }

    #[test]
    fn unparsable_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "items_per_page = \"twenty\"").expect("write");
        let err = read_file_settings(file.path()).expect_err("must fail");
        assert!(err.to_string().contains("failed to parse settings file"));
    }
}
