use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use client_core::{ApplyPolicy, ControllerOptions, DEFAULT_USERS_URL};
use shared::domain::DecodeMode;
use url::Url;

pub const SETTINGS_FILE: &str = "user_list.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub users_url: String,
    pub log_filter: String,
    pub decode_mode: DecodeMode,
    pub apply_policy: ApplyPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            users_url: DEFAULT_USERS_URL.into(),
            log_filter: "info".into(),
            decode_mode: DecodeMode::Opaque,
            apply_policy: ApplyPolicy::LastArrivalWins,
        }
    }
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            decode_mode: self.decode_mode,
            apply_policy: self.apply_policy,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then environment overrides.
///
/// A missing or unreadable file and unparsable values are skipped.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("users_url") {
                settings.users_url = v.clone();
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
            if let Some(Ok(mode)) = file_cfg.get("decode_mode").map(|v| v.parse()) {
                settings.decode_mode = mode;
            }
            if let Some(Ok(policy)) = file_cfg.get("apply_policy").map(|v| v.parse()) {
                settings.apply_policy = policy;
            }
        }
    }

    if let Some(v) = env("USERS_URL") {
        settings.users_url = v;
    }
    if let Some(v) = env("APP__USERS_URL") {
        settings.users_url = v;
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = env("APP__DECODE_MODE") {
        if let Ok(mode) = v.parse() {
            settings.decode_mode = mode;
        }
    }
    if let Some(v) = env("APP__APPLY_POLICY") {
        if let Ok(policy) = v.parse() {
            settings.apply_policy = policy;
        }
    }

    settings
}

pub fn parse_users_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid users url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "users url '{raw}' must use http or https, not '{}'",
            url.scheme()
        );
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
