use std::{collections::HashMap, fs, path::Path};

use anyhow::anyhow;
use chrono::Local;
use client_core::{RenderOptions, DEFAULT_API_BASE};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub utc_offset_minutes: Option<i32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.into(),
            utc_offset_minutes: None,
        }
    }
}

/// Defaults, then `path` if it exists, then the environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable config file");
            return;
        }
    };

    if let Some(v) = file_value(&file_cfg, "api_base_url") {
        settings.api_base_url = normalize_api_base(&v);
    }
    if let Some(v) = file_value(&file_cfg, "utc_offset_minutes") {
        set_offset(settings, &v);
    }
}

/// Strings and integers are accepted; other value types are skipped with a warning.
fn file_value(file_cfg: &HashMap<String, toml::Value>, key: &str) -> Option<String> {
    match file_cfg.get(key)? {
        toml::Value::String(v) => Some(v.clone()),
        toml::Value::Integer(v) => Some(v.to_string()),
        other => {
            warn!(key, kind = other.type_str(), "ignoring config value of unsupported type");
            None
        }
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("API_BASE_URL") {
        settings.api_base_url = normalize_api_base(&v);
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = normalize_api_base(&v);
    }

    if let Some(v) = lookup("APP__UTC_OFFSET_MINUTES") {
        set_offset(settings, &v);
    }
}

fn set_offset(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<i32>() {
        Ok(parsed) => settings.utc_offset_minutes = Some(parsed),
        Err(_) => warn!(value = raw, "ignoring non-numeric utc offset"),
    }
}

pub fn normalize_api_base(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base_url;
    }
    trimmed.to_string()
}

/// Display offset for timestamps; the machine's local offset unless configured.
pub fn render_options(settings: &Settings) -> anyhow::Result<RenderOptions> {
    match settings.utc_offset_minutes {
        Some(minutes) => RenderOptions::with_offset_minutes(minutes)
            .ok_or_else(|| anyhow!("utc offset of {minutes} minutes is out of range")),
        None => Ok(RenderOptions {
            offset: *Local::now().offset(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
