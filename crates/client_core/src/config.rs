use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;
use verification_sdk::SessionConfig;

use crate::{
    controller::{ControllerSettings, DEFAULT_FALLBACK_DELAY},
    state::ControllerMode,
};

pub const SETTINGS_FILE: &str = "antifraud.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub session: SessionConfig,
    pub fallback_delay_ms: u64,
    pub mode: ControllerMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session: SessionConfig {
                api_base_url: "https://api.legitimuz.com".into(),
                auth_token: String::new(),
                action: "signin".into(),
                origin: "http://app.demo.antifraude.teste.com".into(),
                enable_geolocation: true,
            },
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY.as_millis() as u64,
            mode: ControllerMode::Compat,
        }
    }
}

impl Settings {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            mode: self.mode,
            fallback_delay: Duration::from_millis(self.fallback_delay_ms),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    token: Option<String>,
    action: Option<String>,
    origin: Option<String>,
    enable_geolocation: Option<bool>,
    fallback_delay_ms: Option<u64>,
    mode: Option<ControllerMode>,
}

pub fn load_settings() -> Settings {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file if present, then the environment.
pub fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!("ignoring unreadable settings file '{}': {err}", path.display()),
        }
    }

    let lookup = |names: &[&str]| names.iter().rev().find_map(|name| env(*name));

    if let Some(v) = lookup(&["ANTIFRAUD_API_URL", "APP__API_URL"]) {
        settings.session.api_base_url = v;
    }
    if let Some(v) = lookup(&["ANTIFRAUD_TOKEN", "APP__TOKEN"]) {
        settings.session.auth_token = v;
    }
    if let Some(v) = lookup(&["ANTIFRAUD_ACTION", "APP__ACTION"]) {
        settings.session.action = v;
    }
    if let Some(v) = lookup(&["ANTIFRAUD_ORIGIN", "APP__ORIGIN"]) {
        settings.session.origin = v;
    }
    if let Some(v) = lookup(&["ANTIFRAUD_ENABLE_GEOLOCATION", "APP__ENABLE_GEOLOCATION"]) {
        match parse_flag(&v) {
            Some(flag) => settings.session.enable_geolocation = flag,
            None => warn!("ignoring invalid geolocation flag '{v}'"),
        }
    }
    if let Some(v) = lookup(&["ANTIFRAUD_FALLBACK_DELAY_MS", "APP__FALLBACK_DELAY_MS"]) {
        match v.parse::<u64>() {
            Ok(parsed) => settings.fallback_delay_ms = parsed,
            Err(err) => warn!("ignoring invalid fallback delay '{v}': {err}"),
        }
    }
    if let Some(v) = lookup(&["ANTIFRAUD_MODE", "APP__MODE"]) {
        match v.parse::<ControllerMode>() {
            Ok(mode) => settings.mode = mode,
            Err(err) => warn!("{err}"),
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.session.api_base_url = v;
    }
    if let Some(v) = file_cfg.token {
        settings.session.auth_token = v;
    }
    if let Some(v) = file_cfg.action {
        settings.session.action = v;
    }
    if let Some(v) = file_cfg.origin {
        settings.session.origin = v;
    }
    if let Some(v) = file_cfg.enable_geolocation {
        settings.session.enable_geolocation = v;
    }
    if let Some(v) = file_cfg.fallback_delay_ms {
        settings.fallback_delay_ms = v;
    }
    if let Some(v) = file_cfg.mode {
        settings.mode = v;
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
