use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "assessor.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub backend_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_sessions: usize,
    pub show_backend_caption: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".into(),
            backend_url: None,
            request_timeout_secs: 600,
            max_sessions: 1024,
            show_backend_caption: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    backend_url: Option<String>,
    request_timeout_secs: Option<u64>,
    max_sessions: Option<usize>,
    show_backend_caption: Option<bool>,
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicitly requested file must exist; the default `assessor.toml` is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg = parse_file_settings(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file_settings(&mut settings, file_cfg);
        }
        Err(error) if explicit_path.is_some() => {
            return Err(error)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str::<FileSettings>(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.backend_url {
        settings.backend_url = non_empty(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.max_sessions {
        settings.max_sessions = v.max(1);
    }
    if let Some(v) = file_cfg.show_backend_caption {
        settings.show_backend_caption = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = lookup("BACKEND_URL") {
        settings.backend_url = non_empty(v);
    }
    if let Some(v) = lookup("APP__BACKEND_URL") {
        settings.backend_url = non_empty(v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = lookup("APP__MAX_SESSIONS") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_sessions = parsed.max(1);
        }
    }
    if let Some(v) = lookup("APP__SHOW_BACKEND_CAPTION") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.show_backend_caption = parsed;
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Describes why the configured backend address will not work, if it won't.
pub fn backend_url_problem(backend_url: Option<&str>) -> Option<String> {
    let Some(raw) = backend_url else {
        return Some("no backend address configured; every evaluation will fail".to_string());
    };
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
        Ok(parsed) => Some(format!(
            "backend address '{raw}' uses unsupported scheme '{}'",
            parsed.scheme()
        )),
        Err(error) => Some(format!("backend address '{raw}' is not a valid URL: {error}")),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
