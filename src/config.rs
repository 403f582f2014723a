use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use chrono::Locale;
use serde::Deserialize;

use crate::render::{locale_from_env, parse_locale, DEFAULT_DATE_FORMAT};

pub const DEFAULT_CONFIG_FILE: &str = "taskers.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the remote task store; `None` keeps tasks in memory.
    pub store_url: Option<String>,
    pub request_timeout_secs: u64,
    pub date_format: String,
    /// POSIX locale name for dates; taken from `LC_ALL`/`LC_TIME`/`LANG` when unset.
    pub locale: Option<String>,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_url: None,
            request_timeout_secs: 10,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            locale: None,
            log_file: PathBuf::from("taskers.log"),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// A configured locale must be known; otherwise the environment decides
    /// and an unknown environment locale means chrono's default formatting.
    pub fn resolve_locale<F>(&self, var: F) -> anyhow::Result<Option<Locale>>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.locale.as_deref() {
            Some(name) => match parse_locale(name) {
                Some(locale) => Ok(Some(locale)),
                None => bail!("unknown locale {name:?}"),
            },
            None => Ok(locale_from_env(var)),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.date_format.trim().is_empty() {
            bail!("date_format must not be empty");
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("TASKERS_STORE_URL") {
            self.store_url = Some(v).filter(|v| !v.trim().is_empty());
        }
        if let Some(v) = var("TASKERS_LOCALE") {
            self.locale = Some(v).filter(|v| !v.trim().is_empty());
        }
        if let Some(v) = var("TASKERS_LOG_FILE") {
            self.log_file = PathBuf::from(v);
        }
        if let Some(v) = var("TASKERS_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = v.parse().with_context(|| {
                format!("TASKERS_REQUEST_TIMEOUT_SECS must be seconds, got {v:?}")
            })?;
        }
        Ok(())
    }
}

/// Defaults, then the TOML file, then `TASKERS_*` environment variables.
/// A missing file is only an error when it was asked for explicitly.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Settings::default(),
    };
    settings.apply_env(|key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

fn read_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}
