//! Runtime settings loader for calma-agent.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<config home>/calma/settings.yaml`, where config home is
//!   `--conf`, `CALMA_CONFIG_HOME`, `PRJ_CONFIG_HOME` or `.config` (first set wins)
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "calma/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub archive: ArchiveSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatSettings {
    pub buffer_window_ms: Option<u64>,
    pub memory_max_messages: Option<usize>,
    pub session_ttl_secs: Option<u64>,
    pub paragraph_max_chars: Option<usize>,
    pub sentence_buffer_max_chars: Option<usize>,
    pub turn_timeout_secs: Option<u64>,
    pub max_message_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSettings {
    pub inference_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub api_key: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveSettings {
    pub enabled: Option<bool>,
    pub path: Option<String>,
    pub queue_capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySettings {
    pub bind: Option<String>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            chat: self.chat.merge(overlay.chat),
            llm: self.llm.merge(overlay.llm),
            archive: self.archive.merge(overlay.archive),
            gateway: self.gateway.merge(overlay.gateway),
        }
    }
}

impl ChatSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            buffer_window_ms: overlay.buffer_window_ms.or(self.buffer_window_ms),
            memory_max_messages: overlay.memory_max_messages.or(self.memory_max_messages),
            session_ttl_secs: overlay.session_ttl_secs.or(self.session_ttl_secs),
            paragraph_max_chars: overlay.paragraph_max_chars.or(self.paragraph_max_chars),
            sentence_buffer_max_chars: overlay
                .sentence_buffer_max_chars
                .or(self.sentence_buffer_max_chars),
            turn_timeout_secs: overlay.turn_timeout_secs.or(self.turn_timeout_secs),
            max_message_chars: overlay.max_message_chars.or(self.max_message_chars),
        }
    }
}

impl LlmSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            inference_url: overlay.inference_url.or(self.inference_url),
            model: overlay.model.or(self.model),
            temperature: overlay.temperature.or(self.temperature),
            api_key: overlay.api_key.or(self.api_key),
            request_timeout_secs: overlay.request_timeout_secs.or(self.request_timeout_secs),
        }
    }
}

impl ArchiveSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            enabled: overlay.enabled.or(self.enabled),
            path: overlay.path.or(self.path),
            queue_capacity: overlay.queue_capacity.or(self.queue_capacity),
        }
    }
}

impl GatewaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            bind: overlay.bind.or(self.bind),
        }
    }
}

/// Load merged runtime settings (user overrides system).
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = env_path("PRJ_ROOT")
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let config_home = CONFIG_HOME_OVERRIDE
        .get()
        .cloned()
        .or_else(|| env_path("CALMA_CONFIG_HOME"))
        .or_else(|| env_path("PRJ_CONFIG_HOME"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_HOME_RELATIVE_PATH));
    let config_home = if config_home.is_absolute() {
        config_home
    } else {
        root.join(config_home)
    };
    (
        root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH),
        config_home.join(DEFAULT_USER_SETTINGS_RELATIVE_PATH),
    )
}

/// Merge two settings files; missing or broken files count as empty.
#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_or_default(system).merge(load_or_default(user))
}

fn load_or_default(path: &Path) -> RuntimeSettings {
    match read_settings(path) {
        Ok(Some(settings)) => settings,
        Ok(None) => RuntimeSettings::default(),
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = ?error,
                "ignoring unusable settings file"
            );
            RuntimeSettings::default()
        }
    }
}

fn read_settings(path: &Path) -> Result<Option<RuntimeSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings = serde_yaml::from_str::<RuntimeSettings>(&raw)
        .with_context(|| format!("failed to parse settings yaml {}", path.display()))?;
    Ok(Some(settings))
}

fn env_path(name: &str) -> Option<PathBuf> {
    let raw = std::env::var_os(name)?;
    let trimmed = raw.to_string_lossy().trim().to_string();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Point the user settings lookup at `<path>/calma/settings.yaml` (CLI `--conf`).
///
/// Relative paths resolve against `PRJ_ROOT`, else the working directory. Only the
/// first non-empty value is kept for the lifetime of the process.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let requested = path.into();
    if requested.as_os_str().is_empty() {
        return;
    }
    let active = CONFIG_HOME_OVERRIDE.get_or_init(|| requested.clone());
    if active != &requested {
        tracing::warn!(
            active = %active.display(),
            requested = %requested.display(),
            "config home already pinned for this process; keeping the first value"
        );
    }
}
