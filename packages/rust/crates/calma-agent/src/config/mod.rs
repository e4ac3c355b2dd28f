//! Config namespace: layered runtime settings and resolved component configs.

mod chat;
mod settings;

pub use chat::{ArchiveConfig, ChatConfig, DEFAULT_INFERENCE_URL, LlmConfig};
pub use settings::{
    ArchiveSettings, ChatSettings, GatewaySettings, LlmSettings, RuntimeSettings,
    load_runtime_settings, load_runtime_settings_from_paths, runtime_settings_paths,
    set_config_home_override,
};
