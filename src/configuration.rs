//! src/configuration.rs
use serde_aux::field_attributes::{
    deserialize_bool_from_anything, deserialize_number_from_string,
    deserialize_option_number_from_string,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub cluster: ClusterSettings,
    pub job: JobSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ClusterSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workers: u16,
    /// Scratch space for per-job worker caches.
    pub work_dir: PathBuf,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct JobSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub split_size_in_bytes: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_task_attempts: u32,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout_seconds: Option<u64>,
    /// Registered name of the docno mapping scheme workers should load.
    pub docno_mapping: String,
}

impl JobSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub otlp_enabled: bool,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let config_dir = base_path.join("configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(config_dir.join("base.yaml")))
        .add_source(
            config::Environment::with_prefix("DOCNO_COUNT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
