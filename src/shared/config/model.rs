use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_stdout_level")]
    pub stdout_level: String,
    #[serde(default = "default_file_level")]
    pub file_level: String,
    /// Extra comma-separated filter directives applied to both sinks, e.g.
    /// `mlt_decoder::geometry=trace`.
    #[serde(default)]
    pub targets: Option<String>,
    /// Log the duration of each decoded tile and feature table.
    #[serde(default)]
    pub span_timings: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            stdout_level: default_stdout_level(),
            file_level: default_file_level(),
            targets: None,
            span_timings: false,
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_stdout_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DecoderConfig {
    /// Decode flat 64-bit id columns into f64 when ids are known to fit 53 bits.
    #[serde(default = "default_id_within_max_safe_integer")]
    pub id_within_max_safe_integer: bool,
    /// Rescale vertex coordinates to this extent when set.
    #[serde(default)]
    pub target_extent: Option<u32>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            id_within_max_safe_integer: default_id_within_max_safe_integer(),
            target_extent: None,
        }
    }
}

fn default_id_within_max_safe_integer() -> bool {
    true
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("MLT_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("MLT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
