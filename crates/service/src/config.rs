use config::builder::DefaultState;
use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::Error;
use bellman_ford_core::NegativeLoopDetection;

/// Config file looked up relative to the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "crates/service/Config.toml";

/// Environment overrides look like `GRAPH_SERVICE__SERVER__PORT=7000`.
pub const ENV_PREFIX: &str = "GRAPH_SERVICE";
const ENV_SEPARATOR: &str = "__";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: i64 = 6969;
const DEFAULT_MAX_LINE_BYTES: i64 = 10 * 1024 * 1024;
const DEFAULT_TIMEOUT_MS: i64 = 30_000;

/// Negative-loop detection as it is spelled in config files and on the command line.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    #[default]
    Disabled,
    SinglePass,
    Propagate,
}

impl From<DetectionMode> for NegativeLoopDetection {
    fn from(mode: DetectionMode) -> Self {
        match mode {
            DetectionMode::Disabled => NegativeLoopDetection::Disabled,
            DetectionMode::SinglePass => NegativeLoopDetection::SinglePass,
            DetectionMode::Propagate => NegativeLoopDetection::Propagate,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_line_bytes: usize,
    pub read_timeout_ms: u64,
    pub solve_timeout_ms: u64,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn solve_timeout(&self) -> Duration {
        Duration::from_millis(self.solve_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolverConfig {
    pub negative_loop_detection: DetectionMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub solver: SolverConfig,
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    ConfigLoader::builder()
        .set_default("server.host", DEFAULT_HOST)?
        .set_default("server.port", DEFAULT_PORT)?
        .set_default("server.max_line_bytes", DEFAULT_MAX_LINE_BYTES)?
        .set_default("server.read_timeout_ms", DEFAULT_TIMEOUT_MS)?
        .set_default("server.solve_timeout_ms", DEFAULT_TIMEOUT_MS)?
        .set_default("solver.negative_loop_detection", "disabled")
}

/// Loads configuration from built-in defaults, a TOML file and environment variables.
///
/// An explicitly given file must exist. Without one, [`DEFAULT_CONFIG_PATH`]
/// is used if it is present.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, Error> {
    let file_source = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::ConfigLoadError(format!(
                    "Configuration file not found at: {}",
                    path.display()
                )));
            }
            File::from(path).required(true)
        }
        None => {
            let base_path = env::current_dir().map_err(|e| {
                Error::ConfigLoadError(format!("Failed to determine current directory: {}", e))
            })?;
            let config_file_path: PathBuf = base_path.join(DEFAULT_CONFIG_PATH);
            File::from(config_file_path.as_path()).required(false)
        }
    };

    let s = with_defaults()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?
        .add_source(file_source)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator(ENV_SEPARATOR),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    Ok(app_config)
}
