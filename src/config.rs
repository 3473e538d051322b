//! TOML-based configuration for kreachdist.
//!
//! Configuration is loaded from `~/.kreachdist/config.toml` by default, or
//! from a path specified via the `KREACHDIST_CONFIG` environment variable.
//! CLI flags always take precedence over values found here; this file only
//! supplies defaults (log level, output directory override) for
//! unattended/scripted invocations.

use std::{
    env,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_CONF_FILEPATH_UNDER_HOME, DEFAULT_KREACHDIST_CONF_FILEPATH_ENV_NAME,
        HOME_ENV_NAME,
    },
    error::Error,
};

/// Returns a reference to the global [`KreachdistConfig`] singleton.
pub fn kreachdist_config() -> &'static KreachdistConfig {
    static KREACHDIST_CONFIG: OnceLock<KreachdistConfig> = OnceLock::new();
    KREACHDIST_CONFIG.get_or_init(|| {
        KreachdistConfig::new().unwrap_or_else(|err| {
            log::warn!("Failed to load kreachdist configuration, using defaults: {err}");
            KreachdistConfig::default()
        })
    })
}

/// Configuration for kreachdist, typically loaded from
/// `~/.kreachdist/config.toml` via [`kreachdist_config`].
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct KreachdistConfig {
    /// Default log level (0 = warnings only, 1 = info, 2 = debug, 3 = trace)
    log_level: Option<u8>,

    /// Default directory to write `.dist` files into, overriding the
    /// input-file-adjacent default. Relative to the input file if not
    /// absolute.
    output_dir: Option<PathBuf>,
}

impl KreachdistConfig {
    /// Returns the configured default log level, falling back to `Warn`.
    pub fn log_level(&self) -> LevelFilter {
        match self.log_level.unwrap_or(0) {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Returns the configured default output directory, if any.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}

impl KreachdistConfig {
    /// Loads configuration from the config file.
    ///
    /// The file path is determined by the `KREACHDIST_CONFIG` environment
    /// variable, falling back to `~/.kreachdist/config.toml`.
    pub fn new() -> Result<Self, Error> {
        let config_filepath = env::var(DEFAULT_KREACHDIST_CONF_FILEPATH_ENV_NAME).map_or_else(
            |_| {
                PathBuf::from(env::var(HOME_ENV_NAME).unwrap_or_default())
                    .join(DEFAULT_CONF_FILEPATH_UNDER_HOME)
            },
            PathBuf::from,
        );
        Self::load_path(config_filepath)
    }

    fn load_path<P>(config_filepath: P) -> Result<Self, Error>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let config_filepath = config_filepath.as_ref();
        if !config_filepath.exists() {
            // No config file present is not an error: we simply run with defaults.
            return Ok(Self::default());
        }

        confy::load_path::<KreachdistConfig>(config_filepath).map_err(|err| {
            log::error!(
                "Failed to load configuration: config_filepath={:?}, err={}",
                config_filepath,
                err
            );
            Error::ConfigError(format!(
                "Failed to load configuration from {config_filepath:?}: {err}"
            ))
        })
    }
}
