//! Store server settings.
//!
//! Values come from, highest priority first: CLI flags, environment
//! variables (through clap's `env`), `~/.config/tasklist-store/config.toml`,
//! then the defaults below. [`StoreConfig::load`] rejects a combination the
//! server could not run with before anything is bound or opened.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Port the store listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 9100;

/// Default request frame limit in bytes.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Largest request frame limit accepted. The WebSocket layer drops the
/// connection on messages above 64 MiB, so a limit past that never applies.
pub const MAX_PAYLOAD_CEILING: usize = 64 * 1024 * 1024;

/// Why the store configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// File that was tried.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A setting has a value the server cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        /// Dotted name of the setting, as written in the config file.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// On-disk layout. Every key is optional so a file can override just one.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StoreConfigFile {
    server: ServerSection,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerSection {
    bind_addr: Option<String>,
    max_payload_size: Option<usize>,
    data_file: Option<PathBuf>,
}

/// Command-line flags for `tasklist-store`.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Tasklist document store")]
pub struct StoreCliArgs {
    /// Socket address to listen on, e.g. `127.0.0.1:9100`.
    #[arg(short, long, env = "TASKLIST_STORE_ADDR")]
    pub bind: Option<String>,

    /// Config file to read instead of the default location.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON snapshot file; documents are kept in memory only when unset.
    #[arg(long, env = "TASKLIST_STORE_DATA")]
    pub data_file: Option<PathBuf>,

    /// Largest request frame, in bytes, the store will execute.
    #[arg(long)]
    pub max_payload_size: Option<usize>,

    /// Tracing filter directive, e.g. `info` or `tasklist_store=debug`.
    #[arg(long, default_value = "info", env = "TASKLIST_STORE_LOG")]
    pub log_level: String,
}

/// Settings the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Listening socket.
    pub bind_addr: SocketAddr,
    /// Request frames above this size are answered with an error.
    pub max_payload_size: usize,
    /// Snapshot file, if persistence is enabled.
    pub data_file: Option<PathBuf>,
    /// Tracing filter directive.
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            data_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Reads the config file, merges it under the CLI flags and validates
    /// the result.
    ///
    /// An explicit `--config` path must exist; the default path may be
    /// missing.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ReadFile`] or [`ConfigError::ParseToml`] for a bad
    /// file, [`ConfigError::InvalidValue`] for any setting
    /// [`validate`](Self::validate) rejects.
    pub fn load(cli: &StoreCliArgs) -> Result<Self, ConfigError> {
        let file = read_config_file(cli.config.as_deref())?;
        let config = Self::resolve(cli, &file)?;
        config.validate()?;
        Ok(config)
    }

    /// Picks each setting from the CLI, then the file, then the default.
    fn resolve(cli: &StoreCliArgs, file: &StoreConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let bind_addr = match cli.bind.as_deref().or(file.server.bind_addr.as_deref()) {
            Some(raw) => parse_bind_addr(raw)?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            bind_addr,
            max_payload_size: cli
                .max_payload_size
                .or(file.server.max_payload_size)
                .unwrap_or(defaults.max_payload_size),
            data_file: cli
                .data_file
                .clone()
                .or_else(|| file.server.data_file.clone()),
            log_level: cli.log_level.clone(),
        })
    }

    /// Checks the settings the server cannot start or serve with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the payload limit is zero
    /// or above [`MAX_PAYLOAD_CEILING`], the data file is a directory, or the
    /// log filter does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_payload_size",
                reason: "must be at least 1 byte".to_string(),
            });
        }
        if self.max_payload_size > MAX_PAYLOAD_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "server.max_payload_size",
                reason: format!("must not exceed {MAX_PAYLOAD_CEILING} bytes"),
            });
        }
        if let Some(path) = self.data_file.as_ref().filter(|p| p.is_dir()) {
            return Err(ConfigError::InvalidValue {
                field: "server.data_file",
                reason: format!("{} is a directory", path.display()),
            });
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.log_level) {
            return Err(ConfigError::InvalidValue {
                field: "log_level",
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|e| ConfigError::InvalidValue {
        field: "server.bind_addr",
        reason: format!("'{raw}' is not a socket address: {e}"),
    })
}

/// Reads the TOML file at `explicit_path`, or at the default location when
/// none is given. Only the default location is allowed to be absent.
fn read_config_file(explicit_path: Option<&Path>) -> Result<StoreConfigFile, ConfigError> {
    let (path, required) = match explicit_path {
        Some(p) => (p.to_path_buf(), true),
        None => match dirs::config_dir() {
            Some(dir) => (dir.join("tasklist-store").join("config.toml"), false),
            None => return Ok(StoreConfigFile::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            Ok(StoreConfigFile::default())
        }
        Err(source) => Err(ConfigError::ReadFile { path, source }),
    }
}
