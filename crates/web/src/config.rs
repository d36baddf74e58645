//! Server configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional TOML file, then command line flags.
//!
//! ```toml
//! bind_address = "127.0.0.1:3000"
//! idle_timeout_ms = 3000
//! users_file = "sample_users.json"
//! log_level = "debug"
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use sockapi_http::codec::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEADER_BYTES};
use sockapi_http::connection::{ConnectionConfig, ReaderConfig};
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub bind_address: String,
    pub idle_timeout_ms: u64,
    pub read_buffer_size: usize,
    pub max_header_bytes: usize,
    pub max_body_bytes: u64,
    pub accept_partial_frames: bool,
    pub users_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_owned(),
            idle_timeout_ms: 3000,
            read_buffer_size: 1024,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            accept_partial_frames: false,
            users_file: PathBuf::from("sample_users.json"),
            log_level: "info".to_owned(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read config file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("can't parse config file {path:?}: {source}")]
    Parse { path: PathBuf, source: Box<toml::de::Error> },

    #[error("invalid config: {}", .problems.join(", "))]
    Invalid { problems: Vec<String> },
}

/// Command line flags; each one overrides the matching config file entry.
#[derive(Parser, Debug, Default)]
#[command(name = "sockapi-server", version, about = "Serve the socket api over plain tcp")]
pub struct CliArgs {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, for example 127.0.0.1:3000
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Milliseconds to wait for the next byte of a request
    #[arg(long)]
    pub idle_timeout_ms: Option<u64>,

    /// JSON file holding the user list
    #[arg(long)]
    pub users_file: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Handle requests the client cut short instead of refusing them
    #[arg(long)]
    pub accept_partial_frames: bool,
}

impl AppConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse { path: path.to_owned(), source: Box::new(e) })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        Self::from_toml(&content, path)
    }

    /// Builds the effective config: file (if any), then flags, then validation.
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &CliArgs) {
        if let Some(bind) = &args.bind {
            self.bind_address.clone_from(bind);
        }
        if let Some(idle_timeout_ms) = args.idle_timeout_ms {
            self.idle_timeout_ms = idle_timeout_ms;
        }
        if let Some(users_file) = &args.users_file {
            self.users_file.clone_from(users_file);
        }
        if let Some(log_level) = &args.log_level {
            self.log_level.clone_from(log_level);
        }
        if args.accept_partial_frames {
            self.accept_partial_frames = true;
        }
    }

    /// Reports every problem at once rather than the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.bind_address.trim().is_empty() {
            problems.push("bind_address must not be empty".to_owned());
        }
        if self.idle_timeout_ms == 0 {
            problems.push("idle_timeout_ms must be greater than 0".to_owned());
        }
        if self.read_buffer_size == 0 {
            problems.push("read_buffer_size must be greater than 0".to_owned());
        }
        if self.max_header_bytes == 0 {
            problems.push("max_header_bytes must be greater than 0".to_owned());
        }
        if self.users_file.as_os_str().is_empty() {
            problems.push("users_file must not be empty".to_owned());
        }
        if Level::from_str(&self.log_level).is_err() {
            problems.push(format!("unknown log_level {:?}", self.log_level));
        }

        if problems.is_empty() { Ok(()) } else { Err(ConfigError::Invalid { problems }) }
    }

    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            reader: ReaderConfig {
                idle_timeout: Duration::from_millis(self.idle_timeout_ms),
                read_buffer_size: self.read_buffer_size,
                max_header_bytes: self.max_header_bytes,
                max_body_bytes: self.max_body_bytes,
            },
            accept_partial_frames: self.accept_partial_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn defaults_match_the_classic_server() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.users_file, PathBuf::from("sample_users.json"));
        config.validate().unwrap();

        let connection = config.connection_config();
        assert_eq!(connection, ConnectionConfig::default());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let content = indoc! {r#"
            bind_address = "127.0.0.1:8080"
            idle_timeout_ms = 500
            log_level = "debug"
        "#};
        let config = AppConfig::from_toml(content, Path::new("server.toml")).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.connection_config().reader.idle_timeout, Duration::from_millis(500));
        assert_eq!(config.log_level(), Level::DEBUG);
        assert_eq!(config.read_buffer_size, 1024);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = AppConfig::from_toml("bind_adress = \"x\"", Path::new("server.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn flags_override_file() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            bind: Some("127.0.0.1:0".to_owned()),
            users_file: Some(PathBuf::from("/tmp/users.json")),
            accept_partial_frames: true,
            ..CliArgs::default()
        };
        config.apply_args(&args);

        assert_eq!(config.bind_address, "127.0.0.1:0");
        assert_eq!(config.users_file, PathBuf::from("/tmp/users.json"));
        assert!(config.accept_partial_frames);
        assert_eq!(config.idle_timeout_ms, 3000);
    }

    #[test]
    fn parses_command_line() {
        let args = CliArgs::try_parse_from(["sockapi-server", "--bind", "127.0.0.1:9000", "--idle-timeout-ms", "250"]).unwrap();
        let config = AppConfig::from_args(&args).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.idle_timeout_ms, 250);
    }

    #[test]
    fn validation_reports_every_problem() {
        let config =
            AppConfig { idle_timeout_ms: 0, read_buffer_size: 0, log_level: "loud".to_owned(), ..AppConfig::default() };

        let Err(ConfigError::Invalid { problems }) = config.validate() else {
            panic!("expected invalid config");
        };
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn missing_file() {
        let result = AppConfig::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
