use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    File,
    Sql,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sql => "sql",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub storage_backend: Option<StorageBackend>,
    pub storage_data_dir: Option<PathBuf>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://vouchers.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            storage: StorageConfig {
                backend: StorageBackend::Sql,
                data_dir: PathBuf::from("data"),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sql" | "sqlite" => Ok(Self::Sql),
            other => Err(ConfigError::Validation(format!(
                "unsupported storage backend `{other}` (expected memory|file|sql)"
            ))),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Layers defaults, the TOML file, `VOUCHERS_*` environment variables and
    /// programmatic overrides, in that order, then validates the result.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => config.apply_patch(read_patch(&path)?),
            None if options.require_file => {
                return Err(ConfigError::MissingConfigFile(
                    options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
                ));
            }
            None => {}
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        let database = patch.database.unwrap_or_default();
        assign(&mut self.database.url, database.url);
        assign(&mut self.database.max_connections, database.max_connections);
        assign(&mut self.database.timeout_secs, database.timeout_secs);

        let storage = patch.storage.unwrap_or_default();
        assign(&mut self.storage.backend, storage.backend);
        assign(&mut self.storage.data_dir, storage.data_dir);

        let server = patch.server.unwrap_or_default();
        assign(&mut self.server.bind_address, server.bind_address);
        assign(&mut self.server.port, server.port);
        assign(&mut self.server.graceful_shutdown_secs, server.graceful_shutdown_secs);

        let logging = patch.logging.unwrap_or_default();
        assign(&mut self.logging.level, logging.level);
        assign(&mut self.logging.format, logging.format);
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        assign(&mut self.database.url, env_value(&["VOUCHERS_DATABASE_URL"])?);
        assign(
            &mut self.database.max_connections,
            env_value(&["VOUCHERS_DATABASE_MAX_CONNECTIONS"])?,
        );
        assign(&mut self.database.timeout_secs, env_value(&["VOUCHERS_DATABASE_TIMEOUT_SECS"])?);

        if let Some(raw) = env_raw(&["VOUCHERS_STORAGE_BACKEND"]) {
            self.storage.backend = raw.1.parse()?;
        }
        assign(&mut self.storage.data_dir, env_value(&["VOUCHERS_STORAGE_DATA_DIR"])?);

        assign(&mut self.server.bind_address, env_value(&["VOUCHERS_SERVER_BIND_ADDRESS"])?);
        assign(&mut self.server.port, env_value(&["VOUCHERS_SERVER_PORT"])?);
        assign(
            &mut self.server.graceful_shutdown_secs,
            env_value(&["VOUCHERS_SERVER_GRACEFUL_SHUTDOWN_SECS"])?,
        );

        assign(
            &mut self.logging.level,
            env_value(&["VOUCHERS_LOGGING_LEVEL", "VOUCHERS_LOG_LEVEL"])?,
        );
        if let Some(raw) = env_raw(&["VOUCHERS_LOGGING_FORMAT", "VOUCHERS_LOG_FORMAT"]) {
            self.logging.format = raw.1.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        assign(&mut self.database.url, overrides.database_url);
        assign(&mut self.storage.backend, overrides.storage_backend);
        assign(&mut self.storage.data_dir, overrides.storage_data_dir);
        assign(&mut self.server.port, overrides.server_port);
        assign(&mut self.logging.level, overrides.log_level);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.database.url.trim();
        require(
            url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:",
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)",
        )?;
        require(
            self.database.max_connections > 0,
            "database.max_connections must be greater than zero",
        )?;
        require(
            (1..=300).contains(&self.database.timeout_secs),
            "database.timeout_secs must be in range 1..=300",
        )?;

        require(
            self.storage.backend != StorageBackend::File
                || !self.storage.data_dir.as_os_str().is_empty(),
            "storage.data_dir is required when storage.backend is `file`",
        )?;

        require(
            !self.server.bind_address.trim().is_empty(),
            "server.bind_address must not be empty",
        )?;
        require(self.server.port > 0, "server.port must be greater than zero")?;
        require(
            self.server.graceful_shutdown_secs > 0,
            "server.graceful_shutdown_secs must be greater than zero",
        )?;

        require(
            LOG_LEVELS.contains(&self.logging.level.trim().to_ascii_lowercase().as_str()),
            "logging.level must be one of trace|debug|info|warn|error",
        )
    }
}

const CONFIG_FILE_NAME: &str = "vouchers.toml";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn require(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.to_string()))
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|candidate| candidate.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&interpolate_env_vars(&raw)?)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces every `${NAME}` with the value of environment variable `NAME`.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let name = &after_open[..end];
        let value = env::var(name)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: name.to_string() })?;
        output.push_str(&value);
        rest = &after_open[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

/// First non-blank value among `keys`, paired with the key it came from.
fn env_raw<'k>(keys: &[&'k str]) -> Option<(&'k str, String)> {
    keys.iter().find_map(|key| {
        env::var(key).ok().filter(|value| !value.trim().is_empty()).map(|value| (*key, value))
    })
}

fn env_value<T: FromStr>(keys: &[&str]) -> Result<Option<T>, ConfigError> {
    env_raw(keys)
        .map(|(key, value)| {
            value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    storage: Option<StoragePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    backend: Option<StorageBackend>,
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
