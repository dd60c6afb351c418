use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mksearch_core::domain::engine_config::EngineConfig;
use mksearch_core::error::CoreError;
use mksearch_core::types::credentials::Credentials;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub credentials: Credentials,
    pub engine_config: EngineConfig,
    pub request_timeout: Duration,
    pub max_search_limit: u64,
    pub default_limit: u64,
    pub nosearch: bool,
    pub admin_token_secret: Option<String>,
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("invalid credentials in MKSEARCH_CREDENTIALS: {0}")]
    Credentials(#[from] CoreError),
    #[error("cannot read engine config {path}: {source}")]
    EngineConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid engine config {path}: {source}")]
    EngineConfigJson {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("MKSEARCH_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let credentials_raw = read_string("MKSEARCH_CREDENTIALS", "mksearch;127.0.0.1,9200");
        let credentials = Credentials::parse(&credentials_raw)?;
        let engine_config = match read_optional_string("MKSEARCH_ENGINE_CONFIG") {
            Some(path) => load_engine_config(Path::new(&path))?,
            None => EngineConfig::default(),
        };
        let request_timeout_secs = read_u64("MKSEARCH_REQUEST_TIMEOUT_SECS", 15)?;
        let max_search_limit = read_u64("MKSEARCH_MAX_SEARCH_LIMIT", 100)?;
        let default_limit = read_u64("MKSEARCH_DEFAULT_LIMIT", 10)?;
        if default_limit == 0 || default_limit > max_search_limit {
            return Err(ConfigError::InvalidValue(
                "MKSEARCH_DEFAULT_LIMIT",
                default_limit.to_string(),
            ));
        }
        let nosearch = read_bool("MKSEARCH_NOSEARCH", false)?;
        let admin_token_secret = read_optional_string("MKSEARCH_ADMIN_SECRET");
        let cors_allow_origins = read_list("MKSEARCH_CORS_ALLOW_ORIGINS");

        Ok(Self {
            http_addr,
            credentials,
            engine_config,
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_search_limit,
            default_limit,
            nosearch,
            admin_token_secret,
            cors_allow_origins,
        })
    }
}

fn load_engine_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::EngineConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    EngineConfig::from_json_str(&contents).map_err(|source| ConfigError::EngineConfigJson {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match read_optional_string(key) {
        Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_list(key: &'static str) -> Vec<String> {
    split_list(&std::env::var(key).unwrap_or_default())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .filter_map(parse_dotenv_line)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = parse_dotenv_value(value.trim());
    Some((key.to_string(), value))
}

fn parse_dotenv_value(value: &str) -> String {
    if let Some(stripped) = value.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        return unescape_double_quoted(stripped);
    }
    if let Some(stripped) = value.strip_prefix('\'').and_then(|inner| inner.strip_suffix('\'')) {
        return stripped.to_string();
    }
    value.to_string()
}

fn unescape_double_quoted(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => output.push('\n'),
                Some('r') => output.push('\r'),
                Some('t') => output.push('\t'),
                Some('\\') => output.push('\\'),
                Some('"') => output.push('"'),
                Some(other) => {
                    output.push('\\');
                    output.push(other);
                }
                None => output.push('\\'),
            }
        } else {
            output.push(ch);
        }
    }
    output
}
