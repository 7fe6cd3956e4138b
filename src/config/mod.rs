//! Configuration module for the portfolio backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                tracing::warn!("Unknown PORTFOLIO_LOG_FORMAT {:?}, using text", other);
                LogFormat::Text
            }
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the admin API (disabled when unset)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (text or json)
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("PORTFOLIO_API_PSK")
            .ok()
            .filter(|psk| !psk.is_empty());

        let db_path = env::var("PORTFOLIO_DB_PATH")
            .unwrap_or_else(|_| "./data/portfolio.sqlite".to_string())
            .into();

        let index_path = env::var("PORTFOLIO_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = parse_bind_addr(env::var("PORTFOLIO_BIND_ADDR").ok().as_deref());

        let log_level = env::var("PORTFOLIO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = LogFormat::parse(env::var("PORTFOLIO_LOG_FORMAT").ok().as_deref());

        Self {
            api_psk,
            db_path,
            index_path,
            bind_addr,
            log_level,
            log_format,
        }
    }
}

fn parse_bind_addr(raw: Option<&str>) -> SocketAddr {
    let default: SocketAddr = ([127, 0, 0, 1], 8080).into();
    match raw {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid PORTFOLIO_BIND_ADDR {:?}, falling back to {}",
                value,
                DEFAULT_BIND_ADDR
            );
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        env::remove_var("PORTFOLIO_API_PSK");
        env::remove_var("PORTFOLIO_DB_PATH");
        env::remove_var("PORTFOLIO_INDEX_PATH");
        env::remove_var("PORTFOLIO_BIND_ADDR");
        env::remove_var("PORTFOLIO_LOG_LEVEL");
        env::remove_var("PORTFOLIO_LOG_FORMAT");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/portfolio.sqlite"));
        assert_eq!(config.index_path, PathBuf::from("./data/index"));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Text);
        assert_eq!(LogFormat::parse(Some("yaml")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }

    #[test]
    fn test_invalid_bind_addr_falls_back() {
        assert_eq!(
            parse_bind_addr(Some("not-an-address")).to_string(),
            DEFAULT_BIND_ADDR
        );
        assert_eq!(
            parse_bind_addr(Some("0.0.0.0:9000")).to_string(),
            "0.0.0.0:9000"
        );
    }
}
