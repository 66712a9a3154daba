use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    /// Override for the SQLite file; defaults to ~/.opsdesk/opsdesk.db
    pub database_path: Option<PathBuf>,
    /// Root directory for stored document blobs
    pub files_root: PathBuf,
    /// Base URL of the exchange-rate API
    pub currency_api_url: String,
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port = value.parse::<u16>()?;
    if port == 0 {
        return Err(ConfigError::PortOutOfRange(port));
    }
    Ok(port)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "4450".to_string());
        let port = parse_port(&port_str)?;

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let database_path = env::var("DATABASE_PATH").ok().map(PathBuf::from);

        let files_root = env::var("FILES_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| opsdesk_core::opsdesk_dir().join("files"));

        let currency_api_url = env::var("CURRENCY_API_URL")
            .unwrap_or_else(|_| "https://api.exchangerate.host".to_string());

        Ok(Config {
            port,
            cors_origin,
            database_path,
            files_root,
            currency_api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_valid() {
        assert_eq!(parse_port("4450").unwrap(), 4450);
    }

    #[test]
    fn test_parse_port_rejects_zero() {
        assert!(matches!(parse_port("0"), Err(ConfigError::PortOutOfRange(0))));
    }

    #[test]
    fn test_parse_port_rejects_garbage() {
        assert!(matches!(parse_port("http"), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(parse_port("99999"), Err(ConfigError::InvalidPort(_))));
    }
}
