//! Configuration module for the game backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Default number of leaderboard rows when the client omits `limit`
    pub leaderboard_limit: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("PRESTON_DB_PATH")
            .unwrap_or_else(|_| "./data/game.sqlite".to_string())
            .into();

        let bind_addr = env::var("PRESTON_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid PRESTON_BIND_ADDR format");

        let log_level = env::var("PRESTON_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let leaderboard_limit = env::var("PRESTON_LEADERBOARD_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            db_path,
            bind_addr,
            log_level,
            leaderboard_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("PRESTON_DB_PATH");
        env::remove_var("PRESTON_BIND_ADDR");
        env::remove_var("PRESTON_LOG_LEVEL");
        env::remove_var("PRESTON_LEADERBOARD_LIMIT");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/game.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.leaderboard_limit, 10);
    }
}
