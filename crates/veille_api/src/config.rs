//! Server configuration from command-line flags and environment.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use veille_core::default_log_level;

#[derive(Debug, Clone, Parser)]
#[command(name = "veille-api", version, about = "REST API over the Veille fact catalog")]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[arg(long, env = "VEILLE_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// SQLite database file, created and migrated on startup.
    #[arg(long, env = "VEILLE_DB_PATH", default_value = "veille.sqlite3")]
    pub db_path: PathBuf,

    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, env = "VEILLE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset.
    #[arg(long, env = "VEILLE_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Browser origins allowed by CORS.
    #[arg(
        long = "cors-origin",
        env = "VEILLE_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or_else(|| default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;
    use clap::Parser;

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "veille-api",
            "--bind",
            "0.0.0.0:9000",
            "--db-path",
            "/var/lib/veille/facts.sqlite3",
            "--log-level",
            "warn",
            "--cors-origin",
            "http://a.test,http://b.test",
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(
            config.db_path.to_str(),
            Some("/var/lib/veille/facts.sqlite3")
        );
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn log_level_falls_back_to_build_default() {
        let config = ServerConfig::try_parse_from(["veille-api"]).unwrap();
        assert_eq!(config.log_level(), veille_core::default_log_level());
        assert_eq!(config.bind.port(), 8000);
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        assert!(ServerConfig::try_parse_from(["veille-api", "--bind", "nowhere"]).is_err());
    }
}
