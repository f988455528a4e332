// Configuration module entry point
// Loads layered configuration (defaults, TOML file, SPA_* environment) and
// holds the shared application state built from it

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SpaConfig};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration using the first command-line argument as the file path
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error; defaults and environment still apply.
    /// Environment keys look like `SPA_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "spa-fallback")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("spa.root", "dist")?
            .set_default("spa.fallback", true)?
            .set_default("spa.index_path", "/index.html")?
            .set_default("spa.api_prefix", "/api/")?
            .set_default("spa.index_files", vec!["index.html"])?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SPA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/spa-fallback").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.spa.root, "dist");
        assert!(cfg.spa.fallback);
        assert_eq!(cfg.spa.index_path, "/index.html");
        assert_eq!(cfg.spa.api_prefix, "/api/");
        assert_eq!(cfg.spa.index_files, vec!["index.html"]);
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert_eq!(cfg.performance.max_connections, None);
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new("config");
        dir.file(
            "site.toml",
            r#"
[server]
port = 9090

[spa]
root = "/srv/app"
fallback = false
api_prefix = "/backend/"

[performance]
max_connections = 512
"#,
        );

        let file = dir.path().join("site.toml");
        let cfg = Config::load_from(file.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.spa.root, "/srv/app");
        assert!(!cfg.spa.fallback);
        assert_eq!(cfg.spa.api_prefix, "/backend/");
        assert_eq!(cfg.spa.index_path, "/index.html");
        assert_eq!(cfg.performance.max_connections, Some(512));
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("does-not-exist/spa-fallback").unwrap();
        cfg.server.host = "not an ip".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
