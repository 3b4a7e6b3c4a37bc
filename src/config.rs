//! Server configuration.
//!
//! Loaded from a TOML file; every field has a default so an absent file or
//! an empty table still yields a runnable configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

mod defaults {
    pub fn host() -> String {
        "::1".to_string()
    }

    pub fn port() -> u16 {
        6667
    }

    pub fn idle_limit_seconds() -> u64 {
        60
    }

    pub fn check_interval_seconds() -> u64 {
        10
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen host; also the `<host>` prefix of every numeric reply.
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Sessions idle longer than this are disconnected.
    #[serde(default = "defaults::idle_limit_seconds")]
    pub idle_limit_seconds: u64,
    /// How often the reaper scans for idle sessions.
    #[serde(default = "defaults::check_interval_seconds")]
    pub check_interval_seconds: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            idle_limit_seconds: defaults::idle_limit_seconds(),
            check_interval_seconds: defaults::check_interval_seconds(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotConfig {
    /// Shared secret for BOT_AUTH. Unset means BOT_AUTH always fails.
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path))
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .with_context(|| format!("invalid listen host {:?}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn idle_limit(&self) -> Duration {
        Duration::from_secs(self.limits.idle_limit_seconds)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.limits.check_interval_seconds)
    }
}

/// Validate a configuration, collecting every problem rather than stopping
/// at the first.
pub fn validate(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push("server.port must be non-zero".to_string());
    }
    if config.server.host.parse::<IpAddr>().is_err() {
        errors.push(format!(
            "server.host {:?} is not an IP address",
            config.server.host
        ));
    }
    if config.limits.idle_limit_seconds == 0 {
        errors.push("limits.idle_limit_seconds must be non-zero".to_string());
    }
    if config.limits.check_interval_seconds == 0 {
        errors.push("limits.check_interval_seconds must be non-zero".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "::1");
        assert_eq!(config.server.port, 6667);
        assert_eq!(config.server.log_format, LogFormat::Pretty);
        assert_eq!(config.limits.idle_limit_seconds, 60);
        assert_eq!(config.limits.check_interval_seconds, 10);
        assert_eq!(config.bot.secret, None);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn full_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 6697
            log_format = "json"

            [limits]
            idle_limit_seconds = 120
            check_interval_seconds = 5

            [bot]
            secret = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 6697);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.limits.idle_limit_seconds, 120);
        assert_eq!(config.bot.secret.as_deref(), Some("hunter2"));
        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:6697".parse().unwrap()
        );
    }

    #[test]
    fn validation_collects_all_errors() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "not-an-ip"
            port = 0

            [limits]
            check_interval_seconds = 0
            "#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 7000").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "::1");

        assert!(Config::load("/nonexistent/config.toml").is_err());
    }
}
