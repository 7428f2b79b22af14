use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MATCH_LIMIT: usize = 10;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub allocation: AllocationConfig,
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV")
            .map(|raw| AppEnvironment::parse(&raw))
            .unwrap_or(AppEnvironment::Development);

        let port = match lookup("APP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => DEFAULT_PORT,
        };

        let match_limit = match lookup("ALLOCATION_MATCH_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidMatchLimit)?,
            None => DEFAULT_MATCH_LIMIT,
        };

        // Demo inventory is a development convenience unless explicitly requested.
        let seed_demo_inventory = match lookup("ALLOCATION_SEED_DEMO") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidSeedFlag)?,
            None => environment == AppEnvironment::Development,
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host: lookup("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            telemetry: TelemetryConfig {
                log_level: lookup("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
            allocation: AllocationConfig {
                match_limit,
                seed_demo_inventory,
            },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Allocation engine knobs exposed to operators.
#[derive(Debug, Clone)]
pub struct AllocationConfig {
    /// Default number of candidates returned by the matches endpoint.
    pub match_limit: usize,
    /// Register the demo program inventory when the service boots.
    pub seed_demo_inventory: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMatchLimit,
    InvalidSeedFlag,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMatchLimit => {
                write!(f, "ALLOCATION_MATCH_LIMIT must be a positive integer")
            }
            ConfigError::InvalidSeedFlag => {
                write!(f, "ALLOCATION_SEED_DEMO must be a boolean flag")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = from_pairs(&[]).expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.allocation.match_limit, 10);
        assert!(config.allocation.seed_demo_inventory);
    }

    #[test]
    fn accepts_localhost_host() {
        let config = from_pairs(&[("APP_HOST", "localhost"), ("APP_PORT", "8080")])
            .expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
    }

    #[test]
    fn production_seeds_only_when_asked() {
        let config = from_pairs(&[("APP_ENV", "prod")]).expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert!(!config.allocation.seed_demo_inventory);

        let config = from_pairs(&[("APP_ENV", "prod"), ("ALLOCATION_SEED_DEMO", "on")])
            .expect("config loads");
        assert!(config.allocation.seed_demo_inventory);
    }

    #[test]
    fn rejects_invalid_allocation_settings() {
        assert!(matches!(
            from_pairs(&[("ALLOCATION_MATCH_LIMIT", "0")]),
            Err(ConfigError::InvalidMatchLimit)
        ));
        assert!(matches!(
            from_pairs(&[("ALLOCATION_SEED_DEMO", "sometimes")]),
            Err(ConfigError::InvalidSeedFlag)
        ));
        assert!(matches!(
            from_pairs(&[("APP_PORT", "70000")]),
            Err(ConfigError::InvalidPort)
        ));
    }

    #[test]
    fn load_reads_process_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        env::set_var("ALLOCATION_MATCH_LIMIT", "3");
        let config = AppConfig::load().expect("config loads");
        env::remove_var("ALLOCATION_MATCH_LIMIT");
        assert_eq!(config.allocation.match_limit, 3);
    }
}
