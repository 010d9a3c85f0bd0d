use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage, read from `APP_ENV`.
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

/// Everything the scoring service reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub reference_data: ReferenceDataConfig,
}

impl AppConfig {
    /// Load `.env` if present, then each section from process variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::parse(&var_or("APP_ENV", "development")),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig::from_env(),
            reference_data: ReferenceDataConfig::from_env(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = var_or("APP_HOST", DEFAULT_HOST);
        let port = match optional_var("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost {
                    value: self.host.clone(),
                    source,
                })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// A bare level (`debug`) or a full `EnvFilter` directive list.
    pub log_level: String,
}

impl TelemetryConfig {
    fn from_env() -> Self {
        Self {
            log_level: var_or("APP_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        }
    }
}

/// Optional files replacing the built-in normative table, question bank and
/// scoring weights. Unset or blank variables keep the built-in data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDataConfig {
    pub norms_csv: Option<PathBuf>,
    pub question_bank: Option<PathBuf>,
    pub scoring_config: Option<PathBuf>,
}

impl ReferenceDataConfig {
    fn from_env() -> Self {
        Self {
            norms_csv: optional_var("FITSCORE_NORMS_CSV").map(PathBuf::from),
            question_bank: optional_var("FITSCORE_QUESTION_BANK").map(PathBuf::from),
            scoring_config: optional_var("FITSCORE_SCORING_CONFIG").map(PathBuf::from),
        }
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    optional_var(key).unwrap_or_else(|| default.to_string())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        value: String,
        source: std::net::AddrParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT '{value}' is not a port number between 0 and 65535")
            }
            ConfigError::InvalidHost { value, .. } => {
                write!(f, "APP_HOST '{value}' is neither localhost nor an IP address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort { .. } => None,
            ConfigError::InvalidHost { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    const KEYS: [&str; 7] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "FITSCORE_NORMS_CSV",
        "FITSCORE_QUESTION_BANK",
        "FITSCORE_SCORING_CONFIG",
    ];

    /// Serialises tests that touch process variables and starts each from a clean slate.
    fn clean_env() -> MutexGuard<'static, ()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        let guard = GUARD
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in KEYS {
            env::remove_var(key);
        }
        guard
    }

    #[test]
    fn defaults_apply_without_variables() {
        let _env = clean_env();

        let config = AppConfig::load().expect("defaults load");

        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.telemetry.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.reference_data, ReferenceDataConfig::default());
    }

    #[test]
    fn environment_aliases_are_recognised() {
        assert_eq!(AppEnvironment::parse("PROD"), AppEnvironment::Production);
        assert_eq!(AppEnvironment::parse(" ci "), AppEnvironment::Test);
        assert_eq!(AppEnvironment::parse("staging"), AppEnvironment::Development);
    }

    #[test]
    fn localhost_binds_to_loopback() {
        let server = ServerConfig {
            host: "LocalHost".to_string(),
            port: 8080,
        };
        assert_eq!(
            server.socket_addr().expect("resolves"),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080)
        );
    }

    #[test]
    fn unparseable_host_names_the_value() {
        let server = ServerConfig {
            host: "gym-box".to_string(),
            port: 8080,
        };
        let err = server.socket_addr().expect_err("host rejected");
        assert!(err.to_string().contains("gym-box"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_port_is_reported_with_its_value() {
        let _env = clean_env();
        env::set_var("APP_PORT", "70000");

        let result = AppConfig::load();
        env::remove_var("APP_PORT");

        match result {
            Err(ConfigError::InvalidPort { value }) => assert_eq!(value, "70000"),
            other => panic!("expected invalid port, got {other:?}"),
        }
    }

    #[test]
    fn reference_paths_ignore_blank_values() {
        let _env = clean_env();
        env::set_var("FITSCORE_NORMS_CSV", "  ");
        env::set_var("FITSCORE_QUESTION_BANK", "/etc/fitscore/questions.json");
        env::set_var("FITSCORE_SCORING_CONFIG", "/etc/fitscore/scoring.json");

        let reference = ReferenceDataConfig::from_env();
        for key in KEYS {
            env::remove_var(key);
        }

        assert!(reference.norms_csv.is_none());
        assert_eq!(
            reference.question_bank,
            Some(PathBuf::from("/etc/fitscore/questions.json"))
        );
        assert_eq!(
            reference.scoring_config,
            Some(PathBuf::from("/etc/fitscore/scoring.json"))
        );
    }
}
