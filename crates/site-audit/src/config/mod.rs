use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::audits::penalty::{DEFAULT_CORRECTION_FACTOR, DEFAULT_EMPLOYEES_COUNT};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
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
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig::from_env()?,
        })
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
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Dials feeding the penalty estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    /// Monetary index adjustment applied to raw penalty sums.
    pub correction_factor: f64,
    /// Headcount assumed when an evaluation does not carry one.
    pub default_employees_count: u32,
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let correction_factor = match env::var("APP_PENALTY_CORRECTION_FACTOR") {
            Ok(raw) => {
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidCorrectionFactor(raw.clone()))?;
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidCorrectionFactor(raw));
                }
                value
            }
            Err(_) => DEFAULT_CORRECTION_FACTOR,
        };

        let default_employees_count = match env::var("APP_DEFAULT_EMPLOYEES_COUNT") {
            Ok(raw) => match raw.trim().parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidEmployeesCount(raw)),
            },
            Err(_) => DEFAULT_EMPLOYEES_COUNT,
        };

        Ok(Self {
            correction_factor,
            default_employees_count,
        })
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            correction_factor: DEFAULT_CORRECTION_FACTOR,
            default_employees_count: DEFAULT_EMPLOYEES_COUNT,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCorrectionFactor(String),
    InvalidEmployeesCount(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCorrectionFactor(raw) => write!(
                f,
                "APP_PENALTY_CORRECTION_FACTOR must be a positive number (found '{raw}')"
            ),
            ConfigError::InvalidEmployeesCount(raw) => write!(
                f,
                "APP_DEFAULT_EMPLOYEES_COUNT must be a positive integer (found '{raw}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCorrectionFactor(_)
            | ConfigError::InvalidEmployeesCount(_) => None,
        }
    }
}
