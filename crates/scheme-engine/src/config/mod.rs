use crate::workflows::scheme::rates::{BasisByTerm, SecuredBasisTable};
use crate::workflows::scheme::settings::DEFAULT_LEGAL_NAME_PREFIX;
use crate::workflows::scheme::signature::{LtvCodeTable, DEFAULT_SI5_LTV};
use crate::workflows::scheme::SchemeSettings;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub scheme: SchemeSettings,
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
            scheme: load_scheme_settings()?,
        })
    }
}

fn load_scheme_settings() -> Result<SchemeSettings, ConfigError> {
    let force_flexi = match env::var("SCHEME_FORCE_FLEXI") {
        Ok(raw) => parse_flag("SCHEME_FORCE_FLEXI", &raw)?,
        Err(_) => false,
    };
    let si5_ltv = percentage_var("SCHEME_SI5_LTV", DEFAULT_SI5_LTV)?;
    let term7_basis = percentage_var(
        "SCHEME_TERM7_SECURED_BASIS",
        BasisByTerm::standard().seven_months,
    )?;
    let legal_name_prefix = env::var("SCHEME_LEGAL_NAME_PREFIX")
        .map(|raw| raw.trim().to_string())
        .ok()
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or_else(|| DEFAULT_LEGAL_NAME_PREFIX.to_string());

    Ok(SchemeSettings {
        force_flexi,
        ltv_codes: LtvCodeTable::with_si5(si5_ltv),
        secured_basis: SecuredBasisTable::uniform(BasisByTerm {
            seven_months: term7_basis,
            ..BasisByTerm::standard()
        }),
        legal_name_prefix,
    })
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}

fn percentage_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| (1..=100).contains(value))
        .ok_or(ConfigError::InvalidPercentage { name, value: raw })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
    InvalidPercentage { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
            ConfigError::InvalidPercentage { name, value } => {
                write!(f, "{name} must be a whole percentage between 1 and 100, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidPercentage { .. } => None,
        }
    }
}
