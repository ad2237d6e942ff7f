use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveDate;

use crate::admission::AdmissionConfig;

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
    pub admission: AdmissionConfig,
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
            admission: load_admission()?,
        })
    }
}

fn load_admission() -> Result<AdmissionConfig, ConfigError> {
    let defaults = AdmissionConfig::default();

    Ok(AdmissionConfig {
        birthday_guests_per_member: number_var(
            "CLUB_BIRTHDAY_GUESTS_PER_MEMBER",
            defaults.birthday_guests_per_member,
        )?,
        pre_registration_days: number_var(
            "CLUB_PRE_REGISTRATION_DAYS",
            defaults.pre_registration_days,
        )?,
        fitness_warning_days: number_var(
            "CLUB_FITNESS_WARNING_DAYS",
            defaults.fitness_warning_days,
        )?,
        free_entry_age: number_var("CLUB_FREE_ENTRY_AGE", defaults.free_entry_age)?,
        restricted_dates: match env::var("CLUB_RESTRICTED_DATES") {
            Ok(raw) => parse_restricted_dates(&raw)?,
            Err(_) => defaults.restricted_dates,
        },
    })
}

fn number_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Parse a comma-separated list of `YYYY-MM-DD` dates, ignoring blanks.
pub fn parse_restricted_dates(raw: &str) -> Result<Vec<NaiveDate>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| {
                ConfigError::InvalidRestrictedDate {
                    value: value.to_string(),
                    source,
                }
            })
        })
        .collect()
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
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidNumber {
        key: &'static str,
    },
    InvalidRestrictedDate {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
            ConfigError::InvalidRestrictedDate { value, .. } => write!(
                f,
                "CLUB_RESTRICTED_DATES entry '{value}' is not a YYYY-MM-DD date"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidRestrictedDate { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CLUB_RESTRICTED_DATES",
            "CLUB_BIRTHDAY_GUESTS_PER_MEMBER",
            "CLUB_PRE_REGISTRATION_DAYS",
            "CLUB_FITNESS_WARNING_DAYS",
            "CLUB_FREE_ENTRY_AGE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.admission, AdmissionConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_admission_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CLUB_RESTRICTED_DATES", "2026-12-24, 2026-12-31,");
        env::set_var("CLUB_BIRTHDAY_GUESTS_PER_MEMBER", "10");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.admission.birthday_guests_per_member, 10);
        assert_eq!(
            config.admission.restricted_dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 12, 24).expect("valid"),
                NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid"),
            ]
        );
        reset_env();
    }

    #[test]
    fn rejects_malformed_restricted_dates() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CLUB_RESTRICTED_DATES", "2026-12-24,christmas");
        match AppConfig::load() {
            Err(ConfigError::InvalidRestrictedDate { value, .. }) => assert_eq!(value, "christmas"),
            other => panic!("expected restricted date error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_negative_and_oversized_day_counts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        for raw in ["-1", "99999999999", "five"] {
            reset_env();
            env::set_var("CLUB_PRE_REGISTRATION_DAYS", raw);
            match AppConfig::load() {
                Err(ConfigError::InvalidNumber { key }) => {
                    assert_eq!(key, "CLUB_PRE_REGISTRATION_DAYS")
                }
                other => panic!("expected invalid number for {raw}, got {other:?}"),
            }
        }

        reset_env();
        env::set_var("CLUB_FITNESS_WARNING_DAYS", "-7");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                key: "CLUB_FITNESS_WARNING_DAYS"
            })
        ));
        reset_env();
    }
}
