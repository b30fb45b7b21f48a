use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::admissions::{
    AdmissionsSettings, TransitionPolicy, DEFAULT_EMAIL_DOMAIN, DEFAULT_INTAKE_YEAR,
};

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
    pub admissions: AdmissionsConfig,
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
            admissions: AdmissionsConfig::from_env(environment)?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Workflow knobs read from `ADMISSIONS_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionsConfig {
    pub intake_year: i32,
    pub transition_policy: TransitionPolicy,
    /// Session persisted to this JSON file when set, kept in memory otherwise.
    pub session_file: Option<PathBuf>,
    pub seed_demo: bool,
    pub email_domain: String,
}

impl AdmissionsConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let intake_year = match env::var("ADMISSIONS_INTAKE_YEAR") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|year| (1000..=9999).contains(year))
                .ok_or(ConfigError::InvalidIntakeYear(raw))?,
            Err(_) => DEFAULT_INTAKE_YEAR,
        };

        let transition_policy = match env::var("ADMISSIONS_TRANSITION_POLICY") {
            Ok(raw) => raw
                .parse::<TransitionPolicy>()
                .map_err(|_| ConfigError::InvalidTransitionPolicy(raw))?,
            Err(_) => TransitionPolicy::default(),
        };

        let session_file = env::var("ADMISSIONS_SESSION_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let seed_demo = match env::var("ADMISSIONS_SEED_DEMO") {
            Ok(raw) => parse_flag("ADMISSIONS_SEED_DEMO", &raw)?,
            Err(_) => environment != AppEnvironment::Production,
        };

        let email_domain = env::var("ADMISSIONS_EMAIL_DOMAIN")
            .ok()
            .map(|domain| domain.trim().trim_start_matches('@').to_string())
            .filter(|domain| !domain.is_empty())
            .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string());

        Ok(Self {
            intake_year,
            transition_policy,
            session_file,
            seed_demo,
            email_domain,
        })
    }

    pub fn settings(&self) -> AdmissionsSettings {
        AdmissionsSettings {
            intake_year: self.intake_year,
            transition_policy: self.transition_policy,
        }
    }
}

impl Default for AdmissionsConfig {
    fn default() -> Self {
        Self {
            intake_year: DEFAULT_INTAKE_YEAR,
            transition_policy: TransitionPolicy::default(),
            session_file: None,
            seed_demo: true,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
        }
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidIntakeYear(String),
    InvalidTransitionPolicy(String),
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidIntakeYear(value) => {
                write!(f, "ADMISSIONS_INTAKE_YEAR must be a four digit year, got '{value}'")
            }
            ConfigError::InvalidTransitionPolicy(value) => write!(
                f,
                "ADMISSIONS_TRANSITION_POLICY must be 'strict' or 'permissive', got '{value}'"
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidIntakeYear(_)
            | ConfigError::InvalidTransitionPolicy(_)
            | ConfigError::InvalidFlag { .. } => None,
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
            "ADMISSIONS_INTAKE_YEAR",
            "ADMISSIONS_TRANSITION_POLICY",
            "ADMISSIONS_SESSION_FILE",
            "ADMISSIONS_SEED_DEMO",
            "ADMISSIONS_EMAIL_DOMAIN",
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
        assert_eq!(config.admissions, AdmissionsConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn production_skips_demo_seed_unless_asked() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert!(!config.admissions.seed_demo);

        env::set_var("ADMISSIONS_SEED_DEMO", "yes");
        let config = AppConfig::load().expect("config loads");
        assert!(config.admissions.seed_demo);
        reset_env();
    }

    #[test]
    fn reads_admissions_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMISSIONS_INTAKE_YEAR", "2027");
        env::set_var("ADMISSIONS_TRANSITION_POLICY", "permissive");
        env::set_var("ADMISSIONS_SESSION_FILE", "/tmp/ism-session.json");
        env::set_var("ADMISSIONS_EMAIL_DOMAIN", "@etu.ism.sn");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        let admissions = config.admissions;
        assert_eq!(admissions.intake_year, 2027);
        assert_eq!(admissions.transition_policy, TransitionPolicy::Permissive);
        assert_eq!(
            admissions.session_file,
            Some(PathBuf::from("/tmp/ism-session.json"))
        );
        assert_eq!(admissions.email_domain, "etu.ism.sn");
        assert_eq!(admissions.settings().intake_year, 2027);
    }

    #[test]
    fn rejects_bad_policy_and_year() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMISSIONS_TRANSITION_POLICY", "lenient");
        let err = AppConfig::load().expect_err("unknown policy");
        assert!(matches!(err, ConfigError::InvalidTransitionPolicy(ref value) if value == "lenient"));

        reset_env();
        env::set_var("ADMISSIONS_INTAKE_YEAR", "26");
        let err = AppConfig::load().expect_err("two digit year");
        assert!(matches!(err, ConfigError::InvalidIntakeYear(_)));
        reset_env();
    }
}
