use crate::assessment::ThresholdTable;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub thresholds: ThresholdTable,
}

const THRESHOLD_FILE_VAR: &str = "OALA_THRESHOLDS_FILE";
const SINGLE_ASSET_VAR: &str = "OALA_SINGLE_ASSET_LIMIT";
const SINGLE_INCOME_VAR: &str = "OALA_SINGLE_INCOME_LIMIT";
const COUPLE_ASSET_VAR: &str = "OALA_COUPLE_ASSET_LIMIT";
const COUPLE_INCOME_VAR: &str = "OALA_COUPLE_INCOME_LIMIT";

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
            thresholds: load_thresholds()?,
        })
    }
}

/// Threshold table from `OALA_THRESHOLDS_FILE` (JSON) or the program-year
/// defaults, then per-limit environment overrides.
pub fn load_thresholds() -> Result<ThresholdTable, ConfigError> {
    let mut table = match env::var(THRESHOLD_FILE_VAR) {
        Ok(path) if !path.trim().is_empty() => read_threshold_file(PathBuf::from(path.trim()))?,
        _ => ThresholdTable::default(),
    };

    override_limit(&mut table.single.asset_limit, SINGLE_ASSET_VAR)?;
    override_limit(&mut table.single.income_limit, SINGLE_INCOME_VAR)?;
    override_limit(&mut table.couple.asset_limit, COUPLE_ASSET_VAR)?;
    override_limit(&mut table.couple.income_limit, COUPLE_INCOME_VAR)?;

    for (variable, limit) in [
        (SINGLE_ASSET_VAR, table.single.asset_limit),
        (SINGLE_INCOME_VAR, table.single.income_limit),
        (COUPLE_ASSET_VAR, table.couple.asset_limit),
        (COUPLE_INCOME_VAR, table.couple.income_limit),
    ] {
        if !(limit.is_finite() && limit >= 0.0) {
            return Err(ConfigError::InvalidThreshold {
                variable,
                value: limit.to_string(),
            });
        }
    }

    Ok(table)
}

fn read_threshold_file(path: PathBuf) -> Result<ThresholdTable, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::ThresholdFile {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ThresholdFormat { path, source })
}

fn override_limit(slot: &mut f64, variable: &'static str) -> Result<(), ConfigError> {
    let Ok(raw) = env::var(variable) else {
        return Ok(());
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => {
            *slot = value;
            Ok(())
        }
        _ => Err(ConfigError::InvalidThreshold {
            variable,
            value: raw,
        }),
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidThreshold {
        variable: &'static str,
        value: String,
    },
    ThresholdFile {
        path: PathBuf,
        source: std::io::Error,
    },
    ThresholdFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { variable, value } => write!(
                f,
                "{variable} must be a non-negative amount (found '{value}')"
            ),
            ConfigError::ThresholdFile { path, .. } => {
                write!(f, "unable to read threshold table {}", path.display())
            }
            ConfigError::ThresholdFormat { path, .. } => {
                write!(f, "threshold table {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidThreshold { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::ThresholdFile { source, .. } => Some(source),
            ConfigError::ThresholdFormat { source, .. } => Some(source),
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
        for variable in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            THRESHOLD_FILE_VAR,
            SINGLE_ASSET_VAR,
            SINGLE_INCOME_VAR,
            COUPLE_ASSET_VAR,
            COUPLE_INCOME_VAR,
        ] {
            env::remove_var(variable);
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
        assert_eq!(config.thresholds, ThresholdTable::program_year_2025());
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
    fn threshold_overrides_replace_individual_limits() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var(SINGLE_ASSET_VAR, "420000");
        env::set_var(COUPLE_INCOME_VAR, " 17000 ");

        let table = load_thresholds().expect("overrides parse");
        assert_eq!(table.single.asset_limit, 420_000.0);
        assert_eq!(table.single.income_limit, 10_770.0);
        assert_eq!(table.couple.asset_limit, 616_000.0);
        assert_eq!(table.couple.income_limit, 17_000.0);
        reset_env();
    }

    #[test]
    fn rejects_negative_or_garbage_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var(SINGLE_INCOME_VAR, "-5");
        match load_thresholds() {
            Err(ConfigError::InvalidThreshold { variable, .. }) => {
                assert_eq!(variable, SINGLE_INCOME_VAR)
            }
            other => panic!("expected invalid threshold, got {other:?}"),
        }

        env::set_var(SINGLE_INCOME_VAR, "lots");
        assert!(matches!(
            load_thresholds(),
            Err(ConfigError::InvalidThreshold { .. })
        ));
        reset_env();
    }

    #[test]
    fn threshold_file_replaces_program_year_table() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        let path = env::temp_dir().join(format!("oala-thresholds-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "program_year": "2026/27",
                "single": { "asset_limit": 415000, "income_limit": 11000 },
                "couple": { "asset_limit": 630000, "income_limit": 16800 }
            }"#,
        )
        .expect("write threshold file");
        env::set_var(THRESHOLD_FILE_VAR, &path);

        let table = load_thresholds().expect("threshold file loads");
        assert_eq!(table.program_year, "2026/27");
        assert_eq!(table.single.asset_limit, 415_000.0);
        assert_eq!(table.couple.income_limit, 16_800.0);

        std::fs::remove_file(&path).ok();
        reset_env();
    }

    #[test]
    fn missing_threshold_file_is_reported() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var(THRESHOLD_FILE_VAR, "/nonexistent/oala-thresholds.json");

        assert!(matches!(
            load_thresholds(),
            Err(ConfigError::ThresholdFile { .. })
        ));
        reset_env();
    }
}
