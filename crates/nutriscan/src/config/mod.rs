use crate::scoring::ScoringConfig;
use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ARTIFACT_DIR: &str = "model_training";
pub const DEFAULT_PRODUCT_API: &str = "https://world.openfoodfacts.org";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

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
    pub artifacts: ArtifactConfig,
    pub product_api: ProductApiConfig,
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
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let artifacts = ArtifactConfig {
            model_path: non_empty_path("MODEL_PATH"),
            encoder_path: non_empty_path("ENCODER_PATH"),
            artifact_dir: non_empty_path("MODEL_DIR")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_DIR)),
        };

        let timeout_secs = match env::var("OFF_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_LOOKUP_TIMEOUT_SECS,
        };
        let product_api = ProductApiConfig {
            base_url: env::var("OFF_BASE_URL").unwrap_or_else(|_| DEFAULT_PRODUCT_API.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let scoring = match non_empty_path("SCORING_RULES_PATH") {
            Some(path) => load_scoring_rules(path)?,
            None => ScoringConfig::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            artifacts,
            product_api,
            scoring,
        })
    }
}

fn non_empty_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn load_scoring_rules(path: PathBuf) -> Result<ScoringConfig, ConfigError> {
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::ScoringRulesIo {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ScoringRulesFormat { path, source })
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

/// Where to look for the classifier and label encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub model_path: Option<PathBuf>,
    pub encoder_path: Option<PathBuf>,
    pub artifact_dir: PathBuf,
}

/// OpenFoodFacts endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ProductApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PRODUCT_API.to_string(),
            timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidTimeout,
    ScoringRulesIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ScoringRulesFormat {
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
            ConfigError::InvalidTimeout => {
                write!(f, "OFF_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::ScoringRulesIo { path, .. } => write!(
                f,
                "SCORING_RULES_PATH {} could not be read",
                path.display()
            ),
            ConfigError::ScoringRulesFormat { path, source } => write!(
                f,
                "SCORING_RULES_PATH {} is not a valid rules document: {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::ScoringRulesIo { source, .. } => Some(source),
            ConfigError::ScoringRulesFormat { source, .. } => Some(source),
        }
    }
}
