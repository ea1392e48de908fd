use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_STORE_DIR: &str = "data/cv";
const DEFAULT_MAX_DOCUMENT_MB: u64 = 10;

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
    pub cv: CvConfig,
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

        let cv = CvConfig::from_env(environment)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            cv,
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

/// Which CV provider backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CvStoreBackend {
    /// In-process mock store, lost on restart.
    Memory,
    /// One JSON document per tenant under `dir`.
    File { dir: PathBuf },
}

/// CV storage and upload settings.
#[derive(Debug, Clone)]
pub struct CvConfig {
    pub store: CvStoreBackend,
    pub max_document_bytes: u64,
    pub seed_demo_data: bool,
}

impl CvConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let store = match env::var("CV_STORE")
            .unwrap_or_else(|_| "memory".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" | "mock" => CvStoreBackend::Memory,
            "file" | "json" => CvStoreBackend::File {
                dir: PathBuf::from(
                    env::var("CV_STORE_DIR").unwrap_or_else(|_| DEFAULT_STORE_DIR.to_string()),
                ),
            },
            other => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let max_document_mb = match env::var("CV_MAX_DOCUMENT_MB") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|mb| *mb > 0)
                .ok_or(ConfigError::InvalidDocumentLimit)?,
            Err(_) => DEFAULT_MAX_DOCUMENT_MB,
        };

        let seed_demo_data = match env::var("CV_SEED_DEMO") {
            Ok(raw) => matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            Err(_) => environment != AppEnvironment::Production,
        };

        let max_document_bytes = max_document_mb
            .checked_mul(1024 * 1024)
            .ok_or(ConfigError::InvalidDocumentLimit)?;

        Ok(Self {
            store,
            max_document_bytes,
            seed_demo_data,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownStore(String),
    InvalidDocumentLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownStore(value) => {
                write!(f, "CV_STORE must be 'memory' or 'file' (found '{value}')")
            }
            ConfigError::InvalidDocumentLimit => {
                write!(f, "CV_MAX_DOCUMENT_MB must be a positive whole number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownStore(_)
            | ConfigError::InvalidDocumentLimit => None,
        }
    }
}
