use crate::sources::kosis::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::sources::workbook::DEFAULT_SHEET;
use crate::table::{IndexLayout, DEFAULT_TOTAL_INDEX_LABEL};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8889;
pub const DEFAULT_DATASET_PATH: &str =
    "지출목적별_소비자물가지수_품목포함__2020100__20251106131304.xlsx";
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 16 * 1024 * 1024;

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
    pub dataset: DatasetConfig,
    pub kosis: KosisConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => DEFAULT_PORT,
        };

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let sheet = var_or("CPI_DATASET_SHEET", DEFAULT_SHEET);
        let dataset = DatasetConfig {
            path: PathBuf::from(var_or("CPI_DATASET_PATH", DEFAULT_DATASET_PATH)),
            sheet: Some(sheet).filter(|sheet| !sheet.trim().is_empty()),
            total_index_label: var_or("CPI_TOTAL_INDEX_LABEL", DEFAULT_TOTAL_INDEX_LABEL),
        };

        let kosis = KosisConfig {
            api_url: var_or("KOSIS_API_URL", DEFAULT_API_URL),
            api_key: env::var("KOSIS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout: match env::var("KOSIS_TIMEOUT_SECS") {
                Ok(raw) => Duration::from_secs(parse_number("KOSIS_TIMEOUT_SECS", &raw)?),
                Err(_) => DEFAULT_TIMEOUT,
            },
        };

        let upload = UploadConfig {
            max_bytes: match env::var("UPLOAD_MAX_BYTES") {
                Ok(raw) => parse_number("UPLOAD_MAX_BYTES", &raw)?,
                Err(_) => DEFAULT_UPLOAD_MAX_BYTES,
            },
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            dataset,
            kosis,
            upload,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
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

/// The bundled price-index workbook.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub sheet: Option<String>,
    pub total_index_label: String,
}

impl DatasetConfig {
    pub fn layout(&self) -> IndexLayout {
        IndexLayout {
            total_index_label: self.total_index_label.clone(),
            ..IndexLayout::default()
        }
    }
}

/// KOSIS open API access.
#[derive(Debug, Clone)]
pub struct KosisConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a non-negative integer, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
