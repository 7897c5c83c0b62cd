use crate::config::ConfigError;
use crate::render::{ConvertError, RenderError};
use crate::sources::{PeriodQueryError, SourceError, UploadError};
use crate::statistics::StatisticsError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Source(SourceError),
    Statistics(StatisticsError),
    Upload(UploadError),
    Query(PeriodQueryError),
    Render(RenderError),
    Convert(ConvertError),
    Serialize(serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Upload(_) | AppError::Query(_) => StatusCode::BAD_REQUEST,
            AppError::Convert(
                ConvertError::MissingFile | ConvertError::EmptyFileName | ConvertError::NotPdf,
            ) => StatusCode::BAD_REQUEST,
            AppError::Convert(ConvertError::NoText | ConvertError::Extract(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Convert(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Source(SourceError::MissingApiKey) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Source(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Statistics(_)
            | AppError::Render(_)
            | AppError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Source(err) => write!(f, "data source error: {}", err),
            AppError::Statistics(err) => write!(f, "statistics error: {}", err),
            AppError::Upload(err) => write!(f, "{}", err),
            AppError::Query(err) => write!(f, "invalid period: {}", err),
            AppError::Render(err) => write!(f, "render error: {}", err),
            AppError::Convert(err) => write!(f, "{}", err),
            AppError::Serialize(err) => write!(f, "serialization error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Source(err) => Some(err),
            AppError::Statistics(err) => Some(err),
            AppError::Upload(err) => Some(err),
            AppError::Query(err) => Some(err),
            AppError::Render(err) => Some(err),
            AppError::Convert(err) => Some(err),
            AppError::Serialize(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<SourceError> for AppError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<StatisticsError> for AppError {
    fn from(value: StatisticsError) -> Self {
        Self::Statistics(value)
    }
}

impl From<UploadError> for AppError {
    fn from(value: UploadError) -> Self {
        Self::Upload(value)
    }
}

impl From<PeriodQueryError> for AppError {
    fn from(value: PeriodQueryError) -> Self {
        Self::Query(value)
    }
}

impl From<RenderError> for AppError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

impl From<ConvertError> for AppError {
    fn from(value: ConvertError) -> Self {
        Self::Convert(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
