//! Custom error types for the report pipeline.
//!
//! The error taxonomy follows the pipeline stages: ingestion, chart/summary
//! rendering, the remote insight call, and document writing. Every variant
//! preserves the underlying driver or library message rather than swallowing
//! it, and none of them is retried internally.
//!
//! Errors are serializable as `{code, message}` so a calling layer can route
//! them to user-visible messaging without string matching.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Source bytes could not be parsed into a tabular structure.
    #[error("Malformed {format} source: {reason}")]
    MalformedSource { format: String, reason: String },

    /// A database connection string was invalid or the database could not be opened.
    #[error("Connection failed for '{target}': {reason}")]
    ConnectionFailed { target: String, reason: String },

    /// A SQL query failed to execute.
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Summary computation failed.
    #[error("Failed to summarize dataset: {0}")]
    SummaryFailed(String),

    /// Chart rendering failed.
    #[error("Failed to render chart '{chart}': {reason}")]
    ChartRenderFailed { chart: String, reason: String },

    /// The remote insight service call failed (network, auth, quota).
    #[error("Insight service error: {0}")]
    RemoteService(String),

    /// Document assembly failed before anything was written.
    #[error("Failed to compose document: {0}")]
    DocumentComposeFailed(String),

    /// Writing a finished document to disk failed.
    #[error("Failed to write output '{path}': {reason}")]
    OutputWrite { path: String, reason: String },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// SQLite driver error wrapper.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (for the insight client, only with the "ai" feature).
    #[cfg(feature = "ai")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for caller-side handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedSource { .. } => "MALFORMED_SOURCE",
            Self::ConnectionFailed { .. } => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::SummaryFailed(_) => "SUMMARY_FAILED",
            Self::ChartRenderFailed { .. } => "CHART_RENDER_FAILED",
            Self::RemoteService(_) => "REMOTE_SERVICE_ERROR",
            Self::DocumentComposeFailed(_) => "DOCUMENT_COMPOSE_FAILED",
            Self::OutputWrite { .. } => "OUTPUT_WRITE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "ai")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check whether this error originated in the ingestion layer.
    pub fn is_ingest_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedSource { .. } | Self::ConnectionFailed { .. } | Self::QueryFailed(_)
        ) || matches!(self, Self::WithContext { source, .. } if source.is_ingest_error())
    }

    /// Check whether this error occurred while writing an output document.
    pub fn is_output_error(&self) -> bool {
        matches!(self, Self::OutputWrite { .. })
            || matches!(self, Self::WithContext { source, .. } if source.is_output_error())
    }
}

/// Serialize implementation exposing `{code, message}` to calling layers.
impl Serialize for ReportError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ReportError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for report pipeline operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReportError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ReportError::QueryFailed("no such table".into()).error_code(),
            "QUERY_FAILED"
        );
        assert_eq!(
            ReportError::ColumnNotFound("price".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_ingest_error() {
        assert!(ReportError::MalformedSource {
            format: "csv".into(),
            reason: "bad header".into()
        }
        .is_ingest_error());
        assert!(!ReportError::RemoteService("timeout".into()).is_ingest_error());
    }

    #[test]
    fn test_is_output_error_through_context() {
        let err = ReportError::OutputWrite {
            path: "/nope/report.docx".into(),
            reason: "permission denied".into(),
        }
        .with_context("writing slide deck");
        assert!(err.is_output_error());
        assert_eq!(err.error_code(), "OUTPUT_WRITE_ERROR");
    }

    #[test]
    fn test_error_serialization() {
        let error = ReportError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context_preserves_code() {
        let error = ReportError::QueryFailed("syntax error".into()).with_context("during ingest");
        assert!(error.to_string().contains("during ingest"));
        assert_eq!(error.error_code(), "QUERY_FAILED");
    }
}
