use thiserror::Error;

/// Malformed or missing command-line input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required value for '{0}'")]
    Missing(&'static str),

    #[error("rate limit must be at least 0.001 requests per second, got {0}")]
    RateLimit(f64),

    #[error("invalid path regex '{pattern}': {reason}")]
    PathRegex { pattern: String, reason: String },

    #[error("malformed header '{entry}': {reason}")]
    Header { entry: String, reason: String },

    #[error("unknown output format '{0}' (expected json, yaml, html or table)")]
    Format(String),

    #[error("cannot read test data file {path}: {reason}")]
    TestDataFile { path: String, reason: String },

    #[error(transparent)]
    TestData(#[from] ConfigValidationError),

    #[error("cannot use artifact {path}: {reason}")]
    Artifact { path: String, reason: String },
}

/// Test-data file that was read but does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid test data at '{field}': {reason}")]
pub struct ConfigValidationError {
    pub field: String,
    pub reason: String,
}

impl ConfigValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CredentialError {
    #[error("no scanner token provided")]
    MissingToken,

    #[error("no backend base url provided")]
    MissingBackend,

    #[error("auth check request failed: {0}")]
    Transport(String),

    #[error("auth check returned an unreadable body: {0}")]
    MalformedResponse(String),

    #[error("token rejected by backend (status_code: {status_code:?}, msg: {msg:?})")]
    Rejected {
        status_code: Option<u16>,
        msg: Option<String>,
    },
}

/// Failures raised by the OpenAPI loader or the test engine. The pipeline passes
/// these through as-is.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("failed to load API specification: {0}")]
    Spec(String),

    #[error("test engine failed: {0}")]
    Execution(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryError {
    #[error("failed to write artifact {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("upload to bucket '{bucket}' failed: {reason}")]
    Upload { bucket: String, reason: String },

    #[error("result report refused: {0}")]
    NotAuthorized(String),

    #[error("result report failed: {0}")]
    Report(String),
}
