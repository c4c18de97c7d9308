pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod pipeline;
pub mod reporter;
pub mod scanner;
pub mod sink;

pub use auth::{Credential, CredentialGate, Validity};
pub use backend::{Backend, BackendClient};
pub use config::{ScanConfig, TestData, parse_headers};
pub use error::{ConfigError, ConfigValidationError, CredentialError, DeliveryError, EngineError};
pub use models::{Artifact, Finding, OutputFormat, RemotePath};
pub use pipeline::Pipeline;
pub use reporter::{ConsoleReporter, Outcome, exit_codes};
pub use scanner::{ApiSpec, OpenApiParser, ProbeEngine, ScanEngine};
pub use sink::{Delivery, ReportStatus, ResultSink, S3Uploader, Uploader};
