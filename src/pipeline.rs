use tracing::{error, info, warn};

use crate::auth::CredentialGate;
use crate::backend::Backend;
use crate::cli::{ScanArgs, UploadArgs};
use crate::config::{DeliveryConfig, ScanConfig};
use crate::error::ConfigError;
use crate::models::{Artifact, OutputFormat};
use crate::reporter::{Outcome, load_artifact};
use crate::scanner::{OpenApiParser, ScanDriver, ScanEngine};
use crate::sink::{ResultSink, Uploader};

/// Runs config resolution, the credential check, the scan and delivery in
/// order. Each stage runs only if the previous one succeeded.
pub struct Pipeline<B, E, U> {
    backend: B,
    engine: E,
    uploader: U,
    parser: OpenApiParser,
}

impl<B: Backend, E: ScanEngine, U: Uploader> Pipeline<B, E, U> {
    pub fn new(backend: B, engine: E, uploader: U, parser: OpenApiParser) -> Self {
        Self {
            backend,
            engine,
            uploader,
            parser,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub async fn scan(&self, args: &ScanArgs) -> Outcome {
        match ScanConfig::resolve(args) {
            Ok(config) => self.run(&config).await,
            Err(e) => {
                error!(stage = "config", "{}", e);
                Outcome::ConfigInvalid(e)
            }
        }
    }

    pub async fn run(&self, config: &ScanConfig) -> Outcome {
        let delivery = &config.delivery;

        let mut gate = CredentialGate::new(&self.backend, &delivery.base_url, &delivery.token);
        if let Err(e) = gate.validate().await {
            error!(stage = "credential", "{}", e);
            return Outcome::CredentialInvalid(e);
        }

        let artifact = Artifact::allocate(&config.results_dir, config.format);
        let driver = ScanDriver::new(&self.engine, &self.parser);

        let findings = match driver.drive(config, gate.credential(), &artifact).await {
            Ok(Some(findings)) => findings,
            Ok(None) => {
                warn!(stage = "scan", "scan completed without results");
                return Outcome::NoResults;
            }
            Err(e) => {
                error!(stage = "scan", "{}", e);
                return Outcome::EngineFailed(e);
            }
        };
        info!(findings = findings.len(), "scan completed, results captured");

        let sink = ResultSink::new(
            &self.uploader,
            &gate,
            delivery.bucket.as_deref(),
            delivery.report,
        );

        match sink.store(&artifact, &findings).await {
            Ok(outcome) => Outcome::Completed {
                findings: findings.len(),
                vulnerable: findings.iter().filter(|f| f.vulnerable).count(),
                artifact,
                delivery: outcome,
                strict: delivery.strict,
            },
            Err(e) => Outcome::WriteFailed(e),
        }
    }

    /// Delivers an artifact from an earlier run without scanning again.
    /// Without a bucket this is a config error and nothing is contacted.
    pub async fn redeliver(&self, args: &UploadArgs) -> Outcome {
        let delivery = DeliveryConfig::resolve(&args.delivery);
        if delivery.bucket.is_none() {
            let e = ConfigError::Missing("bucket");
            error!(stage = "config", "{}", e);
            return Outcome::ConfigInvalid(e);
        }

        let path = &args.artifact;
        let format = OutputFormat::from_path(path).unwrap_or_default();

        let findings = match load_artifact(path) {
            Ok(findings) => findings,
            Err(e) => {
                let e = ConfigError::Artifact {
                    path: path.display().to_string(),
                    reason: format!("{:#}", e),
                };
                error!(stage = "config", "{}", e);
                return Outcome::ConfigInvalid(e);
            }
        };

        let mut gate = CredentialGate::new(&self.backend, &delivery.base_url, &delivery.token);
        if let Err(e) = gate.validate().await {
            error!(stage = "credential", "{}", e);
            return Outcome::CredentialInvalid(e);
        }

        let artifact = Artifact::new(path.clone(), format);
        let sink = ResultSink::new(
            &self.uploader,
            &gate,
            delivery.bucket.as_deref(),
            delivery.report,
        );

        Outcome::Completed {
            findings: findings.len(),
            vulnerable: findings.iter().filter(|f| f.vulnerable).count(),
            delivery: sink.deliver(&artifact).await,
            artifact,
            strict: delivery.strict,
        }
    }
}
