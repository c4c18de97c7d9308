use crate::error::{ConfigError, CredentialError, DeliveryError, EngineError};
use crate::models::Artifact;
use crate::sink::{Delivery, ReportStatus};

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const INTERNAL_ERROR: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const CREDENTIAL_ERROR: i32 = 3;
    pub const ENGINE_ERROR: i32 = 4;
    pub const DELIVERY_ERROR: i32 = 5;
    pub const REPORT_ERROR: i32 = 6;
}

/// Terminal state of one run.
#[derive(Debug, Clone)]
pub enum Outcome {
    ConfigInvalid(ConfigError),
    CredentialInvalid(CredentialError),
    EngineFailed(EngineError),
    /// The engine returned no result set at all.
    NoResults,
    WriteFailed(DeliveryError),
    Completed {
        findings: usize,
        vulnerable: usize,
        artifact: Artifact,
        delivery: Delivery,
        strict: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Failure,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::ConfigInvalid(_) => exit_codes::CONFIG_ERROR,
            Outcome::CredentialInvalid(_) => exit_codes::CREDENTIAL_ERROR,
            Outcome::EngineFailed(_) => exit_codes::ENGINE_ERROR,
            Outcome::NoResults => exit_codes::SUCCESS,
            Outcome::WriteFailed(_) => exit_codes::DELIVERY_ERROR,
            Outcome::Completed {
                delivery, strict, ..
            } => match delivery {
                Delivery::LocalOnly => exit_codes::SUCCESS,
                Delivery::UploadFailed(_) => exit_codes::DELIVERY_ERROR,
                Delivery::Uploaded {
                    report: ReportStatus::Reported,
                    ..
                } => exit_codes::SUCCESS,
                Delivery::Uploaded { .. } if *strict => exit_codes::REPORT_ERROR,
                Delivery::Uploaded { .. } => exit_codes::SUCCESS,
            },
        }
    }

    /// Human-readable lines, most important first.
    pub fn lines(&self) -> Vec<(Tone, String)> {
        match self {
            Outcome::ConfigInvalid(e) => vec![(Tone::Failure, format!("Invalid configuration: {}", e))],
            Outcome::CredentialInvalid(e) => {
                vec![(Tone::Failure, format!("Invalid token: {}", e))]
            }
            Outcome::EngineFailed(e) => vec![(Tone::Failure, format!("Scan failed: {}", e))],
            Outcome::NoResults => vec![(
                Tone::Warning,
                "Scan completed: no results were produced".to_string(),
            )],
            Outcome::WriteFailed(e) => {
                vec![(Tone::Failure, format!("Could not store results: {}", e))]
            }
            Outcome::Completed {
                findings,
                vulnerable,
                artifact,
                delivery,
                strict,
            } => {
                let mut lines = Vec::new();

                if *findings == 0 {
                    lines.push((
                        Tone::Warning,
                        "Scan completed: no findings reported".to_string(),
                    ));
                } else {
                    lines.push((
                        Tone::Success,
                        format!(
                            "Scan completed: {} results captured, {} vulnerable",
                            findings, vulnerable
                        ),
                    ));
                }
                lines.push((Tone::Success, format!("Local results: {}", artifact)));

                match delivery {
                    Delivery::LocalOnly => {}
                    Delivery::UploadFailed(e) => {
                        lines.push((Tone::Failure, format!("Upload failed: {}", e)));
                    }
                    Delivery::Uploaded { remote, report } => {
                        lines.push((Tone::Success, format!("Remote results: {}", remote)));
                        let tone = if *strict { Tone::Failure } else { Tone::Warning };
                        match report {
                            ReportStatus::Reported => lines.push((
                                Tone::Success,
                                "Result location reported to backend".to_string(),
                            )),
                            ReportStatus::Skipped => lines.push((
                                tone,
                                "Result location not reported to backend (skipped)".to_string(),
                            )),
                            ReportStatus::Failed(e) => {
                                lines.push((tone, format!("Failed to report result location: {}", e)))
                            }
                        }
                    }
                }

                lines
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutputFormat, RemotePath};

    fn completed(delivery: Delivery, strict: bool) -> Outcome {
        Outcome::Completed {
            findings: 2,
            vulnerable: 1,
            artifact: Artifact::new("results/a.json", OutputFormat::Json),
            delivery,
            strict,
        }
    }

    fn uploaded(report: ReportStatus) -> Delivery {
        Delivery::Uploaded {
            remote: RemotePath::new("bucket", "results/a.json"),
            report,
        }
    }

    #[test]
    fn test_exit_codes() {
        let report_failed = ReportStatus::Failed(DeliveryError::Report("500".into()));
        let upload_failed = Delivery::UploadFailed(DeliveryError::Upload {
            bucket: "b".into(),
            reason: "denied".into(),
        });

        assert_eq!(Outcome::ConfigInvalid(ConfigError::RateLimit(0.0)).exit_code(), 2);
        assert_eq!(Outcome::CredentialInvalid(CredentialError::MissingToken).exit_code(), 3);
        assert_eq!(Outcome::EngineFailed(EngineError::Spec("x".into())).exit_code(), 4);
        assert_eq!(Outcome::NoResults.exit_code(), 0);
        assert_eq!(completed(upload_failed, false).exit_code(), 5);
        assert_eq!(completed(Delivery::LocalOnly, true).exit_code(), 0);
        assert_eq!(completed(uploaded(ReportStatus::Reported), true).exit_code(), 0);
        assert_eq!(completed(uploaded(report_failed.clone()), false).exit_code(), 0);
        assert_eq!(completed(uploaded(report_failed), true).exit_code(), 6);
        assert_eq!(completed(uploaded(ReportStatus::Skipped), true).exit_code(), 6);
    }

    #[test]
    fn test_full_success_surfaces_both_paths() {
        let lines = completed(uploaded(ReportStatus::Reported), false).lines();
        let text: Vec<&str> = lines.iter().map(|(_, l)| l.as_str()).collect();

        assert!(text.contains(&"Local results: results/a.json"));
        assert!(text.contains(&"Remote results: s3://bucket/results/a.json"));
    }

    #[test]
    fn test_no_results_and_no_findings_read_differently() {
        let absent = Outcome::NoResults.lines();
        let empty = Outcome::Completed {
            findings: 0,
            vulnerable: 0,
            artifact: Artifact::new("results/a.json", OutputFormat::Json),
            delivery: Delivery::LocalOnly,
            strict: false,
        }
        .lines();

        assert_ne!(absent[0].1, empty[0].1);
        assert!(empty[0].1.contains("no findings"));
    }
}
