use serde::{Deserialize, Serialize};

use super::HttpMethod;

/// A single test record produced by a scan engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub test_name: String,
    pub method: HttpMethod,
    pub path: String,
    pub url: String,
    pub vulnerable: bool,
    pub description: String,
    #[serde(default)]
    pub responses: Vec<ResponseInfo>,
}

impl Finding {
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// What came back for one probe request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub label: String,
    pub status: u16,
    pub size: usize,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseInfo {
    pub fn new(label: impl Into<String>, status: u16, size: usize, duration_ms: u64) -> Self {
        Self {
            label: label.into(),
            status,
            size,
            duration_ms,
            error: None,
        }
    }

    pub fn error(label: impl Into<String>, err: String, duration_ms: u64) -> Self {
        Self {
            label: label.into(),
            status: 0,
            size: 0,
            duration_ms,
            error: Some(err),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub vulnerable: usize,
    pub errored: usize,
}

impl ScanSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        Self {
            total: findings.len(),
            vulnerable: findings.iter().filter(|f| f.vulnerable).count(),
            errored: findings
                .iter()
                .filter(|f| f.responses.iter().any(ResponseInfo::is_error))
                .count(),
        }
    }
}
