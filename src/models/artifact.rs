use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Html,
    Table,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Html => "html",
            OutputFormat::Table => "txt",
        }
    }

    /// Json and yaml artifacts can be loaded back; html and table are for people.
    pub fn is_readable(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "html" | "htm" => Some(OutputFormat::Html),
            "txt" => Some(OutputFormat::Table),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Html => "html",
            OutputFormat::Table => "table",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "html" => Ok(OutputFormat::Html),
            "table" => Ok(OutputFormat::Table),
            _ => Err(ConfigError::Format(s.to_string())),
        }
    }
}

/// The on-disk result file of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Picks a fresh file name under `dir`. The name is built only from the
    /// clock and a random uuid, never from operator input.
    pub fn allocate(dir: &Path, format: OutputFormat) -> Self {
        let name = format!(
            "{}-{}-ackscan-result.{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4().simple(),
            format.extension()
        );
        Self::new(dir.join(name), format)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePath {
    pub bucket: String,
    pub key: String,
}

impl RemotePath {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bucket.is_empty() || self.key.is_empty()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocated_names_do_not_collide() {
        let dir = Path::new("results");
        let a = Artifact::allocate(dir, OutputFormat::Json);
        let b = Artifact::allocate(dir, OutputFormat::Json);

        assert_ne!(a.path, b.path);
        assert!(a.path.starts_with("results"));
        assert!(a.path.to_string_lossy().ends_with("-ackscan-result.json"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!(
            "xml".parse::<OutputFormat>(),
            Err(ConfigError::Format("xml".to_string()))
        );
    }

    #[test]
    fn test_remote_path_display() {
        let remote = RemotePath::new("bucket", "results/abc.json");
        assert_eq!(remote.to_string(), "s3://bucket/results/abc.json");
        assert!(!remote.is_empty());
        assert!(RemotePath::new("bucket", "").is_empty());
    }
}
