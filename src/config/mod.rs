mod headers;
mod test_data;

pub use headers::{parse_header, parse_headers};
pub use test_data::TestData;

use regex::Regex;
use reqwest::header::HeaderMap;
use std::path::PathBuf;

use crate::cli::{DeliveryArgs, ScanArgs};
use crate::error::ConfigError;
use crate::models::OutputFormat;

/// Slowest accepted rate: one request per 1000 seconds.
pub const MIN_RATE_LIMIT: f64 = 0.001;

/// Everything one scan run needs, resolved and checked up front.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub spec_source: String,
    pub rate_limit: f64,
    pub path_pattern: Option<Regex>,
    pub headers: HeaderMap,
    pub test_data: Option<TestData>,
    pub format: OutputFormat,
    pub target_url: Option<String>,
    pub results_dir: PathBuf,
    pub delivery: DeliveryConfig,
}

/// Backend and storage coordinates shared by `scan` and `upload`.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub token: String,
    pub base_url: String,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub report: bool,
    pub strict: bool,
}

impl ScanConfig {
    /// Reads nothing from the network. The test data file, if any, is read
    /// and validated here so a bad file stops the run before the auth check.
    pub fn resolve(args: &ScanArgs) -> Result<Self, ConfigError> {
        let spec_source = args.file.trim().to_string();
        if spec_source.is_empty() {
            return Err(ConfigError::Missing("file"));
        }

        if !(args.rate_limit.is_finite() && args.rate_limit >= MIN_RATE_LIMIT) {
            return Err(ConfigError::RateLimit(args.rate_limit));
        }

        let path_pattern = args
            .path_regex
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::PathRegex {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let headers = parse_headers(&args.headers)?;
        let format: OutputFormat = args.format.parse()?;

        let test_data = args
            .test_data_config
            .as_deref()
            .map(TestData::load)
            .transpose()?;

        Ok(Self {
            spec_source,
            rate_limit: args.rate_limit,
            path_pattern,
            headers,
            test_data,
            format,
            target_url: args.target_url.clone(),
            results_dir: args.results_dir.clone(),
            delivery: DeliveryConfig::resolve(&args.delivery),
        })
    }
}

impl DeliveryConfig {
    pub fn resolve(args: &DeliveryArgs) -> Self {
        Self {
            token: args.token.trim().to_string(),
            base_url: args.base_url.trim().trim_end_matches('/').to_string(),
            bucket: args
                .bucket
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
            region: args.region.clone(),
            report: !args.skip_report,
            strict: args.strict_delivery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DEFAULT_BASE_URL;
    use crate::error::ConfigValidationError;
    use std::io::Write;

    fn args() -> ScanArgs {
        ScanArgs {
            file: "openapi.json".into(),
            rate_limit: 60.0,
            path_regex: None,
            headers: Vec::new(),
            test_data_config: None,
            format: "json".into(),
            target_url: None,
            results_dir: PathBuf::from("results"),
            delivery: DeliveryArgs {
                token: "token".into(),
                bucket: Some("bucket".into()),
                region: None,
                base_url: format!("{}/", DEFAULT_BASE_URL),
                skip_report: false,
                strict_delivery: false,
            },
            concurrency: 20,
            timeout: 10,
        }
    }

    #[test]
    fn test_defaults_resolve() {
        let config = ScanConfig::resolve(&args()).unwrap();
        assert_eq!(config.rate_limit, 60.0);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.delivery.base_url, DEFAULT_BASE_URL);
        assert!(config.delivery.report);
        assert!(config.test_data.is_none());
    }

    #[test]
    fn test_out_of_range_rate_limit_is_rejected() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-20, 0.0009] {
            let mut a = args();
            a.rate_limit = rate;
            assert!(matches!(
                ScanConfig::resolve(&a),
                Err(ConfigError::RateLimit(_))
            ));
        }
    }

    #[test]
    fn test_slowest_rate_is_accepted() {
        let mut a = args();
        a.rate_limit = MIN_RATE_LIMIT;
        assert_eq!(ScanConfig::resolve(&a).unwrap().rate_limit, MIN_RATE_LIMIT);
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let mut a = args();
        a.path_regex = Some("/users/(".into());
        assert!(matches!(
            ScanConfig::resolve(&a),
            Err(ConfigError::PathRegex { .. })
        ));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let mut a = args();
        a.format = "pdf".into();
        assert_eq!(
            ScanConfig::resolve(&a).unwrap_err(),
            ConfigError::Format("pdf".into())
        );
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let mut a = args();
        a.headers = vec!["X-Ok: 1".into(), "broken".into()];
        assert!(matches!(
            ScanConfig::resolve(&a),
            Err(ConfigError::Header { .. })
        ));
    }

    #[test]
    fn test_blank_spec_source_is_missing() {
        let mut a = args();
        a.file = "  ".into();
        assert_eq!(
            ScanConfig::resolve(&a).unwrap_err(),
            ConfigError::Missing("file")
        );
    }

    #[test]
    fn test_blank_bucket_means_no_upload() {
        let mut a = args();
        a.delivery.bucket = Some(" ".into());
        let config = ScanConfig::resolve(&a).unwrap();
        assert!(config.delivery.bucket.is_none());
    }

    #[test]
    fn test_invalid_test_data_aborts_resolution() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unexpected: true").unwrap();

        let mut a = args();
        a.test_data_config = Some(file.path().to_path_buf());

        assert_eq!(
            ScanConfig::resolve(&a).unwrap_err(),
            ConfigError::TestData(ConfigValidationError::new(
                "unexpected",
                "unknown key, expected one of: headers, path_params, query_params, request_bodies"
            ))
        );
    }

    #[test]
    fn test_valid_test_data_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "path_params:\n  id: 7").unwrap();

        let mut a = args();
        a.test_data_config = Some(file.path().to_path_buf());

        let config = ScanConfig::resolve(&a).unwrap();
        assert_eq!(config.test_data.unwrap().path_params["id"], "7");
    }
}
