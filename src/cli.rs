use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "ackscan")]
#[command(version, about = "API security scan orchestrator")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the token, scan the API, store and deliver the results
    Scan(ScanArgs),

    /// Upload and report an existing result artifact without rescanning
    Upload(UploadArgs),

    /// Re-render a json or yaml artifact into another format
    Render {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value = "html")]
        format: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the operations found in an API specification
    Parse {
        #[arg(short, long)]
        spec: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Path or URL of the OpenAPI/Swagger specification
    #[arg(short, long)]
    pub file: String,

    /// Requests per second sent to the target API
    #[arg(long, visible_alias = "rl", default_value_t = 60.0, allow_negative_numbers = true)]
    pub rate_limit: f64,

    /// Only test paths matching this regex
    #[arg(long, visible_alias = "pr")]
    pub path_regex: Option<String>,

    /// Extra request headers, e.g. -H "User-Agent: ackscan"
    #[arg(short = 'H', long = "headers", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// YAML file with test data overrides
    #[arg(long, visible_alias = "tdc")]
    pub test_data_config: Option<PathBuf>,

    /// Result format: json, yaml, html or table
    #[arg(short = 'o', long, visible_alias = "output", default_value = "json")]
    pub format: String,

    /// Base URL of the target API, overriding the OpenAPI server entry
    #[arg(long)]
    pub target_url: Option<String>,

    /// Directory receiving result artifacts
    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    #[command(flatten)]
    pub delivery: DeliveryArgs,

    /// Maximum concurrent probe requests
    #[arg(short, long, default_value = "20")]
    pub concurrency: usize,

    /// Per-request timeout for probes, in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct DeliveryArgs {
    /// Scanner token for the backend; also sent to the target API
    #[arg(short, long, env = "ACKSCAN_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Object storage bucket receiving the artifact
    #[arg(short, long, env = "ACKSCAN_BUCKET")]
    pub bucket: Option<String>,

    /// Region of the bucket; defaults to the AWS environment
    #[arg(long)]
    pub region: Option<String>,

    /// Base URL of the backend
    #[arg(long, visible_alias = "bu", env = "ACKSCAN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Upload the artifact but do not report its location to the backend
    #[arg(long)]
    pub skip_report: bool,

    /// Exit non-zero when the report step fails or is skipped
    #[arg(long)]
    pub strict_delivery: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Existing json or yaml artifact
    #[arg(short, long)]
    pub artifact: PathBuf,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}
