mod artifact;
mod endpoint;
mod finding;

pub use artifact::{Artifact, OutputFormat, RemotePath};
pub use endpoint::{Endpoint, HttpMethod, ParamType, PathParam};
pub use finding::{Finding, ResponseInfo, ScanSummary};
