mod driver;
mod endpoint;
mod engine;
mod openapi;
mod rate;

pub use driver::{EngineRequest, ScanDriver, ScanEngine};
pub use endpoint::EndpointParser;
pub use engine::{ProbeEngine, UNAUTHENTICATED_ACCESS};
pub use openapi::{ApiSpec, OpenApiParser};
pub use rate::RateLimiter;
