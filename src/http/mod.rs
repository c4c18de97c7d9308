mod client;

pub use client::{HttpClient, Probe};
