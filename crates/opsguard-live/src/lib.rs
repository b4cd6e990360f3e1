//! Optional live data source for the dashboard.

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod seed;

pub use adapter::{apply_result, ErrorHotspot, LiveDataAdapter, LiveSnapshot, REFRESH_PERIOD};
pub use client::{BulkOutcome, EsClient, EsqlResponse, IndexCount, QueryBackend};
pub use config::{IndexNames, LiveConfig};
pub use error::LiveError;
pub use seed::{IndexSeedResult, SeedData};

/// Adapter wired to the HTTP client for a resolved config.
pub fn connect(config: &LiveConfig) -> Result<LiveDataAdapter<EsClient>, LiveError> {
    let client = EsClient::new(config)?;
    Ok(LiveDataAdapter::new(client, config.indices.clone()))
}
