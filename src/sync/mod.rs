pub mod client;
pub mod normalizer;
pub mod orchestrator;
pub mod writer;

pub use client::{
    normalize_store_url, StorefrontClient, StorefrontCredentials, WarehouseClient,
    WarehouseCredentials, INTEGRATION_STOREFRONT, INTEGRATION_WAREHOUSE,
};
pub use orchestrator::{SyncReport, SyncService};
pub use writer::{BatchFailure, BatchOutcome, SyncWriter};
