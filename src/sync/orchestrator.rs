use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::{
    config::AppConfig,
    entities::{order, order_line, product},
    errors::ServiceError,
    sync::{
        client::{StorefrontClient, StorefrontCredentials, WarehouseClient, WarehouseCredentials},
        normalizer,
        writer::SyncWriter,
    },
};

/// Aggregate result of one bulk sync run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncReport {
    pub total_fetched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Pages through an upstream listing API, normalizing and upserting each
/// page independently. Page fetches are strictly sequential - page N+1 is
/// not requested until page N completes - to respect upstream rate limits.
#[derive(Clone)]
pub struct SyncService {
    writer: SyncWriter,
    page_size: u32,
    max_pages: u32,
    request_timeout: Duration,
}

impl SyncService {
    pub fn new(db: Arc<DatabaseConnection>, cfg: &AppConfig) -> Self {
        Self {
            writer: SyncWriter::new(db, cfg.upsert_chunk_size),
            page_size: cfg.sync_page_size,
            max_pages: cfg.sync_max_pages,
            request_timeout: Duration::from_secs(cfg.sync_request_timeout_secs),
        }
    }

    /// Full product catalog sync from the storefront.
    #[instrument(skip(self, creds))]
    pub async fn sync_products(
        &self,
        creds: &StorefrontCredentials,
    ) -> Result<SyncReport, ServiceError> {
        let client = StorefrontClient::new(creds, self.request_timeout)?;
        let mut report = SyncReport::default();

        for page in 1..=self.max_pages {
            let raw_page = match client.fetch_products_page(page, self.page_size).await {
                Ok(items) => items,
                Err(err) if page == 1 => return Err(err),
                Err(err) => {
                    // Mid-run fetch failure: keep what already committed and
                    // surface the partial counts instead of losing them.
                    warn!(page, error = %err, "Product page fetch failed, stopping early");
                    break;
                }
            };

            if raw_page.is_empty() {
                break;
            }
            report.total_fetched += raw_page.len();

            let now = Utc::now();
            let mut batch: Vec<product::Model> = Vec::with_capacity(raw_page.len());
            for item in &raw_page {
                match normalizer::normalize_product(item, now) {
                    Ok(model) => batch.push(model),
                    Err(err) => {
                        warn!(error = %err, "Skipping product that failed normalization");
                        report.failed += 1;
                    }
                }
            }

            let outcome = self.writer.upsert_products(&batch).await?;
            report.succeeded += outcome.succeeded;
            report.failed += outcome.failed;

            if page == self.max_pages {
                warn!(
                    max_pages = self.max_pages,
                    "Page ceiling reached before the upstream ran out of records"
                );
            }
        }

        info!(
            total = report.total_fetched,
            succeeded = report.succeeded,
            failed = report.failed,
            "Product sync finished"
        );
        Ok(report)
    }

    /// Full order sync from the warehouse system.
    #[instrument(skip(self, creds))]
    pub async fn sync_orders(
        &self,
        creds: &WarehouseCredentials,
    ) -> Result<SyncReport, ServiceError> {
        let client = WarehouseClient::new(creds, self.request_timeout)?;
        let mut report = SyncReport::default();

        for page in 1..=self.max_pages {
            let raw_page = match client.fetch_orders_page(page, self.page_size).await {
                Ok(items) => items,
                Err(err) if page == 1 => return Err(err),
                Err(err) => {
                    warn!(page, error = %err, "Order page fetch failed, stopping early");
                    break;
                }
            };

            if raw_page.is_empty() {
                break;
            }
            report.total_fetched += raw_page.len();

            let now = Utc::now();
            let mut batch: Vec<(order::Model, Vec<order_line::Model>)> =
                Vec::with_capacity(raw_page.len());
            for item in &raw_page {
                match normalizer::normalize_order(item, now) {
                    Ok(pair) => batch.push(pair),
                    Err(err) => {
                        warn!(error = %err, "Skipping order that failed normalization");
                        report.failed += 1;
                    }
                }
            }

            let outcome = self.writer.upsert_orders(&batch).await?;
            report.succeeded += outcome.succeeded;
            report.failed += outcome.failed;

            if page == self.max_pages {
                warn!(
                    max_pages = self.max_pages,
                    "Page ceiling reached before the upstream ran out of records"
                );
            }
        }

        info!(
            total = report.total_fetched,
            succeeded = report.succeeded,
            failed = report.failed,
            "Order sync finished"
        );
        Ok(report)
    }
}
