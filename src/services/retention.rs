//! Deletes orders whose status has left the active set, bounding storage
//! growth. Safe to run repeatedly from a scheduler.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    entities::{order, order_line},
    errors::ServiceError,
    models::status::ONGOING_STATUSES,
};

/// How many affected records the audit log samples per sweep.
const AUDIT_SAMPLE_CAP: usize = 20;

/// Snapshot of an order removed by the sweep, echoed back for audit.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweptOrder {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub total_value: Decimal,
}

#[derive(Debug, Default, Serialize)]
pub struct SweepOutcome {
    pub deleted_count: u64,
    pub orders_deleted: Vec<SweptOrder>,
    /// True when there was nothing to delete - the second run of the day
    /// reports this rather than an error.
    pub already_clean: bool,
}

#[derive(Clone)]
pub struct RetentionService {
    db: Arc<DatabaseConnection>,
}

impl RetentionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Select candidates, log a per-status breakdown plus a capped sample,
    /// delete with the same predicate, then re-check that nothing matching
    /// remains. A non-zero remainder is only a warning: a concurrent insert
    /// during the sweep window is expected and tolerable.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> Result<SweepOutcome, ServiceError> {
        let db = &*self.db;

        let candidates = order::Entity::find()
            .filter(order::Column::Status.is_not_in(ONGOING_STATUSES))
            .all(db)
            .await?;

        if candidates.is_empty() {
            info!("Retention sweep found nothing to delete; store already clean");
            return Ok(SweepOutcome {
                already_clean: true,
                ..Default::default()
            });
        }

        let mut breakdown: BTreeMap<&str, usize> = BTreeMap::new();
        for candidate in &candidates {
            *breakdown.entry(candidate.status.as_str()).or_default() += 1;
        }
        info!(
            total = candidates.len(),
            breakdown = ?breakdown,
            "Retention sweep selected orders outside the keep-set"
        );
        for candidate in candidates.iter().take(AUDIT_SAMPLE_CAP) {
            info!(
                order_id = candidate.id,
                order_number = %candidate.order_number,
                status = %candidate.status,
                "Sweeping order"
            );
        }

        let swept: Vec<SweptOrder> = candidates
            .iter()
            .map(|o| SweptOrder {
                id: o.id,
                order_number: o.order_number.clone(),
                customer_name: o.customer_name.clone(),
                status: o.status.clone(),
                total_value: o.total_value,
            })
            .collect();

        // Owned lines go first so the order delete never strands them.
        let candidate_ids: Vec<i64> = candidates.iter().map(|o| o.id).collect();
        order_line::Entity::delete_many()
            .filter(order_line::Column::OrderId.is_in(candidate_ids))
            .exec(db)
            .await?;

        let deleted = order::Entity::delete_many()
            .filter(order::Column::Status.is_not_in(ONGOING_STATUSES))
            .exec(db)
            .await?;

        // Best-effort verification with the same predicate.
        let remaining = order::Entity::find()
            .filter(order::Column::Status.is_not_in(ONGOING_STATUSES))
            .count(db)
            .await?;
        if remaining > 0 {
            warn!(
                remaining,
                "Orders outside the keep-set remain after sweep (likely inserted concurrently)"
            );
        }

        info!(deleted = deleted.rows_affected, "Retention sweep complete");

        Ok(SweepOutcome {
            deleted_count: deleted.rows_affected,
            orders_deleted: swept,
            already_clean: false,
        })
    }
}
