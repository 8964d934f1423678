use metrics::counter;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument, warn};

use crate::{
    entities::{order, order_line, product},
    errors::ServiceError,
};

/// One failed chunk: where it sat in the batch, what storage said, and which
/// records were in it.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub chunk_index: usize,
    pub error: String,
    pub record_ids: Vec<String>,
}

/// Aggregate result of a chunked batch write. Partial failure is data, not
/// an error: orchestration continues past failed chunks by construction.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<BatchFailure>,
}

/// Connection-level failures abort the whole batch; anything else is local
/// to its chunk.
fn is_connectivity_error(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// Writes canonical records keyed by their external natural id. A record
/// whose key already exists is fully replaced, not merged.
#[derive(Clone)]
pub struct SyncWriter {
    db: Arc<DatabaseConnection>,
    chunk_size: usize,
}

impl SyncWriter {
    pub fn new(db: Arc<DatabaseConnection>, chunk_size: usize) -> Self {
        Self {
            db,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Upsert a batch of products in chunks. A malformed record poisons only
    /// its own chunk; the other chunks still commit.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn upsert_products(
        &self,
        records: &[product::Model],
    ) -> Result<BatchOutcome, ServiceError> {
        let mut outcome = BatchOutcome::default();

        for (chunk_index, chunk) in records.chunks(self.chunk_size).enumerate() {
            match self.upsert_product_chunk(chunk).await {
                Ok(()) => outcome.succeeded += chunk.len(),
                Err(err) if is_connectivity_error(&err) => {
                    error!(error = %err, "Storage unreachable, aborting batch");
                    return Err(ServiceError::StorageError(err));
                }
                Err(err) => {
                    warn!(chunk_index, error = %err, "Product chunk failed, continuing");
                    counter!("logisync_sync.chunks_failed", 1);
                    outcome.failed += chunk.len();
                    outcome.failures.push(BatchFailure {
                        chunk_index,
                        error: err.to_string(),
                        record_ids: chunk.iter().map(|p| p.id.to_string()).collect(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Upsert a batch of orders (each with its owned lines) in chunks.
    /// Replacing an order also replaces its line set: lines removed upstream
    /// disappear here too.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn upsert_orders(
        &self,
        records: &[(order::Model, Vec<order_line::Model>)],
    ) -> Result<BatchOutcome, ServiceError> {
        let mut outcome = BatchOutcome::default();

        for (chunk_index, chunk) in records.chunks(self.chunk_size).enumerate() {
            match self.upsert_order_chunk(chunk).await {
                Ok(()) => outcome.succeeded += chunk.len(),
                Err(err) if is_connectivity_error(&err) => {
                    error!(error = %err, "Storage unreachable, aborting batch");
                    return Err(ServiceError::StorageError(err));
                }
                Err(err) => {
                    warn!(chunk_index, error = %err, "Order chunk failed, continuing");
                    counter!("logisync_sync.chunks_failed", 1);
                    outcome.failed += chunk.len();
                    outcome.failures.push(BatchFailure {
                        chunk_index,
                        error: err.to_string(),
                        record_ids: chunk.iter().map(|(o, _)| o.id.to_string()).collect(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Single-record product upsert for webhook deliveries, where a storage
    /// failure fails the whole request.
    pub async fn upsert_product(&self, record: product::Model) -> Result<(), ServiceError> {
        self.upsert_product_chunk(std::slice::from_ref(&record))
            .await
            .map_err(ServiceError::StorageError)
    }

    /// Single-record order upsert for webhook deliveries.
    pub async fn upsert_order(
        &self,
        record: order::Model,
        lines: Vec<order_line::Model>,
    ) -> Result<(), ServiceError> {
        self.upsert_order_chunk(&[(record, lines)])
            .await
            .map_err(ServiceError::StorageError)
    }

    async fn upsert_product_chunk(&self, chunk: &[product::Model]) -> Result<(), DbErr> {
        if chunk.is_empty() {
            return Ok(());
        }

        let models: Vec<product::ActiveModel> = chunk
            .iter()
            .cloned()
            .map(IntoActiveModel::into_active_model)
            .collect();

        product::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(product::Column::Id)
                    .update_columns([
                        product::Column::Name,
                        product::Column::Sku,
                        product::Column::StockQuantity,
                        product::Column::StockStatus,
                        product::Column::ManageStock,
                        product::Column::RegularPrice,
                        product::Column::SalePrice,
                        product::Column::Price,
                        product::Column::Status,
                        product::Column::ProductType,
                        product::Column::DateCreated,
                        product::Column::DateModified,
                        product::Column::SyncedAt,
                    ])
                    .to_owned(),
            )
            .exec(&*self.db)
            .await?;

        Ok(())
    }

    async fn upsert_order_chunk(
        &self,
        chunk: &[(order::Model, Vec<order_line::Model>)],
    ) -> Result<(), DbErr> {
        if chunk.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;

        let order_models: Vec<order::ActiveModel> = chunk
            .iter()
            .map(|(o, _)| o.clone().into_active_model())
            .collect();

        order::Entity::insert_many(order_models)
            .on_conflict(
                OnConflict::column(order::Column::Id)
                    .update_columns([
                        order::Column::OrderNumber,
                        order::Column::CustomerName,
                        order::Column::Status,
                        order::Column::TotalValue,
                        order::Column::ItemCount,
                        order::Column::PromisedDate,
                        order::Column::DeliveryType,
                        order::Column::ShippingMethod,
                        order::Column::CreatedAt,
                        order::Column::SyncedAt,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;

        // Full-replace semantics for the owned lines.
        let order_ids: Vec<i64> = chunk.iter().map(|(o, _)| o.id).collect();
        order_line::Entity::delete_many()
            .filter(order_line::Column::OrderId.is_in(order_ids))
            .exec(&txn)
            .await?;

        let line_models: Vec<order_line::ActiveModel> = chunk
            .iter()
            .flat_map(|(_, lines)| lines.iter().cloned())
            .map(IntoActiveModel::into_active_model)
            .collect();

        if !line_models.is_empty() {
            order_line::Entity::insert_many(line_models)
                .on_conflict(
                    OnConflict::column(order_line::Column::Id)
                        .update_columns([
                            order_line::Column::OrderId,
                            order_line::Column::ProductId,
                            order_line::Column::Quantity,
                            order_line::Column::UnitPrice,
                            order_line::Column::LineTotal,
                            order_line::Column::TaxAmount,
                            order_line::Column::DeliveredQuantity,
                            order_line::Column::DeliveryStatus,
                            order_line::Column::DeliveryDate,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
        }

        txn.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_never_drops_below_one() {
        let writer = SyncWriter::new(
            Arc::new(sea_orm::DatabaseConnection::Disconnected),
            0,
        );
        assert_eq!(writer.chunk_size, 1);
    }

    #[test]
    fn connectivity_errors_are_distinguished_from_chunk_errors() {
        assert!(!is_connectivity_error(&DbErr::Custom("bad row".into())));
        assert!(is_connectivity_error(&DbErr::Conn(
            sea_orm::RuntimeErr::Internal("pool closed".into())
        )));
    }
}
