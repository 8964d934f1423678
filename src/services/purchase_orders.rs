use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{purchase_order, purchase_order_line},
    errors::ServiceError,
    models::{PurchaseOrderPriority, PurchaseOrderStatus},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderLineInput {
    #[validate(length(min = 1, message = "Line item name is required"))]
    pub item_name: String,
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_cost: Decimal,
}

/// Upsert request keyed by PO number: an existing PO is fully replaced,
/// lines included.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPurchaseOrderRequest {
    #[validate(length(min = 1, max = 64, message = "PO number is required"))]
    pub po_number: String,
    #[validate(length(min = 1, message = "Supplier name is required"))]
    pub supplier_name: String,
    pub supplier_number: Option<String>,
    pub status: PurchaseOrderStatus,
    pub priority: PurchaseOrderPriority,
    pub total_value: Decimal,
    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLineInput>,
}

/// Read projection. `item_count` is recomputed from the lines on every read
/// - it is never a stored column, so it cannot go stale.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderView {
    pub po_number: String,
    pub supplier_name: String,
    pub supplier_number: Option<String>,
    pub status: String,
    pub priority: String,
    pub total_value: Decimal,
    pub currency: String,
    pub item_count: i64,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub header: PurchaseOrderView,
    pub lines: Vec<purchase_order_line::Model>,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DatabaseConnection>,
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(po_number = %request.po_number))]
    pub async fn upsert(
        &self,
        request: UpsertPurchaseOrderRequest,
    ) -> Result<PurchaseOrderView, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let header = purchase_order::Model {
            po_number: request.po_number.clone(),
            supplier_name: request.supplier_name,
            supplier_number: request.supplier_number,
            status: request.status.to_string(),
            priority: request.priority.to_string(),
            total_value: request.total_value,
            currency: request.currency,
            expected_delivery: request.expected_delivery,
            actual_delivery: request.actual_delivery,
            created_at: now,
        };

        purchase_order::Entity::insert(header.clone().into_active_model())
            .on_conflict(
                OnConflict::column(purchase_order::Column::PoNumber)
                    .update_columns([
                        purchase_order::Column::SupplierName,
                        purchase_order::Column::SupplierNumber,
                        purchase_order::Column::Status,
                        purchase_order::Column::Priority,
                        purchase_order::Column::TotalValue,
                        purchase_order::Column::Currency,
                        purchase_order::Column::ExpectedDelivery,
                        purchase_order::Column::ActualDelivery,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;

        // Replace, never merge, the owned lines.
        purchase_order_line::Entity::delete_many()
            .filter(purchase_order_line::Column::PoNumber.eq(request.po_number.clone()))
            .exec(&txn)
            .await?;

        let item_count: i64 = request.lines.iter().map(|l| l.quantity as i64).sum();

        if !request.lines.is_empty() {
            let line_models: Vec<purchase_order_line::ActiveModel> = request
                .lines
                .into_iter()
                .map(|l| purchase_order_line::ActiveModel {
                    id: NotSet,
                    po_number: Set(request.po_number.clone()),
                    item_name: Set(l.item_name),
                    sku: Set(l.sku),
                    quantity: Set(l.quantity),
                    unit_cost: Set(l.unit_cost),
                })
                .collect();

            purchase_order_line::Entity::insert_many(line_models)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        info!(po_number = %header.po_number, "Purchase order upserted");

        Ok(view_from(header, item_count))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<PurchaseOrderView>, u64), ServiceError> {
        let db = &*self.db;

        let paginator = purchase_order::Entity::find()
            .order_by_asc(purchase_order::Column::PoNumber)
            .paginate(db, limit.max(1));

        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.saturating_sub(1)).await?;

        let po_numbers: Vec<String> = headers.iter().map(|h| h.po_number.clone()).collect();
        let counts = self.line_counts(&po_numbers).await?;

        let views = headers
            .into_iter()
            .map(|h| {
                let count = counts.get(&h.po_number).copied().unwrap_or(0);
                view_from(h, count)
            })
            .collect();

        Ok((views, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, po_number: &str) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = &*self.db;

        let header = purchase_order::Entity::find_by_id(po_number.to_string())
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", po_number))
            })?;

        let lines = purchase_order_line::Entity::find()
            .filter(purchase_order_line::Column::PoNumber.eq(po_number))
            .all(db)
            .await?;

        let item_count: i64 = lines.iter().map(|l| l.quantity as i64).sum();

        Ok(PurchaseOrderDetail {
            header: view_from(header, item_count),
            lines,
        })
    }

    async fn line_counts(&self, po_numbers: &[String]) -> Result<HashMap<String, i64>, ServiceError> {
        if po_numbers.is_empty() {
            return Ok(HashMap::new());
        }

        let lines = purchase_order_line::Entity::find()
            .filter(purchase_order_line::Column::PoNumber.is_in(po_numbers.to_vec()))
            .all(&*self.db)
            .await?;

        let mut counts: HashMap<String, i64> = HashMap::new();
        for line in lines {
            *counts.entry(line.po_number).or_default() += line.quantity as i64;
        }
        Ok(counts)
    }
}

fn view_from(header: purchase_order::Model, item_count: i64) -> PurchaseOrderView {
    PurchaseOrderView {
        po_number: header.po_number,
        supplier_name: header.supplier_name,
        supplier_number: header.supplier_number,
        status: header.status,
        priority: header.priority,
        total_value: header.total_value,
        currency: header.currency,
        item_count,
        expected_delivery: header.expected_delivery,
        actual_delivery: header.actual_delivery,
    }
}
