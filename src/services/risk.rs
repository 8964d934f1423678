//! Read-side order risk derivation.
//!
//! An order is at risk when it is past its promised delivery date AND at
//! least one of its lines references a backordered product. Either signal
//! alone is noise; the combination is what predicts customer impact. The
//! verdict is computed on every read so a stock change is reflected
//! immediately - nothing here is persisted.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    entities::{order, order_line, product},
    errors::ServiceError,
    models::{status::ONGOING_STATUSES, AtRiskOrder, RiskLevel},
};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Clone)]
pub struct OrderRiskService {
    db: Arc<DatabaseConnection>,
}

impl OrderRiskService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Classify all ongoing orders against the current instant.
    pub async fn at_risk_orders(&self) -> Result<Vec<AtRiskOrder>, ServiceError> {
        self.at_risk_orders_at(Utc::now()).await
    }

    /// Classify all ongoing orders against an explicit evaluation instant.
    #[instrument(skip(self))]
    pub async fn at_risk_orders_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<AtRiskOrder>, ServiceError> {
        let db = &*self.db;

        let orders = order::Entity::find()
            .filter(order::Column::Status.is_in(ONGOING_STATUSES))
            .all(db)
            .await?;

        // Line fetches fan out concurrently; an order whose lines cannot be
        // read degrades to "no backorder signal" instead of failing siblings.
        let line_sets = join_all(orders.iter().map(|o| {
            let db = self.db.clone();
            let order_id = o.id;
            async move {
                order_line::Entity::find()
                    .filter(order_line::Column::OrderId.eq(order_id))
                    .all(&*db)
                    .await
                    .unwrap_or_else(|err| {
                        warn!(order_id, error = %err, "Failed to load order lines, treating as empty");
                        Vec::new()
                    })
            }
        }))
        .await;

        // Resolve the weak product references in one query.
        let product_ids: HashSet<i64> = line_sets
            .iter()
            .flatten()
            .map(|line| line.product_id)
            .collect();

        let stock_by_product: HashMap<i64, i32> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            product::Entity::find()
                .filter(product::Column::Id.is_in(product_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.stock_quantity))
                .collect()
        };

        let at_risk: Vec<AtRiskOrder> = orders
            .iter()
            .zip(line_sets.iter())
            .filter_map(|(o, lines)| classify_order(o, lines, &stock_by_product, now))
            .collect();

        info!(
            evaluated = orders.len(),
            at_risk = at_risk.len(),
            "Order risk classification complete"
        );
        Ok(at_risk)
    }
}

/// Classify one order. Returns None for orders that are not at risk - the
/// caller only ever sees the at-risk subset.
fn classify_order(
    order: &order::Model,
    lines: &[order_line::Model],
    stock_by_product: &HashMap<i64, i32>,
    now: DateTime<Utc>,
) -> Option<AtRiskOrder> {
    let promised = order.promised_date?;
    if promised >= now {
        return None;
    }

    // A missing product means no backorder signal for that line.
    let backordered_line_count = lines
        .iter()
        .filter(|line| {
            stock_by_product
                .get(&line.product_id)
                .is_some_and(|qty| *qty < 0)
        })
        .count();

    if backordered_line_count == 0 {
        return None;
    }

    let days_overdue = days_overdue(now, promised);
    let risk_level = RiskLevel::from_days_overdue(days_overdue);

    Some(AtRiskOrder {
        id: order.id,
        order_number: order.order_number.clone(),
        customer_name: order.customer_name.clone(),
        status: order.status.clone(),
        total_value: order.total_value,
        item_count: order.item_count,
        promised_date: Some(promised),
        is_at_risk: true,
        risk_level,
        risk_reason: format!(
            "{} day(s) past promised delivery with {} backordered product(s)",
            days_overdue, backordered_line_count
        ),
        days_overdue,
        backordered_line_count,
    })
}

/// Whole days overdue, rounded up: one second past the promise is one day.
fn days_overdue(now: DateTime<Utc>, promised: DateTime<Utc>) -> i64 {
    let seconds = (now - promised).num_seconds();
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}
