use axum::{
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    services::{
        credentials::IntegrationCredentialService, purchase_orders::PurchaseOrderService,
        retention::RetentionService, risk::OrderRiskService,
    },
    sync::{SyncService, SyncWriter},
    AppState,
};

pub mod credentials;
pub mod health;
pub mod orders;
pub mod products;
pub mod purchase_orders;
pub mod retention;
pub mod sync;
pub mod webhooks;

/// Aggregated services used by the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub sync: Arc<SyncService>,
    pub writer: Arc<SyncWriter>,
    pub risk: Arc<OrderRiskService>,
    pub retention: Arc<RetentionService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub credentials: Arc<IntegrationCredentialService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, cfg: &AppConfig) -> Self {
        Self {
            sync: Arc::new(SyncService::new(db.clone(), cfg)),
            writer: Arc::new(SyncWriter::new(db.clone(), cfg.upsert_chunk_size)),
            risk: Arc::new(OrderRiskService::new(db.clone())),
            retention: Arc::new(RetentionService::new(db.clone())),
            purchase_orders: Arc::new(PurchaseOrderService::new(db.clone())),
            credentials: Arc::new(IntegrationCredentialService::new(db)),
        }
    }
}

/// Full v1 API surface
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks/products", post(webhooks::product_webhook))
        .route("/webhooks/orders", post(webhooks::order_webhook))
        .route("/sync/products", post(sync::sync_products))
        .route("/sync/orders", post(sync::sync_orders))
        .route("/orders", get(orders::list_orders))
        .route("/orders/at-risk", get(orders::at_risk_orders))
        .route("/orders/retention/sweep", post(retention::sweep))
        .route("/products", get(products::list_products))
        .route("/products/import", post(products::import_catalog))
        .route(
            "/purchase-orders",
            get(purchase_orders::list_purchase_orders).put(purchase_orders::upsert_purchase_order),
        )
        .route(
            "/purchase-orders/:po_number",
            get(purchase_orders::get_purchase_order),
        )
        .route("/integrations/credentials", put(credentials::save_credentials))
        .route(
            "/integrations/credentials/:integration_type",
            get(credentials::credential_status),
        )
}
