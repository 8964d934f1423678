use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::from_value;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    sync::{
        StorefrontCredentials, WarehouseCredentials, INTEGRATION_STOREFRONT, INTEGRATION_WAREHOUSE,
    },
    AppState,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSyncResponse {
    pub success: bool,
    pub synced_count: usize,
    pub error_count: usize,
    pub total_products: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSyncResponse {
    pub success: bool,
    pub synced_count: usize,
    pub error_count: usize,
    pub total_orders: usize,
}

// POST /api/v1/sync/products
#[utoipa::path(
    post,
    path = "/api/v1/sync/products",
    responses(
        (status = 200, description = "Sync finished", body = ProductSyncResponse),
        (status = 400, description = "Missing or invalid credentials", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse),
        (status = 500, description = "Upstream or storage failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Sync"
)]
pub async fn sync_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProductSyncResponse>, ServiceError> {
    let stored = state
        .services
        .credentials
        .get(user.user_id, INTEGRATION_STOREFRONT)
        .await?
        .ok_or_else(|| {
            ServiceError::ValidationError(
                "no storefront credentials configured - connect the store under Settings first"
                    .to_string(),
            )
        })?;

    let creds: StorefrontCredentials = from_value(stored.credentials).map_err(|_| {
        ServiceError::ValidationError(
            "stored storefront credentials are incomplete - re-save them under Settings"
                .to_string(),
        )
    })?;

    let report = state.services.sync.sync_products(&creds).await?;
    info!(user_id = %user.user_id, synced = report.succeeded, "Product sync requested via API");

    Ok(Json(ProductSyncResponse {
        success: true,
        synced_count: report.succeeded,
        error_count: report.failed,
        total_products: report.total_fetched,
    }))
}

// POST /api/v1/sync/orders
#[utoipa::path(
    post,
    path = "/api/v1/sync/orders",
    responses(
        (status = 200, description = "Sync finished", body = OrderSyncResponse),
        (status = 400, description = "Missing or invalid credentials", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse),
        (status = 500, description = "Upstream or storage failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Sync"
)]
pub async fn sync_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<OrderSyncResponse>, ServiceError> {
    let stored = state
        .services
        .credentials
        .get(user.user_id, INTEGRATION_WAREHOUSE)
        .await?
        .ok_or_else(|| {
            ServiceError::ValidationError(
                "no warehouse credentials configured - connect the warehouse system under Settings first"
                    .to_string(),
            )
        })?;

    let creds: WarehouseCredentials = from_value(stored.credentials).map_err(|_| {
        ServiceError::ValidationError(
            "stored warehouse credentials are incomplete - re-save them under Settings".to_string(),
        )
    })?;

    let report = state.services.sync.sync_orders(&creds).await?;
    info!(user_id = %user.user_id, synced = report.succeeded, "Order sync requested via API");

    Ok(Json(OrderSyncResponse {
        success: true,
        synced_count: report.succeeded,
        error_count: report.failed,
        total_orders: report.total_fetched,
    }))
}
