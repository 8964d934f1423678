use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{errors::ServiceError, services::retention::SweptOrder, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    pub success: bool,
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
    #[serde(rename = "ordersDeleted")]
    pub orders_deleted: Vec<SweptOrder>,
    pub timestamp: String,
}

// POST /api/v1/orders/retention/sweep
//
// No per-call auth: intended for scheduled/background invocation with
// elevated credentials configured at the service level.
#[utoipa::path(
    post,
    path = "/api/v1/orders/retention/sweep",
    responses(
        (status = 200, description = "Sweep finished", body = SweepResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn sweep(State(state): State<AppState>) -> Result<Json<SweepResponse>, ServiceError> {
    let outcome = state.services.retention.sweep().await?;

    Ok(Json(SweepResponse {
        success: true,
        deleted_count: outcome.deleted_count,
        orders_deleted: outcome.orders_deleted,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
