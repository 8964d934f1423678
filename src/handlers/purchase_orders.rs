use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::purchase_orders::{
        PurchaseOrderDetail, PurchaseOrderView, UpsertPurchaseOrderRequest,
    },
    ApiResponse, AppState, ListQuery, PaginatedResponse,
};

// GET /api/v1/purchase-orders
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    responses(
        (status = 200, description = "Paginated purchase order list"),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase Orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<PurchaseOrderView>>>, ServiceError> {
    let limit = query.limit.max(1);
    let (items, total) = state
        .services
        .purchase_orders
        .list(query.page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        total_pages: total.div_ceil(limit),
        items,
        total,
        page: query.page,
        limit,
    })))
}

// GET /api/v1/purchase-orders/:po_number
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{po_number}",
    responses(
        (status = 200, description = "Purchase order with lines and derived item count"),
        (status = 404, description = "Unknown PO number", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase Orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(po_number): Path<String>,
) -> Result<Json<ApiResponse<PurchaseOrderDetail>>, ServiceError> {
    let detail = state.services.purchase_orders.get(&po_number).await?;
    Ok(Json(ApiResponse::success(detail)))
}

// PUT /api/v1/purchase-orders
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders",
    request_body = UpsertPurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order upserted"),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchase Orders"
)]
pub async fn upsert_purchase_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<UpsertPurchaseOrderRequest>,
) -> Result<Json<ApiResponse<PurchaseOrderView>>, ServiceError> {
    let view = state.services.purchase_orders.upsert(request).await?;
    Ok(Json(ApiResponse::success(view)))
}
