use axum::{
    extract::{Query, State},
    Json,
};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};

use crate::{
    auth::AuthUser, entities::order, errors::ServiceError, models::AtRiskOrder, ApiResponse,
    AppState, ListQuery, PaginatedResponse,
};

// GET /api/v1/orders/at-risk
#[utoipa::path(
    get,
    path = "/api/v1/orders/at-risk",
    responses(
        (status = 200, description = "Orders currently classified at risk"),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn at_risk_orders(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<ApiResponse<Vec<AtRiskOrder>>>, ServiceError> {
    let at_risk = state.services.risk.at_risk_orders().await?;
    Ok(Json(ApiResponse::success(at_risk)))
}

// GET /api/v1/orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Paginated order list"),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<order::Model>>>, ServiceError> {
    let limit = query.limit.max(1);
    let paginator = order::Entity::find()
        .order_by_desc(order::Column::CreatedAt)
        .paginate(&*state.db, limit);

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(query.page.saturating_sub(1)).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        total_pages: total.div_ceil(limit),
        items,
        total,
        page: query.page,
        limit,
    })))
}
