use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::AuthUser, entities::product, errors::ServiceError, services::csv_import, ApiResponse,
    AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportRequest {
    pub csv_content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportResponse {
    pub success: bool,
    pub imported_count: usize,
    pub error_count: usize,
    pub total_rows: usize,
}

// GET /api/v1/products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Paginated product list"),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<product::Model>>>, ServiceError> {
    let limit = query.limit.max(1);
    let paginator = product::Entity::find()
        .order_by_asc(product::Column::Name)
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

// POST /api/v1/products/import
#[utoipa::path(
    post,
    path = "/api/v1/products/import",
    request_body = CsvImportRequest,
    responses(
        (status = 200, description = "Catalog imported", body = CsvImportResponse),
        (status = 400, description = "CSV failed to parse", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn import_catalog(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CsvImportRequest>,
) -> Result<Json<CsvImportResponse>, ServiceError> {
    let records = csv_import::parse_products_csv(&request.csv_content, Utc::now())?;
    let total_rows = records.len();

    let outcome = state.services.writer.upsert_products(&records).await?;

    info!(
        user_id = %user.user_id,
        imported = outcome.succeeded,
        failed = outcome.failed,
        "Catalog CSV import finished"
    );

    Ok(Json(CsvImportResponse {
        success: outcome.failed == 0,
        imported_count: outcome.succeeded,
        error_count: outcome.failed,
        total_rows,
    }))
}
