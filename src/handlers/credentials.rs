use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveCredentialsRequest {
    pub integration_type: String,
    pub credentials: Value,
}

/// Presence metadata only; stored secrets are never echoed back.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub integration_type: String,
    pub connected: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

// PUT /api/v1/integrations/credentials
#[utoipa::path(
    put,
    path = "/api/v1/integrations/credentials",
    request_body = SaveCredentialsRequest,
    responses(
        (status = 200, description = "Credentials saved"),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
pub async fn save_credentials(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SaveCredentialsRequest>,
) -> Result<Json<ApiResponse<CredentialStatus>>, ServiceError> {
    state
        .services
        .credentials
        .upsert(user.user_id, &request.integration_type, request.credentials)
        .await?;

    Ok(Json(ApiResponse::success(CredentialStatus {
        integration_type: request.integration_type.trim().to_ascii_lowercase(),
        connected: true,
        updated_at: Some(Utc::now()),
    })))
}

// GET /api/v1/integrations/credentials/:integration_type
#[utoipa::path(
    get,
    path = "/api/v1/integrations/credentials/{integration_type}",
    responses(
        (status = 200, description = "Connection status for the integration", body = CredentialStatus),
        (status = 401, description = "Unauthenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
pub async fn credential_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(integration_type): Path<String>,
) -> Result<Json<ApiResponse<CredentialStatus>>, ServiceError> {
    let stored = state
        .services
        .credentials
        .get(user.user_id, &integration_type)
        .await?;

    Ok(Json(ApiResponse::success(CredentialStatus {
        integration_type: integration_type.trim().to_ascii_lowercase(),
        connected: stored.is_some(),
        updated_at: stored.map(|c| c.updated_at),
    })))
}
