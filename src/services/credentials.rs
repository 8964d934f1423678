use chrono::Utc;
use sea_orm::{sea_query::OnConflict, DatabaseConnection, EntityTrait, IntoActiveModel};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{entities::integration_credential, errors::ServiceError};

/// Stores one credential set per (user, integration type) pair. The sync
/// pipeline only ever reads; writes come from the settings surface.
#[derive(Clone)]
pub struct IntegrationCredentialService {
    db: Arc<DatabaseConnection>,
}

impl IntegrationCredentialService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Upsert by (user, integration type): a second save for the same pair
    /// replaces the stored payload rather than inserting a duplicate.
    #[instrument(skip(self, payload), fields(user_id = %user_id, integration_type))]
    pub async fn upsert(
        &self,
        user_id: Uuid,
        integration_type: &str,
        payload: Value,
    ) -> Result<(), ServiceError> {
        let integration_type = integration_type.trim().to_ascii_lowercase();
        if integration_type.is_empty() {
            return Err(ServiceError::ValidationError(
                "integration type must not be empty".to_string(),
            ));
        }
        if !payload.is_object() {
            return Err(ServiceError::ValidationError(
                "credentials payload must be a JSON object".to_string(),
            ));
        }

        let now = Utc::now();
        let model = integration_credential::Model {
            user_id,
            integration_type: integration_type.clone(),
            credentials: payload,
            created_at: now,
            updated_at: now,
        };

        integration_credential::Entity::insert(model.into_active_model())
            .on_conflict(
                OnConflict::columns([
                    integration_credential::Column::UserId,
                    integration_credential::Column::IntegrationType,
                ])
                .update_columns([
                    integration_credential::Column::Credentials,
                    integration_credential::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&*self.db)
            .await?;

        info!(integration_type = %integration_type, "Integration credentials saved");
        Ok(())
    }

    /// Look up the stored credential set for a pair. Absence is a normal
    /// outcome the caller turns into guidance, not an error here.
    #[instrument(skip(self), fields(user_id = %user_id, integration_type))]
    pub async fn get(
        &self,
        user_id: Uuid,
        integration_type: &str,
    ) -> Result<Option<integration_credential::Model>, ServiceError> {
        let key = (user_id, integration_type.trim().to_ascii_lowercase());
        integration_credential::Entity::find_by_id(key)
            .one(&*self.db)
            .await
            .map_err(ServiceError::StorageError)
    }
}
