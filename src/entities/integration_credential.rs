use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored credential set for one external integration. At most one row per
/// (user, integration type) pair - writes upsert by that pair. The payload
/// structure varies per integration (API keys, basic-auth pairs, base URLs),
/// so it is kept opaque here and deserialized by the sync client.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integration_credentials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    /// Integration type tag, e.g. "storefront" or "warehouse"
    #[sea_orm(primary_key, auto_increment = false)]
    pub integration_type: String,

    pub credentials: Json,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
