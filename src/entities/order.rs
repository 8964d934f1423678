use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// External numeric order id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    /// Human order number from the source system
    pub order_number: String,

    pub customer_name: String,

    /// Open string enumeration controlled by the source system; the ongoing
    /// subset is interpreted via `models::OrderStatus`
    pub status: String,

    pub total_value: Decimal,
    pub item_count: i32,

    /// Promised delivery date; absent when the order has no delivery promise
    pub promised_date: Option<DateTime<Utc>>,

    pub delivery_type: Option<String>,
    pub shipping_method: Option<String>,

    pub created_at: DateTime<Utc>,
    pub synced_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLine,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
