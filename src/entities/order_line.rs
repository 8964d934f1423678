use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_lines")]
pub struct Model {
    /// External line-item id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub order_id: i64,

    /// Weak reference to a product by its external numeric id; the product
    /// may not exist or may have been deleted - absence is not an error
    pub product_id: i64,

    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub tax_amount: Decimal,

    pub delivered_quantity: i32,

    /// One of: pending, partial, delivered, cancelled
    pub delivery_status: String,

    pub delivery_date: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
