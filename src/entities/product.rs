use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product as synced from the storefront catalog
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// External numeric id from the storefront - the stable correlation key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    /// Product display name
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// SKU (Stock Keeping Unit); the storefront does not require one
    pub sku: Option<String>,

    /// Signed stock quantity - negative signifies backorder
    pub stock_quantity: i32,

    /// Stock status label from the source system (e.g. "instock", "onbackorder")
    pub stock_status: String,

    /// Whether the storefront actively tracks stock for this product
    pub manage_stock: bool,

    /// Regular price
    pub regular_price: Decimal,

    /// Sale price, when one is set
    pub sale_price: Option<Decimal>,

    /// Effective price. Always recomputed from regular/sale at write time,
    /// never trusted from the source payload.
    pub price: Decimal,

    /// Lifecycle status (e.g. "publish", "draft")
    pub status: String,

    /// Freeform category/type tag
    pub product_type: String,

    /// Creation timestamp reported by the source system
    pub date_created: Option<DateTime<Utc>>,

    /// Modification timestamp reported by the source system
    pub date_modified: Option<DateTime<Utc>>,

    /// When this row was last written by webhook or bulk sync
    pub synced_at: DateTime<Utc>,
}

// Order lines reference products by external id only (a weak reference - the
// product may be absent), so no relations are defined here.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
