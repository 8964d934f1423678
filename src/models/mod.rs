pub mod risk;
pub mod status;

pub use risk::{AtRiskOrder, RiskLevel};
pub use status::{LineDeliveryStatus, OrderStatus, PurchaseOrderPriority, PurchaseOrderStatus};
