use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Statuses an order may carry while it still needs operational attention.
/// Everything else (delivered, cancelled, refunded, whatever the upstream
/// invents next) passes through opaquely as `Other` - the source system owns
/// this enumeration, we only act on the ongoing subset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Processing,
    PartiallyShipped,
    Other(String),
}

/// The keep-set: orders in these statuses are retained and risk-classified.
pub const ONGOING_STATUSES: [&str; 2] = ["processing", "partially-shipped"];

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" => Self::Processing,
            "partially-shipped" | "partially_shipped" => Self::PartiallyShipped,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::PartiallyShipped => "partially-shipped",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Whether this status is in the "not yet finalized" subset the risk
    /// classifier and retention sweeper act on.
    pub fn is_ongoing(&self) -> bool {
        matches!(self, Self::Processing | Self::PartiallyShipped)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of a single order line. Closed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LineDeliveryStatus {
    #[default]
    Pending,
    Partial,
    Delivered,
    Cancelled,
}

/// Lifecycle of a purchase order. Closed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PurchaseOrderStatus {
    Pending,
    InTransit,
    Delayed,
    Delivered,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderPriority {
    High,
    Medium,
    Low,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ongoing_statuses_round_trip() {
        assert_eq!(OrderStatus::parse("processing"), OrderStatus::Processing);
        assert_eq!(
            OrderStatus::parse("Partially-Shipped"),
            OrderStatus::PartiallyShipped
        );
        assert_eq!(
            OrderStatus::parse("partially_shipped"),
            OrderStatus::PartiallyShipped
        );
        assert!(OrderStatus::parse("processing").is_ongoing());
        assert!(OrderStatus::parse("partially-shipped").is_ongoing());
    }

    #[test]
    fn unknown_statuses_pass_through_opaquely() {
        let status = OrderStatus::parse("awaiting-carrier-pickup");
        assert_eq!(status, OrderStatus::Other("awaiting-carrier-pickup".into()));
        assert!(!status.is_ongoing());
        assert_eq!(status.as_str(), "awaiting-carrier-pickup");
    }

    #[test]
    fn keep_set_matches_ongoing_statuses() {
        for raw in ONGOING_STATUSES {
            assert!(OrderStatus::parse(raw).is_ongoing());
        }
        assert!(!OrderStatus::parse("delivered").is_ongoing());
        assert!(!OrderStatus::parse("cancelled").is_ongoing());
    }

    #[test]
    fn closed_sets_parse_their_wire_labels() {
        assert_eq!(
            LineDeliveryStatus::from_str("partial").unwrap(),
            LineDeliveryStatus::Partial
        );
        assert_eq!(
            PurchaseOrderStatus::from_str("in-transit").unwrap(),
            PurchaseOrderStatus::InTransit
        );
        assert_eq!(PurchaseOrderStatus::InTransit.to_string(), "in-transit");
        assert_eq!(
            PurchaseOrderPriority::from_str("high").unwrap(),
            PurchaseOrderPriority::High
        );
    }
}
