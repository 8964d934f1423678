use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

/// Severity bucket for an at-risk order, derived from how long the promised
/// delivery date has been missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// > 30 days overdue is high, > 14 is medium, anything else low.
    pub fn from_days_overdue(days: i64) -> Self {
        if days > 30 {
            Self::High
        } else if days > 14 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Read-side projection of an order the classifier flagged. These fields are
/// computed per read and never persisted, so a stock change immediately
/// changes the verdict.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskOrder {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub total_value: Decimal,
    pub item_count: i32,
    pub promised_date: Option<DateTime<Utc>>,
    pub is_at_risk: bool,
    pub risk_level: RiskLevel,
    pub risk_reason: String,
    pub days_overdue: i64,
    pub backordered_line_count: usize,
}
