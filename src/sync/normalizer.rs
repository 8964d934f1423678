//! Converts raw external payloads (storefront product/order, warehouse order)
//! into the internal canonical records.
//!
//! Everything in this module is pure: raw JSON in, entity model or
//! `ValidationError` out. The evaluation instant is passed in by the caller
//! so the same payload always normalizes to the same record.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::{
    entities::{order, order_line, product},
    errors::ServiceError,
    models::{LineDeliveryStatus, OrderStatus},
};

const DEFAULT_STOCK_STATUS: &str = "instock";
const DEFAULT_PRODUCT_TYPE: &str = "simple";
const DEFAULT_PRODUCT_STATUS: &str = "publish";
const DEFAULT_ORDER_STATUS: &str = "processing";

/// Metadata keys under which some storefront exports bury the category tag.
const CATEGORY_META_KEYS: [&str; 2] = ["category", "product_category"];

/// Normalize a raw storefront product payload.
///
/// Fails only when the identity fields (`id`, `name`) are absent; every
/// other field falls back to a kind-specific default.
pub fn normalize_product(
    raw: &Value,
    synced_at: DateTime<Utc>,
) -> Result<product::Model, ServiceError> {
    let id = int_at(raw, "id").ok_or_else(|| {
        ServiceError::ValidationError("product payload is missing required field 'id'".to_string())
    })?;
    let name = str_at(raw, "name")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ServiceError::ValidationError(
                "product payload is missing required field 'name'".to_string(),
            )
        })?;

    let regular_price = decimal_at(raw, "regular_price").unwrap_or(Decimal::ZERO);
    let sale_price = decimal_at(raw, "sale_price");
    // Effective price is derived here, never copied from the payload.
    let price = sale_price.unwrap_or(regular_price);

    Ok(product::Model {
        id,
        name: name.to_string(),
        sku: str_at(raw, "sku")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        stock_quantity: int_at(raw, "stock_quantity").unwrap_or(0) as i32,
        stock_status: str_at(raw, "stock_status")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STOCK_STATUS)
            .to_string(),
        manage_stock: bool_at(raw, "manage_stock").unwrap_or(false),
        regular_price,
        sale_price,
        price,
        status: str_at(raw, "status")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PRODUCT_STATUS)
            .to_string(),
        product_type: extract_category(raw).unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string()),
        date_created: timestamp_at(raw, "date_created"),
        date_modified: timestamp_at(raw, "date_modified"),
        synced_at,
    })
}

/// Normalize a raw order payload from either the storefront or the
/// warehouse system into an order plus its owned lines.
pub fn normalize_order(
    raw: &Value,
    synced_at: DateTime<Utc>,
) -> Result<(order::Model, Vec<order_line::Model>), ServiceError> {
    let id = int_at(raw, "id").ok_or_else(|| {
        ServiceError::ValidationError("order payload is missing required field 'id'".to_string())
    })?;

    let order_number = str_at(raw, "number")
        .or_else(|| str_at(raw, "order_number"))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string());

    let lines = raw
        .get("line_items")
        .or_else(|| raw.get("items"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                // Lines without an external id cannot be keyed; dropped, not fatal.
                .filter_map(|item| normalize_order_line(item, id))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let item_count = int_at(raw, "item_count")
        .map(|v| v as i32)
        .unwrap_or_else(|| lines.iter().map(|l| l.quantity).sum());

    let model = order::Model {
        id,
        order_number,
        customer_name: extract_customer_name(raw),
        // Canonicalize the ongoing statuses; anything else passes through.
        status: OrderStatus::parse(
            str_at(raw, "status")
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_ORDER_STATUS),
        )
        .as_str()
        .to_string(),
        total_value: decimal_at(raw, "total")
            .or_else(|| decimal_at(raw, "total_value"))
            .unwrap_or(Decimal::ZERO),
        item_count,
        promised_date: timestamp_at(raw, "promised_date")
            .or_else(|| timestamp_at(raw, "estimated_delivery")),
        delivery_type: str_at(raw, "delivery_type")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        shipping_method: extract_shipping_method(raw),
        created_at: timestamp_at(raw, "date_created")
            .or_else(|| timestamp_at(raw, "created_at"))
            .unwrap_or(synced_at),
        synced_at,
    };

    Ok((model, lines))
}

fn normalize_order_line(item: &Value, order_id: i64) -> Option<order_line::Model> {
    let id = int_at(item, "id")?;

    let delivery_status = str_at(item, "delivery_status")
        .and_then(|s| LineDeliveryStatus::from_str(s).ok())
        .unwrap_or_default();

    Some(order_line::Model {
        id,
        order_id,
        product_id: int_at(item, "product_id").unwrap_or(0),
        quantity: int_at(item, "quantity").unwrap_or(0) as i32,
        unit_price: decimal_at(item, "price")
            .or_else(|| decimal_at(item, "unit_price"))
            .unwrap_or(Decimal::ZERO),
        line_total: decimal_at(item, "total")
            .or_else(|| decimal_at(item, "line_total"))
            .unwrap_or(Decimal::ZERO),
        tax_amount: decimal_at(item, "total_tax")
            .or_else(|| decimal_at(item, "tax_amount"))
            .unwrap_or(Decimal::ZERO),
        delivered_quantity: int_at(item, "delivered_quantity").unwrap_or(0) as i32,
        delivery_status: delivery_status.to_string(),
        delivery_date: timestamp_at(item, "delivery_date"),
    })
}

/// The category/type tag arrives in one of three shapes: an array of tagged
/// objects (take the first element's name), a plain string, or buried in the
/// generic metadata list under a known key. Direct field wins; first
/// successful extraction wins.
fn extract_category(raw: &Value) -> Option<String> {
    if let Some(direct) = raw.get("categories").and_then(tag_name) {
        return Some(direct);
    }

    let meta = raw.get("meta_data").and_then(Value::as_array)?;
    for key in CATEGORY_META_KEYS {
        let hit = meta
            .iter()
            .find(|entry| entry.get("key").and_then(Value::as_str) == Some(key))
            .and_then(|entry| entry.get("value"))
            .and_then(tag_name);
        if hit.is_some() {
            return hit;
        }
    }
    None
}

fn tag_name(v: &Value) -> Option<String> {
    match v {
        Value::Array(items) => items
            .first()?
            .get("name")?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn extract_customer_name(raw: &Value) -> String {
    if let Some(name) = str_at(raw, "customer_name").filter(|s| !s.is_empty()) {
        return name.to_string();
    }
    // Storefront order payloads carry the customer under `billing`.
    if let Some(billing) = raw.get("billing") {
        let first = str_at(billing, "first_name").unwrap_or("");
        let last = str_at(billing, "last_name").unwrap_or("");
        let full = format!("{} {}", first, last).trim().to_string();
        if !full.is_empty() {
            return full;
        }
    }
    "Unknown".to_string()
}

fn extract_shipping_method(raw: &Value) -> Option<String> {
    if let Some(method) = str_at(raw, "shipping_method").filter(|s| !s.is_empty()) {
        return Some(method.to_string());
    }
    raw.get("shipping_lines")
        .and_then(Value::as_array)
        .and_then(|lines| lines.first())
        .and_then(|line| line.get("method_title"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn str_at<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str).map(str::trim)
}

/// Integers may arrive as JSON numbers or numeric strings.
fn int_at(raw: &Value, key: &str) -> Option<i64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_at(raw: &Value, key: &str) -> Option<bool> {
    match raw.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Monetary fields may arrive as strings or numbers; empty strings count as
/// absent (an empty sale price means "no sale").
fn decimal_at(raw: &Value, key: &str) -> Option<Decimal> {
    match raw.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Absent or unparseable date-times yield None, never an error.
fn timestamp_at(raw: &Value, key: &str) -> Option<DateTime<Utc>> {
    let s = str_at(raw, key).filter(|s| !s.is_empty())?;
    parse_timestamp(s)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Storefront exports often omit the offset entirely.
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn product_requires_id_and_name() {
        let err = normalize_product(&json!({"name": "Widget"}), now()).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let err = normalize_product(&json!({"id": 5}), now()).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        assert!(normalize_product(&json!({"id": 5, "name": "Widget"}), now()).is_ok());
    }

    #[test]
    fn product_accepts_string_id() {
        let product = normalize_product(&json!({"id": "42", "name": "Widget"}), now()).unwrap();
        assert_eq!(product.id, 42);
    }

    #[test]
    fn missing_fields_take_kind_specific_defaults() {
        let product = normalize_product(&json!({"id": 1, "name": "Widget"}), now()).unwrap();
        assert_eq!(product.stock_quantity, 0);
        assert_eq!(product.stock_status, "instock");
        assert_eq!(product.product_type, "simple");
        assert_eq!(product.status, "publish");
        assert!(!product.manage_stock);
        assert_eq!(product.regular_price, Decimal::ZERO);
    }

    #[test]
    fn effective_price_prefers_sale_price() {
        let product = normalize_product(
            &json!({"id": 1, "name": "Widget", "regular_price": "100", "sale_price": "80"}),
            now(),
        )
        .unwrap();
        assert_eq!(product.price, dec!(80));

        let product = normalize_product(
            &json!({"id": 1, "name": "Widget", "regular_price": "100", "sale_price": ""}),
            now(),
        )
        .unwrap();
        assert_eq!(product.price, dec!(100));
        assert_eq!(product.sale_price, None);
    }

    #[test]
    fn effective_price_ignores_source_price_field() {
        // A payload claiming its own effective price must not be trusted.
        let product = normalize_product(
            &json!({"id": 1, "name": "Widget", "regular_price": "100", "sale_price": "80", "price": "5"}),
            now(),
        )
        .unwrap();
        assert_eq!(product.price, dec!(80));
    }

    #[test]
    fn category_from_tagged_object_array() {
        let product = normalize_product(
            &json!({"id": 1, "name": "W", "categories": [{"id": 9, "name": "Fasteners"}, {"id": 10, "name": "Other"}]}),
            now(),
        )
        .unwrap();
        assert_eq!(product.product_type, "Fasteners");
    }

    #[test]
    fn category_from_plain_string() {
        let product =
            normalize_product(&json!({"id": 1, "name": "W", "categories": "Hardware"}), now())
                .unwrap();
        assert_eq!(product.product_type, "Hardware");
    }

    #[test]
    fn category_falls_back_to_metadata() {
        let product = normalize_product(
            &json!({"id": 1, "name": "W", "meta_data": [
                {"key": "irrelevant", "value": "x"},
                {"key": "category", "value": "Tools"}
            ]}),
            now(),
        )
        .unwrap();
        assert_eq!(product.product_type, "Tools");
    }

    #[test]
    fn direct_category_wins_over_metadata() {
        let product = normalize_product(
            &json!({"id": 1, "name": "W",
                "categories": [{"name": "Direct"}],
                "meta_data": [{"key": "category", "value": "Meta"}]}),
            now(),
        )
        .unwrap();
        assert_eq!(product.product_type, "Direct");
    }

    #[test]
    fn unparseable_timestamps_become_null() {
        let product = normalize_product(
            &json!({"id": 1, "name": "W", "date_created": "not-a-date"}),
            now(),
        )
        .unwrap();
        assert_eq!(product.date_created, None);

        let product = normalize_product(
            &json!({"id": 1, "name": "W", "date_created": "2024-03-01T10:30:00"}),
            now(),
        )
        .unwrap();
        assert!(product.date_created.is_some());
    }

    #[test]
    fn order_requires_id() {
        let err = normalize_order(&json!({"number": "SO-1"}), now()).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn order_lines_are_keyed_and_owned() {
        let (order, lines) = normalize_order(
            &json!({
                "id": 100,
                "number": "SO-100",
                "status": "processing",
                "total": "59.97",
                "line_items": [
                    {"id": 1001, "product_id": 7, "quantity": 3, "price": "19.99", "total": "59.97"},
                    {"product_id": 8, "quantity": 1}
                ]
            }),
            now(),
        )
        .unwrap();

        assert_eq!(order.id, 100);
        assert_eq!(order.order_number, "SO-100");
        assert_eq!(order.total_value, dec!(59.97));
        // The un-keyed line is dropped, not fatal.
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].order_id, 100);
        assert_eq!(lines[0].product_id, 7);
        assert_eq!(lines[0].delivery_status, "pending");
    }

    #[test]
    fn order_item_count_defaults_to_line_quantity_sum() {
        let (order, _) = normalize_order(
            &json!({"id": 1, "line_items": [
                {"id": 10, "quantity": 2},
                {"id": 11, "quantity": 5}
            ]}),
            now(),
        )
        .unwrap();
        assert_eq!(order.item_count, 7);
    }

    #[test]
    fn warehouse_order_shape_normalizes() {
        let (order, lines) = normalize_order(
            &json!({
                "id": 200,
                "order_number": "WH-200",
                "customer_name": "Acme Corp",
                "status": "partially-shipped",
                "total_value": 120.5,
                "promised_date": "2024-06-01T00:00:00Z",
                "delivery_type": "freight",
                "items": [
                    {"id": 2001, "product_id": 9, "quantity": 4, "unit_price": 30.125,
                     "delivered_quantity": 2, "delivery_status": "partial"}
                ]
            }),
            now(),
        )
        .unwrap();

        assert_eq!(order.order_number, "WH-200");
        assert_eq!(order.customer_name, "Acme Corp");
        assert!(order.promised_date.is_some());
        assert_eq!(lines[0].delivered_quantity, 2);
        assert_eq!(lines[0].delivery_status, "partial");
    }

    #[test]
    fn order_status_spellings_are_canonicalized() {
        let (order, _) =
            normalize_order(&json!({"id": 1, "status": "Partially_Shipped"}), now()).unwrap();
        assert_eq!(order.status, "partially-shipped");

        let (order, _) =
            normalize_order(&json!({"id": 1, "status": "awaiting-pickup"}), now()).unwrap();
        assert_eq!(order.status, "awaiting-pickup");
    }

    #[test]
    fn storefront_billing_name_extraction() {
        let (order, _) = normalize_order(
            &json!({"id": 1, "billing": {"first_name": "Jo", "last_name": "Bloggs"}}),
            now(),
        )
        .unwrap();
        assert_eq!(order.customer_name, "Jo Bloggs");
    }

    #[test]
    fn unknown_line_delivery_status_defaults_to_pending() {
        let (_, lines) = normalize_order(
            &json!({"id": 1, "line_items": [{"id": 2, "delivery_status": "teleported"}]}),
            now(),
        )
        .unwrap();
        assert_eq!(lines[0].delivery_status, "pending");
    }
}
