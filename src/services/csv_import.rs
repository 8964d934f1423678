//! Product catalog bootstrap from a CSV export.
//!
//! The reader tolerates quoted fields containing commas and doubled-quote
//! escapes, and ignores columns it does not recognize. Identity columns
//! (`id`, `name`) are mandatory: a row missing either fails the whole file
//! with a row-numbered error, because a partial bootstrap is worse than a
//! rejected one.

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::{entities::product, errors::ServiceError};

const DEFAULT_STOCK_STATUS: &str = "instock";
const DEFAULT_PRODUCT_TYPE: &str = "simple";
const DEFAULT_PRODUCT_STATUS: &str = "publish";

/// Parse a catalog CSV into canonical product records.
pub fn parse_products_csv(
    content: &str,
    synced_at: DateTime<Utc>,
) -> Result<Vec<product::Model>, ServiceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ServiceError::ValidationError(format!("CSV header is unreadable: {}", e)))?
        .clone();

    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_ascii_lowercase(), idx))
        .collect();

    for required in ["id", "name"] {
        if !columns.contains_key(required) {
            return Err(ServiceError::ValidationError(format!(
                "CSV is missing required column '{}'",
                required
            )));
        }
    }

    let mut products = Vec::new();

    for (index, record) in reader.records().enumerate() {
        // Header occupies row 1; the first data row is row 2.
        let row = index + 2;
        let record = record.map_err(|e| {
            ServiceError::ValidationError(format!("CSV row {} is malformed: {}", row, e))
        })?;

        let field = |name: &str| -> Option<&str> {
            columns
                .get(name)
                .and_then(|idx| record.get(*idx))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let id: i64 = field("id")
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("CSV row {} is missing 'id'", row))
            })?
            .parse()
            .map_err(|_| {
                ServiceError::ValidationError(format!("CSV row {} has a non-numeric 'id'", row))
            })?;

        let name = field("name")
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("CSV row {} is missing 'name'", row))
            })?
            .to_string();

        let regular_price = field("regular_price")
            .and_then(|s| Decimal::from_str(s).ok())
            .unwrap_or(Decimal::ZERO);
        let sale_price = field("sale_price").and_then(|s| Decimal::from_str(s).ok());
        let price = sale_price.unwrap_or(regular_price);

        products.push(product::Model {
            id,
            name,
            sku: field("sku").map(str::to_string),
            stock_quantity: field("stock_quantity")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            stock_status: field("stock_status")
                .unwrap_or(DEFAULT_STOCK_STATUS)
                .to_string(),
            manage_stock: field("manage_stock").map(parse_bool).unwrap_or(false),
            regular_price,
            sale_price,
            price,
            status: field("status").unwrap_or(DEFAULT_PRODUCT_STATUS).to_string(),
            product_type: field("category")
                .or_else(|| field("product_type"))
                .unwrap_or(DEFAULT_PRODUCT_TYPE)
                .to_string(),
            date_created: None,
            date_modified: None,
            synced_at,
        });
    }

    Ok(products)
}

/// Accepts {true, 1, yes} (case-insensitive) as true.
fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
