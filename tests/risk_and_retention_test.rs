mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{response_json, TestApp};
use logisync_api::entities::{order, order_line, product};
use logisync_api::sync::SyncWriter;

fn product_with_stock(id: i64, stock: i32) -> product::Model {
    let now = Utc::now();
    product::Model {
        id,
        name: format!("Product {}", id),
        sku: None,
        stock_quantity: stock,
        stock_status: if stock < 0 { "onbackorder" } else { "instock" }.into(),
        manage_stock: true,
        regular_price: dec!(10),
        sale_price: None,
        price: dec!(10),
        status: "publish".into(),
        product_type: "simple".into(),
        date_created: None,
        date_modified: None,
        synced_at: now,
    }
}

fn order_with(
    id: i64,
    status: &str,
    promised_days_ago: Option<i64>,
    product_id: i64,
) -> (order::Model, Vec<order_line::Model>) {
    let now = Utc::now();
    (
        order::Model {
            id,
            order_number: format!("SO-{}", id),
            customer_name: format!("Customer {}", id),
            status: status.into(),
            total_value: dec!(50),
            item_count: 1,
            // A small cushion keeps the ceiling-day arithmetic stable however
            // long the test takes between seeding and classification.
            promised_date: promised_days_ago
                .map(|days| now - Duration::days(days) + Duration::seconds(30)),
            delivery_type: Some("standard".into()),
            shipping_method: None,
            created_at: now,
            synced_at: now,
        },
        vec![order_line::Model {
            id: id * 10,
            order_id: id,
            product_id,
            quantity: 1,
            unit_price: dec!(50),
            line_total: dec!(50),
            tax_amount: dec!(0),
            delivered_quantity: 0,
            delivery_status: "pending".into(),
            delivery_date: None,
        }],
    )
}

async fn seed(app: &TestApp) {
    let writer = SyncWriter::new(app.state.db.clone(), 10);
    writer
        .upsert_products(&[product_with_stock(1, -3), product_with_stock(2, 5)])
        .await
        .unwrap();
    writer
        .upsert_orders(&[
            // Overdue AND backordered: the only at-risk order.
            order_with(10, "processing", Some(20), 1),
            // Overdue but fully stocked.
            order_with(11, "processing", Some(40), 2),
            // Backordered but promised in the future.
            order_with(12, "partially-shipped", Some(-5), 1),
            // Backordered and overdue, but already finalized.
            order_with(13, "delivered", Some(30), 1),
            // No promise date at all.
            order_with(14, "processing", None, 1),
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn classifier_flags_only_overdue_and_backordered_orders() {
    let app = TestApp::new().await;
    seed(&app).await;

    let at_risk = app.state.services.risk.at_risk_orders().await.unwrap();

    assert_eq!(at_risk.len(), 1);
    let verdict = &at_risk[0];
    assert_eq!(verdict.id, 10);
    assert!(verdict.is_at_risk);
    assert_eq!(verdict.days_overdue, 20);
    assert_eq!(verdict.risk_level.to_string(), "medium");
    assert_eq!(verdict.backordered_line_count, 1);
    assert!(verdict.risk_reason.contains("20 day(s)"));
}

#[tokio::test]
async fn at_risk_endpoint_returns_the_subset() {
    let app = TestApp::new().await;
    seed(&app).await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/orders/at-risk", None)
        .await;
    let (status, payload) = response_json(response).await;

    assert_eq!(status, StatusCode::OK);
    let items = payload["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], 10);
    assert_eq!(items[0]["isAtRisk"], true);
    assert_eq!(items[0]["riskLevel"], "medium");
}

#[tokio::test]
async fn at_risk_endpoint_requires_auth() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/orders/at-risk", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sweep_deletes_only_orders_outside_the_keep_set() {
    let app = TestApp::new().await;
    let writer = SyncWriter::new(app.state.db.clone(), 10);
    writer
        .upsert_orders(&[
            order_with(20, "processing", None, 1),
            order_with(21, "partially-shipped", None, 1),
            order_with(22, "delivered", None, 1),
            order_with(23, "cancelled", None, 1),
        ])
        .await
        .unwrap();

    let response = app
        .request(Method::POST, "/api/v1/orders/retention/sweep", None)
        .await;
    let (status, payload) = response_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], true);
    assert_eq!(payload["deletedCount"], 2);
    assert!(payload["timestamp"].is_string());

    let mut deleted_ids: Vec<i64> = payload["ordersDeleted"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect();
    deleted_ids.sort_unstable();
    assert_eq!(deleted_ids, vec![22, 23]);

    let remaining: Vec<i64> = order::Entity::find()
        .all(&*app.state.db)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.contains(&20));
    assert!(remaining.contains(&21));

    // Owned lines go with their orders.
    let orphaned = order_line::Entity::find()
        .filter(order_line::Column::OrderId.is_in([22i64, 23i64]))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[tokio::test]
async fn second_sweep_reports_already_clean() {
    let app = TestApp::new().await;
    let writer = SyncWriter::new(app.state.db.clone(), 10);
    writer
        .upsert_orders(&[
            order_with(30, "processing", None, 1),
            order_with(31, "delivered", None, 1),
        ])
        .await
        .unwrap();

    let first = app.state.services.retention.sweep().await.unwrap();
    assert_eq!(first.deleted_count, 1);
    assert!(!first.already_clean);

    let second = app.state.services.retention.sweep().await.unwrap();
    assert_eq!(second.deleted_count, 0);
    assert!(second.already_clean);
    assert!(second.orders_deleted.is_empty());
}
