mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use common::{response_json, TestApp};
use logisync_api::entities::product;

#[tokio::test]
async fn csv_import_bootstraps_the_catalog() {
    let app = TestApp::new().await;

    let csv = "id,name,sku,regular_price,sale_price,stock_quantity,manage_stock\n\
               1,\"Widget, large\",W-1,100,80,12,yes\n\
               2,Bolt,B-2,0.50,,200,no\n";

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/products/import",
            Some(json!({ "csvContent": csv })),
        )
        .await;
    let (status, payload) = response_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], true);
    assert_eq!(payload["importedCount"], 2);
    assert_eq!(payload["errorCount"], 0);
    assert_eq!(payload["totalRows"], 2);

    let widget = product::Entity::find_by_id(1)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(widget.name, "Widget, large");
    assert_eq!(widget.price, dec!(80));
    assert!(widget.manage_stock);
}

#[tokio::test]
async fn csv_with_missing_identity_rejects_whole_file() {
    let app = TestApp::new().await;

    let csv = "id,name\n1,Widget\n,Nameless\n";
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/products/import",
            Some(json!({ "csvContent": csv })),
        )
        .await;
    let (status, payload) = response_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["message"].as_str().unwrap().contains("row 3"));

    // Whole-file rejection: not even the valid first row lands.
    let count = product::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn purchase_order_upsert_and_derived_item_count() {
    let app = TestApp::new().await;

    let body = json!({
        "poNumber": "PO-1001",
        "supplierName": "Bolt & Co",
        "supplierNumber": "SUP-9",
        "status": "in-transit",
        "priority": "high",
        "totalValue": "2500.00",
        "currency": "EUR",
        "expectedDelivery": "2025-09-01T00:00:00Z",
        "lines": [
            {"item_name": "M8 bolts", "sku": "M8", "quantity": 500, "unit_cost": "0.05"},
            {"item_name": "M8 washers", "quantity": 250, "unit_cost": "0.02"}
        ]
    });

    let response = app
        .request_authenticated(Method::PUT, "/api/v1/purchase-orders", Some(body.clone()))
        .await;
    let (status, payload) = response_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["itemCount"], 750);

    // Replace with a smaller line set; the derived count follows the lines.
    let mut replacement = body;
    replacement["lines"] = json!([
        {"item_name": "M8 bolts", "sku": "M8", "quantity": 100, "unit_cost": "0.05"}
    ]);
    let response = app
        .request_authenticated(Method::PUT, "/api/v1/purchase-orders", Some(replacement))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(Method::GET, "/api/v1/purchase-orders/PO-1001", None)
        .await;
    let (status, payload) = response_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["itemCount"], 100);
    assert_eq!(payload["data"]["lines"].as_array().unwrap().len(), 1);
    assert_eq!(payload["data"]["status"], "in-transit");
}

#[tokio::test]
async fn unknown_purchase_order_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/purchase-orders/PO-MISSING", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn credential_roundtrip_reports_connection_without_echoing_secrets() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/v1/integrations/credentials/storefront",
            None,
        )
        .await;
    let (status, payload) = response_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["connected"], false);

    let response = app
        .request_authenticated(
            Method::PUT,
            "/api/v1/integrations/credentials",
            Some(json!({
                "integrationType": "Storefront",
                "credentials": {"store_url": "https://shop.example.com", "consumer_key": "ck", "consumer_secret": "cs"}
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/v1/integrations/credentials/storefront",
            None,
        )
        .await;
    let (status, payload) = response_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["connected"], true);
    // Presence metadata only.
    assert!(payload["data"].get("credentials").is_none());
}

#[tokio::test]
async fn saving_credentials_twice_keeps_one_row_per_pair() {
    let app = TestApp::new().await;

    for key in ["ck_first", "ck_second"] {
        let response = app
            .request_authenticated(
                Method::PUT,
                "/api/v1/integrations/credentials",
                Some(json!({
                    "integrationType": "storefront",
                    "credentials": {"store_url": "https://shop.example.com", "consumer_key": key, "consumer_secret": "cs"}
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = app
        .state
        .services
        .credentials
        .get(app.user_id, "storefront")
        .await
        .unwrap()
        .expect("credentials should exist");
    assert_eq!(stored.credentials["consumer_key"], "ck_second");
}

#[tokio::test]
async fn health_endpoint_reports_database_reachability() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    let (status, payload) = response_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["database"], "reachable");
}
