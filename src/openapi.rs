use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::webhooks::product_webhook,
        crate::handlers::webhooks::order_webhook,
        crate::handlers::sync::sync_products,
        crate::handlers::sync::sync_orders,
        crate::handlers::orders::at_risk_orders,
        crate::handlers::orders::list_orders,
        crate::handlers::retention::sweep,
        crate::handlers::products::list_products,
        crate::handlers::products::import_catalog,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::upsert_purchase_order,
        crate::handlers::credentials::save_credentials,
        crate::handlers::credentials::credential_status,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::webhooks::WebhookAck,
        crate::handlers::sync::ProductSyncResponse,
        crate::handlers::sync::OrderSyncResponse,
        crate::handlers::retention::SweepResponse,
        crate::handlers::products::CsvImportRequest,
        crate::handlers::products::CsvImportResponse,
        crate::handlers::credentials::SaveCredentialsRequest,
        crate::handlers::credentials::CredentialStatus,
        crate::services::retention::SweptOrder,
        crate::services::purchase_orders::UpsertPurchaseOrderRequest,
        crate::services::purchase_orders::PurchaseOrderView,
        crate::services::purchase_orders::PurchaseOrderLineInput,
        crate::models::RiskLevel,
        crate::models::AtRiskOrder,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Webhooks", description = "Push ingestion from external systems"),
        (name = "Sync", description = "Bulk polling sync against external APIs"),
        (name = "Orders", description = "Order views, risk classification, retention"),
        (name = "Products", description = "Product catalog views and import"),
        (name = "Purchase Orders", description = "Inbound purchase order tracking"),
        (name = "Integrations", description = "Integration credential management"),
    ),
    info(
        title = "Logisync API",
        description = "Backend for the small-business logistics dashboard"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Swagger UI served at /docs, backed by the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
