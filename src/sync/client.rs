use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::{Host, Url};

use crate::errors::ServiceError;

pub const INTEGRATION_STOREFRONT: &str = "storefront";
pub const INTEGRATION_WAREHOUSE: &str = "warehouse";

/// Credential payload for the e-commerce storefront integration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontCredentials {
    pub store_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// Credential payload for the warehouse-management integration.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseCredentials {
    pub base_url: String,
    pub api_key: String,
}

/// Normalize a user-entered store URL: strip the trailing slash and force
/// https unless the host is a loopback/local address (plain http is
/// tolerated there for development stores).
pub fn normalize_store_url(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(
            "store URL must not be empty".to_string(),
        ));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| {
        ServiceError::ValidationError(format!("'{}' is not a valid store URL: {}", raw, e))
    })?;

    if !is_local_host(&url) && url.scheme() != "https" {
        url.set_scheme("https").map_err(|_| {
            ServiceError::ValidationError(format!(
                "'{}' does not use a supported URL scheme",
                raw
            ))
        })?;
    }

    let mut normalized = url.to_string();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    Ok(normalized)
}

fn is_local_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => {
            domain == "localhost" || domain.ends_with(".localhost") || domain.ends_with(".local")
        }
        Some(Host::Ipv4(ip)) => ip.is_loopback() || ip.is_private(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Turn a transport-level failure into a user-actionable message.
pub fn classify_transport_error(context: &str, err: &reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::UpstreamError(format!(
            "Timed out waiting for {} - the host may be slow or unreachable; retry once connectivity is confirmed",
            context
        ))
    } else if err.is_connect() {
        ServiceError::UpstreamError(format!(
            "Could not reach {} - verify the URL and that the host is online",
            context
        ))
    } else {
        ServiceError::UpstreamError(format!("Request to {} failed: {}", context, err))
    }
}

/// Turn a non-success upstream status into a user-actionable message.
pub fn classify_status_error(context: &str, status: StatusCode) -> ServiceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::UpstreamError(format!(
            "{} rejected the credentials (HTTP {}) - re-check the configured API keys",
            context,
            status.as_u16()
        )),
        StatusCode::NOT_FOUND => ServiceError::UpstreamError(format!(
            "{} endpoint not found (HTTP 404) - verify the configured URL",
            context
        )),
        other => ServiceError::UpstreamError(format!(
            "{} returned an unexpected error (HTTP {})",
            context,
            other.as_u16()
        )),
    }
}

/// Paging client for the storefront REST API.
pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl StorefrontClient {
    pub fn new(creds: &StorefrontCredentials, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = normalize_store_url(&creds.store_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            consumer_key: creds.consumer_key.clone(),
            consumer_secret: creds.consumer_secret.clone(),
        })
    }

    #[instrument(skip(self), fields(page))]
    pub async fn fetch_products_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, ServiceError> {
        self.fetch_page("products", page, per_page).await
    }

    #[instrument(skip(self), fields(page))]
    pub async fn fetch_orders_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, ServiceError> {
        self.fetch_page("orders", page, per_page).await
    }

    async fn fetch_page(
        &self,
        resource: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, ServiceError> {
        let url = format!("{}/wp-json/wc/v3/{}", self.base_url, resource);
        debug!(url = %url, page, "Fetching storefront page");

        let response = self
            .http
            .get(&url)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await
            .map_err(|e| classify_transport_error("the storefront", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status_error("The storefront", status));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ServiceError::UpstreamError(format!(
                "The storefront returned a response that could not be parsed: {}",
                e
            )))
    }
}

/// Paging client for the warehouse-management API.
pub struct WarehouseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WarehouseClient {
    pub fn new(creds: &WarehouseCredentials, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = normalize_store_url(&creds.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: creds.api_key.clone(),
        })
    }

    #[instrument(skip(self), fields(page))]
    pub async fn fetch_orders_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, ServiceError> {
        let url = format!("{}/api/v1/orders", self.base_url);
        debug!(url = %url, page, "Fetching warehouse page");

        let response = self
            .http
            .get(&url)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| classify_transport_error("the warehouse system", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status_error("The warehouse system", status));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ServiceError::UpstreamError(format!(
                "The warehouse system returned a response that could not be parsed: {}",
                e
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(
            normalize_store_url("https://shop.example.com/").unwrap(),
            "https://shop.example.com"
        );
    }

    #[test]
    fn insecure_scheme_is_upgraded_for_public_hosts() {
        assert_eq!(
            normalize_store_url("http://shop.example.com").unwrap(),
            "https://shop.example.com"
        );
    }

    #[test]
    fn bare_host_gets_https() {
        assert_eq!(
            normalize_store_url("shop.example.com").unwrap(),
            "https://shop.example.com"
        );
    }

    #[test]
    fn loopback_hosts_keep_http() {
        assert_eq!(
            normalize_store_url("http://localhost:8088/").unwrap(),
            "http://localhost:8088"
        );
        assert_eq!(
            normalize_store_url("http://127.0.0.1:8088").unwrap(),
            "http://127.0.0.1:8088"
        );
    }

    #[test]
    fn empty_url_is_rejected() {
        assert_matches!(
            normalize_store_url("   "),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn status_classification_distinguishes_causes() {
        let msg = classify_status_error("The storefront", StatusCode::UNAUTHORIZED).to_string();
        assert!(msg.contains("rejected the credentials"));

        let msg = classify_status_error("The storefront", StatusCode::NOT_FOUND).to_string();
        assert!(msg.contains("endpoint not found"));

        let msg =
            classify_status_error("The storefront", StatusCode::INTERNAL_SERVER_ERROR).to_string();
        assert!(msg.contains("HTTP 500"));
    }
}
