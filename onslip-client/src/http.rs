//! HTTP client for the Onslip 360 REST API

use crate::api::{Filter, OnslipApi};
use crate::hawk::{self, Credentials};
use crate::types::*;
use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client signing every request with Hawk
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    realm: String,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            realm: config.realm.clone(),
            credentials: Credentials::from_base64(config.key_id.clone(), &config.key)?,
        })
    }

    /// Absolute URL of a realm-relative path such as `orders/` or `tabs/12`
    fn url(&self, path: &str, filter: Option<&Filter>) -> ClientResult<Url> {
        let raw = format!("{}/~{}/{}", self.base_url, self.realm, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if let Some(filter) = filter {
            url.query_pairs_mut().append_pair("q", &filter.to_query());
        }
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        filter: Option<&Filter>,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response> {
        let url = self.url(path, filter)?;
        let payload = body.map(serde_json::to_vec).transpose()?;

        let auth = hawk::sign(
            &self.credentials,
            method.as_str(),
            &url,
            payload.as_deref().map(|p| (JSON_CONTENT_TYPE, p)),
        )?;

        tracing::debug!(method = %method, url = %url, "Onslip request");

        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .header(reqwest::header::ACCEPT, JSON_CONTENT_TYPE);
        if let Some(payload) = payload {
            request = request
                .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(payload);
        }

        let response = request.send().await?;
        Self::check_status(response).await
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str, filter: Option<&Filter>) -> ClientResult<T> {
        let response = self.send::<()>(Method::GET, path, filter, None).await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self.send(Method::POST, path, None, Some(body)).await?;
        Self::handle_response(response).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self.send(Method::PATCH, path, None, Some(body)).await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request, ignoring any body
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send::<()>(Method::DELETE, path, None, None).await?;
        Ok(())
    }

    /// Map error statuses to `ClientError`
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await?;
        tracing::warn!(status = %status, body = %text, "Onslip request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(text),
            _ => ClientError::Internal(format!("{}: {}", status, text)),
        })
    }

    /// Decode a successful response body
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::InvalidResponse(format!("{}: {}", e, String::from_utf8_lossy(&bytes)))
        })
    }
}

fn item(collection: &str, id: RemoteId) -> String {
    format!("{}/{}", collection, id)
}

#[async_trait]
impl OnslipApi for HttpClient {
    // ========== Orders ==========

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.get("orders/", None).await
    }

    async fn get_order(&self, id: RemoteId) -> ClientResult<Order> {
        self.get(&item("orders", id), None).await
    }

    async fn add_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        self.post("orders/", order).await
    }

    async fn update_order(&self, id: RemoteId, update: &OrderUpdate) -> ClientResult<Order> {
        self.patch(&item("orders", id), update).await
    }

    async fn remove_order(&self, id: RemoteId) -> ClientResult<()> {
        self.delete(&item("orders", id)).await
    }

    // ========== Resources ==========

    async fn list_resources(&self, filter: Option<&Filter>) -> ClientResult<Vec<Resource>> {
        self.get("resources/", filter).await
    }

    async fn get_resource(&self, id: RemoteId) -> ClientResult<Resource> {
        self.get(&item("resources", id), None).await
    }

    async fn add_resource(&self, resource: &ResourceCreate) -> ClientResult<Resource> {
        self.post("resources/", resource).await
    }

    async fn update_resource(&self, id: RemoteId, update: &ResourceUpdate) -> ClientResult<Resource> {
        self.patch(&item("resources", id), update).await
    }

    async fn remove_resource(&self, id: RemoteId) -> ClientResult<()> {
        self.delete(&item("resources", id)).await
    }

    // ========== Labels ==========

    async fn list_labels(&self, filter: Option<&Filter>) -> ClientResult<Vec<Label>> {
        self.get("labels/", filter).await
    }

    async fn get_label(&self, id: RemoteId) -> ClientResult<Label> {
        self.get(&item("labels", id), None).await
    }

    async fn add_label(&self, label: &LabelCreate) -> ClientResult<Label> {
        self.post("labels/", label).await
    }

    async fn remove_label(&self, id: RemoteId) -> ClientResult<()> {
        self.delete(&item("labels", id)).await
    }

    async fn list_label_categories(&self, filter: Option<&Filter>) -> ClientResult<Vec<LabelCategory>> {
        self.get("label-categories/", filter).await
    }

    async fn add_label_category(&self, category: &LabelCategoryCreate) -> ClientResult<LabelCategory> {
        self.post("label-categories/", category).await
    }

    // ========== Locations ==========

    async fn list_locations(&self) -> ClientResult<Vec<Location>> {
        self.get("locations/", None).await
    }

    async fn add_location(&self, location: &LocationCreate) -> ClientResult<Location> {
        self.post("locations/", location).await
    }

    // ========== Tabs ==========

    async fn list_tabs(&self) -> ClientResult<Vec<Tab>> {
        self.get("tabs/", None).await
    }

    async fn get_tab(&self, id: RemoteId) -> ClientResult<Tab> {
        self.get(&item("tabs", id), None).await
    }

    async fn add_tab(&self, tab: &TabCreate) -> ClientResult<Tab> {
        self.post("tabs/", tab).await
    }

    async fn update_tab(&self, id: RemoteId, update: &TabUpdate) -> ClientResult<Tab> {
        self.patch(&item("tabs", id), update).await
    }

    async fn remove_tab(&self, id: RemoteId) -> ClientResult<()> {
        self.delete(&item("tabs", id)).await
    }

    // ========== Menu ==========

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.get("products/", None).await
    }

    async fn get_product(&self, id: RemoteId) -> ClientResult<Product> {
        self.get(&item("products", id), None).await
    }

    async fn add_product(&self, product: &ProductCreate) -> ClientResult<Product> {
        self.post("products/", product).await
    }

    async fn update_product(&self, id: RemoteId, product: &ProductCreate) -> ClientResult<Product> {
        self.patch(&item("products", id), product).await
    }

    async fn remove_product(&self, id: RemoteId) -> ClientResult<()> {
        self.delete(&item("products", id)).await
    }

    async fn list_product_groups(&self) -> ClientResult<Vec<ProductGroup>> {
        self.get("product-groups/", None).await
    }

    async fn get_product_group(&self, id: RemoteId) -> ClientResult<ProductGroup> {
        self.get(&item("product-groups", id), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        ClientConfig::new("https://test.onslip360.com/v1/")
            .with_credentials("demo", "key:demo", "c2VjcmV0")
            .build_http_client()
            .unwrap()
    }

    #[test]
    fn test_url_includes_realm() {
        let url = client().url("orders/", None).unwrap();
        assert_eq!(url.as_str(), "https://test.onslip360.com/v1/~demo/orders/");
    }

    #[test]
    fn test_url_encodes_filter() {
        let url = client()
            .url("resources/", Some(&Filter::name("table-states-resource")))
            .unwrap();
        assert_eq!(url.query(), Some("q=name%3Dtable-states-resource"));
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let result = ClientConfig::default()
            .with_credentials("demo", "key:demo", "not base64!")
            .build_http_client();
        assert!(matches!(result, Err(ClientError::Auth(_))));
    }
}
