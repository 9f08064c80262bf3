//! HTTP control-plane client.

use super::{ControlPlane, EntityTarget, RelationRequest, RemoteResponse, Scope};
use crate::config::RemoteConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Talks to the control plane's management API over HTTP.
pub struct HttpControlPlane {
    client: Client,
    base_url: Url,
}

impl HttpControlPlane {
    pub fn new(config: &RemoteConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let base_url = Url::parse(&config.api_url).map_err(|e| {
            ApiError::ConfigError(format!("Invalid control plane URL {}: {}", config.api_url, e))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| ApiError::ConfigError("API key is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn url_for(&self, segments: &[String]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::ConfigError(format!(
                    "Control plane URL cannot be a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<RemoteResponse, ApiError> {
        debug!(method = %method, url = %url, "Control plane request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "Control plane response");
        Ok(RemoteResponse { status, body })
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn get(&self, target: &EntityTarget) -> Result<RemoteResponse, ApiError> {
        let url = self.url_for(&target.item_segments()?)?;
        self.send(Method::GET, url, None).await
    }

    async fn update(&self, target: &EntityTarget, body: &Value) -> Result<RemoteResponse, ApiError> {
        let url = self.url_for(&target.item_segments()?)?;
        self.send(Method::PUT, url, Some(body)).await
    }

    async fn create(&self, target: &EntityTarget, body: &Value) -> Result<RemoteResponse, ApiError> {
        let url = self.url_for(&target.collection_segments()?)?;
        self.send(Method::POST, url, Some(body)).await
    }

    async fn create_relation(
        &self,
        scope: &Scope,
        relation: &RelationRequest,
    ) -> Result<RemoteResponse, ApiError> {
        let url = self.url_for(&scope.relation_segments()?)?;
        let body = serde_json::to_value(relation)?;
        self.send(Method::POST, url, Some(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::EntityKind;

    fn plane(api_url: &str) -> HttpControlPlane {
        HttpControlPlane::new(&RemoteConfig {
            api_url: api_url.to_string(),
            tenant_id: "acme".into(),
            api_key: Some("secret".into()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn builds_escaped_entity_urls() {
        let plane = plane("https://manage.example.com/v1/");
        let target = EntityTarget::new(
            EntityKind::DataComponent,
            &Scope::project("acme", "p 1"),
            "order-summary",
        );
        let url = plane.url_for(&target.item_segments().unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://manage.example.com/v1/tenants/acme/projects/p%201/data-components/order-summary"
        );
    }

    #[test]
    fn relation_url_is_project_scoped() {
        let plane = plane("http://localhost:3002");
        let url = plane
            .url_for(&Scope::project("acme", "p1").relation_segments().unwrap())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3002/tenants/acme/projects/p1/agent-relations"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = HttpControlPlane::new(&RemoteConfig {
            api_url: "not a url".into(),
            ..RemoteConfig::default()
        });
        assert!(matches!(result, Err(ApiError::ConfigError(_))));
    }
}
