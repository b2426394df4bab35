//! `reqwest` implementation of [`CollectionBackend`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use edu_admin_shared::{ApiError, CollectionBackend, DeleteAction, EntityId, ListQuery, RawSnapshot};
use reqwest::{header, Method, RequestBuilder};
use serde_json::Value;

use crate::config::ClientConfig;

/// Talks to `{api_base}/admin/{resource}` routes.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    admin_base: String,
    bearer: Option<String>,
    timeout: Duration,
}

impl HttpBackend {
    /// Build a client with the configured deadline and bearer token.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build admin http client")?;
        Ok(Self {
            client,
            admin_base: config.admin_base(),
            bearer: config.session.as_ref().map(|session| session.bearer()),
            timeout: config.timeout,
        })
    }

    fn collection_url(&self, resource: &str) -> String {
        format!("{}/{}", self.admin_base, urlencoding::encode(resource))
    }

    fn entity_url(&self, resource: &str, id: &EntityId) -> String {
        format!("{}/{}", self.collection_url(resource), urlencoding::encode(id.as_str()))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        match self.bearer.as_deref() {
            Some(bearer) => builder.header(header::AUTHORIZATION, bearer),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "admin api returned an error status");
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|err| ApiError::Decode(format!("invalid JSON response: {err}")))
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[async_trait(?Send)]
impl CollectionBackend for HttpBackend {
    async fn fetch_page(&self, resource: &str, query: &ListQuery) -> Result<RawSnapshot, ApiError> {
        let mut url = self.collection_url(resource);
        let query_string = query.to_query_string();
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
        let body = self.send(self.request(Method::GET, &url)).await?;
        RawSnapshot::from_body(body, resource)
    }

    async fn fetch_entity(&self, resource: &str, id: &EntityId) -> Result<Value, ApiError> {
        let url = self.entity_url(resource, id);
        self.send(self.request(Method::GET, &url)).await
    }

    async fn create_entity(&self, resource: &str, payload: &Value) -> Result<Value, ApiError> {
        let url = self.collection_url(resource);
        self.send(self.request(Method::POST, &url).json(payload))
            .await
    }

    async fn update_entity(
        &self,
        resource: &str,
        id: &EntityId,
        payload: &Value,
    ) -> Result<Value, ApiError> {
        let url = self.entity_url(resource, id);
        self.send(self.request(Method::PUT, &url).json(payload))
            .await
    }

    async fn patch_entity(
        &self,
        resource: &str,
        id: &EntityId,
        payload: &Value,
    ) -> Result<Value, ApiError> {
        let url = self.entity_url(resource, id);
        self.send(self.request(Method::PATCH, &url).json(payload))
            .await
    }

    async fn delete_entity(&self, resource: &str, id: &EntityId) -> Result<DeleteAction, ApiError> {
        let url = self.entity_url(resource, id);
        let body = self.send(self.request(Method::DELETE, &url)).await?;
        Ok(DeleteAction::from_body(&body))
    }
}
