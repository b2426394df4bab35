//! Browser transport for the admin API.

use async_trait::async_trait;
use edu_admin_shared::{
    session::SESSION_STORAGE_KEY, ApiError, CollectionBackend, DeleteAction, EntityId, ListQuery,
    RawSnapshot, Session, SessionStore,
};
use futures::future::{select, Either};
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::future::TimeoutFuture;
use serde_json::Value;

// API base URL - 编译时从环境变量读取，默认本地开发地址
// 生产环境通过 workflow 设置 EDU_ADMIN_API_BASE 环境变量
pub const API_BASE: &str = match option_env!("EDU_ADMIN_API_BASE") {
    Some(url) => url,
    None => "http://localhost:3000/api",
};

/// Client-side deadline for every admin request.
pub const REQUEST_TIMEOUT_MS: u32 = 20_000;

fn admin_base() -> String {
    format!("{}/admin", API_BASE.trim_end_matches('/'))
}

fn collection_url(resource: &str) -> String {
    format!("{}/{}", admin_base(), urlencoding::encode(resource))
}

fn entity_url(resource: &str, id: &EntityId) -> String {
    format!("{}/{}", collection_url(resource), urlencoding::encode(id.as_str()))
}

/// `gloo-net` implementation of [`CollectionBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlooBackend {
    bearer: Option<String>,
    timeout_ms: u32,
}

impl GlooBackend {
    pub fn new(session: Option<&Session>) -> Self {
        Self {
            bearer: session.map(Session::bearer),
            timeout_ms: REQUEST_TIMEOUT_MS,
        }
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("Accept", "application/json");
        match self.bearer.as_deref() {
            Some(bearer) => builder.header("Authorization", bearer),
            None => builder,
        }
    }

    async fn send(&self, request: Result<Request, gloo_net::Error>) -> Result<Value, ApiError> {
        let request = request.map_err(|e| ApiError::Network(format!("Request error: {:?}", e)))?;
        let response = match select(Box::pin(request.send()), TimeoutFuture::new(self.timeout_ms))
            .await
        {
            Either::Left((result, _)) => {
                result.map_err(|e| ApiError::Network(format!("Network error: {:?}", e)))?
            },
            Either::Right(_) => {
                return Err(ApiError::Timeout {
                    after_ms: u64::from(self.timeout_ms),
                })
            },
        };
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Read error: {:?}", e)))?;
        if !response.ok() {
            return Err(ApiError::from_response(status, &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("Parse error: {}", e)))
    }
}

#[async_trait(?Send)]
impl CollectionBackend for GlooBackend {
    async fn fetch_page(&self, resource: &str, query: &ListQuery) -> Result<RawSnapshot, ApiError> {
        let mut url = collection_url(resource);
        let query_string = query.to_query_string();
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
        let body = self.send(self.prepare(Request::get(&url)).build()).await?;
        RawSnapshot::from_body(body, resource)
    }

    async fn fetch_entity(&self, resource: &str, id: &EntityId) -> Result<Value, ApiError> {
        let url = entity_url(resource, id);
        self.send(self.prepare(Request::get(&url)).build()).await
    }

    async fn create_entity(&self, resource: &str, payload: &Value) -> Result<Value, ApiError> {
        let url = collection_url(resource);
        self.send(self.prepare(Request::post(&url)).json(payload))
            .await
    }

    async fn update_entity(
        &self,
        resource: &str,
        id: &EntityId,
        payload: &Value,
    ) -> Result<Value, ApiError> {
        let url = entity_url(resource, id);
        self.send(self.prepare(Request::put(&url)).json(payload))
            .await
    }

    async fn patch_entity(
        &self,
        resource: &str,
        id: &EntityId,
        payload: &Value,
    ) -> Result<Value, ApiError> {
        let url = entity_url(resource, id);
        self.send(self.prepare(Request::patch(&url)).json(payload))
            .await
    }

    async fn delete_entity(&self, resource: &str, id: &EntityId) -> Result<DeleteAction, ApiError> {
        let url = entity_url(resource, id);
        let body = self
            .send(self.prepare(Request::delete(&url)).build())
            .await?;
        Ok(DeleteAction::from_body(&body))
    }
}

/// Session the login flow left in `localStorage`.
pub struct LocalStorageSession;

impl SessionStore for LocalStorageSession {
    fn load(&self) -> Option<String> {
        web_sys::window()?
            .local_storage()
            .ok()
            .flatten()?
            .get_item(SESSION_STORAGE_KEY)
            .ok()
            .flatten()
    }
}
