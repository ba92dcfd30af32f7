//! Backends the orchestrator can drive
//!
//! [`LocalBackend`] runs the handlers in-process; [`HttpBackend`] talks to a
//! running `notewise serve` instance. Both surface the same error taxonomy.

use crate::api::ErrorBody;
use crate::error::{classify_upstream, NotewiseError, Result};
use crate::transform::{DefinitionHandler, TransformHandler};
use crate::types::{DefinitionEntry, DefinitionRequest, TransformRequest, TransformResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Transform and definition capability used by the orchestrator
#[async_trait]
pub trait TransformBackend: Send + Sync {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResult>;

    async fn define(&self, request: DefinitionRequest) -> Result<DefinitionEntry>;
}

/// Calls the handlers directly
pub struct LocalBackend {
    transform: Arc<TransformHandler>,
    definitions: Arc<DefinitionHandler>,
}

impl LocalBackend {
    pub fn new(transform: Arc<TransformHandler>, definitions: Arc<DefinitionHandler>) -> Self {
        Self {
            transform,
            definitions,
        }
    }
}

#[async_trait]
impl TransformBackend for LocalBackend {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResult> {
        self.transform.handle(&request).await
    }

    async fn define(&self, request: DefinitionRequest) -> Result<DefinitionEntry> {
        self.definitions.handle(&request).await
    }
}

/// Calls a remote notewise API server
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| NotewiseError::Upstream(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => NotewiseError::from_code(&body.code, &body.error, body.details.as_deref()),
            Err(_) => classify_upstream(Some(status.as_u16()), &text),
        })
    }
}

#[async_trait]
impl TransformBackend for HttpBackend {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResult> {
        self.post("/api/transform", &request).await
    }

    async fn define(&self, request: DefinitionRequest) -> Result<DefinitionEntry> {
        self.post("/api/definitions", &request).await
    }
}
