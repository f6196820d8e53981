//! Remote store client: one REST collection per record kind.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{domain::RecordId, protocol::HealthStatus};
use tracing::debug;
use url::Url;

use crate::{
    error::{ApiBaseError, StoreError},
    kind::RecordKind,
};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
const HEALTH_PATH: &str = "/health";

#[async_trait]
pub trait RemoteStore<K: RecordKind>: Send + Sync {
    async fn list_all(&self) -> Result<Vec<K::Record>, StoreError>;
    async fn get_one(&self, id: &RecordId) -> Result<K::Record, StoreError>;
    async fn create(&self, draft: &K::Draft) -> Result<(), StoreError>;
    async fn update(&self, id: &RecordId, changes: &K::Changes) -> Result<(), StoreError>;
    async fn delete_one(&self, id: &RecordId) -> Result<(), StoreError>;
}

pub fn parse_api_base(raw: &str) -> Result<Url, ApiBaseError> {
    let url = Url::parse(raw).map_err(|source| ApiBaseError::Parse {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ApiBaseError::NotHierarchical(raw.to_string()));
    }
    Ok(url)
}

/// reqwest-backed store. A single attempt per call; no timeout, retry, or auth header.
pub struct HttpStore<K> {
    http: Client,
    api_base: Url,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for HttpStore<K> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            api_base: self.api_base.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: RecordKind> HttpStore<K> {
    pub fn new(api_base: &str) -> Result<Self, ApiBaseError> {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: &str) -> Result<Self, ApiBaseError> {
        Ok(Self {
            http,
            api_base: parse_api_base(api_base)?,
            _kind: PhantomData,
        })
    }

    pub fn collection_url(&self) -> Url {
        self.url_with(&[])
    }

    pub fn record_url(&self, id: &RecordId) -> Url {
        self.url_with(&[id.as_str()])
    }

    fn url_with(&self, tail: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // parse_api_base rejected cannot-be-a-base urls, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(K::DESCRIPTOR.collection)
                .extend(tail);
        }
        url
    }
}

async fn send(
    kind: &'static str,
    method: &'static str,
    url: &Url,
    request: RequestBuilder,
) -> Result<Response, StoreError> {
    debug!(kind, method, url = %url, "dispatching store request");
    let response = request.send().await.map_err(|source| StoreError::Transport {
        method,
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Rejected {
            method,
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}

/// `GET` plus JSON decode. An unreadable body counts as a transport failure.
async fn fetch<T: DeserializeOwned>(
    http: &Client,
    kind: &'static str,
    url: Url,
) -> Result<T, StoreError> {
    let response = send(kind, "GET", &url, http.get(url.clone())).await?;
    response
        .json::<T>()
        .await
        .map_err(|source| StoreError::Transport {
            method: "GET",
            url: url.to_string(),
            source,
        })
}

#[async_trait]
impl<K: RecordKind> RemoteStore<K> for HttpStore<K> {
    async fn list_all(&self) -> Result<Vec<K::Record>, StoreError> {
        fetch(&self.http, K::DESCRIPTOR.name, self.collection_url()).await
    }

    async fn get_one(&self, id: &RecordId) -> Result<K::Record, StoreError> {
        fetch(&self.http, K::DESCRIPTOR.name, self.record_url(id)).await
    }

    async fn create(&self, draft: &K::Draft) -> Result<(), StoreError> {
        let url = self.collection_url();
        send(K::DESCRIPTOR.name, "POST", &url, self.http.post(url.clone()).json(draft)).await?;
        Ok(())
    }

    async fn update(&self, id: &RecordId, changes: &K::Changes) -> Result<(), StoreError> {
        let url = self.record_url(id);
        send(K::DESCRIPTOR.name, "PUT", &url, self.http.put(url.clone()).json(changes)).await?;
        Ok(())
    }

    async fn delete_one(&self, id: &RecordId) -> Result<(), StoreError> {
        let url = self.record_url(id);
        send(K::DESCRIPTOR.name, "DELETE", &url, self.http.delete(url.clone())).await?;
        Ok(())
    }
}

/// `GET /health` on the origin of the API base.
pub async fn check_health(http: &Client, api_base: &Url) -> Result<HealthStatus, StoreError> {
    let url = api_base
        .join(HEALTH_PATH)
        .map_err(|source| StoreError::Endpoint {
            base: api_base.to_string(),
            path: HEALTH_PATH,
            source,
        })?;
    fetch(http, "health", url).await
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
