//! Object storage for entry images.
//!
//! The store only accepts a blob under a key and hands back a public URL. Keys
//! are chosen by the caller; nothing here inspects the bytes.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage rejected upload with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredObject, StorageError>;
}

/// Uploads with `PUT {endpoint}/{key}` and a bearer API key
pub struct HttpStorage {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    public_base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

impl HttpStorage {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.as_deref().map(trim_slash),
            api_key: config.api_key.clone(),
            public_base_url: config.public_base_url.as_deref().map(trim_slash),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn public_url(&self, endpoint: &str, key: &str) -> String {
        let base = self.public_base_url.as_deref().unwrap_or(endpoint);
        format!("{}/{}", base, key)
    }
}

#[async_trait]
impl ObjectStorage for HttpStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredObject, StorageError> {
        let endpoint = self.endpoint.as_deref().ok_or(StorageError::NotConfigured)?;
        let size = bytes.len();

        let mut request = self
            .client
            .put(format!("{}/{}", endpoint, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { status, body });
        }

        // Some backends answer with the canonical URL; fall back to the configured public base
        let body = response.text().await.unwrap_or_default();
        let url = serde_json::from_str::<UploadResponse>(&body)
            .ok()
            .and_then(|r| r.url)
            .unwrap_or_else(|| self.public_url(endpoint, key));

        tracing::debug!("Stored {} bytes at {}", size, key);

        Ok(StoredObject { key: key.to_string(), url })
    }
}

/// Keeps blobs in memory; used by tests and `--memory` runs
pub struct MemoryStorage {
    base_url: String,
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_slash(&base_url.into()),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Bytes and content type stored under `key`
    pub async fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://glossary")
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredObject, StorageError> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(StoredObject {
            key: key.to_string(),
            url: format!("{}/{}", self.base_url, key),
        })
    }
}

fn trim_slash(s: &str) -> String {
    s.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_returns_public_url() {
        let storage = MemoryStorage::new("https://cdn.example.com/");
        let stored = storage.put("glossaire/1/10-a.png", vec![1, 2, 3], "image/png").await.unwrap();
        assert_eq!(stored.url, "https://cdn.example.com/glossaire/1/10-a.png");
        assert_eq!(
            storage.get("glossaire/1/10-a.png").await,
            Some((vec![1, 2, 3], "image/png".to_string()))
        );
    }

    #[tokio::test]
    async fn unconfigured_http_storage_refuses_upload() {
        let storage = HttpStorage::from_config(&crate::config::AppConfig::development().storage);
        assert!(!storage.is_configured());
        let err = storage.put("k", vec![0], "image/jpeg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotConfigured));
    }

    #[test]
    fn public_url_prefers_public_base() {
        let mut config = crate::config::AppConfig::development().storage;
        config.endpoint = Some("http://minio:9000/bucket/".into());
        let storage = HttpStorage::from_config(&config);
        assert_eq!(storage.public_url("http://minio:9000/bucket", "a/b.png"), "http://minio:9000/bucket/a/b.png");

        config.public_base_url = Some("https://img.example.com".into());
        let storage = HttpStorage::from_config(&config);
        assert_eq!(storage.public_url("http://minio:9000/bucket", "a/b.png"), "https://img.example.com/a/b.png");
    }
}
