#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use glossary_api::auth::issue_session_token;
use glossary_api::config::AppConfig;
use glossary_api::database::models::UserIdentity;
use glossary_api::database::MemoryStore;
use glossary_api::storage::MemoryStorage;
use glossary_api::AppState;

/// The full router over in-memory store and storage
pub struct TestApp {
    pub router: Router,
    pub config: AppConfig,
    pub storage: Arc<MemoryStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::development();
        let storage = Arc::new(MemoryStorage::new("https://cdn.test"));
        let state = AppState::new(config.clone(), Arc::new(MemoryStore::new()), storage.clone());

        Self {
            router: glossary_api::app(state),
            config,
            storage,
        }
    }

    /// Session token for the given open id, as the OAuth callback would issue it
    pub fn token_for(&self, open_id: &str) -> String {
        let identity = UserIdentity {
            open_id: open_id.to_string(),
            name: Some(format!("User {}", open_id)),
            email: Some(format!("{}@example.test", open_id)),
            login_method: Some("test".to_string()),
        };
        issue_session_token(&self.config.security, identity).expect("token")
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn create_glossary(&self, token: &str, title: &str) -> Result<i64> {
        let (status, body) = self.post("/api/glossaries", token, json!({ "title": title })).await?;
        assert_eq!(status, StatusCode::CREATED, "create glossary failed: {}", body);
        Ok(body["data"]["id"].as_i64().expect("glossary id"))
    }

    pub async fn create_entry(&self, token: &str, glossary_id: i64, term: &str, definition: &str) -> Result<Value> {
        let (status, body) = self
            .post(
                &format!("/api/glossaries/{}/entries", glossary_id),
                token,
                json!({ "term": term, "definition": definition }),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "create entry failed: {}", body);
        Ok(body["data"].clone())
    }
}

/// Terms of a JSON entry array, in order
pub fn terms(entries: &Value) -> Vec<String> {
    entries
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|e| e["term"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
