use std::collections::HashMap;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} ({code}, HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Thin client for the Glossary HTTP API.
///
/// Every call unwraps the `{ success, data }` envelope; failures come back as
/// `ClientError::Api` carrying the server's code and message.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.http.get(self.url(path)?)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.http.get(self.url(path)?).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.http.post(self.url(path)?).json(body)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.http.patch(self.url(path)?).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.http.delete(self.url(path)?)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!("HTTP {} ({} bytes)", status, text.len());

        match serde_json::from_str::<Value>(&text) {
            Ok(body) => parse_envelope(status, body),
            Err(_) => Err(ClientError::Api {
                status,
                code: "HTTP_ERROR".to_string(),
                message: if text.trim().is_empty() { format!("HTTP {}", status) } else { text },
                field_errors: None,
            }),
        }
    }
}

/// Unwraps a response envelope into `data` or an `Api` error
pub fn parse_envelope<T: DeserializeOwned>(status: u16, body: Value) -> Result<T, ClientError> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        return serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()));
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();
    let code = body
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string();
    let field_errors = body
        .get("field_errors")
        .and_then(|v| serde_json::from_value(v.clone()).ok());

    Err(ClientError::Api { status, code, message, field_errors })
}
