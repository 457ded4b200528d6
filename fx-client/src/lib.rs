//! # FX Client SDK
//!
//! A typed Rust client for the FX rate sync API.

use chrono::NaiveDate;
use fx_types::{
    CurrencyReferenceRow, DateInput, DirectoryEntry, ProviderCode, StoredRate, SyncRequest,
    SyncResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} {kind} - {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// FX sync API client.
pub struct FxClient {
    base_url: String,
    http: Client,
}

impl FxClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Synchronizes one country or currency over `[start, end]`.
    pub async fn sync(
        &self,
        country: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SyncResponse, ClientError> {
        let req = SyncRequest {
            country: country.to_string(),
            start_date: DateInput::from(start),
            end_date: DateInput::from(end),
        };
        self.post("/api/sync", &req).await
    }

    /// Lists the currency directory.
    pub async fn currencies(&self) -> Result<Vec<DirectoryEntry>, ClientError> {
        self.get("/api/currencies").await
    }

    /// Lists the stored reference table.
    pub async fn reference(&self) -> Result<Vec<CurrencyReferenceRow>, ClientError> {
        self.get("/api/reference").await
    }

    /// Lists stored rates, optionally for one provider code.
    pub async fn rates(&self, code: Option<ProviderCode>) -> Result<Vec<StoredRate>, ClientError> {
        match code {
            Some(code) => self.get(&format!("/api/rates?provider_code={}", code)).await,
            None => self.get("/api/rates").await,
        }
    }

    /// Downloads a rendered report, returning its content type and body.
    pub async fn report(&self, id: Uuid) -> Result<(String, Vec<u8>), ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/reports/{}", self.base_url, id))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), resp.text().await.unwrap_or_default()));
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await?;
        Ok((content_type, bytes.to_vec()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(api_error(status.as_u16(), body))
        }
    }
}

/// Builds an `Api` error from an error body, falling back to the raw text.
fn api_error(status: u16, body: String) -> ClientError {
    let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|e| e.as_str())
            .map(String::from)
    };
    ClientError::Api {
        status,
        kind: field("kind").unwrap_or_else(|| "unknown".to_string()),
        message: field("error").unwrap_or(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = FxClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = FxClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_api_error_reads_json_body() {
        let err = api_error(
            404,
            r#"{"error": "Not found: Unknown country or currency: Atlantis", "kind": "not_found", "code": 404}"#
                .to_string(),
        );
        match err {
            ClientError::Api { status, kind, message } => {
                assert_eq!(status, 404);
                assert_eq!(kind, "not_found");
                assert!(message.contains("Atlantis"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_keeps_plain_body() {
        match api_error(502, "Bad Gateway".to_string()) {
            ClientError::Api { kind, message, .. } => {
                assert_eq!(kind, "unknown");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
