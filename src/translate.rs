//! Machine translation client (Itzuli).
//!
//! Translation is an external capability consumed over HTTP. The trait
//! boundary keeps the pipeline testable with a mock; the real client
//! mirrors the Itzuli wire contract: bearer-authenticated POST returning
//! `{translated_text}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Cannot reach {service} at {url}")]
    Connection { service: &'static str, url: String },
    #[error("{service} request timed out after {seconds}s")]
    Timeout { service: &'static str, seconds: u64 },
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{0} response could not be parsed: {1}")]
    ResponseParsing(&'static str, String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, UpstreamError>;
}

/// HTTP client for the Itzuli translation API.
pub struct ItzuliClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ItzuliClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

#[async_trait]
impl Translator for ItzuliClient {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}/translate", self.base_url);
        let body = TranslateRequest {
            text,
            source_language: source_lang,
            target_language: target_lang,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    UpstreamError::Connection {
                        service: "itzuli",
                        url: self.base_url.clone(),
                    }
                } else if e.is_timeout() {
                    UpstreamError::Timeout {
                        service: "itzuli",
                        seconds: self.timeout_secs,
                    }
                } else {
                    UpstreamError::ResponseParsing("itzuli", e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: "itzuli",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::ResponseParsing("itzuli", e.to_string()))?;

        Ok(parsed.translated_text)
    }
}
