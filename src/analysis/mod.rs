//! Linguistic analysis client (Stanza sidecar) and startup warm-up.
//!
//! Tokenization, tagging, and feature extraction run in a separate Stanza
//! service; this module only speaks its HTTP contract. Pipelines for the
//! supported languages are pre-loaded once at startup on a background task
//! gated behind a readiness flag the health check reports. A request that
//! arrives before warm-up completes is still servable — the sidecar loads
//! the pipeline on demand, just slower.

mod features;

pub use features::{enrich, friendly_features};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PRELOAD_LANGUAGES;
use crate::models::AnalysisRow;
use crate::translate::UpstreamError;

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Tokenize and tag `text` in `lang`, returning one row per word.
    async fn analyze(&self, lang: &str, text: &str) -> Result<Vec<AnalysisRow>, UpstreamError>;

    /// Ask the backing service to load the pipeline for `lang` ahead of
    /// the first request. Default is a no-op.
    async fn warm_up(&self, _lang: &str) -> Result<(), UpstreamError> {
        Ok(())
    }
}

/// Readiness flag flipped by the warm-up task and read by `/health`.
#[derive(Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Pre-load the analysis pipelines on a background task, then flip the
/// readiness flag. A failed preload is logged and does not keep the
/// service in the loading state — analysis degrades to on-demand loading.
pub fn spawn_warm_up(analyzer: Arc<dyn Analyzer>, readiness: Readiness) {
    tokio::spawn(async move {
        tracing::info!("Pre-loading analysis pipelines...");
        for lang in PRELOAD_LANGUAGES {
            if let Err(e) = analyzer.warm_up(lang).await {
                tracing::warn!(lang, error = %e, "Pipeline warm-up failed");
            }
        }
        tracing::info!("Analysis pipelines ready.");
        readiness.mark_ready();
    });
}

/// HTTP client for the Stanza sidecar service.
pub struct StanzaClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl StanzaClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    fn map_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_connect() {
            UpstreamError::Connection {
                service: "stanza",
                url: self.base_url.clone(),
            }
        } else if e.is_timeout() {
            UpstreamError::Timeout {
                service: "stanza",
                seconds: self.timeout_secs,
            }
        } else {
            UpstreamError::ResponseParsing("stanza", e.to_string())
        }
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    lang: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    rows: Vec<AnalysisRow>,
}

#[derive(Serialize)]
struct PreloadRequest<'a> {
    lang: &'a str,
}

#[async_trait]
impl Analyzer for StanzaClient {
    async fn analyze(&self, lang: &str, text: &str) -> Result<Vec<AnalysisRow>, UpstreamError> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { lang, text })
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: "stanza",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::ResponseParsing("stanza", e.to_string()))?;

        Ok(parsed.rows)
    }

    async fn warm_up(&self, lang: &str) -> Result<(), UpstreamError> {
        let url = format!("{}/preload", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PreloadRequest { lang })
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: "stanza",
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
