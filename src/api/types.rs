//! Shared state and request types for the API layer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Deserialize;

use crate::analysis::{Analyzer, Readiness};
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::translate::Translator;

/// Shared context for all routes, constructed once at process start and
/// passed by state — stores are never reached through ambient globals, so
/// tests can substitute every collaborator.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<Config>,
    pub pipeline: Pipeline,
    pub translator: Arc<dyn Translator>,
    pub analyzer: Arc<dyn Analyzer>,
    pub readiness: Readiness,
}

/// Request body shared by both analysis endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequestBody {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default = "default_sentence_id")]
    pub sentence_id: String,
}

fn default_sentence_id() -> String {
    "default".to_string()
}

/// Client identity for the quota gate: first entry of `X-Forwarded-For`
/// when present (the server usually sits behind a proxy), else the socket
/// peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}
