//! Lerrokatu — a streamed cross-lingual word-alignment server.
//!
//! Given a source sentence and a target language, the pipeline composes
//! three external capabilities — Itzuli machine translation, a Stanza
//! analysis sidecar, and an LLM alignment generator — into a three-layer
//! token-span alignment, served over SSE with per-stage progress events.
//! The orchestration core is a daily per-client quota gate, a
//! content-addressed result cache that makes repeats free, and a
//! prompt/response contract that degrades LLM failures to empty layers
//! instead of failing the request.

pub mod align;
pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod quota;
pub mod server;
pub mod translate;
