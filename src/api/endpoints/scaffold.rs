//! Combined endpoint: translate, analyze both texts, and enrich with
//! LLM-generated alignments, streaming one SSE event per completed stage.
//!
//! Configuration errors and quota denials resolve before any streaming —
//! the client sees a plain HTTP status. Once the stream starts, failures
//! arrive as an `error` event instead. A cache hit streams a single
//! `done` event.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{client_ip, AnalysisRequestBody, ApiContext};
use crate::pipeline::{AlignmentRequest, Outcome, PipelineEvent};

type EventStream = BoxStream<'static, Result<Event, Infallible>>;

/// `POST /analyze-and-scaffold` — the streamed alignment pipeline.
pub async fn analyze_and_scaffold(
    State(ctx): State<ApiContext>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<AnalysisRequestBody>,
) -> Result<Sse<EventStream>, ApiError> {
    if ctx.config.itzuli_api_key.is_none() {
        return Err(ApiError::Config("ITZULI_API_KEY"));
    }
    if ctx.config.claude_api_key.is_none() {
        return Err(ApiError::Config("CLAUDE_API_KEY"));
    }

    let client = client_ip(&headers, peer);
    let request = AlignmentRequest {
        text: body.text,
        source_lang: body.source_lang,
        target_lang: body.target_lang,
        sentence_id: body.sentence_id,
    };

    let stream: EventStream = match ctx.pipeline.handle(request, &client).await? {
        Outcome::Denied => return Err(ApiError::RateLimited),
        Outcome::CacheHit(pair) => stream::once(async move {
            Ok::<_, Infallible>(sse_event(&PipelineEvent::Done(pair)))
        })
        .boxed(),
        Outcome::Stream(rx) => stream::unfold(rx, |mut rx| async move {
            rx.recv()
                .await
                .map(|event| (Ok::<_, Infallible>(sse_event(&event)), rx))
        })
        .boxed(),
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn sse_event(event: &PipelineEvent) -> Event {
    let payload = match event {
        PipelineEvent::TranslationDone | PipelineEvent::AnalysisDone => "{}".to_string(),
        PipelineEvent::Done(pair) => {
            serde_json::to_string(pair.as_ref()).unwrap_or_else(|_| "{}".to_string())
        }
        PipelineEvent::Error { message } => json!({ "message": message }).to_string(),
    };
    Event::default().event(event.name()).data(payload)
}
