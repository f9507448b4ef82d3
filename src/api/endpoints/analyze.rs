//! Non-streaming analysis endpoint.
//!
//! Translates the text and returns the raw analyzer rows for both sides —
//! an inspection surface for debugging tokenization, separate from the
//! alignment pipeline. No quota, no cache, no LLM.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{AnalysisRequestBody, ApiContext};
use crate::models::AnalysisRow;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub source_analysis: Vec<AnalysisRow>,
    pub target_analysis: Vec<AnalysisRow>,
}

/// `POST /analyze` — translate, then analyze both texts.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Json(body): Json<AnalysisRequestBody>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    if ctx.config.itzuli_api_key.is_none() {
        return Err(ApiError::Config("ITZULI_API_KEY"));
    }

    let translated = ctx
        .translator
        .translate(&body.text, &body.source_lang, &body.target_lang)
        .await
        .map_err(|e| {
            let message = format!("Analysis failed: {e}");
            tracing::error!("{message}");
            ApiError::Analysis(message)
        })?;

    let (source_analysis, target_analysis) = tokio::try_join!(
        ctx.analyzer.analyze(&body.source_lang, &body.text),
        ctx.analyzer.analyze(&body.target_lang, &translated),
    )
    .map_err(|e| {
        let message = format!("Analysis failed: {e}");
        tracing::error!("{message}");
        ApiError::Analysis(message)
    })?;

    Ok(Json(AnalysisResponse {
        source_text: body.text,
        target_text: translated,
        source_lang: body.source_lang,
        target_lang: body.target_lang,
        source_analysis,
        target_analysis,
    }))
}
