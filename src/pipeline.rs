//! Staged alignment pipeline: cache → quota → translate → analyze → align
//! → cache write → done.
//!
//! `handle` resolves the free outcomes synchronously (cache hit, quota
//! denial) so the HTTP layer can answer before any streaming starts; a
//! chargeable run is spawned onto its own task and reports progress over
//! a channel. The spawned run ignores send failures — a client that
//! disconnects mid-stream does not cancel the upstream work, and the
//! completed result still lands in the cache for its retry.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::align::AlignmentGenerator;
use crate::analysis::{enrich, Analyzer};
use crate::cache::AlignmentCache;
use crate::db::DatabaseError;
use crate::models::{AlignmentData, SentencePair, TokenizedSentence};
use crate::quota::QuotaGate;
use crate::translate::Translator;

#[derive(Debug, Clone)]
pub struct AlignmentRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub sentence_id: String,
}

/// Progress events, named after their wire tags.
#[derive(Debug)]
pub enum PipelineEvent {
    TranslationDone,
    AnalysisDone,
    Done(Box<SentencePair>),
    Error { message: String },
}

impl PipelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::TranslationDone => "itzuli_done",
            PipelineEvent::AnalysisDone => "stanza_done",
            PipelineEvent::Done(_) => "done",
            PipelineEvent::Error { .. } => "error",
        }
    }
}

/// Resolution of one request before any streaming begins.
pub enum Outcome {
    /// Previously computed result — free, no quota consumed.
    CacheHit(Box<SentencePair>),
    /// Client is over its daily limit.
    Denied,
    /// Chargeable run in flight; events arrive on the receiver.
    Stream(mpsc::Receiver<PipelineEvent>),
}

#[derive(Clone)]
pub struct Pipeline {
    translator: Arc<dyn Translator>,
    analyzer: Arc<dyn Analyzer>,
    generator: Arc<AlignmentGenerator>,
    cache: Arc<AlignmentCache>,
    quota: Arc<QuotaGate>,
}

impl Pipeline {
    pub fn new(
        translator: Arc<dyn Translator>,
        analyzer: Arc<dyn Analyzer>,
        generator: Arc<AlignmentGenerator>,
        cache: Arc<AlignmentCache>,
        quota: Arc<QuotaGate>,
    ) -> Self {
        Self {
            translator,
            analyzer,
            generator,
            cache,
            quota,
        }
    }

    /// Resolve one request. Cache is consulted strictly before the quota
    /// gate, and the gate strictly before any external call.
    pub async fn handle(
        &self,
        request: AlignmentRequest,
        client_id: &str,
    ) -> Result<Outcome, DatabaseError> {
        if let Some(cached) =
            self.cache
                .get(&request.text, &request.source_lang, &request.target_lang)?
        {
            if let Some(pair) = cached.sentences.into_iter().next() {
                tracing::info!(
                    text = %truncate(&request.text, 50),
                    "Cache hit, skipping quota and external calls"
                );
                return Ok(Outcome::CacheHit(Box::new(pair)));
            }
        }

        let (allowed, remaining) = self.quota.check_and_consume(client_id)?;
        if !allowed {
            tracing::info!(client_id, "Daily limit reached");
            return Ok(Outcome::Denied);
        }
        tracing::info!(client_id, remaining, "Quota check passed");

        let (tx, rx) = mpsc::channel(8);
        let pipeline = self.clone();
        let span = tracing::info_span!("pipeline_run", request_id = %Uuid::new_v4());
        tokio::spawn(
            async move {
                if let Err(message) = pipeline.run(&request, &tx).await {
                    tracing::error!(error = %message, "Pipeline run failed");
                    let _ = tx.send(PipelineEvent::Error { message }).await;
                }
            }
            .instrument(span),
        );

        Ok(Outcome::Stream(rx))
    }

    async fn run(
        &self,
        request: &AlignmentRequest,
        tx: &mpsc::Sender<PipelineEvent>,
    ) -> Result<(), String> {
        // Translating
        let translated = self
            .translator
            .translate(&request.text, &request.source_lang, &request.target_lang)
            .await
            .map_err(|e| format!("Translation failed: {e}"))?;
        tracing::info!(source = %request.text, target = %translated, "Translation complete");
        let _ = tx.send(PipelineEvent::TranslationDone).await;

        // Analyzing — the two sides are independent and run concurrently,
        // but both must finish before alignment starts.
        let (source_rows, target_rows) = tokio::try_join!(
            self.analyzer.analyze(&request.source_lang, &request.text),
            self.analyzer.analyze(&request.target_lang, &translated),
        )
        .map_err(|e| format!("Analysis failed: {e}"))?;
        tracing::info!(
            source_tokens = source_rows.len(),
            target_tokens = target_rows.len(),
            "Analysis complete"
        );
        let _ = tx.send(PipelineEvent::AnalysisDone).await;

        // Aligning
        let source_tokens = enrich(&source_rows, &request.source_lang, 's');
        let target_tokens = enrich(&target_rows, &request.target_lang, 't');
        let mut layers = self
            .generator
            .generate(
                &source_tokens,
                &target_tokens,
                &request.source_lang,
                &request.target_lang,
                &request.text,
                &translated,
            )
            .await;
        layers.drop_degenerate();

        let pair = SentencePair {
            id: request.sentence_id.clone(),
            source: TokenizedSentence {
                lang: request.source_lang.clone(),
                text: request.text.clone(),
                tokens: source_tokens,
            },
            target: TokenizedSentence {
                lang: request.target_lang.clone(),
                text: translated,
                tokens: target_tokens,
            },
            layers,
        };

        // Caching happens before the terminal event so a client retrying
        // immediately after `done` observes a hit.
        let data = AlignmentData::single(pair.clone());
        self.cache
            .set(&request.text, &request.source_lang, &request.target_lang, &data)
            .map_err(|e| format!("Failed to store result: {e}"))?;

        let _ = tx.send(PipelineEvent::Done(Box::new(pair))).await;
        Ok(())
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
