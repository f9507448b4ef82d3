//! Alignment generation: prompt → LLM → validated layers.
//!
//! Failures at this boundary never abort the pipeline. A transport error
//! calling the LLM, or a completion that fails extraction or validation,
//! degrades to all-empty layers — the request still succeeds, and the
//! discrepancy is observable server-side through the warn logs.

mod client;
mod parser;
mod prompt;

pub use client::{ClaudeClient, LlmClient, LlmError};
pub use parser::{parse_alignment_response, ParseError};
pub use prompt::build_alignment_prompt;

#[cfg(test)]
pub use client::testing::MockLlmClient;

use crate::models::{AlignmentLayers, Token};

pub struct AlignmentGenerator {
    llm: Box<dyn LlmClient>,
}

impl AlignmentGenerator {
    pub fn new(llm: Box<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Generate the three alignment layers for one sentence pair.
    ///
    /// The returned layers are unfiltered — the degenerate-span filter is
    /// applied by the orchestrator before caching or responding.
    pub async fn generate(
        &self,
        source_tokens: &[Token],
        target_tokens: &[Token],
        source_lang: &str,
        target_lang: &str,
        source_text: &str,
        target_text: &str,
    ) -> AlignmentLayers {
        let prompt = build_alignment_prompt(
            source_tokens,
            target_tokens,
            source_lang,
            target_lang,
            source_text,
            target_text,
        );

        tracing::info!("Calling LLM for alignment generation");
        let completion = match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "LLM call failed; returning empty alignment layers");
                return AlignmentLayers::default();
            }
        };
        tracing::info!(length = completion.len(), "LLM completion received");

        match parse_alignment_response(&completion) {
            Ok(layers) => {
                tracing::info!(
                    lexical = layers.lexical.len(),
                    grammatical = layers.grammatical_relations.len(),
                    features = layers.features.len(),
                    "Parsed alignment layers"
                );
                layers
            }
            Err(e) => {
                tracing::warn!(error = %e, "Completion failed validation; returning empty alignment layers");
                AlignmentLayers::default()
            }
        }
    }
}
