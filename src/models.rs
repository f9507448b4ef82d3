//! Wire and domain types for tokenized sentences and alignment layers.
//!
//! Field names follow the JSON schema the frontend validates against:
//! `grammatical_relations` and `features` are the two non-lexical layer
//! names, and cached payloads wrap a single `SentencePair` in an
//! `AlignmentData` for forward compatibility with multi-sentence input.

use serde::{Deserialize, Serialize};

/// Raw analyzer output for one word, before enrichment.
///
/// `feats` is the `|`-separated Universal Dependencies feature string and
/// may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub word: String,
    pub lemma: String,
    pub upos: String,
    pub feats: String,
}

/// One analyzed token with a sentence-stable ordinal id (`s0`, `t3`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub form: String,
    pub lemma: String,
    pub pos: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedSentence {
    pub lang: String,
    pub text: String,
    pub tokens: Vec<Token>,
}

/// A single asserted correspondence between source and target token sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub source: Vec<String>,
    pub target: Vec<String>,
    pub label: String,
}

impl Alignment {
    /// A span that references no tokens on one side is degenerate and
    /// must never be persisted or returned.
    pub fn is_degenerate(&self) -> bool {
        self.source.is_empty() || self.target.is_empty()
    }
}

/// The three alignment layers. Any layer may legitimately be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentLayers {
    #[serde(default)]
    pub lexical: Vec<Alignment>,
    #[serde(default)]
    pub grammatical_relations: Vec<Alignment>,
    #[serde(default)]
    pub features: Vec<Alignment>,
}

impl AlignmentLayers {
    /// Drop degenerate spans from every layer, preserving emission order.
    pub fn drop_degenerate(&mut self) {
        self.lexical.retain(|a| !a.is_degenerate());
        self.grammatical_relations.retain(|a| !a.is_degenerate());
        self.features.retain(|a| !a.is_degenerate());
    }

    pub fn is_empty(&self) -> bool {
        self.lexical.is_empty()
            && self.grammatical_relations.is_empty()
            && self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    pub id: String,
    pub source: TokenizedSentence,
    pub target: TokenizedSentence,
    pub layers: AlignmentLayers,
}

/// Unit of caching: a one-element wrapper around `SentencePair`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentData {
    pub sentences: Vec<SentencePair>,
}

impl AlignmentData {
    pub fn single(pair: SentencePair) -> Self {
        Self {
            sentences: vec![pair],
        }
    }
}
