//! Extraction and validation of the LLM's alignment completion.
//!
//! The completion may wrap the JSON object in explanatory prose, so
//! extraction takes the substring from the first `{` to the last `}`
//! inclusive. Items missing any of `source`/`target`/`label` fail the
//! whole parse — callers degrade to empty layers rather than erroring.

use serde::Deserialize;

use crate::models::{Alignment, AlignmentLayers};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON object found in completion")]
    NoJson,
    #[error("completion JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawLayers {
    #[serde(default)]
    lexical: Vec<RawSpan>,
    #[serde(default)]
    grammatical_relations: Vec<RawSpan>,
    #[serde(default)]
    features: Vec<RawSpan>,
}

// All three fields are required on each item; a missing one fails the
// whole parse, matching the strictness of the output contract.
#[derive(Deserialize)]
struct RawSpan {
    source: Vec<String>,
    target: Vec<String>,
    label: String,
}

impl From<RawSpan> for Alignment {
    fn from(raw: RawSpan) -> Self {
        Alignment {
            source: raw.source,
            target: raw.target,
            label: raw.label,
        }
    }
}

/// Parse the LLM completion into alignment layers, preserving the
/// emission order within each layer.
pub fn parse_alignment_response(content: &str) -> Result<AlignmentLayers, ParseError> {
    let start = content.find('{').ok_or(ParseError::NoJson)?;
    let end = content.rfind('}').ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }

    let raw: RawLayers = serde_json::from_str(&content[start..=end])?;

    Ok(AlignmentLayers {
        lexical: raw.lexical.into_iter().map(Alignment::from).collect(),
        grammatical_relations: raw
            .grammatical_relations
            .into_iter()
            .map(Alignment::from)
            .collect(),
        features: raw.features.into_iter().map(Alignment::from).collect(),
    })
}
