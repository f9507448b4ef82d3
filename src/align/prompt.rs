//! Prompt construction for the alignment generator.
//!
//! One text prompt carrying both language tags, both raw texts, both token
//! lists, worked label examples per layer, and the exact JSON shape the
//! completion must follow. Response handling lives in `parser`.

use crate::models::Token;

/// Build the alignment prompt for one sentence pair.
pub fn build_alignment_prompt(
    source_tokens: &[Token],
    target_tokens: &[Token],
    source_lang: &str,
    target_lang: &str,
    source_text: &str,
    target_text: &str,
) -> String {
    let source_json =
        serde_json::to_string_pretty(source_tokens).unwrap_or_else(|_| "[]".to_string());
    let target_json =
        serde_json::to_string_pretty(target_tokens).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Generate translation alignments between {source_lang} and {target_lang} tokens.

Source text: "{source_text}"
Target text: "{target_text}"

Source tokens:
{source_json}

Target tokens:
{target_json}

Generate alignments for three layers using the same labeling style as these examples:

**Lexical layer examples:**
- "know → ezagutu (core meaning)"
- "gave → eman (core meaning)"
- "book → liburu (in 'liburua')"
- "friend → lagun (in 'lagunari')"

**Grammatical Relations layer examples:**
- "subject (ergative): 'I' → 1st person subject agreement in 'dut'"
- "direct object (absolutive): 'him' → 3rd person object agreement in 'dut' (no separate pronoun)"
- "indirect object (dative): 'to my friend' → 'nire lagunari' (dative case)"

**Features layer examples:**
- "negation: 'don't' → 'ez'"
- "auxiliary function: 'don't' (do-support) → 'dut' (carries tense/agreement)"
- "aspect: present habitual 'know' → imperfective '-tzen' in 'ezagutzen'"
- "person/number agreement: 'I' → 1st person singular in 'dut'"
- "definiteness: 'the' → '-a' suffix in 'liburua'"

Return ONLY a JSON object with this structure:
{{
  "lexical": [
    {{"source": ["s0"], "target": ["t1"], "label": "word1 → word2 (core meaning)"}},
    {{"source": ["s1"], "target": ["t0"], "label": "word3 → word4 (in 'inflected_form')"}}
  ],
  "grammatical_relations": [
    {{"source": ["s1"], "target": ["t0"], "label": "grammatical_role (case): 'source_phrase' → target_description"}}
  ],
  "features": [
    {{"source": ["s1"], "target": ["t2"], "label": "feature_name: 'source_form' → 'target_form' (explanation)"}}
  ]
}}

Guidelines:
- Use token IDs from the provided lists (s0, s1, etc. for source; t0, t1, etc. for target)
- Labels must follow the exact style from the examples above
- For lexical: "source_word → target_word (core meaning)" or "source_word → target_word (in 'inflected_form')"
- For grammatical relations: "role (case): 'source_phrase' → explanation with target"
- For features: "feature: 'source' → 'target' (explanation)" or "feature: 'source' → explanation"
- Be linguistically precise and detailed in explanations
- Focus on how the {source_lang} structures map to {target_lang} morphology and syntax
- Empty layers are acceptable if no alignments exist"#
    )
}
