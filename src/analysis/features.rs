//! Human-readable renderings of Universal Dependencies features.
//!
//! The analyzer emits raw UD feature strings (`Case=Abs|Number=Sing`).
//! Learners see short glosses instead, localized to the language they are
//! reading the analysis in. Features without a gloss are dropped rather
//! than shown raw.

use crate::models::{AnalysisRow, Token};

const FRIENDLY_FEATS_EN: &[(&str, &str)] = &[
    ("Polarity=Neg", "negation"),
    ("Mood=Ind", "indicative mood"),
    ("Number[abs]=Plur", "plural obj"),
    ("Number[abs]=Sing", "singular obj"),
    ("Number[erg]=Sing", "singular sub"),
    ("Number[erg]=Plur", "plural sub"),
    ("Person[abs]=1", "1st person obj (me/us)"),
    ("Person[abs]=2", "2nd person obj (you)"),
    ("Person[abs]=3", "3rd person obj (it/them)"),
    ("Person[erg]=1", "1st person sub (I)"),
    ("Person[erg]=2", "2nd person sub (you)"),
    ("Person[erg]=3", "3rd person sub (he/she/it)"),
    ("VerbForm=Fin", "conjugated"),
    ("VerbForm=Inf", "infinitive/base form"),
    ("Aspect=Imp", "habitual/ongoing"),
    ("Aspect=Perf", "completed act"),
    ("Case=Abs", "absolutive (sub/obj)"),
    ("Case=Erg", "ergative (transitive sub)"),
    ("Case=Dat", "dative (indir obj)"),
    ("Case=Gen", "genitive"),
    ("Case=Loc", "locative"),
    ("Case=Ine", "inessive (inside/within)"),
    ("Definite=Def", "definite (the)"),
    ("Definite=Ind", "indefinite (a/an)"),
    ("Number=Plur", "plural"),
    ("Number=Sing", "singular"),
];

const FRIENDLY_FEATS_EU: &[(&str, &str)] = &[
    ("Polarity=Neg", "ezeztapena"),
    ("Mood=Ind", "adierazpen modua"),
    ("Number[abs]=Plur", "objektu plurala"),
    ("Number[abs]=Sing", "objektu singularra"),
    ("Number[erg]=Sing", "subjektu singularra"),
    ("Number[erg]=Plur", "subjektu plurala"),
    ("Person[abs]=1", "1. pertsona obj (ni/gu)"),
    ("Person[abs]=2", "2. pertsona obj (zu/zuek)"),
    ("Person[abs]=3", "3. pertsona obj (hura/haiek)"),
    ("Person[erg]=1", "1. pertsona subj (nik)"),
    ("Person[erg]=2", "2. pertsona subj (zuk)"),
    ("Person[erg]=3", "3. pertsona subj (hark)"),
    ("VerbForm=Fin", "aditz jokatua"),
    ("VerbForm=Inf", "aditz jokatu gabea"),
    ("Aspect=Imp", "ohikoa/jarraian"),
    ("Aspect=Perf", "burutua"),
    ("Case=Abs", "absolutiboa (nor)"),
    ("Case=Erg", "ergatiboa (nork)"),
    ("Case=Dat", "datiboa (nori)"),
    ("Case=Gen", "genitiboa (noren)"),
    ("Case=Loc", "lekuzkoa"),
    ("Case=Ine", "inesiboa (non)"),
    ("Definite=Def", "mugatu (-a/-ak)"),
    ("Definite=Ind", "mugagabea"),
    ("Number=Plur", "plurala"),
    ("Number=Sing", "singularra"),
];

// Surface forms whose gloss overrides the feature string entirely.
const QUIRKS_EN: &[(&str, &str)] = &[("euskal", "combining prefix")];
const QUIRKS_EU: &[(&str, &str)] = &[("euskal", "konbinazio aurrizkia")];

fn feats_table(lang: &str) -> &'static [(&'static str, &'static str)] {
    match lang {
        "eu" => FRIENDLY_FEATS_EU,
        _ => FRIENDLY_FEATS_EN,
    }
}

fn quirks_table(lang: &str) -> &'static [(&'static str, &'static str)] {
    match lang {
        "eu" => QUIRKS_EU,
        _ => QUIRKS_EN,
    }
}

fn lookup(table: &[(&str, &str)], key: &str) -> Option<String> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

/// Render the feature descriptions for one analyzed word.
pub fn friendly_features(lang: &str, word: &str, feats: &str) -> Vec<String> {
    if let Some(quirk) = lookup(quirks_table(lang), &word.to_lowercase()) {
        return vec![quirk];
    }
    if feats.is_empty() {
        return Vec::new();
    }
    let table = feats_table(lang);
    feats
        .split('|')
        .filter_map(|feat| lookup(table, feat))
        .collect()
}

/// Convert raw analyzer rows into tokens with ordinal ids (`{prefix}0`,
/// `{prefix}1`, ...), lowercased POS, and glossed features.
pub fn enrich(rows: &[AnalysisRow], lang: &str, prefix: char) -> Vec<Token> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| Token {
            id: format!("{prefix}{i}"),
            form: row.word.clone(),
            lemma: row.lemma.clone(),
            pos: row.upos.to_lowercase(),
            features: friendly_features(lang, &row.word, &row.feats),
        })
        .collect()
}
