//! Content-addressed cache of computed alignment results.
//!
//! The key is a pure function of the exact request inputs — no text
//! normalization — so identical requests always collide and near-identical
//! ones never do. Entries are written once per successful pipeline run and
//! never evicted.

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::db::DatabaseError;
use crate::models::AlignmentData;

pub struct AlignmentCache {
    conn: Arc<Mutex<Connection>>,
}

impl AlignmentCache {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Look up a previously computed result. Must be called before the
    /// quota gate — a hit is free and bypasses all external calls.
    pub fn get(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Option<AlignmentData>, DatabaseError> {
        let key = cache_key(text, source_lang, target_lang);
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM alignment_cache WHERE cache_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => match serde_json::from_str(&json) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    // A corrupt row is treated as a miss; the next success
                    // overwrites it.
                    tracing::warn!(key, error = %e, "Discarding unreadable cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Store a validated result. Called exactly once per successful run;
    /// concurrent writers for the same key overwrite with an equivalent
    /// value.
    pub fn set(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        value: &AlignmentData,
    ) -> Result<(), DatabaseError> {
        let key = cache_key(text, source_lang, target_lang);
        let payload = serde_json::to_string(value)?;
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO alignment_cache (cache_key, payload) VALUES (?1, ?2)",
            params![key, payload],
        )?;
        Ok(())
    }
}

/// Deterministic key over the three request inputs. The 0x1f separator
/// keeps `("ab", "c")` and `("a", "bc")` from colliding.
fn cache_key(text: &str, source_lang: &str, target_lang: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_lang.as_bytes());
    hasher.update([0x1f]);
    hasher.update(target_lang.as_bytes());
    hasher.update([0x1f]);
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::{AlignmentLayers, SentencePair, TokenizedSentence};

    fn cache() -> AlignmentCache {
        AlignmentCache::new(Arc::new(Mutex::new(open_memory_database().unwrap())))
    }

    fn sample_data(id: &str) -> AlignmentData {
        AlignmentData::single(SentencePair {
            id: id.to_string(),
            source: TokenizedSentence {
                lang: "eu".into(),
                text: "Kaixo mundua".into(),
                tokens: vec![],
            },
            target: TokenizedSentence {
                lang: "en".into(),
                text: "Hello world".into(),
                tokens: vec![],
            },
            layers: AlignmentLayers::default(),
        })
    }

    #[test]
    fn set_then_get_returns_stored_value() {
        let cache = cache();
        let data = sample_data("test-001");
        cache.set("Kaixo mundua", "eu", "en", &data).unwrap();

        let hit = cache.get("Kaixo mundua", "eu", "en").unwrap();
        assert_eq!(hit, Some(data));
    }

    #[test]
    fn miss_returns_none() {
        let cache = cache();
        assert_eq!(cache.get("Kaixo mundua", "eu", "en").unwrap(), None);
    }

    #[test]
    fn near_identical_requests_never_collide() {
        let cache = cache();
        cache
            .set("Kaixo mundua", "eu", "en", &sample_data("a"))
            .unwrap();

        assert!(cache.get("Kaixo mundua", "eu", "es").unwrap().is_none());
        assert!(cache.get("Kaixo mundua", "en", "eu").unwrap().is_none());
        assert!(cache.get("Kaixo mundua ", "eu", "en").unwrap().is_none());
        assert!(cache.get("kaixo mundua", "eu", "en").unwrap().is_none());
    }

    #[test]
    fn separator_prevents_boundary_collisions() {
        assert_ne!(cache_key("bc", "eu", "en"), cache_key("c", "eub", "en"));
        assert_ne!(cache_key("x", "eu", "en"), cache_key("x", "e", "uen"));
    }

    #[test]
    fn rewrite_overwrites_with_latest_value() {
        let cache = cache();
        cache
            .set("Kaixo mundua", "eu", "en", &sample_data("first"))
            .unwrap();
        cache
            .set("Kaixo mundua", "eu", "en", &sample_data("second"))
            .unwrap();

        let hit = cache.get("Kaixo mundua", "eu", "en").unwrap().unwrap();
        assert_eq!(hit.sentences[0].id, "second");
    }
}
