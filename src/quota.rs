//! Per-client daily request quota backed by the `usage` table.
//!
//! Loopback clients bypass the gate entirely — local development never
//! touches storage. Everyone else gets one atomic create-or-increment per
//! chargeable request; a denied request leaves the stored count unchanged.

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;

const LOOPBACK: &[&str] = &["127.0.0.1", "::1", "localhost"];

pub struct QuotaGate {
    conn: Arc<Mutex<Connection>>,
    limit: i64,
}

impl QuotaGate {
    pub fn new(conn: Arc<Mutex<Connection>>, limit: i64) -> Self {
        Self { conn, limit }
    }

    /// Check whether `client_id` is under today's limit and consume one
    /// unit if so. Returns `(allowed, remaining)` where `remaining` is the
    /// number of requests left after this one.
    pub fn check_and_consume(&self, client_id: &str) -> Result<(bool, i64), DatabaseError> {
        self.check_and_consume_on(client_id, Local::now().date_naive())
    }

    /// Dated variant of [`check_and_consume`], factored out so tests can
    /// pin the calendar day.
    ///
    /// The create-or-increment is a single conditional upsert: the SELECT
    /// guard refuses the initial insert when the limit is zero, and the
    /// `WHERE usage.count < limit` clause refuses the increment once the
    /// limit is reached. Either refusal yields no row, which maps to a
    /// side-effect-free denial — there is no read-then-write gap for a
    /// concurrent caller to interleave with.
    pub fn check_and_consume_on(
        &self,
        client_id: &str,
        day: NaiveDate,
    ) -> Result<(bool, i64), DatabaseError> {
        if LOOPBACK.contains(&client_id) {
            return Ok((true, self.limit));
        }

        let day = day.format("%Y-%m-%d").to_string();
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        let result = conn.query_row(
            "INSERT INTO usage (client_id, day, count)
             SELECT ?1, ?2, 1 WHERE ?3 > 0
             ON CONFLICT(client_id, day) DO UPDATE SET count = count + 1
             WHERE usage.count < ?3
             RETURNING count",
            params![client_id, day, self.limit],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(count) => Ok((true, self.limit - count)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok((false, 0)),
            Err(e) => Err(e.into()),
        }
    }
}
