//! SQLite-backed verdict store

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use vigil_domain::traits::VerdictStore;
use vigil_domain::{Alternative, DomainName, StoreError, TrustScore, Verdict, VerdictRecord};

/// SQLite-based implementation of `VerdictStore`
///
/// Each `put` is a single `INSERT ... ON CONFLICT DO UPDATE` statement, so a
/// reader never observes a half-written record.
///
/// # Thread Safety
///
/// The connection sits behind a mutex; statements are short and never held
/// across an await point.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vigil_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("verdicts.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(unavailable)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.lock().execute_batch(schema).map_err(unavailable)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves SQLite itself consistent
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("verdict store mutex poisoned, recovering connection");
            poisoned.into_inner()
        })
    }

    fn decode_row(
        domain: String,
        verdict: String,
        trust_score: i64,
        alternatives: String,
        raw: String,
        classified_at: i64,
    ) -> Result<VerdictRecord, StoreError> {
        let domain = DomainName::new(&domain)
            .map_err(|e| StoreError::Corrupt(format!("domain {:?}: {}", domain, e)))?;
        let verdict = Verdict::parse(&verdict)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown verdict {:?} for {}", verdict, domain)))?;
        let alternatives: Vec<Alternative> = serde_json::from_str(&alternatives)
            .map_err(|e| StoreError::Corrupt(format!("alternatives for {}: {}", domain, e)))?;

        Ok(VerdictRecord::new(
            domain,
            verdict,
            TrustScore::clamped(trust_score),
            alternatives,
            raw,
            classified_at.max(0) as u64,
        ))
    }
}

fn unavailable(e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl VerdictStore for SqliteStore {
    async fn get(&self, domain: &DomainName) -> Result<Option<VerdictRecord>, StoreError> {
        let row = self
            .lock()
            .query_row(
                "SELECT domain, verdict, trust_score, alternatives, raw, classified_at
                 FROM verdicts WHERE domain = ?1",
                params![domain.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(unavailable)?;

        row.map(|(d, v, s, a, r, c)| Self::decode_row(d, v, s, a, r, c))
            .transpose()
    }

    async fn put(&self, record: VerdictRecord) -> Result<(), StoreError> {
        let alternatives = serde_json::to_string(&record.alternatives)
            .map_err(|e| StoreError::Corrupt(format!("alternatives for {}: {}", record.domain, e)))?;

        self.lock()
            .execute(
                "INSERT INTO verdicts (domain, verdict, trust_score, alternatives, raw, classified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(domain) DO UPDATE SET
                 verdict = excluded.verdict,
                 trust_score = excluded.trust_score,
                 alternatives = excluded.alternatives,
                 raw = excluded.raw,
                 classified_at = excluded.classified_at",
                params![
                    record.domain.as_str(),
                    record.verdict.as_str(),
                    record.trust_score.value() as i64,
                    alternatives,
                    &record.raw,
                    record.classified_at as i64,
                ],
            )
            .map_err(unavailable)?;

        Ok(())
    }

    async fn evict(&self, domain: &DomainName) -> Result<bool, StoreError> {
        let removed = self
            .lock()
            .execute("DELETE FROM verdicts WHERE domain = ?1", params![domain.as_str()])
            .map_err(unavailable)?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        self.lock()
            .execute("DELETE FROM verdicts", [])
            .map_err(unavailable)
    }

    async fn purge_older_than(&self, cutoff: u64) -> Result<usize, StoreError> {
        let purged = self
            .lock()
            .execute(
                "DELETE FROM verdicts WHERE classified_at < ?1",
                params![cutoff as i64],
            )
            .map_err(unavailable)?;
        tracing::debug!(cutoff, purged, "purged verdicts");
        Ok(purged)
    }

    async fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM verdicts", [], |row| row.get(0))
            .map_err(unavailable)?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_corrupt_row_is_reported() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .lock()
            .execute(
                "INSERT INTO verdicts (domain, verdict, trust_score, alternatives, raw, classified_at)
                 VALUES ('a.com', 'safe', 5, 'not json', '', 0)",
                [],
            )
            .unwrap();

        let result = store.get(&DomainName::new("a.com").unwrap()).await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_unknown_verdict() {
        let store = SqliteStore::in_memory().unwrap();
        let result = store.lock().execute(
            "INSERT INTO verdicts (domain, verdict, trust_score, classified_at)
             VALUES ('a.com', 'unknown', 5, 0)",
            [],
        );
        assert!(result.is_err());
    }
}
