//! Query Audit Log
//!
//! Append-only SQLite log of every processed query: the question, the
//! answer that was returned, who asked, how long the pipeline took and
//! which registry functions contributed grounding data. Entries are never
//! mutated or deleted by this service.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::entities::QueryLogEntry;

/// Fields of a log record before it is assigned a rowid.
#[derive(Debug, Clone)]
pub struct NewQueryLogEntry {
    pub query: String,
    pub response: String,
    pub requester_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub functions_used: Vec<String>,
}

pub struct QueryLog {
    conn: Arc<Mutex<Connection>>,
}

impl QueryLog {
    /// Open (or create) the log database at `path`, defaulting to the
    /// platform data directory.
    pub fn open(path: Option<PathBuf>) -> SqliteResult<Self> {
        let db_path = path.unwrap_or_else(|| {
            let data_dir = dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sentinel-ops");
            std::fs::create_dir_all(&data_dir).ok();
            data_dir.join("query_log.db")
        });

        info!(path = %db_path.display(), "Initializing query audit log");
        Self::from_connection(Connection::open(&db_path)?)
    }

    /// In-memory log, used by tests and throwaway demo runs.
    pub fn open_in_memory() -> SqliteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqliteResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS ai_queries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                query TEXT NOT NULL,
                response TEXT NOT NULL,
                requester_id TEXT,
                timestamp TEXT NOT NULL,
                execution_time_ms INTEGER NOT NULL,
                functions_used TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_ai_queries_requester ON ai_queries(requester_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_ai_queries_timestamp ON ai_queries(timestamp)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn append(&self, entry: &NewQueryLogEntry) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        let functions_json = serde_json::to_string(&entry.functions_used)
            .unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            "INSERT INTO ai_queries (query, response, requester_id, timestamp, execution_time_ms, functions_used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.query,
                entry.response,
                entry.requester_id,
                entry.timestamp.to_rfc3339(),
                entry.execution_time_ms as i64,
                functions_json,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Most recent entries, optionally scoped to one requester.
    pub fn recent(
        &self,
        requester_id: Option<&str>,
        limit: u32,
    ) -> SqliteResult<Vec<QueryLogEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, query, response, requester_id, timestamp, execution_time_ms, functions_used
             FROM ai_queries
             WHERE (?1 IS NULL OR requester_id = ?1)
             ORDER BY id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![requester_id, limit], |row| {
            let timestamp_raw: String = row.get(4)?;
            let functions_raw: String = row.get(6)?;
            Ok(QueryLogEntry {
                id: row.get(0)?,
                query: row.get(1)?,
                response: row.get(2)?,
                requester_id: row.get(3)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_raw)
                    .map_err(|_| {
                        rusqlite::Error::InvalidColumnType(
                            4,
                            "timestamp".to_string(),
                            rusqlite::types::Type::Text,
                        )
                    })?
                    .with_timezone(&Utc),
                execution_time_ms: row.get::<_, i64>(5)? as u64,
                functions_used: serde_json::from_str(&functions_raw).unwrap_or_default(),
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    pub fn count(&self) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM ai_queries", [], |row| row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(requester: Option<&str>) -> NewQueryLogEntry {
        NewQueryLogEntry {
            query: "How many cameras are offline?".to_string(),
            response: "2 cameras are offline.".to_string(),
            requester_id: requester.map(|s| s.to_string()),
            timestamp: Utc::now(),
            execution_time_ms: 128,
            functions_used: vec![
                "list_offline_cameras".to_string(),
                "count_cameras_by_status".to_string(),
            ],
        }
    }

    #[test]
    fn append_then_read_back_round_trips() {
        let log = QueryLog::open_in_memory().unwrap();
        let id = log.append(&sample_entry(Some("operator-7"))).unwrap();
        assert!(id > 0);

        let entries = log.recent(None, 10).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.query, "How many cameras are offline?");
        assert_eq!(entry.response, "2 cameras are offline.");
        assert_eq!(entry.requester_id.as_deref(), Some("operator-7"));
        assert_eq!(entry.execution_time_ms, 128);
        assert_eq!(
            entry.functions_used,
            vec!["list_offline_cameras", "count_cameras_by_status"]
        );
    }

    #[test]
    fn recent_filters_by_requester_and_orders_newest_first() {
        let log = QueryLog::open_in_memory().unwrap();
        log.append(&sample_entry(Some("alice"))).unwrap();
        log.append(&sample_entry(Some("bob"))).unwrap();
        let mut third = sample_entry(Some("alice"));
        third.query = "Any open incidents?".to_string();
        log.append(&third).unwrap();

        let alice = log.recent(Some("alice"), 10).unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].query, "Any open incidents?");

        assert_eq!(log.recent(Some("nobody"), 10).unwrap().len(), 0);
        assert_eq!(log.count().unwrap(), 3);
    }

    #[test]
    fn empty_functions_list_round_trips() {
        let log = QueryLog::open_in_memory().unwrap();
        let mut entry = sample_entry(None);
        entry.functions_used = vec![];
        log.append(&entry).unwrap();

        let entries = log.recent(None, 1).unwrap();
        assert!(entries[0].functions_used.is_empty());
        assert!(entries[0].requester_id.is_none());
    }
}
