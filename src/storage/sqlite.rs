//! SQLite storage backend for cloning strategies

use super::traits::{OpenStore, StorageError, StorageResult, StrategyStore, StrategySummary};
use crate::graph::CloningGraph;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed strategy store
///
/// One row per named strategy holding its JSON document. Thread-safe via
/// an internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS strategies (
                name TEXT PRIMARY KEY,
                document_json TEXT NOT NULL,
                source_count INTEGER NOT NULL,
                sequence_count INTEGER NOT NULL,
                primer_count INTEGER NOT NULL,
                saved_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_strategies_saved_at
                ON strategies(saved_at);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn parse_saved_at(text: &str) -> StorageResult<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(text)
            .map_err(|e| StorageError::DateParse(e.to_string()))?
            .with_timezone(&Utc))
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StrategyStore for SqliteStore {
    fn save_strategy(&self, name: &str, graph: &CloningGraph) -> StorageResult<()> {
        let document = graph.to_json_pretty()?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO strategies
                (name, document_json, source_count, sequence_count, primer_count, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                document,
                graph.source_count() as i64,
                graph.sequence_count() as i64,
                graph.primer_count() as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tracing::debug!(name, entities = graph.len(), "saved strategy");
        Ok(())
    }

    fn load_strategy(&self, name: &str) -> StorageResult<Option<CloningGraph>> {
        let conn = self.conn.lock().unwrap();
        let document: Option<String> = conn
            .query_row(
                "SELECT document_json FROM strategies WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(text) => Ok(Some(CloningGraph::from_json_str(&text)?)),
            None => Ok(None),
        }
    }

    fn delete_strategy(&self, name: &str) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM strategies WHERE name = ?1", params![name])?;
        Ok(deleted > 0)
    }

    fn list_strategies(&self) -> StorageResult<Vec<StrategySummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name, saved_at, source_count, sequence_count, primer_count
             FROM strategies
             ORDER BY saved_at DESC, name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (name, saved_at, sources, sequences, primers) = row?;
            summaries.push(StrategySummary {
                name,
                saved_at: Self::parse_saved_at(&saved_at)?,
                sources: sources as usize,
                sequences: sequences as usize,
                primers: primers as usize,
            });
        }
        Ok(summaries)
    }
}
