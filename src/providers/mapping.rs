use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::MappingRecord;
use crate::error::{Result, SearchError};
use crate::providers::MappingStore;
use crate::ranking::is_numeric_id;

/// Default cap on mapping matches pulled into a search
pub const DEFAULT_MAPPING_LIMIT: usize = 80;

/// Cap used when listing mappings for administration
pub const ADMIN_MAPPING_LIMIT: usize = 200;

/// SQLite table of curated mappings
///
/// ```sql
/// CREATE TABLE game_mappings (
///     app_id TEXT PRIMARY KEY,
///     name TEXT NOT NULL DEFAULT '',
///     file_id TEXT,
///     size_bytes INTEGER,
///     art TEXT,
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
pub struct SqliteMappingStore {
    conn: Arc<Mutex<Connection>>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MappingRecord> {
    Ok(MappingRecord {
        app_id: row.get(0)?,
        name: row.get(1)?,
        file_id: row.get(2)?,
        size_bytes: row.get::<_, Option<i64>>(3)?.and_then(|s| u64::try_from(s).ok()),
        art: row.get(4)?,
    })
}

impl SqliteMappingStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS game_mappings (
                app_id TEXT PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                file_id TEXT,
                size_bytes INTEGER,
                art TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SearchError::Other("mapping store lock poisoned".to_string()))
    }
}

#[async_trait]
impl MappingStore for SqliteMappingStore {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MappingRecord>> {
        let q = query.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let sql = if is_numeric_id(q) {
            "SELECT app_id, name, file_id, size_bytes, art FROM game_mappings
             WHERE instr(app_id, ?1) > 0
             ORDER BY rowid LIMIT ?2"
        } else {
            "SELECT app_id, name, file_id, size_bytes, art FROM game_mappings
             WHERE instr(lower(name), lower(?1)) > 0 OR instr(app_id, ?1) > 0
             ORDER BY rowid LIMIT ?2"
        };

        let mut stmt = conn.prepare(sql)?;
        let records = stmt
            .query_map(params![q, limit], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    async fn find(&self, app_id: &str) -> Result<Option<MappingRecord>> {
        let conn = self.lock()?;

        let record = conn
            .query_row(
                "SELECT app_id, name, file_id, size_bytes, art FROM game_mappings WHERE app_id = ?1",
                params![app_id.trim()],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    async fn upsert(&self, record: &MappingRecord) -> Result<MappingRecord> {
        let app_id = record.app_id.trim();
        let file_id = non_empty(record.file_id.as_deref());
        if app_id.is_empty() || file_id.is_none() {
            return Err(SearchError::InvalidInput("appId and fileId required".to_string()));
        }

        let stored = MappingRecord {
            app_id: app_id.to_string(),
            name: record.name.trim().to_string(),
            file_id,
            art: non_empty(record.art.as_deref()),
            size_bytes: record.size_bytes,
        };
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO game_mappings (app_id, name, file_id, size_bytes, art, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(app_id) DO UPDATE SET
                name = excluded.name,
                file_id = excluded.file_id,
                size_bytes = excluded.size_bytes,
                art = excluded.art,
                updated_at = excluded.updated_at",
            params![
                stored.app_id,
                stored.name,
                stored.file_id,
                stored.size_bytes.and_then(|s| i64::try_from(s).ok()),
                stored.art,
                now,
            ],
        )?;

        Ok(stored)
    }

    async fn remove(&self, app_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM game_mappings WHERE app_id = ?1",
            params![app_id.trim()],
        )?;
        Ok(deleted > 0)
    }
}
