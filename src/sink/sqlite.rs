// src/sink/sqlite.rs
//! SQLite persistence for analyzed batches.
//!
//! Two tables: `nlp_analytics` holds one count row per keyword per batch,
//! `social_posts` one row per retained post. Each batch is written in a single
//! transaction; any failure rolls the whole batch back.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::Error::FromSqlConversionFailure;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::Result;
use crate::report::ExportDocument;
use crate::sink::ResultSink;

/// Aggregate-level sentiment written next to keyword counts.
const KEYWORD_SENTIMENT: &str = "mixed";

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nlp_analytics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    keyword TEXT NOT NULL,
    sentiment TEXT NOT NULL,
    count INTEGER NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS social_posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL,
    source_type TEXT NOT NULL,
    text TEXT NOT NULL,
    keywords TEXT NOT NULL,
    sentiment TEXT NOT NULL,
    hazard_type TEXT,
    latitude REAL,
    longitude REAL,
    location_name TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_social_posts_hazard ON social_posts(hazard_type);
CREATE INDEX IF NOT EXISTS idx_nlp_analytics_keyword ON nlp_analytics(keyword);
"#;

/// Rows written by one [`SqliteStore::persist`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistSummary {
    pub keyword_rows: usize,
    pub post_rows: usize,
}

/// A stored post row, as read back for checks and tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub source_id: String,
    pub source_type: String,
    pub text: String,
    pub keywords: Vec<String>,
    pub sentiment: String,
    pub hazard_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the database file, creating parent directories.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        let store = Self::with_connection(conn, Some(db_path.to_path_buf()))?;
        info!(path = %db_path.display(), "sqlite store ready");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Write keyword counts and annotated posts atomically.
    pub fn persist(&self, doc: &ExportDocument) -> Result<PersistSummary> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut summary = PersistSummary::default();
        let stamp = doc.analytics.timestamp.to_rfc3339();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO nlp_analytics (keyword, sentiment, count, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for kc in &doc.analytics.keyword_counts {
                stmt.execute(params![kc.keyword, KEYWORD_SENTIMENT, kc.count as i64, stamp])?;
                summary.keyword_rows += 1;
            }
        }

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO social_posts (source_id, source_type, text, keywords, sentiment,
                                           hazard_type, latitude, longitude, location_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for ap in &doc.posts {
                let loc = ap.post.location.as_ref();
                stmt.execute(params![
                    ap.post.id,
                    ap.post.source.as_str(),
                    ap.post.text,
                    serde_json::to_string(&ap.analysis.keywords)?,
                    ap.analysis.sentiment.as_str(),
                    ap.analysis.hazard_type.map(|h| h.as_str()),
                    loc.map(|l| l.lat),
                    loc.map(|l| l.lng),
                    loc.and_then(|l| l.name.as_deref()),
                    ap.post.created_at.to_rfc3339(),
                ])?;
                summary.post_rows += 1;
            }
        }

        tx.commit()?;
        debug!(
            keyword_rows = summary.keyword_rows,
            post_rows = summary.post_rows,
            "batch persisted"
        );
        Ok(summary)
    }

    pub fn count_posts(&self) -> Result<i64> {
        let conn = self.conn.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM social_posts", [], |r| r.get(0))?)
    }

    /// Keyword rows as `(keyword, sentiment, count)`, oldest first.
    pub fn keyword_rows(&self) -> Result<Vec<(String, String, i64)>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT keyword, sentiment, count FROM nlp_analytics ORDER BY id")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Post rows for a hazard type (or all when `None`), oldest first.
    pub fn posts_by_hazard(&self, hazard_type: Option<&str>) -> Result<Vec<StoredPost>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT source_id, source_type, text, keywords, sentiment, hazard_type,
                    latitude, longitude, created_at
             FROM social_posts
             WHERE ?1 IS NULL OR hazard_type = ?1
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![hazard_type], row_to_post)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn row_to_post(r: &rusqlite::Row<'_>) -> rusqlite::Result<StoredPost> {
    let keywords: String = r.get(3)?;
    let created: String = r.get(8)?;
    Ok(StoredPost {
        source_id: r.get(0)?,
        source_type: r.get(1)?,
        text: r.get(2)?,
        keywords: serde_json::from_str(&keywords)
            .map_err(|e| FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        sentiment: r.get(4)?,
        hazard_type: r.get(5)?,
        latitude: r.get(6)?,
        longitude: r.get(7)?,
        created_at: DateTime::parse_from_rfc3339(&created)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| FromSqlConversionFailure(8, Type::Text, Box::new(e)))?,
    })
}

impl ResultSink for SqliteStore {
    fn write(&self, doc: &ExportDocument) -> Result<()> {
        self.persist(doc).map(|_| ())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
