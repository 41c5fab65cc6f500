//! Subtitle Record Source backed by SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    records::{DialogLine, RecordRange, RecordSource, SubtitleRecord},
};
use futures::stream::{self, BoxStream, StreamExt};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, trace};

/// Files fetched per query while streaming
const PAGE_SIZE: u64 = 64;

/// Tables read by [`SqliteRecordSource`].
///
/// The indexer that fills the database owns these; the statements are kept
/// here so fixtures and fresh databases can be created with the same layout.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS series (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sha1 TEXT NOT NULL UNIQUE,
        filename TEXT NOT NULL,
        series_id TEXT REFERENCES series(id),
        path TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dialogs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        "begin" INTEGER NOT NULL,
        "end" INTEGER NOT NULL
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS idx_dialogs_file_begin ON dialogs(file_id, "begin")"#,
];

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    id: i64,
    sha1: String,
    filename: String,
    series_id: Option<String>,
    series_name: Option<String>,
    path: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DialogRow {
    content: String,
    begin: i64,
    end: i64,
}

impl From<DialogRow> for DialogLine {
    fn from(row: DialogRow) -> Self {
        DialogLine::new(row.content, row.begin, row.end)
    }
}

/// Paging cursor carried between stream steps
struct Cursor {
    offset: u64,
    remaining: Option<u64>,
    pending: VecDeque<FileRow>,
    exhausted: bool,
}

fn db_error(context: &str, error: sqlx::Error) -> BridgeError {
    BridgeError::DatabaseError(format!("{}: {}", context, error))
}

/// Read-only [`RecordSource`] over the local subtitle database.
///
/// Records are ordered by `files.id`. Files are fetched a page at a time and
/// each file's dialogs are loaded only when the record is pulled from the
/// stream, so memory use does not grow with the size of the database.
#[derive(Debug, Clone)]
pub struct SqliteRecordSource {
    pool: SqlitePool,
}

impl SqliteRecordSource {
    /// Open the database at `path` in read-only mode
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| {
                db_error(
                    &format!("Failed to open subtitle database {}", path.display()),
                    e,
                )
            })?;

        debug!(path = %path.display(), "Opened subtitle database");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet. Needs a writable pool.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to create schema", e))?;
        }
        Ok(())
    }

    async fn fetch_page(pool: &SqlitePool, offset: u64, limit: u64) -> Result<Vec<FileRow>> {
        trace!(offset, limit, "Fetching file page");
        sqlx::query_as::<_, FileRow>(
            r#"
            SELECT f.id, f.sha1, f.filename, f.series_id, s.name AS series_name, f.path
            FROM files f
            LEFT JOIN series s ON s.id = f.series_id
            ORDER BY f.id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Failed to read files", e))
    }

    async fn load_record(pool: &SqlitePool, row: FileRow) -> Result<SubtitleRecord> {
        let dialogs = sqlx::query_as::<_, DialogRow>(
            r#"
            SELECT content, "begin", "end"
            FROM dialogs
            WHERE file_id = ?
            ORDER BY "begin", id
            "#,
        )
        .bind(row.id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Failed to read dialogs", e))?;

        Ok(SubtitleRecord {
            sha1: row.sha1,
            filename: row.filename,
            series_id: row.series_id,
            series_name: row.series_name,
            path: row.path,
            dialogs: dialogs.into_iter().map(DialogLine::from).collect(),
        })
    }
}

#[async_trait]
impl RecordSource for SqliteRecordSource {
    async fn count(&self, range: RecordRange) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count files", e))?;

        Ok(range.clamp_count(total.max(0) as u64))
    }

    fn iterate(&self, range: RecordRange) -> BoxStream<'_, Result<SubtitleRecord>> {
        let pool = &self.pool;
        let cursor = Cursor {
            offset: range.begin,
            remaining: range.limit(),
            pending: VecDeque::new(),
            exhausted: range.limit() == Some(0),
        };

        stream::try_unfold(cursor, move |mut cursor| async move {
            if cursor.pending.is_empty() && !cursor.exhausted {
                let limit = cursor
                    .remaining
                    .map_or(PAGE_SIZE, |remaining| remaining.min(PAGE_SIZE));
                let page = Self::fetch_page(pool, cursor.offset, limit).await?;
                let fetched = page.len() as u64;

                cursor.offset += fetched;
                if let Some(remaining) = cursor.remaining.as_mut() {
                    *remaining = remaining.saturating_sub(fetched);
                }
                cursor.exhausted = fetched < limit || cursor.remaining == Some(0);
                cursor.pending.extend(page);
            }

            match cursor.pending.pop_front() {
                Some(row) => {
                    let record = Self::load_record(pool, row).await?;
                    Ok::<_, BridgeError>(Some((record, cursor)))
                }
                None => Ok(None),
            }
        })
        .boxed()
    }
}
