use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rb_core::{Article, Error, NewArticle, NewSourceItem, Record, RecordStore, Result, SourceItem};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS source_items (
        id TEXT PRIMARY KEY,
        external_id TEXT NOT NULL,
        community TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        fetched_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        source_item_id TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Both record collections in one SQLite file. Each save commits on its own.
pub struct SqliteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::PersistenceFailed(format!("Failed to create database directory: {}", e))
            })?;
        }

        // Concurrent saves from separate pool connections wait on the write lock
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::PersistenceFailed(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::PersistenceFailed(format!("Failed to run migration {}: {}", i, e)))?;
        }

        tracing::debug!("SQLite storage ready at {}", db_path.display());
        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn delete_from(&self, table: &str, kind: &str, id: Uuid) -> Result<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::PersistenceFailed(format!("Failed to delete {}: {}", kind, e)))?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(kind, id));
        }
        Ok(())
    }
}

fn column<T>(row: &SqliteRow, name: &str) -> Result<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| Error::PersistenceFailed(format!("Failed to read column {}: {}", name, e)))
}

fn uuid_column(row: &SqliteRow, name: &str) -> Result<Uuid> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw)
        .map_err(|e| Error::PersistenceFailed(format!("Invalid id in column {}: {}", name, e)))
}

fn time_column(row: &SqliteRow, name: &str) -> Result<DateTime<Utc>> {
    let raw: String = column(row, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::PersistenceFailed(format!("Failed to parse date: {}", e)))
}

fn source_item_from_row(row: &SqliteRow) -> Result<SourceItem> {
    Ok(SourceItem {
        id: uuid_column(row, "id")?,
        external_id: column(row, "external_id")?,
        community: column(row, "community")?,
        title: column(row, "title")?,
        body: column(row, "body")?,
        fetched_at: time_column(row, "fetched_at")?,
    })
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        id: uuid_column(row, "id")?,
        source_item_id: uuid_column(row, "source_item_id")?,
        title: column(row, "title")?,
        content: column(row, "content")?,
        created_at: time_column(row, "created_at")?,
    })
}

#[async_trait]
impl RecordStore<SourceItem> for SqliteStorage {
    async fn save(&self, draft: NewSourceItem) -> Result<SourceItem> {
        let item = SourceItem::from_draft(Uuid::new_v4(), draft);
        sqlx::query(
            r#"
            INSERT INTO source_items
            (id, external_id, community, title, body, fetched_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(&item.external_id)
        .bind(&item.community)
        .bind(&item.title)
        .bind(&item.body)
        .bind(item.fetched_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::PersistenceFailed(format!("Failed to store source item: {}", e)))?;
        Ok(item)
    }

    async fn find_all(&self) -> Result<Vec<SourceItem>> {
        let rows = sqlx::query("SELECT * FROM source_items ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::PersistenceFailed(format!("Failed to list source items: {}", e)))?;
        rows.iter().map(source_item_from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<SourceItem> {
        let row = sqlx::query("SELECT * FROM source_items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::PersistenceFailed(format!("Failed to get source item: {}", e)))?;
        match row {
            Some(row) => source_item_from_row(&row),
            None => Err(Error::not_found(SourceItem::KIND, id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_from("source_items", SourceItem::KIND, id).await
    }
}

#[async_trait]
impl RecordStore<Article> for SqliteStorage {
    async fn save(&self, draft: NewArticle) -> Result<Article> {
        let article = Article::from_draft(Uuid::new_v4(), draft);
        sqlx::query(
            r#"
            INSERT INTO articles
            (id, source_item_id, title, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(article.source_item_id.to_string())
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::PersistenceFailed(format!("Failed to store article: {}", e)))?;
        Ok(article)
    }

    async fn find_all(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT * FROM articles ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::PersistenceFailed(format!("Failed to list articles: {}", e)))?;
        rows.iter().map(article_from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Article> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::PersistenceFailed(format!("Failed to get article: {}", e)))?;
        match row {
            Some(row) => article_from_row(&row),
            None => Err(Error::not_found(Article::KIND, id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_from("articles", Article::KIND, id).await
    }
}
