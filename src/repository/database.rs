use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use sqlx::{
    Pool, QueryBuilder, Row, Sqlite, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::borrow::Cow;
use std::str::FromStr;
use tracing::info;

use crate::model::{CommitSize, FeatureMatrix, FeatureRow, FeatureValue, MethodId};

use super::SCHEMA_VERSION;

const BATCH_SIZE: usize = 5000;

/// A method row for database storage
#[derive(Debug, Clone)]
pub struct MethodRecord<'a> {
    pub method_id: i64,
    pub file_path: Cow<'a, str>,
    pub signature: Cow<'a, str>,
}

impl<'a> MethodRecord<'a> {
    pub fn new(
        method_id: u32,
        file_path: impl Into<Cow<'a, str>>,
        signature: impl Into<Cow<'a, str>>,
    ) -> Self {
        Self {
            method_id: i64::from(method_id),
            file_path: file_path.into(),
            signature: signature.into(),
        }
    }
}

/// One feature cell for database storage, value kept as text plus a type tag
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    pub method_id: i64,
    pub position: i64,
    pub kind: &'static str,
    pub value: String,
}

impl FeatureRecord {
    pub fn new(method_id: u32, position: usize, value: &FeatureValue) -> Self {
        Self {
            method_id: i64::from(method_id),
            position: position as i64,
            kind: value.kind(),
            value: value.to_string(),
        }
    }
}

/// Everything stored for one run
#[derive(Debug, Clone, Copy)]
pub struct RunRecords<'a> {
    pub columns: &'a [String],
    pub methods: &'a [MethodRecord<'a>],
    pub features: &'a [FeatureRecord],
    pub commits: &'a [CommitSize],
}

/// Database abstraction for SQLite operations
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .pragma("temp_store", "MEMORY")
            .pragma("cache_size", "-64000"); // 64MB cache

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Database living only as long as this value, used with `--no-cache`
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // One connection, otherwise every connection sees its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Ok(Self { pool })
    }

    /// Initialize database schema, returns true if schema was rebuilt
    pub async fn init_schema(&self) -> Result<bool> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let stored_version: Option<String> =
            sqlx::query("SELECT value FROM metadata WHERE key = 'schema_version'")
                .fetch_optional(&self.pool)
                .await?
                .map(|row| row.get("value"));

        let needs_rebuild = stored_version.as_deref() != Some(SCHEMA_VERSION);

        if needs_rebuild {
            if let Some(old) = &stored_version {
                info!(
                    "Schema version changed ({} -> {}), dropping cached runs",
                    old, SCHEMA_VERSION
                );
            }
            sqlx::query("DROP TABLE IF EXISTS commits").execute(&self.pool).await?;
            sqlx::query("DROP TABLE IF EXISTS features").execute(&self.pool).await?;
            sqlx::query("DROP TABLE IF EXISTS methods").execute(&self.pool).await?;
            sqlx::query("DROP TABLE IF EXISTS runs").execute(&self.pool).await?;
            sqlx::query("DELETE FROM metadata").execute(&self.pool).await?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS runs (
                label TEXT PRIMARY KEY,
                run_key TEXT NOT NULL,
                columns TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS methods (
                label TEXT NOT NULL,
                method_id INTEGER NOT NULL,
                file_path TEXT NOT NULL,
                signature TEXT NOT NULL,
                PRIMARY KEY (label, method_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS features (
                label TEXT NOT NULL,
                method_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                kind TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (label, method_id, position)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS commits (
                label TEXT NOT NULL,
                position INTEGER NOT NULL,
                commit_id TEXT NOT NULL,
                author TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                lines INTEGER NOT NULL,
                PRIMARY KEY (label, position)
            )",
        )
        .execute(&self.pool)
        .await?;

        if needs_rebuild {
            sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)")
                .bind(SCHEMA_VERSION)
                .execute(&self.pool)
                .await?;
        }

        Ok(needs_rebuild)
    }

    /// Get metadata value by key
    pub async fn get_metadata(&self, key: &str) -> Option<String> {
        sqlx::query("SELECT value FROM metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
            .map(|row| row.get("value"))
    }

    /// Run key stored for `label`
    pub async fn get_run_key(&self, label: &str) -> Option<String> {
        sqlx::query("SELECT run_key FROM runs WHERE label = ?")
            .bind(label)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
            .map(|row| row.get("run_key"))
    }

    /// Labels of every stored run
    pub async fn list_runs(&self) -> Result<Vec<String>> {
        let labels: Vec<String> = sqlx::query_scalar("SELECT label FROM runs ORDER BY label")
            .fetch_all(&self.pool)
            .await?;
        Ok(labels)
    }

    /// Replace one run (run row, methods, feature cells, commit sizes) in ONE transaction
    pub async fn save_run_with_callback<F>(
        &self,
        label: &str,
        run_key: &str,
        records: RunRecords<'_>,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(usize),
    {
        let columns_json = serde_json::to_string(records.columns)?;
        let mut tx = self.pool.begin().await?;

        self.delete_run_in_tx(&mut tx, label).await?;

        sqlx::query("INSERT INTO runs (label, run_key, columns) VALUES (?, ?, ?)")
            .bind(label)
            .bind(run_key)
            .bind(columns_json.as_str())
            .execute(&mut *tx)
            .await?;

        self.save_methods_in_tx(&mut tx, label, records.methods).await?;
        self.save_features_in_tx(&mut tx, label, records.features, &mut on_progress)
            .await?;
        self.save_commits_in_tx(&mut tx, label, records.commits).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Load a stored run, rows ordered by method id
    pub async fn load_run(&self, label: &str) -> Result<FeatureMatrix> {
        let Some(run) = sqlx::query("SELECT columns FROM runs WHERE label = ?")
            .bind(label)
            .fetch_optional(&self.pool)
            .await?
        else {
            bail!("No stored run named {}", label);
        };
        let columns_json: String = run.get("columns");
        let columns: Vec<String> = serde_json::from_str(&columns_json)
            .with_context(|| format!("Corrupt column list for run {}", label))?;

        let mut matrix = FeatureMatrix::new(columns);
        let mut row_of: FxHashMap<i64, usize> = FxHashMap::default();

        let methods = sqlx::query(
            "SELECT method_id, file_path, signature FROM methods WHERE label = ? ORDER BY method_id",
        )
        .bind(label)
        .fetch_all(&self.pool)
        .await?;

        for row in methods {
            let method_id: i64 = row.get("method_id");
            let id = u32::try_from(method_id)
                .with_context(|| format!("Method id {} out of range", method_id))?;
            row_of.insert(method_id, matrix.methods.len());
            matrix.methods.push(FeatureRow {
                id: MethodId(id),
                file: row.get("file_path"),
                signature: row.get("signature"),
                values: Vec::with_capacity(matrix.columns.len()),
            });
        }

        let features = sqlx::query(
            "SELECT method_id, kind, value FROM features WHERE label = ? ORDER BY method_id, position",
        )
        .bind(label)
        .fetch_all(&self.pool)
        .await?;

        for row in features {
            let method_id: i64 = row.get("method_id");
            let kind: String = row.get("kind");
            let text: String = row.get("value");
            let Some(&idx) = row_of.get(&method_id) else {
                bail!("Feature for unknown method {} in run {}", method_id, label);
            };
            let value = FeatureValue::parse(&kind, &text)
                .with_context(|| format!("Corrupt feature value {:?} ({})", text, kind))?;
            matrix.methods[idx].values.push(value);
        }

        let commits = sqlx::query(
            "SELECT position, commit_id, author, timestamp, lines FROM commits WHERE label = ? ORDER BY position",
        )
        .bind(label)
        .fetch_all(&self.pool)
        .await?;

        for row in commits {
            let position: i64 = row.get("position");
            let lines: i64 = row.get("lines");
            matrix.commits.push(CommitSize {
                index: usize::try_from(position)
                    .with_context(|| format!("Commit position {} out of range", position))?,
                commit: row.get("commit_id"),
                author: row.get("author"),
                timestamp: row.get("timestamp"),
                lines: usize::try_from(lines)
                    .with_context(|| format!("Commit size {} out of range", lines))?,
            });
        }

        Ok(matrix)
    }

    async fn delete_run_in_tx(&self, tx: &mut Transaction<'_, Sqlite>, label: &str) -> Result<()> {
        for table in ["commits", "features", "methods", "runs"] {
            sqlx::query(&format!("DELETE FROM {} WHERE label = ?", table))
                .bind(label)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn save_methods_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        label: &str,
        methods: &[MethodRecord<'_>],
    ) -> Result<()> {
        for chunk in methods.chunks(BATCH_SIZE) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO methods (label, method_id, file_path, signature) ");
            qb.push_values(chunk, |mut row, record| {
                row.push_bind(label)
                    .push_bind(record.method_id)
                    .push_bind(record.file_path.as_ref())
                    .push_bind(record.signature.as_ref());
            });
            qb.build().execute(&mut **tx).await?;
        }
        Ok(())
    }

    async fn save_features_in_tx<F>(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        label: &str,
        features: &[FeatureRecord],
        on_progress: &mut F,
    ) -> Result<()>
    where
        F: FnMut(usize),
    {
        for chunk in features.chunks(BATCH_SIZE) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO features (label, method_id, position, kind, value) ",
            );
            qb.push_values(chunk, |mut row, record| {
                row.push_bind(label)
                    .push_bind(record.method_id)
                    .push_bind(record.position)
                    .push_bind(record.kind)
                    .push_bind(record.value.as_str());
            });
            qb.build().execute(&mut **tx).await?;

            on_progress(chunk.len());
        }
        Ok(())
    }

    async fn save_commits_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        label: &str,
        commits: &[CommitSize],
    ) -> Result<()> {
        for chunk in commits.chunks(BATCH_SIZE) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO commits (label, position, commit_id, author, timestamp, lines) ",
            );
            qb.push_values(chunk, |mut row, c| {
                row.push_bind(label)
                    .push_bind(c.index as i64)
                    .push_bind(c.commit.as_str())
                    .push_bind(c.author.as_str())
                    .push_bind(c.timestamp)
                    .push_bind(c.lines as i64);
            });
            qb.build().execute(&mut **tx).await?;
        }
        Ok(())
    }
}
