use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::config::Config;
use crate::models::{AnnotationRecord, AnnotationRow, WordRecord, WordRow};

pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(config: &Config) -> Result<Self> {
        let db_path = std::env::current_dir()?.join(&config.database.db_file);

        println!("💾 连接数据库: {}", db_path.display());

        // 数据库文件不存在时先建一个空文件
        if !db_path.exists() {
            std::fs::File::create(&db_path)
                .with_context(|| format!("无法创建数据库文件: {}", db_path.display()))?;
        }

        Self::connect(&format!("sqlite:{}", db_path.display())).await
    }

    // 构建期间数据库为本流水线独占，单连接即可，也避免并发写入
    pub async fn connect(db_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(db_url)
            .await
            .with_context(|| format!("无法连接数据库: {}", db_url))?;
        Ok(DatabaseManager { pool })
    }

    // 每次运行都从零重建两张表
    pub async fn reset_schema(&self) -> Result<()> {
        sqlx::query("DROP TABLE IF EXISTS words")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            r#"
            CREATE TABLE words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entry_id INTEGER NOT NULL,
                display_form TEXT NOT NULL,
                search_form TEXT NOT NULL,
                category TEXT NOT NULL,
                priority INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("DROP TABLE IF EXISTS annotations")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            r#"
            CREATE TABLE annotations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entry_id INTEGER NOT NULL,
                tag TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // 批量写入完成后再建索引，避免插入期间的增量索引维护开销
    pub async fn create_word_indexes(&self) -> Result<()> {
        sqlx::query(
            "CREATE INDEX idx_words_entry ON words (entry_id, search_form, display_form, category, priority)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX idx_words_search ON words (search_form, entry_id, category, priority)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn create_annotation_index(&self) -> Result<()> {
        sqlx::query("CREATE INDEX idx_annotations_entry ON annotations (entry_id, tag)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // 建完索引后回收磁盘空间
    pub async fn vacuum(&self) -> Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }

    pub fn writer(&self, batch_size: usize) -> BatchWriter {
        BatchWriter::new(self.pool.clone(), batch_size)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn all_words(&self) -> Result<Vec<WordRow>> {
        let rows = sqlx::query_as::<_, WordRow>(
            "SELECT id, entry_id, display_form, search_form, category, priority FROM words ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn all_annotations(&self) -> Result<Vec<AnnotationRow>> {
        let rows = sqlx::query_as::<_, AnnotationRow>(
            "SELECT id, entry_id, tag FROM annotations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn index_names(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }
}

// 批量提交策略：累积记录，每处理 batch_size 个词条提交一次事务。
// 提交节奏只由 entry_done/flush 驱动，与提取循环解耦。
pub struct BatchWriter {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    batch_size: usize,
    entries_in_batch: usize,
    commits: u64,
}

impl BatchWriter {
    fn new(pool: SqlitePool, batch_size: usize) -> Self {
        BatchWriter {
            pool,
            tx: None,
            batch_size: batch_size.max(1),
            entries_in_batch: 0,
            commits: 0,
        }
    }

    async fn begin_if_needed(&mut self) -> Result<&mut Transaction<'static, Sqlite>> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        self.tx.as_mut().context("事务未打开")
    }

    pub async fn insert_word(&mut self, record: &WordRecord) -> Result<()> {
        let tx = self.begin_if_needed().await?;
        sqlx::query(
            "INSERT INTO words (entry_id, display_form, search_form, category, priority) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.entry_id)
        .bind(&record.display_form)
        .bind(&record.search_form)
        .bind(record.category.as_str())
        .bind(record.priority)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn insert_annotation(&mut self, record: &AnnotationRecord) -> Result<()> {
        let tx = self.begin_if_needed().await?;
        sqlx::query("INSERT INTO annotations (entry_id, tag) VALUES (?, ?)")
            .bind(record.entry_id)
            .bind(&record.tag)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    // 一个词条的所有记录都写完后调用；攒够一批就提交
    pub async fn entry_done(&mut self) -> Result<()> {
        self.entries_in_batch += 1;
        if self.entries_in_batch >= self.batch_size {
            self.commit().await?;
        }
        Ok(())
    }

    // 提交不满一批的尾巴
    pub async fn flush(&mut self) -> Result<()> {
        if self.tx.is_some() {
            self.commit().await?;
        }
        self.entries_in_batch = 0;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            self.commits += 1;
        }
        self.entries_in_batch = 0;
        Ok(())
    }

    pub fn commit_count(&self) -> u64 {
        self.commits
    }
}
