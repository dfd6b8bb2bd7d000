use crate::error::Result;
use sqlx::SqlitePool;

/// Durable (chat, posting) delivery ledger. A pair is recorded only after
/// a confirmed send, and re-marking an existing pair is a no-op, which is
/// what makes delivery at-most-once across passes and restarts.
#[derive(Clone)]
pub struct LedgerService {
    pool: SqlitePool,
}

impl LedgerService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn has_sent(&self, chat_id: i64, posting_id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM deliveries WHERE chat_id = $1 AND posting_id = $2",
        )
        .bind(chat_id)
        .bind(posting_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    pub async fn mark_sent(&self, chat_id: i64, posting_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO deliveries (chat_id, posting_id)
            VALUES ($1, $2)
            ON CONFLICT(chat_id, posting_id) DO NOTHING
            "#,
        )
        .bind(chat_id)
        .bind(posting_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
