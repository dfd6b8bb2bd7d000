use crate::error::Result;
use crate::models::posting::{NewPosting, Posting};
use crate::models::preferences::UserPrefs;
use crate::services::filter::{self, MarkerPhrases};
use sqlx::SqlitePool;

/// How many of the newest stored postings a single match query scans.
const MATCH_SCAN_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy)]
pub struct InsertOutcome {
    pub id: i64,
    pub inserted: bool,
}

#[derive(Clone)]
pub struct PostingService {
    pool: SqlitePool,
}

impl PostingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a posting, deduplicating on `link`. A duplicate link is a
    /// normal outcome (`inserted == false`, existing row id returned),
    /// never an error; the unique index is the authoritative dedup point
    /// even under concurrent writers.
    pub async fn insert(&self, posting: &NewPosting) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO postings (title, city, description, salary, schedule, link, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(link) DO NOTHING
            "#,
        )
        .bind(&posting.title)
        .bind(&posting.city)
        .bind(&posting.description)
        .bind(&posting.salary)
        .bind(&posting.schedule)
        .bind(&posting.link)
        .bind(&posting.source)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(InsertOutcome {
                id: result.last_insert_rowid(),
                inserted: true,
            });
        }

        let id: i64 = sqlx::query_scalar("SELECT id FROM postings WHERE link = $1")
            .bind(&posting.link)
            .fetch_one(&self.pool)
            .await?;
        Ok(InsertOutcome {
            id,
            inserted: false,
        })
    }

    /// Newest postings first; `id` breaks ties within one timestamp second
    /// so insertion order survives the sort.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Posting>> {
        let postings = sqlx::query_as::<_, Posting>(
            r#"
            SELECT id, title, city, description, salary, schedule, link, source, created_at
            FROM postings
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(postings)
    }

    /// Runs the filter engine over the newest stored postings and returns
    /// up to `limit` matches, newest first.
    pub async fn find_matching(
        &self,
        prefs: &UserPrefs,
        markers: &MarkerPhrases,
        limit: usize,
    ) -> Result<Vec<Posting>> {
        let postings = self.list_recent(MATCH_SCAN_LIMIT).await?;
        Ok(postings
            .into_iter()
            .filter(|p| filter::matches(p, prefs, markers))
            .take(limit)
            .collect())
    }
}
