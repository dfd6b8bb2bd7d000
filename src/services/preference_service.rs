use crate::error::Result;
use crate::models::preferences::UserPrefs;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct PreferenceService {
    pool: SqlitePool,
}

impl PreferenceService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads a user's preference set, lazily creating the row with defaults
    /// on first contact so state survives restarts.
    pub async fn get_or_create(&self, chat_id: i64) -> Result<UserPrefs> {
        if let Some(prefs) = self.get(chat_id).await? {
            return Ok(prefs);
        }
        let prefs = UserPrefs::defaults(chat_id);
        self.save(&prefs).await?;
        Ok(prefs)
    }

    pub async fn get(&self, chat_id: i64) -> Result<Option<UserPrefs>> {
        let prefs = sqlx::query_as::<_, UserPrefs>(
            r#"
            SELECT chat_id, city, job_keyword, min_salary, schedule, auto_notify,
                   no_experience, accepts_ukrainians, no_lithuanian, no_english
            FROM users
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(prefs)
    }

    pub async fn save(&self, prefs: &UserPrefs) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (chat_id, city, job_keyword, min_salary, schedule, auto_notify,
                               no_experience, accepts_ukrainians, no_lithuanian, no_english)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT(chat_id) DO UPDATE SET
                city = excluded.city,
                job_keyword = excluded.job_keyword,
                min_salary = excluded.min_salary,
                schedule = excluded.schedule,
                auto_notify = excluded.auto_notify,
                no_experience = excluded.no_experience,
                accepts_ukrainians = excluded.accepts_ukrainians,
                no_lithuanian = excluded.no_lithuanian,
                no_english = excluded.no_english
            "#,
        )
        .bind(prefs.chat_id)
        .bind(&prefs.city)
        .bind(&prefs.job_keyword)
        .bind(&prefs.min_salary)
        .bind(&prefs.schedule)
        .bind(prefs.auto_notify)
        .bind(prefs.no_experience)
        .bind(prefs.accepts_ukrainians)
        .bind(prefs.no_lithuanian)
        .bind(prefs.no_english)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Every user the dispatch pass must evaluate.
    pub async fn list_auto_notify(&self) -> Result<Vec<UserPrefs>> {
        let users = sqlx::query_as::<_, UserPrefs>(
            r#"
            SELECT chat_id, city, job_keyword, min_salary, schedule, auto_notify,
                   no_experience, accepts_ukrainians, no_lithuanian, no_english
            FROM users
            WHERE auto_notify = 1
            ORDER BY chat_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
