use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Locale default; the city filter is skipped while the user keeps it.
pub const DEFAULT_CITY: &str = "Kaunas";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPrefs {
    pub chat_id: i64,
    pub city: String,
    pub job_keyword: Option<String>,
    pub min_salary: Option<String>,
    pub schedule: Option<String>,
    pub auto_notify: bool,
    pub no_experience: bool,
    pub accepts_ukrainians: bool,
    pub no_lithuanian: bool,
    pub no_english: bool,
}

impl UserPrefs {
    pub fn defaults(chat_id: i64) -> Self {
        Self {
            chat_id,
            city: DEFAULT_CITY.to_string(),
            job_keyword: None,
            min_salary: None,
            schedule: None,
            auto_notify: false,
            no_experience: false,
            accepts_ukrainians: false,
            no_lithuanian: false,
            no_english: false,
        }
    }
}
