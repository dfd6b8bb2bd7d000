use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Placeholder title for items whose title selector matched nothing.
pub const UNTITLED: &str = "Без заголовка";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Posting {
    pub id: i64,
    pub title: String,
    pub city: String,
    pub description: String,
    pub salary: String,
    pub schedule: String,
    pub link: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl Posting {
    /// One outbound message per posting: title, city, description, salary
    /// line, link, each on its own line.
    pub fn to_message(&self) -> String {
        format!(
            "<b>{}</b>\n{}\n{}\nЗарплата: {}\n{}",
            self.title, self.city, self.description, self.salary, self.link
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPosting {
    pub title: String,
    pub city: String,
    pub description: String,
    pub salary: String,
    pub schedule: String,
    pub link: String,
    pub source: String,
}

impl NewPosting {
    /// Parses a manual submission of the form
    /// `title | city | description | salary | schedule | link`.
    /// Returns `None` when fewer than six fields are present or the link
    /// field is empty (a posting without a link has no dedup identity).
    pub fn from_manual_line(chat_id: i64, line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        if parts.len() < 6 || parts[5].is_empty() {
            return None;
        }
        Some(Self {
            title: parts[0].to_string(),
            city: parts[1].to_string(),
            description: parts[2].to_string(),
            salary: parts[3].to_string(),
            schedule: parts[4].to_string(),
            link: parts[5].to_string(),
            source: format!("manual:{}", chat_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_line_with_six_fields_parses() {
        let p = NewPosting::from_manual_line(
            7,
            "Повар | Kaunas | Кухня в центре | 1200 | полная | https://example.com/j/1",
        )
        .expect("six fields should parse");
        assert_eq!(p.title, "Повар");
        assert_eq!(p.city, "Kaunas");
        assert_eq!(p.salary, "1200");
        assert_eq!(p.schedule, "полная");
        assert_eq!(p.link, "https://example.com/j/1");
        assert_eq!(p.source, "manual:7");
    }

    #[test]
    fn manual_line_with_four_fields_is_rejected() {
        assert!(NewPosting::from_manual_line(7, "a | b | c | d").is_none());
    }

    #[test]
    fn manual_line_with_empty_link_is_rejected() {
        assert!(NewPosting::from_manual_line(7, "a | b | c | d | e | ").is_none());
    }

    #[test]
    fn message_puts_each_field_on_its_own_line() {
        let p = Posting {
            id: 1,
            title: "Водитель".to_string(),
            city: "Vilnius".to_string(),
            description: "Категория B".to_string(),
            salary: "1500".to_string(),
            schedule: "".to_string(),
            link: "https://example.com/j/2".to_string(),
            source: "example".to_string(),
            created_at: chrono::Utc::now(),
        };
        let text = p.to_message();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "<b>Водитель</b>");
        assert_eq!(lines[3], "Зарплата: 1500");
        assert_eq!(lines[4], "https://example.com/j/2");
    }
}
