use serde::{Deserialize, Serialize};
use validator::Validate;

/// One scrapeable page plus the CSS selector rules used to extract
/// postings from it. Field selectors may be empty; an empty selector
/// simply yields an empty field for every item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceDefinition {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[serde(default)]
    pub item_selector: String,
    #[serde(default)]
    pub title_selector: String,
    #[serde(default)]
    pub city_selector: String,
    #[serde(default)]
    pub description_selector: String,
    #[serde(default)]
    pub salary_selector: String,
    #[serde(default = "default_link_selector")]
    pub link_selector: String,
}

fn default_link_selector() -> String {
    "a".to_string()
}

impl SourceDefinition {
    /// The placeholder definition materialized on first run when no
    /// sources file exists yet.
    pub fn example() -> Self {
        Self {
            name: "example".to_string(),
            url: "https://example.com/jobs".to_string(),
            item_selector: ".job-item".to_string(),
            title_selector: ".title".to_string(),
            city_selector: ".city".to_string(),
            description_selector: ".desc".to_string(),
            salary_selector: ".salary".to_string(),
            link_selector: "a".to_string(),
        }
    }
}
