use crate::models::posting::Posting;
use crate::models::preferences::{UserPrefs, DEFAULT_CITY};

/// Locale marker phrases the boolean filters look for in posting text.
/// Kept as data so new phrases (or another locale) can be added without
/// touching the matching logic. All phrases are matched lowercased.
#[derive(Debug, Clone)]
pub struct MarkerPhrases {
    pub no_experience: Vec<String>,
    pub accepts_ukrainians: Vec<String>,
    pub lithuanian_required: Vec<String>,
    pub english_required: Vec<String>,
}

impl Default for MarkerPhrases {
    fn default() -> Self {
        Self {
            no_experience: vec!["без опыта".to_string()],
            accepts_ukrainians: vec!["украин".to_string(), "ukrain".to_string()],
            lithuanian_required: vec!["литов".to_string()],
            english_required: vec!["english".to_string(), "англ".to_string()],
        }
    }
}

fn contains_any(haystack: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| haystack.contains(p.as_str()))
}

/// Pure conjunction of the user's configured criteria. Every text check is
/// a case-insensitive substring test, including `min_salary` against the
/// free-text salary field: that check is a known weak heuristic carried
/// over deliberately, not numeric comparison.
pub fn matches(posting: &Posting, prefs: &UserPrefs, markers: &MarkerPhrases) -> bool {
    let title = posting.title.to_lowercase();
    let description = posting.description.to_lowercase();

    if let Some(keyword) = prefs.job_keyword.as_deref() {
        let keyword = keyword.to_lowercase();
        if !keyword.is_empty()
            && !title.contains(keyword.as_str())
            && !description.contains(keyword.as_str())
        {
            return false;
        }
    }

    // The default city means "not narrowed down yet" and is not filtered on.
    if !prefs.city.is_empty() && prefs.city != DEFAULT_CITY {
        let city = prefs.city.to_lowercase();
        if !posting.city.to_lowercase().contains(city.as_str()) {
            return false;
        }
    }

    if let Some(min_salary) = prefs.min_salary.as_deref() {
        if !min_salary.is_empty() && !posting.salary.contains(min_salary) {
            return false;
        }
    }

    if let Some(schedule) = prefs.schedule.as_deref() {
        let schedule = schedule.to_lowercase();
        if !schedule.is_empty() && !posting.schedule.to_lowercase().contains(schedule.as_str()) {
            return false;
        }
    }

    let combined = format!("{} {}", title, description);

    if prefs.no_experience && !contains_any(&combined, &markers.no_experience) {
        return false;
    }
    if prefs.accepts_ukrainians && !contains_any(&combined, &markers.accepts_ukrainians) {
        return false;
    }
    if prefs.no_lithuanian && contains_any(&combined, &markers.lithuanian_required) {
        return false;
    }
    if prefs.no_english && contains_any(&combined, &markers.english_required) {
        return false;
    }

    true
}
