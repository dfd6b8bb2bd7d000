use serde_json::{json, Value as JsonValue};

use crate::models::preferences::UserPrefs;

pub const BTN_SEARCH: &str = "🔍 Поиск вакансий";
pub const BTN_SEARCH_SETTINGS: &str = "⚙ Настройки поиска";
pub const BTN_FILTERS: &str = "🧩 Фильтры";
pub const BTN_AUTO_NOTIFY: &str = "📬 Авто уведомления";
pub const BTN_ADD_POSTING: &str = "➕ Добавить вакансию";
pub const BTN_SHOW_SETTINGS: &str = "📋 Показать настройки";
pub const BTN_BACK: &str = "⬅ Назад";

pub const BTN_NO_EXPERIENCE: &str = "Без опыта";
pub const BTN_UKRAINIANS: &str = "Берут украинцев";
pub const BTN_NO_LITHUANIAN: &str = "Без литовского";
pub const BTN_NO_ENGLISH: &str = "Без английского";

fn reply_keyboard(rows: Vec<Vec<&str>>) -> JsonValue {
    json!({
        "keyboard": rows
            .into_iter()
            .map(|row| row.into_iter().map(|b| json!({ "text": b })).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
        "resize_keyboard": true,
    })
}

pub fn main_menu() -> JsonValue {
    reply_keyboard(vec![
        vec![BTN_SEARCH],
        vec![BTN_SEARCH_SETTINGS],
        vec![BTN_FILTERS],
        vec![BTN_AUTO_NOTIFY],
        vec![BTN_ADD_POSTING],
        vec![BTN_SHOW_SETTINGS],
    ])
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ВКЛ"
    } else {
        "ВЫКЛ"
    }
}

pub fn filters_menu(prefs: &UserPrefs) -> JsonValue {
    let rows = vec![
        format!("{}: {}", BTN_NO_EXPERIENCE, on_off(prefs.no_experience)),
        format!("{}: {}", BTN_UKRAINIANS, on_off(prefs.accepts_ukrainians)),
        format!("{}: {}", BTN_NO_LITHUANIAN, on_off(prefs.no_lithuanian)),
        format!("{}: {}", BTN_NO_ENGLISH, on_off(prefs.no_english)),
        BTN_BACK.to_string(),
    ];
    json!({
        "keyboard": rows.iter().map(|b| vec![json!({ "text": b })]).collect::<Vec<_>>(),
        "resize_keyboard": true,
    })
}

pub fn back_menu() -> JsonValue {
    reply_keyboard(vec![vec![BTN_BACK]])
}
