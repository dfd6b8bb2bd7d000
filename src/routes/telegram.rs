use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::models::conversation::PendingInput;
use crate::models::posting::NewPosting;
use crate::models::preferences::UserPrefs;
use crate::services::dispatch_service::{AD_HOC_SEARCH_LIMIT, MENU_SEARCH_LIMIT};
use crate::utils::keyboards;
use crate::{error::Result, AppState};

#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    pub r#type: String,
}

const MANUAL_FORMAT_HINT: &str =
    "Отправь вакансию в формате (через |):\nНазвание | Город | Краткое описание | Зарплата | График | Ссылка";
const MANUAL_FORMAT_ERROR: &str =
    "Неверный формат. Пример:\nНазвание | Город | Описание | Зарплата | График | Ссылка";

pub async fn handle_webhook(
    State(state): State<AppState>,
    Json(update): Json<TelegramUpdate>,
) -> Result<impl axum::response::IntoResponse> {
    info!("Received Telegram webhook update ID: {}", update.update_id);

    if let Some(message) = update.message {
        if let Some(text) = message.text.as_deref() {
            handle_text(&state, message.chat.id, text.trim()).await?;
        }
    }

    Ok(axum::http::StatusCode::OK)
}

async fn handle_text(state: &AppState, chat_id: i64, text: &str) -> Result<()> {
    // First contact creates the preference row with defaults.
    let prefs = state.preferences.get_or_create(chat_id).await?;

    // An armed pending state swallows the next free-text message whole.
    let pending = state.take_pending(chat_id);
    if let Some(pending) = pending {
        return consume_pending(state, prefs, pending, text).await;
    }

    route_text(state, prefs, text).await
}

async fn consume_pending(
    state: &AppState,
    mut prefs: UserPrefs,
    pending: PendingInput,
    text: &str,
) -> Result<()> {
    let chat_id = prefs.chat_id;
    match pending {
        PendingInput::AwaitingCity => {
            prefs.city = text.to_string();
            state.preferences.save(&prefs).await?;
            state
                .notifier
                .send_with_keyboard(chat_id, "Город обновлён.", keyboards::main_menu())
                .await?;
        }
        PendingInput::AwaitingKeyword => {
            prefs.job_keyword = Some(text.to_string());
            state.preferences.save(&prefs).await?;
            state
                .notifier
                .send_with_keyboard(
                    chat_id,
                    "Ключевое слово вакансии сохранено.",
                    keyboards::main_menu(),
                )
                .await?;
        }
        PendingInput::AwaitingSalary => {
            prefs.min_salary = Some(text.to_string());
            state.preferences.save(&prefs).await?;
            state
                .notifier
                .send_with_keyboard(chat_id, "Зарплата сохранена.", keyboards::main_menu())
                .await?;
        }
        PendingInput::AwaitingSchedule => {
            prefs.schedule = Some(text.to_string());
            state.preferences.save(&prefs).await?;
            state
                .notifier
                .send_with_keyboard(chat_id, "График сохранён.", keyboards::main_menu())
                .await?;
        }
        PendingInput::AwaitingManualPosting => {
            let Some(posting) = NewPosting::from_manual_line(chat_id, text) else {
                state.notifier.send_text(chat_id, MANUAL_FORMAT_ERROR).await?;
                return Ok(());
            };
            let outcome = state.postings.insert(&posting).await?;
            let reply = if outcome.inserted {
                "Вакансия добавлена и сохранена в базе."
            } else {
                "Эта вакансия уже есть в базе."
            };
            state
                .notifier
                .send_with_keyboard(chat_id, reply, keyboards::main_menu())
                .await?;
        }
    }
    Ok(())
}

async fn route_text(state: &AppState, mut prefs: UserPrefs, text: &str) -> Result<()> {
    let chat_id = prefs.chat_id;

    if text.starts_with("/start") {
        state
            .notifier
            .send_with_keyboard(
                chat_id,
                "Привет! Я ищу вакансии. Выбери действие:",
                keyboards::main_menu(),
            )
            .await?;
    } else if text.starts_with("/settings") {
        let body = serde_json::to_string_pretty(&prefs)?;
        state
            .notifier
            .send_text(chat_id, &format!("Твои настройки:\n{}", body))
            .await?;
    } else if let Some(keyword) = text.strip_prefix("/search ") {
        // Transient query: the stored keyword preference is not touched.
        let mut transient = prefs.clone();
        transient.job_keyword = Some(keyword.trim().to_string());
        send_matches(
            state,
            &transient,
            AD_HOC_SEARCH_LIMIT,
            "Ничего не найдено по запросу.",
        )
        .await?;
    } else if text == keyboards::BTN_SEARCH {
        send_matches(state, &prefs, MENU_SEARCH_LIMIT, "Вакансий не найдено.").await?;
    } else if text == keyboards::BTN_SEARCH_SETTINGS {
        state
            .notifier
            .send_with_keyboard(
                chat_id,
                "Напиши одно из слов: город, вакансия, зарплата, график\nНапример: город\nПосле этого введи значение.",
                keyboards::back_menu(),
            )
            .await?;
    } else if text == keyboards::BTN_FILTERS {
        state
            .notifier
            .send_with_keyboard(chat_id, "Фильтры:", keyboards::filters_menu(&prefs))
            .await?;
    } else if text.starts_with(keyboards::BTN_NO_EXPERIENCE) {
        prefs.no_experience = !prefs.no_experience;
        toggle_reply(state, &prefs, keyboards::BTN_NO_EXPERIENCE, prefs.no_experience).await?;
    } else if text.starts_with(keyboards::BTN_UKRAINIANS) {
        prefs.accepts_ukrainians = !prefs.accepts_ukrainians;
        toggle_reply(state, &prefs, keyboards::BTN_UKRAINIANS, prefs.accepts_ukrainians).await?;
    } else if text.starts_with(keyboards::BTN_NO_LITHUANIAN) {
        prefs.no_lithuanian = !prefs.no_lithuanian;
        toggle_reply(state, &prefs, keyboards::BTN_NO_LITHUANIAN, prefs.no_lithuanian).await?;
    } else if text.starts_with(keyboards::BTN_NO_ENGLISH) {
        prefs.no_english = !prefs.no_english;
        toggle_reply(state, &prefs, keyboards::BTN_NO_ENGLISH, prefs.no_english).await?;
    } else if text == keyboards::BTN_BACK {
        state
            .notifier
            .send_with_keyboard(chat_id, "Главное меню", keyboards::main_menu())
            .await?;
    } else if text == keyboards::BTN_AUTO_NOTIFY {
        prefs.auto_notify = !prefs.auto_notify;
        state.preferences.save(&prefs).await?;
        let label = if prefs.auto_notify { "ВКЛ" } else { "ВЫКЛ" };
        state
            .notifier
            .send_with_keyboard(
                chat_id,
                &format!("Авто-уведомления: {}", label),
                keyboards::main_menu(),
            )
            .await?;
    } else if text == keyboards::BTN_ADD_POSTING {
        state.set_pending(chat_id, PendingInput::AwaitingManualPosting);
        state.notifier.send_text(chat_id, MANUAL_FORMAT_HINT).await?;
    } else if text == keyboards::BTN_SHOW_SETTINGS {
        let body = serde_json::to_string_pretty(&prefs)?;
        state
            .notifier
            .send_with_keyboard(
                chat_id,
                &format!("Текущие настройки:\n{}", body),
                keyboards::main_menu(),
            )
            .await?;
    } else if let Some((pending, prompt)) = settings_prompt(text) {
        state.set_pending(chat_id, pending);
        state.notifier.send_text(chat_id, prompt).await?;
    } else {
        state
            .notifier
            .send_with_keyboard(
                chat_id,
                "Не понял. Используй меню или /search <слово>.",
                keyboards::main_menu(),
            )
            .await?;
    }

    Ok(())
}

/// Maps a settings keyword (Russian or English) onto the pending-input
/// state that captures the user's next message.
fn settings_prompt(text: &str) -> Option<(PendingInput, &'static str)> {
    match text.to_lowercase().as_str() {
        "город" | "city" => Some((PendingInput::AwaitingCity, "Введи город:")),
        "вакансия" | "job" | "vacancy" => Some((
            PendingInput::AwaitingKeyword,
            "Введи название вакансии (ключевое слово):",
        )),
        "зарплата" | "salary" => Some((
            PendingInput::AwaitingSalary,
            "Введи минимальную зарплату (число):",
        )),
        "график" | "schedule" => Some((
            PendingInput::AwaitingSchedule,
            "Введи график (полная/смены/полдня и т.д.):",
        )),
        _ => None,
    }
}

async fn toggle_reply(
    state: &AppState,
    prefs: &UserPrefs,
    label: &str,
    value: bool,
) -> Result<()> {
    state.preferences.save(prefs).await?;
    let status = if value { "ВКЛ" } else { "ВЫКЛ" };
    state
        .notifier
        .send_with_keyboard(
            prefs.chat_id,
            &format!("{}: {}", label, status),
            keyboards::filters_menu(prefs),
        )
        .await?;
    Ok(())
}

async fn send_matches(
    state: &AppState,
    prefs: &UserPrefs,
    limit: usize,
    empty_reply: &str,
) -> Result<()> {
    let matches = state
        .postings
        .find_matching(prefs, &state.markers, limit)
        .await?;

    if matches.is_empty() {
        state.notifier.send_text(prefs.chat_id, empty_reply).await?;
        return Ok(());
    }
    for posting in matches {
        state
            .notifier
            .send_text(prefs.chat_id, &posting.to_message())
            .await?;
    }
    Ok(())
}
