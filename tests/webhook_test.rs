use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, http::Request, http::StatusCode, routing::post, Router};
use jobwatch_backend::error::Result;
use jobwatch_backend::models::posting::NewPosting;
use jobwatch_backend::routes;
use jobwatch_backend::services::scrape_service::Fetcher;
use jobwatch_backend::services::telegram_service::Notifier;
use jobwatch_backend::AppState;
use serde_json::json;
use sqlx::SqlitePool;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn last_text(&self) -> String {
        self.sent.lock().unwrap().last().expect("no messages").1.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        _reply_markup: serde_json::Value,
    ) -> Result<()> {
        self.send_text(chat_id, text).await
    }
}

struct NoFetch;

#[async_trait]
impl Fetcher for NoFetch {
    async fn fetch(&self, _url: &str) -> Result<String> {
        panic!("webhook tests must not hit the network");
    }
}

async fn setup_app() -> (Router, AppState, Arc<RecordingNotifier>) {
    let pool: SqlitePool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::with_transport(pool, notifier.clone(), Arc::new(NoFetch));
    let app = Router::new()
        .route(
            "/api/webhook/telegram",
            post(routes::telegram::handle_webhook),
        )
        .with_state(state.clone());

    (app, state, notifier)
}

async fn send_text(app: &Router, chat_id: i64, text: &str) -> StatusCode {
    let body = json!({
        "update_id": 1,
        "message": {
            "message_id": 1,
            "chat": { "id": chat_id, "type": "private" },
            "text": text,
        }
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/webhook/telegram")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap().status()
}

#[tokio::test]
async fn start_creates_a_preference_row_and_replies_with_the_menu() {
    let (app, state, notifier) = setup_app().await;

    assert_eq!(send_text(&app, 10, "/start").await, StatusCode::OK);

    let prefs = state.preferences.get(10).await.unwrap().expect("prefs row");
    assert_eq!(prefs.city, "Kaunas");
    assert!(!prefs.auto_notify);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Выбери действие"));
}

#[tokio::test]
async fn malformed_manual_submission_is_rejected_without_store_mutation() {
    let (app, state, notifier) = setup_app().await;

    send_text(&app, 20, "➕ Добавить вакансию").await;
    assert!(notifier.last_text().contains("через |"));

    // Only four pipe-delimited fields: usage message, nothing stored.
    send_text(&app, 20, "Повар | Kaunas | описание | 1200").await;
    assert!(notifier.last_text().contains("Неверный формат"));
    assert!(state.postings.list_recent(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn manual_submission_inserts_and_reports_duplicates() {
    let (app, state, notifier) = setup_app().await;
    let line = "Повар | Kaunas | описание | 1200 | полная | https://example.com/j/5";

    send_text(&app, 20, "➕ Добавить вакансию").await;
    send_text(&app, 20, line).await;
    assert!(notifier.last_text().contains("добавлена"));

    let stored = state.postings.list_recent(10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].source, "manual:20");
    assert_eq!(stored[0].schedule, "полная");

    // Same link again: parser accepts, user is told it already exists.
    send_text(&app, 20, "➕ Добавить вакансию").await;
    send_text(&app, 20, line).await;
    assert!(notifier.last_text().contains("уже есть"));
    assert_eq!(state.postings.list_recent(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn ad_hoc_search_does_not_persist_the_keyword() {
    let (app, state, notifier) = setup_app().await;

    state
        .postings
        .insert(&NewPosting {
            title: "Line Cook Needed".to_string(),
            city: "Vilnius".to_string(),
            description: String::new(),
            salary: "1400".to_string(),
            schedule: String::new(),
            link: "https://example.com/j/6".to_string(),
            source: "test".to_string(),
        })
        .await
        .unwrap();

    send_text(&app, 30, "/search cook").await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Line Cook Needed"));

    let prefs = state.preferences.get(30).await.unwrap().unwrap();
    assert_eq!(prefs.job_keyword, None);
}

#[tokio::test]
async fn search_with_no_matches_reports_no_results() {
    let (app, _state, notifier) = setup_app().await;

    send_text(&app, 40, "🔍 Поиск вакансий").await;
    assert_eq!(notifier.last_text(), "Вакансий не найдено.");

    send_text(&app, 40, "/search сварщик").await;
    assert_eq!(notifier.last_text(), "Ничего не найдено по запросу.");
}

#[tokio::test]
async fn filter_toggle_round_trips_through_storage() {
    let (app, state, notifier) = setup_app().await;

    send_text(&app, 50, "Без опыта: ВЫКЛ").await;
    let prefs = state.preferences.get(50).await.unwrap().unwrap();
    assert!(prefs.no_experience);
    assert!(notifier.last_text().contains("Без опыта: ВКЛ"));

    send_text(&app, 50, "Без опыта: ВКЛ").await;
    let prefs = state.preferences.get(50).await.unwrap().unwrap();
    assert!(!prefs.no_experience);
}

#[tokio::test]
async fn settings_keyword_arms_pending_input_for_the_next_message() {
    let (app, state, notifier) = setup_app().await;

    send_text(&app, 60, "город").await;
    assert!(notifier.last_text().contains("Введи город"));

    // The next free-text message is consumed as the city value, not as a
    // command.
    send_text(&app, 60, "Vilnius").await;
    assert!(notifier.last_text().contains("Город обновлён"));
    let prefs = state.preferences.get(60).await.unwrap().unwrap();
    assert_eq!(prefs.city, "Vilnius");

    // Pending state was consumed: the same text now falls through to the
    // fallback reply.
    send_text(&app, 60, "Vilnius").await;
    assert!(notifier.last_text().contains("Не понял"));
}

#[tokio::test]
async fn unknown_text_gets_the_fallback_hint() {
    let (app, _state, notifier) = setup_app().await;

    send_text(&app, 70, "что-то странное").await;
    assert!(notifier.last_text().contains("/search"));
}

#[tokio::test]
async fn auto_notify_button_toggles_the_flag() {
    let (app, state, notifier) = setup_app().await;

    send_text(&app, 80, "📬 Авто уведомления").await;
    assert!(state.preferences.get(80).await.unwrap().unwrap().auto_notify);
    assert!(notifier.last_text().contains("ВКЛ"));

    send_text(&app, 80, "📬 Авто уведомления").await;
    assert!(!state.preferences.get(80).await.unwrap().unwrap().auto_notify);
}
