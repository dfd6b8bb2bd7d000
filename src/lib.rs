pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sqlx::SqlitePool;

use crate::models::conversation::PendingInput;
use crate::services::{
    dispatch_service::DispatchService, filter::MarkerPhrases, ledger_service::LedgerService,
    posting_service::PostingService, preference_service::PreferenceService,
    scrape_service::{Fetcher, HttpFetcher, ScrapeService},
    telegram_service::{Notifier, TelegramService},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub postings: PostingService,
    pub preferences: PreferenceService,
    pub ledger: LedgerService,
    pub scraper: ScrapeService,
    pub dispatch: DispatchService,
    pub notifier: Arc<dyn Notifier>,
    pub markers: MarkerPhrases,
    pending: Arc<Mutex<HashMap<i64, PendingInput>>>,
}

impl AppState {
    /// Production wiring: real Telegram transport and real HTTP fetcher,
    /// both configured from the environment.
    pub fn new(pool: SqlitePool) -> Self {
        let config = crate::config::get_config();
        let notifier = Arc::new(TelegramService::new(config.telegram_bot_token.clone()));
        let fetcher = Arc::new(HttpFetcher::new());
        Self::with_transport(pool, notifier, fetcher)
    }

    /// Tests swap in recording/mock implementations here.
    pub fn with_transport(
        pool: SqlitePool,
        notifier: Arc<dyn Notifier>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let postings = PostingService::new(pool.clone());
        let preferences = PreferenceService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());
        let scraper = ScrapeService::new(postings.clone(), fetcher);
        let markers = MarkerPhrases::default();
        let dispatch = DispatchService::new(
            postings.clone(),
            preferences.clone(),
            ledger.clone(),
            scraper.clone(),
            markers.clone(),
        );

        Self {
            pool,
            postings,
            preferences,
            ledger,
            scraper,
            dispatch,
            notifier,
            markers,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn set_pending(&self, chat_id: i64, input: PendingInput) {
        self.pending
            .lock()
            .expect("pending map mutex poisoned")
            .insert(chat_id, input);
    }

    /// Consumes the armed state, returning the chat to idle.
    pub fn take_pending(&self, chat_id: i64) -> Option<PendingInput> {
        self.pending
            .lock()
            .expect("pending map mutex poisoned")
            .remove(&chat_id)
    }
}
