use tracing::{info, warn};

use crate::error::Result;
use crate::models::preferences::UserPrefs;
use crate::models::source::SourceDefinition;
use crate::services::filter::MarkerPhrases;
use crate::services::ledger_service::LedgerService;
use crate::services::posting_service::PostingService;
use crate::services::preference_service::PreferenceService;
use crate::services::scrape_service::ScrapeService;
use crate::services::telegram_service::Notifier;

/// Result caps per the three match paths.
pub const AUTO_NOTIFY_LIMIT: usize = 50;
pub const MENU_SEARCH_LIMIT: usize = 10;
pub const AD_HOC_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct PassSummary {
    pub new_postings: u64,
    pub delivered: u64,
}

/// Executes one scheduler pass: ingest every source, then fan matching
/// undelivered postings out to every auto-notify user. Failure isolation is
/// strict at every level: a bad source, a failed send, or one user's
/// database error never stops the rest of the pass.
#[derive(Clone)]
pub struct DispatchService {
    postings: PostingService,
    preferences: PreferenceService,
    ledger: LedgerService,
    scraper: ScrapeService,
    markers: MarkerPhrases,
}

impl DispatchService {
    pub fn new(
        postings: PostingService,
        preferences: PreferenceService,
        ledger: LedgerService,
        scraper: ScrapeService,
        markers: MarkerPhrases,
    ) -> Self {
        Self {
            postings,
            preferences,
            ledger,
            scraper,
            markers,
        }
    }

    pub async fn run_pass(
        &self,
        sources: &[SourceDefinition],
        notifier: &dyn Notifier,
    ) -> Result<PassSummary> {
        let new_postings = self.scraper.run_once(sources).await;

        let users = self.preferences.list_auto_notify().await?;
        let mut delivered = 0;

        for prefs in &users {
            match self.notify_user(prefs, notifier).await {
                Ok(count) => delivered += count,
                Err(e) => {
                    warn!(chat_id = prefs.chat_id, error = %e, "notify pass failed for user");
                }
            }
        }

        info!(new_postings, delivered, users = users.len(), "pass complete");
        Ok(PassSummary {
            new_postings,
            delivered,
        })
    }

    /// Sends this user's unseen matches, newest first. A posting is marked
    /// in the ledger only after the transport confirms the send, so a
    /// failed delivery is retried on the next pass; an already-marked pair
    /// is skipped without touching the transport.
    async fn notify_user(&self, prefs: &UserPrefs, notifier: &dyn Notifier) -> Result<u64> {
        let matches = self
            .postings
            .find_matching(prefs, &self.markers, AUTO_NOTIFY_LIMIT)
            .await?;

        let mut delivered = 0;
        for posting in matches {
            if self.ledger.has_sent(prefs.chat_id, posting.id).await? {
                continue;
            }
            match notifier.send_text(prefs.chat_id, &posting.to_message()).await {
                Ok(()) => {
                    self.ledger.mark_sent(prefs.chat_id, posting.id).await?;
                    delivered += 1;
                }
                Err(e) => {
                    warn!(
                        chat_id = prefs.chat_id,
                        posting_id = posting.id,
                        error = %e,
                        "delivery failed, will retry next pass"
                    );
                }
            }
        }
        Ok(delivered)
    }
}
