pub mod dispatch_service;
pub mod filter;
pub mod ledger_service;
pub mod posting_service;
pub mod preference_service;
pub mod scrape_service;
pub mod source_service;
pub mod telegram_service;
