use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use jobwatch_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes,
    services::source_service,
    AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Sleep after a failed pass instead of the full scrape interval.
const RECOVERY_SLEEP_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Materializes the placeholder file on first run; an unreadable or
    // invalid sources file is the one non-credential startup failure.
    let sources = source_service::load_or_init(&config.sources_file)?;
    info!("Loaded {} source definition(s)", sources.len());

    let app_state = AppState::new(pool);

    {
        let bot_token = config.telegram_bot_token.clone();
        let target_webhook_url = format!("{}/api/webhook/telegram", config.webapp_url);

        info!("Checking Telegram webhook status...");

        match reqwest::get(format!(
            "https://api.telegram.org/bot{}/getWebhookInfo",
            bot_token
        ))
        .await
        {
            Ok(resp) => {
                if let Ok(info) = resp.json::<serde_json::Value>().await {
                    let current_url = info["result"]["url"].as_str().unwrap_or("");

                    if current_url == target_webhook_url {
                        info!("Telegram webhook is already up to date: {}", current_url);
                    } else {
                        info!(
                            "Updating Telegram webhook: {} -> {}",
                            current_url, target_webhook_url
                        );
                        let set_url = format!(
                            "https://api.telegram.org/bot{}/setWebhook?url={}",
                            bot_token, target_webhook_url
                        );
                        if let Ok(set_resp) = reqwest::get(&set_url).await {
                            if set_resp.status().is_success() {
                                info!("Telegram webhook registered successfully");
                            } else {
                                tracing::warn!(
                                    "Failed to register Telegram webhook: {:?}",
                                    set_resp.status()
                                );
                            }
                        }
                    }
                }
            }
            Err(e) => tracing::warn!("Could not check Telegram webhook status: {:?}", e),
        }
    }

    {
        let state = app_state.clone();
        let sources_file = config.sources_file.clone();
        let interval = Duration::from_secs(config.scrape_interval_secs);
        tokio::spawn(async move {
            // The scheduler alternates strictly between one pass and one
            // sleep; it is never allowed to exit.
            loop {
                let pass = async {
                    let sources = source_service::load_or_init(&sources_file)?;
                    state
                        .dispatch
                        .run_pass(&sources, state.notifier.as_ref())
                        .await
                };
                match pass.await {
                    Ok(summary) => {
                        info!(
                            new_postings = summary.new_postings,
                            delivered = summary.delivered,
                            "Scheduled pass finished"
                        );
                        tokio::time::sleep(interval).await;
                    }
                    Err(e) => {
                        error!(error = ?e, "Scheduled pass failed");
                        tokio::time::sleep(Duration::from_secs(RECOVERY_SLEEP_SECS)).await;
                    }
                }
            }
        });
    }

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/webhook/telegram",
            post(routes::telegram::handle_webhook).layer(axum::middleware::from_fn_with_state(
                jobwatch_backend::middleware::rate_limit::RateLimiter::per_second(
                    config.webhook_rps,
                ),
                jobwatch_backend::middleware::rate_limit::rps_middleware,
            )),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
