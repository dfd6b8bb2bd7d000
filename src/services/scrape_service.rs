use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::models::posting::{NewPosting, UNTITLED};
use crate::models::source::SourceDefinition;
use crate::services::posting_service::PostingService;

/// Fetches one page of HTML. Split out behind a trait so scraping logic can
/// be exercised without the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap();
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Internal(format!(
                "HTTP {} fetching {}",
                status, url
            )));
        }
        Ok(response.text().await?)
    }
}

#[derive(Clone)]
pub struct ScrapeService {
    postings: PostingService,
    fetcher: Arc<dyn Fetcher>,
}

impl ScrapeService {
    pub fn new(postings: PostingService, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { postings, fetcher }
    }

    /// Ingestion pass over every configured source, in configured order.
    /// Sources fail independently; the return value is the total number of
    /// newly inserted postings.
    pub async fn run_once(&self, sources: &[SourceDefinition]) -> u64 {
        let mut total_new = 0;
        for source in sources {
            total_new += self.scrape_source(source).await;
        }
        total_new
    }

    /// Scrapes one source and inserts what it finds, returning the count of
    /// postings that were actually new. Every failure mode (network, bad
    /// selector, unparsable page) is logged and yields zero; nothing
    /// propagates to the caller.
    pub async fn scrape_source(&self, source: &SourceDefinition) -> u64 {
        let html = match self.fetcher.fetch(&source.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(source = %source.name, url = %source.url, error = %e, "fetch failed");
                return 0;
            }
        };

        let extracted = match extract_postings(source, &html) {
            Ok(postings) => postings,
            Err(e) => {
                warn!(source = %source.name, error = %e, "extraction failed");
                return 0;
            }
        };

        let mut new_count = 0;
        for posting in &extracted {
            match self.postings.insert(posting).await {
                Ok(outcome) if outcome.inserted => new_count += 1,
                Ok(_) => {}
                Err(e) => {
                    warn!(source = %source.name, link = %posting.link, error = %e, "insert failed");
                }
            }
        }

        info!(
            source = %source.name,
            extracted = extracted.len(),
            new = new_count,
            "source scraped"
        );
        new_count
    }
}

/// Applies the source's selector rules to a fetched page. Extraction is
/// best-effort per field: a missing field becomes an empty string, a missing
/// title falls back to the item text and then to a placeholder. Items whose
/// resolved link is empty are dropped since they carry no dedup identity.
pub fn extract_postings(source: &SourceDefinition, html: &str) -> Result<Vec<NewPosting>> {
    let document = Html::parse_document(html);
    let item_selector = parse_selector(&source.item_selector)?.ok_or_else(|| {
        Error::BadRequest(format!("source '{}' has no item selector", source.name))
    })?;
    let title_selector = parse_selector(&source.title_selector)?;
    let city_selector = parse_selector(&source.city_selector)?;
    let description_selector = parse_selector(&source.description_selector)?;
    let salary_selector = parse_selector(&source.salary_selector)?;
    let link_selector = parse_selector(&source.link_selector)?;

    let base_url = Url::parse(&source.url)
        .map_err(|e| Error::BadRequest(format!("source '{}' url: {}", source.name, e)))?;

    let mut postings = Vec::new();
    for item in document.select(&item_selector) {
        let item_text = element_text(item);

        let title = select_text(item, title_selector.as_ref())
            .filter(|t| !t.is_empty())
            .or_else(|| Some(item_text.clone()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| UNTITLED.to_string());
        let city = select_text(item, city_selector.as_ref()).unwrap_or_default();
        let description =
            select_text(item, description_selector.as_ref()).unwrap_or_else(|| item_text.clone());
        let salary = select_text(item, salary_selector.as_ref()).unwrap_or_default();

        let link = link_selector
            .as_ref()
            .and_then(|sel| item.select(sel).next())
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base_url.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_default();

        if link.is_empty() {
            continue;
        }

        postings.push(NewPosting {
            title,
            city,
            description,
            salary,
            schedule: String::new(),
            link,
            source: source.name.clone(),
        });
    }

    Ok(postings)
}

/// An empty rule means "this source does not provide the field".
fn parse_selector(rule: &str) -> Result<Option<Selector>> {
    let rule = rule.trim();
    if rule.is_empty() {
        return Ok(None);
    }
    Selector::parse(rule)
        .map(Some)
        .map_err(|e| Error::BadRequest(format!("invalid selector '{}': {}", rule, e)))
}

fn select_text(item: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let selector = selector?;
    item.select(selector).next().map(element_text)
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
