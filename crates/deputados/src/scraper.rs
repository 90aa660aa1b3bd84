use crate::parser::{ParseError, parse_profile};
use crate::sources::ProfileSource;
use crate::types::LegislatorRecord;
use crate::utils::CrawlOptions;

use futures::{StreamExt, stream};
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

#[derive(Debug)]
pub struct CrawlFailure {
    pub source: ProfileSource,
    pub error: ScraperError,
}

/// Outcome of a crawl, records in source order.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub records: Vec<LegislatorRecord>,
    pub failures: Vec<CrawlFailure>,
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch_profile(
        &self,
        source: &ProfileSource,
    ) -> Result<LegislatorRecord, ScraperError> {
        log::info!("Fetching profile: {}", source.url);
        let html = self.get_html(&source.url).await?;
        let record = parse_profile(&html, source.gender)
            .inspect_err(|e| log::error!("Failed to parse {}: {}", source.url, e))?;
        Ok(record)
    }

    /// Fetches every source with at most `options.concurrency` requests in
    /// flight. Failures are collected, never fatal.
    pub async fn fetch_all(
        &self,
        sources: Vec<ProfileSource>,
        options: &CrawlOptions,
    ) -> CrawlReport {
        log::info!(
            "Crawling {} profile(s), {} at a time...",
            sources.len(),
            options.concurrency
        );

        let results: Vec<_> = stream::iter(sources)
            .map(|source| async move {
                let result = self.fetch_profile(&source).await;
                (source, result)
            })
            .buffered(options.concurrency)
            .collect()
            .await;

        let mut report = CrawlReport::default();
        for (source, result) in results {
            match result {
                Ok(record) => report.records.push(record),
                Err(error) => {
                    log::warn!("Failed to fetch {}: {}", source.url, error);
                    report.failures.push(CrawlFailure { source, error });
                }
            }
        }
        report
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}
