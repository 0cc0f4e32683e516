// src/ingest/feed.rs
use anyhow::{Context, Result};
use metrics::{counter, histogram};
use reqwest::Url;
use std::time::{Duration, Instant};

use crate::ingest::ensure_metrics_described;
use crate::ingest::providers::google_news::{build_search_url, HttpTransport, GOOGLE_NEWS_SEARCH_URL};
use crate::ingest::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::ingest::rss::{parse_feed, FeedEntry};
use crate::ingest::types::{FeedTransport, NewsItem, Query};
use crate::normalize::Normalizer;

/// Result of one query: items, or the reason every attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(Vec<NewsItem>),
    Exhausted { attempts: u32, last_error: String },
}

impl FetchOutcome {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, FetchOutcome::Exhausted { .. })
    }

    /// Exhausted retries degrade to an empty list.
    pub fn into_items(self) -> Vec<NewsItem> {
        match self {
            FetchOutcome::Fetched(items) => items,
            FetchOutcome::Exhausted { .. } => Vec::new(),
        }
    }
}

/// Runs one search query against the feed endpoint with bounded retry, and
/// normalizes every headline it returns. Holds no state between calls.
pub struct FeedClient<T = HttpTransport, S = TokioSleeper> {
    transport: T,
    sleeper: S,
    retry: RetryPolicy,
    endpoint: Url,
    normalizer: Normalizer,
}

impl FeedClient<HttpTransport, TokioSleeper> {
    /// Production client: reqwest transport, tokio sleeps.
    pub fn http(normalizer: Normalizer, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let transport = HttpTransport::new(timeout)?;
        Ok(Self::with_parts(transport, TokioSleeper, retry, normalizer))
    }
}

impl<T: FeedTransport, S: Sleeper> FeedClient<T, S> {
    pub fn with_parts(transport: T, sleeper: S, retry: RetryPolicy, normalizer: Normalizer) -> Self {
        let endpoint = Url::parse(GOOGLE_NEWS_SEARCH_URL).expect("constant feed endpoint");
        Self {
            transport,
            sleeper,
            retry,
            endpoint,
            normalizer,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid feed endpoint {endpoint}"))?;
        Ok(self)
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn search_url(&self, q: &Query) -> Url {
        build_search_url(&self.endpoint, q)
    }

    /// Fetch + parse with retry. Never panics, never returns `Err`.
    pub async fn fetch(&self, q: &Query) -> FetchOutcome {
        ensure_metrics_described();

        let url = self.search_url(q);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            counter!("feed_fetch_attempts_total").increment(1);
            let t0 = Instant::now();
            let res = match self.transport.get(&url).await {
                Ok(body) => parse_feed(&body),
                Err(e) => Err(e),
            };
            histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

            match res {
                Ok(entries) => {
                    let items = self.to_items(entries, q.result_limit);
                    counter!("feed_items_total").increment(items.len() as u64);
                    tracing::info!(
                        target: "feed",
                        query = %q.search_text,
                        attempt = attempt + 1,
                        items = items.len(),
                        "feed fetched"
                    );
                    return FetchOutcome::Fetched(items);
                }
                Err(e) => {
                    counter!("feed_fetch_failures_total").increment(1);
                    last_error = format!("{e:#}");
                    tracing::warn!(
                        target: "feed",
                        query = %q.search_text,
                        provider = self.transport.name(),
                        attempt = attempt + 1,
                        error = %last_error,
                        "feed fetch failed"
                    );
                    if attempt + 1 < max_attempts {
                        self.sleeper.sleep(self.retry.delay_for(attempt)).await;
                    }
                }
            }
        }

        counter!("feed_fetch_exhausted_total").increment(1);
        tracing::error!(
            target: "feed",
            query = %q.search_text,
            attempts = max_attempts,
            error = %last_error,
            "feed retries exhausted"
        );
        FetchOutcome::Exhausted {
            attempts: max_attempts,
            last_error,
        }
    }

    /// `fetch`, with exhaustion collapsed to an empty list.
    pub async fn fetch_items(&self, q: &Query) -> Vec<NewsItem> {
        self.fetch(q).await.into_items()
    }

    fn to_items(&self, entries: Vec<FeedEntry>, limit: usize) -> Vec<NewsItem> {
        entries
            .into_iter()
            .filter_map(|e| match e.link {
                Some(link) => Some((e.title, link)),
                None => {
                    tracing::debug!(target: "feed", title = %e.title, "entry without link skipped");
                    None
                }
            })
            .take(limit.max(1))
            .map(|(title, link)| NewsItem {
                normalized_title: Some(self.normalizer.normalize(&title)),
                original_title: title,
                link,
            })
            .collect()
    }
}
