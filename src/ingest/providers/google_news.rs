// src/ingest/providers/google_news.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::ingest::types::{FeedTransport, Query};

pub const GOOGLE_NEWS_SEARCH_URL: &str = "https://news.google.com/rss/search";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = "Mozilla/5.0";

/// `<endpoint>?q=..&hl=..&gl=..&ceid=..` for one query.
pub fn build_search_url(endpoint: &Url, q: &Query) -> Url {
    let (lang, region) = q.locale_variant.lang_region();
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("q", &q.search_text)
        .append_pair("hl", lang)
        .append_pair("gl", region)
        .append_pair("ceid", &q.locale_variant.ceid());
    url
}

/// reqwest-backed transport with a fixed per-request timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building feed http client")?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .context("feed http get()")?
            .error_for_status()
            .context("feed non-2xx")?;
        resp.text().await.context("feed http .text()")
    }

    fn name(&self) -> &'static str {
        "GoogleNews"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        Url::parse(GOOGLE_NEWS_SEARCH_URL).unwrap()
    }

    #[test]
    fn primary_url_uses_japanese_edition() {
        let url = build_search_url(&endpoint(), &Query::primary("楽天市場 ランキング", 1));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "楽天市場 ランキング".to_string()),
                ("hl".to_string(), "ja".to_string()),
                ("gl".to_string(), "JP".to_string()),
                ("ceid".to_string(), "JP:ja".to_string()),
            ]
        );
        assert!(url.as_str().starts_with(GOOGLE_NEWS_SEARCH_URL));
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn alternate_url_uses_us_edition() {
        let url = build_search_url(&endpoint(), &Query::alternate("TikTok", 5));
        assert!(url.as_str().ends_with("q=TikTok&hl=en&gl=US&ceid=US%3Aen"));
    }

    #[test]
    fn reserved_chars_are_escaped() {
        let url = build_search_url(&endpoint(), &Query::primary("Yahoo!ショッピング & 家電", 1));
        assert!(!url.as_str().contains(" & "));
        let q = url.query_pairs().find(|(k, _)| k == "q").unwrap().1;
        assert_eq!(q, "Yahoo!ショッピング & 家電");
    }
}
