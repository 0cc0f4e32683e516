// src/ingest/types.rs
use anyhow::Result;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// One feed entry after normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub original_title: String,         // headline as published
    pub normalized_title: Option<String>, // None for untranslated sections
    pub link: String,                   // never empty
}

impl NewsItem {
    /// Title to show: summary, else original headline, else the rule set placeholder.
    pub fn display_title<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self.normalized_title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ if !self.original_title.is_empty() => &self.original_title,
            _ => placeholder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LocaleVariant {
    /// Japanese edition (hl=ja, gl=JP).
    #[default]
    Primary,
    /// US English edition (hl=en, gl=US).
    Alternate,
}

impl LocaleVariant {
    /// (language, region)
    pub fn lang_region(self) -> (&'static str, &'static str) {
        match self {
            LocaleVariant::Primary => ("ja", "JP"),
            LocaleVariant::Alternate => ("en", "US"),
        }
    }

    /// Combined edition id, e.g. `JP:ja`.
    pub fn ceid(self) -> String {
        let (lang, region) = self.lang_region();
        format!("{region}:{lang}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub search_text: String,
    pub result_limit: usize,
    pub locale_variant: LocaleVariant,
}

impl Query {
    /// `result_limit` is clamped to at least 1.
    pub fn new(search_text: &str, result_limit: usize, locale_variant: LocaleVariant) -> Self {
        Self {
            search_text: search_text.to_string(),
            result_limit: result_limit.max(1),
            locale_variant,
        }
    }

    pub fn primary(search_text: &str, result_limit: usize) -> Self {
        Self::new(search_text, result_limit, LocaleVariant::Primary)
    }

    pub fn alternate(search_text: &str, result_limit: usize) -> Self {
        Self::new(search_text, result_limit, LocaleVariant::Alternate)
    }
}

/// Raw HTTP access to the feed endpoint. Swapped for fakes in tests.
#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    /// Body of a successful (2xx) response.
    async fn get(&self, url: &Url) -> Result<String>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(orig: &str, norm: Option<&str>) -> NewsItem {
        NewsItem {
            original_title: orig.into(),
            normalized_title: norm.map(str::to_string),
            link: "https://x/1".into(),
        }
    }

    #[test]
    fn display_title_prefers_summary_then_headline() {
        assert_eq!(item("元", Some("摘要。")).display_title("内容缺失"), "摘要。");
        assert_eq!(item("元", Some("")).display_title("内容缺失"), "元");
        assert_eq!(item("元", None).display_title("内容缺失"), "元");
    }

    #[test]
    fn untitled_item_shows_placeholder_not_link() {
        assert_eq!(item("", None).display_title("内容缺失"), "内容缺失");
    }
}
