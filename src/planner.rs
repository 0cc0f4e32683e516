// src/planner.rs
//! The fixed set of digest sections and how they are fetched.
//!
//! Sections are independent: each runs in its own tokio task and an empty or
//! failed section never touches another. Inside a fan-out section the
//! sub-queries run in declaration order, are concatenated, then capped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::ingest::{FeedClient, FeedTransport, NewsItem, Query, Sleeper};

pub const DEFAULT_TIKTOK_LIMIT: usize = 5;
pub const DEFAULT_JAPAN_NEWS_LIMIT: usize = 10;

const RAKUTEN_CATEGORIES: [&str; 5] = ["総合", "美容", "グルメ", "ファッション", "家電"];
const YAHOO_TOPICS: [&str; 5] = ["ランキング", "売れ筋", "人気", "注目", "家電"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub tiktok_limit: usize,
    pub japan_news_limit: usize,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            tiktok_limit: DEFAULT_TIKTOK_LIMIT,
            japan_news_limit: DEFAULT_JAPAN_NEWS_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    pub key: String,
    pub heading: String,
    pub badge: String,
    pub queries: Vec<Query>,
    /// Max items kept after concatenating all sub-query results.
    pub cap: usize,
    /// Untranslated sections show the original headline only.
    pub translated: bool,
}

impl SectionPlan {
    pub fn single(key: &str, heading: &str, badge: &str, query: Query, translated: bool) -> Self {
        Self {
            key: key.to_string(),
            heading: heading.to_string(),
            badge: badge.to_string(),
            cap: query.result_limit,
            queries: vec![query],
            translated,
        }
    }

    /// N single-result queries, concatenated and capped.
    pub fn fan_out(key: &str, heading: &str, badge: &str, queries: Vec<Query>, cap: usize) -> Self {
        Self {
            key: key.to_string(),
            heading: heading.to_string(),
            badge: badge.to_string(),
            queries,
            cap: cap.max(1),
            translated: true,
        }
    }
}

pub fn default_plan(limits: &PlanLimits) -> Vec<SectionPlan> {
    let rakuten: Vec<Query> = RAKUTEN_CATEGORIES
        .iter()
        .map(|c| Query::primary(&format!("楽天市場 ランキング {c}"), 1))
        .collect();
    let yahoo: Vec<Query> = YAHOO_TOPICS
        .iter()
        .map(|t| Query::primary(&format!("Yahoo!ショッピング {t}"), 1))
        .collect();
    let rakuten_cap = rakuten.len();
    let yahoo_cap = yahoo.len();

    vec![
        SectionPlan::single(
            "tiktok_sales",
            "日本 TikTok 昨日销量榜单",
            "🔥",
            Query::primary("TikTok 売れ筋 商品", limits.tiktok_limit),
            true,
        ),
        SectionPlan::single(
            "tiktok_hashtag",
            "TikTok 热门标签词",
            "🎵",
            Query::alternate("TikTok ハッシュタグ トレンド", limits.tiktok_limit),
            false,
        ),
        SectionPlan::fan_out("rakuten_ranking", "乐天精选榜单", "🔴", rakuten, rakuten_cap),
        SectionPlan::fan_out("yahoo_ranking", "雅虎购物精选榜单", "🟢", yahoo, yahoo_cap),
        SectionPlan::single(
            "japan_news",
            "日本实时新闻",
            "📰",
            Query::primary("日本 国内 最新 ニュース", limits.japan_news_limit),
            true,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    pub heading: String,
    pub badge: String,
    pub translated: bool,
    pub items: Vec<NewsItem>,
}

/// Every section of one run, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub sections: Vec<Section>,
}

impl Bundle {
    pub fn get(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn total_items(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// Run one section's queries in order, concatenate, cap.
pub async fn run_section<T, S>(client: &FeedClient<T, S>, plan: &SectionPlan) -> Vec<NewsItem>
where
    T: FeedTransport,
    S: Sleeper,
{
    let mut items = Vec::new();
    for q in &plan.queries {
        if items.len() >= plan.cap {
            break;
        }
        items.extend(client.fetch_items(q).await);
    }
    items.truncate(plan.cap);

    if !plan.translated {
        for it in &mut items {
            it.normalized_title = None;
        }
    }

    tracing::info!(
        target: "planner",
        section = %plan.key,
        queries = plan.queries.len(),
        items = items.len(),
        "section done"
    );
    items
}

/// Run every section concurrently and assemble the bundle in plan order.
pub async fn run_plan<T, S>(client: Arc<FeedClient<T, S>>, plan: &[SectionPlan]) -> Bundle
where
    T: FeedTransport + 'static,
    S: Sleeper + 'static,
{
    let mut set = JoinSet::new();
    for (idx, sp) in plan.iter().cloned().enumerate() {
        let client = Arc::clone(&client);
        set.spawn(async move {
            let items = run_section(&client, &sp).await;
            (idx, items)
        });
    }

    let mut results: Vec<Vec<NewsItem>> = vec![Vec::new(); plan.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, items)) => results[idx] = items,
            Err(e) => tracing::warn!(target: "planner", error = ?e, "section task failed"),
        }
    }

    let sections = plan
        .iter()
        .zip(results)
        .map(|(sp, items)| Section {
            key: sp.key.clone(),
            heading: sp.heading.clone(),
            badge: sp.badge.clone(),
            translated: sp.translated,
            items,
        })
        .collect();
    Bundle { sections }
}
