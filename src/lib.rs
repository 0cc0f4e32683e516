// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod ingest;
pub mod normalize;
pub mod notify;
pub mod planner;

pub use crate::config::DigestConfig;
pub use crate::ingest::{FeedClient, FetchOutcome, NewsItem, Query};
pub use crate::normalize::{normalize_title, Normalizer, RuleSet};
pub use crate::notify::{FeishuNotifier, Notifier};
pub use crate::planner::{default_plan, run_plan, Bundle, Section};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Fetch every default section over HTTP and return the bundle.
/// Individual feed failures only empty their own section; `Err` means the
/// client itself could not be built.
pub async fn collect_bundle(cfg: &DigestConfig, rules: Arc<RuleSet>) -> Result<Bundle> {
    let client = FeedClient::http(Normalizer::new(rules), cfg.feed_timeout, cfg.retry)?
        .with_endpoint(&cfg.feed_endpoint)
        .context("configuring feed client")?;
    let plan = default_plan(&cfg.limits);
    let bundle = run_plan(Arc::new(client), &plan).await;
    info!(
        target: "digest",
        sections = bundle.sections.len(),
        items = bundle.total_items(),
        "bundle collected"
    );
    Ok(bundle)
}
