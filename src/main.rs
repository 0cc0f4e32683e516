//! Daily digest — binary entrypoint.
//! One run: read config, fetch every section, post the Feishu card.

use std::sync::Arc;

use jp_commerce_digest::normalize::rules::load_rules_default;
use jp_commerce_digest::{collect_bundle, DigestConfig, FeishuNotifier, Notifier};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// RUST_LOG controls the filter (default `info`); LOG_FORMAT=json switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local runs; no-op in CI where secrets come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = DigestConfig::from_env();
    let Some(webhook) = cfg.webhook.clone() else {
        error!(
            target: "digest",
            "FEISHU_WEBHOOK is not set; nothing to deliver to, skipping run"
        );
        return Ok(());
    };

    let rules = Arc::new(load_rules_default()?);
    info!(target: "digest", rules_version = rules.version, keywords = rules.keywords.len(), "rule set loaded");

    let placeholder = rules.placeholder.clone();
    let bundle = collect_bundle(&cfg, rules).await?;

    let notifier = FeishuNotifier::new(webhook).with_placeholder(placeholder);
    match notifier.send(&bundle).await {
        Ok(()) => info!(target: "digest", items = bundle.total_items(), "digest sent"),
        Err(e) => error!(target: "digest", notifier = notifier.name(), error = ?e, "digest delivery failed"),
    }
    Ok(())
}
