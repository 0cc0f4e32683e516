// src/ingest/mod.rs
pub mod feed;
pub mod providers;
pub mod retry;
pub mod rss;
pub mod types;

pub use feed::{FeedClient, FetchOutcome};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use types::{FeedTransport, LocaleVariant, NewsItem, Query};

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "feed_fetch_attempts_total",
            "Feed requests issued, retries included."
        );
        describe_counter!(
            "feed_fetch_failures_total",
            "Feed attempts that failed (transport, status or parse)."
        );
        describe_counter!(
            "feed_fetch_exhausted_total",
            "Queries that failed on every attempt."
        );
        describe_counter!("feed_items_total", "News items produced from feeds.");
        describe_histogram!("feed_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}
