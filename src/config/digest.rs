// src/config/digest.rs
use std::str::FromStr;
use std::time::Duration;

use crate::ingest::providers::google_news::{DEFAULT_TIMEOUT_SECS, GOOGLE_NEWS_SEARCH_URL};
use crate::ingest::RetryPolicy;
use crate::planner::{PlanLimits, DEFAULT_JAPAN_NEWS_LIMIT, DEFAULT_TIKTOK_LIMIT};

pub const ENV_WEBHOOK: &str = "FEISHU_WEBHOOK";
pub const ENV_TIKTOK_LIMIT: &str = "TIKTOK_LIMIT";
pub const ENV_JAPAN_NEWS_LIMIT: &str = "JAPAN_NEWS_LIMIT";
pub const ENV_FEED_ENDPOINT: &str = "FEED_ENDPOINT";
pub const ENV_FEED_TIMEOUT_SECS: &str = "FEED_TIMEOUT_SECS";
pub const ENV_FEED_MAX_RETRIES: &str = "FEED_MAX_RETRIES";
pub const ENV_FEED_BACKOFF_SECS: &str = "FEED_BACKOFF_SECS";

/// Process configuration for one digest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    /// Feishu bot webhook. The run does nothing without it.
    pub webhook: Option<String>,
    pub limits: PlanLimits,
    pub feed_endpoint: String,
    pub feed_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            webhook: None,
            limits: PlanLimits::default(),
            feed_endpoint: GOOGLE_NEWS_SEARCH_URL.to_string(),
            feed_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

// parse a numeric env value; garbage falls back to the default with a warning
fn parse_num<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(target: "digest", var = name, value = %raw, "ignoring unparseable value");
                default
            }
        },
    }
}

impl DigestConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup (env, map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();

        let webhook = lookup(ENV_WEBHOOK)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let limits = PlanLimits {
            tiktok_limit: parse_num(&lookup, ENV_TIKTOK_LIMIT, DEFAULT_TIKTOK_LIMIT).max(1),
            japan_news_limit: parse_num(&lookup, ENV_JAPAN_NEWS_LIMIT, DEFAULT_JAPAN_NEWS_LIMIT)
                .max(1),
        };

        let feed_endpoint = lookup(ENV_FEED_ENDPOINT)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(d.feed_endpoint);

        let timeout_secs = parse_num(&lookup, ENV_FEED_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS).max(1);
        let max_attempts = parse_num(&lookup, ENV_FEED_MAX_RETRIES, d.retry.max_attempts);
        let backoff_secs = parse_num(&lookup, ENV_FEED_BACKOFF_SECS, d.retry.base_delay.as_secs());

        Self {
            webhook,
            limits,
            feed_endpoint,
            feed_timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy::new(max_attempts, Duration::from_secs(backoff_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;

    fn cfg(pairs: &[(&str, &str)]) -> DigestConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DigestConfig::from_lookup(move |k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = cfg(&[]);
        assert_eq!(c, DigestConfig::default());
        assert_eq!(c.retry.max_attempts, 3);
        assert_eq!(c.retry.base_delay, Duration::from_secs(2));
    }

    #[test]
    fn blank_webhook_counts_as_missing() {
        assert_eq!(cfg(&[(ENV_WEBHOOK, "   ")]).webhook, None);
        assert_eq!(
            cfg(&[(ENV_WEBHOOK, " https://open.feishu.cn/hook/x ")]).webhook.as_deref(),
            Some("https://open.feishu.cn/hook/x")
        );
    }

    #[test]
    fn numbers_parse_clamp_and_fall_back() {
        let c = cfg(&[
            (ENV_TIKTOK_LIMIT, "0"),
            (ENV_JAPAN_NEWS_LIMIT, "abc"),
            (ENV_FEED_MAX_RETRIES, "5"),
            (ENV_FEED_BACKOFF_SECS, "1"),
            (ENV_FEED_TIMEOUT_SECS, " 7 "),
        ]);
        assert_eq!(c.limits.tiktok_limit, 1);
        assert_eq!(c.limits.japan_news_limit, DEFAULT_JAPAN_NEWS_LIMIT);
        assert_eq!(c.retry.max_attempts, 5);
        assert_eq!(c.retry.base_delay, Duration::from_secs(1));
        assert_eq!(c.feed_timeout, Duration::from_secs(7));
    }

    #[serial_test::serial]
    #[test]
    fn from_env_reads_process_env() {
        env::set_var(ENV_WEBHOOK, "https://hook");
        env::set_var(ENV_JAPAN_NEWS_LIMIT, "4");
        let c = DigestConfig::from_env();
        env::remove_var(ENV_WEBHOOK);
        env::remove_var(ENV_JAPAN_NEWS_LIMIT);
        assert_eq!(c.webhook.as_deref(), Some("https://hook"));
        assert_eq!(c.limits.japan_news_limit, 4);
    }
}
