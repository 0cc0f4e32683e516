// src/notify/feishu.rs
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::Notifier;
use crate::normalize::rules::DEFAULT_PLACEHOLDER;
use crate::planner::{Bundle, Section};

pub const EMPTY_SECTION_TEXT: &str = "暂无数据";

#[derive(Clone)]
pub struct FeishuNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
    backoff: Duration,
    placeholder: String,
}

impl FeishuNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff: Duration::from_millis(500),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    /// First retry delay; doubled after every further failure.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Line text for items that have neither a summary nor a headline.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    fn delay_for(&self, attempt: u8) -> Duration {
        let factor = 2u32.saturating_pow(u32::from(attempt.saturating_sub(1)));
        self.backoff.saturating_mul(factor)
    }

    pub async fn send_card(&self, card: &Value) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(card)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => match rsp.error_for_status() {
                    Ok(rsp) => match rsp.text().await {
                        Ok(body) => match check_feishu_body(&body) {
                            Ok(()) => {
                                tracing::info!(target: "notify", attempt, "feishu card delivered");
                                return Ok(());
                            }
                            Err(e) => e,
                        },
                        Err(e) => anyhow!(e).context("feishu response body"),
                    },
                    Err(e) => anyhow!("Feishu webhook HTTP error: {e}"),
                },
                Err(e) => anyhow!("Feishu webhook request failed: {e}"),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            tracing::warn!(target: "notify", attempt, error = %err, "feishu send failed, retrying");
            tokio::time::sleep(self.delay_for(attempt)).await;
        }
    }
}

/// Feishu answers 200 with a non-zero `code` when it rejects a card.
fn check_feishu_body(body: &str) -> Result<()> {
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return Ok(());
    };
    let code = v
        .get("code")
        .or_else(|| v.get("StatusCode"))
        .and_then(Value::as_i64)
        .unwrap_or(0);
    if code != 0 {
        let msg = v
            .get("msg")
            .or_else(|| v.get("StatusMessage"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(anyhow!("Feishu rejected card: code={code} msg={msg}"));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Notifier for FeishuNotifier {
    async fn send(&self, bundle: &Bundle) -> Result<()> {
        let today = chrono::Local::now().date_naive();
        let card = render_card(bundle, today, &self.placeholder);
        self.send_card(&card).await
    }

    fn name(&self) -> &'static str {
        "Feishu"
    }
}

/// Numbered markdown list for one section.
pub fn section_list_text(section: &Section, placeholder: &str) -> String {
    if section.items.is_empty() {
        return EMPTY_SECTION_TEXT.to_string();
    }
    let mut txt = String::new();
    for (i, item) in section.items.iter().enumerate() {
        let line = if section.translated {
            format!("{}. **{}** [查看原文]({})\n", i + 1, item.display_title(placeholder), item.link)
        } else {
            let title = if item.original_title.is_empty() {
                placeholder
            } else {
                item.original_title.as_str()
            };
            format!("{}. [{}]({})\n", i + 1, title, item.link)
        };
        txt.push_str(&line);
    }
    txt
}

fn lark_div(content: String) -> Value {
    json!({ "tag": "div", "text": { "tag": "lark_md", "content": content } })
}

/// Interactive card: dated header, then heading + list per section, `hr` between.
pub fn render_card(bundle: &Bundle, date: NaiveDate, placeholder: &str) -> Value {
    let mut elements = Vec::with_capacity(bundle.sections.len() * 3);
    for (i, section) in bundle.sections.iter().enumerate() {
        if i > 0 {
            elements.push(json!({ "tag": "hr" }));
        }
        let badge = if section.badge.is_empty() {
            String::new()
        } else {
            format!("{} ", section.badge)
        };
        elements.push(lark_div(format!("{badge}**{}. {}**", i + 1, section.heading)));
        elements.push(lark_div(section_list_text(section, placeholder)));
    }

    json!({
        "msg_type": "interactive",
        "card": {
            "header": {
                "title": {
                    "tag": "plain_text",
                    "content": format!("🇯🇵 日本电商日报 {}", date.format("%Y-%m-%d")),
                },
                "template": "blue",
            },
            "elements": elements,
        }
    })
}
