// src/notify/mod.rs
pub mod feishu;

use anyhow::Result;

use crate::planner::Bundle;

pub use feishu::FeishuNotifier;

/// Delivers one run's bundle somewhere.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, bundle: &Bundle) -> Result<()>;
    fn name(&self) -> &'static str;
}
