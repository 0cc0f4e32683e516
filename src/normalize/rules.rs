// src/normalize/rules.rs
//! Rule tables driving headline normalization.
//!
//! A `RuleSet` is built once at startup (built-in defaults, or a TOML file that
//! overrides any subset of the tables) and then shared read-only. Keyword rules
//! are kept in declaration order; matching picks the longest key first and
//! falls back to declaration order on ties.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const RULESET_VERSION: u32 = 1;

pub const ENV_RULES_PATH: &str = "DIGEST_RULES_PATH";
pub const DEFAULT_RULES_PATH: &str = "config/rules.toml";

/// Summary emitted when a headline has nothing left to say.
pub const DEFAULT_PLACEHOLDER: &str = "内容缺失";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub from: String,
    pub to: String,
}

impl KeywordRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Sentence templates. Placeholders: `{subject}` `{time}` `{field}` `{trend}` `{event}` `{obj}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    pub publish: String,
    pub trend: String,
    pub sales: String,
    pub event: String,
    pub fallback: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            publish: "{subject}{time}发布{obj}。".into(),
            trend: "{subject}{time}{field}{trend}。".into(),
            sales: "{subject}{time}{field}销量{trend}。".into(),
            event: "{subject}{time}发生{event}，最新情况。".into(),
            fallback: "{subject}{time}相关消息更新。".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub version: u32,
    /// Returned for empty headlines and for headlines that filter down to nothing.
    pub placeholder: String,
    /// Publisher/byline tokens deleted during source-trim.
    pub noise: Vec<String>,
    pub keywords: Vec<KeywordRule>,
    pub subjects: Vec<String>,
    pub fields: Vec<String>,
    /// Fields that select the sales template.
    pub consumer_fields: Vec<String>,
    pub trends: Vec<String>,
    /// Near-synonyms collapsed onto one canonical trend word.
    pub trend_aliases: Vec<KeywordRule>,
    pub default_trend: String,
    pub events: Vec<String>,
    pub publish_events: Vec<String>,
    pub incident_events: Vec<String>,
    pub volume_markers: Vec<String>,
    pub volume_object: String,
    pub templates: Templates,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        let keywords = [
            // industry / field
            ("自動車業界", "汽车行业"),
            ("自動車", "汽车"),
            ("家電", "家电"),
            ("金融", "金融"),
            ("経済", "经济"),
            ("市場", "市场"),
            ("販売台数", "销量"),
            ("販売", "销售"),
            ("売上", "销售额"),
            ("食品", "食品"),
            ("美容", "美容"),
            ("割引", "折扣"),
            ("新商品", "新品"),
            ("商品", "商品"),
            ("発売", "发售"),
            ("限定", "限定"),
            // trend
            ("増加", "增加"),
            ("減少", "减少"),
            ("回復", "回升"),
            ("予測", "预测"),
            // event
            ("発表", "发布"),
            ("速報", "快讯"),
            ("発生", "发生"),
            ("地震", "地震"),
            ("事故", "事故"),
            ("調査", "调查"),
            ("開始", "开始"),
            ("終了", "结束"),
            ("報告", "报告"),
            ("公表", "公布"),
            // actors / places
            ("政府", "政府"),
            ("企業", "企业"),
            ("日本", "日本"),
            ("国内", "国内"),
            ("東京", "东京"),
            ("大阪", "大阪"),
            ("楽天", "乐天"),
            // qualifiers
            ("総合", "综合"),
            ("最新", "最新"),
            ("注目", "关注"),
            ("人気", "热门"),
        ];

        Self {
            version: RULESET_VERSION,
            placeholder: DEFAULT_PLACEHOLDER.into(),
            noise: strings(&[
                "朝日",
                "共同通信",
                "日経",
                "NHK",
                "スポーツ",
                "記者",
                "提供",
                "PR TIMES",
                "配信",
                "写真",
            ]),
            keywords: keywords
                .iter()
                .map(|(f, t)| KeywordRule::new(f, t))
                .collect(),
            subjects: strings(&["日本", "日本国内", "东京", "大阪"]),
            fields: strings(&[
                "汽车", "汽车行业", "家电", "金融", "经济", "市场", "美妆", "护肤", "食品",
            ]),
            consumer_fields: strings(&["汽车", "家电", "护肤", "美妆", "食品"]),
            trends: strings(&["增加", "增长", "回升", "下滑", "减少", "回落"]),
            trend_aliases: vec![
                KeywordRule::new("回復", "回升"),
                KeywordRule::new("回复", "回升"),
                KeywordRule::new("反発", "回升"),
            ],
            default_trend: "变化".into(),
            events: strings(&[
                "发布", "公布", "报告", "快讯", "发生", "事故", "地震", "调查", "开始",
            ]),
            publish_events: strings(&["发布", "公布", "报告"]),
            incident_events: strings(&["事故", "地震", "发生"]),
            volume_markers: strings(&["销量", "销售"]),
            volume_object: "销量".into(),
            templates: Templates::default(),
        }
    }
}

impl RuleSet {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Parse a TOML rule file. Tables missing from the file keep their built-in values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let rules: RuleSet = toml::from_str(s).context("parsing rule set toml")?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version == 0 {
            bail!("rule set version must be >= 1");
        }
        if self.placeholder.trim().is_empty() {
            bail!("rule set placeholder must not be empty");
        }
        if let Some(pos) = self.keywords.iter().position(|k| k.from.is_empty()) {
            bail!("keyword rule #{pos} has an empty key");
        }
        if let Some(pos) = self.trend_aliases.iter().position(|k| k.from.is_empty()) {
            bail!("trend alias #{pos} has an empty key");
        }
        if self.templates.fallback.trim().is_empty() {
            bail!("fallback template must not be empty");
        }
        Ok(())
    }

    /// Longest keyword matching at the start of `s`; ties go to the earlier rule.
    pub(crate) fn longest_prefix_match(&self, s: &str) -> Option<&KeywordRule> {
        let mut best: Option<&KeywordRule> = None;
        for rule in &self.keywords {
            if rule.from.is_empty() || !s.starts_with(rule.from.as_str()) {
                continue;
            }
            let longer = best.map_or(true, |b| {
                rule.from.chars().count() > b.from.chars().count()
            });
            if longer {
                best = Some(rule);
            }
        }
        best
    }

    /// Canonical trend word for `token`, if it is one.
    pub(crate) fn canonical_trend(&self, token: &str) -> Option<String> {
        if let Some(alias) = self.trend_aliases.iter().find(|a| a.from == token) {
            return Some(alias.to.clone());
        }
        self.trends
            .iter()
            .any(|t| t == token)
            .then(|| token.to_string())
    }
}

/// Load a rule set from an explicit TOML path.
pub fn load_rules_from(path: &Path) -> Result<RuleSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading rule set from {}", path.display()))?;
    RuleSet::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
}

/// Load the rule set using env var + fallbacks:
/// 1) $DIGEST_RULES_PATH (must exist)
/// 2) config/rules.toml
/// 3) built-in tables
pub fn load_rules_default() -> Result<RuleSet> {
    if let Ok(p) = std::env::var(ENV_RULES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_rules_from(&pb);
        }
        return Err(anyhow!("{ENV_RULES_PATH} points to non-existent path"));
    }
    let default_p = PathBuf::from(DEFAULT_RULES_PATH);
    if default_p.exists() {
        return load_rules_from(&default_p);
    }
    Ok(RuleSet::builtin())
}
