// src/normalize/mod.rs
//! Headline normalization: turns a noisy Japanese news headline into a short
//! Chinese summary sentence.
//!
//! Stages, in order: source-trim, script filter, tokenize, keyword mapping,
//! classification + template assembly, post-cleanup, truncation. Every stage is
//! a pure function over `&str`; the whole pipeline never fails and never returns
//! an empty string.

pub mod rules;

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

pub use rules::{KeywordRule, RuleSet, Templates};

/// Max characters of a templated summary before it is cut.
pub const DISPLAY_BUDGET: usize = 60;
/// Max characters of the untranslated fallback text.
pub const FALLBACK_BUDGET: usize = 60;
pub const ELLIPSIS: &str = "...";

fn re_source_suffix() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r" - [^\-\s]+$").unwrap())
}

fn re_brackets() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\(.*?\)|（.*?）|【.*?】").unwrap())
}

fn re_ideographs() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[\x{4E00}-\x{9FFF}]+").unwrap())
}

fn re_year() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})年").unwrap())
}

fn re_month() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})月").unwrap())
}

fn collapse_ws(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Stage 1: drop the trailing " - Source" suffix, bracketed asides and byline noise.
pub fn source_trim(rules: &RuleSet, raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let mut out = re_source_suffix().replace(&decoded, "").to_string();
    out = re_brackets().replace_all(&out, " ").to_string();
    for w in rules.noise.iter().filter(|w| !w.is_empty()) {
        out = out.replace(w.as_str(), " ");
    }
    collapse_ws(&out)
}

fn is_kana(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // hiragana
        | '\u{30A0}'..='\u{30FF}' // katakana
        | '\u{31F0}'..='\u{31FF}' // katakana phonetic extensions
        | '\u{FF66}'..='\u{FF9F}' // half-width katakana
    )
}

fn is_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Stage 2: blank out kana, then anything that is not an ideograph, ASCII
/// letter/digit or space.
pub fn script_filter(s: &str) -> String {
    let kept: String = s
        .chars()
        .map(|c| {
            if is_kana(c) {
                ' '
            } else if c.is_ascii_alphanumeric() || c == ' ' || is_ideograph(c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    collapse_ws(&kept)
}

/// Stage 3: maximal runs of CJK ideographs, left to right.
pub fn tokenize(s: &str) -> Vec<&str> {
    re_ideographs().find_iter(s).map(|m| m.as_str()).collect()
}

/// Longest-key-first substitution of one token over the keyword table.
pub fn substitute(rules: &RuleSet, token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(c) = rest.chars().next() {
        match rules.longest_prefix_match(rest) {
            Some(rule) => {
                out.push_str(&rule.to);
                rest = &rest[rule.from.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

/// Stage 4: map every token, drop empties, dedup keeping first occurrence.
pub fn map_tokens(rules: &RuleSet, tokens: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let mapped = substitute(rules, t);
        if mapped.is_empty() {
            continue;
        }
        if seen.insert(mapped.clone()) {
            out.push(mapped);
        }
    }
    out
}

/// Time phrase for templates: " 2025年", else " 10月", else empty.
pub fn extract_time(raw: &str) -> String {
    if let Some(c) = re_year().captures(raw) {
        return format!(" {}年", &c[1]);
    }
    if let Some(c) = re_month().captures(raw) {
        return format!(" {}月", &c[1]);
    }
    String::new()
}

/// Which template a classified headline ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Publish,
    Sales,
    Event,
    Fallback,
}

/// Slots picked out of the mapped token sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub subject: String,
    pub field: String,
    pub trend: String,
    pub event: String,
    pub object: String,
}

fn first_in<'a>(tokens: &'a [String], list: &[String]) -> Option<&'a String> {
    tokens.iter().find(|t| list.contains(t))
}

pub fn classify(rules: &RuleSet, mapped: &[String]) -> Classification {
    let subject = first_in(mapped, &rules.subjects)
        .or_else(|| mapped.first())
        .cloned()
        .unwrap_or_default();
    let field = first_in(mapped, &rules.fields).cloned().unwrap_or_default();
    let trend = mapped
        .iter()
        .find_map(|t| rules.canonical_trend(t))
        .unwrap_or_default();
    let event = first_in(mapped, &rules.events).cloned().unwrap_or_default();
    let object = if mapped.iter().any(|t| rules.volume_markers.contains(t)) {
        rules.volume_object.clone()
    } else {
        String::new()
    };
    Classification {
        subject,
        field,
        trend,
        event,
        object,
    }
}

pub fn select_template(rules: &RuleSet, c: &Classification) -> TemplateKind {
    if !c.event.is_empty() && rules.publish_events.contains(&c.event) {
        return TemplateKind::Publish;
    }
    let is_volume = !c.object.is_empty() && c.object == rules.volume_object;
    if is_volume || (!c.field.is_empty() && rules.consumer_fields.contains(&c.field)) {
        return TemplateKind::Sales;
    }
    if !c.event.is_empty() && rules.incident_events.contains(&c.event) {
        return TemplateKind::Event;
    }
    TemplateKind::Fallback
}

struct Slots<'a> {
    subject: &'a str,
    time: &'a str,
    field: &'a str,
    trend: &'a str,
    event: &'a str,
    obj: &'a str,
}

fn fill(template: &str, s: &Slots<'_>) -> String {
    template
        .replace("{subject}", s.subject)
        .replace("{time}", s.time)
        .replace("{field}", s.field)
        .replace("{trend}", s.trend)
        .replace("{event}", s.event)
        .replace("{obj}", s.obj)
}

/// Stage 5: classify and render the chosen template.
pub fn assemble(rules: &RuleSet, mapped: &[String], raw: &str) -> String {
    let c = classify(rules, mapped);
    let time = extract_time(raw);
    let t = &rules.templates;
    match select_template(rules, &c) {
        TemplateKind::Publish => {
            let obj = if c.object.is_empty() {
                &c.field
            } else {
                &c.object
            };
            fill(
                &t.publish,
                &Slots {
                    subject: &c.subject,
                    time: &time,
                    field: &c.field,
                    trend: &c.trend,
                    event: &c.event,
                    obj,
                },
            )
        }
        TemplateKind::Sales => {
            let trend = if c.trend.is_empty() {
                &rules.default_trend
            } else {
                &c.trend
            };
            fill(
                &t.sales,
                &Slots {
                    subject: &c.subject,
                    time: &time,
                    field: &c.field,
                    trend,
                    event: &c.event,
                    obj: &c.object,
                },
            )
        }
        TemplateKind::Event => fill(
            &t.event,
            &Slots {
                subject: &c.subject,
                time: &time,
                field: &c.field,
                trend: &c.trend,
                event: &c.event,
                obj: &c.object,
            },
        ),
        TemplateKind::Fallback => {
            let comb = if mapped.is_empty() {
                c.subject.clone()
            } else {
                mapped.iter().take(4).map(String::as_str).collect()
            };
            fill(
                &t.fallback,
                &Slots {
                    subject: &comb,
                    time: &time,
                    field: &c.field,
                    trend: &c.trend,
                    event: &c.event,
                    obj: &c.object,
                },
            )
        }
    }
}

fn is_terminal_punct(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '!' | '?' | '.')
}

/// Stage 6: squeeze repeated terminal punctuation and whitespace.
pub fn post_cleanup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if is_terminal_punct(c) && prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    collapse_ws(&out)
}

/// Cut to `budget` characters, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, budget: usize) -> String {
    if s.chars().count() <= budget {
        return s.to_string();
    }
    let mut out: String = s.chars().take(budget).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Full pipeline. Total over all inputs; the result is never empty.
pub fn normalize_title(rules: &RuleSet, raw: &str) -> String {
    if raw.trim().is_empty() {
        return rules.placeholder.clone();
    }

    let trimmed = source_trim(rules, raw);
    let cleaned = script_filter(&trimmed);
    let tokens = tokenize(&cleaned);
    let mapped = map_tokens(rules, &tokens);

    if mapped.is_empty() {
        if cleaned.is_empty() {
            return rules.placeholder.clone();
        }
        let mut out = truncate_chars(&cleaned, FALLBACK_BUDGET);
        out.push('。');
        return out;
    }

    let summary = post_cleanup(&assemble(rules, &mapped, raw));
    if summary.is_empty() {
        return rules.placeholder.clone();
    }
    truncate_chars(&summary, DISPLAY_BUDGET)
}

/// Normalizer bound to one shared rule set.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Arc<RuleSet>,
}

impl Normalizer {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_title(&self.rules, raw)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(RuleSet::builtin()))
    }
}
