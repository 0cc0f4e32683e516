// tests/normalize_pipeline.rs
use jp_commerce_digest::normalize::{
    normalize_title, post_cleanup, KeywordRule, RuleSet, DISPLAY_BUDGET, ELLIPSIS,
    FALLBACK_BUDGET,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn rules() -> RuleSet {
    RuleSet::builtin()
}

fn has_kana(s: &str) -> bool {
    s.chars()
        .any(|c| ('\u{3040}'..='\u{30FF}').contains(&c) || ('\u{FF66}'..='\u{FF9F}').contains(&c))
}

#[test]
fn empty_title_gives_placeholder() {
    assert_eq!(normalize_title(&rules(), ""), "内容缺失");
    assert_eq!(normalize_title(&rules(), "   \t"), "内容缺失");
}

#[test]
fn rakuten_ranking_headline() {
    let out = normalize_title(&rules(), "楽天市場 ランキング 総合 - Yahoo!ニュース");
    assert_eq!(out, "乐天市场综合相关消息更新。");
    assert!(out.contains("市场"));
    assert!(!has_kana(&out));
    assert!(out.chars().count() <= DISPLAY_BUDGET);
}

#[test]
fn sales_headline_uses_time_and_volume() {
    let out = normalize_title(&rules(), "トヨタ自動車、2025年10月の販売台数が増加 - 日経");
    assert_eq!(out, "汽车 2025年汽车销量增加。");
}

#[test]
fn incident_headline_uses_event_template() {
    let out = normalize_title(&rules(), "【速報】大阪 地震 発生（震度4） - NHK");
    assert_eq!(out, "大阪发生地震，最新情况。");
}

#[test]
fn publish_headline_uses_field_as_object() {
    let out = normalize_title(&rules(), "日本 経済 報告を政府が公表 - 共同通信");
    assert_eq!(out, "日本发布经济。");
}

#[test]
fn recovery_synonyms_collapse_to_one_word() {
    let out = normalize_title(&rules(), "日本 家電 販売 反発");
    assert_eq!(out, "日本家电销量回升。");
    let out2 = normalize_title(&rules(), "日本 家電 販売 回復");
    assert_eq!(out, out2);
}

#[test]
fn unmapped_text_falls_back_to_cleaned_title() {
    assert_eq!(normalize_title(&rules(), "ラーメン ABC 123"), "ABC 123。");
}

#[test]
fn kana_only_title_gives_placeholder() {
    assert_eq!(normalize_title(&rules(), "ランキング - Yahoo!ニュース"), "内容缺失");
    assert_eq!(normalize_title(&rules(), "「」、。！"), "内容缺失");
}

#[test]
fn long_fallback_is_cut_to_its_budget() {
    let title = "abc ".repeat(40);
    let out = normalize_title(&rules(), &title);
    assert!(out.ends_with("...。"));
    assert_eq!(out.chars().count(), FALLBACK_BUDGET + ELLIPSIS.len() + 1);

    let out = normalize_title(&rules(), &"a".repeat(70));
    assert_eq!(out, format!("{}...。", "a".repeat(60)));
}

#[test]
fn long_summary_is_truncated_with_ellipsis() {
    let title = format!("日本{}", "語".repeat(120));
    let out = normalize_title(&rules(), &title);
    assert!(out.ends_with(ELLIPSIS));
    assert_eq!(out.chars().count(), DISPLAY_BUDGET + ELLIPSIS.len());
}

#[test]
fn longest_key_beats_its_substring() {
    // the short key is declared first and is a substring of the long one
    let r = RuleSet {
        keywords: vec![
            KeywordRule::new("市場", "集市"),
            KeywordRule::new("楽天", "乐天"),
            KeywordRule::new("楽天市場", "乐天商城"),
        ],
        ..rules()
    };
    let out = normalize_title(&r, "楽天市場");
    assert!(out.contains("乐天商城"), "{out}");
    assert!(!out.contains("集市"), "{out}");
}

#[test]
fn normalization_is_deterministic() {
    let t = "人気のスキンケア商品ランキング - PR TIMES";
    assert_eq!(normalize_title(&rules(), t), normalize_title(&rules(), t));
    assert_eq!(normalize_title(&rules(), t), "热门商品相关消息更新。");
}

const ALPHABET: &[&str] = &[
    "楽天", "市場", "自動車", "販売", "増加", "発表", "地震", "日本", "東京", "語", "年", "月",
    "ランキング", "の", "が", "ｶﾀ", "ー", "2025", "10", "abc", " ", "  ", " - ", "-", "(", ")",
    "（", "）", "【", "】", "。", "。。", "!!", "?", "&amp;", "&nbsp;", "\n", "\t", "NHK",
    "PR TIMES", "写真", "🎵", "é", "\u{3000}",
];

fn random_title(rng: &mut StdRng) -> String {
    let n = rng.random_range(0..30);
    (0..n)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
        .collect()
}

#[test]
fn every_input_yields_bounded_non_empty_summary() {
    let r = rules();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..2_000 {
        let title = random_title(&mut rng);
        let out = normalize_title(&r, &title);
        assert!(!out.is_empty(), "empty summary for {title:?}");
        assert!(
            out.chars().count() <= DISPLAY_BUDGET.max(FALLBACK_BUDGET) + ELLIPSIS.len() + 1,
            "over budget for {title:?}: {out}"
        );
        assert!(!has_kana(&out), "kana left in {out} for {title:?}");
    }
}

#[test]
fn post_cleanup_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..2_000 {
        let s = random_title(&mut rng);
        let once = post_cleanup(&s);
        assert_eq!(post_cleanup(&once), once, "input {s:?}");
    }
}
