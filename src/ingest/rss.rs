// src/ingest/rss.rs
use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
}

/// One `<item>` as found in the feed, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
}

/// Parse `rss/channel/item` entries in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
    Ok(rss
        .channel
        .item
        .into_iter()
        .map(|it| FeedEntry {
            title: it.title.map(|t| t.trim().to_string()).unwrap_or_default(),
            link: it
                .link
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        })
        .collect())
}

// quick-xml only knows the five XML entities; feeds regularly leak HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items_in_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>feed</title>
<item><title>一 - A</title><link>https://a/1</link><source url="https://a">A</source></item>
<item><title>二&nbsp;B</title><link> https://a/2 </link></item>
</channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "一 - A");
        assert_eq!(entries[1].title, "二 B");
        assert_eq!(entries[1].link.as_deref(), Some("https://a/2"));
    }

    #[test]
    fn missing_fields_are_tolerated() {
        let xml = "<rss><channel><item><link>https://a/1</link></item><item><title>t</title></item></channel></rss>";
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].title, "");
        assert_eq!(entries[1].link, None);
    }

    #[test]
    fn empty_channel_is_ok() {
        let entries = parse_feed("<rss><channel><title>x</title></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn html_body_is_an_error() {
        assert!(parse_feed("<html><body>503</body></html>").is_err());
        assert!(parse_feed("not xml at all").is_err());
    }
}
