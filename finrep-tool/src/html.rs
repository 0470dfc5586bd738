//! Lightweight HTML extraction helpers for the web tools.
//!
//! These work on raw markup with regular expressions. They are tuned for news pages and
//! search result listings, not for arbitrary documents.

use regex::Regex;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static HIDDEN_BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
static BLOCK_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static NUMERIC_ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static META_REGEX: OnceLock<Regex> = OnceLock::new();
static ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static TITLE_REGEX: OnceLock<Regex> = OnceLock::new();
static ARTICLE_REGEX: OnceLock<Regex> = OnceLock::new();
static PARAGRAPH_REGEX: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid regex pattern"))
}

fn hidden_block_regex() -> &'static Regex {
    HIDDEN_BLOCK_REGEX.get_or_init(|| {
        Regex::new(
            r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<!--.*?-->",
        )
        .expect("Invalid regex pattern")
    })
}

fn block_tag_regex() -> &'static Regex {
    BLOCK_TAG_REGEX.get_or_init(|| {
        Regex::new(r"(?i)</?(?:p|div|br|li|tr|h[1-6]|section|article|header|footer)\b[^>]*>")
            .expect("Invalid regex pattern")
    })
}

fn numeric_entity_regex() -> &'static Regex {
    NUMERIC_ENTITY_REGEX
        .get_or_init(|| Regex::new(r"&#(x?)([0-9a-fA-F]+);").expect("Invalid regex pattern"))
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"))
}

fn meta_regex() -> &'static Regex {
    META_REGEX.get_or_init(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("Invalid regex pattern"))
}

fn attr_regex() -> &'static Regex {
    ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"([a-zA-Z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("Invalid regex pattern")
    })
}

fn title_regex() -> &'static Regex {
    TITLE_REGEX
        .get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("Invalid regex pattern"))
}

fn article_regex() -> &'static Regex {
    ARTICLE_REGEX.get_or_init(|| {
        Regex::new(r"(?is)<article\b[^>]*>(.*)</article>").expect("Invalid regex pattern")
    })
}

fn paragraph_regex() -> &'static Regex {
    PARAGRAPH_REGEX
        .get_or_init(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("Invalid regex pattern"))
}

/// Decode the named entities that show up in practice plus numeric references.
pub fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&mdash;", "\u{2014}")
        .replace("&ndash;", "\u{2013}")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&hellip;", "\u{2026}");

    let numeric = numeric_entity_regex().replace_all(&named, |caps: &regex::Captures<'_>| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    // Last, so "&amp;lt;" stays "&lt;".
    numeric.replace("&amp;", "&")
}

/// Strip tags from an inline fragment and collapse whitespace to single spaces.
pub fn strip_tags(fragment: &str) -> String {
    let without_tags = tag_regex().replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    whitespace_regex().replace_all(&decoded, " ").trim().to_string()
}

/// Readable text of a whole page, one non-empty line per block element.
pub fn extract_text(html: &str) -> String {
    let visible = hidden_block_regex().replace_all(html, "");
    let with_breaks = block_tag_regex().replace_all(&visible, "\n");
    let without_tags = tag_regex().replace_all(&with_breaks, "");
    let decoded = decode_entities(&without_tags);

    decoded
        .lines()
        .map(|line| whitespace_regex().replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Content of the first `<meta>` tag whose `name` or `property` equals `key`
/// (case-insensitive).
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    meta_regex().find_iter(html).find_map(|tag| {
        let mut matches_key = false;
        let mut content = None;
        for caps in attr_regex().captures_iter(tag.as_str()) {
            let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            match caps[1].to_ascii_lowercase().as_str() {
                "name" | "property" if value.eq_ignore_ascii_case(key) => matches_key = true,
                "content" => content = Some(decode_entities(value).trim().to_string()),
                _ => {}
            }
        }
        if matches_key { content.filter(|c| !c.is_empty()) } else { None }
    })
}

/// Text of the `<title>` element.
pub fn title(html: &str) -> Option<String> {
    title_regex()
        .captures(html)
        .map(|caps| strip_tags(&caps[1]))
        .filter(|t| !t.is_empty())
}

/// Non-empty paragraph texts, taken from `<article>` when the page has one.
pub fn paragraphs(html: &str) -> Vec<String> {
    let visible = hidden_block_regex().replace_all(html, "");
    let scope = article_regex()
        .captures(&visible)
        .and_then(|caps| caps.get(1))
        .map_or(&*visible, |m| m.as_str());

    paragraph_regex()
        .captures_iter(scope)
        .map(|caps| strip_tags(&caps[1]))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Truncate to at most `max_chars` characters. Returns whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}
