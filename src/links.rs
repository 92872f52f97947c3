//! Pagination links.
//!
//! GitHub describes adjacent pages as a list of `(url, {rel})` pairs: either
//! the `meta.Link` array of a JSONP envelope, or a raw `Link` header which
//! [`parse_link_header`] converts into the same shape. [`extract_page_links`]
//! reduces that list to relation -> `page` parameter.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static PAGE_PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]page=([^&#]*)").unwrap());

static LINK_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]*)>\s*;\s*rel="?([^";,]+)"?"#).unwrap());

/// Relation descriptor of a link entry (`{"rel": "next"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRelation {
    pub rel: String,
}

/// One `(url, {rel})` pair, serialized as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry(pub String, pub LinkRelation);

impl LinkEntry {
    pub fn new(url: impl Into<String>, rel: impl Into<String>) -> Self {
        Self(url.into(), LinkRelation { rel: rel.into() })
    }

    pub fn url(&self) -> &str {
        &self.0
    }

    pub fn rel(&self) -> &str {
        &self.1.rel
    }
}

/// Response metadata accompanying every API payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(rename = "Link", default)]
    pub link: Vec<LinkEntry>,
}

/// The `{meta, data}` envelope every model and collection parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub data: Value,
}

impl ServiceResponse {
    pub fn new(data: Value) -> Self {
        Self {
            meta: ResponseMeta::default(),
            data,
        }
    }

    pub fn with_links(mut self, links: Vec<LinkEntry>) -> Self {
        self.meta.link = links;
        self
    }
}

/// Relation name -> page token for one fetched page of a collection.
///
/// A relation present with no `page` parameter is stored as `None`; both that
/// and a missing relation mean the direction is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks(BTreeMap<String, Option<String>>);

impl PageLinks {
    /// The page token for `rel`, if that direction is available.
    pub fn page(&self, rel: &str) -> Option<&str> {
        self.0.get(rel).and_then(|page| page.as_deref())
    }

    pub fn is_available(&self, rel: &str) -> bool {
        self.page(rel).is_some()
    }

    /// Whether `rel` appeared at all, with or without a page token.
    pub fn contains(&self, rel: &str) -> bool {
        self.0.contains_key(rel)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(rel, page)| (rel.as_str(), page.as_deref()))
    }
}

/// Value of the `page` query parameter in `url`, if any.
pub fn page_param(url: &str) -> Option<String> {
    PAGE_PARAM_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Reduce link entries to relation -> page token.
///
/// At most one entry per relation is expected; when a relation repeats, the
/// last entry wins.
pub fn extract_page_links(entries: &[LinkEntry]) -> PageLinks {
    let mut links = BTreeMap::new();
    for entry in entries {
        links.insert(entry.rel().to_string(), page_param(entry.url()));
    }
    PageLinks(links)
}

/// Parse an RFC 8288 `Link` header into entries, preserving order.
///
/// `<https://x?page=2>; rel="next", <https://x?page=9>; rel="last"`
///
/// A link carrying several space-separated relations yields one entry per
/// relation. Segments that do not look like `<url>; rel=...` are skipped.
pub fn parse_link_header(header: &str) -> Vec<LinkEntry> {
    let mut entries = Vec::new();
    for caps in LINK_HEADER_REGEX.captures_iter(header) {
        let url = &caps[1];
        for rel in caps[2].split_whitespace() {
            entries.push(LinkEntry::new(url, rel));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_next_and_missing_page() {
        let entries = vec![
            LinkEntry::new("https://api.github.com/repos/o/r/issues?page=3", "next"),
            LinkEntry::new("https://api.github.com/repos/o/r/issues", "prev"),
        ];
        let links = extract_page_links(&entries);

        assert_eq!(links.page("next"), Some("3"));
        assert_eq!(links.page("prev"), None);
        assert!(links.contains("prev"));
        assert!(!links.is_available("prev"));
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_missing_relation_is_unavailable() {
        let links = extract_page_links(&[]);
        assert!(links.is_empty());
        assert!(!links.is_available("next"));
        assert!(!links.contains("next"));
    }

    #[test]
    fn test_duplicate_relation_last_wins() {
        let entries = vec![
            LinkEntry::new("https://x/issues?page=2", "next"),
            LinkEntry::new("https://x/issues?page=5", "next"),
        ];
        assert_eq!(extract_page_links(&entries).page("next"), Some("5"));
    }

    #[test]
    fn test_page_param_after_other_params() {
        assert_eq!(
            page_param("https://x/issues?callback=foo&page=12&per_page=30"),
            Some("12".to_string())
        );
        assert_eq!(page_param("https://x/issues?page=4#top"), Some("4".to_string()));
        assert_eq!(page_param("https://x/issues?per_page=30"), None);
    }

    #[test]
    fn test_parse_link_header_github_style() {
        let header = r#"<https://api.github.com/repositories/8514/issues?page=2>; rel="next", <https://api.github.com/repositories/8514/issues?page=42>; rel="last""#;
        let entries = parse_link_header(header);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rel(), "next");
        assert_eq!(
            entries[0].url(),
            "https://api.github.com/repositories/8514/issues?page=2"
        );
        assert_eq!(entries[1].rel(), "last");

        let links = extract_page_links(&entries);
        assert_eq!(links.page("next"), Some("2"));
        assert_eq!(links.page("last"), Some("42"));
    }

    #[test]
    fn test_parse_link_header_multiple_rels_and_garbage() {
        let header = r#"<https://x?page=1>; rel="first prev", garbage, <https://x?page=3>; rel=next"#;
        let entries = parse_link_header(header);
        let rels: Vec<&str> = entries.iter().map(|e| e.rel()).collect();
        assert_eq!(rels, vec!["first", "prev", "next"]);
    }

    #[test]
    fn test_parse_empty_link_header() {
        assert!(parse_link_header("").is_empty());
    }

    #[test]
    fn test_jsonp_envelope_deserialize() {
        let json = r#"{
            "meta": {
                "status": 200,
                "Link": [
                    ["https://api.github.com/repos/rails/rails/issues?callback=x&page=2", {"rel": "next"}],
                    ["https://api.github.com/repos/rails/rails/issues?callback=x&page=30", {"rel": "last"}]
                ]
            },
            "data": [{"number": 1}]
        }"#;
        let response: ServiceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.meta.status, Some(200));
        assert_eq!(response.meta.link.len(), 2);
        assert_eq!(response.meta.link[1].rel(), "last");
        assert_eq!(response.data[0]["number"], 1);
    }

    #[test]
    fn test_envelope_without_meta() {
        let response: ServiceResponse = serde_json::from_str(r#"{"data": {"id": 1}}"#).unwrap();
        assert!(response.meta.link.is_empty());
        assert_eq!(response.data["id"], 1);
    }
}
