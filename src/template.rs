//! Handlebars templates embedded in the binary, plus the helpers they use.
//!
//! | Template                | Used by            |
//! |-------------------------|--------------------|
//! | `issues-view`           | `IssuesView`       |
//! | `pagination`            | `IssuesView`       |
//! | `issue-item-renderer`   | `IssueItemView`    |
//! | `issue-view`            | `IssueView`        |
//! | `comment-item-renderer` | `CommentItemView`  |
//! | `layout`                | full-page output   |

use std::sync::LazyLock;

use chrono::DateTime;
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use regex::Regex;
use rust_embed::RustEmbed;
use serde::Serialize;
use serde_json::{Value, json};

use crate::dom::{REGION_MARKER_PREFIX, region_marker};
use crate::errors::{TemplateError, ViewError};

/// Templates shipped with the application.
pub const TEMPLATE_NAMES: &[&str] = &[
    "issues-view",
    "pagination",
    "issue-item-renderer",
    "issue-view",
    "comment-item-renderer",
    "layout",
];

const PREVIEW_CHARS: usize = 140;

static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w*)").unwrap());

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/templates/"]
struct TemplateAssets;

/// Compiled template registry.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Compile every embedded template and register the helpers.
    pub fn load() -> Result<Self, TemplateError> {
        let mut templates = Self::empty();
        for name in TEMPLATE_NAMES {
            let file = format!("{}.hbs", name);
            let asset = TemplateAssets::get(&file).ok_or_else(|| TemplateError::Missing {
                name: name.to_string(),
            })?;
            let source = std::str::from_utf8(&asset.data).map_err(|_| TemplateError::Encoding {
                name: name.to_string(),
            })?;
            templates.register(name, source)?;
        }
        Ok(templates)
    }

    /// A registry with helpers but no templates.
    pub fn empty() -> Self {
        let mut registry = Handlebars::new();
        registry.register_helper("markdown", Box::new(markdown_helper));
        registry.register_helper("preview", Box::new(preview_helper));
        registry.register_helper("date", Box::new(date_helper));
        registry.register_helper("region", Box::new(region_helper));
        Self { registry }
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|source| TemplateError::Compile {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, ViewError> {
        self.registry
            .render(name, data)
            .map_err(|source| ViewError::Render {
                template: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Wrap rendered content in the full HTML page.
    pub fn render_page(&self, title: &str, content: &str) -> Result<String, ViewError> {
        self.render("layout", &json!({ "title": title, "content": content }))
    }
}

fn param_str(h: &Helper, index: usize) -> String {
    match h.param(index).map(|p| p.value()) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// `@user` mentions become profile links, then CommonMark becomes HTML.
/// Raw HTML passes through, except region markers, which are escaped.
pub fn render_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let linked = MENTION_REGEX.replace_all(
        text,
        r#"<a href="https://github.com/${1}" target="_blank">@${1}</a>"#,
    );
    let parser = pulldown_cmark::Parser::new(&linked);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html.replace(REGION_MARKER_PREFIX, "&lt;!--region:")
}

/// Teaser text: trimmed, cut to 140 characters, last partial word dropped.
pub fn preview(text: &str) -> String {
    let clipped: String = text.trim().chars().take(PREVIEW_CHARS).collect();
    let words: Vec<&str> = clipped.split(' ').collect();
    let kept = &words[..words.len().saturating_sub(1)];
    format!("{}...", kept.join(" "))
}

/// `2024-01-02T10:00:00Z` -> `Jan 2, 2024`; anything unparseable is echoed.
pub fn format_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

fn markdown_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&render_markdown(&param_str(h, 0)))?;
    Ok(())
}

fn preview_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&handlebars::html_escape(&preview(&param_str(h, 0))))?;
    Ok(())
}

fn date_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&handlebars::html_escape(&format_date(&param_str(h, 0))))?;
    Ok(())
}

fn region_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&region_marker(&param_str(h, 0)))?;
    Ok(())
}
