//! Service URL construction shared by models and collections.
//!
//! A resource declares a [`ServiceSpec`] (path template plus query
//! parameters) and answers attribute lookups; [`build_url`] turns that into
//! an absolute request URL against the configured API base.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::links::ServiceResponse;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w*)\}\}").unwrap());

/// Rendered in place of an attribute the resource does not have.
pub const UNDEFINED: &str = "undefined";

/// Where requests go and how they are shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// API base, e.g. `https://api.github.com/repos/rails/rails`.
    pub server: String,
    /// Ask the API for a JSONP envelope (`callback=?`).
    pub jsonp: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: crate::config::DEFAULT_SERVER.to_string(),
            jsonp: false,
        }
    }
}

/// Path template and query parameters of a fetchable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSpec {
    pub template: &'static str,
    pub query_params: &'static [&'static str],
    /// Whether responses carry pagination links worth extracting.
    pub paginated: bool,
}

impl ServiceSpec {
    /// Plain data holder with no endpoint of its own.
    pub const NONE: ServiceSpec = ServiceSpec {
        template: "",
        query_params: &[],
        paginated: false,
    };

    pub const ISSUE: ServiceSpec = ServiceSpec {
        template: "/issues/{{id}}",
        query_params: &[],
        paginated: false,
    };

    pub const ISSUES: ServiceSpec = ServiceSpec {
        template: "/issues",
        query_params: &["page"],
        paginated: true,
    };

    pub const COMMENTS: ServiceSpec = ServiceSpec {
        template: "/issues/{{id}}/comments",
        query_params: &[],
        paginated: false,
    };
}

/// Capability shared by single-entity models and collections: build a URL
/// from own attributes, and turn a response envelope into data.
pub trait ServiceResource {
    fn service(&self) -> &ServiceSpec;

    /// Attribute lookup used for placeholder and query substitution.
    fn lookup(&self, name: &str) -> Option<Value>;

    fn url_for(&self, config: &ServiceConfig) -> String {
        build_url(config, self.service(), |name| self.lookup(name))
    }

    /// Extract the payload from a response. Collections with pagination also
    /// record the response's links here.
    fn parse(&self, response: ServiceResponse) -> Value {
        response.data
    }

    /// Replace local state with freshly parsed data, firing the matching
    /// events.
    fn apply(&self, data: Value);
}

/// Display form of an attribute value as it appears inside a URL.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Resolve `spec` into an absolute URL.
///
/// Placeholders and query parameters naming a missing attribute render as
/// `undefined` rather than failing.
pub fn build_url<F>(config: &ServiceConfig, spec: &ServiceSpec, lookup: F) -> String
where
    F: Fn(&str) -> Option<Value>,
{
    let resolve = |name: &str| match lookup(name) {
        Some(value) => stringify(&value),
        None => {
            tracing::warn!(attribute = name, template = spec.template, "Unresolved service attribute");
            UNDEFINED.to_string()
        }
    };

    let path = PLACEHOLDER_REGEX.replace_all(spec.template, |caps: &Captures| resolve(&caps[1]));
    let mut url = format!("{}{}", config.server, path);

    let mut args = Vec::new();
    if config.jsonp {
        args.push("callback=?".to_string());
    }
    for param in spec.query_params {
        args.push(format!("{}={}", param, resolve(param)));
    }
    if !args.is_empty() {
        url.push('?');
        url.push_str(&args.join("&"));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(jsonp: bool) -> ServiceConfig {
        ServiceConfig {
            server: "https://api.example.com/repos/o/r".to_string(),
            jsonp,
        }
    }

    fn lookup_from(value: Value) -> impl Fn(&str) -> Option<Value> {
        move |name| value.get(name).cloned()
    }

    #[test]
    fn test_comments_url_has_no_trailing_question_mark() {
        let url = build_url(&config(false), &ServiceSpec::COMMENTS, lookup_from(json!({"id": 7})));
        assert_eq!(url, "https://api.example.com/repos/o/r/issues/7/comments");
    }

    #[test]
    fn test_query_params_appended() {
        let url = build_url(&config(false), &ServiceSpec::ISSUES, lookup_from(json!({"page": "3"})));
        assert_eq!(url, "https://api.example.com/repos/o/r/issues?page=3");
    }

    #[test]
    fn test_jsonp_callback_comes_first() {
        let url = build_url(&config(true), &ServiceSpec::ISSUES, lookup_from(json!({"page": 2})));
        assert_eq!(
            url,
            "https://api.example.com/repos/o/r/issues?callback=?&page=2"
        );
    }

    #[test]
    fn test_jsonp_without_query_params() {
        let url = build_url(&config(true), &ServiceSpec::ISSUE, lookup_from(json!({"id": "42"})));
        assert_eq!(url, "https://api.example.com/repos/o/r/issues/42?callback=?");
    }

    #[test]
    fn test_missing_attribute_renders_undefined() {
        let url = build_url(&config(false), &ServiceSpec::ISSUE, lookup_from(json!({})));
        assert_eq!(url, "https://api.example.com/repos/o/r/issues/undefined");

        let url = build_url(&config(false), &ServiceSpec::ISSUES, lookup_from(json!({})));
        assert_eq!(url, "https://api.example.com/repos/o/r/issues?page=undefined");
    }

    #[test]
    fn test_repeated_placeholder() {
        let spec = ServiceSpec {
            template: "/{{a}}/{{a}}/{{b}}",
            query_params: &[],
            paginated: false,
        };
        let url = build_url(&config(false), &spec, lookup_from(json!({"a": "x", "b": true})));
        assert_eq!(url, "https://api.example.com/repos/o/r/x/x/true");
    }

    #[test]
    fn test_stringify_variants() {
        assert_eq!(stringify(&json!("abc")), "abc");
        assert_eq!(stringify(&json!(12)), "12");
        assert_eq!(stringify(&json!(null)), "null");
        assert_eq!(stringify(&json!(false)), "false");
        assert_eq!(stringify(&json!([1, 2])), "[1,2]");
    }
}
