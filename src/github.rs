use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, LINK};

use crate::errors::FetchError;
use crate::fetch::Transport;
use crate::links::{ResponseMeta, ServiceResponse, parse_link_header};

const GITHUB_API_REPOS_URL: &str = "https://api.github.com/repos";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// API base for a repository given as `owner/repo` or as a GitHub URL.
pub fn api_base_for(repo: &str) -> Option<String> {
    let slug = if repo.starts_with("https://") {
        parse_owner_repo_from_url(repo)?
    } else {
        let parts: Vec<&str> = repo.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        repo.to_string()
    };
    Some(format!("{}/{}", GITHUB_API_REPOS_URL, slug))
}

/// Parse the `owner/repo` slug from a GitHub URL.
///
/// Handles:
/// - `https://github.com/owner/repo`
/// - `https://github.com/owner/repo.git`
/// - `https://api.github.com/repos/owner/repo`
pub fn parse_owner_repo_from_url(url: &str) -> Option<String> {
    let rest = url.strip_prefix("https://")?;
    let repo_path = rest
        .strip_prefix("github.com/")
        .or_else(|| rest.strip_prefix("api.github.com/repos/"))?;
    let repo_path = repo_path.trim_end_matches('/');
    let repo_path = repo_path.strip_suffix(".git").unwrap_or(repo_path);

    // Validate it looks like "owner/repo" (exactly two segments)
    let parts: Vec<&str> = repo_path.split('/').collect();
    if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        Some(format!("{}/{}", parts[0], parts[1]))
    } else {
        None
    }
}

/// Strip a JSONP wrapper (`/**/cb({...})`) and return the JSON inside.
pub fn unwrap_jsonp(body: &str) -> Option<&str> {
    let start = body.find('(')?;
    let end = body.rfind(')')?;
    if end <= start {
        return None;
    }
    Some(body[start + 1..end].trim())
}

/// Turn a response body into the `{meta, data}` envelope.
///
/// JSONP bodies already carry the envelope; plain JSON bodies are wrapped,
/// with `meta` built from the status and `Link` header.
pub fn decode_body(
    url: &str,
    body: &str,
    status: u16,
    link_header: Option<&str>,
) -> Result<ServiceResponse, FetchError> {
    let trimmed = body.trim_start();
    let is_jsonp = !trimmed.starts_with('{') && !trimmed.starts_with('[') && trimmed.contains('(');
    if is_jsonp {
        let inner = unwrap_jsonp(trimmed).ok_or_else(|| FetchError::Jsonp {
            url: url.to_string(),
        })?;
        return serde_json::from_str(inner).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        });
    }

    let data = serde_json::from_str(body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })?;
    Ok(ServiceResponse {
        meta: ResponseMeta {
            status: Some(status),
            link: link_header.map(parse_link_header).unwrap_or_default(),
        },
        data,
    })
}

/// Unauthenticated GitHub REST transport.
pub struct GitHubTransport {
    client: reqwest::Client,
}

impl GitHubTransport {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait(?Send)]
impl Transport for GitHubTransport {
    async fn get(&self, url: &str) -> Result<ServiceResponse, FetchError> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let link_header = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        decode_body(url, &body, status.as_u16(), link_header.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── api_base_for ─────────────────────────────────────────────────

    #[test]
    fn test_api_base_from_slug() {
        assert_eq!(
            api_base_for("rails/rails"),
            Some("https://api.github.com/repos/rails/rails".to_string())
        );
    }

    #[test]
    fn test_api_base_from_url() {
        assert_eq!(
            api_base_for("https://github.com/tokio-rs/axum.git"),
            Some("https://api.github.com/repos/tokio-rs/axum".to_string())
        );
    }

    #[test]
    fn test_api_base_rejects_bad_slug() {
        assert_eq!(api_base_for("rails"), None);
        assert_eq!(api_base_for("a/b/c"), None);
        assert_eq!(api_base_for("/rails"), None);
    }

    // ── parse_owner_repo_from_url ────────────────────────────────────

    #[test]
    fn test_parse_simple_https_url() {
        assert_eq!(
            parse_owner_repo_from_url("https://github.com/owner/repo"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_parse_https_url_with_git_suffix() {
        assert_eq!(
            parse_owner_repo_from_url("https://github.com/owner/repo.git"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_parse_api_url() {
        assert_eq!(
            parse_owner_repo_from_url("https://api.github.com/repos/owner/repo/"),
            Some("owner/repo".to_string())
        );
    }

    #[test]
    fn test_parse_url_missing_repo() {
        assert_eq!(parse_owner_repo_from_url("https://github.com/owner"), None);
    }

    #[test]
    fn test_parse_url_too_many_segments() {
        assert_eq!(
            parse_owner_repo_from_url("https://github.com/owner/repo/extra"),
            None
        );
    }

    #[test]
    fn test_parse_non_github_url() {
        assert_eq!(
            parse_owner_repo_from_url("https://gitlab.com/owner/repo"),
            None
        );
    }

    #[test]
    fn test_parse_ssh_url_returns_none() {
        assert_eq!(
            parse_owner_repo_from_url("git@github.com:owner/repo.git"),
            None
        );
    }

    // ── decode_body ──────────────────────────────────────────────────

    #[test]
    fn test_decode_plain_json_with_link_header() {
        let body = r#"[{"number": 12, "title": "Flaky test"}]"#;
        let link = r#"<https://api.github.com/repos/o/r/issues?page=2>; rel="next""#;
        let response = decode_body("u", body, 200, Some(link)).unwrap();

        assert_eq!(response.meta.status, Some(200));
        assert_eq!(response.meta.link.len(), 1);
        assert_eq!(response.meta.link[0].rel(), "next");
        assert_eq!(response.data[0]["number"], 12);
    }

    #[test]
    fn test_decode_plain_json_without_link_header() {
        let response = decode_body("u", r#"{"id": 1}"#, 200, None).unwrap();
        assert!(response.meta.link.is_empty());
        assert_eq!(response.data["id"], 1);
    }

    #[test]
    fn test_decode_jsonp_envelope() {
        let body = r#"/**/cb({"meta":{"status":200,"Link":[["https://x/issues?callback=cb&page=2",{"rel":"next"}]]},"data":[{"number":3}]})"#;
        let response = decode_body("u", body, 200, None).unwrap();

        assert_eq!(response.meta.link[0].rel(), "next");
        assert_eq!(response.data[0]["number"], 3);
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode_body("https://x/issues", "not json", 200, None).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn test_decode_truncated_jsonp() {
        let err = decode_body("https://x/issues", "cb({\"data\": 1}", 200, None).unwrap_err();
        assert!(matches!(err, FetchError::Jsonp { .. }));
    }

    #[test]
    fn test_unwrap_jsonp() {
        assert_eq!(unwrap_jsonp("cb({\"a\":1})"), Some("{\"a\":1}"));
        assert_eq!(unwrap_jsonp("{\"a\":1}"), None);
    }
}
