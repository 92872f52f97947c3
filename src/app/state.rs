//! Per-route application state. Constructing a state queues the fetches it
//! needs; data arrives when the owning [`Fetcher`] drains.

use serde_json::json;

use crate::fetch::Fetcher;
use crate::model::{Collection, Model, attributes};
use crate::service::ServiceSpec;

pub const DEFAULT_PAGE: &str = "1";

/// State behind the paginated issue list.
#[derive(Clone)]
pub struct IssuesState {
    pub model: Model,
    pub issues: Collection,
}

impl IssuesState {
    pub fn new(page: Option<&str>, fetcher: &Fetcher) -> Self {
        let page = page.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_PAGE);
        let model = Model::new(attributes(json!({ "page": page })));
        let issues = Collection::new(ServiceSpec::ISSUES, attributes(json!({ "page": page })));
        fetcher.fetch(&issues);
        Self { model, issues }
    }

    pub fn page(&self) -> String {
        self.model
            .get_str("page")
            .unwrap_or_else(|| DEFAULT_PAGE.to_string())
    }
}

/// One issue plus its comments.
#[derive(Clone)]
pub struct IssueDetail {
    pub model: Model,
    pub comments: Collection,
}

impl IssueDetail {
    /// Creates the issue and queues the comments fetch. The issue itself is
    /// fetched by [`IssueDetail::fetch`].
    pub fn new(id: &str, fetcher: &Fetcher) -> Self {
        let model = Model::with_service(ServiceSpec::ISSUE, attributes(json!({ "id": id })));
        let comments = Collection::new(ServiceSpec::COMMENTS, attributes(json!({ "id": id })));
        fetcher.fetch(&comments);
        Self { model, comments }
    }

    pub fn fetch(&self, fetcher: &Fetcher) {
        fetcher.fetch(&self.model);
    }
}
