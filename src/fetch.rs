//! Request queue between resources and the network.
//!
//! Resources never perform I/O themselves. `Fetcher::fetch` resolves the
//! resource's URL and queues it; `Fetcher::drain` runs queued requests one at
//! a time and hands each response to the resource's `parse`/`apply`, which
//! fires the events that re-render bound views. Failures are logged and
//! dropped: the resource simply never receives data.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::links::ServiceResponse;
use crate::service::{ServiceConfig, ServiceResource};

/// Performs a GET and returns the `{meta, data}` envelope.
#[async_trait(?Send)]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<ServiceResponse, FetchError>;
}

type Completion = Box<dyn FnOnce(ServiceResponse)>;

struct PendingFetch {
    url: String,
    complete: Completion,
}

pub struct Fetcher {
    config: ServiceConfig,
    transport: Rc<dyn Transport>,
    queue: RefCell<VecDeque<PendingFetch>>,
}

impl Fetcher {
    pub fn new(config: ServiceConfig, transport: Rc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            queue: RefCell::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Queue a fetch of `resource`. Returns the resolved URL.
    pub fn fetch<R>(&self, resource: &R) -> String
    where
        R: ServiceResource + Clone + 'static,
    {
        let url = resource.url_for(&self.config);
        let target = resource.clone();
        tracing::debug!(url = %url, "Queued fetch");
        self.queue.borrow_mut().push_back(PendingFetch {
            url: url.clone(),
            complete: Box::new(move |response| {
                let data = target.parse(response);
                target.apply(data);
            }),
        });
        url
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run queued requests until the queue is empty, including any queued
    /// by completions along the way. Returns how many requests succeeded.
    pub async fn drain(&self) -> usize {
        let mut completed = 0;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(pending) = next else {
                break;
            };
            match self.transport.get(&pending.url).await {
                Ok(response) => {
                    tracing::debug!(url = %pending.url, "Fetch completed");
                    (pending.complete)(response);
                    completed += 1;
                }
                Err(e) => {
                    tracing::warn!(url = %pending.url, error = %e, "Fetch failed; leaving view empty");
                }
            }
        }
        completed
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingTransport;
    use super::*;
    use crate::links::LinkEntry;
    use crate::model::{Collection, Model, attributes};
    use crate::service::ServiceSpec;
    use serde_json::json;

    const BASE: &str = "https://api.example.com/repos/o/r";

    fn fetcher(transport: &Rc<RecordingTransport>) -> Fetcher {
        Fetcher::new(
            ServiceConfig {
                server: BASE.to_string(),
                jsonp: false,
            },
            transport.clone(),
        )
    }

    #[tokio::test]
    async fn test_fetch_applies_model_response() {
        let transport = Rc::new(RecordingTransport::new());
        transport.respond(
            &format!("{}/issues/5", BASE),
            ServiceResponse::new(json!({"id": 5, "title": "Broken"})),
        );
        let fetcher = fetcher(&transport);
        let issue = Model::with_service(ServiceSpec::ISSUE, attributes(json!({"id": "5"})));

        let url = fetcher.fetch(&issue);
        assert_eq!(url, format!("{}/issues/5", BASE));
        assert_eq!(issue.get("title"), None);
        assert_eq!(fetcher.pending(), 1);

        assert_eq!(fetcher.drain().await, 1);
        assert_eq!(issue.get_str("title").as_deref(), Some("Broken"));
        assert_eq!(fetcher.pending(), 0);
    }

    #[tokio::test]
    async fn test_fetch_resets_collection_and_links() {
        let transport = Rc::new(RecordingTransport::new());
        transport.respond(
            &format!("{}/issues?page=2", BASE),
            ServiceResponse::new(json!([{"number": 1}, {"number": 2}]))
                .with_links(vec![LinkEntry::new(format!("{}/issues?page=3", BASE), "next")]),
        );
        let fetcher = fetcher(&transport);
        let issues = Collection::new(ServiceSpec::ISSUES, attributes(json!({"page": "2"})));

        fetcher.fetch(&issues);
        fetcher.drain().await;

        assert_eq!(issues.len(), 2);
        assert_eq!(issues.links().page("next"), Some("3"));
        assert!(!issues.links().is_available("prev"));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_resource_untouched() {
        let transport = Rc::new(RecordingTransport::new());
        let fetcher = fetcher(&transport);
        let comments = Collection::new(ServiceSpec::COMMENTS, attributes(json!({"id": 9})));

        fetcher.fetch(&comments);
        assert_eq!(fetcher.drain().await, 0);

        assert!(comments.is_empty());
        assert_eq!(transport.requests(), vec![format!("{}/issues/9/comments", BASE)]);
    }
}
