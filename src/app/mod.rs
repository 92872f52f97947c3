//! Composition root: wires config, transport, templates and the router, and
//! runs the fetch/navigate loop that replaces a browser event loop.

pub mod router;
pub mod state;
pub mod views;

use std::rc::Rc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::fetch::{Fetcher, Transport};
use crate::navigation::{NavigationRequest, Navigator};
use crate::template::Templates;
use crate::view::{ActionItem, View, ViewAction, ViewContext};

pub use router::{Route, Router};

pub struct App {
    fetcher: Rc<Fetcher>,
    router: Router,
    templates: Rc<Templates>,
    requests: UnboundedReceiver<NavigationRequest>,
}

impl App {
    pub fn new(config: &AppConfig, transport: Rc<dyn Transport>) -> Result<Self, AppError> {
        let templates = Rc::new(Templates::load()?);
        let fetcher = Rc::new(Fetcher::new(config.service(), transport));
        let (navigator, requests) = Navigator::channel();
        let context = ViewContext {
            templates: Rc::clone(&templates),
            navigator,
        };
        tracing::debug!(server = %config.server, jsonp = config.jsonp, "Application ready");
        Ok(Self {
            router: Router::new(Rc::clone(&fetcher), context),
            fetcher,
            templates,
            requests,
        })
    }

    /// Route to `fragment` and wait for its data.
    pub async fn navigate(&mut self, fragment: &str) -> Result<Route, AppError> {
        let route = self.router.dispatch(fragment)?;
        self.settle().await?;
        Ok(route)
    }

    /// Run queued fetches and navigation requests until nothing is pending.
    pub async fn settle(&mut self) -> Result<(), AppError> {
        loop {
            self.fetcher.drain().await;
            let Ok(request) = self.requests.try_recv() else {
                return Ok(());
            };
            let result = match request {
                NavigationRequest::Navigate(fragment) => self.router.dispatch(&fragment),
                NavigationRequest::Back => self.router.back(),
            };
            match result {
                Ok(_) => {}
                Err(AppError::UnknownRoute(fragment)) => {
                    tracing::warn!(fragment = %fragment, "Ignoring navigation to unknown route");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Offer `action` to the mounted view and settle whatever it triggered.
    pub async fn perform(&mut self, action: &ViewAction) -> Result<bool, AppError> {
        let Some(view) = self.router.stage().current().cloned() else {
            return Ok(false);
        };
        let handled = view.handle(action);
        if handled {
            self.settle().await?;
        }
        Ok(handled)
    }

    pub fn actions(&self) -> Vec<ActionItem> {
        self.router
            .stage()
            .current()
            .map(|view| view.actions())
            .unwrap_or_default()
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.router.current_route()
    }

    /// Markup of the `#content` container.
    pub fn content_html(&self) -> String {
        self.router.stage().content().inner_html()
    }

    /// A standalone HTML document of the current screen.
    pub fn page_html(&self) -> Result<String, AppError> {
        let title = self
            .current_route()
            .map(Route::title)
            .unwrap_or_else(|| "Issues".to_string());
        Ok(self.templates.render_page(&title, &self.content_html())?)
    }
}
