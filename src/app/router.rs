//! Hash-fragment routing.
//!
//! | fragment       | route                     |
//! |----------------|---------------------------|
//! | `""`           | issues, page 1            |
//! | `issues/:page` | issues, that page         |
//! | `issue/:id`    | one issue with comments   |

use std::rc::Rc;

use super::state::{DEFAULT_PAGE, IssueDetail, IssuesState};
use super::views::{IssueView, IssuesView};
use crate::dom::Element;
use crate::errors::AppError;
use crate::fetch::Fetcher;
use crate::view::{View, ViewContext};

/// Routes remembered for `back`. Older entries are forgotten.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Issues { page: String },
    Issue { id: String },
}

impl Route {
    pub fn parse(fragment: &str) -> Result<Self, AppError> {
        let fragment = fragment.trim_start_matches('#');
        if fragment.is_empty() {
            return Ok(Route::Issues {
                page: DEFAULT_PAGE.to_string(),
            });
        }
        match fragment.split_once('/') {
            Some(("issues", page)) if !page.is_empty() && !page.contains('/') => Ok(Route::Issues {
                page: page.to_string(),
            }),
            Some(("issue", id)) if !id.is_empty() && !id.contains('/') => Ok(Route::Issue {
                id: id.to_string(),
            }),
            _ => Err(AppError::UnknownRoute(fragment.to_string())),
        }
    }

    pub fn fragment(&self) -> String {
        match self {
            Route::Issues { page } => format!("issues/{}", page),
            Route::Issue { id } => format!("issue/{}", id),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Route::Issues { page } => format!("Issues (page {})", page),
            Route::Issue { id } => format!("Issue #{}", id),
        }
    }
}

/// The `#content` container and the top-level view mounted in it.
pub struct Stage {
    content: Element,
    current: Option<Rc<dyn View>>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    pub fn new() -> Self {
        Self {
            content: Element::new("div").with_attribute("id", "content"),
            current: None,
        }
    }

    pub fn content(&self) -> &Element {
        &self.content
    }

    pub fn current(&self) -> Option<&Rc<dyn View>> {
        self.current.as_ref()
    }

    /// Replace the mounted view. The previous one is disposed first.
    pub fn mount(&mut self, view: Rc<dyn View>) {
        if let Some(previous) = self.current.take() {
            previous.dispose();
        }
        self.content.empty();
        self.content.append(&view.element());
        self.current = Some(view);
    }

    pub fn unmount(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.dispose();
        }
        self.content.empty();
    }
}

/// Builds the state and view for a route and mounts it.
pub struct Router {
    fetcher: Rc<Fetcher>,
    context: ViewContext,
    stage: Stage,
    history: Vec<Route>,
}

impl Router {
    pub fn new(fetcher: Rc<Fetcher>, context: ViewContext) -> Self {
        Self {
            fetcher,
            context,
            stage: Stage::new(),
            history: Vec::new(),
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.history.last()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Route `fragment`, queue the fetches it needs and mount its view.
    pub fn dispatch(&mut self, fragment: &str) -> Result<Route, AppError> {
        let route = Route::parse(fragment)?;
        self.show(&route)?;
        self.remember(route.clone());
        Ok(route)
    }

    /// Record `route` unless it repeats the current one, keeping at most
    /// `MAX_HISTORY` entries.
    fn remember(&mut self, route: Route) {
        if self.history.last() == Some(&route) {
            return;
        }
        self.history.push(route);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    /// Return to the previous route. With no history left the issue list is
    /// shown.
    pub fn back(&mut self) -> Result<Route, AppError> {
        self.history.pop();
        let route = self.history.last().cloned().unwrap_or(Route::Issues {
            page: DEFAULT_PAGE.to_string(),
        });
        self.show(&route)?;
        if self.history.is_empty() {
            self.history.push(route.clone());
        }
        Ok(route)
    }

    fn show(&mut self, route: &Route) -> Result<(), AppError> {
        tracing::info!(route = %route.fragment(), "Routing");
        let view: Rc<dyn View> = match route {
            Route::Issues { page } => {
                let state = IssuesState::new(Some(page.as_str()), &self.fetcher);
                IssuesView::new(state, self.context.clone())
            }
            Route::Issue { id } => {
                let detail = IssueDetail::new(id, &self.fetcher);
                detail.fetch(&self.fetcher);
                IssueView::new(detail, self.context.clone())
            }
        };
        view.render()?;
        self.stage.mount(view);
        Ok(())
    }
}
