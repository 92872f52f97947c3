//! View layer: nodes that render templates into elements, track their
//! bindings to data sources, and own child views.
//!
//! ## Lifecycle
//!
//! ```text
//! create (parent or router) ─> render ─┬─> re-render on bound events
//!                                      └─> dispose (exactly once, by owner)
//!                                            1. children, post-order
//!                                            2. own bindings
//!                                            3. inbound listeners
//!                                            4. detach + empty element
//! ```
//!
//! Concrete views embed a [`ViewNode`] and implement [`View`]. Bound
//! callbacks hold only a `Weak` reference back to their view, so a data
//! source never keeps a view alive.

mod collection;
mod node;

use std::rc::Rc;

pub use collection::{CollectionView, ItemFactory};
pub use node::ViewNode;

use crate::dom::Element;
use crate::errors::ViewError;
use crate::events::Event;
use crate::navigation::Navigator;
use crate::template::Templates;

/// What every view needs from its surroundings.
#[derive(Clone)]
pub struct ViewContext {
    pub templates: Rc<Templates>,
    pub navigator: Navigator,
}

/// User interactions a view may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Open the issue with this number.
    Select { number: u64 },
    Previous,
    Next,
    Back,
}

/// An action currently offered by the mounted view tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    pub label: String,
    pub action: ViewAction,
}

impl ActionItem {
    pub fn new(label: impl Into<String>, action: ViewAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

pub trait View {
    fn node(&self) -> &ViewNode;

    /// Replace the element's content with a fresh rendering. Safe to call
    /// repeatedly; not valid after `dispose`.
    fn render(&self) -> Result<(), ViewError>;

    /// React to `action`, returning whether it was consumed. By default the
    /// action is offered to each child in turn.
    fn handle(&self, action: &ViewAction) -> bool {
        self.node().forward(action)
    }

    /// Actions this subtree currently offers.
    fn actions(&self) -> Vec<ActionItem> {
        self.node().child_actions()
    }

    fn element(&self) -> Element {
        self.node().element().clone()
    }

    fn dispose(&self) {
        self.node().dispose();
    }
}

/// Wrap a view method as a binding callback. The callback holds the view
/// weakly and logs render failures instead of propagating them.
pub fn weak_callback<V, F>(view: &Rc<V>, handler: F) -> impl Fn(&Event) + 'static
where
    V: 'static,
    F: Fn(&V, &Event) -> Result<(), ViewError> + 'static,
{
    let weak = Rc::downgrade(view);
    move |event: &Event| {
        let Some(view) = weak.upgrade() else {
            return;
        };
        if let Err(e) = handler(&view, event) {
            tracing::error!(event = ?event, error = %e, "View failed to update");
        }
    }
}
