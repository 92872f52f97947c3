use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::{Value, json};

use super::{ActionItem, View, ViewAction, ViewContext};
use crate::dom::Element;
use crate::errors::ViewError;
use crate::events::{Event, EventKind, EventSource, ListenerId};
use crate::model::Model;

/// A subscription this node made on someone else's event source.
struct Binding {
    source: EventSource,
    kind: EventKind,
    listener: ListenerId,
}

/// State shared by every view: rendered element, bindings, children.
pub struct ViewNode {
    template: Option<&'static str>,
    element: Element,
    context: ViewContext,
    bindings: RefCell<Vec<Binding>>,
    children: RefCell<BTreeMap<String, Rc<dyn View>>>,
    events: EventSource,
    disposed: Cell<bool>,
}

impl ViewNode {
    pub fn new(tag: &str, template: Option<&'static str>, context: ViewContext) -> Self {
        Self {
            template,
            element: Element::new(tag),
            context,
            bindings: RefCell::new(Vec::new()),
            children: RefCell::new(BTreeMap::new()),
            events: EventSource::new(),
            disposed: Cell::new(false),
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    pub fn template(&self) -> Option<&'static str> {
        self.template
    }

    /// Events other parties subscribe to on this view.
    pub fn events(&self) -> &EventSource {
        &self.events
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    // ── Bindings ─────────────────────────────────────────────────────

    /// Subscribe to `kind` on `source` and remember it for `unbind_all`.
    pub fn bind<F>(&self, source: &EventSource, kind: EventKind, callback: F) -> &Self
    where
        F: Fn(&Event) + 'static,
    {
        let listener = source.on(kind, Rc::new(callback));
        self.bindings.borrow_mut().push(Binding {
            source: source.clone(),
            kind,
            listener,
        });
        self
    }

    /// Remove every recorded subscription from its source.
    pub fn unbind_all(&self) -> &Self {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        for binding in bindings {
            binding.source.off(binding.kind, binding.listener);
        }
        self
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Render this node's template against `data` into its element.
    pub fn render_template(&self, data: &Value) -> Result<(), ViewError> {
        if self.is_disposed() {
            return Err(ViewError::Disposed);
        }
        let markup = match self.template {
            Some(name) => self.context.templates.render(name, data)?,
            None => String::new(),
        };
        self.element.set_markup(markup);
        Ok(())
    }

    /// Render against a model's attributes, or an empty object without one.
    pub fn render_model(&self, model: Option<&Model>) -> Result<(), ViewError> {
        let data = model.map(Model::to_json).unwrap_or_else(|| json!({}));
        self.render_template(&data)
    }

    // ── Children ─────────────────────────────────────────────────────

    /// Own `view` under `key`, disposing any view previously stored there.
    pub fn set_child(&self, key: impl Into<String>, view: Rc<dyn View>) {
        let previous = self.children.borrow_mut().insert(key.into(), view);
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    /// Drop and dispose the child under `key`. Returns whether one existed.
    pub fn remove_child(&self, key: &str) -> bool {
        let removed = self.children.borrow_mut().remove(key);
        match removed {
            Some(view) => {
                view.dispose();
                true
            }
            None => false,
        }
    }

    pub fn child(&self, key: &str) -> Option<Rc<dyn View>> {
        self.children.borrow().get(key).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn child_keys(&self) -> Vec<String> {
        self.children.borrow().keys().cloned().collect()
    }

    /// Dispose every child and clear the child map.
    pub fn dispose_children(&self) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children.values() {
            child.dispose();
        }
    }

    pub(crate) fn forward(&self, action: &ViewAction) -> bool {
        let children: Vec<Rc<dyn View>> = self.children.borrow().values().cloned().collect();
        children.iter().any(|child| child.handle(action))
    }

    pub(crate) fn child_actions(&self) -> Vec<ActionItem> {
        let children: Vec<Rc<dyn View>> = self.children.borrow().values().cloned().collect();
        children.iter().flat_map(|child| child.actions()).collect()
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Release everything this node holds. Children go first, then the
    /// node's own bindings, then listeners on the node, then its element.
    /// A second call is a no-op.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.dispose_children();
        self.unbind_all();
        self.events.clear();
        self.element.detach();
        self.element.empty();
    }
}

impl Drop for ViewNode {
    fn drop(&mut self) {
        if !self.disposed.get() && !self.bindings.borrow().is_empty() {
            tracing::debug!(
                template = self.template.unwrap_or("-"),
                bindings = self.bindings.borrow().len(),
                "View dropped without dispose; releasing bindings"
            );
            self.unbind_all();
        }
    }
}
