use std::cell::RefCell;
use std::rc::Rc;

use super::{ActionItem, View, ViewAction, ViewContext, ViewNode, weak_callback};
use crate::errors::ViewError;
use crate::events::{Event, EventKind};
use crate::model::{Collection, Model};

/// Builds the item renderer for one collection member.
pub type ItemFactory = Rc<dyn Fn(&Model, &ViewContext) -> Rc<dyn View>>;

/// Renders a collection as a list of item views.
///
/// - `reset`: every item view is disposed and the list rebuilt in collection
///   order, attached as one batch.
/// - `add`: the new item is rendered and prepended (newest first).
/// - `remove`: the matching item view is disposed.
///
/// Item views are keyed by the member's `cid`.
pub struct CollectionView {
    node: ViewNode,
    collection: Collection,
    factory: ItemFactory,
    order: RefCell<Vec<String>>,
}

impl CollectionView {
    pub fn new(
        collection: Collection,
        tag: &str,
        class: &str,
        context: ViewContext,
        factory: ItemFactory,
    ) -> Rc<Self> {
        let view = Rc::new(Self {
            node: ViewNode::new(tag, None, context),
            collection,
            factory,
            order: RefCell::new(Vec::new()),
        });
        view.node.element().set_attribute("class", class);

        let events = view.collection.events().clone();
        view.node
            .bind(&events, EventKind::Reset, weak_callback(&view, |v, _| v.render()))
            .bind(&events, EventKind::Add, weak_callback(&view, |v, event| match event {
                Event::Add(model) => v.add(model),
                _ => Ok(()),
            }))
            .bind(&events, EventKind::Remove, weak_callback(&view, |v, event| {
                if let Event::Remove(model) = event {
                    v.remove(model);
                }
                Ok(())
            }));
        view
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Keys of the item views in rendered order.
    pub fn item_keys(&self) -> Vec<String> {
        self.order.borrow().clone()
    }

    pub fn item(&self, cid: &str) -> Option<Rc<dyn View>> {
        self.node.child(cid)
    }

    fn create_item(&self, model: &Model) -> Result<Rc<dyn View>, ViewError> {
        let item = (self.factory)(model, self.node.context());
        item.render()?;
        self.node.set_child(model.cid(), Rc::clone(&item));
        Ok(item)
    }

    /// Render one new member and prepend it.
    pub fn add(&self, model: &Model) -> Result<(), ViewError> {
        if self.node.is_disposed() {
            return Err(ViewError::Disposed);
        }
        let item = self.create_item(model)?;
        self.node.element().prepend(&item.element());
        let mut order = self.order.borrow_mut();
        order.retain(|key| key != model.cid());
        order.insert(0, model.cid().to_string());
        Ok(())
    }

    /// Dispose the item view rendering `model`, if any.
    pub fn remove(&self, model: &Model) {
        if self.node.remove_child(model.cid()) {
            self.order.borrow_mut().retain(|key| key != model.cid());
        }
    }
}

impl View for CollectionView {
    fn node(&self) -> &ViewNode {
        &self.node
    }

    fn render(&self) -> Result<(), ViewError> {
        self.node.dispose_children();
        self.order.borrow_mut().clear();
        self.node.render_template(&serde_json::json!({}))?;

        let members = self.collection.members();
        let mut batch = Vec::with_capacity(members.len());
        let mut order = Vec::with_capacity(members.len());
        for model in &members {
            let item = self.create_item(model)?;
            batch.push(item.element());
            order.push(model.cid().to_string());
        }
        self.node.element().append_all(&batch);
        *self.order.borrow_mut() = order;
        Ok(())
    }

    fn handle(&self, action: &ViewAction) -> bool {
        self.item_keys()
            .iter()
            .filter_map(|key| self.node.child(key))
            .any(|item| item.handle(action))
    }

    fn actions(&self) -> Vec<ActionItem> {
        self.item_keys()
            .iter()
            .filter_map(|key| self.node.child(key))
            .flat_map(|item| item.actions())
            .collect()
    }
}
