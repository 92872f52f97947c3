//! A small element tree standing in for the browser DOM.
//!
//! Each element carries its own template markup, ordered child elements and
//! named regions. A region is a placeholder inside the markup (emitted by the
//! `region` template helper) that a parent view fills with a child element.
//! Serialization splices region contents into the markup, then appends the
//! ordered children.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Opening of every region marker. Rendered user content must never
/// contain it, or the region would be spliced in twice.
pub const REGION_MARKER_PREFIX: &str = "<!--region:";

/// Markup emitted where region `name` will be spliced in.
pub fn region_marker(name: &str) -> String {
    format!("{}{}-->", REGION_MARKER_PREFIX, name)
}

#[derive(Default)]
struct ElementInner {
    tag: String,
    attributes: BTreeMap<String, String>,
    markup: String,
    children: Vec<Element>,
    regions: BTreeMap<String, Element>,
    parent: Weak<RefCell<ElementInner>>,
}

/// Shared handle to one element.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementInner>>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ElementInner {
                tag: tag.to_string(),
                ..Default::default()
            })),
        }
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.borrow().attributes.get(name).cloned()
    }

    /// Replace the element's content with `markup`, dropping every child
    /// and region.
    pub fn set_markup(&self, markup: String) {
        self.empty();
        self.inner.borrow_mut().markup = markup;
    }

    pub fn markup(&self) -> String {
        self.inner.borrow().markup.clone()
    }

    /// Remove all content: markup, children and regions.
    pub fn empty(&self) {
        let (children, regions) = {
            let mut inner = self.inner.borrow_mut();
            inner.markup.clear();
            (
                std::mem::take(&mut inner.children),
                std::mem::take(&mut inner.regions),
            )
        };
        for child in children.iter().chain(regions.values()) {
            child.inner.borrow_mut().parent = Weak::new();
        }
    }

    pub fn append(&self, child: &Element) {
        self.insert_child(child, None);
    }

    /// Append several children at once, preserving their order.
    pub fn append_all(&self, children: &[Element]) {
        for child in children {
            child.detach();
            child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        }
        self.inner
            .borrow_mut()
            .children
            .extend(children.iter().cloned());
    }

    pub fn prepend(&self, child: &Element) {
        self.insert_child(child, Some(0));
    }

    fn insert_child(&self, child: &Element, index: Option<usize>) {
        child.detach();
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();
        match index {
            Some(index) => inner.children.insert(index, child.clone()),
            None => inner.children.push(child.clone()),
        }
    }

    /// Mount `child` into region `name`, replacing (and detaching) whatever
    /// occupied it.
    pub fn set_region(&self, name: &str, child: &Element) {
        child.detach();
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        let previous = self
            .inner
            .borrow_mut()
            .regions
            .insert(name.to_string(), child.clone());
        if let Some(previous) = previous {
            previous.inner.borrow_mut().parent = Weak::new();
        }
    }

    pub fn region(&self, name: &str) -> Option<Element> {
        self.inner.borrow().regions.get(name).cloned()
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<Element> {
        self.inner
            .borrow()
            .parent
            .upgrade()
            .map(|inner| Element { inner })
    }

    /// Remove this element from its parent's children or regions.
    pub fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        {
            let mut parent_inner = parent.inner.borrow_mut();
            parent_inner.children.retain(|c| !c.ptr_eq(self));
            parent_inner.regions.retain(|_, c| !c.ptr_eq(self));
        }
        self.inner.borrow_mut().parent = Weak::new();
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Serialized content without the element's own tag.
    pub fn inner_html(&self) -> String {
        let inner = self.inner.borrow();
        let mut html = inner.markup.clone();
        for (name, region) in &inner.regions {
            html = html.replace(&region_marker(name), &region.outer_html());
        }
        for child in &inner.children {
            html.push_str(&child.outer_html());
        }
        html
    }

    pub fn outer_html(&self) -> String {
        let (tag, attributes) = {
            let inner = self.inner.borrow();
            (inner.tag.clone(), inner.attributes.clone())
        };
        let mut open = format!("<{}", tag);
        for (name, value) in &attributes {
            open.push_str(&format!(" {}=\"{}\"", name, value));
        }
        open.push('>');
        format!("{}{}</{}>", open, self.inner_html(), tag)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Element")
            .field("tag", &inner.tag)
            .field("children", &inner.children.len())
            .field("regions", &inner.regions.keys().collect::<Vec<_>>())
            .finish()
    }
}
