//! Models and collections: attribute bags that emit events when they change.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use crate::events::{Event, EventSource};
use crate::links::{PageLinks, ServiceResponse, extract_page_links};
use crate::service::{ServiceResource, ServiceSpec};

pub type Attributes = Map<String, Value>;

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

fn next_cid() -> String {
    format!("c{}", NEXT_CID.fetch_add(1, Ordering::Relaxed))
}

/// Build an attribute map from a JSON value; non-objects yield an empty map.
pub fn attributes(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}

struct ModelInner {
    cid: String,
    service: ServiceSpec,
    attributes: RefCell<Attributes>,
    events: EventSource,
}

/// A single entity. Cloning yields another handle to the same model.
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

impl Model {
    pub fn new(attributes: Attributes) -> Self {
        Self::with_service(ServiceSpec::NONE, attributes)
    }

    pub fn with_service(service: ServiceSpec, attributes: Attributes) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                cid: next_cid(),
                service,
                attributes: RefCell::new(attributes),
                events: EventSource::new(),
            }),
        }
    }

    /// Client-side identity, unique for the life of the process.
    pub fn cid(&self) -> &str {
        &self.inner.cid
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.attributes.borrow().get(key).cloned()
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| crate::service::stringify(&value))
    }

    /// Merge `changes` into the attributes. Fires `change` once if any value
    /// actually differed; returns whether it did.
    pub fn set(&self, changes: Attributes) -> bool {
        let changed = {
            let mut attrs = self.inner.attributes.borrow_mut();
            let mut changed = false;
            for (key, value) in changes {
                if attrs.get(&key) != Some(&value) {
                    attrs.insert(key, value);
                    changed = true;
                }
            }
            changed
        };
        if changed {
            self.inner.events.trigger(&Event::Change);
        }
        changed
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.inner.attributes.borrow().clone())
    }

    pub fn events(&self) -> &EventSource {
        &self.inner.events
    }

    pub fn ptr_eq(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("cid", &self.inner.cid)
            .field("attributes", &self.inner.attributes.borrow())
            .finish()
    }
}

impl ServiceResource for Model {
    fn service(&self) -> &ServiceSpec {
        &self.inner.service
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name)
    }

    fn apply(&self, data: Value) {
        match data {
            Value::Object(map) => {
                self.set(map);
            }
            other => tracing::warn!(cid = self.cid(), payload = %other, "Ignoring non-object model payload"),
        }
    }
}

struct CollectionInner {
    service: ServiceSpec,
    options: Attributes,
    members: RefCell<Vec<Model>>,
    links: RefCell<PageLinks>,
    events: EventSource,
}

/// An ordered list of models sharing an endpoint.
#[derive(Clone)]
pub struct Collection {
    inner: Rc<CollectionInner>,
}

impl Collection {
    /// `options` are the collection's own attributes (`page`, `id`, ...),
    /// used to resolve its service URL.
    pub fn new(service: ServiceSpec, options: Attributes) -> Self {
        Self {
            inner: Rc::new(CollectionInner {
                service,
                options,
                members: RefCell::new(Vec::new()),
                links: RefCell::new(PageLinks::default()),
                events: EventSource::new(),
            }),
        }
    }

    pub fn option(&self, name: &str) -> Option<Value> {
        self.inner.options.get(name).cloned()
    }

    /// Replace all members and fire `reset`.
    pub fn reset(&self, models: Vec<Model>) {
        *self.inner.members.borrow_mut() = models;
        self.inner.events.trigger(&Event::Reset);
    }

    /// Replace all members from a JSON array of objects.
    pub fn reset_from_json(&self, data: Value) {
        let models = match data {
            Value::Array(items) => items.into_iter().map(|item| Model::new(attributes(item))).collect(),
            Value::Null => Vec::new(),
            other => {
                tracing::warn!(payload = %other, "Collection payload is not an array; resetting to empty");
                Vec::new()
            }
        };
        self.reset(models);
    }

    /// Append `model` and fire `add`.
    pub fn add(&self, model: Model) {
        self.inner.members.borrow_mut().push(model.clone());
        self.inner.events.trigger(&Event::Add(model));
    }

    /// Remove the member with client id `cid`, firing `remove` if found.
    pub fn remove(&self, cid: &str) -> Option<Model> {
        let removed = {
            let mut members = self.inner.members.borrow_mut();
            let index = members.iter().position(|m| m.cid() == cid)?;
            members.remove(index)
        };
        self.inner.events.trigger(&Event::Remove(removed.clone()));
        Some(removed)
    }

    pub fn get(&self, cid: &str) -> Option<Model> {
        self.inner.members.borrow().iter().find(|m| m.cid() == cid).cloned()
    }

    /// Snapshot of the members in order.
    pub fn members(&self) -> Vec<Model> {
        self.inner.members.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.members.borrow().is_empty()
    }

    /// Pagination links from the most recent fetch.
    pub fn links(&self) -> PageLinks {
        self.inner.links.borrow().clone()
    }

    pub fn events(&self) -> &EventSource {
        &self.inner.events
    }

    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("template", &self.inner.service.template)
            .field("len", &self.len())
            .finish()
    }
}

impl ServiceResource for Collection {
    fn service(&self) -> &ServiceSpec {
        &self.inner.service
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.option(name)
    }

    fn parse(&self, response: ServiceResponse) -> Value {
        if self.inner.service.paginated {
            *self.inner.links.borrow_mut() = extract_page_links(&response.meta.link);
        }
        response.data
    }

    fn apply(&self, data: Value) {
        self.reset_from_json(data);
    }
}
