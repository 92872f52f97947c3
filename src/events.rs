//! Named-event subscriber registry shared by models, collections and views.
//!
//! Everything here is single-threaded: sources are `Rc` handles and
//! identity is pointer identity, so two clones of the same source compare
//! equal under [`EventSource::ptr_eq`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::model::Model;

/// The event names a data source can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// One or more attributes of a model changed.
    Change,
    /// A collection's members were replaced wholesale.
    Reset,
    /// A single member was added to a collection.
    Add,
    /// A single member was removed from a collection.
    Remove,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Change => write!(f, "change"),
            EventKind::Reset => write!(f, "reset"),
            EventKind::Add => write!(f, "add"),
            EventKind::Remove => write!(f, "remove"),
        }
    }
}

/// An event as delivered to subscribers.
#[derive(Clone)]
pub enum Event {
    Change,
    Reset,
    Add(Model),
    Remove(Model),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Change => EventKind::Change,
            Event::Reset => EventKind::Reset,
            Event::Add(_) => EventKind::Add,
            Event::Remove(_) => EventKind::Remove,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Add(model) => write!(f, "Add({})", model.cid()),
            Event::Remove(model) => write!(f, "Remove({})", model.cid()),
            other => write!(f, "{}", other.kind()),
        }
    }
}

pub type Callback = Rc<dyn Fn(&Event)>;

/// Handle returned by [`EventSource::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, EventKind, Callback)>,
}

/// A cloneable handle to a set of event subscribers.
#[derive(Clone, Default)]
pub struct EventSource {
    inner: Rc<RefCell<Listeners>>,
}

impl EventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to `kind`.
    pub fn on(&self, kind: EventKind, callback: Callback) -> ListenerId {
        let mut listeners = self.inner.borrow_mut();
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        listeners.entries.push((id, kind, callback));
        id
    }

    /// Unsubscribe a listener. Returns `false` if it was already gone.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.inner.borrow_mut();
        let before = listeners.entries.len();
        listeners
            .entries
            .retain(|(entry_id, entry_kind, _)| !(*entry_id == id && *entry_kind == kind));
        listeners.entries.len() != before
    }

    /// Drop every subscriber.
    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }

    /// Deliver `event` to every subscriber of its kind, in subscription order.
    ///
    /// Callbacks are snapshotted before delivery, so a callback may subscribe
    /// or unsubscribe (including itself) without deadlocking the registry.
    pub fn trigger(&self, event: &Event) {
        let kind = event.kind();
        let callbacks: Vec<Callback> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|(_, entry_kind, _)| *entry_kind == kind)
            .map(|(_, _, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|(_, entry_kind, _)| *entry_kind == kind)
            .count()
    }

    pub fn ptr_eq(&self, other: &EventSource) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
