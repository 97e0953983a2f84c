//! Editor notifications
//!
//! Observers register a callback and get back a [`Subscription`]; dropping
//! the subscription unregisters the callback.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::element::ElementType;

/// Notifications emitted by the editing session
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Selection sets changed
    SelectionChanged,
    /// A point was added to the selection by a pick or explicit select
    PointSelected { element_id: usize },
    /// Selection mode changed
    ModeChanged { mode: ElementType },
    /// History entries or the current index changed
    HistoryChanged { current: usize, len: usize },
    /// Geometry of a shape changed and was re-indexed
    ShapeInvalidated { shape_index: usize },
    /// Views should redraw
    RedrawRequested,
}

type Listener = Rc<RefCell<dyn FnMut(&EditorEvent)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Single-threaded observer registry
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every event
    #[must_use = "the callback is unregistered when the subscription is dropped"]
    pub fn subscribe(&self, listener: impl FnMut(&EditorEvent) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        registry.listeners.push((id, listener));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every registered callback in registration order
    ///
    /// Callbacks may subscribe or unsubscribe while the event is delivered;
    /// the change applies from the next event. A callback that emits on the
    /// same bus is not re-entered.
    pub fn emit(&self, event: &EditorEvent) {
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            if let Ok(mut callback) = listener.try_borrow_mut() {
                callback(event);
            }
        }
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Handle keeping a callback registered
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Unregister the callback now
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_subscribers() {
        let bus = EventBus::new();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let _subscription = bus.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        bus.emit(&EditorEvent::SelectionChanged);
        bus.emit(&EditorEvent::ShapeInvalidated { shape_index: 1 });
        assert_eq!(
            *received.borrow(),
            vec![
                EditorEvent::SelectionChanged,
                EditorEvent::ShapeInvalidated { shape_index: 1 }
            ]
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let subscription = bus.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(bus.listener_count(), 1);

        bus.emit(&EditorEvent::RedrawRequested);
        drop(subscription);
        bus.emit(&EditorEvent::RedrawRequested);

        assert_eq!(count.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_bus() {
        let bus = EventBus::new();
        let subscription = bus.subscribe(|_| {});
        drop(bus);
        subscription.unsubscribe();
    }

    #[test]
    fn test_reentrant_emit_is_skipped() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let _subscription = bus.subscribe(move |event| {
            counter.set(counter.get() + 1);
            if *event == EditorEvent::SelectionChanged {
                inner_bus.emit(&EditorEvent::RedrawRequested);
            }
        });

        bus.emit(&EditorEvent::SelectionChanged);
        assert_eq!(count.get(), 1);
    }
}
