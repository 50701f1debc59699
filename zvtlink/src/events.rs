//! Observer-style event registration
//!
//! Each event surface is a list of handler callbacks keyed by id.
//! Registration and deregistration are idempotent; handlers run on the
//! link driver task and must not block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Opaque handle returned by [`EventHandlers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// One event surface with any number of subscribers
pub struct EventHandlers<T> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, Handler<T>)>>,
}

impl<T> EventHandlers<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Register a handler; it fires for every subsequent event
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> HandlerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().push((id, Arc::new(handler)));
        HandlerId(id)
    }

    /// Remove a handler; unknown ids are ignored
    pub fn unsubscribe(&self, id: HandlerId) {
        self.handlers.lock().retain(|(existing, _)| *existing != id.0);
    }

    /// Drop all handlers
    pub fn clear(&self) {
        self.handlers.lock().clear();
    }

    /// Invoke every registered handler in subscription order
    ///
    /// Handlers are cloned out of the lock first, so a handler may
    /// subscribe or unsubscribe without deadlocking.
    pub fn emit(&self, event: &T) {
        let handlers: Vec<Handler<T>> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            handler(event);
        }
    }
}

impl<T> Default for EventHandlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subscribe_and_emit() {
        let events = EventHandlers::<String>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        events.subscribe(move |text: &String| {
            seen_clone.lock().push(text.clone());
        });

        events.emit(&"first".to_owned());
        events.emit(&"second".to_owned());

        assert_eq!(seen.lock().as_slice(), &["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let events = EventHandlers::<u32>::new();
        let count = Arc::new(AtomicU64::new(0));

        let count_clone = count.clone();
        let id = events.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::Relaxed);
        });

        events.emit(&1);
        events.unsubscribe(id);
        events.unsubscribe(id);
        events.emit(&2);

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_handlers_fire_in_subscription_order() {
        let events = EventHandlers::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let order = order.clone();
            events.subscribe(move |_| order.lock().push(tag));
        }

        events.emit(&());
        assert_eq!(order.lock().as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn test_clear() {
        let events = EventHandlers::<()>::new();
        let count = Arc::new(AtomicU64::new(0));

        let count_clone = count.clone();
        events.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::Relaxed);
        });

        events.clear();
        events.emit(&());
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}
