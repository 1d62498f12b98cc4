// Typed publish/subscribe used by the area controllers.

/// Handle returned by [`EventBus::on`]; pass it to [`EventBus::off`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E) + Send + Sync>;

pub struct EventBus<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }

    pub fn on<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns false when the id was not subscribed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    // Handlers run in subscription order.
    pub fn emit(&mut self, event: &E) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `next` into `cached` and queues an event when they differ.
pub(crate) fn track<T, E>(cached: &mut T, next: &T, event: impl FnOnce(T) -> E, out: &mut Vec<E>)
where
    T: PartialEq + Clone,
{
    if cached != next {
        *cached = next.clone();
        out.push(event(next.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn emit_reaches_every_subscriber_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::<u32>::new();

        let first = Arc::clone(&seen);
        bus.on(move |value| first.lock().expect("seen mutex poisoned").push(("a", *value)));
        let second = Arc::clone(&seen);
        bus.on(move |value| second.lock().expect("seen mutex poisoned").push(("b", *value)));

        bus.emit(&7);

        assert_eq!(*seen.lock().expect("seen mutex poisoned"), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn off_stops_delivery_to_that_subscriber_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::<u32>::new();

        let first = Arc::clone(&seen);
        let removed = bus.on(move |value| first.lock().expect("seen mutex poisoned").push(*value));
        let second = Arc::clone(&seen);
        bus.on(move |value| second.lock().expect("seen mutex poisoned").push(value * 10));

        assert!(bus.off(removed));
        assert!(!bus.off(removed));
        bus.emit(&2);

        assert_eq!(*seen.lock().expect("seen mutex poisoned"), vec![20]);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn track_only_queues_on_change() {
        let mut cached = 3;
        let mut out = Vec::new();

        track(&mut cached, &3, |v| v, &mut out);
        assert!(out.is_empty());

        track(&mut cached, &4, |v| v, &mut out);
        assert_eq!(out, vec![4]);
        assert_eq!(cached, 4);
    }
}
