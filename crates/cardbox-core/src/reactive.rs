//! Observable fields for model entities.
//!
//! Each entity owns an [`Observers`] registry. Setters store the new value and
//! then call [`Observers::notify`], which runs every callback registered for
//! that field synchronously, before the setter returns.
//!
//! While a notification runs, the entity is mutably borrowed by its own
//! setter, so a callback can never reach back into the entity it observes.
//! Two-way bound controls use `silently` on the entity instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Subscription ids are unique across all registries, so a stale id can never
/// remove somebody else's subscription.
static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(0);

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A single change delivered to subscribers.
#[derive(Debug)]
pub struct Notification<'a, F, V> {
    /// Channel of the entity at the time of the change (id-derived).
    pub topic: &'a str,
    /// Which field changed.
    pub field: F,
    /// The new value.
    pub value: &'a V,
}

type Callback<F, V> = Box<dyn FnMut(&Notification<'_, F, V>)>;

struct Subscriber<F, V> {
    id: SubscriptionId,
    field: F,
    callback: Callback<F, V>,
}

/// Per-entity subscriber registry.
pub struct Observers<F, V> {
    topic: String,
    muted: bool,
    subscribers: Vec<Subscriber<F, V>>,
}

impl<F, V> Observers<F, V>
where
    F: Copy + PartialEq + fmt::Debug,
{
    /// Create an empty registry addressed to `topic`.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            muted: false,
            subscribers: Vec::new(),
        }
    }

    /// Current channel name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Re-address future notifications. Existing subscribers are kept.
    pub fn retopic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    /// Register a callback for `field`.
    pub fn subscribe(
        &mut self,
        field: F,
        callback: impl FnMut(&Notification<'_, F, V>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));
        self.subscribers.push(Subscriber {
            id,
            field,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Whether notifications are currently suppressed.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Suppress or resume notifications. Returns the previous state.
    pub fn set_muted(&mut self, muted: bool) -> bool {
        std::mem::replace(&mut self.muted, muted)
    }

    /// Deliver `value` to every subscriber of `field`.
    pub fn notify(&mut self, field: F, value: &V) {
        if self.muted {
            return;
        }
        log::trace!("notify {}.{:?}", self.topic, field);
        let notification = Notification {
            topic: &self.topic,
            field,
            value,
        };
        for sub in self.subscribers.iter_mut().filter(|s| s.field == field) {
            (sub.callback)(&notification);
        }
    }
}

impl<F, V> fmt::Debug for Observers<F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("topic", &self.topic)
            .field("subscribers", &self.subscribers.len())
            .field("muted", &self.muted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Field {
        A,
        B,
    }

    #[test]
    fn test_notify_reaches_matching_field_only() {
        let mut obs: Observers<Field, i32> = Observers::new("thing.1");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        obs.subscribe(Field::A, move |n| sink.borrow_mut().push(*n.value));

        obs.notify(Field::B, &7);
        obs.notify(Field::A, &3);

        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_multiple_subscribers() {
        let mut obs: Observers<Field, i32> = Observers::new("thing.1");
        let count = Rc::new(RefCell::new(0));
        for _ in 0..3 {
            let c = count.clone();
            obs.subscribe(Field::A, move |_| *c.borrow_mut() += 1);
        }
        obs.notify(Field::A, &1);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn test_unsubscribe() {
        let mut obs: Observers<Field, i32> = Observers::new("thing.1");
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = obs.subscribe(Field::A, move |_| *c.borrow_mut() += 1);

        assert!(obs.unsubscribe(id));
        assert!(!obs.unsubscribe(id));
        obs.notify(Field::A, &1);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_muted_suppresses() {
        let mut obs: Observers<Field, i32> = Observers::new("thing.1");
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        obs.subscribe(Field::A, move |_| *c.borrow_mut() += 1);

        let was = obs.set_muted(true);
        obs.notify(Field::A, &1);
        obs.set_muted(was);
        obs.notify(Field::A, &1);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_retopic_keeps_subscribers() {
        let mut obs: Observers<Field, i32> = Observers::new("thing.1");
        let topics = Rc::new(RefCell::new(Vec::new()));
        let t = topics.clone();
        obs.subscribe(Field::A, move |n| t.borrow_mut().push(n.topic.to_string()));

        obs.notify(Field::A, &1);
        obs.retopic("thing.9");
        obs.notify(Field::A, &2);

        assert_eq!(*topics.borrow(), vec!["thing.1".to_string(), "thing.9".to_string()]);
    }
}
