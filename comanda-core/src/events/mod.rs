//! Order event bus
//!
//! Transport-free in-process observer registry. Handlers run synchronously
//! on the publishing task; anything slow belongs on the subscriber's side.

use dashmap::DashMap;
use shared::models::{Order, OrderStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Events published by the order service
#[derive(Debug, Clone)]
pub enum OrderEvent {
    Created(Order),
    StatusUpdated { order: Order, previous: OrderStatus },
}

impl OrderEvent {
    pub fn order(&self) -> &Order {
        match self {
            OrderEvent::Created(order) => order,
            OrderEvent::StatusUpdated { order, .. } => order,
        }
    }
}

type Predicate = Box<dyn Fn(&OrderEvent) -> bool + Send + Sync>;
type Handler = Box<dyn Fn(&OrderEvent) + Send + Sync>;

struct Subscriber {
    predicate: Predicate,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    subscribers: DashMap<u64, Subscriber>,
}

/// Shared subscriber registry; cloning hands out another handle to the
/// same registry
#[derive(Clone, Default)]
pub struct OrderEvents {
    inner: Arc<Registry>,
}

impl OrderEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events matching `predicate`
    ///
    /// Delivery stops when the returned handle is dropped.
    pub fn subscribe<P, H>(&self, predicate: P, handler: H) -> SubscriptionHandle
    where
        P: Fn(&OrderEvent) -> bool + Send + Sync + 'static,
        H: Fn(&OrderEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.insert(
            id,
            Subscriber {
                predicate: Box::new(predicate),
                handler: Box::new(handler),
            },
        );
        SubscriptionHandle {
            registry: Arc::clone(&self.inner),
            id,
        }
    }

    /// Invoke every handler whose predicate matches `event`
    pub fn publish(&self, event: &OrderEvent) {
        for entry in self.inner.subscribers.iter() {
            let subscriber = entry.value();
            if (subscriber.predicate)(event) {
                (subscriber.handler)(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

/// Keeps a subscription alive; dropping it unsubscribes
pub struct SubscriptionHandle {
    registry: Arc<Registry>,
    id: u64,
}

impl SubscriptionHandle {
    /// Explicit form of dropping the handle
    pub fn unsubscribe(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.registry.subscribers.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::DeliveryType;
    use std::sync::atomic::AtomicUsize;

    fn order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: "o-1".into(),
            number: "1756100000".into(),
            customer_name: "Maria".into(),
            customer_phone: "11999990000".into(),
            customer_address: None,
            establishment_id: "est-1".into(),
            items: Vec::new(),
            status,
            delivery_type: DeliveryType::Pickup,
            delivery_fee: 0.0,
            subtotal: 0.0,
            total: 0.0,
            payment_method: "pix".into(),
            change: None,
            notes: None,
            created_at: now,
            updated_at: now,
            status_history: Vec::new(),
        }
    }

    #[test]
    fn test_predicate_filters_events() {
        let events = OrderEvents::new();
        let created = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&created);
        let _sub = events.subscribe(
            |event| matches!(event, OrderEvent::Created(_)),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        events.publish(&OrderEvent::Created(order(OrderStatus::Pending)));
        events.publish(&OrderEvent::StatusUpdated {
            order: order(OrderStatus::Confirmed),
            previous: OrderStatus::Pending,
        });

        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_predicate_can_inspect_the_order() {
        let events = OrderEvents::new();
        let seen = Arc::new(AtomicUsize::new(0));

        // scope the subscription to one establishment across both variants
        let counter = Arc::clone(&seen);
        let _sub = events.subscribe(
            |event| event.order().establishment_id == "est-1",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        events.publish(&OrderEvent::Created(order(OrderStatus::Pending)));

        let mut foreign = order(OrderStatus::Confirmed);
        foreign.establishment_id = "est-2".into();
        events.publish(&OrderEvent::StatusUpdated {
            order: foreign,
            previous: OrderStatus::Pending,
        });

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let events = OrderEvents::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&seen);
        let sub = events.subscribe(
            |_| true,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert_eq!(events.subscriber_count(), 1);

        events.publish(&OrderEvent::Created(order(OrderStatus::Pending)));
        sub.unsubscribe();
        assert_eq!(events.subscriber_count(), 0);

        events.publish(&OrderEvent::Created(order(OrderStatus::Pending)));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_matching_subscribers_fire() {
        let events = OrderEvents::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&seen);
        let _sub_a = events.subscribe(|_| true, move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        });
        let b = Arc::clone(&seen);
        let _sub_b = events.subscribe(|_| true, move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        });

        events.publish(&OrderEvent::Created(order(OrderStatus::Pending)));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
