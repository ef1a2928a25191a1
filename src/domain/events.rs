//! Grid events raised to the host, delivered through polled subscriptions.

use crate::domain::column::ColumnChange;
use crate::domain::snapshot::ConfigurationSnapshot;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// The layout changed; presentation should refresh
    ColumnsModified(Vec<ColumnChange>),
    ConfigurationSaveRequested(ConfigurationSnapshot),
    ConfigurationLoadRequested(ConfigurationSnapshot),
    SortRequested {
        column_id: String,
        is_multi_column: bool,
    },
}

impl GridEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GridEvent::ColumnsModified(_) => EventKind::ColumnsModified,
            GridEvent::ConfigurationSaveRequested(_) => EventKind::ConfigurationSaveRequested,
            GridEvent::ConfigurationLoadRequested(_) => EventKind::ConfigurationLoadRequested,
            GridEvent::SortRequested { .. } => EventKind::SortRequested,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ColumnsModified,
    ConfigurationSaveRequested,
    ConfigurationLoadRequested,
    SortRequested,
}

pub type SubscriptionId = u64;

struct Subscription {
    /// `None` receives every kind
    kinds: Option<Vec<EventKind>>,
    queue: VecDeque<GridEvent>,
}

impl Subscription {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }
}

/// Publish/subscribe hub with a bounded queue per subscription
///
/// When a queue is full the oldest event is dropped.
pub struct EventBus {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    next_id: SubscriptionId,
    max_queue_size: usize,
}

impl EventBus {
    pub const DEFAULT_MAX_QUEUE_SIZE: usize = 1_000;

    pub fn new() -> Self {
        Self::with_max_queue_size(Self::DEFAULT_MAX_QUEUE_SIZE)
    }

    pub fn with_max_queue_size(max_queue_size: usize) -> Self {
        Self {
            subscriptions: HashMap::new(),
            next_id: 1,
            max_queue_size: max_queue_size.max(1),
        }
    }

    /// Subscribes to every event
    pub fn subscribe(&mut self) -> SubscriptionId {
        self.insert(None)
    }

    /// Subscribes to the listed kinds only
    pub fn subscribe_to(&mut self, kinds: &[EventKind]) -> SubscriptionId {
        self.insert(Some(kinds.to_vec()))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Queues the event for each interested subscription and returns how many
    pub fn emit(&mut self, event: GridEvent) -> usize {
        let kind = event.kind();
        let max = self.max_queue_size;
        let mut delivered = 0;

        for (id, sub) in self.subscriptions.iter_mut() {
            if !sub.wants(kind) {
                continue;
            }
            if sub.queue.len() >= max {
                warn!("Subscription {} queue full; dropping oldest event", id);
                sub.queue.pop_front();
            }
            sub.queue.push_back(event.clone());
            delivered += 1;
        }

        debug!("Emitted {:?} to {} subscriptions", kind, delivered);
        delivered
    }

    /// Takes up to `max` queued events, oldest first
    pub fn poll(&mut self, id: SubscriptionId, max: usize) -> Vec<GridEvent> {
        match self.subscriptions.get_mut(&id) {
            Some(sub) => {
                let n = max.min(sub.queue.len());
                sub.queue.drain(..n).collect()
            }
            None => Vec::new(),
        }
    }

    pub fn drain(&mut self, id: SubscriptionId) -> Vec<GridEvent> {
        self.poll(id, usize::MAX)
    }

    pub fn pending(&self, id: SubscriptionId) -> usize {
        self.subscriptions.get(&id).map_or(0, |s| s.queue.len())
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn insert(&mut self, kinds: Option<Vec<EventKind>>) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.insert(
            id,
            Subscription {
                kinds,
                queue: VecDeque::new(),
            },
        );
        id
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("max_queue_size", &self.max_queue_size)
            .finish()
    }
}
