//! Event bus scoped to one view
//!
//! The bus owns a registry of one-shot listeners keyed by [`ListenerId`].
//! Each listener is a pending slot for one category; a posted event resolves
//! every listener of its category that is registered at post time, and a
//! fault resolves every listener. Resolved listeners leave the registry, and
//! a [`PendingEvent`] dropped before resolution removes its own entry.

use super::event::{BridgeEvent, BridgeFault, BusEvent, CategoryEvent, EventCategory};
use super::event::{Message, Prompt, Request};
use super::pending::PendingEvent;
use crate::config::ChannelNames;
use esview_core::{EsError, EsResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, trace, warn};

/// Registry key of a one-shot listener
pub type ListenerId = u64;

pub(crate) type Slot = oneshot::Sender<EsResult<BridgeEvent>>;

struct Listener {
    category: EventCategory,
    slot: Slot,
}

pub(crate) struct BusInner {
    listeners: Mutex<HashMap<ListenerId, Listener>>,
    next_id: AtomicU64,
    channels: ChannelNames,
    subscribers: broadcast::Sender<BusEvent>,
}

impl BusInner {
    pub(crate) fn deregister(&self, id: ListenerId) {
        if self.listeners.lock().remove(&id).is_some() {
            trace!(target: "esview", id, "listener dropped before resolution");
        }
    }
}

/// Correlates events posted by the page with waiting listeners
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new(channels: ChannelNames, subscription_capacity: usize) -> Self {
        let (subscribers, _) = broadcast::channel(subscription_capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                channels,
                subscribers,
            }),
        }
    }

    /// Wait for the next event of `T`'s category
    ///
    /// The listener is registered immediately, so an event posted after this
    /// call and before the first poll still resolves it.
    pub fn wait_for<T: CategoryEvent>(&self) -> PendingEvent<T> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (slot, rx) = oneshot::channel();
        self.inner.listeners.lock().insert(
            id,
            Listener {
                category: T::CATEGORY,
                slot,
            },
        );
        trace!(target: "esview", id, category = %T::CATEGORY, "listener registered");
        PendingEvent::new(id, Arc::downgrade(&self.inner), rx)
    }

    pub fn wait_for_message(&self) -> PendingEvent<Message> {
        self.wait_for()
    }

    pub fn wait_for_prompt(&self) -> PendingEvent<Prompt> {
        self.wait_for()
    }

    pub fn wait_for_request(&self) -> PendingEvent<Request> {
        self.wait_for()
    }

    /// Subscribe to every event, fault and unknown post from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.inner.subscribers.subscribe()
    }

    /// Ingest a body the page posted on `channel`
    pub fn receive(&self, channel: &str, body: Value) {
        let Some(category) = self.inner.channels.category_of(channel) else {
            debug!(target: "esview", channel, "post on unknown channel");
            let _ = self.inner.subscribers.send(BusEvent::Unknown {
                name: channel.to_string(),
                body,
            });
            return;
        };

        match BridgeEvent::parse(category, body) {
            Ok(event) => self.publish(event),
            Err(e) => {
                warn!(target: "esview", channel, error = %e, "malformed bridge payload");
                self.fail(BridgeFault {
                    attempting: category.name().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Resolve every listener of the event's category
    pub fn publish(&self, event: BridgeEvent) {
        let category = event.category();
        let matched = self.take_listeners(|listener| listener.category == category);
        debug!(target: "esview", %category, listeners = matched.len(), "bridge event");

        for listener in matched {
            let _ = listener.slot.send(Ok(event.clone()));
        }
        let _ = self.inner.subscribers.send(BusEvent::Event(event));
    }

    /// Fail every pending listener
    ///
    /// Listeners of the faulted category see a payload error for their
    /// channel; all others see the broadcast.
    pub fn fail(&self, fault: BridgeFault) {
        let pending = self.take_listeners(|_| true);

        for listener in pending {
            let error = if listener.category.name() == fault.attempting {
                EsError::bridge_payload(
                    self.inner.channels.name_for(listener.category),
                    fault.message.clone(),
                )
            } else {
                EsError::bridge_broadcast(fault.attempting.clone(), fault.message.clone())
            };
            let _ = listener.slot.send(Err(error));
        }
        let _ = self.inner.subscribers.send(BusEvent::Fault(fault));
    }

    /// Number of listeners still waiting
    pub fn pending_listeners(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Number of listeners waiting on one category
    pub fn pending_for(&self, category: EventCategory) -> usize {
        self.inner
            .listeners
            .lock()
            .values()
            .filter(|listener| listener.category == category)
            .count()
    }

    pub fn channels(&self) -> &ChannelNames {
        &self.inner.channels
    }

    fn take_listeners(&self, mut select: impl FnMut(&Listener) -> bool) -> Vec<Listener> {
        let mut listeners = self.inner.listeners.lock();
        let ids: Vec<ListenerId> = listeners
            .iter()
            .filter(|(_, listener)| select(listener))
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter()
            .filter_map(|id| listeners.remove(&id))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(ChannelNames::default(), 64)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("channels", &self.inner.channels)
            .field("pending_listeners", &self.pending_listeners())
            .finish()
    }
}
