//! Futures that wait for a single bridge event

use super::bus::{BusInner, ListenerId};
use super::event::{BridgeEvent, CategoryEvent};
use esview_core::{EsError, EsResult};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll, ready};
use tokio::sync::oneshot;

/// A one-shot wait for the next event of one category
///
/// Resolves once with the event or with a bridge error. Dropping it before
/// that removes the listener from the bus.
#[must_use = "a pending event does nothing unless awaited"]
pub struct PendingEvent<T> {
    id: ListenerId,
    bus: Weak<BusInner>,
    rx: oneshot::Receiver<EsResult<BridgeEvent>>,
    _event: PhantomData<fn() -> T>,
}

impl<T> PendingEvent<T> {
    pub(crate) fn new(
        id: ListenerId,
        bus: Weak<BusInner>,
        rx: oneshot::Receiver<EsResult<BridgeEvent>>,
    ) -> Self {
        Self {
            id,
            bus,
            rx,
            _event: PhantomData,
        }
    }

    /// Registry key of this listener
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl<T: CategoryEvent> Future for PendingEvent<T> {
    type Output = EsResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let delivered = ready!(Pin::new(&mut self.rx).poll(cx));
        Poll::Ready(match delivered {
            Ok(Ok(event)) => T::from_event(event).ok_or_else(|| {
                EsError::unknown_host(format!("event did not match category {}", T::CATEGORY))
            }),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(EsError::unknown_host(
                "event bus closed before an event arrived",
            )),
        })
    }
}

impl<T> Drop for PendingEvent<T> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.deregister(self.id);
        }
    }
}

impl<T> std::fmt::Debug for PendingEvent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingEvent").field("id", &self.id).finish()
    }
}
