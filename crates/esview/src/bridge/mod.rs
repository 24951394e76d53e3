//! Message bridge
//!
//! Events the page posts on its channels, outside of any evaluation, and the
//! per-view [`EventBus`] that hands them to waiting listeners.

mod bus;
mod event;
mod pending;

pub use bus::{EventBus, ListenerId};
pub use event::{
    BridgeEvent, BridgeFault, BusEvent, CategoryEvent, EventCategory, HandlerKind, Message, Prompt,
    Request,
};
pub use pending::PendingEvent;
