//! Checkout events and the hooks that subscribe to them.
//!
//! The checkout flow publishes an [`OrderFinalizedEvent`] when a payment is verified and an [`OrderAnnulledEvent`]
//! when an order is cancelled or expires. Register handlers with [`EventHooks`], turn them into [`EventHandlers`],
//! hand the resulting [`EventProducers`] to the flow API, and start the handlers.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
