//! # Gateway Layer
//!
//! Everything between raw gateway dispatches and the typed event stream:
//! the event vocabulary and the adapter that reconciles payloads into the
//! state registry.

mod adapter;
mod events;

pub use adapter::EventAdapter;
pub use events::{Event, EventKind, UnknownEventName, UserOrMember};
