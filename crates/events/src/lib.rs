//! Domain events emitted by the checkout steps.

pub mod event;

pub use event::Event;
