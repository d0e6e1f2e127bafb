//! `checkout-core` — domain foundation shared by the checkout steps.
//!
//! This crate contains **pure domain** primitives (no storage, no rendering).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CheckoutId, ConsignmentId, DestinationId, LineItemId};
pub use value_object::ValueObject;
