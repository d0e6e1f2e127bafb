//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Addresses and pet records are value objects: two addresses with the same
/// lines are the same address, and "changing" one means building a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct PostalCode(String);
///
/// impl ValueObject for PostalCode {}
///
/// assert_eq!(PostalCode("10001".into()), PostalCode("10001".into()));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
