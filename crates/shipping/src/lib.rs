//! Multi-shipping checkout step.
//!
//! This crate contains the allocation rules for splitting a cart across
//! several shipping destinations, implemented purely as deterministic domain
//! logic (no IO, no rendering). Cart and checkout data arrive through a
//! [`CheckoutStateProvider`].

pub mod allocation;
pub mod cart;
pub mod destination;
pub mod form;
pub mod provider;

pub use allocation::{AllocationBanner, AllocationSummary, ItemAllocation, summarize};
pub use cart::{
    Address, AddressFormField, Cart, Consignment, Customer, LineItem, LineItems, StoreConfig,
};
pub use destination::{
    AddDestination, AddressSelected, AllocateItems, AllocationModal, CartRefreshed, Destination,
    DestinationAdded, DestinationList, DestinationListCommand, DestinationListEvent,
    DestinationRemoved, ItemUnassigned, ItemsAllocated, RefreshCart, RemoveDestination,
    SelectAddress, UnassignItem, destination_label,
};
pub use form::{ConsignmentLineItem, ConsignmentRequest, DestinationView, MultiShippingForm};
pub use provider::{CheckoutSnapshot, CheckoutStateProvider};
