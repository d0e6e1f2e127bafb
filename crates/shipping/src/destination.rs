use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use checkout_core::{
    Aggregate, AggregateRoot, CheckoutId, ConsignmentId, DestinationId, DomainError, Entity,
    LineItemId,
};
use checkout_events::Event;

use crate::allocation::{AllocationSummary, summarize};
use crate::cart::{Address, Consignment, LineItem};

/// User-visible label for the destination at `index` ("Destination #1", …).
pub fn destination_label(index: usize) -> String {
    format!("Destination #{}", index + 1)
}

/// One consignment-in-progress: an address plus the units assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    id: DestinationId,
    consignment_id: Option<ConsignmentId>,
    address: Option<Address>,
    items: BTreeMap<LineItemId, u32>,
}

impl Destination {
    pub fn empty(id: DestinationId) -> Self {
        Self {
            id,
            consignment_id: None,
            address: None,
            items: BTreeMap::new(),
        }
    }

    /// Build a destination with assigned units; zero quantities are dropped
    /// and repeated ids are summed.
    pub fn with_items<I>(id: DestinationId, items: I) -> Self
    where
        I: IntoIterator<Item = (LineItemId, u32)>,
    {
        let mut destination = Self::empty(id);
        for (item_id, quantity) in items {
            destination.add_units(item_id, quantity);
        }
        destination
    }

    pub fn consignment_id(&self) -> Option<&ConsignmentId> {
        self.consignment_id.as_ref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn items(&self) -> &BTreeMap<LineItemId, u32> {
        &self.items
    }

    pub fn allocated_units(&self) -> u32 {
        self.items.values().sum()
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// "No items allocated", "1 item allocated" or "{N} items allocated".
    pub fn summary_text(&self) -> String {
        match self.allocated_units() {
            0 => "No items allocated".to_string(),
            1 => "1 item allocated".to_string(),
            n => format!("{n} items allocated"),
        }
    }

    fn add_units(&mut self, item_id: LineItemId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.items.entry(item_id).or_default();
        *entry = entry.saturating_add(quantity);
    }
}

impl Entity for Destination {
    type Id = DestinationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Contents of the allocation modal for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationModal {
    pub destination_index: usize,
    pub destination_id: DestinationId,
    /// "Destination #N".
    pub title: String,
    /// Items with units left to allocate, with their remaining counts.
    pub unallocated: Vec<(LineItem, u32)>,
}

/// Aggregate root: the ordered destination list of one checkout.
///
/// Allocation state is recomputed on every applied event, so `summary()`
/// always reflects the current items and destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationList {
    id: CheckoutId,
    line_items: Vec<LineItem>,
    destinations: Vec<Destination>,
    summary: AllocationSummary,
    open_modal: Option<DestinationId>,
    version: u64,
}

impl DestinationList {
    /// A list with no destinations over the given (physical) line items.
    pub fn empty(id: CheckoutId, line_items: Vec<LineItem>) -> Self {
        let summary = summarize(&line_items, &[]);
        Self {
            id,
            line_items,
            destinations: Vec::new(),
            summary,
            open_modal: None,
            version: 0,
        }
    }

    /// Seed destinations from the checkout's existing consignments.
    ///
    /// Each consignment becomes a destination holding the full quantity of
    /// the cart items it lists (items not in `line_items` are skipped, and an
    /// item listed twice only gets what is left). Without consignments, one
    /// empty destination is created carrying `shipping_address`.
    pub fn seed(
        id: CheckoutId,
        line_items: Vec<LineItem>,
        consignments: &[Consignment],
        shipping_address: Option<&Address>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let mut list = Self::empty(id, line_items);
        let mut budget: BTreeMap<LineItemId, u32> = list
            .line_items
            .iter()
            .map(|item| (item.id.clone(), item.quantity))
            .collect();

        let mut events = Vec::new();
        for consignment in consignments {
            let mut items = Vec::new();
            for item_id in &consignment.line_item_ids {
                if let Some(left) = budget.get_mut(item_id) {
                    if *left > 0 {
                        items.push((item_id.clone(), *left));
                        *left = 0;
                    }
                }
            }
            events.push(DestinationListEvent::DestinationAdded(DestinationAdded {
                checkout_id: list.id.clone(),
                destination_id: DestinationId::new(),
                consignment_id: Some(consignment.id.clone()),
                address: consignment.shipping_address.clone(),
                items,
                occurred_at,
            }));
        }

        if events.is_empty() {
            events.push(DestinationListEvent::DestinationAdded(DestinationAdded {
                checkout_id: list.id.clone(),
                destination_id: DestinationId::new(),
                consignment_id: None,
                address: shipping_address.cloned(),
                items: Vec::new(),
                occurred_at,
            }));
        }

        for event in &events {
            list.apply(event);
        }
        list
    }

    pub fn id_typed(&self) -> &CheckoutId {
        &self.id
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn destination(&self, index: usize) -> Result<&Destination, DomainError> {
        self.destinations
            .get(index)
            .ok_or_else(|| DomainError::index_out_of_range("destination", index, self.len()))
    }

    pub fn position(&self, id: &DestinationId) -> Option<usize> {
        self.destinations.iter().position(|d| &d.id == id)
    }

    pub fn summary(&self) -> &AllocationSummary {
        &self.summary
    }

    /// Open the allocation modal for the destination at `index`.
    ///
    /// Modal visibility is view state: it is not an event and does not bump
    /// the version.
    pub fn open_allocation_modal(&mut self, index: usize) -> Result<AllocationModal, DomainError> {
        let modal = self.allocation_modal(index)?;
        self.open_modal = Some(modal.destination_id);
        Ok(modal)
    }

    pub fn close_allocation_modal(&mut self) {
        self.open_modal = None;
    }

    /// The currently open modal, rebuilt from current state.
    pub fn open_modal(&self) -> Option<AllocationModal> {
        let index = self.position(self.open_modal.as_ref()?)?;
        self.allocation_modal(index).ok()
    }

    pub fn allocation_modal(&self, index: usize) -> Result<AllocationModal, DomainError> {
        let destination = self.destination(index)?;
        let unallocated = self
            .summary
            .unallocated_items()
            .filter_map(|a| {
                self.line_items
                    .iter()
                    .find(|item| item.id == a.line_item_id)
                    .map(|item| (item.clone(), a.remaining))
            })
            .collect();

        Ok(AllocationModal {
            destination_index: index,
            destination_id: destination.id,
            title: destination_label(index),
            unallocated,
        })
    }

    fn destination_mut(&mut self, id: &DestinationId) -> Option<&mut Destination> {
        self.destinations.iter_mut().find(|d| &d.id == id)
    }

    fn recompute(&mut self) {
        self.summary = summarize(&self.line_items, &self.destinations);
    }

    /// Trim assignments so no item exceeds its quantity; earlier destinations
    /// keep their units first. Items no longer in the cart are dropped.
    fn clamp_to_cart(&mut self) {
        let mut budget: BTreeMap<LineItemId, u32> = self
            .line_items
            .iter()
            .map(|item| (item.id.clone(), item.quantity))
            .collect();

        for destination in &mut self.destinations {
            let mut kept = BTreeMap::new();
            for (item_id, quantity) in &destination.items {
                if let Some(left) = budget.get_mut(item_id) {
                    let take = (*quantity).min(*left);
                    *left -= take;
                    if take > 0 {
                        kept.insert(item_id.clone(), take);
                    }
                }
            }
            destination.items = kept;
        }
    }
}

impl AggregateRoot for DestinationList {
    type Id = CheckoutId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddDestination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDestination {
    pub destination_id: DestinationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectAddress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectAddress {
    pub index: usize,
    pub address: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AllocateItems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateItems {
    pub index: usize,
    pub items: Vec<(LineItemId, u32)>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UnassignItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignItem {
    pub index: usize,
    pub line_item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveDestination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDestination {
    pub index: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RefreshCart (the provider delivered new line items).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshCart {
    pub line_items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationListCommand {
    AddDestination(AddDestination),
    SelectAddress(SelectAddress),
    AllocateItems(AllocateItems),
    UnassignItem(UnassignItem),
    RemoveDestination(RemoveDestination),
    RefreshCart(RefreshCart),
}

/// Event: DestinationAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationAdded {
    pub checkout_id: CheckoutId,
    pub destination_id: DestinationId,
    pub consignment_id: Option<ConsignmentId>,
    pub address: Option<Address>,
    pub items: Vec<(LineItemId, u32)>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AddressSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSelected {
    pub checkout_id: CheckoutId,
    pub destination_id: DestinationId,
    pub address: Address,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemsAllocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsAllocated {
    pub checkout_id: CheckoutId,
    pub destination_id: DestinationId,
    pub items: Vec<(LineItemId, u32)>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemUnassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUnassigned {
    pub checkout_id: CheckoutId,
    pub destination_id: DestinationId,
    pub line_item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DestinationRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRemoved {
    pub checkout_id: CheckoutId,
    pub destination_id: DestinationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartRefreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRefreshed {
    pub checkout_id: CheckoutId,
    pub line_items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationListEvent {
    DestinationAdded(DestinationAdded),
    AddressSelected(AddressSelected),
    ItemsAllocated(ItemsAllocated),
    ItemUnassigned(ItemUnassigned),
    DestinationRemoved(DestinationRemoved),
    CartRefreshed(CartRefreshed),
}

impl Event for DestinationListEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DestinationListEvent::DestinationAdded(_) => "shipping.destination.added",
            DestinationListEvent::AddressSelected(_) => "shipping.destination.address_selected",
            DestinationListEvent::ItemsAllocated(_) => "shipping.destination.items_allocated",
            DestinationListEvent::ItemUnassigned(_) => "shipping.destination.item_unassigned",
            DestinationListEvent::DestinationRemoved(_) => "shipping.destination.removed",
            DestinationListEvent::CartRefreshed(_) => "shipping.cart.refreshed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DestinationListEvent::DestinationAdded(e) => e.occurred_at,
            DestinationListEvent::AddressSelected(e) => e.occurred_at,
            DestinationListEvent::ItemsAllocated(e) => e.occurred_at,
            DestinationListEvent::ItemUnassigned(e) => e.occurred_at,
            DestinationListEvent::DestinationRemoved(e) => e.occurred_at,
            DestinationListEvent::CartRefreshed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for DestinationList {
    type Command = DestinationListCommand;
    type Event = DestinationListEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DestinationListEvent::DestinationAdded(e) => {
                let mut destination =
                    Destination::with_items(e.destination_id, e.items.iter().cloned());
                destination.consignment_id = e.consignment_id.clone();
                destination.address = e.address.clone();
                self.destinations.push(destination);
            }
            DestinationListEvent::AddressSelected(e) => {
                if let Some(d) = self.destination_mut(&e.destination_id) {
                    d.address = Some(e.address.clone());
                }
            }
            DestinationListEvent::ItemsAllocated(e) => {
                if let Some(d) = self.destination_mut(&e.destination_id) {
                    for (item_id, quantity) in &e.items {
                        d.add_units(item_id.clone(), *quantity);
                    }
                }
            }
            DestinationListEvent::ItemUnassigned(e) => {
                if let Some(d) = self.destination_mut(&e.destination_id) {
                    d.items.remove(&e.line_item_id);
                }
            }
            DestinationListEvent::DestinationRemoved(e) => {
                self.destinations.retain(|d| d.id != e.destination_id);
                if self.open_modal == Some(e.destination_id) {
                    self.open_modal = None;
                }
            }
            DestinationListEvent::CartRefreshed(e) => {
                self.line_items = e.line_items.clone();
                self.clamp_to_cart();
            }
        }

        self.recompute();

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DestinationListCommand::AddDestination(cmd) => self.handle_add(cmd),
            DestinationListCommand::SelectAddress(cmd) => self.handle_select_address(cmd),
            DestinationListCommand::AllocateItems(cmd) => self.handle_allocate(cmd),
            DestinationListCommand::UnassignItem(cmd) => self.handle_unassign(cmd),
            DestinationListCommand::RemoveDestination(cmd) => self.handle_remove(cmd),
            DestinationListCommand::RefreshCart(cmd) => self.handle_refresh(cmd),
        }
    }
}

impl DestinationList {
    fn handle_add(&self, cmd: &AddDestination) -> Result<Vec<DestinationListEvent>, DomainError> {
        if self.position(&cmd.destination_id).is_some() {
            return Err(DomainError::conflict("destination already exists"));
        }

        Ok(vec![DestinationListEvent::DestinationAdded(DestinationAdded {
            checkout_id: self.id.clone(),
            destination_id: cmd.destination_id,
            consignment_id: None,
            address: None,
            items: Vec::new(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_select_address(
        &self,
        cmd: &SelectAddress,
    ) -> Result<Vec<DestinationListEvent>, DomainError> {
        let destination = self.destination(cmd.index)?;

        Ok(vec![DestinationListEvent::AddressSelected(AddressSelected {
            checkout_id: self.id.clone(),
            destination_id: destination.id,
            address: cmd.address.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_allocate(
        &self,
        cmd: &AllocateItems,
    ) -> Result<Vec<DestinationListEvent>, DomainError> {
        let destination = self.destination(cmd.index)?;

        if cmd.items.is_empty() {
            return Err(DomainError::validation("no items selected for allocation"));
        }
        self.summary.validate_allocation(&cmd.items)?;

        Ok(vec![DestinationListEvent::ItemsAllocated(ItemsAllocated {
            checkout_id: self.id.clone(),
            destination_id: destination.id,
            items: cmd.items.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_unassign(
        &self,
        cmd: &UnassignItem,
    ) -> Result<Vec<DestinationListEvent>, DomainError> {
        let destination = self.destination(cmd.index)?;

        if !destination.items.contains_key(&cmd.line_item_id) {
            return Err(DomainError::not_found(format!(
                "line item {} is not allocated to {}",
                cmd.line_item_id,
                destination_label(cmd.index)
            )));
        }

        Ok(vec![DestinationListEvent::ItemUnassigned(ItemUnassigned {
            checkout_id: self.id.clone(),
            destination_id: destination.id,
            line_item_id: cmd.line_item_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(
        &self,
        cmd: &RemoveDestination,
    ) -> Result<Vec<DestinationListEvent>, DomainError> {
        let destination = self.destination(cmd.index)?;

        if self.len() == 1 {
            return Err(DomainError::invariant("the last destination cannot be removed"));
        }

        Ok(vec![DestinationListEvent::DestinationRemoved(DestinationRemoved {
            checkout_id: self.id.clone(),
            destination_id: destination.id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_refresh(&self, cmd: &RefreshCart) -> Result<Vec<DestinationListEvent>, DomainError> {
        if cmd.line_items.iter().any(|item| item.quantity == 0) {
            return Err(DomainError::validation("line item quantity must be positive"));
        }

        Ok(vec![DestinationListEvent::CartRefreshed(CartRefreshed {
            checkout_id: self.id.clone(),
            line_items: cmd.line_items.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
