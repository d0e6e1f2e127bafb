//! Multi-shipping form: destination list bound to checkout state.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use checkout_core::{
    Aggregate, ConsignmentId, DestinationId, DomainError, DomainResult, Entity, LineItemId,
};
use checkout_events::Event;

use crate::allocation::AllocationBanner;
use crate::cart::{Address, AddressFormField, LineItem};
use crate::destination::{
    AddDestination, AllocateItems, AllocationModal, DestinationList, DestinationListCommand,
    RefreshCart, RemoveDestination, SelectAddress, UnassignItem, destination_label,
};
use crate::provider::CheckoutStateProvider;

/// Read-only projection of one destination for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationView {
    pub index: usize,
    pub id: DestinationId,
    /// "Destination #N".
    pub label: String,
    pub address_text: Option<String>,
    /// "No items allocated" / "{N} item(s) allocated"; only shown once an
    /// address is selected.
    pub summary_text: Option<String>,
    /// Allocated cart items with their quantities, in cart order.
    pub items: Vec<(LineItem, u32)>,
    /// Whether the item list is expanded.
    pub expanded: bool,
}

impl DestinationView {
    /// Items to list under the destination; empty while collapsed.
    pub fn visible_items(&self) -> &[(LineItem, u32)] {
        if self.expanded { &self.items } else { &[] }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsignmentLineItem {
    pub item_id: LineItemId,
    pub quantity: u32,
}

/// Finalized destination handed to the parent flow on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsignmentRequest {
    /// Set when the destination was seeded from an existing consignment.
    pub consignment_id: Option<ConsignmentId>,
    pub address: Address,
    pub line_items: Vec<ConsignmentLineItem>,
}

/// State of the multi-shipping step.
#[derive(Debug, Clone)]
pub struct MultiShippingForm {
    list: DestinationList,
    address_fields: Vec<AddressFormField>,
    saved_addresses: Vec<Address>,
    collapsed: HashSet<DestinationId>,
}

impl MultiShippingForm {
    /// Build the form from loaded checkout state, seeding destinations from
    /// existing consignments.
    pub fn from_provider<P: CheckoutStateProvider>(provider: &P) -> DomainResult<Self> {
        if !provider.store_config().has_multi_shipping {
            return Err(DomainError::conflict("multi-shipping is disabled for this store"));
        }
        let cart = provider
            .cart()
            .ok_or_else(|| DomainError::not_found("cart"))?;

        let list = DestinationList::seed(
            provider.checkout_id(),
            cart.physical_items().to_vec(),
            provider.consignments(),
            provider.shipping_address(),
            Utc::now(),
        );

        tracing::info!(
            checkout_id = %list.id_typed(),
            destinations = list.len(),
            remaining = list.summary().total_remaining(),
            "multi-shipping form opened"
        );

        Ok(Self {
            list,
            address_fields: provider.address_fields().to_vec(),
            saved_addresses: provider
                .customer()
                .map(|c| c.addresses.clone())
                .unwrap_or_default(),
            collapsed: HashSet::new(),
        })
    }

    pub fn list(&self) -> &DestinationList {
        &self.list
    }

    pub fn saved_addresses(&self) -> &[Address] {
        &self.saved_addresses
    }

    pub fn address_fields(&self) -> &[AddressFormField] {
        &self.address_fields
    }

    pub fn banner(&self) -> AllocationBanner {
        self.list.summary().banner()
    }

    pub fn banner_text(&self) -> Option<String> {
        self.banner().text()
    }

    pub fn destination_views(&self) -> Vec<DestinationView> {
        self.list
            .destinations()
            .iter()
            .enumerate()
            .map(|(index, d)| DestinationView {
                index,
                id: *d.id(),
                label: destination_label(index),
                address_text: d.address().map(|a| a.to_string()),
                summary_text: d.address().map(|_| d.summary_text()),
                items: self
                    .list
                    .line_items()
                    .iter()
                    .filter_map(|item| d.items().get(&item.id).map(|q| (item.clone(), *q)))
                    .collect(),
                expanded: !self.collapsed.contains(d.id()),
            })
            .collect()
    }

    /// Expand or collapse a destination's item list; returns the new state.
    pub fn toggle_items(&mut self, index: usize) -> DomainResult<bool> {
        let id = *self.list.destination(index)?.id();
        let expanded = if self.collapsed.remove(&id) {
            true
        } else {
            self.collapsed.insert(id);
            false
        };
        Ok(expanded)
    }

    /// Append an empty destination; returns its index.
    pub fn add_destination(&mut self) -> DomainResult<usize> {
        self.execute(DestinationListCommand::AddDestination(AddDestination {
            destination_id: DestinationId::new(),
            occurred_at: Utc::now(),
        }))?;
        Ok(self.list.len() - 1)
    }

    pub fn select_address(&mut self, index: usize, address: Address) -> DomainResult<()> {
        self.execute(DestinationListCommand::SelectAddress(SelectAddress {
            index,
            address,
            occurred_at: Utc::now(),
        }))
    }

    pub fn open_allocation_modal(&mut self, index: usize) -> DomainResult<AllocationModal> {
        let modal = self.list.open_allocation_modal(index)?;
        tracing::debug!(title = %modal.title, unallocated = modal.unallocated.len(), "allocation modal opened");
        Ok(modal)
    }

    pub fn close_allocation_modal(&mut self) {
        self.list.close_allocation_modal();
    }

    pub fn allocate_items(
        &mut self,
        index: usize,
        items: Vec<(LineItemId, u32)>,
    ) -> DomainResult<()> {
        self.execute(DestinationListCommand::AllocateItems(AllocateItems {
            index,
            items,
            occurred_at: Utc::now(),
        }))?;
        self.list.close_allocation_modal();
        Ok(())
    }

    pub fn unassign_item(&mut self, index: usize, line_item_id: LineItemId) -> DomainResult<()> {
        self.execute(DestinationListCommand::UnassignItem(UnassignItem {
            index,
            line_item_id,
            occurred_at: Utc::now(),
        }))
    }

    pub fn remove_destination(&mut self, index: usize) -> DomainResult<()> {
        let id = *self.list.destination(index)?.id();
        self.execute(DestinationListCommand::RemoveDestination(RemoveDestination {
            index,
            occurred_at: Utc::now(),
        }))?;
        self.collapsed.remove(&id);
        Ok(())
    }

    /// Pick up a changed cart and address schema from the provider.
    pub fn refresh<P: CheckoutStateProvider>(&mut self, provider: &P) -> DomainResult<()> {
        let cart = provider
            .cart()
            .ok_or_else(|| DomainError::not_found("cart"))?;
        self.address_fields = provider.address_fields().to_vec();

        if cart.physical_items() == self.list.line_items() {
            return Ok(());
        }
        self.execute(DestinationListCommand::RefreshCart(RefreshCart {
            line_items: cart.physical_items().to_vec(),
            occurred_at: Utc::now(),
        }))
    }

    /// Turn destinations into consignment requests.
    ///
    /// Every unit must be allocated, and every destination holding items
    /// needs a complete address. Empty destinations are skipped.
    pub fn finalize(&self) -> DomainResult<Vec<ConsignmentRequest>> {
        let remaining = self.list.summary().total_remaining();
        if remaining > 0 {
            let text = AllocationBanner::ItemsLeft(remaining)
                .text()
                .unwrap_or_default();
            return Err(DomainError::validation(text));
        }

        let mut requests = Vec::new();
        for (index, destination) in self.list.destinations().iter().enumerate() {
            if !destination.has_items() {
                continue;
            }
            let Some(address) = destination.address() else {
                return Err(DomainError::validation(format!(
                    "{} has items but no address",
                    destination_label(index)
                )));
            };
            let missing = address.missing_fields(&self.address_fields);
            if !missing.is_empty() {
                return Err(DomainError::validation(format!(
                    "{} address is missing: {}",
                    destination_label(index),
                    missing.join(", ")
                )));
            }

            requests.push(ConsignmentRequest {
                consignment_id: destination.consignment_id().cloned(),
                address: address.clone(),
                line_items: destination
                    .items()
                    .iter()
                    .map(|(item_id, quantity)| ConsignmentLineItem {
                        item_id: item_id.clone(),
                        quantity: *quantity,
                    })
                    .collect(),
            });
        }

        if requests.is_empty() {
            return Err(DomainError::validation("no items to ship"));
        }
        Ok(requests)
    }

    /// Finalize and hand the result to `on_submit`; failures go to
    /// `on_unhandled_error` instead.
    pub fn submit<S, E>(&self, on_submit: S, on_unhandled_error: E)
    where
        S: FnOnce(Vec<ConsignmentRequest>),
        E: FnOnce(DomainError),
    {
        match self.finalize() {
            Ok(requests) => {
                tracing::info!(
                    checkout_id = %self.list.id_typed(),
                    consignments = requests.len(),
                    "multi-shipping step submitted"
                );
                on_submit(requests);
            }
            Err(err) => {
                tracing::warn!(checkout_id = %self.list.id_typed(), error = %err, "multi-shipping submit rejected");
                on_unhandled_error(err);
            }
        }
    }

    fn execute(&mut self, command: DestinationListCommand) -> DomainResult<()> {
        let events = self.list.execute(&command)?;
        for event in &events {
            tracing::debug!(
                checkout_id = %self.list.id_typed(),
                event_type = event.event_type(),
                destinations = self.list.len(),
                "destination list changed"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Cart, Consignment, Customer, LineItems, StoreConfig};
    use crate::provider::CheckoutSnapshot;

    fn address() -> Address {
        Address {
            first_name: "Test".into(),
            last_name: "Tester".into(),
            address1: "12345 Testing Way".into(),
            city: "Some City".into(),
            country_code: "US".into(),
            postal_code: "95555".into(),
            ..Address::default()
        }
    }

    fn snapshot(consignment_items: &[&str]) -> CheckoutSnapshot {
        let mut snapshot = CheckoutSnapshot::new("checkout-1");
        snapshot.cart = Some(Cart {
            id: "cart-1".into(),
            line_items: LineItems {
                physical_items: vec![
                    LineItem::new("1", "Canvas Laundry Cart", 2),
                    LineItem::new("2", "Smith Journal", 1),
                ],
                digital_items: vec![LineItem::new("3", "E-book", 1)],
            },
        });
        snapshot.consignments = vec![Consignment {
            id: ConsignmentId::from("c1"),
            line_item_ids: consignment_items.iter().map(|id| LineItemId::from(*id)).collect(),
            shipping_address: Some(address()),
        }];
        snapshot.address_fields = vec![
            AddressFormField::required("address1", "Address"),
            AddressFormField::required("city", "City"),
            AddressFormField::optional("company", "Company"),
        ];
        snapshot.customer = Some(Customer {
            addresses: vec![address()],
            ..Customer::default()
        });
        snapshot.config = StoreConfig {
            has_multi_shipping: true,
        };
        snapshot
    }

    #[test]
    fn disabled_multi_shipping_is_rejected() {
        let mut snap = snapshot(&["1"]);
        snap.config.has_multi_shipping = false;
        let err = MultiShippingForm::from_provider(&snap).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn missing_cart_is_rejected() {
        let mut snap = snapshot(&["1"]);
        snap.cart = None;
        let err = MultiShippingForm::from_provider(&snap).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn digital_items_are_not_allocated() {
        let form = MultiShippingForm::from_provider(&snapshot(&["1", "2"])).unwrap();
        assert_eq!(form.list().line_items().len(), 2);
        assert_eq!(form.banner(), AllocationBanner::AllAllocated);
        assert_eq!(form.saved_addresses().len(), 1);
    }

    #[test]
    fn allocating_closes_the_modal() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        let index = form.add_destination().unwrap();
        form.open_allocation_modal(index).unwrap();

        form.allocate_items(index, vec![("2".into(), 1)]).unwrap();

        assert!(form.list().open_modal().is_none());
        assert_eq!(form.banner(), AllocationBanner::AllAllocated);
    }

    #[test]
    fn finalize_requires_everything_allocated() {
        let form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        let err = form.finalize().unwrap_err();
        assert_eq!(err, DomainError::validation("1 item left to allocate"));
    }

    #[test]
    fn finalize_requires_address_for_destinations_with_items() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        let index = form.add_destination().unwrap();
        form.allocate_items(index, vec![("2".into(), 1)]).unwrap();

        let err = form.finalize().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("Destination #2 has items but no address")
        );
    }

    #[test]
    fn finalize_checks_required_address_fields() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        let index = form.add_destination().unwrap();
        form.allocate_items(index, vec![("2".into(), 1)]).unwrap();
        form.select_address(
            index,
            Address {
                city: String::new(),
                ..address()
            },
        )
        .unwrap();

        let err = form.finalize().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("Destination #2 address is missing: city")
        );
    }

    #[test]
    fn submit_forwards_consignment_requests() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        let index = form.add_destination().unwrap();
        form.select_address(index, address()).unwrap();
        form.allocate_items(index, vec![("2".into(), 1)]).unwrap();
        // An empty destination is skipped.
        form.add_destination().unwrap();

        let mut submitted = None;
        let mut failed = None;
        form.submit(|r| submitted = Some(r), |e| failed = Some(e));

        assert!(failed.is_none());
        let requests = submitted.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].consignment_id, Some(ConsignmentId::from("c1")));
        assert_eq!(
            requests[0].line_items,
            vec![ConsignmentLineItem {
                item_id: "1".into(),
                quantity: 2
            }]
        );
        assert_eq!(requests[1].consignment_id, None);
    }

    #[test]
    fn submit_reports_failures_through_error_callback() {
        let form = MultiShippingForm::from_provider(&snapshot(&[])).unwrap();

        let mut submitted = false;
        let mut failed = None;
        form.submit(|_| submitted = true, |e| failed = Some(e));

        assert!(!submitted);
        assert!(matches!(failed, Some(DomainError::Validation(_))));
    }

    #[test]
    fn refresh_applies_new_cart_quantities() {
        let mut snap = snapshot(&["1", "2"]);
        let mut form = MultiShippingForm::from_provider(&snap).unwrap();
        let version = checkout_core::AggregateRoot::version(form.list());

        form.refresh(&snap).unwrap();
        assert_eq!(checkout_core::AggregateRoot::version(form.list()), version);

        if let Some(cart) = snap.cart.as_mut() {
            cart.line_items.physical_items[0].quantity = 3;
        }
        form.refresh(&snap).unwrap();

        assert_eq!(form.banner_text().as_deref(), Some("1 item left to allocate"));
    }

    #[test]
    fn summary_text_appears_once_an_address_is_selected() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        let index = form.add_destination().unwrap();
        assert_eq!(form.destination_views()[index].summary_text, None);

        form.select_address(index, address()).unwrap();
        assert_eq!(
            form.destination_views()[index].summary_text.as_deref(),
            Some("No items allocated")
        );
        assert_eq!(
            form.destination_views()[0].summary_text.as_deref(),
            Some("2 items allocated")
        );
    }

    #[test]
    fn views_list_allocated_items_by_name_in_cart_order() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["2", "1"])).unwrap();
        let views = form.destination_views();
        assert!(views[0].expanded);
        assert_eq!(
            views[0].items,
            vec![
                (LineItem::new("1", "Canvas Laundry Cart", 2), 2),
                (LineItem::new("2", "Smith Journal", 1), 1),
            ]
        );

        assert!(!form.toggle_items(0).unwrap());
        let views = form.destination_views();
        assert!(!views[0].expanded);
        assert!(views[0].visible_items().is_empty());
        assert_eq!(views[0].items.len(), 2);

        assert!(form.toggle_items(0).unwrap());
        assert_eq!(form.destination_views()[0].visible_items().len(), 2);
    }

    #[test]
    fn toggle_items_rejects_unknown_index() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        let err = form.toggle_items(4).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn collapsed_state_follows_the_destination_not_its_position() {
        let mut form = MultiShippingForm::from_provider(&snapshot(&["1"])).unwrap();
        form.add_destination().unwrap();
        form.add_destination().unwrap();
        form.toggle_items(2).unwrap();

        form.remove_destination(1).unwrap();

        let views = form.destination_views();
        assert!(views[0].expanded);
        assert!(!views[1].expanded);
    }
}
