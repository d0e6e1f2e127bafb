//! Allocation accounting: how much of each line item still needs a destination.
//!
//! Everything here is a pure function of a snapshot of line items and
//! destinations. Callers recompute after every change.

use std::collections::BTreeMap;

use checkout_core::{DomainError, DomainResult, LineItemId};

use crate::cart::LineItem;
use crate::destination::Destination;

/// Allocation state of one line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAllocation {
    pub line_item_id: LineItemId,
    /// Total purchasable units.
    pub quantity: u32,
    /// Units assigned to some destination, capped at `quantity`.
    pub allocated: u32,
    /// `quantity - allocated`.
    pub remaining: u32,
}

/// Banner shown above the destination list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationBanner {
    AllAllocated,
    ItemsLeft(u32),
    /// Nothing in the cart can be allocated.
    None,
}

impl AllocationBanner {
    pub fn text(&self) -> Option<String> {
        match self {
            AllocationBanner::AllAllocated => Some("All items are allocated.".to_string()),
            AllocationBanner::ItemsLeft(1) => Some("1 item left to allocate".to_string()),
            AllocationBanner::ItemsLeft(n) => Some(format!("{n} items left to allocate")),
            AllocationBanner::None => None,
        }
    }
}

/// Snapshot of allocation state for a cart and its destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationSummary {
    items: Vec<ItemAllocation>,
}

impl AllocationSummary {
    /// Per-item state, in cart order.
    pub fn items(&self) -> &[ItemAllocation] {
        &self.items
    }

    pub fn item(&self, id: &LineItemId) -> Option<&ItemAllocation> {
        self.items.iter().find(|a| &a.line_item_id == id)
    }

    pub fn remaining_for(&self, id: &LineItemId) -> u32 {
        self.item(id).map(|a| a.remaining).unwrap_or(0)
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|a| a.quantity).sum()
    }

    pub fn total_remaining(&self) -> u32 {
        self.items.iter().map(|a| a.remaining).sum()
    }

    /// Items with units still unassigned, in cart order.
    pub fn unallocated_items(&self) -> impl Iterator<Item = &ItemAllocation> {
        self.items.iter().filter(|a| a.remaining > 0)
    }

    pub fn banner(&self) -> AllocationBanner {
        if self.total_quantity() == 0 {
            return AllocationBanner::None;
        }
        match self.total_remaining() {
            0 => AllocationBanner::AllAllocated,
            n => AllocationBanner::ItemsLeft(n),
        }
    }

    /// Check that assigning `requested` units (item id → quantity) to some
    /// destination keeps every item within its purchasable quantity.
    pub fn validate_allocation(&self, requested: &[(LineItemId, u32)]) -> DomainResult<()> {
        let mut combined: BTreeMap<&LineItemId, u32> = BTreeMap::new();
        for (id, quantity) in requested {
            if *quantity == 0 {
                return Err(DomainError::validation(format!(
                    "allocation quantity for line item {id} must be positive"
                )));
            }
            let entry = combined.entry(id).or_default();
            *entry = entry.saturating_add(*quantity);
        }

        for (id, quantity) in combined {
            let Some(item) = self.item(id) else {
                return Err(DomainError::not_found(format!("line item {id}")));
            };
            if quantity > item.remaining {
                return Err(DomainError::validation(format!(
                    "cannot allocate {quantity} of line item {id}: only {} left",
                    item.remaining
                )));
            }
        }
        Ok(())
    }
}

/// Compute allocation state for `line_items` given the destinations' current
/// assignments. Assignments for ids not in `line_items` are ignored.
pub fn summarize(line_items: &[LineItem], destinations: &[Destination]) -> AllocationSummary {
    let mut assigned: BTreeMap<&LineItemId, u32> = BTreeMap::new();
    for destination in destinations {
        for (id, quantity) in destination.items() {
            let entry = assigned.entry(id).or_default();
            *entry = entry.saturating_add(*quantity);
        }
    }

    let items = line_items
        .iter()
        .map(|item| {
            let allocated = assigned
                .get(&item.id)
                .copied()
                .unwrap_or(0)
                .min(item.quantity);
            ItemAllocation {
                line_item_id: item.id.clone(),
                quantity: item.quantity,
                allocated,
                remaining: item.quantity - allocated,
            }
        })
        .collect();

    AllocationSummary { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::DestinationId;

    fn cart() -> Vec<LineItem> {
        vec![
            LineItem::new("1", "Canvas Laundry Cart", 2),
            LineItem::new("2", "Smith Journal", 1),
        ]
    }

    fn destination(items: &[(&str, u32)]) -> Destination {
        Destination::with_items(
            DestinationId::new(),
            items.iter().map(|(id, q)| (LineItemId::from(*id), *q)),
        )
    }

    #[test]
    fn banner_texts() {
        assert_eq!(
            AllocationBanner::AllAllocated.text().as_deref(),
            Some("All items are allocated.")
        );
        assert_eq!(
            AllocationBanner::ItemsLeft(1).text().as_deref(),
            Some("1 item left to allocate")
        );
        assert_eq!(
            AllocationBanner::ItemsLeft(2).text().as_deref(),
            Some("2 items left to allocate")
        );
        assert_eq!(AllocationBanner::None.text(), None);
    }

    #[test]
    fn nothing_assigned_leaves_everything_remaining() {
        let summary = summarize(&cart(), &[destination(&[])]);
        assert_eq!(summary.total_remaining(), 3);
        assert_eq!(summary.banner(), AllocationBanner::ItemsLeft(3));
    }

    #[test]
    fn partial_allocation_counts_remaining_units() {
        let summary = summarize(&cart(), &[destination(&[("1", 2)])]);
        assert_eq!(summary.remaining_for(&"1".into()), 0);
        assert_eq!(summary.remaining_for(&"2".into()), 1);
        assert_eq!(summary.banner(), AllocationBanner::ItemsLeft(1));
    }

    #[test]
    fn allocations_across_destinations_add_up() {
        let summary = summarize(
            &cart(),
            &[destination(&[("1", 1)]), destination(&[("1", 1), ("2", 1)])],
        );
        assert_eq!(summary.banner(), AllocationBanner::AllAllocated);
    }

    #[test]
    fn over_allocation_is_clamped() {
        let summary = summarize(&cart(), &[destination(&[("2", 5)])]);
        let item = summary.item(&"2".into()).unwrap();
        assert_eq!(item.allocated, 1);
        assert_eq!(item.remaining, 0);
    }

    #[test]
    fn empty_cart_has_no_banner() {
        let summary = summarize(&[], &[destination(&[("1", 1)])]);
        assert_eq!(summary.banner(), AllocationBanner::None);
    }

    #[test]
    fn unallocated_items_keep_cart_order() {
        let summary = summarize(&cart(), &[]);
        let ids: Vec<&str> = summary
            .unallocated_items()
            .map(|a| a.line_item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn validate_allocation_rejects_excess_unknown_and_zero() {
        let summary = summarize(&cart(), &[destination(&[("1", 1)])]);

        assert!(summary.validate_allocation(&[("1".into(), 1)]).is_ok());
        assert!(matches!(
            summary.validate_allocation(&[("1".into(), 1), ("1".into(), 1)]),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            summary.validate_allocation(&[("9".into(), 1)]),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            summary.validate_allocation(&[("2".into(), 0)]),
            Err(DomainError::Validation(_))
        ));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: allocated never exceeds quantity and remaining = quantity - allocated.
            #[test]
            fn allocation_stays_within_quantity(
                quantities in proptest::collection::vec(1u32..10, 1..6),
                assignments in proptest::collection::vec(
                    proptest::collection::vec((0usize..6, 0u32..10), 0..6),
                    0..4,
                ),
            ) {
                let line_items: Vec<LineItem> = quantities
                    .iter()
                    .enumerate()
                    .map(|(i, q)| LineItem::new(i.to_string(), "item", *q))
                    .collect();
                let destinations: Vec<Destination> = assignments
                    .iter()
                    .map(|pairs| {
                        Destination::with_items(
                            DestinationId::new(),
                            pairs.iter().map(|(i, q)| (LineItemId::from(i.to_string()), *q)),
                        )
                    })
                    .collect();

                let summary = summarize(&line_items, &destinations);

                prop_assert_eq!(summary.items().len(), line_items.len());
                for item in summary.items() {
                    prop_assert!(item.allocated <= item.quantity);
                    prop_assert_eq!(item.remaining, item.quantity - item.allocated);
                }
                match summary.banner() {
                    AllocationBanner::AllAllocated => prop_assert_eq!(summary.total_remaining(), 0),
                    AllocationBanner::ItemsLeft(n) => prop_assert_eq!(summary.total_remaining(), n),
                    AllocationBanner::None => prop_assert!(false, "cart is never empty here"),
                }
            }
        }
    }
}
