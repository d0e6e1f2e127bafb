//! Checkout state as seen by the shipping step.

use serde::{Deserialize, Serialize};

use checkout_core::CheckoutId;

use crate::cart::{Address, AddressFormField, Cart, Consignment, Customer, StoreConfig};

/// Read access to already-fetched checkout data.
///
/// The provider owns fetching and persistence; this step only reads.
pub trait CheckoutStateProvider {
    fn checkout_id(&self) -> CheckoutId;

    /// `None` until the cart has loaded.
    fn cart(&self) -> Option<&Cart>;

    fn consignments(&self) -> &[Consignment];

    fn shipping_address(&self) -> Option<&Address>;

    fn customer(&self) -> Option<&Customer>;

    /// Address form-field schema for shipping addresses.
    fn address_fields(&self) -> &[AddressFormField];

    fn store_config(&self) -> &StoreConfig;
}

/// Plain snapshot of checkout state; deserializable from the SDK's JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub id: CheckoutId,
    #[serde(default)]
    pub cart: Option<Cart>,
    #[serde(default)]
    pub consignments: Vec<Consignment>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub address_fields: Vec<AddressFormField>,
    #[serde(default)]
    pub config: StoreConfig,
}

impl CheckoutSnapshot {
    pub fn new(id: impl Into<CheckoutId>) -> Self {
        Self {
            id: id.into(),
            cart: None,
            consignments: Vec::new(),
            shipping_address: None,
            customer: None,
            address_fields: Vec::new(),
            config: StoreConfig::default(),
        }
    }
}

impl CheckoutStateProvider for CheckoutSnapshot {
    fn checkout_id(&self) -> CheckoutId {
        self.id.clone()
    }

    fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    fn consignments(&self) -> &[Consignment] {
        &self.consignments
    }

    fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    fn address_fields(&self) -> &[AddressFormField] {
        &self.address_fields
    }

    fn store_config(&self) -> &StoreConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_from_sdk_shaped_json() {
        let snapshot: CheckoutSnapshot = serde_json::from_str(
            r#"{
                "id": "checkout-1",
                "cart": {
                    "id": "cart-1",
                    "lineItems": {
                        "physicalItems": [
                            {"id": 1, "name": "Canvas Laundry Cart", "quantity": 2},
                            {"id": "2", "name": "Smith Journal", "quantity": 1}
                        ]
                    }
                },
                "consignments": [{"id": "c1", "lineItemIds": [1]}],
                "addressFields": [{"name": "address1", "label": "Address", "required": true}],
                "config": {"hasMultiShipping": true}
            }"#,
        )
        .unwrap();

        let cart = snapshot.cart().unwrap();
        assert_eq!(cart.physical_items().len(), 2);
        assert_eq!(cart.physical_items()[0].id.as_str(), "1");
        assert!(cart.line_items.digital_items.is_empty());
        assert_eq!(snapshot.consignments().len(), 1);
        assert!(snapshot.store_config().has_multi_shipping);
        assert!(snapshot.customer().is_none());
    }
}
