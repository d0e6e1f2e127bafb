//! Cart and checkout data as delivered by the checkout SDK.

use serde::{Deserialize, Serialize};

use checkout_core::{ConsignmentId, LineItemId, ValueObject};

/// Cart line item. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(id: impl Into<LineItemId>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
        }
    }
}

/// Line items of a cart, grouped the way the SDK nests them under
/// `cart.lineItems`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItems {
    /// Items that ship; the only ones taking part in allocation.
    pub physical_items: Vec<LineItem>,
    pub digital_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub line_items: LineItems,
}

impl Cart {
    pub fn new(id: impl Into<String>, physical_items: Vec<LineItem>) -> Self {
        Self {
            id: id.into(),
            line_items: LineItems {
                physical_items,
                digital_items: Vec::new(),
            },
        }
    }

    pub fn physical_items(&self) -> &[LineItem] {
        &self.line_items.physical_items
    }

    pub fn physical_item(&self, id: &LineItemId) -> Option<&LineItem> {
        self.physical_items().iter().find(|item| &item.id == id)
    }
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state_or_province: String,
    pub country_code: String,
    pub postal_code: String,
    pub phone: String,
}

impl ValueObject for Address {}

impl Address {
    /// Look up a field by its form-field name (`"address1"`, `"postalCode"`, …).
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "firstName" => &self.first_name,
            "lastName" => &self.last_name,
            "company" => &self.company,
            "address1" => &self.address1,
            "address2" => &self.address2,
            "city" => &self.city,
            "stateOrProvince" | "stateOrProvinceCode" => &self.state_or_province,
            "countryCode" => &self.country_code,
            "postalCode" => &self.postal_code,
            "phone" => &self.phone,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Names of required fields that are missing or blank.
    pub fn missing_fields<'a>(&self, fields: &'a [AddressFormField]) -> Vec<&'a str> {
        fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| match self.field(&f.name) {
                Some(value) => value.trim().is_empty(),
                // Custom fields are not modeled here.
                None => false,
            })
            .map(|f| f.name.as_str())
            .collect()
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let parts = [
            name.as_str(),
            self.company.trim(),
            self.address1.trim(),
            self.address2.trim(),
            self.city.trim(),
            self.state_or_province.trim(),
            self.postal_code.trim(),
            self.country_code.trim(),
        ];

        let mut first = true;
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

/// Existing shipping group on the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consignment {
    pub id: ConsignmentId,
    #[serde(default)]
    pub line_item_ids: Vec<LineItemId>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
}

/// Entry of the address form-field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFormField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
}

impl AddressFormField {
    pub fn required(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_guest: bool,
    /// Saved addresses offered when selecting a destination address.
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// Store-level checkout settings relevant to shipping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default)]
    pub has_multi_shipping: bool,
}
