use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::serde_helpers::{display_fromstr, wrapped_list, xero_enum};

xero_enum! {
    pub enum AddressType {
        PoBox => "POBOX",
        Street => "STREET",
        Delivery => "DELIVERY",
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Address", rename_all = "PascalCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// The contact an invoice is raised against. Xero matches an existing contact by
/// `ContactID` first, then by `Name`, and creates one when neither matches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Contact", rename_all = "PascalCase")]
pub struct Contact {
    #[serde(
        rename = "ContactID",
        default,
        with = "display_fromstr",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, with = "addresses", skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
}

wrapped_list!(mod addresses: Address => "Address");

impl Contact {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(contact_id: Uuid) -> Self {
        Self {
            contact_id: Some(contact_id),
            ..Self::default()
        }
    }
}
