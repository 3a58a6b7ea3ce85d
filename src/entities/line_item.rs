use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::serde_helpers::{display_fromstr, xero_enum};

xero_enum! {
    /// How line amounts relate to tax on an invoice or manual journal.
    pub enum LineAmountType {
        /// Lines are exclusive of tax (the Xero default).
        Exclusive => "Exclusive",
        Inclusive => "Inclusive",
        NoTax => "NoTax",
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "LineItem", rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(
        rename = "LineItemID",
        default,
        with = "display_fromstr",
        skip_serializing_if = "Option::is_none"
    )]
    pub line_item_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub line_amount: Option<Decimal>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<Decimal>,
}

impl LineItem {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_amount: Decimal,
        account_code: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            quantity: Some(quantity),
            unit_amount: Some(unit_amount),
            account_code: Some(account_code.into()),
            ..Self::default()
        }
    }
}
