use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{Envelope, Resource};
use crate::endpoints::XeroEndpoint;
use crate::error::Result;
use crate::utils::date_format::{xero_date_format_option, xero_datetime_format_option};
use crate::utils::serde_helpers::{display_fromstr, wrapped_list, xero_enum};

xero_enum! {
    pub enum Status {
        Authorised => "AUTHORISED",
        Deleted => "DELETED",
    }
}

/// The invoice a payment is applied to, identified by ID or number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceReference {
    #[serde(
        rename = "InvoiceID",
        default,
        with = "display_fromstr",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

/// The bank account the payment is made from or to, identified by ID or code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountReference {
    #[serde(
        rename = "AccountID",
        default,
        with = "display_fromstr",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Payment", rename_all = "PascalCase")]
pub struct Payment {
    #[serde(
        rename = "PaymentID",
        default,
        with = "display_fromstr",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_id: Option<Uuid>,
    pub invoice: InvoiceReference,
    pub account: AccountReference,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub currency_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Payment {
    /// A payment of `amount` against the invoice numbered `invoice_number`, made through
    /// the account with code `account_code`.
    #[must_use]
    pub fn new(
        invoice_number: impl Into<String>,
        account_code: impl Into<String>,
        date: Date,
        amount: Decimal,
    ) -> Self {
        Self {
            invoice: InvoiceReference {
                invoice_number: Some(invoice_number.into()),
                ..InvoiceReference::default()
            },
            account: AccountReference {
                code: Some(account_code.into()),
                ..AccountReference::default()
            },
            date: Some(date),
            amount: Some(amount),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Summary {
    #[serde(rename = "PaymentID")]
    pub payment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(rename = "DateTimeUTC", default, with = "xero_datetime_format_option")]
    pub date_time_utc: Option<OffsetDateTime>,
    #[serde(default, with = "payments")]
    pub payments: Vec<Payment>,
}

wrapped_list!(mod payments: Payment => "Payment");

impl Envelope for Response {
    type Record = Payment;

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn into_records(self) -> Vec<Payment> {
        self.payments
    }
}

#[derive(Serialize)]
#[serde(rename = "Payments")]
struct Request<'a> {
    #[serde(rename = "Payment")]
    payments: &'a [Payment],
}

impl Resource for Payment {
    const NAME: &'static str = "Payment";

    type Envelope = Response;
    type Summary = Summary;

    fn endpoint() -> XeroEndpoint {
        XeroEndpoint::Payments
    }

    fn to_xml(records: &[Self]) -> Result<String> {
        super::to_xml(&Request { payments: records })
    }

    fn identifier(&self) -> Option<Uuid> {
        self.payment_id
    }

    fn summary(&self) -> Summary {
        Summary {
            payment_id: self.payment_id,
        }
    }
}
