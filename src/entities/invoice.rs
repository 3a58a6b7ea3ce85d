use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{Envelope, Resource, contact::Contact, line_item::{LineAmountType, LineItem}};
use crate::endpoints::XeroEndpoint;
use crate::error::Result;
use crate::utils::date_format::{xero_date_format_option, xero_datetime_format_option};
use crate::utils::serde_helpers::{display_fromstr, wrapped_list, xero_enum};

xero_enum! {
    pub enum Type {
        /// A bill from a supplier.
        AccountsPayable => "ACCPAY",
        /// A sales invoice.
        AccountsReceivable => "ACCREC",
    }
}

xero_enum! {
    pub enum Status {
        Draft => "DRAFT",
        Submitted => "SUBMITTED",
        Deleted => "DELETED",
        Authorised => "AUTHORISED",
        Paid => "PAID",
        Voided => "VOIDED",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Invoice", rename_all = "PascalCase")]
pub struct Invoice {
    #[serde(
        rename = "InvoiceID",
        default,
        with = "display_fromstr",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub r#type: Type,
    pub contact: Contact,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub expected_payment_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_amount_types: Option<LineAmountType>,
    #[serde(default, with = "line_items", skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    // Totals are computed by Xero and only present in responses.
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<Decimal>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<Decimal>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<Decimal>,
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,
}

wrapped_list!(mod line_items: LineItem => "LineItem");

impl Invoice {
    #[must_use]
    pub fn new(r#type: Type, contact: Contact) -> Self {
        Self {
            invoice_id: None,
            invoice_number: None,
            r#type,
            contact,
            date: None,
            due_date: None,
            expected_payment_date: None,
            status: None,
            line_amount_types: None,
            line_items: Vec::new(),
            reference: None,
            currency_code: None,
            sub_total: None,
            total_tax: None,
            total: None,
            amount_due: None,
            amount_paid: None,
        }
    }
}

/// The fields reported back to the caller after invoices are created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Summary {
    #[serde(rename = "InvoiceID")]
    pub invoice_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub reference: Option<String>,
    #[serde(serialize_with = "xero_date_format_option::serialize")]
    pub expected_payment_date: Option<Date>,
    /// Unit amount of the first line item.
    pub amount: Option<Decimal>,
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
    #[serde(default, with = "invoices")]
    pub invoices: Vec<Invoice>,
}

wrapped_list!(mod invoices: Invoice => "Invoice");

impl Envelope for Response {
    type Record = Invoice;

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn into_records(self) -> Vec<Invoice> {
        self.invoices
    }
}

#[derive(Serialize)]
#[serde(rename = "Invoices")]
struct Request<'a> {
    #[serde(rename = "Invoice")]
    invoices: &'a [Invoice],
}

impl Resource for Invoice {
    const NAME: &'static str = "Invoice";

    type Envelope = Response;
    type Summary = Summary;

    fn endpoint() -> XeroEndpoint {
        XeroEndpoint::Invoices
    }

    fn to_xml(records: &[Self]) -> Result<String> {
        super::to_xml(&Request { invoices: records })
    }

    fn identifier(&self) -> Option<Uuid> {
        self.invoice_id
    }

    fn summary(&self) -> Summary {
        Summary {
            invoice_id: self.invoice_id,
            invoice_number: self.invoice_number.clone(),
            reference: self.reference.clone(),
            expected_payment_date: self.expected_payment_date,
            amount: self.line_items.first().and_then(|item| item.unit_amount),
        }
    }
}
