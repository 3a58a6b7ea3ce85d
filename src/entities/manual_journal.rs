use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{Envelope, Resource, line_item::LineAmountType};
use crate::endpoints::XeroEndpoint;
use crate::error::Result;
use crate::utils::date_format::{xero_date_format_option, xero_datetime_format_option};
use crate::utils::serde_helpers::{display_fromstr, wrapped_list, xero_enum};

xero_enum! {
    pub enum Status {
        Draft => "DRAFT",
        Posted => "POSTED",
        Deleted => "DELETED",
        Voided => "VOIDED",
    }
}

/// One debit (positive amount) or credit (negative amount) line of a journal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "JournalLine", rename_all = "PascalCase")]
pub struct JournalLine {
    #[serde(default, with = "display_fromstr", skip_serializing_if = "Option::is_none")]
    pub line_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,
}

impl JournalLine {
    #[must_use]
    pub fn new(line_amount: Decimal, account_code: impl Into<String>) -> Self {
        Self {
            line_amount: Some(line_amount),
            account_code: Some(account_code.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "ManualJournal", rename_all = "PascalCase")]
pub struct ManualJournal {
    #[serde(
        rename = "ManualJournalID",
        default,
        with = "display_fromstr",
        skip_serializing_if = "Option::is_none"
    )]
    pub manual_journal_id: Option<Uuid>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default)]
    pub narration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_amount_types: Option<LineAmountType>,
    #[serde(default, with = "journal_lines", skip_serializing_if = "Vec::is_empty")]
    pub journal_lines: Vec<JournalLine>,
}

wrapped_list!(mod journal_lines: JournalLine => "JournalLine");

impl ManualJournal {
    #[must_use]
    pub fn new(narration: impl Into<String>, date: Date, journal_lines: Vec<JournalLine>) -> Self {
        Self {
            narration: narration.into(),
            date: Some(date),
            journal_lines,
            ..Self::default()
        }
    }

    /// Sum of all line amounts. Xero only accepts journals that balance to zero.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.journal_lines
            .iter()
            .filter_map(|line| line.line_amount)
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "JournalID")]
    pub journal_id: Option<Uuid>,
    #[serde(rename = "Date", serialize_with = "xero_date_format_option::serialize")]
    pub date: Option<Date>,
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
    #[serde(default, with = "manual_journals")]
    pub manual_journals: Vec<ManualJournal>,
}

wrapped_list!(mod manual_journals: ManualJournal => "ManualJournal");

impl Envelope for Response {
    type Record = ManualJournal;

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn into_records(self) -> Vec<ManualJournal> {
        self.manual_journals
    }
}

#[derive(Serialize)]
#[serde(rename = "ManualJournals")]
struct Request<'a> {
    #[serde(rename = "ManualJournal")]
    manual_journals: &'a [ManualJournal],
}

impl Resource for ManualJournal {
    const NAME: &'static str = "ManualJournal";

    type Envelope = Response;
    type Summary = Summary;

    fn endpoint() -> XeroEndpoint {
        XeroEndpoint::ManualJournals
    }

    fn to_xml(records: &[Self]) -> Result<String> {
        super::to_xml(&Request {
            manual_journals: records,
        })
    }

    fn identifier(&self) -> Option<Uuid> {
        self.manual_journal_id
    }

    fn summary(&self) -> Summary {
        Summary {
            journal_id: self.manual_journal_id,
            date: self.date,
        }
    }
}
