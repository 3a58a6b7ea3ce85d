use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::endpoints::XeroEndpoint;
use crate::error::{ApiException, Error, Result};

pub mod contact;
pub mod invoice;
pub mod line_item;
pub mod manual_journal;
pub mod payment;

/// The status Xero writes into a response envelope when the request succeeded.
pub const STATUS_OK: &str = "OK";

/// A record type living in one of the collections of the accounting API.
pub trait Resource: Serialize + DeserializeOwned + Sized {
    /// Name used in log lines.
    const NAME: &'static str;

    /// The envelope Xero wraps around these records in responses.
    type Envelope: Envelope<Record = Self>;

    /// The subset of fields reported back after a successful create.
    type Summary: Serialize;

    /// The collection this record type belongs to.
    fn endpoint() -> XeroEndpoint;

    /// Writes `records` as the XML document Xero expects in the `xml` form field.
    fn to_xml(records: &[Self]) -> Result<String>;

    /// The identifier assigned by Xero, `None` until the record has been created.
    fn identifier(&self) -> Option<Uuid>;

    fn summary(&self) -> Self::Summary;
}

/// The `<Response>` document wrapping the records of a successful call.
pub trait Envelope: DeserializeOwned {
    type Record;

    fn status(&self) -> Option<&str>;

    fn into_records(self) -> Vec<Self::Record>;

    fn is_ok(&self) -> bool {
        self.status() == Some(STATUS_OK)
    }
}

pub(crate) fn to_xml<T: Serialize>(document: &T) -> Result<String> {
    let xml = quick_xml::se::to_string(document).map_err(|e| {
        error!("Failed to serialize request XML: {}", e);
        Error::SerializationError(e.to_string())
    })?;
    Ok(escape_edge_whitespace(&xml))
}

pub(crate) fn from_xml<T: DeserializeOwned>(xml: &str) -> std::result::Result<T, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

/// The decoder trims element text before resolving references, so leading and trailing
/// whitespace of every text node is written as character references to keep free text
/// such as `Reference` or `Narration` intact.
///
/// The serializer never indents and escapes `<` and `>` in content, so everything between
/// a `>` and the next `<` is text.
fn escape_edge_whitespace(xml: &str) -> String {
    let mut escaped = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(close) = rest.find('>') {
        let (markup, after) = rest.split_at(close + 1);
        escaped.push_str(markup);
        let (text, tail) = after.split_at(after.find('<').unwrap_or(after.len()));
        push_text(&mut escaped, text);
        rest = tail;
    }
    escaped.push_str(rest);
    escaped
}

fn push_text(escaped: &mut String, text: &str) {
    let is_space = |c: char| matches!(c, ' ' | '\t' | '\r' | '\n');
    let body = text.trim_matches(is_space);
    let (leading, trailing) = if body.is_empty() {
        (text, "")
    } else {
        let start = text.len() - text.trim_start_matches(is_space).len();
        let end = text.trim_end_matches(is_space).len();
        (&text[..start], &text[end..])
    };
    let push_refs = |escaped: &mut String, spaces: &str| {
        for c in spaces.chars() {
            escaped.push_str(&format!("&#{};", u32::from(c)));
        }
    };
    push_refs(escaped, leading);
    escaped.push_str(body);
    push_refs(escaped, trailing);
}

/// Decodes the envelope in `body`, returning its records when the status is `OK`.
///
/// Any other status means `body` holds an `ApiException`, which is decoded and returned
/// as [`Error::Api`]. If that decode fails too the result is a deserialization error.
pub fn decode_envelope<R: Resource>(body: &str) -> Result<Vec<R>> {
    let envelope: R::Envelope = from_xml(body).map_err(|e| {
        error!("Failed to deserialize {} response: {}", R::NAME, e);
        Error::deserialization(e, body)
    })?;

    if envelope.is_ok() {
        let records = envelope.into_records();
        debug!("Decoded {} {} records", records.len(), R::NAME);
        return Ok(records);
    }

    let exception: ApiException = from_xml(body).map_err(|e| {
        error!("Failed to deserialize ApiException for {}: {}", R::NAME, e);
        Error::deserialization(e, body)
    })?;
    error!(
        "Xero API error for {}: {} ({})",
        R::NAME,
        exception.message,
        exception.exception_type
    );
    Err(Error::api(exception))
}

/// Re-marshals the summaries of `records` as a JSON array.
pub fn summarize<R: Resource>(records: &[R]) -> Result<serde_json::Value> {
    let summaries = records.iter().map(Resource::summary).collect::<Vec<_>>();
    Ok(serde_json::to_value(summaries)?)
}
