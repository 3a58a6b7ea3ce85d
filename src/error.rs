use std::fmt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_error::SpanTrace;

use crate::utils::serde_helpers::wrapped_list;

/// A single validation message attached to an element of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationError {
    pub message: String,
}

/// One rejected record inside an `ApiException`, reported by Xero as a `DataContractBase`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationElement {
    #[serde(default, with = "validation_errors")]
    pub validation_errors: Vec<ValidationError>,
}

wrapped_list!(mod validation_errors: ValidationError => "ValidationError");
wrapped_list!(mod elements: ValidationElement => "DataContractBase");

/// The error payload returned by the Xero API when an operation fails.
///
/// ```xml
/// <ApiException>
///   <ErrorNumber>10</ErrorNumber>
///   <Type>ValidationException</Type>
///   <Message>A validation exception occurred</Message>
///   <Elements>...</Elements>
/// </ApiException>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiException {
    pub error_number: u32,
    #[serde(rename = "Type", default)]
    pub exception_type: String,
    pub message: String,
    #[serde(default, with = "elements")]
    pub elements: Vec<ValidationElement>,
}

impl ApiException {
    /// All validation messages across every rejected element, in document order.
    #[must_use]
    pub fn validation_messages(&self) -> Vec<&str> {
        self.elements
            .iter()
            .flat_map(|element| element.validation_errors.iter())
            .map(|error| error.message.as_str())
            .collect()
    }
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Xero API Error ({}): {} [{}]",
            self.error_number, self.message, self.exception_type
        )?;
        for message in self.validation_messages() {
            write!(f, "\n  - {message}")?;
        }
        Ok(())
    }
}

/// Coarse classification of an [`Error`], so callers can decide on a retry policy without
/// matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request did not produce a usable HTTP response.
    Transport,
    /// The response body could not be decoded.
    Decode,
    /// The service processed the request and rejected it.
    Domain,
    /// The request was never sent because of local configuration or input.
    Client,
}

/// Errors that can occur when interacting with the Xero API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {0:?}")]
    #[diagnostic(
        code(xero_private::request_error),
        help("Check your network connection and Xero API availability")
    )]
    Request(#[source] reqwest::Error),

    #[error("error decoding response: {source}")]
    #[diagnostic(
        code(xero_private::deserialization_error),
        help("The API returned XML in an unexpected shape")
    )]
    DeserializationError {
        #[source]
        source: quick_xml::DeError,
        response_body: Option<String>,
        span_trace: SpanTrace,
    },

    #[error("error encoding request: {0}")]
    #[diagnostic(
        code(xero_private::serialization_error),
        help("A record could not be written as Xero XML")
    )]
    SerializationError(String),

    #[error("error encoding summary: {0}")]
    #[diagnostic(code(xero_private::json_error))]
    Json(#[source] serde_json::Error),

    /// A non-OK response envelope, carrying the decoded `ApiException`.
    #[error("{exception}")]
    #[diagnostic(
        code(xero_private::api_exception),
        help("Review the validation errors returned by the Xero API")
    )]
    Api {
        exception: ApiException,
        span_trace: SpanTrace,
    },

    #[error("object not found (url: {url})")]
    #[diagnostic(
        code(xero_private::not_found),
        help("Verify that the resource exists and that the organisation has access to it")
    )]
    NotFound {
        url: String,
        status_code: reqwest::StatusCode,
        response_body: Option<String>,
    },

    /// Xero rejected the OAuth signature or token, e.g. `token_rejected` or
    /// `signature_invalid`.
    #[error("oauth problem: {problem}")]
    #[diagnostic(
        code(xero_private::oauth_problem),
        help("Check the consumer key, access token and private key of the private application")
    )]
    OAuth {
        problem: String,
        advice: Option<String>,
        status_code: reqwest::StatusCode,
    },

    #[error("rate limit exceeded (url: {url})")]
    #[diagnostic(
        code(xero_private::rate_limit_exceeded),
        help("The Xero API allows 60 calls per minute. Wait and retry, or lower the paging pace.")
    )]
    RateLimitExceeded {
        advice: Option<String>,
        status_code: reqwest::StatusCode,
        url: String,
    },

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(xero_private::invalid_endpoint),
        help("Check that the base URL and resource path are correctly formatted")
    )]
    InvalidEndpoint,

    #[error("invalid RSA private key: {0}")]
    #[diagnostic(
        code(xero_private::invalid_private_key),
        help("Provide a PKCS#1 or PKCS#8 PEM encoded RSA private key")
    )]
    InvalidPrivateKey(String),

    #[error("environment variable {0} is not set")]
    #[diagnostic(code(xero_private::missing_environment))]
    MissingEnvironment(&'static str),

    #[error("i/o error: {0}")]
    #[diagnostic(code(xero_private::io))]
    Io(#[from] std::io::Error),

    #[error("invalid header value: {0}")]
    #[diagnostic(code(xero_private::invalid_header))]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("no records were given to create")]
    #[diagnostic(code(xero_private::empty_request))]
    EmptyRequest,
}

impl Error {
    pub(crate) fn deserialization(source: quick_xml::DeError, body: &str) -> Self {
        Self::DeserializationError {
            source,
            response_body: Some(body.to_owned()),
            span_trace: SpanTrace::capture(),
        }
    }

    pub(crate) fn api(exception: ApiException) -> Self {
        Self::Api {
            exception,
            span_trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Request(_)
            | Self::NotFound { .. }
            | Self::OAuth { .. }
            | Self::RateLimitExceeded { .. } => ErrorCategory::Transport,
            Self::DeserializationError { .. } => ErrorCategory::Decode,
            Self::Api { .. } => ErrorCategory::Domain,
            Self::SerializationError(_)
            | Self::Json(_)
            | Self::InvalidEndpoint
            | Self::InvalidPrivateKey(_)
            | Self::MissingEnvironment(_)
            | Self::Io(_)
            | Self::InvalidHeader(_)
            | Self::EmptyRequest => ErrorCategory::Client,
        }
    }

    /// The decoded `ApiException`, if the service rejected the request.
    #[must_use]
    pub fn api_exception(&self) -> Option<&ApiException> {
        match self {
            Self::Api { exception, .. } => Some(exception),
            _ => None,
        }
    }

    /// The human readable message reported by the service for a domain error.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        self.api_exception().map(|exception| exception.message.as_str())
    }

    /// The span trace captured where the error was created, when one was recorded.
    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            Self::DeserializationError { span_trace, .. } | Self::Api { span_trace, .. } => {
                Some(span_trace)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Type alias for results from this crate.
///
/// This is already a Miette diagnostic result due to the implementation of
/// the Diagnostic trait for the Error type.
pub type Result<O> = std::result::Result<O, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    const VALIDATION_EXCEPTION: &str = r#"<ApiException xmlns:i="http://www.w3.org/2001/XMLSchema-instance" xmlns="http://api.xero.com/api.xro/2.0">
  <ErrorNumber>10</ErrorNumber>
  <Type>ValidationException</Type>
  <Message>A validation exception occurred</Message>
  <Elements>
    <DataContractBase i:type="Invoice">
      <ValidationErrors>
        <ValidationError>
          <Message>Email address must be valid.</Message>
        </ValidationError>
        <ValidationError>
          <Message>Account code '999' is not a valid code for this document.</Message>
        </ValidationError>
      </ValidationErrors>
    </DataContractBase>
  </Elements>
</ApiException>"#;

    #[test]
    fn api_exception_decodes_validation_messages() {
        let exception: ApiException = quick_xml::de::from_str(VALIDATION_EXCEPTION).unwrap();
        assert_eq!(exception.error_number, 10);
        assert_eq!(exception.exception_type, "ValidationException");
        assert_eq!(exception.message, "A validation exception occurred");
        assert_eq!(
            exception.validation_messages(),
            vec![
                "Email address must be valid.",
                "Account code '999' is not a valid code for this document."
            ]
        );
    }

    #[test]
    fn api_exception_without_elements() {
        let exception: ApiException = quick_xml::de::from_str(
            "<ApiException><ErrorNumber>17</ErrorNumber><Type>ObjectNotFoundException</Type><Message>Not Found</Message></ApiException>",
        )
        .unwrap();
        assert!(exception.elements.is_empty());
        assert_eq!(
            exception.to_string(),
            "Xero API Error (17): Not Found [ObjectNotFoundException]"
        );
    }

    #[test]
    fn categories() {
        let exception = ApiException {
            error_number: 10,
            exception_type: "ValidationException".to_string(),
            message: "boom".to_string(),
            elements: Vec::new(),
        };
        let error = Error::api(exception);
        assert_eq!(error.category(), ErrorCategory::Domain);
        assert_eq!(error.api_message(), Some("boom"));
        assert!(error.span_trace().is_some());

        assert_eq!(Error::EmptyRequest.category(), ErrorCategory::Client);
        assert_eq!(
            Error::RateLimitExceeded {
                advice: None,
                status_code: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                url: String::new(),
            }
            .category(),
            ErrorCategory::Transport
        );
    }
}
