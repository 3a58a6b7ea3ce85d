//! Sentry integration for xero-private errors.
//!
//! Only available with the `sentry` feature:
//!
//! ```toml
//! [dependencies]
//! xero-private = { version = "0.1", features = ["sentry"] }
//! ```
//!
//! Errors convert into breadcrumbs with `Breadcrumb::from(&error)`, and
//! [`error_to_sentry_context`] collects extra context for a scope.

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::{Error, ErrorCategory};

/// Convert an xero-private Error into a Sentry breadcrumb.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let mut data = BTreeMap::new();
        let category = match error {
            Error::NotFound {
                url, status_code, ..
            } => {
                data.insert("url".to_string(), Value::from(url.clone()));
                data.insert("status_code".to_string(), Value::from(status_code.as_u16()));
                "http.response"
            }
            Error::OAuth {
                problem,
                status_code,
                ..
            } => {
                data.insert("problem".to_string(), Value::from(problem.clone()));
                data.insert("status_code".to_string(), Value::from(status_code.as_u16()));
                "auth"
            }
            Error::RateLimitExceeded { url, .. } => {
                data.insert("url".to_string(), Value::from(url.clone()));
                "xero.rate_limit"
            }
            Error::Api { exception, .. } => {
                data.insert("error_number".to_string(), Value::from(exception.error_number));
                data.insert(
                    "error_type".to_string(),
                    Value::from(exception.exception_type.clone()),
                );
                "xero.api"
            }
            Error::DeserializationError { .. } => "http.response",
            Error::Request(_) => "http.request",
            _ => match error.category() {
                ErrorCategory::Client => "xero.config",
                _ => "xero",
            },
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(error.to_string()),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Extra context for a Sentry scope: the span trace, the response body preview and the
/// validation messages of an API error, when present.
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(span_trace) = error.span_trace() {
        context.insert(
            "xero.span_trace".to_string(),
            Value::from(format!("{span_trace}")),
        );
    }

    let body = match error {
        Error::DeserializationError { response_body, .. }
        | Error::NotFound { response_body, .. } => response_body.as_deref(),
        _ => None,
    };
    if let Some(body) = body {
        let truncated: String = body.chars().take(500).collect();
        context.insert("xero.response_body".to_string(), Value::from(truncated));
    }

    if let Some(exception) = error.api_exception() {
        let messages = exception
            .validation_messages()
            .into_iter()
            .map(Value::from)
            .collect::<Vec<_>>();
        if !messages.is_empty() {
            context.insert("xero.validation_errors".to_string(), Value::Array(messages));
        }
    }

    context
}
