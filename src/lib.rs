//! # xero-private
//!
//! A Rust client for the accounting API of a Xero private application: invoices,
//! payments and manual journals, exchanged as XML and signed with OAuth 1.0a RSA-SHA1.
//!
//! ```no_run
//! use xero_private::{Client, Credentials};
//!
//! # async fn run() -> xero_private::error::Result<()> {
//! let credentials = Credentials::from_pem_file("CONSUMER_KEY", "privatekey.pem")?;
//! let client = Client::new(credentials)?;
//! let invoices = client.invoices().list_all().await?;
//! println!("{} invoices", invoices.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors and Sentry
//!
//! Decode and API errors capture a [`SpanTrace`] where they are created. Install
//! `tracing_error::ErrorLayer` in your subscriber for the trace to carry spans:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .init();
//! ```
//!
//! With the `sentry` feature, errors convert into Sentry breadcrumbs.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod oauth;
pub mod pagination;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::{Client, ClientBuilder, RawResponse, Transport};
pub use endpoints::XeroEndpoint;
pub use entities::{
    Envelope, Resource,
    contact::{Address, AddressType, Contact},
    invoice::Invoice,
    line_item::{LineAmountType, LineItem},
    manual_journal::{JournalLine, ManualJournal},
    payment::Payment,
};
pub use error::{ApiException, Error, ErrorCategory};
pub use oauth::Credentials;
pub use pagination::{ListOptions, Pacing, Pages};

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;
