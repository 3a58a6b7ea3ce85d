use std::fmt;
use url::Url;

use crate::error::{Error, Result};

pub const BASE_URL: &str = "https://api.xero.com";

/// A typed representation of the Xero accounting collections this crate talks to.
///
/// Every variant maps to a fixed resource path below the service's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XeroEndpoint {
    Invoices,
    Payments,
    ManualJournals,

    // Custom path below the base URL, e.g. "/api.xro/2.0/Contacts"
    Custom(String),
}

impl XeroEndpoint {
    /// The resource path of this endpoint, relative to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Invoices => "/api.xro/2.0/Invoices",
            Self::Payments => "/api.xro/2.0/Payments",
            Self::ManualJournals => "/api.xro/2.0/ManualJournals",
            Self::Custom(path) => path,
        }
    }

    /// Joins the resource path onto `base`, replacing any path `base` already carries.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        if base.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint);
        }
        base.join(self.path()).map_err(|_| Error::InvalidEndpoint)
    }
}

impl fmt::Display for XeroEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
