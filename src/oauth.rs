//! OAuth 1.0a request signing with RSA-SHA1, as used by Xero private applications.
//!
//! A private application is issued a consumer key up front and signs every request with
//! the RSA key whose certificate was uploaded to the developer portal. The consumer key
//! doubles as the access token, so there is no token exchange.

use std::{fmt, num::NonZeroU64, path::Path};

use oauth1_request::{ParameterList, Rsa09Sha1, Token};
use reqwest::Method;
use rsa::{RsaPrivateKey, pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Stores the consumer key, access token and RSA signing key of a private application.
#[derive(Clone)]
pub struct Credentials {
    consumer_key: String,
    token: String,
    signature_method: Rsa09Sha1,
}

impl Credentials {
    /// Creates credentials for a private application, where the consumer key is also the
    /// access token.
    pub fn new(token: impl Into<String>, private_key_pem: &str) -> Result<Self> {
        let token = token.into();
        Self::with_consumer_key(token.clone(), token, private_key_pem)
    }

    /// Creates credentials with a consumer key distinct from the access token.
    pub fn with_consumer_key(
        consumer_key: impl Into<String>,
        token: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self> {
        let private_key = parse_private_key(private_key_pem)?;
        Ok(Self {
            consumer_key: consumer_key.into(),
            token: token.into(),
            signature_method: Rsa09Sha1::new(private_key),
        })
    }

    /// Reads the PEM encoded private key from `path`.
    pub fn from_pem_file(token: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let pem = std::fs::read_to_string(path)?;
        Self::new(token, &pem)
    }

    /// Creates credentials from the `XERO_CONSUMER_KEY` environment variable and either
    /// `XERO_PRIVATE_KEY` (inline PEM) or `XERO_PRIVATE_KEY_PATH` (PEM file).
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("XERO_CONSUMER_KEY")
            .map_err(|_| Error::MissingEnvironment("XERO_CONSUMER_KEY"))?;
        if let Ok(pem) = std::env::var("XERO_PRIVATE_KEY") {
            return Self::new(token, &pem);
        }
        let path = std::env::var("XERO_PRIVATE_KEY_PATH")
            .map_err(|_| Error::MissingEnvironment("XERO_PRIVATE_KEY_PATH"))?;
        Self::from_pem_file(token, path)
    }

    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Builds the `Authorization` header value for a request, signing the method, URL
    /// (including its query) and any form parameters of the body.
    pub(crate) fn authorization_header(
        &self,
        method: &Method,
        url: &Url,
        form: &[(String, String)],
    ) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        self.authorization_header_with(method, url, form, &nonce, None)
    }

    /// Same as `authorization_header`, with a fixed nonce and optionally a fixed timestamp.
    pub(crate) fn authorization_header_with(
        &self,
        method: &Method,
        url: &Url,
        form: &[(String, String)],
        nonce: &str,
        timestamp: Option<NonZeroU64>,
    ) -> String {
        // The signer takes the query as request parameters, never as part of the URI.
        let mut base_uri = url.clone();
        base_uri.set_query(None);
        base_uri.set_fragment(None);
        let params: ParameterList<String, String> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .chain(form.iter().cloned())
            .collect();
        trace!(%method, %url, "signing request");

        let token = Token::from_parts(
            self.consumer_key.as_str(),
            "",
            self.token.as_str(),
            "",
        );
        let mut builder = oauth1_request::Builder::with_token(token, &self.signature_method);
        builder.nonce(nonce).timestamp(timestamp).version(true);
        builder.authorize(method.as_str(), base_uri, &params)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("token", &"<redacted>")
            .field("signature_method", &"<redacted>")
            .finish()
    }
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem).or_else(|pkcs1_error| {
        RsaPrivateKey::from_pkcs8_pem(pem).map_err(|pkcs8_error| {
            Error::InvalidPrivateKey(format!(
                "not a PKCS#1 key ({pkcs1_error}) nor a PKCS#8 key ({pkcs8_error})"
            ))
        })
    })
}
