use std::future::Future;

use reqwest::{
    Method, StatusCode,
    header::{self, HeaderValue},
};
use url::Url;

use crate::endpoints::{BASE_URL, XeroEndpoint};
use crate::entities::{
    Resource, decode_envelope, invoice::Invoice, manual_journal::ManualJournal, payment::Payment,
    summarize,
};
use crate::error::{Error, Result};
use crate::oauth::Credentials;
use crate::pagination::{ListOptions, Pacing, Pages};

const ACCEPT_XML: &str = "application/xml";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
const DEFAULT_USER_AGENT: &str = concat!("xero-private/", env!("CARGO_PKG_VERSION"));
const RATE_LIMIT_PROBLEM: &str = "rate limit exceeded";

/// The parts of an HTTP response the client looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub url: String,
    pub body: String,
}

/// Sends a fully built, signed request and reads back the response body.
///
/// Implemented for [`reqwest::Client`]; other implementations are mostly useful to
/// replay canned responses.
pub trait Transport {
    fn send(&self, request: reqwest::Request) -> impl Future<Output = Result<RawResponse>> + Send;
}

impl Transport for reqwest::Client {
    async fn send(&self, request: reqwest::Request) -> Result<RawResponse> {
        let response = self.execute(request).await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;
        Ok(RawResponse { status, url, body })
    }
}

/// This is the client used to talk to the accounting API of a Xero private application.
/// Every request is signed with the application's [`Credentials`].
#[derive(Clone, Debug)]
pub struct Client<T = reqwest::Client> {
    credentials: Credentials,
    base_url: Url,
    pacing: Pacing,
    user_agent: HeaderValue,
    transport: T,
}

/// Configures a [`Client`]. Obtained through [`Client::builder`].
#[derive(Debug)]
pub struct ClientBuilder<T = reqwest::Client> {
    credentials: Credentials,
    base_url: Option<Url>,
    pacing: Pacing,
    user_agent: Option<String>,
    transport: T,
}

impl ClientBuilder {
    fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: None,
            pacing: Pacing::default(),
            user_agent: None,
            transport: reqwest::Client::new(),
        }
    }
}

impl<T> ClientBuilder<T> {
    /// Replaces the HTTP transport, e.g. with a `reqwest::Client` carrying a timeout.
    pub fn transport<U: Transport>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            credentials: self.credentials,
            base_url: self.base_url,
            pacing: self.pacing,
            user_agent: self.user_agent,
            transport,
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<Client<T>> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(BASE_URL).map_err(|_| Error::InvalidEndpoint)?,
        };
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint);
        }
        let user_agent = match self.user_agent {
            Some(user_agent) => HeaderValue::from_str(&user_agent)?,
            None => HeaderValue::from_static(DEFAULT_USER_AGENT),
        };
        Ok(Client {
            credentials: self.credentials,
            base_url,
            pacing: self.pacing,
            user_agent,
            transport: self.transport,
        })
    }
}

impl Client {
    /// A client for the production API with default pacing.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    /// A client with credentials read by [`Credentials::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    #[must_use]
    pub fn builder(credentials: Credentials) -> ClientBuilder {
        ClientBuilder::new(credentials)
    }
}

impl<T: Transport> Client<T> {
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build a signed request. `form` is sent as the urlencoded body when not empty.
    pub(crate) fn build_request(
        &self,
        method: Method,
        url: Url,
        form: &[(String, String)],
    ) -> Result<reqwest::Request> {
        let authorization = self.credentials.authorization_header(&method, &url, form);

        let mut request = reqwest::Request::new(method, url);
        let headers = request.headers_mut();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&authorization)?);
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_XML));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(header::USER_AGENT, self.user_agent.clone());

        if !form.is_empty() {
            let body = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form)
                .finish();
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }

    /// Perform a signed `GET` against `endpoint` and return the response body.
    #[instrument(skip(self))]
    pub async fn get_xml(
        &self,
        endpoint: &XeroEndpoint,
        query: &[(&str, String)],
    ) -> Result<String> {
        let mut url = endpoint.to_url(&self.base_url)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        trace!(%url, "making GET request");
        let request = self.build_request(Method::GET, url, &[])?;
        let response = self.transport.send(request).await?;
        Self::handle_response(response)
    }

    /// Perform a signed `POST` with `xml` in the `xml` form field and return the response
    /// body.
    #[instrument(skip(self, xml))]
    pub async fn post_xml(&self, endpoint: &XeroEndpoint, xml: &str) -> Result<String> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(%url, xml_len = xml.len(), "making POST request");
        let form = [("xml".to_string(), xml.to_string())];
        let request = self.build_request(Method::POST, url, &form)?;
        let response = self.transport.send(request).await?;
        Self::handle_response(response)
    }

    fn handle_response(response: RawResponse) -> Result<String> {
        let RawResponse { status, url, body } = response;
        debug!("Response from {}: status={}, {} bytes", url, status, body.len());

        if body.starts_with("oauth_problem=") {
            let (problem, advice) = parse_oauth_problem(&body);
            warn!(%url, %status, %problem, ?advice, "oauth problem reported");
            if problem == RATE_LIMIT_PROBLEM {
                return Err(Error::RateLimitExceeded {
                    advice,
                    status_code: status,
                    url,
                });
            }
            return Err(Error::OAuth {
                problem,
                advice,
                status_code: status,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                url,
                status_code: status,
                response_body: Some(body),
            });
        }

        trace!("Response text:\n{}", body);
        Ok(body)
    }

    /// Creates `records` in one request and returns them as echoed back by the service,
    /// with their identifiers assigned.
    #[instrument(skip(self, records), fields(resource = R::NAME, count = records.len()))]
    pub async fn create<R: Resource>(&self, records: &[R]) -> Result<Vec<R>> {
        if records.is_empty() {
            return Err(Error::EmptyRequest);
        }
        let xml = R::to_xml(records)?;
        let body = self.post_xml(&R::endpoint(), &xml).await?;
        decode_envelope::<R>(&body)
    }

    /// [`Client::create`], followed by the JSON summary of the created records.
    #[instrument(skip(self, records), fields(resource = R::NAME))]
    pub async fn create_summary<R: Resource>(&self, records: &[R]) -> Result<serde_json::Value> {
        let created = self.create(records).await?;
        summarize(&created)
    }

    /// One page of records. An empty page means there are no more.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn list<R: Resource>(&self, page: u32) -> Result<Vec<R>> {
        self.list_with_options(&ListOptions::page(page)).await
    }

    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn list_with_options<R: Resource>(&self, options: &ListOptions) -> Result<Vec<R>> {
        let body = self.get_xml(&R::endpoint(), &options.query()).await?;
        decode_envelope::<R>(&body)
    }

    /// A page cursor over the whole collection of `R`.
    #[must_use]
    pub fn pages<R: Resource>(&self) -> Pages<'_, R, T> {
        Pages::new(self)
    }

    /// Every record of the collection, fetched page by page with the client's pacing.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn list_all<R: Resource>(&self) -> Result<Vec<R>> {
        self.pages::<R>().collect_all().await
    }

    /// Access the invoices API
    #[must_use]
    pub fn invoices(&self) -> ResourceApi<'_, Invoice, T> {
        ResourceApi::new(self)
    }

    /// Access the payments API
    #[must_use]
    pub fn payments(&self) -> ResourceApi<'_, Payment, T> {
        ResourceApi::new(self)
    }

    /// Access the manual journals API
    #[must_use]
    pub fn manual_journals(&self) -> ResourceApi<'_, ManualJournal, T> {
        ResourceApi::new(self)
    }
}

fn parse_oauth_problem(body: &str) -> (String, Option<String>) {
    let mut problem = String::new();
    let mut advice = None;
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "oauth_problem" => problem = value.into_owned(),
            "oauth_problem_advice" => advice = Some(value.into_owned()),
            _ => {}
        }
    }
    (problem, advice)
}

/// API handler for one collection, e.g. `client.invoices()`.
#[derive(Debug)]
pub struct ResourceApi<'a, R, T = reqwest::Client> {
    client: &'a Client<T>,
    _resource: std::marker::PhantomData<fn() -> R>,
}

pub type InvoicesApi<'a, T = reqwest::Client> = ResourceApi<'a, Invoice, T>;
pub type PaymentsApi<'a, T = reqwest::Client> = ResourceApi<'a, Payment, T>;
pub type ManualJournalsApi<'a, T = reqwest::Client> = ResourceApi<'a, ManualJournal, T>;

impl<'a, R: Resource, T: Transport> ResourceApi<'a, R, T> {
    fn new(client: &'a Client<T>) -> Self {
        Self {
            client,
            _resource: std::marker::PhantomData,
        }
    }

    pub async fn create(&self, records: &[R]) -> Result<Vec<R>> {
        self.client.create(records).await
    }

    pub async fn create_summary(&self, records: &[R]) -> Result<serde_json::Value> {
        self.client.create_summary(records).await
    }

    pub async fn list(&self, page: u32) -> Result<Vec<R>> {
        self.client.list(page).await
    }

    pub async fn list_all(&self) -> Result<Vec<R>> {
        self.client.list_all().await
    }

    #[must_use]
    pub fn pages(&self) -> Pages<'a, R, T> {
        Pages::new(self.client)
    }
}
