use std::sync::{Arc, Mutex, Once};

use reqwest::{Method, StatusCode, header::HeaderMap};
use tracing::info;
use url::Url;

use xero_private::{Client, Credentials, Pacing, RawResponse, Transport};

pub const CONSUMER_KEY: &str = "HMYQ0JZDWBJQOSGEXAMPLEKEYDTOTI1";

static LOGGING_CONFIGURED: Once = Once::new();

/// Setup before test runs
pub fn do_setup() {
    LOGGING_CONFIGURED.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .init();
    });
    info!("Setting up test environment");
}

/// Reads a file from `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {path}: {e}"))
}

#[allow(dead_code)]
pub fn credentials() -> Credentials {
    Credentials::new(CONSUMER_KEY, &fixture("private_key.pem")).expect("fixture key parses")
}

/// What the mock transport saw of a request.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RecordedRequest {
    /// The `page` query parameter, if any.
    #[allow(dead_code)]
    pub fn page(&self) -> Option<u32> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    }

    /// The XML document posted in the `xml` form field.
    #[allow(dead_code)]
    pub fn posted_xml(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        url::form_urlencoded::parse(body.as_bytes())
            .find(|(key, _)| key == "xml")
            .map(|(_, value)| value.into_owned())
    }

    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

type Responder = dyn Fn(&RecordedRequest) -> RawResponse + Send + Sync;

/// An in-memory transport that records every request and answers with a scripted
/// response.
#[derive(Clone)]
pub struct MockTransport {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new(responder: impl Fn(&RecordedRequest) -> RawResponse + Send + Sync + 'static) -> Self {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers every request with `status` and `body`.
    pub fn replying(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |request| response(status, request, &body))
    }

    /// Answers `GET ...?page=n` with `page_body(n)`.
    pub fn paged(page_body: impl Fn(u32) -> String + Send + Sync + 'static) -> Self {
        Self::new(move |request| {
            let page = request.page().unwrap_or(1);
            response(StatusCode::OK, request, &page_body(page))
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .finish_non_exhaustive()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: reqwest::Request) -> xero_private::error::Result<RawResponse> {
        let recorded = RecordedRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        };
        let response = (self.responder)(&recorded);
        self.requests.lock().expect("requests lock").push(recorded);
        Ok(response)
    }
}

#[allow(dead_code)]
pub fn response(status: StatusCode, request: &RecordedRequest, body: &str) -> RawResponse {
    RawResponse {
        status,
        url: request.url.to_string(),
        body: body.to_string(),
    }
}

/// A client for the production base URL that talks to `transport` with default pacing.
#[allow(dead_code)]
pub fn mock_client(transport: MockTransport) -> Client<MockTransport> {
    Client::builder(credentials())
        .transport(transport)
        .build()
        .expect("client builds")
}

#[allow(dead_code)]
pub fn unpaced_client(transport: MockTransport) -> Client<MockTransport> {
    Client::builder(credentials())
        .transport(transport)
        .pacing(Pacing::unpaced())
        .build()
        .expect("client builds")
}

/// An OK envelope holding one invoice per number in `numbers`.
#[allow(dead_code)]
pub fn invoices_envelope(numbers: impl IntoIterator<Item = u32>) -> String {
    let invoices = numbers
        .into_iter()
        .map(|n| {
            format!(
                "<Invoice><Type>ACCREC</Type><InvoiceID>{}</InvoiceID>\
                 <InvoiceNumber>INV-{n:04}</InvoiceNumber>\
                 <Contact><Name>Arduino LLC</Name></Contact><Status>AUTHORISED</Status></Invoice>",
                uuid::Uuid::from_u128(u128::from(n))
            )
        })
        .collect::<String>();
    format!(
        "<Response><Id>4bb5d3ff-1a06-4a34-a2c4-59b3d8cd0ec6</Id><Status>OK</Status>\
         <ProviderName>xero-private tests</ProviderName>\
         <DateTimeUTC>2015-06-10T05:22:32.5137373Z</DateTimeUTC>\
         <Invoices>{invoices}</Invoices></Response>"
    )
}

/// Serves `pages` pages of `per_page` invoices each, numbered consecutively, then an
/// empty page.
#[allow(dead_code)]
pub fn paged_invoices(pages: u32, per_page: u32) -> MockTransport {
    MockTransport::paged(move |page| {
        if page > pages {
            invoices_envelope(std::iter::empty())
        } else {
            let first = (page - 1) * per_page + 1;
            invoices_envelope(first..first + per_page)
        }
    })
}
