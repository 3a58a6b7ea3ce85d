use anyhow::Result;
use reqwest::StatusCode;
use url::Url;
use xero_private::{Client, Invoice, XeroEndpoint};

mod test_utils;

use test_utils::{CONSUMER_KEY, MockTransport, fixture, invoices_envelope, mock_client};

/// The `key="value"` pairs of an `OAuth ...` authorization header.
fn oauth_params(header: &str) -> Vec<(String, String)> {
    header
        .trim_start_matches("OAuth ")
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.trim_matches('"').to_string()))
        .collect()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[tokio::test]
async fn get_requests_are_signed_and_ask_for_xml() -> Result<()> {
    test_utils::do_setup();
    let transport = MockTransport::replying(StatusCode::OK, invoices_envelope([]));
    let client = mock_client(transport.clone());

    client.list::<Invoice>(1).await?;

    let request = &transport.requests()[0];
    let authorization = request.header("authorization").expect("authorization header");
    assert!(authorization.starts_with("OAuth "));

    let params = oauth_params(authorization);
    assert_eq!(param(&params, "oauth_consumer_key"), Some(CONSUMER_KEY));
    assert_eq!(param(&params, "oauth_token"), Some(CONSUMER_KEY));
    assert_eq!(param(&params, "oauth_signature_method"), Some("RSA-SHA1"));
    assert_eq!(param(&params, "oauth_version"), Some("1.0"));
    assert!(param(&params, "oauth_nonce").is_some_and(|nonce| !nonce.is_empty()));
    assert!(param(&params, "oauth_timestamp").is_some_and(|ts| ts.parse::<i64>().is_ok()));
    assert!(param(&params, "oauth_signature").is_some_and(|sig| !sig.is_empty()));

    assert_eq!(request.header("accept"), Some("application/xml"));
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded; charset=utf-8")
    );
    assert!(request.header("user-agent").is_some_and(|ua| ua.starts_with("xero-private/")));
    Ok(())
}

#[tokio::test]
async fn every_request_gets_a_fresh_nonce() -> Result<()> {
    test_utils::do_setup();
    let transport = MockTransport::replying(StatusCode::OK, invoices_envelope([]));
    let client = mock_client(transport.clone());

    client.list::<Invoice>(1).await?;
    client.list::<Invoice>(1).await?;

    let nonces = transport
        .requests()
        .iter()
        .map(|request| {
            let params = oauth_params(request.header("authorization").unwrap_or_default());
            param(&params, "oauth_nonce").map(ToString::to_string)
        })
        .collect::<Vec<_>>();
    assert_eq!(nonces.len(), 2);
    assert_ne!(nonces[0], nonces[1]);
    Ok(())
}

#[tokio::test]
async fn post_sends_the_document_in_the_xml_form_field() -> Result<()> {
    test_utils::do_setup();
    let transport = MockTransport::replying(StatusCode::OK, fixture("invoices_created.xml"));
    let client = mock_client(transport.clone());

    let body = client
        .post_xml(&XeroEndpoint::Invoices, "<Invoices><Invoice><Reference>a & b</Reference></Invoice></Invoices>")
        .await?;
    assert!(body.contains("<Status>OK</Status>"));

    let request = &transport.requests()[0];
    let raw = request.body.as_deref().expect("form body");
    assert!(raw.starts_with("xml=%3CInvoices%3E"));
    assert!(!raw.contains('&'));
    assert_eq!(
        request.posted_xml().as_deref(),
        Some("<Invoices><Invoice><Reference>a & b</Reference></Invoice></Invoices>")
    );
    Ok(())
}

#[tokio::test]
async fn builder_overrides_base_url_and_user_agent() -> Result<()> {
    test_utils::do_setup();
    let transport = MockTransport::replying(StatusCode::OK, invoices_envelope([]));
    let client = Client::builder(test_utils::credentials())
        .transport(transport.clone())
        .base_url(Url::parse("http://localhost:8080")?)
        .user_agent("accounting-sync/2.1")
        .build()?;

    client.get_xml(&XeroEndpoint::ManualJournals, &[("page", "7".to_string())]).await?;

    let request = &transport.requests()[0];
    assert_eq!(
        request.url.as_str(),
        "http://localhost:8080/api.xro/2.0/ManualJournals?page=7"
    );
    assert_eq!(request.header("user-agent"), Some("accounting-sync/2.1"));
    Ok(())
}

#[test]
fn credentials_from_env_report_the_missing_variable() {
    // Only meaningful where the variable is unset, e.g. CI.
    if std::env::var_os("XERO_CONSUMER_KEY").is_some() {
        return;
    }
    assert!(matches!(
        xero_private::Credentials::from_env(),
        Err(xero_private::Error::MissingEnvironment("XERO_CONSUMER_KEY"))
    ));
}
