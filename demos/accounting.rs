#[macro_use]
extern crate tracing;

use anyhow::Result;
use xero_private::{Client, Invoice, Payment, Resource};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Reads XERO_CONSUMER_KEY and XERO_PRIVATE_KEY (or XERO_PRIVATE_KEY_PATH)
    let client = Client::from_env()?;

    let invoices = client.invoices().list_all().await?;
    info!("found {} invoices", invoices.len());

    let total_due = invoices
        .iter()
        .filter_map(|invoice| invoice.amount_due)
        .sum::<rust_decimal::Decimal>();
    info!("total amount due: {}", total_due);

    // Stream payments page by page instead of collecting them all at once
    let mut pages = client.pages::<Payment>();
    while let Some(page) = pages.next_page().await? {
        info!("received {} payments", page.len());
    }
    info!(
        "fetched {} pages of payments with {} pauses",
        pages.pages_fetched(),
        pages.pauses()
    );

    if let Some(invoice) = invoices.first().cloned() {
        let copy = Invoice {
            invoice_id: None,
            invoice_number: None,
            ..invoice
        };
        debug!("would create {}", <Invoice as Resource>::to_xml(&[copy])?);
    }

    Ok(())
}
