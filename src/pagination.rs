//! Paging through a collection while staying under the provider's rate limit.
//!
//! Xero allows 60 calls per minute for a private application. [`Pages`] walks a
//! collection one page at a time and, following the configured [`Pacing`], sleeps
//! before the request that would start the next batch of pages.

use std::{marker::PhantomData, time::Duration};

use time::OffsetDateTime;
use tokio::time::sleep;

use crate::client::{Client, Transport};
use crate::entities::Resource;
use crate::error::Result;

pub const DEFAULT_PAGES_PER_PAUSE: u32 = 50;
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(60);

/// How often bulk listing pauses, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Number of pages fetched between two pauses. Zero disables pausing.
    pub pages_per_pause: u32,
    pub pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            pages_per_pause: DEFAULT_PAGES_PER_PAUSE,
            pause: DEFAULT_PAUSE,
        }
    }
}

impl Pacing {
    #[must_use]
    pub const fn new(pages_per_pause: u32, pause: Duration) -> Self {
        Self {
            pages_per_pause,
            pause,
        }
    }

    /// Never pauses.
    #[must_use]
    pub const fn unpaced() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Whether a pause is due before requesting the 1-based `page`, i.e. before pages
    /// 51, 101, 151 and so on with the default pacing.
    #[must_use]
    pub fn pauses_before(&self, page: u32) -> bool {
        self.pages_per_pause > 0 && page > 1 && (page - 1) % self.pages_per_pause == 0
    }
}

/// Parameters of a single list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number.
    pub page: u32,
    /// Carried for callers that track incremental syncs. It is not sent to the service.
    pub modified_after: Option<OffsetDateTime>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::page(1)
    }
}

impl ListOptions {
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page,
            modified_after: None,
        }
    }

    #[must_use]
    pub fn modified_after(mut self, modified_after: OffsetDateTime) -> Self {
        self.modified_after = Some(modified_after);
        self
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string())]
    }
}

/// A cursor over the pages of a collection, starting at page 1.
///
/// Paging ends at the first empty page or at the first error; after either,
/// [`Pages::next_page`] keeps returning `Ok(None)`.
#[derive(Debug)]
pub struct Pages<'a, R, T = reqwest::Client> {
    client: &'a Client<T>,
    next: u32,
    done: bool,
    pages_fetched: u32,
    pauses: u32,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R: Resource, T: Transport> Pages<'a, R, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self {
            client,
            next: 1,
            done: false,
            pages_fetched: 0,
            pauses: 0,
            _resource: PhantomData,
        }
    }

    /// Fetches the next page, returning `None` once the collection is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<R>>> {
        if self.done {
            return Ok(None);
        }

        let page = self.next;
        let pacing = self.client.pacing();
        if pacing.pauses_before(page) {
            warn!(
                resource = R::NAME,
                page,
                pause = ?pacing.pause,
                "pausing to stay under the rate limit"
            );
            self.pauses += 1;
            sleep(pacing.pause).await;
        }

        let records = match self.client.list::<R>(page).await {
            Ok(records) => records,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };
        self.pages_fetched += 1;
        self.next += 1;

        if records.is_empty() {
            debug!(resource = R::NAME, page, "reached the last page");
            self.done = true;
            return Ok(None);
        }
        Ok(Some(records))
    }

    /// Drains the remaining pages, concatenated in page order. Records collected before
    /// an error are dropped.
    pub async fn collect_all(mut self) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page);
        }
        Ok(records)
    }

    /// Number of list requests that returned a response, including the final empty page.
    #[must_use]
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Number of rate-limit pauses taken so far.
    #[must_use]
    pub fn pauses(&self) -> u32 {
        self.pauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pacing_pauses_after_every_fiftieth_page() {
        let pacing = Pacing::default();
        let due = (1..=160).filter(|page| pacing.pauses_before(*page)).collect::<Vec<_>>();
        assert_eq!(due, vec![51, 101, 151]);
    }

    #[test]
    fn unpaced_never_pauses() {
        let pacing = Pacing::unpaced();
        assert!((1..=500).all(|page| !pacing.pauses_before(page)));
    }

    #[test]
    fn modified_after_is_not_sent() {
        let options = ListOptions::page(3).modified_after(OffsetDateTime::UNIX_EPOCH);
        assert_eq!(options.query(), vec![("page", "3".to_string())]);
    }
}
