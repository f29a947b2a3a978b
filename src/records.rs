//! Record-list bookkeeping shared by the user and admin surfaces
//!
//! A [`RecordPager`] owns the page number, the status filter and the last
//! fetched page. Fetches are stamped with a sequence ticket; a response
//! belonging to an older ticket than the newest issued one is discarded,
//! so rapid page or filter flips can never overwrite fresh data with a
//! stale response.

use async_trait::async_trait;

use crate::error::Error;
use crate::uploads::{Pagination, UploadListResponse, UploadRecord, UploadStatus};

/// A paged source of upload records
///
/// Both the user listing (own uploads) and the admin listing (all uploads)
/// implement this, so pagers and tests work over either.
#[async_trait]
pub trait UploadLister {
    async fn list_uploads(
        &self,
        page: u32,
        status: Option<UploadStatus>,
    ) -> Result<UploadListResponse, Error>;
}

/// Identifies one issued fetch; only the newest ticket may apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Page, filter and cached-records state for one record list
#[derive(Debug)]
pub struct RecordPager {
    page: u32,
    status_filter: Option<UploadStatus>,
    records: Vec<UploadRecord>,
    pagination: Option<Pagination>,
    error: Option<String>,
    issued: u64,
}

impl RecordPager {
    /// Create a pager at page 1 with no filter
    pub fn new() -> Self {
        Self {
            page: 1,
            status_filter: None,
            records: Vec::new(),
            pagination: None,
            error: None,
            issued: 0,
        }
    }

    /// Create a pager at page 1 restricted to one status
    pub fn with_filter(status: UploadStatus) -> Self {
        let mut pager = Self::new();
        pager.status_filter = Some(status);
        pager
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn status_filter(&self) -> Option<UploadStatus> {
        self.status_filter
    }

    /// Records of the last applied page
    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    /// Paging metadata of the last applied page
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Message of the last failed fetch, cleared by the next applied page
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Jump to a page (minimum 1); takes effect on the next fetch
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Change the status filter and reset to page 1
    pub fn set_filter(&mut self, status: Option<UploadStatus>) {
        self.status_filter = status;
        self.page = 1;
    }

    /// Advance one page if the server reported a next page
    pub fn next_page(&mut self) -> bool {
        match &self.pagination {
            Some(pagination) if pagination.has_next => {
                self.page += 1;
                true
            }
            _ => false,
        }
    }

    /// Go back one page if the server reported a previous page
    pub fn prev_page(&mut self) -> bool {
        match &self.pagination {
            Some(pagination) if pagination.has_prev && self.page > 1 => {
                self.page -= 1;
                true
            }
            _ => false,
        }
    }

    /// Stamp a fetch; responses for older tickets will be discarded
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Apply a fetched page; returns false for a stale ticket
    pub fn apply_page(&mut self, ticket: FetchTicket, response: UploadListResponse) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.records = response.uploads;
        self.pagination = Some(response.pagination);
        self.error = None;
        true
    }

    /// Record a failed fetch; previous records stay visible
    pub fn apply_error(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.error = Some(message.into());
        true
    }

    /// Fetch the current page and apply it
    pub async fn refresh<L>(&mut self, lister: &L) -> Result<(), Error>
    where
        L: UploadLister + ?Sized,
    {
        let ticket = self.begin_fetch();
        match lister.list_uploads(self.page, self.status_filter).await {
            Ok(response) => {
                self.apply_page(ticket, response);
                Ok(())
            }
            Err(err) => {
                self.apply_error(ticket, err.to_string());
                Err(err)
            }
        }
    }

    /// Drop a record locally after the server confirmed its deletion
    ///
    /// Pagination metadata is left as fetched; the next refresh trues it up.
    pub fn remove_record(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }
}

impl Default for RecordPager {
    fn default() -> Self {
        Self::new()
    }
}
