//! Administrative operations
//!
//! Reference-data uploads (price lists, duty rates), the all-users upload
//! listing, review decisions and dashboard statistics. Every call requires
//! an admin session; the service answers 403 for anyone else.

mod types;

use std::collections::HashMap;

use async_trait::async_trait;
use log::warn;
use reqwest::Client;

use crate::error::Error;
use crate::fetch::{self, Fetch, ProgressFn};
use crate::file::{FilePolicy, SelectedFile};
use crate::records::UploadLister;
use crate::session::SessionStore;
use crate::uploads::{UploadListResponse, UploadStatus};

pub use types::*;

/// Client for administrative operations
pub struct AdminClient {
    base: String,
    client: Client,
    session: SessionStore,
    policy: FilePolicy,
}

impl AdminClient {
    pub(crate) fn new(base: &str, client: Client, session: SessionStore) -> Self {
        Self {
            base: base.to_string(),
            client,
            session,
            policy: FilePolicy::spreadsheet(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/admin{}", self.base, path)
    }

    /// Replace the price list with the contents of a spreadsheet
    ///
    /// Validated client-side like any other upload; the response reports
    /// how many rows were taken over.
    pub async fn upload_price_list(
        &self,
        file: &SelectedFile,
        on_progress: Option<ProgressFn>,
    ) -> Result<ReferenceUploadResponse, Error> {
        self.policy.check_file(file)?;

        fetch::upload_multipart(
            &self.client,
            &self.endpoint("/upload/price-list"),
            self.session.token(),
            file,
            on_progress,
            "Price list upload failed",
        )
        .await
    }

    /// Replace the duty rates with the contents of a spreadsheet
    pub async fn upload_duty_rates(
        &self,
        file: &SelectedFile,
        on_progress: Option<ProgressFn>,
    ) -> Result<ReferenceUploadResponse, Error> {
        self.policy.check_file(file)?;

        fetch::upload_multipart(
            &self.client,
            &self.endpoint("/upload/duty-rate"),
            self.session.token(),
            file,
            on_progress,
            "Duty rate upload failed",
        )
        .await
    }

    /// Fetch one page of all users' uploads, newest first
    ///
    /// Records carry the uploader's `username` in this listing.
    pub async fn list(
        &self,
        page: u32,
        status: Option<UploadStatus>,
    ) -> Result<UploadListResponse, Error> {
        let mut params = HashMap::new();
        params.insert("page".to_string(), page.to_string());
        if let Some(status) = status {
            params.insert("status".to_string(), status.to_string());
        }

        Fetch::get(&self.client, &self.endpoint("/uploads"))
            .bearer_auth_opt(self.session.token())
            .query(params)
            .error_context("Failed to fetch uploads")
            .execute::<UploadListResponse>()
            .await
    }

    /// Submit a review decision for a pending upload
    ///
    /// Only pending uploads can be reviewed; anything else earns a 400
    /// from the service. Callers re-fetch the listing and stats after a
    /// success instead of patching local state, so the displayed status
    /// is always the service's own.
    pub async fn review(
        &self,
        upload_id: i64,
        request: &ReviewRequest,
    ) -> Result<ReviewResponse, Error> {
        let url = self.endpoint(&format!("/review/{}", upload_id));

        Fetch::post(&self.client, &url)
            .bearer_auth_opt(self.session.token())
            .json(request)?
            .error_context("Review failed")
            .execute::<ReviewResponse>()
            .await
    }

    /// Fetch the dashboard counters
    pub async fn stats(&self) -> Result<AdminStats, Error> {
        Fetch::get(&self.client, &self.endpoint("/stats"))
            .bearer_auth_opt(self.session.token())
            .error_context("Failed to fetch stats")
            .execute::<AdminStats>()
            .await
    }

    /// Fetch one page of the price list, optionally filtered by a search term
    pub async fn price_list(
        &self,
        page: u32,
        search: Option<&str>,
    ) -> Result<PriceListPage, Error> {
        Fetch::get(&self.client, &self.endpoint("/price-list"))
            .bearer_auth_opt(self.session.token())
            .query(paged_search_params(page, search))
            .error_context("Failed to fetch price list")
            .execute::<PriceListPage>()
            .await
    }

    /// Fetch one page of the duty rates, optionally filtered by a search term
    pub async fn duty_rates(
        &self,
        page: u32,
        search: Option<&str>,
    ) -> Result<DutyRatePage, Error> {
        Fetch::get(&self.client, &self.endpoint("/duty-rates"))
            .bearer_auth_opt(self.session.token())
            .query(paged_search_params(page, search))
            .error_context("Failed to fetch duty rates")
            .execute::<DutyRatePage>()
            .await
    }
}

fn paged_search_params(page: u32, search: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    params.insert("page".to_string(), page.to_string());
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        params.insert("search".to_string(), search.to_string());
    }
    params
}

#[async_trait]
impl UploadLister for AdminClient {
    async fn list_uploads(
        &self,
        page: u32,
        status: Option<UploadStatus>,
    ) -> Result<UploadListResponse, Error> {
        self.list(page, status).await
    }
}

/// Last known dashboard statistics
///
/// Statistics refresh in the background of the admin dashboard; a failed
/// refresh is the one error this crate swallows. It is logged and the
/// previous counters stay in place.
#[derive(Debug, Default)]
pub struct StatsCache {
    stats: Option<AdminStats>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent successfully fetched counters
    pub fn get(&self) -> Option<&AdminStats> {
        self.stats.as_ref()
    }

    /// Fetch fresh counters; returns whether the cache was updated
    pub async fn refresh(&mut self, admin: &AdminClient) -> bool {
        match admin.stats().await {
            Ok(stats) => {
                self.stats = Some(stats);
                true
            }
            Err(err) => {
                warn!("stats refresh failed, keeping previous values: {}", err);
                false
            }
        }
    }
}
