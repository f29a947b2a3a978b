//! Upload operations for the signed-in user
//!
//! Covers the packing-list upload itself plus everything a user does with
//! their records afterwards: listing, details, download of the original
//! spreadsheet, deletion and item edits.

mod types;
mod uploader;

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use crate::error::Error;
use crate::fetch::{self, Fetch, ProgressFn};
use crate::file::{FilePolicy, SelectedFile};
use crate::records::UploadLister;
use crate::session::SessionStore;

pub use types::*;
pub use uploader::*;

/// Client for the signed-in user's uploads
pub struct UploadsClient {
    base: String,
    client: Client,
    session: SessionStore,
    policy: FilePolicy,
}

impl UploadsClient {
    pub(crate) fn new(base: &str, client: Client, session: SessionStore) -> Self {
        Self {
            base: base.to_string(),
            client,
            session,
            policy: FilePolicy::spreadsheet(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Upload a packing list spreadsheet
    ///
    /// The file is checked against the spreadsheet policy first; a file
    /// that fails never reaches the network. `on_progress` observes percent
    /// sent, ending at 100 once the service has accepted the upload.
    pub async fn upload_packing_list(
        &self,
        file: &SelectedFile,
        on_progress: Option<ProgressFn>,
    ) -> Result<UploadResponse, Error> {
        self.policy.check_file(file)?;

        fetch::upload_multipart(
            &self.client,
            &self.endpoint("/user/upload/packing-list"),
            self.session.token(),
            file,
            on_progress,
            "Upload failed",
        )
        .await
    }

    /// Fetch one page of the user's uploads, newest first
    ///
    /// `status` narrows the page to records in that status.
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

        Fetch::get(&self.client, &self.endpoint("/user/uploads"))
            .bearer_auth_opt(self.session.token())
            .query(params)
            .error_context("Failed to fetch uploads")
            .execute::<UploadListResponse>()
            .await
    }

    /// Fetch one upload with its items and validation summary
    pub async fn details(&self, id: i64) -> Result<UploadRecord, Error> {
        Fetch::get(&self.client, &self.endpoint(&format!("/user/upload/{}", id)))
            .bearer_auth_opt(self.session.token())
            .error_context("Failed to fetch upload details")
            .execute::<UploadRecord>()
            .await
    }

    /// Download the originally uploaded spreadsheet
    ///
    /// Admin sessions use the admin path, which reaches any user's upload;
    /// regular sessions are restricted to their own.
    pub async fn download_original(&self, id: i64) -> Result<Bytes, Error> {
        let path = if self.session.is_admin() {
            format!("/admin/upload/{}/file", id)
        } else {
            format!("/user/upload/{}/file", id)
        };

        Fetch::get(&self.client, &self.endpoint(&path))
            .bearer_auth_opt(self.session.token())
            .error_context("Download failed")
            .execute_bytes()
            .await
    }

    /// Delete an upload record
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        Fetch::delete(&self.client, &self.endpoint(&format!("/user/upload/{}", id)))
            .bearer_auth_opt(self.session.token())
            .error_context("Failed to delete upload")
            .execute_empty()
            .await
    }

    /// Replace one item of an upload
    ///
    /// The service confirms with 2xx; callers patch their local copy (or
    /// re-fetch details) only after that confirmation.
    pub async fn edit_item(&self, id: i64, index: usize, item: &Item) -> Result<(), Error> {
        let url = self.endpoint(&format!("/user/upload/{}/items/{}", id, index));

        Fetch::put(&self.client, &url)
            .bearer_auth_opt(self.session.token())
            .json(item)?
            .error_context("Failed to update item")
            .execute_empty()
            .await
    }
}

#[async_trait]
impl UploadLister for UploadsClient {
    async fn list_uploads(
        &self,
        page: u32,
        status: Option<UploadStatus>,
    ) -> Result<UploadListResponse, Error> {
        self.list(page, status).await
    }
}
