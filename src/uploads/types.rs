//! Types for upload records, items and pagination

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Lifecycle status of an upload record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Needs admin review (validation found problems)
    Pending,
    /// Validated cleanly, no review needed
    Success,
    /// Reviewed and accepted
    Approved,
    /// Reviewed and declined
    Rejected,
    /// Processing failed
    Failed,
}

impl UploadStatus {
    /// Wire representation, also used as the list filter value
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Success => "success",
            UploadStatus::Approved => "approved",
            UploadStatus::Rejected => "rejected",
            UploadStatus::Failed => "failed",
        }
    }

    /// Whether an upload in this status can be reviewed
    pub fn is_reviewable(self) -> bool {
        matches!(self, UploadStatus::Pending)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a packing list, as ordered (column, value) pairs
///
/// `serde_json` is built with `preserve_order`, so the map keeps the
/// column order the service emitted.
pub type Item = serde_json::Map<String, Value>;

/// The column layout of an upload's items
///
/// Uploads differ in their spreadsheet layout; the schema is derived per
/// upload from its first item and makes the column order explicit instead
/// of leaving callers to infer it positionally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSchema {
    columns: Vec<String>,
}

impl ItemSchema {
    /// Derive the schema from a set of items
    ///
    /// An empty item list yields an empty schema.
    pub fn infer(items: &[Item]) -> Self {
        let columns = items
            .first()
            .map(|item| item.keys().cloned().collect())
            .unwrap_or_default();
        Self { columns }
    }

    /// Column names in their original order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether an item carries exactly these columns, in this order
    pub fn matches(&self, item: &Item) -> bool {
        item.len() == self.columns.len()
            && item.keys().zip(self.columns.iter()).all(|(a, b)| a == b)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Outcome of the service-side validation of an upload's items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    #[serde(default)]
    pub total_items: u64,
    /// Items that matched the reference price list
    #[serde(default)]
    pub matched_items: u64,
    #[serde(default)]
    pub unmatched_items: u64,
    /// Overall validation problem, when the service reports one
    #[serde(default)]
    pub error: Option<String>,
}

/// Server-side paging bookkeeping echoed with every list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// An upload record as reported by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: i64,
    pub user_id: i64,
    /// Present in admin listings only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub filename: String,
    /// Whether the original spreadsheet is still stored and downloadable
    #[serde(default)]
    pub has_original_file: bool,
    /// Upload timestamp as emitted by the service (naive ISO-8601)
    pub upload_time: String,
    pub status: UploadStatus,
    /// Parsed rows; list endpoints may omit them
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub review_comment: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<i64>,
    #[serde(default)]
    pub reviewed_at: Option<String>,
    /// Only the details endpoint includes this
    #[serde(default)]
    pub validation_summary: Option<ValidationSummary>,
}

impl UploadRecord {
    /// The column layout of this upload's items
    pub fn schema(&self) -> ItemSchema {
        ItemSchema::infer(&self.items)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Replace one item in place; used after a confirmed edit
    pub fn replace_item(&mut self, index: usize, item: Item) -> Result<(), Error> {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(Error::validation(format!(
                "Item index {} out of range",
                index
            ))),
        }
    }

    /// Whether an admin can act on this record
    pub fn is_reviewable(&self) -> bool {
        self.status.is_reviewable()
    }

    /// Whether the owner may delete this record
    ///
    /// Successful uploads feed the downstream process and stay.
    pub fn can_delete(&self) -> bool {
        self.status != UploadStatus::Success
    }

    /// Whether the owner may still edit items
    pub fn can_edit_items(&self) -> bool {
        self.status != UploadStatus::Success
    }

    /// Whether the original spreadsheet can be downloaded
    pub fn can_download(&self) -> bool {
        self.has_original_file
    }
}

/// Response to a packing list upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub upload_id: i64,
    pub status: UploadStatus,
    pub summary: ValidationSummary,
}

/// One page of upload records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadListResponse {
    pub uploads: Vec<UploadRecord>,
    pub pagination: Pagination,
}
