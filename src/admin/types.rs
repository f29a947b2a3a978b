//! Types for review decisions, statistics and reference data

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::uploads::{Pagination, UploadStatus};

/// Longest review comment the service accepts
pub const MAX_REVIEW_COMMENT_LEN: usize = 500;

/// The two review decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// A validated review submission
///
/// Built through [`approve`] or [`reject`], which enforce the comment
/// rules before anything touches the network: rejecting requires a
/// non-empty comment, and comments are capped at 500 characters.
///
/// [`approve`]: ReviewRequest::approve
/// [`reject`]: ReviewRequest::reject
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    action: ReviewAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl ReviewRequest {
    /// Approve an upload, with an optional comment
    pub fn approve(comment: Option<&str>) -> Result<Self, Error> {
        Self::new(ReviewAction::Approve, comment)
    }

    /// Reject an upload; the comment is mandatory
    pub fn reject(comment: &str) -> Result<Self, Error> {
        Self::new(ReviewAction::Reject, Some(comment))
    }

    fn new(action: ReviewAction, comment: Option<&str>) -> Result<Self, Error> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        if action == ReviewAction::Reject && comment.is_none() {
            return Err(Error::validation("Comment is required when rejecting"));
        }
        if let Some(comment) = comment {
            if comment.chars().count() > MAX_REVIEW_COMMENT_LEN {
                return Err(Error::validation(
                    "Comment must be less than 500 characters",
                ));
            }
        }

        Ok(Self {
            action,
            comment: comment.map(str::to_string),
        })
    }

    pub fn action(&self) -> ReviewAction {
        self.action
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Response to a review submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub message: String,
    pub upload_id: i64,
    /// The status the upload moved to (approved or rejected)
    pub status: UploadStatus,
}

/// Aggregate counters for the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_uploads: u64,
    #[serde(default)]
    pub pending_uploads: u64,
    #[serde(default)]
    pub approved_uploads: u64,
    #[serde(default)]
    pub rejected_uploads: u64,
    #[serde(default)]
    pub success_uploads: u64,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_price_items: u64,
    #[serde(default)]
    pub total_duty_items: u64,
}

/// Response to a price list or duty rate upload
///
/// Reference uploads replace the dataset wholesale; the counters report
/// how much of the spreadsheet made it in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceUploadResponse {
    pub message: String,
    pub updated_items: u64,
    pub total_items: u64,
}

/// One price list row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListEntry {
    pub id: i64,
    pub item_code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    /// Last update timestamp as emitted by the service (naive ISO-8601)
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One duty rate row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyRateEntry {
    pub id: i64,
    pub hs_code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rate: f64,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One page of price list entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListPage {
    pub prices: Vec<PriceListEntry>,
    pub pagination: Pagination,
}

/// One page of duty rate entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyRatePage {
    pub rates: Vec<DutyRateEntry>,
    pub pagination: Pagination,
}
