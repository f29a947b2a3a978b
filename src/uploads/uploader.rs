//! Upload lifecycle
//!
//! [`Uploader`] tracks one file selection through validation, transfer and
//! completion. A failed transfer keeps the file so the user can retry
//! without picking it again; a successful one clears it and asks the
//! caller, exactly once, to refresh the record list.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::fetch::ProgressFn;
use crate::file::{FilePolicy, SelectedFile};

/// Where an upload currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    /// No file selected
    #[default]
    Idle,
    /// A validated file is ready to upload
    FileSelected,
    /// Transfer in flight
    Uploading,
    /// Transfer failed; the file is retained for a retry
    Failed,
}

impl UploadPhase {
    /// Whether a transfer is in flight
    pub const fn is_busy(self) -> bool {
        matches!(self, UploadPhase::Uploading)
    }
}

/// State machine driving a single upload slot
///
/// One transfer at a time: `upload` takes `&mut self` and refuses to start
/// while a transfer is in flight. Use one `Uploader` per upload surface.
pub struct Uploader {
    policy: FilePolicy,
    phase: UploadPhase,
    file: Option<SelectedFile>,
    progress: Arc<AtomicU8>,
    error: Option<String>,
    refresh_requested: bool,
}

impl Uploader {
    /// Create an uploader gated by the given policy
    pub fn new(policy: FilePolicy) -> Self {
        Self {
            policy,
            phase: UploadPhase::default(),
            file: None,
            progress: Arc::new(AtomicU8::new(0)),
            error: None,
            refresh_requested: false,
        }
    }

    /// Select a file, validating it first
    ///
    /// On success any previous selection is replaced and a previous error
    /// cleared. On a validation failure nothing changes except the
    /// recorded error, so an earlier valid selection stays usable.
    pub fn select(&mut self, file: SelectedFile) -> Result<(), Error> {
        if self.phase.is_busy() {
            return Err(Error::validation("An upload is already in progress"));
        }
        if let Err(err) = self.policy.check_file(&file) {
            self.error = Some(err.to_string());
            return Err(err.into());
        }
        debug!("selected {} ({} bytes)", file.name(), file.size());
        self.file = Some(file);
        self.phase = UploadPhase::FileSelected;
        self.error = None;
        Ok(())
    }

    /// Drop the current selection and error; no-op while uploading
    pub fn remove(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        self.file = None;
        self.error = None;
        self.phase = UploadPhase::Idle;
    }

    /// Whether `upload` may be called now
    pub fn can_upload(&self) -> bool {
        matches!(self.phase, UploadPhase::FileSelected | UploadPhase::Failed)
    }

    /// Run the transfer for the selected file
    ///
    /// `send` receives the file and a progress sink feeding [`progress`].
    /// Success re-arms the uploader ([`UploadPhase::Idle`], file cleared)
    /// and flags one list refresh; failure keeps the file and records the
    /// error message.
    ///
    /// [`progress`]: Uploader::progress
    pub async fn upload<F, Fut, T>(&mut self, send: F) -> Result<T, Error>
    where
        F: FnOnce(SelectedFile, ProgressFn) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        if self.phase.is_busy() {
            return Err(Error::validation("An upload is already in progress"));
        }
        let file = match &self.file {
            Some(file) => file.clone(),
            None => return Err(Error::validation("No file selected")),
        };

        self.phase = UploadPhase::Uploading;
        self.error = None;
        self.progress.store(0, Ordering::SeqCst);

        match send(file, self.progress_sink()).await {
            Ok(value) => {
                self.phase = UploadPhase::Idle;
                self.file = None;
                self.refresh_requested = true;
                Ok(value)
            }
            Err(err) => {
                self.phase = UploadPhase::Failed;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn progress_sink(&self) -> ProgressFn {
        let cell = Arc::clone(&self.progress);
        Arc::new(move |pct| cell.store(pct, Ordering::SeqCst))
    }

    /// True exactly once after each successful upload
    ///
    /// The cooperative signal to re-fetch the record list.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Percent of the current (or last) transfer handed to the transport
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    /// The last surfaced error, for inline display
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn policy(&self) -> &FilePolicy {
        &self.policy
    }
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new(FilePolicy::spreadsheet())
    }
}
