//! Relief Workflow Library
//!
//! The draft workflow controller shared by every grant workflow: editing with
//! conditional resets and derived totals, debounced auto-save, attachments,
//! child records and submission.

pub mod autosave;
pub mod collaborators;
pub mod controller;
pub mod driver;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use autosave::{AutoSaveState, AutoSaveTimer};
pub use collaborators::{
    ChildRecordKind, Clock, DownloadedFile, DraftStore, FileTransfer, FileUpload, Notifier,
    SubmissionResult, SystemClock, TracingNotifier, UploadRequest, UploadedFile,
};
pub use controller::{DraftController, SaveOutcome};
pub use driver::AutoSaveDriver;
pub use telemetry::init_tracing;
