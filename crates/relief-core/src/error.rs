//! Error types module
//!
//! Collaborator failures are reported as [`ServiceError`]. The draft workflow
//! wraps them into [`WorkflowError`], which separates load, save, submit and
//! attachment failures so that each one can be recovered where it occurs.
//!
//! Every error self-describes how it should be presented to the user through
//! [`ErrorMetadata`], the same way each variant carries a log level.

use uuid::Uuid;

use crate::draft::CrossCheckViolation;
use crate::models::{DocumentType, RecordType};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues the user can retry
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error is presented to the applicant
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "SAVE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same action can succeed
    fn is_recoverable(&self) -> bool;

    /// Message shown through the notification collaborator
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure reported by the storage or file-transfer collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    /// HTTP status code, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable part of the failure, without the status prefix
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Status { message, .. } => message,
            ServiceError::Transport(message)
            | ServiceError::Decode(message)
            | ServiceError::InvalidRequest(message) => message,
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Decode(format!("JSON parsing error: {}", err))
    }
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// Local validation failed; the backend was never called.
    #[error("Invalid sections: {}", sections.join(", "))]
    Invalid { sections: Vec<&'static str> },

    #[error("Submission check failed: {0}")]
    CrossCheck(CrossCheckViolation),

    #[error("Submission rejected: {0}")]
    Remote(#[source] ServiceError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttachmentError {
    #[error("Upload failed: {0}")]
    Upload(#[source] ServiceError),

    #[error("Delete failed: {0}")]
    Delete(#[source] ServiceError),

    #[error("Download failed: {0}")]
    Download(#[source] ServiceError),

    #[error("No record {0} accepts attachments in this draft")]
    UnknownRecord(Uuid),

    #[error("Document type {document_type} is not accepted on {record_type} records")]
    DocumentTypeNotAllowed {
        record_type: RecordType,
        document_type: DocumentType,
    },

    #[error("Attachment not found: {0}")]
    NotFound(Uuid),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Failed to load draft: {0}")]
    Load(#[source] ServiceError),

    #[error("Failed to save draft: {0}")]
    Save(#[source] ServiceError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error("Draft has already been submitted")]
    AlreadySubmitted,

    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Failed to create record: {0}")]
    CreateRecord(#[source] ServiceError),

    #[error("Failed to delete record: {0}")]
    DeleteRecord(#[source] ServiceError),
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn workflow_error_static_metadata(err: &WorkflowError) -> (&'static str, bool, LogLevel) {
    match err {
        WorkflowError::Load(_) => ("LOAD_FAILED", true, LogLevel::Error),
        WorkflowError::Save(_) => ("SAVE_FAILED", true, LogLevel::Warn),
        WorkflowError::Submit(SubmitError::Invalid { .. }) => {
            ("VALIDATION_FAILED", false, LogLevel::Debug)
        }
        WorkflowError::Submit(SubmitError::CrossCheck(_)) => {
            ("SUBMISSION_CHECK_FAILED", false, LogLevel::Debug)
        }
        WorkflowError::Submit(SubmitError::Remote(_)) => ("SUBMIT_FAILED", true, LogLevel::Error),
        WorkflowError::Attachment(AttachmentError::Upload(_)) => {
            ("UPLOAD_FAILED", true, LogLevel::Warn)
        }
        WorkflowError::Attachment(AttachmentError::Delete(_)) => {
            ("DELETE_FAILED", true, LogLevel::Warn)
        }
        WorkflowError::Attachment(AttachmentError::Download(_)) => {
            ("DOWNLOAD_FAILED", true, LogLevel::Warn)
        }
        WorkflowError::Attachment(AttachmentError::UnknownRecord(_)) => {
            ("UNKNOWN_RECORD", false, LogLevel::Warn)
        }
        WorkflowError::Attachment(AttachmentError::DocumentTypeNotAllowed { .. }) => {
            ("DOCUMENT_TYPE_NOT_ALLOWED", false, LogLevel::Debug)
        }
        WorkflowError::Attachment(AttachmentError::NotFound(_)) => {
            ("ATTACHMENT_NOT_FOUND", false, LogLevel::Debug)
        }
        WorkflowError::AlreadySubmitted => ("ALREADY_SUBMITTED", false, LogLevel::Debug),
        WorkflowError::ItemNotFound(_) => ("ITEM_NOT_FOUND", false, LogLevel::Debug),
        WorkflowError::CreateRecord(_) => ("CREATE_RECORD_FAILED", true, LogLevel::Warn),
        WorkflowError::DeleteRecord(_) => ("DELETE_RECORD_FAILED", true, LogLevel::Warn),
    }
}

impl ErrorMetadata for WorkflowError {
    fn error_code(&self) -> &'static str {
        workflow_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        workflow_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        workflow_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            WorkflowError::Load(_) => "Unable to load the draft".to_string(),
            WorkflowError::Save(_) => {
                "Unable to save your changes; they will be retried".to_string()
            }
            WorkflowError::Submit(SubmitError::Invalid { sections }) => format!(
                "Please complete the following sections: {}",
                sections.join(", ")
            ),
            WorkflowError::Submit(SubmitError::CrossCheck(violation)) => {
                violation.message.to_string()
            }
            // Remote rejections are reported generically.
            WorkflowError::Submit(SubmitError::Remote(_)) => {
                "Submission failed, please try again".to_string()
            }
            WorkflowError::Attachment(AttachmentError::Upload(_)) => {
                "File upload failed".to_string()
            }
            WorkflowError::Attachment(AttachmentError::Delete(_)) => {
                "Unable to delete the file".to_string()
            }
            WorkflowError::Attachment(AttachmentError::Download(_)) => {
                "Unable to download the file".to_string()
            }
            WorkflowError::Attachment(err) => err.to_string(),
            WorkflowError::AlreadySubmitted => self.to_string(),
            WorkflowError::ItemNotFound(_) => "The item no longer exists".to_string(),
            WorkflowError::CreateRecord(_) => "Unable to add the record".to_string(),
            WorkflowError::DeleteRecord(_) => "Unable to remove the record".to_string(),
        }
    }
}
