//! Collaborator seams
//!
//! The controller never talks HTTP or reads a clock directly. Persistence,
//! file transfer, user notification and time are injected through the traits
//! below; `relief-api-client` provides the HTTP implementations and
//! [`crate::test_helpers`] provides in-memory ones.

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use relief_core::models::{DocumentType, RecordType};
use relief_core::{DraftDocument, DraftKey, ServiceError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Child records that live in their own backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildRecordKind {
    Invoice,
}

impl ChildRecordKind {
    /// Collection segment under the parent draft's resource path.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ChildRecordKind::Invoice => "invoices",
        }
    }
}

impl Display for ChildRecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ChildRecordKind::Invoice => write!(f, "invoice"),
        }
    }
}

/// Backend answer to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub id: Uuid,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A file picked by the applicant, before it is bound to a record.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub content: Bytes,
}

/// One file handed to [`FileTransfer::upload`].
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub content: Bytes,
    pub name: String,
    pub content_type: String,
    pub record_id: Uuid,
    pub record_type: RecordType,
    pub document_type: DocumentType,
}

/// Server-assigned identity of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// Record storage for one draft type.
#[async_trait]
pub trait DraftStore<D: DraftDocument>: Send + Sync {
    async fn get_draft(&self, key: &DraftKey) -> Result<D, ServiceError>;

    /// Persist the full draft, derived values included.
    async fn update_draft(&self, key: &DraftKey, draft: &D) -> Result<(), ServiceError>;

    async fn submit_draft(&self, key: &DraftKey, draft: &D)
        -> Result<SubmissionResult, ServiceError>;

    /// Create a child record under the draft and return its id.
    async fn create_child_record(
        &self,
        key: &DraftKey,
        kind: ChildRecordKind,
        payload: serde_json::Value,
    ) -> Result<Uuid, ServiceError>;

    async fn delete_child_record(
        &self,
        key: &DraftKey,
        kind: ChildRecordKind,
        id: Uuid,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait FileTransfer: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedFile, ServiceError>;

    async fn download(&self, attachment_id: Uuid) -> Result<DownloadedFile, ServiceError>;

    async fn delete(&self, attachment_id: Uuid) -> Result<(), ServiceError>;
}

/// User-facing notifications. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn dismiss(&self);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Notifier that only writes to the log, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notification = "success", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::warn!(notification = "error", "{}", message);
    }

    fn dismiss(&self) {
        tracing::debug!("Notifications dismissed");
    }
}
