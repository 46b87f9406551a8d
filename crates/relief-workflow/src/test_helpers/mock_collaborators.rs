//! Mock collaborator implementations for testing
//!
//! Each mock keeps its state behind `Arc<Mutex<..>>` so a clone can be handed
//! to the controller while the test keeps another to inspect calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use relief_core::{DraftDocument, DraftKey, ServiceError};
use uuid::Uuid;

use crate::collaborators::{
    ChildRecordKind, Clock, DownloadedFile, DraftStore, FileTransfer, Notifier, SubmissionResult,
    UploadRequest, UploadedFile,
};

struct StoreState<D> {
    draft: Option<D>,
    saved: Vec<D>,
    submitted: Vec<D>,
    created_children: Vec<(ChildRecordKind, serde_json::Value, Uuid)>,
    deleted_children: Vec<(ChildRecordKind, Uuid)>,
    update_failure: Option<ServiceError>,
    submit_failure: Option<ServiceError>,
    child_failure: Option<ServiceError>,
}

/// Mock draft store holding a single draft
#[derive(Clone)]
pub struct MockDraftStore<D> {
    state: Arc<Mutex<StoreState<D>>>,
}

impl<D: DraftDocument> MockDraftStore<D> {
    /// A store whose `get_draft` fails with 404.
    pub fn empty() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                draft: None,
                saved: Vec::new(),
                submitted: Vec::new(),
                created_children: Vec::new(),
                deleted_children: Vec::new(),
                update_failure: None,
                submit_failure: None,
                child_failure: None,
            })),
        }
    }

    pub fn with_draft(draft: D) -> Self {
        let store = Self::empty();
        store.state.lock().unwrap().draft = Some(draft);
        store
    }

    pub fn draft_id(&self) -> Uuid {
        self.state
            .lock()
            .unwrap()
            .draft
            .as_ref()
            .map(|d| d.id())
            .unwrap_or_default()
    }

    pub fn fail_updates(&self, err: ServiceError) {
        self.state.lock().unwrap().update_failure = Some(err);
    }

    pub fn fail_submissions(&self, err: ServiceError) {
        self.state.lock().unwrap().submit_failure = Some(err);
    }

    pub fn fail_child_records(&self, err: ServiceError) {
        self.state.lock().unwrap().child_failure = Some(err);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.update_failure = None;
        state.submit_failure = None;
        state.child_failure = None;
    }

    /// Number of successful `update_draft` calls.
    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().saved.len()
    }

    /// Number of successful `submit_draft` calls.
    pub fn submit_calls(&self) -> usize {
        self.state.lock().unwrap().submitted.len()
    }

    /// The most recently saved draft.
    pub fn saved(&self) -> Option<D> {
        self.state.lock().unwrap().saved.last().cloned()
    }

    pub fn created_children(&self) -> Vec<(ChildRecordKind, serde_json::Value, Uuid)> {
        self.state.lock().unwrap().created_children.clone()
    }

    pub fn deleted_children(&self) -> Vec<(ChildRecordKind, Uuid)> {
        self.state.lock().unwrap().deleted_children.clone()
    }
}

#[async_trait]
impl<D: DraftDocument> DraftStore<D> for MockDraftStore<D> {
    async fn get_draft(&self, key: &DraftKey) -> Result<D, ServiceError> {
        let state = self.state.lock().unwrap();
        match &state.draft {
            Some(draft) if draft.id() == key.record_id() => Ok(draft.clone()),
            _ => Err(ServiceError::Status {
                status: 404,
                message: format!("Draft {} not found", key.record_id()),
            }),
        }
    }

    async fn update_draft(&self, _key: &DraftKey, draft: &D) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.update_failure.clone() {
            return Err(err);
        }
        state.saved.push(draft.clone());
        state.draft = Some(draft.clone());
        Ok(())
    }

    async fn submit_draft(
        &self,
        key: &DraftKey,
        draft: &D,
    ) -> Result<SubmissionResult, ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.submit_failure.clone() {
            return Err(err);
        }
        state.submitted.push(draft.clone());
        Ok(SubmissionResult {
            id: key.record_id(),
            status: Some("Submitted".to_string()),
            submitted_at: None,
        })
    }

    async fn create_child_record(
        &self,
        _key: &DraftKey,
        kind: ChildRecordKind,
        payload: serde_json::Value,
    ) -> Result<Uuid, ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.child_failure.clone() {
            return Err(err);
        }
        let id = Uuid::new_v4();
        state.created_children.push((kind, payload, id));
        Ok(id)
    }

    async fn delete_child_record(
        &self,
        _key: &DraftKey,
        kind: ChildRecordKind,
        id: Uuid,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.child_failure.clone() {
            return Err(err);
        }
        state.deleted_children.push((kind, id));
        Ok(())
    }
}

#[derive(Default)]
struct FileState {
    files: HashMap<Uuid, (String, Bytes)>,
    uploads: Vec<UploadRequest>,
    deleted: Vec<Uuid>,
    upload_failure: Option<ServiceError>,
    delete_failure: Option<ServiceError>,
}

/// Mock file transfer keeping uploaded files in memory
#[derive(Clone, Default)]
pub struct MockFileTransfer {
    state: Arc<Mutex<FileState>>,
}

impl MockFileTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, err: ServiceError) {
        self.state.lock().unwrap().upload_failure = Some(err);
    }

    pub fn fail_deletes(&self, err: ServiceError) {
        self.state.lock().unwrap().delete_failure = Some(err);
    }

    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().deleted.clone()
    }
}

#[async_trait]
impl FileTransfer for MockFileTransfer {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedFile, ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.upload_failure.clone() {
            return Err(err);
        }
        let id = Uuid::new_v4();
        state
            .files
            .insert(id, (request.name.clone(), request.content.clone()));
        state.uploads.push(request);
        Ok(UploadedFile { id })
    }

    async fn download(&self, attachment_id: Uuid) -> Result<DownloadedFile, ServiceError> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&attachment_id)
            .map(|(name, content)| DownloadedFile {
                file_name: name.clone(),
                content_type: None,
                content: content.clone(),
            })
            .ok_or_else(|| ServiceError::Status {
                status: 404,
                message: "File not found".to_string(),
            })
    }

    async fn delete(&self, attachment_id: Uuid) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.delete_failure.clone() {
            return Err(err);
        }
        state.files.remove(&attachment_id);
        state.deleted.push(attachment_id);
        Ok(())
    }
}

/// Notifier that records every message
#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    dismissals: Mutex<usize>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn dismissals(&self) -> usize {
        *self.dismissals.lock().unwrap()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn dismiss(&self) {
        *self.dismissals.lock().unwrap() += 1;
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        // 2025-01-01T00:00:00Z
        Self(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
