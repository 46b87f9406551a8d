//! Draft workflow controller
//!
//! Owns one draft between load and submission. Every edit goes through the
//! controller so that derived totals, conditional resets, validation and
//! dirtiness stay consistent with each other:
//!
//! 1. snapshot which conditional rules apply,
//! 2. apply the edit and recompute derived values,
//! 3. reset dependents of rules that stopped applying,
//! 4. mark the draft dirty and restart the auto-save countdown,
//! 5. recompute the full error list.
//!
//! Collaborator failures are logged, turned into a user notification and
//! returned; local state is left as it was before the failed call.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use relief_core::models::{remove_attachment, AttachmentRef, DocumentType};
use relief_core::validation::{apply_conditional_resets, applying};
use relief_core::{
    AttachmentError, AutoSaveConfig, DraftDocument, DraftKey, ErrorMetadata, FieldError,
    FieldPath, LogLevel, Repeatable, ServiceError, SubmitError, UserProfile, WorkflowError,
};
use serde::Serialize;
use uuid::Uuid;

use crate::autosave::{AutoSaveState, AutoSaveTimer};
use crate::collaborators::{
    ChildRecordKind, Clock, DownloadedFile, DraftStore, FileTransfer, FileUpload, Notifier,
    SubmissionResult, UploadRequest,
};

/// What a save call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The draft was clean; nothing was sent.
    Skipped,
    Saved { at: DateTime<Utc> },
}

pub struct DraftController<D, S, F>
where
    D: DraftDocument,
    S: DraftStore<D>,
    F: FileTransfer,
{
    store: S,
    files: F,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    key: DraftKey,
    draft: D,
    errors: Vec<FieldError>,
    touched: HashSet<FieldPath>,
    all_touched: bool,
    dirty: bool,
    last_saved_at: Option<DateTime<Utc>>,
    timer: AutoSaveTimer,
    submission: Option<SubmissionResult>,
    disposed: bool,
}

impl<D, S, F> DraftController<D, S, F>
where
    D: DraftDocument,
    S: DraftStore<D>,
    F: FileTransfer,
{
    /// Fetch the draft and prepare it for editing.
    ///
    /// Profile values only fill fields that are still empty; when any field
    /// is filled the draft starts out dirty. A failed fetch yields no
    /// controller at all.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, record_id = %key.record_id()))]
    pub async fn load(
        store: S,
        files: F,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: AutoSaveConfig,
        key: DraftKey,
        profile: Option<&UserProfile>,
    ) -> Result<Self, WorkflowError> {
        let mut draft = match store.get_draft(&key).await {
            Ok(draft) => draft,
            Err(e) => {
                let err = WorkflowError::Load(e);
                report(notifier.as_ref(), &err);
                return Err(err);
            }
        };
        draft.recompute();
        let filled = profile.is_some_and(|profile| draft.apply_profile_defaults(profile));

        let mut controller = Self {
            store,
            files,
            notifier,
            clock,
            key,
            draft,
            errors: Vec::new(),
            touched: HashSet::new(),
            all_touched: false,
            dirty: filled,
            last_saved_at: None,
            timer: AutoSaveTimer::new(config.interval_secs),
            submission: None,
            disposed: false,
        };
        if filled {
            controller.timer.arm();
        }
        controller.revalidate();

        tracing::debug!(
            dirty = controller.dirty,
            errors = controller.errors.len(),
            "Draft loaded"
        );
        Ok(controller)
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn key(&self) -> &DraftKey {
        &self.key
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_submitted(&self) -> bool {
        self.submission.is_some()
    }

    pub fn submission(&self) -> Option<&SubmissionResult> {
        self.submission.as_ref()
    }

    pub fn autosave_state(&self) -> AutoSaveState {
        AutoSaveState {
            is_dirty: self.dirty,
            last_saved_at: self.last_saved_at,
            countdown_seconds: self.timer.remaining(),
        }
    }

    /// Apply an edit to one field. Never touches the network.
    pub fn on_field_change(
        &mut self,
        field: FieldPath,
        apply: impl FnOnce(&mut D),
    ) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        self.apply_change(Some(field), apply);
        Ok(())
    }

    /// User activity unrelated to a field change. Restarts the countdown of a
    /// dirty draft and never arms one on a clean, disposed or submitted draft.
    pub fn notify_activity(&mut self) {
        if self.dirty {
            self.timer.reset();
        }
    }

    /// Advance the auto-save countdown by one tick. Returns the save result
    /// on the tick that triggers a save, `None` otherwise.
    pub async fn tick(&mut self) -> Option<Result<SaveOutcome, WorkflowError>> {
        if self.disposed || !self.timer.tick() {
            return None;
        }
        tracing::debug!(draft_kind = %D::KIND, "Auto-save countdown elapsed");
        let result = self.persist().await;
        if result.is_err() && self.dirty && !self.disposed {
            // Try again on the next cycle.
            self.timer.arm();
        }
        Some(result)
    }

    /// Save the draft if it has unsaved changes.
    pub async fn save(&mut self) -> Result<SaveOutcome, WorkflowError> {
        let outcome = self.persist().await?;
        if let SaveOutcome::Saved { .. } = outcome {
            self.notifier.success("Draft saved");
        }
        Ok(outcome)
    }

    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, record_id = %self.key.record_id()))]
    async fn persist(&mut self) -> Result<SaveOutcome, WorkflowError> {
        if !self.dirty {
            return Ok(SaveOutcome::Skipped);
        }
        match self.store.update_draft(&self.key, &self.draft).await {
            Ok(()) => {
                let at = self.clock.now();
                self.dirty = false;
                self.last_saved_at = Some(at);
                self.timer.cancel();
                tracing::info!(saved_at = %at, "Draft saved");
                Ok(SaveOutcome::Saved { at })
            }
            Err(e) => Err(self.fail(WorkflowError::Save(e))),
        }
    }

    /// Validate everything, run the workflow check and submit.
    ///
    /// Local failures never reach the backend. A remote failure leaves the
    /// draft editable; success makes it read-only.
    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, record_id = %self.key.record_id()))]
    pub async fn submit(&mut self) -> Result<SubmissionResult, WorkflowError> {
        self.ensure_editable()?;
        self.all_touched = true;
        self.revalidate();

        let sections = self.invalid_sections();
        if !sections.is_empty() {
            return Err(self.fail(SubmitError::Invalid { sections }.into()));
        }

        if let Err(violation) = self.draft.cross_check() {
            return Err(self.fail(SubmitError::CrossCheck(violation).into()));
        }

        match self.store.submit_draft(&self.key, &self.draft).await {
            Ok(result) => {
                let now = self.clock.now();
                self.timer.cancel();
                self.dirty = false;
                self.last_saved_at = Some(now);
                self.submission = Some(result.clone());
                tracing::info!(submission_id = %result.id, "Draft submitted");
                self.notifier.success("Submission received");
                Ok(result)
            }
            Err(e) => Err(self.fail(SubmitError::Remote(e).into())),
        }
    }

    /// Append an item to a repeatable list and return its id.
    pub fn add_repeatable<T>(
        &mut self,
        field: FieldPath,
        list: impl FnOnce(&mut D) -> &mut Repeatable<T>,
        value: T,
    ) -> Result<Uuid, WorkflowError> {
        self.ensure_editable()?;
        Ok(self.apply_change(Some(field), |draft| list(draft).push(value)))
    }

    /// Remove an item by id and return it. Other items keep their ids.
    pub fn remove_repeatable<T>(
        &mut self,
        field: FieldPath,
        list: impl Fn(&mut D) -> &mut Repeatable<T>,
        id: Uuid,
    ) -> Result<T, WorkflowError> {
        self.ensure_editable()?;
        if !list(&mut self.draft).contains(id) {
            return Err(self.fail(WorkflowError::ItemNotFound(id)));
        }
        self.apply_change(Some(field), |draft| list(draft).remove(id))
            .ok_or(WorkflowError::ItemNotFound(id))
    }

    /// Create a child record on the backend, then append it locally under
    /// the id the backend assigned.
    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, child_kind = %kind))]
    pub async fn create_child_record<T: Serialize>(
        &mut self,
        kind: ChildRecordKind,
        field: FieldPath,
        list: impl FnOnce(&mut D) -> &mut Repeatable<T>,
        value: T,
    ) -> Result<Uuid, WorkflowError> {
        self.ensure_editable()?;
        let payload = match serde_json::to_value(&value) {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(WorkflowError::CreateRecord(ServiceError::from(e)))),
        };
        let id = match self
            .store
            .create_child_record(&self.key, kind, payload)
            .await
        {
            Ok(id) => id,
            Err(e) => return Err(self.fail(WorkflowError::CreateRecord(e))),
        };
        self.apply_change(Some(field), |draft| list(draft).push_with_id(id, value));
        tracing::debug!(child_id = %id, "Child record created");
        Ok(id)
    }

    /// Delete a child record on the backend, then drop it locally.
    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, child_kind = %kind, child_id = %id))]
    pub async fn delete_child_record<T>(
        &mut self,
        kind: ChildRecordKind,
        field: FieldPath,
        list: impl Fn(&mut D) -> &mut Repeatable<T>,
        id: Uuid,
    ) -> Result<T, WorkflowError> {
        self.ensure_editable()?;
        if !list(&mut self.draft).contains(id) {
            return Err(self.fail(WorkflowError::ItemNotFound(id)));
        }
        if let Err(e) = self.store.delete_child_record(&self.key, kind, id).await {
            return Err(self.fail(WorkflowError::DeleteRecord(e)));
        }
        self.apply_change(Some(field), |draft| list(draft).remove(id))
            .ok_or(WorkflowError::ItemNotFound(id))
    }

    /// Upload a file for `record_id` (the draft or one of its child records)
    /// and store the returned reference according to the record's policy.
    #[tracing::instrument(
        skip_all,
        fields(draft_kind = %D::KIND, record_id = %record_id, document_type = %document_type)
    )]
    pub async fn upload_attachment(
        &mut self,
        file: FileUpload,
        record_id: Uuid,
        document_type: DocumentType,
    ) -> Result<AttachmentRef, WorkflowError> {
        self.ensure_editable()?;
        let record_type = match self.draft.attachment_list_mut(record_id) {
            Some((record_type, _)) => record_type,
            None => return Err(self.fail(AttachmentError::UnknownRecord(record_id).into())),
        };
        let policy = D::attachment_policy(record_type);
        if !policy.allows(document_type) {
            return Err(self.fail(
                AttachmentError::DocumentTypeNotAllowed {
                    record_type,
                    document_type,
                }
                .into(),
            ));
        }

        let request = UploadRequest {
            content: file.content,
            name: file.name.clone(),
            content_type: file.content_type,
            record_id,
            record_type,
            document_type,
        };
        let uploaded = match self.files.upload(request).await {
            Ok(uploaded) => uploaded,
            Err(e) => return Err(self.fail(AttachmentError::Upload(e).into())),
        };

        let reference = AttachmentRef {
            id: uploaded.id,
            name: file.name,
            document_type,
            comments: None,
        };
        let inserted = reference.clone();
        let replaced = self.apply_change(None, move |draft| {
            draft
                .attachment_list_mut(record_id)
                .and_then(|(_, list)| policy.insert(list, inserted))
        });
        if let Some(replaced) = replaced {
            tracing::debug!(replaced_id = %replaced.id, "Attachment replaced");
        }
        tracing::info!(attachment_id = %reference.id, "Attachment uploaded");
        Ok(reference)
    }

    /// Delete an attachment remotely, then drop the local reference.
    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, attachment_id = %attachment_id))]
    pub async fn remove_attachment(
        &mut self,
        attachment_id: Uuid,
    ) -> Result<AttachmentRef, WorkflowError> {
        self.ensure_editable()?;
        if self.draft.find_attachment(attachment_id).is_none() {
            return Err(self.fail(AttachmentError::NotFound(attachment_id).into()));
        }
        if let Err(e) = self.files.delete(attachment_id).await {
            return Err(self.fail(AttachmentError::Delete(e).into()));
        }
        self.apply_change(None, |draft| {
            remove_attachment(draft.attachment_lists_mut(), attachment_id)
        })
        .ok_or(WorkflowError::Attachment(AttachmentError::NotFound(
            attachment_id,
        )))
    }

    /// Edit the comment of an attachment, the only mutable part of a
    /// reference.
    pub fn update_attachment_comment(
        &mut self,
        attachment_id: Uuid,
        comments: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        if self.draft.find_attachment(attachment_id).is_none() {
            return Err(self.fail(AttachmentError::NotFound(attachment_id).into()));
        }
        self.apply_change(None, |draft| {
            for list in draft.attachment_lists_mut() {
                if let Some(reference) = list.iter_mut().find(|r| r.id == attachment_id) {
                    reference.comments = comments;
                    return;
                }
            }
        });
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(draft_kind = %D::KIND, attachment_id = %attachment_id))]
    pub async fn download_attachment(
        &self,
        attachment_id: Uuid,
    ) -> Result<DownloadedFile, WorkflowError> {
        if self.draft.find_attachment(attachment_id).is_none() {
            return Err(self.fail(AttachmentError::NotFound(attachment_id).into()));
        }
        self.files
            .download(attachment_id)
            .await
            .map_err(|e| self.fail(AttachmentError::Download(e).into()))
    }

    /// Every current validation failure.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Failures on fields the applicant has touched, or all of them once a
    /// submission was attempted. Touching a list reveals its items' errors.
    pub fn visible_errors(&self) -> Vec<&FieldError> {
        self.errors
            .iter()
            .filter(|e| self.all_touched || self.touched.iter().any(|t| t.covers(&e.path)))
            .collect()
    }

    /// Titles of the sections that currently fail validation, in display
    /// order.
    pub fn invalid_sections(&self) -> Vec<&'static str> {
        D::sections()
            .iter()
            .filter(|section| self.errors.iter().any(|e| e.path.section == section.key))
            .map(|section| section.title)
            .collect()
    }

    /// Stop the auto-save countdown for good. Called when the draft is
    /// closed so no save fires against it afterwards.
    pub fn dispose(&mut self) {
        if !self.disposed {
            tracing::debug!(draft_kind = %D::KIND, "Draft controller disposed");
        }
        self.disposed = true;
        self.timer.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn apply_change<R>(
        &mut self,
        field: Option<FieldPath>,
        apply: impl FnOnce(&mut D) -> R,
    ) -> R {
        let rules = D::conditional_rules();
        let before = applying(&self.draft, rules);

        let result = apply(&mut self.draft);
        self.draft.recompute();
        let reset = apply_conditional_resets(&mut self.draft, rules, &before, D::recompute);
        if !reset.is_empty() {
            tracing::debug!(rules = ?reset, "Conditional fields reset");
        }

        if let Some(field) = field {
            self.touched.insert(field);
        }
        self.dirty = true;
        if !self.disposed {
            self.timer.arm();
        }
        self.revalidate();
        result
    }

    fn revalidate(&mut self) {
        self.errors = self.draft.validate();
    }

    fn ensure_editable(&self) -> Result<(), WorkflowError> {
        if self.is_submitted() {
            return Err(self.fail(WorkflowError::AlreadySubmitted));
        }
        Ok(())
    }

    fn fail(&self, err: WorkflowError) -> WorkflowError {
        report(self.notifier.as_ref(), &err);
        err
    }
}

fn report(notifier: &dyn Notifier, err: &WorkflowError) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %err, error_code = code, "Workflow action refused")
        }
        LogLevel::Warn => {
            tracing::warn!(error = %err, error_code = code, "Workflow action failed")
        }
        LogLevel::Error => {
            tracing::error!(error = %err, error_code = code, "Workflow action failed")
        }
    }
    notifier.error(&err.client_message());
}
