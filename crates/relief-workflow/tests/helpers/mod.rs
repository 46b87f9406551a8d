#![allow(dead_code)]

use std::sync::Arc;

use relief_core::{AutoSaveConfig, DraftDocument, DraftKey};
use relief_workflow::test_helpers::{FixedClock, MockDraftStore, MockFileTransfer, RecordingNotifier};
use relief_workflow::DraftController;

pub type Controller<D> = DraftController<D, MockDraftStore<D>, MockFileTransfer>;

/// A loaded controller together with handles on its collaborators.
pub struct TestDraft<D: DraftDocument> {
    pub controller: Controller<D>,
    pub store: MockDraftStore<D>,
    pub files: MockFileTransfer,
    pub notifier: Arc<RecordingNotifier>,
}

pub async fn load_draft<D: DraftDocument>(draft: D, key: DraftKey) -> TestDraft<D> {
    let store = MockDraftStore::with_draft(draft);
    let files = MockFileTransfer::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let controller = DraftController::load(
        store.clone(),
        files.clone(),
        notifier.clone(),
        Arc::new(FixedClock::default()),
        AutoSaveConfig::default(),
        key,
        None,
    )
    .await
    .expect("draft should load");

    TestDraft {
        controller,
        store,
        files,
        notifier,
    }
}

pub fn project_key(project_id: uuid::Uuid, record_id: uuid::Uuid) -> DraftKey {
    DraftKey::ProjectRecord {
        project_id,
        record_id,
    }
}
