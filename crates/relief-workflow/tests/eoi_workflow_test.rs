//! EOI workflow tests: editing, conditional fields, derived totals, save and
//! submit against in-memory collaborators.

mod helpers;

use helpers::load_draft;
use relief_core::models::eoi::{FUNDING_SECTION, PROJECT_SECTION};
use relief_core::models::{EoiApplication, Hazard};
use relief_core::{DraftKey, FieldPath, ServiceError, SubmitError, WorkflowError};
use relief_workflow::test_helpers::{eoi_draft, funding_source};
use relief_workflow::SaveOutcome;
use rust_decimal::Decimal;
use uuid::Uuid;

fn key(draft: &EoiApplication) -> DraftKey {
    DraftKey::Application(draft.id)
}

#[tokio::test]
async fn test_clean_draft_never_calls_backend() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;

    for _ in 0..3 {
        assert_eq!(t.controller.save().await.unwrap(), SaveOutcome::Skipped);
    }
    for _ in 0..120 {
        assert!(t.controller.tick().await.is_none());
    }

    assert_eq!(t.store.update_calls(), 0);
}

#[tokio::test]
async fn test_dirty_until_successful_save() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;

    t.controller
        .on_field_change(FieldPath::new(PROJECT_SECTION, "projectTitle"), |d| {
            d.project.project_title = Some("Seawall".to_string())
        })
        .unwrap();
    assert!(t.controller.is_dirty());

    t.store
        .fail_updates(ServiceError::Status {
            status: 503,
            message: "unavailable".to_string(),
        });
    assert!(t.controller.save().await.is_err());
    assert!(t.controller.is_dirty());
    assert!(t.controller.autosave_state().last_saved_at.is_none());

    t.store.clear_failures();
    let outcome = t.controller.save().await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert!(!t.controller.is_dirty());
    assert!(t.controller.autosave_state().last_saved_at.is_some());
    assert_eq!(t.notifier.successes(), vec!["Draft saved".to_string()]);
}

#[tokio::test]
async fn test_add_then_remove_restores_list() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;
    let field = FieldPath::new(FUNDING_SECTION, "otherFunding");
    let before = t.controller.draft().funding.other_funding.clone();

    let id = t
        .controller
        .add_repeatable(field.clone(), |d| &mut d.funding.other_funding, funding_source(75))
        .unwrap();
    assert_eq!(t.controller.draft().funding.other_funding.len(), 3);
    assert_eq!(
        t.controller.draft().funding.other_funding_total,
        Decimal::from(275)
    );

    let removed = t
        .controller
        .remove_repeatable(field, |d| &mut d.funding.other_funding, id)
        .unwrap();

    assert_eq!(removed.amount, Some(Decimal::from(75)));
    assert_eq!(t.controller.draft().funding.other_funding, before);
    assert_eq!(
        t.controller.draft().funding.other_funding_total,
        Decimal::from(200)
    );
}

#[tokio::test]
async fn test_funding_totals_follow_edits() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;

    let funding = &t.controller.draft().funding;
    assert_eq!(funding.other_funding_total, Decimal::from(200));
    assert_eq!(funding.remaining_amount, Decimal::from(200));
    assert_eq!(funding.estimated_unfunded_amount, Decimal::from(400));

    t.controller
        .on_field_change(FieldPath::new(FUNDING_SECTION, "totalEligibleCosts"), |d| {
            d.funding.total_eligible_costs = Some(Decimal::from(500))
        })
        .unwrap();

    let funding = &t.controller.draft().funding;
    assert_eq!(funding.estimated_unfunded_amount, Decimal::from(500));
    assert_eq!(funding.remaining_amount, Decimal::from(300));
}

#[tokio::test]
async fn test_fully_funded_clears_intended_source() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;
    assert!(t.controller.draft().funding.intended_funding_source.is_some());

    // 150 + 50 + 200 covers the 400 the program does not fund.
    t.controller
        .add_repeatable(
            FieldPath::new(FUNDING_SECTION, "otherFunding"),
            |d| &mut d.funding.other_funding,
            funding_source(200),
        )
        .unwrap();

    let funding = &t.controller.draft().funding;
    assert!(funding.remaining_amount.is_zero());
    assert_eq!(funding.intended_funding_source, None);
}

#[tokio::test]
async fn test_other_funding_added_without_flag_blocks_submit() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;
    let list = FieldPath::new(FUNDING_SECTION, "otherFunding");

    t.controller
        .on_field_change(FieldPath::new(FUNDING_SECTION, "haveOtherFunding"), |d| {
            d.funding.have_other_funding = Some(false)
        })
        .unwrap();
    assert!(t.controller.draft().funding.other_funding.is_empty());

    t.controller
        .add_repeatable(list.clone(), |d| &mut d.funding.other_funding, funding_source(300))
        .unwrap();
    assert!(t.controller.errors().iter().any(|e| e.path == list));

    let err = t.controller.submit().await.unwrap_err();
    assert_eq!(
        err,
        WorkflowError::Submit(SubmitError::Invalid {
            sections: vec!["Funding Information"],
        })
    );
    assert_eq!(t.store.submit_calls(), 0);
}

#[tokio::test]
async fn test_loaded_other_funding_without_flag_blocks_submit() {
    let mut draft = eoi_draft();
    draft.funding.have_other_funding = None;
    let mut t = load_draft(draft.clone(), key(&draft)).await;

    let err = t.controller.submit().await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Submit(SubmitError::Invalid { ref sections })
            if sections.contains(&"Funding Information")
    ));
    assert!(t
        .controller
        .errors()
        .iter()
        .any(|e| e.path == FieldPath::new(FUNDING_SECTION, "otherFunding")));
    assert_eq!(t.store.submit_calls(), 0);
}

#[tokio::test]
async fn test_other_hazard_description_both_directions() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;
    let hazards = FieldPath::new(PROJECT_SECTION, "relatedHazards");
    let description = FieldPath::new(PROJECT_SECTION, "otherHazardsDescription");
    let has_error = |errors: &[relief_core::FieldError]| errors.iter().any(|e| e.path == description);

    t.controller
        .on_field_change(hazards.clone(), |d| {
            d.project.related_hazards = vec![Hazard::Flood, Hazard::Other]
        })
        .unwrap();
    assert!(has_error(t.controller.errors()));

    t.controller
        .on_field_change(description.clone(), |d| {
            d.project.other_hazards_description = Some("Ice jams".to_string())
        })
        .unwrap();
    assert!(!has_error(t.controller.errors()));

    t.controller
        .on_field_change(hazards, |d| d.project.related_hazards = vec![Hazard::Flood])
        .unwrap();
    assert_eq!(t.controller.draft().project.other_hazards_description, None);
    assert!(!has_error(t.controller.errors()));
}

#[tokio::test]
async fn test_submit_lists_invalid_sections_without_calling_backend() {
    let mut draft = eoi_draft();
    draft.project.project_title = None;
    draft.declaration.information_accuracy_statement = Some(false);
    let mut t = load_draft(draft.clone(), key(&draft)).await;

    let err = t.controller.submit().await.unwrap_err();

    assert_eq!(
        err,
        WorkflowError::Submit(SubmitError::Invalid {
            sections: vec!["Project Information", "Declaration"],
        })
    );
    assert_eq!(t.store.submit_calls(), 0);
    assert_eq!(
        t.notifier.errors(),
        vec!["Please complete the following sections: Project Information, Declaration".to_string()]
    );
    // Every error is visible after a submit attempt.
    assert_eq!(t.controller.visible_errors().len(), t.controller.errors().len());
}

#[tokio::test]
async fn test_cross_check_blocks_submission() {
    let mut draft = eoi_draft();
    draft.funding.funding_request = Some(Decimal::from(700));
    let mut t = load_draft(draft.clone(), key(&draft)).await;

    let err = t.controller.submit().await.unwrap_err();

    match err {
        WorkflowError::Submit(SubmitError::CrossCheck(violation)) => {
            assert_eq!(violation.rule, "funding_request_within_eligible_costs")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(t.store.submit_calls(), 0);
}

#[tokio::test]
async fn test_submitted_draft_is_read_only() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;

    let result = t.controller.submit().await.unwrap();
    assert_eq!(result.id, draft.id);
    assert!(t.controller.is_submitted());
    assert_eq!(t.notifier.successes(), vec!["Submission received".to_string()]);

    let err = t
        .controller
        .on_field_change(FieldPath::new(PROJECT_SECTION, "projectTitle"), |d| {
            d.project.project_title = None
        })
        .unwrap_err();
    assert_eq!(err, WorkflowError::AlreadySubmitted);
    assert_eq!(
        t.controller.submit().await.unwrap_err(),
        WorkflowError::AlreadySubmitted
    );
    assert_eq!(t.store.submit_calls(), 1);
}

#[tokio::test]
async fn test_remote_submit_failure_keeps_draft_editable() {
    let draft = eoi_draft();
    let mut t = load_draft(draft.clone(), key(&draft)).await;
    t.store.fail_submissions(ServiceError::Transport("timeout".to_string()));

    let err = t.controller.submit().await.unwrap_err();

    assert!(matches!(err, WorkflowError::Submit(SubmitError::Remote(_))));
    assert!(!t.controller.is_submitted());
    assert!(t
        .controller
        .on_field_change(FieldPath::new(PROJECT_SECTION, "projectTitle"), |d| {
            d.project.project_title = Some("Retry".to_string())
        })
        .is_ok());
}

#[tokio::test]
async fn test_unknown_draft_fails_to_load() {
    let draft = eoi_draft();
    let store = relief_workflow::test_helpers::MockDraftStore::with_draft(draft);
    let result = relief_workflow::DraftController::load(
        store,
        relief_workflow::test_helpers::MockFileTransfer::new(),
        std::sync::Arc::new(relief_workflow::test_helpers::RecordingNotifier::new()),
        std::sync::Arc::new(relief_workflow::test_helpers::FixedClock::default()),
        relief_core::AutoSaveConfig::default(),
        DraftKey::Application(Uuid::new_v4()),
        None,
    )
    .await;

    assert!(matches!(result, Err(WorkflowError::Load(_))));
}
