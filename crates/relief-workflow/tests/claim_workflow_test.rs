//! Claim workflow tests: invoices as backend child records, invoice documents
//! and submission gating.

mod helpers;

use bytes::Bytes;
use helpers::{load_draft, project_key, TestDraft};
use relief_core::models::claim::EXPENSES_SECTION;
use relief_core::models::{Claim, DocumentType, Invoice, RecordType};
use relief_core::{AttachmentError, DraftDocument, FieldPath, ServiceError, SubmitError, WorkflowError};
use relief_workflow::test_helpers::{claim_draft, invoice};
use relief_workflow::{ChildRecordKind, FileUpload};
use rust_decimal::Decimal;
use uuid::Uuid;

async fn load_claim(draft: Claim) -> TestDraft<Claim> {
    let key = project_key(draft.project_id, draft.id);
    load_draft(draft, key).await
}

fn invoices_field() -> FieldPath {
    FieldPath::new(EXPENSES_SECTION, "invoices")
}

fn pdf(name: &str) -> FileUpload {
    FileUpload {
        name: name.to_string(),
        content_type: "application/pdf".to_string(),
        content: Bytes::from_static(b"%PDF-1.7"),
    }
}

#[tokio::test]
async fn test_missing_supplier_blocks_submit_with_invoices_section() {
    let mut draft = claim_draft();
    for invoice in draft.invoices.values_mut() {
        invoice.supplier_name = None;
    }
    let mut t = load_claim(draft).await;

    let err = t.controller.submit().await.unwrap_err();

    assert_eq!(
        err,
        WorkflowError::Submit(SubmitError::Invalid {
            sections: vec!["Invoices"],
        })
    );
    assert_eq!(t.store.submit_calls(), 0);
    let supplier_errors = t
        .controller
        .errors()
        .iter()
        .filter(|e| e.path.field == "supplierName")
        .count();
    assert_eq!(supplier_errors, 1);
}

#[tokio::test]
async fn test_invoice_is_created_on_backend_first() {
    let mut draft = claim_draft();
    draft.invoices.clear();
    let mut t = load_claim(draft).await;

    let id = t
        .controller
        .create_child_record(
            ChildRecordKind::Invoice,
            invoices_field(),
            |d| &mut d.invoices,
            invoice(),
        )
        .await
        .unwrap();

    let created = t.store.created_children();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, ChildRecordKind::Invoice);
    assert_eq!(created[0].1["supplierName"], "Northern Aggregates");
    assert_eq!(created[0].2, id);
    assert!(t.controller.draft().invoices.contains(id));
    assert_eq!(t.controller.draft().total_claim_amount, Decimal::from(1140));
    assert!(t.controller.is_dirty());
}

#[tokio::test]
async fn test_failed_invoice_creation_changes_nothing() {
    let draft = claim_draft();
    let mut t = load_claim(draft.clone()).await;
    t.store
        .fail_child_records(ServiceError::Transport("offline".to_string()));

    let err = t
        .controller
        .create_child_record(
            ChildRecordKind::Invoice,
            invoices_field(),
            |d| &mut d.invoices,
            Invoice::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::CreateRecord(_)));
    assert_eq!(t.controller.draft().invoices.len(), draft.invoices.len());
    assert!(!t.controller.is_dirty());
}

#[tokio::test]
async fn test_delete_invoice_updates_total() {
    let draft = claim_draft();
    let id = draft.invoices.ids()[0];
    let mut t = load_claim(draft).await;

    let removed = t
        .controller
        .delete_child_record(
            ChildRecordKind::Invoice,
            invoices_field(),
            |d| &mut d.invoices,
            id,
        )
        .await
        .unwrap();

    assert_eq!(removed.invoice_number.as_deref(), Some("INV-001"));
    assert_eq!(t.store.deleted_children(), vec![(ChildRecordKind::Invoice, id)]);
    assert!(t.controller.draft().invoices.is_empty());
    assert!(t.controller.draft().total_claim_amount.is_zero());
}

#[tokio::test]
async fn test_invoice_document_replaces_same_type() {
    let mut draft = claim_draft();
    for invoice in draft.invoices.values_mut() {
        invoice.attachments.retain(|r| r.document_type == DocumentType::Invoice);
    }
    let invoice_id = draft.invoices.ids()[0];
    let mut t = load_claim(draft).await;
    assert!(!t.controller.errors().is_empty());

    let proof = t
        .controller
        .upload_attachment(pdf("receipt.pdf"), invoice_id, DocumentType::ProofOfPayment)
        .await
        .unwrap();
    assert!(t.controller.errors().is_empty());

    let replacement = t
        .controller
        .upload_attachment(pdf("receipt-v2.pdf"), invoice_id, DocumentType::ProofOfPayment)
        .await
        .unwrap();

    let attachments = &t.controller.draft().invoices.get(invoice_id).unwrap().attachments;
    assert_eq!(attachments.len(), 2);
    assert!(attachments.iter().any(|r| r.id == replacement.id));
    assert!(!attachments.iter().any(|r| r.id == proof.id));

    let uploads = t.files.uploads();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].record_id, invoice_id);
    assert_eq!(uploads[0].record_type, RecordType::Invoice);
}

#[tokio::test]
async fn test_upload_rejects_other_document_types_and_unknown_records() {
    let draft = claim_draft();
    let invoice_id = draft.invoices.ids()[0];
    let claim_id = draft.id;
    let mut t = load_claim(draft).await;

    let err = t
        .controller
        .upload_attachment(pdf("notes.pdf"), invoice_id, DocumentType::SupportingDocument)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WorkflowError::Attachment(AttachmentError::DocumentTypeNotAllowed {
            record_type: RecordType::Invoice,
            document_type: DocumentType::SupportingDocument,
        })
    );

    // Claim documents hang off invoices, not the claim itself.
    let err = t
        .controller
        .upload_attachment(pdf("invoice.pdf"), claim_id, DocumentType::Invoice)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WorkflowError::Attachment(AttachmentError::UnknownRecord(claim_id))
    );
    assert!(t.files.uploads().is_empty());
    assert!(!t.controller.is_dirty());
}

#[tokio::test]
async fn test_remove_attachment_deletes_remote_file_first() {
    let draft = claim_draft();
    let invoice_id = draft.invoices.ids()[0];
    let mut t = load_claim(draft).await;
    let uploaded = t
        .controller
        .upload_attachment(pdf("invoice.pdf"), invoice_id, DocumentType::Invoice)
        .await
        .unwrap();

    t.files.fail_deletes(ServiceError::Status {
        status: 500,
        message: "boom".to_string(),
    });
    let err = t.controller.remove_attachment(uploaded.id).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Attachment(AttachmentError::Delete(_))
    ));
    assert!(t.controller.draft().find_attachment(uploaded.id).is_some());

    let fresh = claim_draft();
    let mut t = load_claim(fresh.clone()).await;
    let existing = fresh.invoices.values().next().unwrap().attachments[0].id;
    let removed = t.controller.remove_attachment(existing).await.unwrap();

    assert_eq!(removed.id, existing);
    assert_eq!(t.files.deleted(), vec![existing]);
    assert!(t.controller.draft().find_attachment(existing).is_none());

    let missing = Uuid::new_v4();
    assert_eq!(
        t.controller.remove_attachment(missing).await.unwrap_err(),
        WorkflowError::Attachment(AttachmentError::NotFound(missing))
    );
}

#[tokio::test]
async fn test_failed_upload_leaves_attachments_unchanged() {
    let draft = claim_draft();
    let invoice_id = draft.invoices.ids()[0];
    let before = draft.invoices.values().next().unwrap().attachments.clone();
    let mut t = load_claim(draft).await;
    t.files.fail_uploads(ServiceError::Status {
        status: 413,
        message: "too large".to_string(),
    });

    let err = t
        .controller
        .upload_attachment(pdf("invoice.pdf"), invoice_id, DocumentType::Invoice)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Attachment(AttachmentError::Upload(ServiceError::Status { status: 413, .. }))
    ));
    assert_eq!(
        t.controller.draft().invoices.values().next().unwrap().attachments,
        before
    );
    assert!(!t.controller.is_dirty());
    assert_eq!(t.controller.autosave_state().countdown_seconds, 0);
    assert_eq!(t.notifier.errors().len(), 1);
    assert!(t.files.uploads().is_empty());
}

#[tokio::test]
async fn test_attachment_comment_and_download() {
    let draft = claim_draft();
    let invoice_id = draft.invoices.ids()[0];
    let mut t = load_claim(draft).await;
    let uploaded = t
        .controller
        .upload_attachment(pdf("invoice.pdf"), invoice_id, DocumentType::Invoice)
        .await
        .unwrap();

    t.controller
        .update_attachment_comment(uploaded.id, Some("Paid by cheque".to_string()))
        .unwrap();
    let reference = t.controller.draft().find_attachment(uploaded.id).unwrap();
    assert_eq!(reference.comments.as_deref(), Some("Paid by cheque"));

    let file = t.controller.download_attachment(uploaded.id).await.unwrap();
    assert_eq!(file.file_name, "invoice.pdf");
    assert_eq!(file.content, Bytes::from_static(b"%PDF-1.7"));
}

#[tokio::test]
async fn test_no_expenses_with_invoices_fails_cross_check() {
    let mut draft = claim_draft();
    draft.has_claim_expenses = Some(false);
    let mut t = load_claim(draft).await;

    let err = t.controller.submit().await.unwrap_err();

    match err {
        WorkflowError::Submit(SubmitError::CrossCheck(violation)) => {
            assert_eq!(violation.rule, "no_expenses_without_invoices")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
