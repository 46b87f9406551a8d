//! Ready-made drafts for tests

use chrono::NaiveDate;
use relief_core::models::{
    AttachmentRef, Claim, Contact, Declaration, DocumentType, EoiApplication, FundingSource,
    FundingType, Hazard, Invoice,
};
use relief_core::DraftDocument;
use rust_decimal::Decimal;
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn contact() -> Contact {
    Contact {
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
        title: Some("Treasurer".to_string()),
        department: Some("Finance".to_string()),
        phone: Some("250-555-0100".to_string()),
        email: Some("ada@example.org".to_string()),
    }
}

pub fn declaration() -> Declaration {
    Declaration {
        authorized_representative_statement: Some(true),
        information_accuracy_statement: Some(true),
    }
}

pub fn funding_source(amount: i64) -> FundingSource {
    FundingSource {
        name: Some("Municipal reserve".to_string()),
        funding_type: Some(FundingType::SelfFunding),
        amount: Some(Decimal::from(amount)),
        other_description: None,
    }
}

pub fn attachment(document_type: DocumentType) -> AttachmentRef {
    AttachmentRef {
        id: Uuid::new_v4(),
        name: format!("{}.pdf", document_type),
        document_type,
        comments: None,
    }
}

/// A complete EOI: total 1000, eligible 600, other funding 150 + 50.
pub fn eoi_draft() -> EoiApplication {
    let mut draft = EoiApplication::new(Uuid::new_v4());
    draft.proponent.organization_name = Some("Village of Riverside".to_string());
    draft.proponent.authorized_representative = contact();
    draft.project.project_title = Some("Dike upgrade".to_string());
    draft.project.related_hazards = vec![Hazard::Flood];
    draft.project.start_date = date(2025, 4, 1);
    draft.project.end_date = date(2026, 3, 31);
    draft.funding.total_project_cost = Some(Decimal::from(1000));
    draft.funding.total_eligible_costs = Some(Decimal::from(600));
    draft.funding.funding_request = Some(Decimal::from(500));
    draft.funding.have_other_funding = Some(true);
    draft.funding.other_funding = [funding_source(150), funding_source(50)]
        .into_iter()
        .collect();
    draft.funding.intended_funding_source = Some("Capital reserve".to_string());
    draft.declaration = declaration();
    draft.recompute();
    draft
}

/// An invoice with both required documents attached.
pub fn invoice() -> Invoice {
    let mut invoice = Invoice {
        invoice_number: Some("INV-001".to_string()),
        supplier_name: Some("Northern Aggregates".to_string()),
        invoice_date: date(2025, 6, 15),
        gross_amount: Some(Decimal::from(1200)),
        tax_rebate: Some(Decimal::from(60)),
        attachments: vec![
            attachment(DocumentType::Invoice),
            attachment(DocumentType::ProofOfPayment),
        ],
        claim_amount: Decimal::ZERO,
    };
    invoice.recompute();
    invoice
}

/// A complete claim with a single invoice.
pub fn claim_draft() -> Claim {
    let mut draft = Claim::new(Uuid::new_v4(), Uuid::new_v4());
    draft.has_claim_expenses = Some(true);
    draft.invoices.push(invoice());
    draft.declaration = declaration();
    draft.recompute();
    draft
}
