//! Claims against an approved project.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{CrossCheckViolation, DraftDocument, DraftKind, Section};
use crate::models::{AttachmentPolicy, AttachmentRef, Declaration, DocumentType, RecordType};
use crate::repeatable::Repeatable;
use crate::validation::{
    conditional_errors, ConditionalRule, ErrorCollector, FieldError, FieldErrorKind, FieldPath,
};

pub const EXPENSES_SECTION: &str = "invoices";

const INVOICE_DOCUMENTS: &[DocumentType] = &[DocumentType::Invoice, DocumentType::ProofOfPayment];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_number: Option<String>,
    pub supplier_name: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub gross_amount: Option<Decimal>,
    pub tax_rebate: Option<Decimal>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,

    // derived
    #[serde(default)]
    pub claim_amount: Decimal,
}

impl Invoice {
    pub fn recompute(&mut self) {
        self.claim_amount =
            self.gross_amount.unwrap_or_default() - self.tax_rebate.unwrap_or_default();
    }

    fn has_document(&self, document_type: DocumentType) -> bool {
        self.attachments
            .iter()
            .any(|r| r.document_type == document_type)
    }

    fn validate_into(&self, errors: &mut ErrorCollector) {
        let section = EXPENSES_SECTION;
        errors.require_text(
            FieldPath::new(section, "invoiceNumber"),
            self.invoice_number.as_deref(),
        );
        errors.require_text(
            FieldPath::new(section, "supplierName"),
            self.supplier_name.as_deref(),
        );
        errors.require_some(
            FieldPath::new(section, "invoiceDate"),
            self.invoice_date.as_ref(),
        );
        errors.require_amount(
            FieldPath::new(section, "grossAmount"),
            self.gross_amount,
            Some(Decimal::ZERO),
            None,
        );
        if let Some(rebate) = self.tax_rebate {
            errors.check_range(
                FieldPath::new(section, "taxRebate"),
                rebate,
                Some(Decimal::ZERO),
                self.gross_amount,
            );
        }
        for document_type in INVOICE_DOCUMENTS {
            if !self.has_document(*document_type) {
                errors.push(FieldError::new(
                    FieldPath::owned(section, format!("attachments.{}", document_type)),
                    FieldErrorKind::Required,
                ));
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: Uuid,
    pub project_id: Uuid,
    pub has_claim_expenses: Option<bool>,
    #[serde(default)]
    pub invoices: Repeatable<Invoice>,
    #[serde(default)]
    pub declaration: Declaration,

    // derived
    #[serde(default)]
    pub total_claim_amount: Decimal,
}

impl Claim {
    pub fn new(project_id: Uuid, id: Uuid) -> Self {
        Self {
            id,
            project_id,
            ..Default::default()
        }
    }
}

const SECTIONS: &[Section] = &[
    Section {
        key: EXPENSES_SECTION,
        title: "Invoices",
    },
    Section {
        key: Declaration::SECTION,
        title: "Declaration",
    },
];

static RULES: [ConditionalRule<Claim>; 1] = [ConditionalRule {
    name: "invoices",
    controller: FieldPath::new(EXPENSES_SECTION, "hasClaimExpenses"),
    dependent: FieldPath::new(EXPENSES_SECTION, "invoices"),
    applies: |d| d.has_claim_expenses == Some(true),
    is_set: |d| !d.invoices.is_empty(),
    // Invoices are backend records; a "no expenses" claim that still holds
    // them is rejected by the cross-check instead.
    reset: |_| {},
}];

impl DraftDocument for Claim {
    const KIND: DraftKind = DraftKind::Claim;

    fn id(&self) -> Uuid {
        self.id
    }

    fn sections() -> &'static [Section] {
        SECTIONS
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = ErrorCollector::new();
        errors.require_some(
            FieldPath::new(EXPENSES_SECTION, "hasClaimExpenses"),
            self.has_claim_expenses.as_ref(),
        );
        for item in self.invoices.iter() {
            errors.within_item(item.id, |errors| item.value.validate_into(errors));
        }
        self.declaration.validate_into(&mut errors);
        errors.extend(conditional_errors(self, &RULES));
        errors.finish()
    }

    fn recompute(&mut self) {
        for invoice in self.invoices.values_mut() {
            invoice.recompute();
        }
        self.total_claim_amount = self.invoices.values().map(|i| i.claim_amount).sum();
    }

    fn conditional_rules() -> &'static [ConditionalRule<Self>] {
        &RULES
    }

    fn cross_check(&self) -> Result<(), CrossCheckViolation> {
        if self.has_claim_expenses == Some(false) && !self.invoices.is_empty() {
            return Err(CrossCheckViolation {
                rule: "no_expenses_without_invoices",
                message: "The claim declares no expenses but still lists invoices",
            });
        }
        Ok(())
    }

    fn attachment_list_mut(
        &mut self,
        record_id: Uuid,
    ) -> Option<(RecordType, &mut Vec<AttachmentRef>)> {
        self.invoices
            .get_mut(record_id)
            .map(|invoice| (RecordType::Invoice, &mut invoice.attachments))
    }

    fn attachment_lists_mut(&mut self) -> Vec<&mut Vec<AttachmentRef>> {
        self.invoices
            .values_mut()
            .map(|invoice| &mut invoice.attachments)
            .collect()
    }

    fn attachments(&self) -> Vec<&AttachmentRef> {
        self.invoices
            .values()
            .flat_map(|invoice| invoice.attachments.iter())
            .collect()
    }

    fn attachment_policy(_record_type: RecordType) -> AttachmentPolicy {
        AttachmentPolicy::OnePerType {
            allowed: Some(INVOICE_DOCUMENTS),
        }
    }
}
