//! Requests to clear a funding condition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{CrossCheckViolation, DraftDocument, DraftKind, Section};
use crate::models::{AttachmentPolicy, AttachmentRef, Declaration, RecordType};
use crate::validation::{ConditionalRule, ErrorCollector, FieldError, FieldPath};

pub const CONDITION_SECTION: &str = "condition";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRequest {
    pub id: Uuid,
    pub project_id: Uuid,
    pub condition_name: Option<String>,
    pub explanation: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub declaration: Declaration,
}

impl ConditionRequest {
    pub fn new(project_id: Uuid, id: Uuid) -> Self {
        Self {
            id,
            project_id,
            ..Default::default()
        }
    }
}

static RULES: [ConditionalRule<ConditionRequest>; 0] = [];

const SECTIONS: &[Section] = &[
    Section {
        key: CONDITION_SECTION,
        title: "Condition",
    },
    Section {
        key: Declaration::SECTION,
        title: "Declaration",
    },
];

impl DraftDocument for ConditionRequest {
    const KIND: DraftKind = DraftKind::ConditionRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn sections() -> &'static [Section] {
        SECTIONS
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = ErrorCollector::new();
        errors.require_text(
            FieldPath::new(CONDITION_SECTION, "conditionName"),
            self.condition_name.as_deref(),
        );
        errors.require_text(
            FieldPath::new(CONDITION_SECTION, "explanation"),
            self.explanation.as_deref(),
        );
        self.declaration.validate_into(&mut errors);
        errors.finish()
    }

    fn recompute(&mut self) {}

    fn conditional_rules() -> &'static [ConditionalRule<Self>] {
        &RULES
    }

    fn cross_check(&self) -> Result<(), CrossCheckViolation> {
        if self.attachments.is_empty() {
            return Err(CrossCheckViolation {
                rule: "supporting_document_required",
                message: "Attach at least one supporting document",
            });
        }
        Ok(())
    }

    fn attachment_list_mut(
        &mut self,
        record_id: Uuid,
    ) -> Option<(RecordType, &mut Vec<AttachmentRef>)> {
        (record_id == self.id).then_some((RecordType::ConditionRequest, &mut self.attachments))
    }

    fn attachment_lists_mut(&mut self) -> Vec<&mut Vec<AttachmentRef>> {
        vec![&mut self.attachments]
    }

    fn attachments(&self) -> Vec<&AttachmentRef> {
        self.attachments.iter().collect()
    }

    fn attachment_policy(_record_type: RecordType) -> AttachmentPolicy {
        AttachmentPolicy::one_per_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;

    #[test]
    fn test_cross_check_needs_a_document() {
        let mut request = ConditionRequest::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            request.cross_check().unwrap_err().rule,
            "supporting_document_required"
        );

        request.attachments.push(AttachmentRef {
            id: Uuid::new_v4(),
            name: "bylaw.pdf".to_string(),
            document_type: DocumentType::ConditionEvidence,
            comments: None,
        });
        assert!(request.cross_check().is_ok());
    }

    #[test]
    fn test_sections_report_condition_first() {
        let request = ConditionRequest::new(Uuid::new_v4(), Uuid::new_v4());
        let errors = request.validate();
        assert_eq!(errors[0].path.section, CONDITION_SECTION);
        assert_eq!(ConditionRequest::sections()[0].title, "Condition");
    }
}
