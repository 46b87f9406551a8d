//! Periodic progress reports on an approved project.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{CrossCheckViolation, DraftDocument, DraftKind, Section};
use crate::models::{AttachmentPolicy, AttachmentRef, Declaration, DocumentType, RecordType};
use crate::repeatable::Repeatable;
use crate::validation::rules::has_text;
use crate::validation::{
    conditional_errors, ConditionalRule, ErrorCollector, FieldError, FieldPath,
};

pub const WORKPLAN_SECTION: &str = "workplan";
pub const ATTACHMENTS_SECTION: &str = "attachments";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProjectProgress {
    NotStarted,
    OnSchedule,
    AheadOfSchedule,
    BehindSchedule,
    Complete,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DelayReason {
    PermitDelays,
    SupplyChain,
    Weather,
    Staffing,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActivityStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkplanActivity {
    pub name: Option<String>,
    pub status: Option<ActivityStatus>,
    pub planned_completion_date: Option<NaiveDate>,
    pub actual_completion_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workplan {
    pub project_progress: Option<ProjectProgress>,
    pub delay_reason: Option<DelayReason>,
    pub other_delay_reason: Option<String>,
    pub behind_schedule_mitigating_comments: Option<String>,
    pub project_completion_percentage: Option<Decimal>,
    #[serde(default)]
    pub activities: Repeatable<WorkplanActivity>,
}

impl Workplan {
    pub fn is_behind_schedule(&self) -> bool {
        self.project_progress == Some(ProjectProgress::BehindSchedule)
    }

    fn validate_into(&self, errors: &mut ErrorCollector) {
        let section = WORKPLAN_SECTION;
        errors.require_some(
            FieldPath::new(section, "projectProgress"),
            self.project_progress.as_ref(),
        );
        errors.require_amount(
            FieldPath::new(section, "projectCompletionPercentage"),
            self.project_completion_percentage,
            Some(Decimal::ZERO),
            Some(Decimal::ONE_HUNDRED),
        );
        for item in self.activities.iter() {
            errors.within_item(item.id, |errors| {
                errors.require_text(
                    FieldPath::new(section, "activities.name"),
                    item.value.name.as_deref(),
                );
                errors.require_some(
                    FieldPath::new(section, "activities.status"),
                    item.value.status.as_ref(),
                );
                if item.value.status == Some(ActivityStatus::Completed) {
                    errors.require_some(
                        FieldPath::new(section, "activities.actualCompletionDate"),
                        item.value.actual_completion_date.as_ref(),
                    );
                }
            });
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub id: Uuid,
    pub project_id: Uuid,
    pub reporting_period: Option<String>,
    #[serde(default)]
    pub workplan: Workplan,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub declaration: Declaration,
}

impl ProgressReport {
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
        key: WORKPLAN_SECTION,
        title: "Workplan",
    },
    Section {
        key: ATTACHMENTS_SECTION,
        title: "Attachments",
    },
    Section {
        key: Declaration::SECTION,
        title: "Declaration",
    },
];

static RULES: [ConditionalRule<ProgressReport>; 3] = [
    ConditionalRule {
        name: "delay_reason",
        controller: FieldPath::new(WORKPLAN_SECTION, "projectProgress"),
        dependent: FieldPath::new(WORKPLAN_SECTION, "delayReason"),
        applies: |d| d.workplan.is_behind_schedule(),
        is_set: |d| d.workplan.delay_reason.is_some(),
        reset: |d| d.workplan.delay_reason = None,
    },
    ConditionalRule {
        name: "behind_schedule_mitigating_comments",
        controller: FieldPath::new(WORKPLAN_SECTION, "projectProgress"),
        dependent: FieldPath::new(WORKPLAN_SECTION, "behindScheduleMitigatingComments"),
        applies: |d| d.workplan.is_behind_schedule(),
        is_set: |d| has_text(d.workplan.behind_schedule_mitigating_comments.as_deref()),
        reset: |d| d.workplan.behind_schedule_mitigating_comments = None,
    },
    ConditionalRule {
        name: "other_delay_reason",
        controller: FieldPath::new(WORKPLAN_SECTION, "delayReason"),
        dependent: FieldPath::new(WORKPLAN_SECTION, "otherDelayReason"),
        applies: |d| d.workplan.delay_reason == Some(DelayReason::Other),
        is_set: |d| has_text(d.workplan.other_delay_reason.as_deref()),
        reset: |d| d.workplan.other_delay_reason = None,
    },
];

const EVIDENCE_DOCUMENTS: &[DocumentType] = &[
    DocumentType::ProgressEvidence,
    DocumentType::SupportingDocument,
];

impl DraftDocument for ProgressReport {
    const KIND: DraftKind = DraftKind::ProgressReport;

    fn id(&self) -> Uuid {
        self.id
    }

    fn sections() -> &'static [Section] {
        SECTIONS
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = ErrorCollector::new();
        self.workplan.validate_into(&mut errors);
        if !self
            .attachments
            .iter()
            .any(|r| r.document_type == DocumentType::ProgressEvidence)
        {
            errors.push(FieldError::required(FieldPath::new(
                ATTACHMENTS_SECTION,
                "progressEvidence",
            )));
        }
        self.declaration.validate_into(&mut errors);
        errors.extend(conditional_errors(self, &RULES));
        errors.finish()
    }

    fn recompute(&mut self) {}

    fn conditional_rules() -> &'static [ConditionalRule<Self>] {
        &RULES
    }

    fn cross_check(&self) -> Result<(), CrossCheckViolation> {
        let complete = self.workplan.project_progress == Some(ProjectProgress::Complete);
        let percentage = self.workplan.project_completion_percentage.unwrap_or_default();
        if complete && percentage < Decimal::ONE_HUNDRED {
            return Err(CrossCheckViolation {
                rule: "complete_requires_full_percentage",
                message: "A complete project must report 100% completion",
            });
        }
        Ok(())
    }

    fn attachment_list_mut(
        &mut self,
        record_id: Uuid,
    ) -> Option<(RecordType, &mut Vec<AttachmentRef>)> {
        (record_id == self.id).then_some((RecordType::ProgressReport, &mut self.attachments))
    }

    fn attachment_lists_mut(&mut self) -> Vec<&mut Vec<AttachmentRef>> {
        vec![&mut self.attachments]
    }

    fn attachments(&self) -> Vec<&AttachmentRef> {
        self.attachments.iter().collect()
    }

    fn attachment_policy(_record_type: RecordType) -> AttachmentPolicy {
        AttachmentPolicy::Multiple {
            allowed: Some(EVIDENCE_DOCUMENTS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{apply_conditional_resets, applying};

    fn behind_schedule_report() -> ProgressReport {
        let mut report = ProgressReport::new(Uuid::new_v4(), Uuid::new_v4());
        report.workplan.project_progress = Some(ProjectProgress::BehindSchedule);
        report.workplan.delay_reason = Some(DelayReason::Other);
        report.workplan.other_delay_reason = Some("Contractor insolvency".to_string());
        report.workplan.behind_schedule_mitigating_comments = Some("New tender".to_string());
        report
    }

    fn conditional_fields(report: &ProgressReport) -> Vec<String> {
        conditional_errors(report, &RULES)
            .into_iter()
            .map(|e| e.path.field.into_owned())
            .collect()
    }

    #[test]
    fn test_behind_schedule_requires_reason_and_comment() {
        let mut report = ProgressReport::new(Uuid::new_v4(), Uuid::new_v4());
        report.workplan.project_progress = Some(ProjectProgress::BehindSchedule);
        assert_eq!(
            conditional_fields(&report),
            vec!["delayReason", "behindScheduleMitigatingComments"]
        );

        report.workplan.delay_reason = Some(DelayReason::Other);
        assert!(conditional_fields(&report).contains(&"otherDelayReason".to_string()));
    }

    #[test]
    fn test_back_on_schedule_clears_cascade() {
        let mut report = behind_schedule_report();
        let before = applying(&report, &RULES);

        report.workplan.project_progress = Some(ProjectProgress::OnSchedule);
        let reset =
            apply_conditional_resets(&mut report, &RULES, &before, ProgressReport::recompute);

        assert_eq!(report.workplan.delay_reason, None);
        assert_eq!(report.workplan.other_delay_reason, None);
        assert_eq!(report.workplan.behind_schedule_mitigating_comments, None);
        assert_eq!(reset.len(), 3);
        assert!(conditional_fields(&report).is_empty());
    }

    #[test]
    fn test_complete_below_hundred_fails_cross_check() {
        let mut report = ProgressReport::new(Uuid::new_v4(), Uuid::new_v4());
        report.workplan.project_progress = Some(ProjectProgress::Complete);
        report.workplan.project_completion_percentage = Some(Decimal::from(90));
        assert!(report.cross_check().is_err());

        report.workplan.project_completion_percentage = Some(Decimal::ONE_HUNDRED);
        assert!(report.cross_check().is_ok());
    }

    #[test]
    fn test_evidence_accepts_multiple_files() {
        let policy = ProgressReport::attachment_policy(RecordType::ProgressReport);
        let mut list = Vec::new();
        for _ in 0..2 {
            policy.insert(
                &mut list,
                AttachmentRef {
                    id: Uuid::new_v4(),
                    name: "site-photo.jpg".to_string(),
                    document_type: DocumentType::ProgressEvidence,
                    comments: None,
                },
            );
        }
        assert_eq!(list.len(), 2);
    }
}
