//! Expression of Interest application.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{CrossCheckViolation, DraftDocument, DraftKind, Section, UserProfile};
use crate::models::{
    AttachmentPolicy, AttachmentRef, Contact, Declaration, FundingInformation, Hazard, RecordType,
};
use crate::repeatable::Repeatable;
use crate::validation::rules::has_text;
use crate::validation::{
    conditional_errors, ConditionalRule, ErrorCollector, FieldError, FieldErrorKind, FieldPath,
};

pub const PROPONENT_SECTION: &str = "proponent_information";
pub const PROJECT_SECTION: &str = "project_information";
pub const FUNDING_SECTION: &str = "funding_information";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProponentInformation {
    pub organization_name: Option<String>,
    #[serde(default)]
    pub authorized_representative: Contact,
    #[serde(default)]
    pub additional_contacts: Repeatable<Contact>,
}

impl ProponentInformation {
    pub fn validate_into(&self, section: &'static str, errors: &mut ErrorCollector) {
        errors.require_text(
            FieldPath::new(section, "organizationName"),
            self.organization_name.as_deref(),
        );
        self.authorized_representative.validate_into(section, errors);
        for contact in self.additional_contacts.iter() {
            errors.within_item(contact.id, |errors| {
                contact.value.validate_into(section, errors)
            });
        }
    }
}

/// Project description shared by the EOI and the full proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInformation {
    pub project_title: Option<String>,
    #[serde(default)]
    pub related_hazards: Vec<Hazard>,
    pub other_hazards_description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProjectInformation {
    pub fn requires_other_hazards_description(&self) -> bool {
        self.related_hazards.contains(&Hazard::Other)
    }

    pub fn has_other_hazards_description(&self) -> bool {
        has_text(self.other_hazards_description.as_deref())
    }

    pub fn validate_into(&self, section: &'static str, errors: &mut ErrorCollector) {
        errors.require_text(
            FieldPath::new(section, "projectTitle"),
            self.project_title.as_deref(),
        );
        errors.require_non_empty(
            FieldPath::new(section, "relatedHazards"),
            &self.related_hazards,
        );
        errors.require_some(FieldPath::new(section, "startDate"), self.start_date.as_ref());
        errors.require_some(FieldPath::new(section, "endDate"), self.end_date.as_ref());
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.push(FieldError::new(
                    FieldPath::new(section, "endDate"),
                    FieldErrorKind::Invalid {
                        code: "end_before_start".to_string(),
                    },
                ));
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EoiApplication {
    pub id: Uuid,
    #[serde(default)]
    pub proponent: ProponentInformation,
    #[serde(default)]
    pub project: ProjectInformation,
    #[serde(default)]
    pub funding: FundingInformation,
    #[serde(default)]
    pub declaration: Declaration,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl EoiApplication {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

const SECTIONS: &[Section] = &[
    Section {
        key: PROPONENT_SECTION,
        title: "Proponent Information",
    },
    Section {
        key: PROJECT_SECTION,
        title: "Project Information",
    },
    Section {
        key: FUNDING_SECTION,
        title: "Funding Information",
    },
    Section {
        key: Declaration::SECTION,
        title: "Declaration",
    },
];

static RULES: [ConditionalRule<EoiApplication>; 3] = [
    ConditionalRule {
        name: "other_hazards_description",
        controller: FieldPath::new(PROJECT_SECTION, "relatedHazards"),
        dependent: FieldPath::new(PROJECT_SECTION, "otherHazardsDescription"),
        applies: |d| d.project.requires_other_hazards_description(),
        is_set: |d| d.project.has_other_hazards_description(),
        reset: |d| d.project.other_hazards_description = None,
    },
    ConditionalRule {
        name: "intended_funding_source",
        controller: FieldPath::new(FUNDING_SECTION, "remainingAmount"),
        dependent: FieldPath::new(FUNDING_SECTION, "intendedFundingSource"),
        applies: |d| d.funding.requires_intended_funding_source(),
        is_set: |d| d.funding.has_intended_funding_source(),
        reset: |d| d.funding.intended_funding_source = None,
    },
    ConditionalRule {
        name: "other_funding",
        controller: FieldPath::new(FUNDING_SECTION, "haveOtherFunding"),
        dependent: FieldPath::new(FUNDING_SECTION, "otherFunding"),
        applies: |d| d.funding.requires_other_funding(),
        is_set: |d| !d.funding.other_funding.is_empty(),
        reset: |d| d.funding.other_funding.clear(),
    },
];

impl DraftDocument for EoiApplication {
    const KIND: DraftKind = DraftKind::EoiApplication;

    fn id(&self) -> Uuid {
        self.id
    }

    fn sections() -> &'static [Section] {
        SECTIONS
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = ErrorCollector::new();
        self.proponent.validate_into(PROPONENT_SECTION, &mut errors);
        self.project.validate_into(PROJECT_SECTION, &mut errors);
        self.funding.validate_into(FUNDING_SECTION, &mut errors);
        self.declaration.validate_into(&mut errors);
        errors.extend(conditional_errors(self, &RULES));
        errors.finish()
    }

    fn recompute(&mut self) {
        self.funding.recompute();
    }

    fn conditional_rules() -> &'static [ConditionalRule<Self>] {
        &RULES
    }

    fn cross_check(&self) -> Result<(), CrossCheckViolation> {
        if let (Some(request), Some(eligible)) =
            (self.funding.funding_request, self.funding.total_eligible_costs)
        {
            if request > eligible {
                return Err(CrossCheckViolation {
                    rule: "funding_request_within_eligible_costs",
                    message: "The funding request cannot exceed the total eligible costs",
                });
            }
        }
        Ok(())
    }

    fn apply_profile_defaults(&mut self, profile: &UserProfile) -> bool {
        self.proponent
            .authorized_representative
            .fill_from_profile(profile)
    }

    fn attachment_list_mut(
        &mut self,
        record_id: Uuid,
    ) -> Option<(RecordType, &mut Vec<AttachmentRef>)> {
        (record_id == self.id).then_some((RecordType::Application, &mut self.attachments))
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
