//! Full proposal, submitted once an EOI has been accepted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{CrossCheckViolation, DraftDocument, DraftKind, Section, UserProfile};
use crate::models::{
    AttachmentPolicy, AttachmentRef, Declaration, DocumentType, FundingInformation,
    ProjectInformation, ProponentInformation, RecordType,
};
use crate::repeatable::Repeatable;
use crate::totals::{self, CostEstimateClass};
use crate::validation::{
    conditional_errors, ConditionalRule, ErrorCollector, FieldError, FieldErrorKind, FieldPath,
};

pub const PROJECT_SECTION: &str = "proponent_and_project";
pub const BUDGET_SECTION: &str = "budget";
pub const COST_ESTIMATES_SECTION: &str = "cost_estimates";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CostCategory {
    ProjectAdministration,
    Design,
    Construction,
    Equipment,
    Contingency,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub task_name: Option<String>,
    pub cost_category: Option<CostCategory>,
    pub unit_rate: Option<Decimal>,
    pub quantity: Option<Decimal>,
    // derived
    pub total_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimates {
    pub cost_estimate_class: Option<CostEstimateClass>,
    #[serde(default)]
    pub estimates: Repeatable<CostEstimate>,
    /// Contingency as a percentage of the estimate.
    pub contingency: Option<Decimal>,

    // derived
    #[serde(default)]
    pub total_cost: Decimal,
    #[serde(default)]
    pub discrepancy: Decimal,
    #[serde(default)]
    pub estimates_match_funding_request: bool,
    #[serde(default, rename = "isContingencyPercentageThreasholdMet")]
    pub is_contingency_percentage_threshold_met: bool,
}

impl CostEstimates {
    pub fn recompute(&mut self, funding_request: Option<Decimal>) {
        for estimate in self.estimates.values_mut() {
            estimate.total_cost = totals::line_cost(estimate.unit_rate, estimate.quantity);
        }
        self.total_cost = totals::sum(self.estimates.values().map(|e| &e.total_cost));
        self.discrepancy = totals::discrepancy(self.total_cost, funding_request);
        self.estimates_match_funding_request = funding_request == Some(self.total_cost);
        self.is_contingency_percentage_threshold_met =
            totals::contingency_threshold_met(self.cost_estimate_class, self.contingency);
    }

    fn validate_into(&self, errors: &mut ErrorCollector) {
        let section = COST_ESTIMATES_SECTION;
        errors.require_some(
            FieldPath::new(section, "costEstimateClass"),
            self.cost_estimate_class.as_ref(),
        );
        errors.require_non_empty(
            FieldPath::new(section, "estimates"),
            &self.estimates.ids(),
        );
        for item in self.estimates.iter() {
            errors.within_item(item.id, |errors| {
                let estimate = &item.value;
                errors.require_text(
                    FieldPath::new(section, "estimates.taskName"),
                    estimate.task_name.as_deref(),
                );
                errors.require_some(
                    FieldPath::new(section, "estimates.costCategory"),
                    estimate.cost_category.as_ref(),
                );
                errors.require_amount(
                    FieldPath::new(section, "estimates.unitRate"),
                    estimate.unit_rate,
                    Some(Decimal::ZERO),
                    None,
                );
                errors.require_amount(
                    FieldPath::new(section, "estimates.quantity"),
                    estimate.quantity,
                    Some(Decimal::ONE),
                    None,
                );
            });
        }
        errors.require_amount(
            FieldPath::new(section, "contingency"),
            self.contingency,
            Some(Decimal::ZERO),
            Some(Decimal::ONE_HUNDRED),
        );
        if !self.estimates_match_funding_request {
            errors.push(FieldError::new(
                FieldPath::new(section, "estimatesMatchFundingRequest"),
                FieldErrorKind::MustBeTrue,
            ));
        }
        if !self.is_contingency_percentage_threshold_met {
            errors.push(FieldError::new(
                FieldPath::new(section, "isContingencyPercentageThreasholdMet"),
                FieldErrorKind::MustBeTrue,
            ));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullProposal {
    pub id: Uuid,
    pub eoi_id: Option<Uuid>,
    #[serde(default)]
    pub proponent: ProponentInformation,
    #[serde(default)]
    pub project: ProjectInformation,
    #[serde(default)]
    pub budget: FundingInformation,
    #[serde(default)]
    pub cost_estimates: CostEstimates,
    #[serde(default)]
    pub declaration: Declaration,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl FullProposal {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

const SECTIONS: &[Section] = &[
    Section {
        key: PROJECT_SECTION,
        title: "Proponent and Project Information",
    },
    Section {
        key: BUDGET_SECTION,
        title: "Budget",
    },
    Section {
        key: COST_ESTIMATES_SECTION,
        title: "Cost Estimates",
    },
    Section {
        key: Declaration::SECTION,
        title: "Declaration",
    },
];

static RULES: [ConditionalRule<FullProposal>; 3] = [
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
        controller: FieldPath::new(BUDGET_SECTION, "remainingAmount"),
        dependent: FieldPath::new(BUDGET_SECTION, "intendedFundingSource"),
        applies: |d| d.budget.requires_intended_funding_source(),
        is_set: |d| d.budget.has_intended_funding_source(),
        reset: |d| d.budget.intended_funding_source = None,
    },
    ConditionalRule {
        name: "other_funding",
        controller: FieldPath::new(BUDGET_SECTION, "haveOtherFunding"),
        dependent: FieldPath::new(BUDGET_SECTION, "otherFunding"),
        applies: |d| d.budget.requires_other_funding(),
        is_set: |d| !d.budget.other_funding.is_empty(),
        reset: |d| d.budget.other_funding.clear(),
    },
];

const PROPOSAL_DOCUMENTS: &[DocumentType] = &[
    DocumentType::CostEstimate,
    DocumentType::ResolutionFromBoard,
    DocumentType::SupportingDocument,
];

impl DraftDocument for FullProposal {
    const KIND: DraftKind = DraftKind::FullProposal;

    fn id(&self) -> Uuid {
        self.id
    }

    fn sections() -> &'static [Section] {
        SECTIONS
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = ErrorCollector::new();
        self.proponent.validate_into(PROJECT_SECTION, &mut errors);
        self.project.validate_into(PROJECT_SECTION, &mut errors);
        self.budget.validate_into(BUDGET_SECTION, &mut errors);
        self.cost_estimates.validate_into(&mut errors);
        self.declaration.validate_into(&mut errors);
        errors.extend(conditional_errors(self, &RULES));
        errors.finish()
    }

    fn recompute(&mut self) {
        self.budget.recompute();
        self.cost_estimates.recompute(self.budget.funding_request);
    }

    fn conditional_rules() -> &'static [ConditionalRule<Self>] {
        &RULES
    }

    fn cross_check(&self) -> Result<(), CrossCheckViolation> {
        if let (Some(request), Some(eligible)) =
            (self.budget.funding_request, self.budget.total_eligible_costs)
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
        AttachmentPolicy::Multiple {
            allowed: Some(PROPOSAL_DOCUMENTS),
        }
    }
}
