//! Funding block shared by the EOI application and the full proposal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::FundingSource;
use crate::repeatable::Repeatable;
use crate::totals;
use crate::validation::rules::has_text;
use crate::validation::{ErrorCollector, FieldError, FieldErrorKind, FieldPath};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingInformation {
    pub total_project_cost: Option<Decimal>,
    pub total_eligible_costs: Option<Decimal>,
    pub funding_request: Option<Decimal>,
    pub have_other_funding: Option<bool>,
    #[serde(default)]
    pub other_funding: Repeatable<FundingSource>,
    pub intended_funding_source: Option<String>,

    // derived
    #[serde(default)]
    pub other_funding_total: Decimal,
    #[serde(default)]
    pub remaining_amount: Decimal,
    #[serde(default)]
    pub estimated_unfunded_amount: Decimal,
}

impl FundingInformation {
    pub fn recompute(&mut self) {
        self.other_funding_total = totals::sum(self.other_funding.values().map(|s| &s.amount));
        self.estimated_unfunded_amount =
            totals::estimated_unfunded_amount(self.total_project_cost, self.total_eligible_costs);
        self.remaining_amount = totals::remaining_amount(
            self.total_project_cost,
            self.total_eligible_costs,
            self.other_funding_total,
        );
    }

    pub fn requires_intended_funding_source(&self) -> bool {
        !self.remaining_amount.is_zero()
    }

    pub fn has_intended_funding_source(&self) -> bool {
        has_text(self.intended_funding_source.as_deref())
    }

    pub fn requires_other_funding(&self) -> bool {
        self.have_other_funding == Some(true)
    }

    pub fn validate_into(&self, section: &'static str, errors: &mut ErrorCollector) {
        let zero = Some(Decimal::ZERO);
        errors.require_amount(
            FieldPath::new(section, "totalProjectCost"),
            self.total_project_cost,
            zero,
            None,
        );
        errors.require_amount(
            FieldPath::new(section, "totalEligibleCosts"),
            self.total_eligible_costs,
            zero,
            self.total_project_cost,
        );
        errors.require_amount(
            FieldPath::new(section, "fundingRequest"),
            self.funding_request,
            zero,
            None,
        );
        errors.require_some(
            FieldPath::new(section, "haveOtherFunding"),
            self.have_other_funding.as_ref(),
        );
        if !self.other_funding.is_empty() && !self.requires_other_funding() {
            errors.push(FieldError::new(
                FieldPath::new(section, "otherFunding"),
                FieldErrorKind::Invalid {
                    code: "other_funding_not_declared".to_string(),
                },
            ));
        }
        for item in self.other_funding.iter() {
            errors.within_item(item.id, |errors| {
                let source = &item.value;
                errors.require_text(
                    FieldPath::new(section, "otherFunding.name"),
                    source.name.as_deref(),
                );
                errors.require_some(
                    FieldPath::new(section, "otherFunding.type"),
                    source.funding_type.as_ref(),
                );
                errors.require_amount(
                    FieldPath::new(section, "otherFunding.amount"),
                    source.amount,
                    zero,
                    None,
                );
            });
        }
    }
}
