//! Derived monetary values.
//!
//! Every derived total in a draft is one of these functions applied to the
//! draft's line items; drafts never persist a total that is not recomputed.
//! Missing inputs count as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sum of optional amounts.
pub fn sum<'a>(amounts: impl IntoIterator<Item = &'a Option<Decimal>>) -> Decimal {
    amounts.into_iter().flatten().copied().sum()
}

/// Unit rate × quantity, or `None` when either is missing.
pub fn line_cost(unit_rate: Option<Decimal>, quantity: Option<Decimal>) -> Option<Decimal> {
    Some(unit_rate? * quantity?)
}

/// Total project cost − total eligible costs − other funding.
pub fn remaining_amount(
    total_project_cost: Option<Decimal>,
    total_eligible_costs: Option<Decimal>,
    other_funding: Decimal,
) -> Decimal {
    estimated_unfunded_amount(total_project_cost, total_eligible_costs) - other_funding
}

/// Share of the project cost this program does not fund.
pub fn estimated_unfunded_amount(
    total_project_cost: Option<Decimal>,
    total_eligible_costs: Option<Decimal>,
) -> Decimal {
    total_project_cost.unwrap_or_default() - total_eligible_costs.unwrap_or_default()
}

/// Total cost − requested funding.
pub fn discrepancy(total_cost: Decimal, funding_request: Option<Decimal>) -> Decimal {
    total_cost - funding_request.unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CostEstimateClass {
    ClassA,
    ClassB,
}

impl CostEstimateClass {
    /// Highest contingency percentage accepted for the class.
    pub fn contingency_threshold(&self) -> Decimal {
        match self {
            CostEstimateClass::ClassA => Decimal::from(15),
            CostEstimateClass::ClassB => Decimal::from(25),
        }
    }
}

/// Whether the contingency stays within the class threshold. Unknown class
/// or contingency never meets it.
pub fn contingency_threshold_met(
    class: Option<CostEstimateClass>,
    contingency: Option<Decimal>,
) -> bool {
    match (class, contingency) {
        (Some(class), Some(contingency)) => contingency <= class.contingency_threshold(),
        _ => false,
    }
}
