//! Funding forecasts per fiscal year.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{CrossCheckViolation, DraftDocument, DraftKind, Section};
use crate::models::{AttachmentPolicy, AttachmentRef, Declaration, RecordType};
use crate::repeatable::Repeatable;
use crate::totals;
use crate::validation::rules::has_text;
use crate::validation::{
    conditional_errors, ConditionalRule, ErrorCollector, FieldError, FieldPath,
};

pub const FORECAST_SECTION: &str = "forecast";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItem {
    /// Fiscal year label, e.g. "2025/2026".
    pub fiscal_year: Option<String>,
    pub forecast_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub id: Uuid,
    pub project_id: Uuid,
    pub approved_funding: Option<Decimal>,
    pub original_forecast: Option<Decimal>,
    #[serde(default)]
    pub forecast_items: Repeatable<ForecastItem>,
    pub variance_comment: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub declaration: Declaration,

    // derived
    #[serde(default)]
    pub forecast_total: Decimal,
    #[serde(default)]
    pub variance: Decimal,
}

impl Forecast {
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
        key: FORECAST_SECTION,
        title: "Forecast",
    },
    Section {
        key: Declaration::SECTION,
        title: "Declaration",
    },
];

static RULES: [ConditionalRule<Forecast>; 1] = [ConditionalRule {
    name: "variance_comment",
    controller: FieldPath::new(FORECAST_SECTION, "variance"),
    dependent: FieldPath::new(FORECAST_SECTION, "varianceComment"),
    applies: |d| !d.variance.is_zero(),
    is_set: |d| has_text(d.variance_comment.as_deref()),
    reset: |d| d.variance_comment = None,
}];

impl DraftDocument for Forecast {
    const KIND: DraftKind = DraftKind::Forecast;

    fn id(&self) -> Uuid {
        self.id
    }

    fn sections() -> &'static [Section] {
        SECTIONS
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = ErrorCollector::new();
        let zero = Some(Decimal::ZERO);
        errors.require_amount(
            FieldPath::new(FORECAST_SECTION, "originalForecast"),
            self.original_forecast,
            zero,
            None,
        );
        errors.require_non_empty(
            FieldPath::new(FORECAST_SECTION, "forecastItems"),
            &self.forecast_items.ids(),
        );
        for item in self.forecast_items.iter() {
            errors.within_item(item.id, |errors| {
                errors.require_text(
                    FieldPath::new(FORECAST_SECTION, "forecastItems.fiscalYear"),
                    item.value.fiscal_year.as_deref(),
                );
                errors.require_amount(
                    FieldPath::new(FORECAST_SECTION, "forecastItems.forecastAmount"),
                    item.value.forecast_amount,
                    zero,
                    None,
                );
            });
        }
        self.declaration.validate_into(&mut errors);
        errors.extend(conditional_errors(self, &RULES));
        errors.finish()
    }

    fn recompute(&mut self) {
        self.forecast_total =
            totals::sum(self.forecast_items.values().map(|i| &i.forecast_amount));
        self.variance = self.forecast_total - self.original_forecast.unwrap_or_default();
    }

    fn conditional_rules() -> &'static [ConditionalRule<Self>] {
        &RULES
    }

    fn cross_check(&self) -> Result<(), CrossCheckViolation> {
        match self.approved_funding {
            Some(approved) if self.forecast_total > approved => Err(CrossCheckViolation {
                rule: "forecast_within_approved_funding",
                message: "The forecast total cannot exceed the approved funding",
            }),
            _ => Ok(()),
        }
    }

    fn attachment_list_mut(
        &mut self,
        record_id: Uuid,
    ) -> Option<(RecordType, &mut Vec<AttachmentRef>)> {
        (record_id == self.id).then_some((RecordType::Forecast, &mut self.attachments))
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
