use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::draft::UserProfile;
use crate::validation::rules::has_text;
use crate::validation::{from_validation_errors, ErrorCollector, FieldPath};

/// Hazards a project mitigates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Hazard {
    Drought,
    Erosion,
    ExtremeTemperature,
    Flood,
    Geohazards,
    Landslide,
    SeaLevelRise,
    Seismic,
    Storm,
    Tsunami,
    Wildfire,
    Other,
}

/// Contact details for a representative or an additional contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[validate(length(max = 40, message = "First name must be at most 40 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 40, message = "Last name must be at most 40 characters"))]
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
}

impl Contact {
    /// Required fields for a contact, checked under `section`.
    pub fn validate_into(&self, section: &'static str, errors: &mut ErrorCollector) {
        errors.require_text(
            FieldPath::new(section, "firstName"),
            self.first_name.as_deref(),
        );
        errors.require_text(FieldPath::new(section, "lastName"), self.last_name.as_deref());
        errors.require_text(FieldPath::new(section, "email"), self.email.as_deref());
        errors.require_text(FieldPath::new(section, "phone"), self.phone.as_deref());
        if let Err(format_errors) = self.validate() {
            errors.extend(from_validation_errors(section, &format_errors));
        }
    }

    /// Copy profile values into unset fields only. Returns whether anything
    /// was filled.
    pub fn fill_from_profile(&mut self, profile: &UserProfile) -> bool {
        let mut filled = false;
        for (slot, value) in [
            (&mut self.first_name, &profile.first_name),
            (&mut self.last_name, &profile.last_name),
            (&mut self.title, &profile.title),
            (&mut self.department, &profile.department),
            (&mut self.phone, &profile.phone),
            (&mut self.email, &profile.email),
        ] {
            if !has_text(slot.as_deref()) && has_text(value.as_deref()) {
                *slot = value.clone();
                filled = true;
            }
        }
        filled
    }
}

/// The two statements every submission must confirm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub authorized_representative_statement: Option<bool>,
    pub information_accuracy_statement: Option<bool>,
}

impl Declaration {
    pub const SECTION: &'static str = "declaration";

    pub fn validate_into(&self, errors: &mut ErrorCollector) {
        errors.require_true(
            FieldPath::new(Self::SECTION, "authorizedRepresentativeStatement"),
            self.authorized_representative_statement,
        );
        errors.require_true(
            FieldPath::new(Self::SECTION, "informationAccuracyStatement"),
            self.information_accuracy_statement,
        );
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FundingType {
    Federal,
    Provincial,
    SelfFunding,
    OtherGrants,
}

/// One source of funding besides this program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingSource {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub funding_type: Option<FundingType>,
    pub amount: Option<Decimal>,
    pub other_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_fills_only_unset_fields() {
        let mut contact = Contact {
            first_name: Some("Grace".to_string()),
            email: Some("  ".to_string()),
            ..Default::default()
        };
        let profile = UserProfile {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.org".to_string()),
            ..Default::default()
        };

        assert!(contact.fill_from_profile(&profile));

        assert_eq!(contact.first_name.as_deref(), Some("Grace"));
        assert_eq!(contact.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(contact.email.as_deref(), Some("ada@example.org"));
        assert_eq!(contact.title, None);
        assert!(!contact.fill_from_profile(&profile));
    }

    #[test]
    fn test_contact_email_format() {
        let contact = Contact {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            phone: Some("250-555-0100".to_string()),
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        let mut errors = ErrorCollector::new();
        contact.validate_into("proponent_information", &mut errors);
        let errors = errors.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, FieldPath::new("proponent_information", "email"));
    }

    #[test]
    fn test_declaration_requires_both_statements() {
        let mut errors = ErrorCollector::new();
        Declaration {
            authorized_representative_statement: Some(true),
            information_accuracy_statement: None,
        }
        .validate_into(&mut errors);
        assert_eq!(errors.finish().len(), 1);
    }
}
