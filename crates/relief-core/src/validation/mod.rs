//! Validation modules
//!
//! Validation is a pure function of a draft: every draft type computes its
//! complete list of [`FieldError`]s on demand, and the workflow controller
//! recomputes it wholesale after each change. Conditional requirements are
//! registered as [`ConditionalRule`] values instead of being attached to and
//! detached from individual fields.

pub mod conditional;
pub mod rules;

use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub use conditional::{apply_conditional_resets, applying, conditional_errors, ConditionalRule};
pub use rules::ErrorCollector;

/// Identifies one field of a draft: the section key plus the field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldPath {
    pub section: &'static str,
    pub field: Cow<'static, str>,
}

impl FieldPath {
    pub const fn new(section: &'static str, field: &'static str) -> Self {
        Self {
            section,
            field: Cow::Borrowed(field),
        }
    }

    pub fn owned(section: &'static str, field: impl Into<String>) -> Self {
        Self {
            section,
            field: Cow::Owned(field.into()),
        }
    }

    /// Whether `other` is this field or a field nested under it, e.g.
    /// `otherFunding` covers `otherFunding.amount`.
    pub fn covers(&self, other: &FieldPath) -> bool {
        self.section == other.section
            && other
                .field
                .strip_prefix(self.field.as_ref())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.section, self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    OutOfRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    /// The value must be `true` (declarations, derived submission gates).
    MustBeTrue,
    Invalid {
        code: String,
    },
}

/// A single validation failure.
///
/// `item` is set when the failing field belongs to one entry of a repeatable
/// list, so the caller can highlight the right row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: FieldPath,
    pub item: Option<Uuid>,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(path: FieldPath, kind: FieldErrorKind) -> Self {
        Self {
            path,
            item: None,
            kind,
        }
    }

    pub fn required(path: FieldPath) -> Self {
        Self::new(path, FieldErrorKind::Required)
    }

    pub fn in_item(mut self, item: Uuid) -> Self {
        self.item = Some(item);
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            FieldErrorKind::Required => write!(f, "{} is required", self.path),
            FieldErrorKind::OutOfRange { min, max } => match (min, max) {
                (Some(min), Some(max)) => {
                    write!(f, "{} must be between {} and {}", self.path, min, max)
                }
                (Some(min), None) => write!(f, "{} must be at least {}", self.path, min),
                (None, Some(max)) => write!(f, "{} must be at most {}", self.path, max),
                (None, None) => write!(f, "{} is out of range", self.path),
            },
            FieldErrorKind::MustBeTrue => write!(f, "{} must be confirmed", self.path),
            FieldErrorKind::Invalid { code } => write!(f, "{} is invalid ({})", self.path, code),
        }
    }
}

/// Convert `validator` derive output into field errors of the given section.
pub fn from_validation_errors(
    section: &'static str,
    errors: &validator::ValidationErrors,
) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| {
                FieldError::new(
                    FieldPath::owned(section, field.clone()),
                    FieldErrorKind::Invalid {
                        code: err.code.to_string(),
                    },
                )
            })
        })
        .collect();
    // HashMap iteration order is not stable
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}
