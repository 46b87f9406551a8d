//! Field-presence and bound checks shared by every draft type.
//!
//! Absent values are treated as "no value", never as an error of the
//! checker itself.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{FieldError, FieldErrorKind, FieldPath};

/// Accumulates field errors for one draft.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<FieldError>,
    item: Option<Uuid>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with every error tagged as belonging to repeatable item `id`.
    pub fn within_item(&mut self, id: Uuid, f: impl FnOnce(&mut Self)) {
        let previous = self.item.replace(id);
        f(self);
        self.item = previous;
    }

    pub fn push(&mut self, error: FieldError) {
        let error = match self.item {
            Some(id) if error.item.is_none() => error.in_item(id),
            _ => error,
        };
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = FieldError>) {
        for error in errors {
            self.push(error);
        }
    }

    pub fn require_text(&mut self, path: FieldPath, value: Option<&str>) {
        if !has_text(value) {
            self.push(FieldError::required(path));
        }
    }

    pub fn require_some<T>(&mut self, path: FieldPath, value: Option<&T>) {
        if value.is_none() {
            self.push(FieldError::required(path));
        }
    }

    pub fn require_non_empty<T>(&mut self, path: FieldPath, values: &[T]) {
        if values.is_empty() {
            self.push(FieldError::required(path));
        }
    }

    pub fn require_true(&mut self, path: FieldPath, value: Option<bool>) {
        match value {
            Some(true) => {}
            None => self.push(FieldError::required(path)),
            Some(false) => self.push(FieldError::new(path, FieldErrorKind::MustBeTrue)),
        }
    }

    /// Required decimal within the inclusive bounds.
    pub fn require_amount(
        &mut self,
        path: FieldPath,
        value: Option<Decimal>,
        min: Option<Decimal>,
        max: Option<Decimal>,
    ) {
        match value {
            None => self.push(FieldError::required(path)),
            Some(value) => self.check_range(path, value, min, max),
        }
    }

    /// Optional decimal; only checked when present.
    pub fn check_range(
        &mut self,
        path: FieldPath,
        value: Decimal,
        min: Option<Decimal>,
        max: Option<Decimal>,
    ) {
        let below = min.is_some_and(|min| value < min);
        let above = max.is_some_and(|max| value > max);
        if below || above {
            self.push(FieldError::new(path, FieldErrorKind::OutOfRange { min, max }));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

/// A text value counts as set when it has non-whitespace content.
pub fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
