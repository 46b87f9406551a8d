//! Conditional-required rules.
//!
//! A rule makes its dependent field required while `applies` holds for the
//! draft. When a change makes a rule stop applying, the dependent value is
//! reset. Rules are evaluated against the whole draft, so a derived
//! controlling value (a remaining amount, a variance) works the same way as
//! a field the applicant edits.

use super::{FieldError, FieldPath};

pub struct ConditionalRule<D> {
    pub name: &'static str,
    pub controller: FieldPath,
    pub dependent: FieldPath,
    pub applies: fn(&D) -> bool,
    pub is_set: fn(&D) -> bool,
    pub reset: fn(&mut D),
}

impl<D> ConditionalRule<D> {
    pub fn applies(&self, draft: &D) -> bool {
        (self.applies)(draft)
    }

    pub fn is_satisfied(&self, draft: &D) -> bool {
        !self.applies(draft) || (self.is_set)(draft)
    }
}

/// `Required` errors for every applying rule whose dependent is unset.
pub fn conditional_errors<D>(draft: &D, rules: &[ConditionalRule<D>]) -> Vec<FieldError> {
    rules
        .iter()
        .filter(|rule| !rule.is_satisfied(draft))
        .map(|rule| FieldError::required(rule.dependent.clone()))
        .collect()
}

/// Reset the dependents of rules that applied in `before` but no longer do.
///
/// A reset can switch off another rule (clearing a delay reason also
/// switches off the "other delay reason" rule; clearing a funding list
/// changes a derived remaining amount), so `recompute` runs after every pass
/// that reset something and the pass repeats until no further rule flips.
/// Each rule resets at most once. Returns the names of the rules that were
/// reset, in reset order.
pub fn apply_conditional_resets<D>(
    draft: &mut D,
    rules: &[ConditionalRule<D>],
    before: &[bool],
    recompute: impl Fn(&mut D),
) -> Vec<&'static str> {
    debug_assert_eq!(rules.len(), before.len());
    let mut done = vec![false; rules.len()];
    let mut reset = Vec::new();
    loop {
        let mut changed = false;
        for (i, rule) in rules.iter().enumerate() {
            if before[i] && !done[i] && !rule.applies(draft) {
                (rule.reset)(draft);
                done[i] = true;
                changed = true;
                reset.push(rule.name);
            }
        }
        if !changed {
            break;
        }
        recompute(draft);
    }
    reset
}

/// Snapshot of which rules currently apply, taken before a change.
pub fn applying<D>(draft: &D, rules: &[ConditionalRule<D>]) -> Vec<bool> {
    rules.iter().map(|rule| rule.applies(draft)).collect()
}
