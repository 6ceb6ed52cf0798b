//! Declarative field validation
//!
//! Entities declare an ordered rule set per field (`required`, `max:N`,
//! `datetime`); `validate` applies the rules to a snapshot of raw field
//! values and accumulates every violation into a field→messages map. Pure
//! over the snapshot, no I/O.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// Message used when a slug collides with an already-stored one. Uniqueness
/// is checked against storage by the record services, not by a rule here,
/// but the failure surfaces through the same field→messages map.
pub const SLUG_TAKEN_MESSAGE: &str = "The slug value is not unique.";

/// A single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The field must be present and non-blank.
    Required,
    /// The field may not exceed the given number of characters.
    Max(usize),
    /// The field, when present, must parse as a date-time string.
    Datetime,
}

/// Snapshot of raw field values an entity presents for validation.
pub type FieldSnapshot = BTreeMap<&'static str, Option<String>>;

/// Accumulated field-level validation errors, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error map holding a single message for one field.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Append a message to a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    /// Whether any error has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (field, messages) pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

/// Validate a field snapshot against a declarative rule set.
///
/// All rules run; violations accumulate per field rather than stopping at
/// the first failure. Returns the collected errors on failure.
pub fn validate(
    rules: &[(&'static str, &'static [Rule])],
    data: &FieldSnapshot,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for (field, field_rules) in rules {
        let value = data.get(field).and_then(|v| v.as_deref());
        for rule in *field_rules {
            apply_rule(*rule, field, value, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn apply_rule(rule: Rule, field: &str, value: Option<&str>, errors: &mut FieldErrors) {
    match rule {
        Rule::Required => {
            if value.map_or(true, |v| v.trim().is_empty()) {
                errors.add(field, format!("The {} field is required.", field));
            }
        }
        Rule::Max(limit) => {
            if let Some(v) = value {
                if v.chars().count() > limit {
                    errors.add(
                        field,
                        format!("The {} may not be greater than {} characters.", field, limit),
                    );
                }
            }
        }
        Rule::Datetime => {
            if let Some(v) = value {
                if parse_datetime(v).is_none() {
                    errors.add(field, format!("The {} is not a valid date-time.", field));
                }
            }
        }
    }
}

/// Parse a caller-supplied date-time string.
///
/// Accepts RFC 3339 (`2024-03-01T09:00:00Z`) and the plain
/// `YYYY-MM-DD HH:MM:SS` form, interpreted as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
