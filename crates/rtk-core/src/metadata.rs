//! Metadata template validation.
//!
//! Two entry points: [`validate_fields`] enforces internal consistency of a
//! field-definition list (applied on template create and whenever a template
//! update replaces its fields), and [`validate_metadata`] enforces that a
//! metadata value mapping conforms to a resolved template.
//!
//! Per-type value checks are dispatched through [`FieldConstraint`], a closed
//! sum over the field kinds, each variant carrying only the constraint
//! payload it needs. Violations fail fast; every message names the offending
//! field key.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::entities::MetadataFieldDef;
use crate::enums::MetadataFieldType;

/// Schema or metadata constraint violations. All 400-class.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duplicate field key: {key}")]
    DuplicateFieldKey { key: String },

    #[error("Options required for field: {key}")]
    MissingOptions { key: String },

    #[error("Duplicate options for field: {key}")]
    DuplicateOptions { key: String },

    #[error("Invalid min/max for field: {key}")]
    InvalidRange { key: String },

    #[error("Invalid regex for field: {key}")]
    InvalidPattern { key: String },

    /// Metadata contains keys absent from the template; all offending keys
    /// are reported in one error.
    #[error("Unknown metadata fields: {}", keys.join(", "))]
    UnknownFields { keys: Vec<String> },

    #[error("Missing required field: {key}")]
    MissingRequiredField { key: String },

    #[error("Invalid value for field {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Metadata requires a metadata template")]
    MetadataWithoutTemplate,

    #[error("Metadata template not found: {id}")]
    TemplateNotFound { id: String },
}

/// Validate internal consistency of a field-definition list.
///
/// # Errors
///
/// Returns the first violation found: duplicate keys, missing or duplicate
/// options on select/multiselect fields, inverted min/max bounds, or a
/// pattern that does not compile.
pub fn validate_fields(fields: &[MetadataFieldDef]) -> Result<(), ValidationError> {
    let mut keys: HashSet<&str> = HashSet::new();
    for field in fields {
        if !keys.insert(field.key.as_str()) {
            return Err(ValidationError::DuplicateFieldKey {
                key: field.key.clone(),
            });
        }

        if field.field_type.requires_options() {
            let options = field.options.as_deref().unwrap_or_default();
            if options.is_empty() {
                return Err(ValidationError::MissingOptions {
                    key: field.key.clone(),
                });
            }
            let unique: HashSet<&str> = options.iter().map(String::as_str).collect();
            if unique.len() != options.len() {
                return Err(ValidationError::DuplicateOptions {
                    key: field.key.clone(),
                });
            }
        }

        if let (Some(min), Some(max)) = (field.min, field.max) {
            if min > max {
                return Err(ValidationError::InvalidRange {
                    key: field.key.clone(),
                });
            }
        }

        if let Some(pattern) = field.regex.as_deref() {
            if !pattern.is_empty() && Regex::new(pattern).is_err() {
                return Err(ValidationError::InvalidPattern {
                    key: field.key.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validate a metadata value mapping against a resolved template's fields.
///
/// Unknown keys are rejected first (all listed in one error). Required fields
/// must be present and non-empty: null, the empty string, and the empty list
/// all count as absent. Null values of optional fields are skipped; every
/// other provided value is checked by its field's [`FieldConstraint`].
///
/// # Errors
///
/// Returns the first violation encountered; nothing is partially applied.
pub fn validate_metadata(
    metadata: &Map<String, Value>,
    fields: &[MetadataFieldDef],
) -> Result<(), ValidationError> {
    let known: HashSet<&str> = fields.iter().map(|f| f.key.as_str()).collect();
    let unknown: Vec<String> = metadata
        .keys()
        .filter(|key| !known.contains(key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ValidationError::UnknownFields { keys: unknown });
    }

    for field in fields {
        let value = metadata.get(&field.key);
        if field.required && is_absent(value) {
            return Err(ValidationError::MissingRequiredField {
                key: field.key.clone(),
            });
        }
        match value {
            None | Some(Value::Null) => {}
            Some(value) => FieldConstraint::for_field(field).check(&field.key, value)?,
        }
    }
    Ok(())
}

/// Null, the empty string, and the empty list count as absent.
fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Per-type constraint payload, derived from a [`MetadataFieldDef`].
///
/// Text and textarea share the `Text` variant: both are length-bounded,
/// optionally pattern-constrained strings.
enum FieldConstraint<'a> {
    Text {
        min: Option<f64>,
        max: Option<f64>,
        pattern: Option<&'a str>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Date,
    Select {
        options: &'a [String],
    },
    MultiSelect {
        options: &'a [String],
    },
    Boolean,
}

impl<'a> FieldConstraint<'a> {
    fn for_field(field: &'a MetadataFieldDef) -> Self {
        let options = field.options.as_deref().unwrap_or_default();
        match field.field_type {
            MetadataFieldType::Text | MetadataFieldType::Textarea => Self::Text {
                min: field.min,
                max: field.max,
                pattern: field.regex.as_deref().filter(|p| !p.is_empty()),
            },
            MetadataFieldType::Number => Self::Number {
                min: field.min,
                max: field.max,
            },
            MetadataFieldType::Date => Self::Date,
            MetadataFieldType::Select => Self::Select { options },
            MetadataFieldType::Multiselect => Self::MultiSelect { options },
            MetadataFieldType::Boolean => Self::Boolean,
        }
    }

    fn check(&self, key: &str, value: &Value) -> Result<(), ValidationError> {
        match self {
            Self::Text { min, max, pattern } => check_text(key, value, *min, *max, *pattern),
            Self::Number { min, max } => check_number(key, value, *min, *max),
            Self::Date => check_date(key, value),
            Self::Select { options } => check_select(key, value, options),
            Self::MultiSelect { options } => check_multiselect(key, value, options),
            Self::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(invalid(key, "expected a boolean"))
                }
            }
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn check_text(
    key: &str,
    value: &Value,
    min: Option<f64>,
    max: Option<f64>,
    pattern: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(text) = value.as_str() else {
        return Err(invalid(key, "expected a string"));
    };

    // Length in characters, not bytes, to match how users count.
    #[allow(clippy::cast_precision_loss)]
    let length = text.chars().count() as f64;
    if let Some(min) = min {
        if length < min {
            return Err(invalid(key, format!("is shorter than minimum length {min}")));
        }
    }
    if let Some(max) = max {
        if length > max {
            return Err(invalid(key, format!("exceeds maximum length {max}")));
        }
    }

    if let Some(pattern) = pattern {
        // Anchor the pattern: the entire value must match, not merely contain
        // a match.
        let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|_| {
            ValidationError::InvalidPattern {
                key: key.to_string(),
            }
        })?;
        if !anchored.is_match(text) {
            return Err(invalid(key, format!("does not match pattern {pattern}")));
        }
    }
    Ok(())
}

fn check_number(
    key: &str,
    value: &Value,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), ValidationError> {
    // `Value::Bool` is a distinct variant, so booleans never pass as numbers.
    let Some(number) = value.as_f64() else {
        return Err(invalid(key, "expected a number"));
    };
    if let Some(min) = min {
        if number < min {
            return Err(invalid(key, format!("is below minimum {min}")));
        }
    }
    if let Some(max) = max {
        if number > max {
            return Err(invalid(key, format!("exceeds maximum {max}")));
        }
    }
    Ok(())
}

fn check_date(key: &str, value: &Value) -> Result<(), ValidationError> {
    let Some(text) = value.as_str() else {
        return Err(invalid(key, "expected an ISO-8601 date string"));
    };
    if parses_as_iso_date(text) {
        Ok(())
    } else {
        Err(invalid(key, "is not a valid ISO-8601 date"))
    }
}

/// Accept a calendar date, an RFC 3339 datetime, or a naive datetime.
fn parses_as_iso_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

fn check_select(key: &str, value: &Value, options: &[String]) -> Result<(), ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::MissingOptions {
            key: key.to_string(),
        });
    }
    let Some(choice) = value.as_str() else {
        return Err(invalid(key, "expected a string"));
    };
    if options.iter().any(|option| option == choice) {
        Ok(())
    } else {
        Err(invalid(key, format!("'{choice}' is not an allowed option")))
    }
}

fn check_multiselect(key: &str, value: &Value, options: &[String]) -> Result<(), ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::MissingOptions {
            key: key.to_string(),
        });
    }
    let Some(items) = value.as_array() else {
        return Err(invalid(key, "expected a list of strings"));
    };

    // Report every invalid element, not just the first.
    let mut rejected: Vec<String> = Vec::new();
    for item in items {
        match item.as_str() {
            Some(choice) if options.iter().any(|option| option == choice) => {}
            Some(choice) => rejected.push(choice.to_string()),
            None => rejected.push(item.to_string()),
        }
    }
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(invalid(
            key,
            format!("invalid options: {}", rejected.join(", ")),
        ))
    }
}
