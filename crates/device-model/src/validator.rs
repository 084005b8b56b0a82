//! Validator (C4, §4.4). Pure function of `(dataType, value, metadata)` —
//! no I/O, no station access. One arm per protocol data type, expressed as
//! a match over the tagged `DataType` enum rather than per-type dispatch
//! objects (§9 design note).

use std::collections::HashSet;

use chrono::DateTime;
use device_model_types::{DataType, ReasonCode, ValidationOutcome, VariableMetadata};
use regex::Regex;

/// Validates `raw` against `metadata`'s `dataType` and static bounds.
pub fn validate(metadata: &VariableMetadata, raw: &str) -> ValidationOutcome {
    match metadata.data_type {
        DataType::Integer => validate_integer(metadata, raw),
        DataType::Decimal => validate_decimal(raw),
        DataType::Boolean => validate_boolean(metadata, raw),
        DataType::DateTime => validate_date_time(raw),
        DataType::OptionList => validate_option_list(metadata, raw),
        DataType::SequenceList => validate_sequence_list(metadata, raw),
        DataType::MemberList => validate_member_list(metadata, raw),
        DataType::Str => validate_string(metadata, raw),
    }
}

fn validate_integer(metadata: &VariableMetadata, raw: &str) -> ValidationOutcome {
    if raw.contains('.') && raw.replace('-', "").chars().all(|c| c.is_ascii_digit() || c == '.') {
        return ValidationOutcome::reject(ReasonCode::InvalidValue, format!("{} must not be decimal", metadata.variable));
    }
    let Ok(n) = raw.parse::<i64>() else {
        return ValidationOutcome::reject(ReasonCode::InvalidValue, format!("{} must be an integer", metadata.variable));
    };
    if let Some(min) = metadata.min {
        if (n as f64) < min {
            return ValidationOutcome::reject(ReasonCode::ValueTooLow, format!("{} below minimum {}", metadata.variable, min));
        }
    }
    if let Some(max) = metadata.max {
        if (n as f64) > max {
            return ValidationOutcome::reject(ReasonCode::ValueTooHigh, format!("{} above maximum {}", metadata.variable, max));
        }
    }
    ValidationOutcome::ok()
}

fn validate_decimal(raw: &str) -> ValidationOutcome {
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => ValidationOutcome::ok(),
        _ => ValidationOutcome::reject(ReasonCode::InvalidValue, "must be a finite decimal number"),
    }
}

fn validate_boolean(metadata: &VariableMetadata, raw: &str) -> ValidationOutcome {
    match raw {
        "true" | "false" => ValidationOutcome::ok(),
        _ => ValidationOutcome::reject(ReasonCode::InvalidValue, format!("{} must be \"true\" or \"false\"", metadata.variable)),
    }
}

fn validate_date_time(raw: &str) -> ValidationOutcome {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(_) => ValidationOutcome::ok(),
        Err(_) => ValidationOutcome::reject(ReasonCode::InvalidValue, "must be an ISO-8601 instant"),
    }
}

fn validate_option_list(metadata: &VariableMetadata, raw: &str) -> ValidationOutcome {
    let enum_values = metadata.enum_values.unwrap_or(&[]);
    if enum_values.iter().any(|v| *v == raw) {
        ValidationOutcome::ok()
    } else {
        ValidationOutcome::reject(ReasonCode::InvalidValue, format!("{} is not a supported value", raw))
    }
}

fn validate_sequence_list(metadata: &VariableMetadata, raw: &str) -> ValidationOutcome {
    let enum_values = metadata.enum_values.unwrap_or(&[]);
    let tokens: Vec<&str> = raw.split(',').collect();
    let mut seen = HashSet::new();
    for token in &tokens {
        if !enum_values.contains(token) {
            return ValidationOutcome::reject(ReasonCode::InvalidValue, format!("{} is not a supported value", token));
        }
        if !seen.insert(*token) {
            return ValidationOutcome::reject(ReasonCode::InvalidValue, format!("duplicate entry {}", token));
        }
    }
    ValidationOutcome::ok()
}

fn validate_member_list(metadata: &VariableMetadata, raw: &str) -> ValidationOutcome {
    // Same membership/duplicate rules as SequenceList; order is not checked.
    validate_sequence_list(metadata, raw)
}

fn validate_string(metadata: &VariableMetadata, raw: &str) -> ValidationOutcome {
    match metadata.pattern {
        Some(pattern) => match Regex::new(pattern) {
            Ok(re) if re.is_match(raw) => ValidationOutcome::ok(),
            Ok(_) => ValidationOutcome::reject(ReasonCode::InvalidValue, format!("does not match pattern {}", pattern)),
            Err(_) => ValidationOutcome::reject(ReasonCode::InternalError, "invalid pattern in registry"),
        },
        None => ValidationOutcome::ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_model_types::{AttributeKind, ComponentName, Mutability, Persistence};

    fn meta(data_type: DataType) -> VariableMetadata {
        VariableMetadata {
            component: ComponentName::AuthCtrlr,
            variable: "AuthorizeRemoteStart",
            instance: None,
            data_type,
            mutability: Mutability::ReadWrite,
            persistence: Persistence::Persistent,
            supported_attributes: &[AttributeKind::Actual],
            supports_monitoring: false,
            default_value: None,
            min: None,
            max: None,
            enum_values: None,
            pattern: None,
            resolve: None,
            post_process: None,
            reboot_required: false,
            supports_target: false,
            flatten_instance: false,
        }
    }

    #[test]
    fn boolean_rejects_non_literal() {
        let outcome = validate(&meta(DataType::Boolean), "maybe");
        assert!(!outcome.ok);
        assert_eq!(outcome.reason_code, Some(ReasonCode::InvalidValue));
        assert_eq!(outcome.info.as_deref(), Some("AuthorizeRemoteStart must be \"true\" or \"false\""));
    }

    #[test]
    fn integer_rejects_decimal_form_distinctly() {
        let outcome = validate(&meta(DataType::Integer), "3.5");
        assert!(!outcome.ok);
        assert!(outcome.info.unwrap().contains("must not be decimal"));
    }

    #[test]
    fn integer_enforces_bounds() {
        let m = VariableMetadata { min: Some(0.0), max: Some(10.0), ..meta(DataType::Integer) };
        assert!(!validate(&m, "-1").ok);
        assert!(!validate(&m, "11").ok);
        assert!(validate(&m, "5").ok);
    }

    #[test]
    fn sequence_list_rejects_duplicates_and_unknown_tokens() {
        let m = VariableMetadata { enum_values: Some(&["A", "B", "C"]), ..meta(DataType::SequenceList) };
        assert!(validate(&m, "A,B,C").ok);
        assert!(!validate(&m, "A,A").ok);
        assert!(!validate(&m, "A,Z").ok);
    }

    #[test]
    fn member_list_ignores_order() {
        let m = VariableMetadata { enum_values: Some(&["A", "B"]), ..meta(DataType::MemberList) };
        assert!(validate(&m, "A,B").ok);
        assert!(validate(&m, "B,A").ok);
    }

    #[test]
    fn date_time_requires_iso8601_instant() {
        assert!(validate(&meta(DataType::DateTime), "2026-07-26T10:00:00Z").ok);
        assert!(!validate(&meta(DataType::DateTime), "not-a-date").ok);
    }

    #[test]
    fn string_pattern_is_enforced_when_present() {
        let m = VariableMetadata { pattern: Some(r"^\d+(,\d+)*$"), ..meta(DataType::Str) };
        assert!(validate(&m, "1,2,3").ok);
        assert!(!validate(&m, "a,b").ok);
    }
}
