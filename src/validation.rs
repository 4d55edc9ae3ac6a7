//! Input validation for the relay core.
//!
//! Dispatch-time parameter checks, SQL identifier safety for the execution
//! strategies, and the create/update-time invariants the configuration
//! store's CRUD layer applies to mappings and schedules.

use crate::error::{RelayError, Result};
use crate::execution::ParameterMap;
use crate::models::ExecutionConfig;
use crate::orchestration::field_mapping::FieldMapping;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::str::FromStr;

/// Validate that the supplied parameter map contains exactly the declared
/// names, case-insensitively. Both missing and unexpected names are
/// reported in one error. Configurations declaring no parameters accept
/// any supplied map unchecked.
pub fn validate_parameters(
    declared: &IndexMap<String, String>,
    supplied: &ParameterMap,
) -> Result<()> {
    if declared.is_empty() {
        return Ok(());
    }

    let declared_names: HashSet<String> = declared.keys().map(|k| k.to_lowercase()).collect();
    let supplied_names: HashSet<String> = supplied.keys().map(|k| k.to_lowercase()).collect();

    let mut missing: Vec<&str> = declared
        .keys()
        .filter(|k| !supplied_names.contains(&k.to_lowercase()))
        .map(String::as_str)
        .collect();
    let mut unexpected: Vec<&str> = supplied
        .keys()
        .filter(|k| !declared_names.contains(&k.to_lowercase()))
        .map(String::as_str)
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    missing.sort_unstable();
    unexpected.sort_unstable();

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing parameter(s): {}", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        problems.push(format!("unexpected parameter(s): {}", unexpected.join(", ")));
    }
    Err(RelayError::Validation(problems.join("; ")))
}

/// Validate a procedure or view name before it is interpolated into SQL
/// text. Dotted schema qualification is allowed; anything else is rejected.
pub fn validate_sql_identifier(identifier: &str) -> Result<()> {
    let valid = !identifier.is_empty()
        && identifier.split('.').all(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                }
                _ => false,
            }
        });

    if valid {
        Ok(())
    } else {
        Err(RelayError::Validation(format!(
            "'{identifier}' is not a valid SQL identifier"
        )))
    }
}

/// Validate a cron expression: exactly 5 space-separated fields that parse
/// as a standard minute/hour/day-of-month/month/day-of-week schedule.
pub fn validate_cron(expression: &str) -> Result<()> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(RelayError::Validation(format!(
            "cron expression '{expression}' must have exactly 5 fields, found {}",
            fields.len()
        )));
    }

    // The cron crate expects a seconds field, so parse the 5-field form
    // with a fixed seconds prefix.
    let with_seconds = format!("0 {}", fields.join(" "));
    cron::Schedule::from_str(&with_seconds).map_err(|e| {
        RelayError::Validation(format!("cron expression '{expression}' does not parse: {e}"))
    })?;
    Ok(())
}

/// Create/update-time invariant for continuation mappings: the mapping
/// string parses, and every field-sourced target parameter appears in the
/// target configuration's declared parameter names.
pub fn validate_mapping(mapping: &str, target_config: &ExecutionConfig) -> Result<()> {
    let parsed = FieldMapping::parse(mapping)?;

    let declared: HashSet<String> = target_config
        .parameters
        .keys()
        .map(|k| k.to_lowercase())
        .collect();

    let mut unknown: Vec<&str> = parsed
        .field_sourced_targets()
        .filter(|target| !declared.contains(&target.to_lowercase()))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    Err(RelayError::Validation(format!(
        "mapping targets not declared by config {}: {}",
        target_config.id,
        unknown.join(", ")
    )))
}
