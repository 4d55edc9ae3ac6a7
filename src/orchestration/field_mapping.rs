//! Field-mapping rules that derive a continuation's parameters from its
//! parent execution's result.
//!
//! A mapping string is `;`-separated `sourceField=targetParam` segments.
//! A source side beginning with `+` denotes a literal constant used as-is
//! instead of a field reference: `"OrderId=RefId;+retail=Channel"` maps the
//! parent's `OrderId` field to the `RefId` parameter and assigns the
//! constant `"retail"` to the `Channel` parameter.

use crate::error::{RelayError, Result};
use crate::execution::{ParameterMap, ResultRow};
use serde::{Deserialize, Serialize};

/// Where one mapped parameter's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingSource {
    /// Named field of the parent result row.
    Field(String),
    /// Literal constant.
    Literal(String),
}

/// One `source=target` mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub source: MappingSource,
    pub target_param: String,
}

/// A parsed continuation mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub entries: Vec<MappingEntry>,
}

impl FieldMapping {
    /// Parse a mapping string. Empty strings parse to an empty mapping;
    /// malformed segments (missing `=`, empty source or target) are
    /// validation errors.
    pub fn parse(mapping: &str) -> Result<FieldMapping> {
        let mut entries = Vec::new();
        for segment in mapping.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (source, target) = segment.split_once('=').ok_or_else(|| {
                RelayError::Validation(format!("mapping segment '{segment}' is missing '='"))
            })?;
            let source = source.trim();
            let target = target.trim();
            if source.is_empty() || target.is_empty() {
                return Err(RelayError::Validation(format!(
                    "mapping segment '{segment}' has an empty side"
                )));
            }
            let source = match source.strip_prefix('+') {
                Some(literal) => MappingSource::Literal(literal.to_string()),
                None => MappingSource::Field(source.to_string()),
            };
            entries.push(MappingEntry {
                source,
                target_param: target.to_string(),
            });
        }
        Ok(FieldMapping { entries })
    }

    /// Derive the next call's parameters from one parent result row.
    ///
    /// A field reference whose name is absent from the row is omitted
    /// rather than failing the hop; literals always apply. Field lookup is
    /// case-insensitive, matching dispatch-time parameter validation.
    pub fn derive(&self, row: Option<&ResultRow>) -> ParameterMap {
        let mut params = ParameterMap::new();
        for entry in &self.entries {
            match &entry.source {
                MappingSource::Literal(literal) => {
                    params.insert(
                        entry.target_param.clone(),
                        serde_json::Value::String(literal.clone()),
                    );
                }
                MappingSource::Field(field) => {
                    let value = row.and_then(|r| {
                        r.get(field).or_else(|| {
                            r.iter()
                                .find(|(k, _)| k.eq_ignore_ascii_case(field))
                                .map(|(_, v)| v)
                        })
                    });
                    if let Some(value) = value {
                        params.insert(entry.target_param.clone(), value.clone());
                    }
                }
            }
        }
        params
    }

    /// Target parameter names sourced from parent-result fields (the
    /// entries the create/update-time invariant checks against the target
    /// configuration's declared parameters).
    pub fn field_sourced_targets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry.source {
            MappingSource::Field(_) => Some(entry.target_param.as_str()),
            MappingSource::Literal(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, serde_json::Value)]) -> ResultRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn parses_fields_and_literals() {
        let mapping = FieldMapping::parse("Foo=Bar;+X=Baz").unwrap();
        assert_eq!(mapping.entries.len(), 2);
        assert_eq!(
            mapping.entries[0].source,
            MappingSource::Field("Foo".into())
        );
        assert_eq!(
            mapping.entries[1].source,
            MappingSource::Literal("X".into())
        );
        assert_eq!(mapping.entries[1].target_param, "Baz");
    }

    #[test]
    fn derive_round_trip() {
        let mapping = FieldMapping::parse("Foo=Bar;+X=Baz").unwrap();
        let params = mapping.derive(Some(&row(&[("Foo", serde_json::json!("v1"))])));
        assert_eq!(params.get("Bar"), Some(&serde_json::json!("v1")));
        assert_eq!(params.get("Baz"), Some(&serde_json::json!("X")));
    }

    #[test]
    fn absent_field_is_omitted() {
        let mapping = FieldMapping::parse("Missing=Out;+k=Constant").unwrap();
        let params = mapping.derive(Some(&row(&[("Other", serde_json::json!(1))])));
        assert!(!params.contains_key("Out"));
        assert_eq!(params.get("Constant"), Some(&serde_json::json!("k")));
    }

    #[test]
    fn field_lookup_is_case_insensitive() {
        let mapping = FieldMapping::parse("orderid=RefId").unwrap();
        let params = mapping.derive(Some(&row(&[("OrderId", serde_json::json!(7))])));
        assert_eq!(params.get("RefId"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn malformed_segments_rejected() {
        assert!(FieldMapping::parse("NoEquals").is_err());
        assert!(FieldMapping::parse("=Target").is_err());
        assert!(FieldMapping::parse("Source=").is_err());
    }

    #[test]
    fn empty_mapping_parses_empty() {
        assert!(FieldMapping::parse("").unwrap().entries.is_empty());
        assert!(FieldMapping::parse(" ; ").unwrap().entries.is_empty());
    }

    #[test]
    fn no_row_applies_only_literals() {
        let mapping = FieldMapping::parse("Foo=Bar;+c=Fixed").unwrap();
        let params = mapping.derive(None);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Fixed"), Some(&serde_json::json!("c")));
    }
}
