use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Links a source execution configuration to a follow-up target and holds
/// the field-mapping rules that derive the target's parameters.
///
/// The mapping string is `;`-separated `sourceField=targetParam` pairs; a
/// source side beginning with `+` is a literal constant rather than a field
/// reference. Validation against the target's declared parameters happens
/// at create/update time via [`crate::validation::validate_mapping`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationMapping {
    pub id: i64,
    pub source_config_id: i64,
    pub target_config_id: i64,
    pub mapping: String,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContinuationMapping {
    pub fn new(id: i64, source_config_id: i64, target_config_id: i64, mapping: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            source_config_id,
            target_config_id,
            mapping: mapping.into(),
            deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
