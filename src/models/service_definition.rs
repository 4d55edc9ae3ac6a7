use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, user-facing unit of work backed by one execution configuration.
///
/// Names are unique among non-deleted definitions; the store enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Inactive services stay registered but are not dispatchable.
    pub active: bool,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceDefinition {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            description: None,
            active: true,
            deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.active && !self.deleted
    }
}
