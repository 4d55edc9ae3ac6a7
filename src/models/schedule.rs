use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cron expression plus a validity window controlling when a scheduled
/// configuration may fire. Outside `[starts_at, ends_at]` the schedule is
/// inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub config_id: i64,
    /// Standard 5-field cron expression (minute hour day-of-month month
    /// day-of-week).
    pub cron_expression: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    pub fn new(
        id: i64,
        config_id: i64,
        cron_expression: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            config_id,
            cron_expression: cron_expression.into(),
            starts_at,
            ends_at,
            deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the validity window admits `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        if now < self.starts_at {
            return false;
        }
        match self.ends_at {
            Some(end) => now <= end,
            None => true,
        }
    }
}
