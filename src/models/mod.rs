//! # Domain Models
//!
//! Records owned by the external configuration store (service definitions,
//! execution configurations, continuation mappings, schedules) and the
//! append-only execution audit row. The orchestration core reads the
//! configuration records through [`crate::store::ConfigurationStore`] and
//! writes audit rows through [`crate::store::AuditStore`]; it never mutates
//! configuration.

pub mod continuation_mapping;
pub mod execution_config;
pub mod execution_record;
pub mod schedule;
pub mod service_definition;

pub use continuation_mapping::ContinuationMapping;
pub use execution_config::{ExecutionConfig, SqlProvider, TargetKind};
pub use execution_record::{ExecutionRecord, NewExecutionRecord};
pub use schedule::Schedule;
pub use service_definition::ServiceDefinition;
