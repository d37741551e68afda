//! Database entity definitions.

pub mod audit_log;
pub mod task;

pub use audit_log::AuditLogEntity;
pub use task::{TaskColumns, TaskEntity};
