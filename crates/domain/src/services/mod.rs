//! Domain services for Tender Hub.
//!
//! Services contain business logic that operates on domain models.

pub mod matching;
pub mod pricing;
pub mod rendering;
pub mod store;
pub mod task_locks;
pub mod task_service;

pub use matching::{MatchingEngine, MatchingError};
pub use pricing::{price, PricingResult};
pub use rendering::{ProposalDocument, ProposalRenderer, RenderError};
pub use store::{AuditLog, StoreError, TaskStore};
pub use task_locks::TaskLocks;
pub use task_service::{TaskService, TaskServiceError};
