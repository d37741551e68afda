//! Domain models for Tender Hub.

pub mod audit_log;
pub mod task;

pub use audit_log::{
    AuditAction, AuditEntry, ListAuditEntriesQuery, ListAuditEntriesResponse, NewAuditEntry,
    DEFAULT_AUDIT_PAGE_SIZE, MAX_AUDIT_PAGE_SIZE,
};
pub use task::{
    GenerateProposalRequest, Match, PricedItem, Proposal, ProposalResponse, Task, TaskResponse,
    TaskStatus, ValidateMatchRequest, ValidateMatchResponse, DEFAULT_VALIDATION_NOTE,
    DOWNLOAD_PATH_PREFIX,
};
