//! Domain layer for Tender Hub.
//!
//! This crate contains:
//! - Domain models (Task, Match, Proposal, AuditEntry)
//! - The task lifecycle service and its pricing rules
//! - Storage, matching and rendering boundaries as traits

pub mod models;
pub mod services;
