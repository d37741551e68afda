//! Persistence layer for Tender Hub.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain storage traits

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
