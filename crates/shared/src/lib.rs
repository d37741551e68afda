//! Shared utilities and common types for the Tender Hub backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Content digests for uploaded documents
//! - Opaque cursor encoding for audit log pagination
//! - Common validation logic (filenames, margins)

pub mod crypto;
pub mod pagination;
pub mod validation;
