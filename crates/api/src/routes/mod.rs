//! HTTP route handlers.

pub mod export;
pub mod health;
pub mod tasks;
pub mod tenders;
