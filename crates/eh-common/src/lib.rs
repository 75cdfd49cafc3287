//! Eventhandler common types, IDs, and errors.
//!
//! This crate provides foundational types shared across eh-core modules:
//! - Event correlation identifiers
//! - Schema versioning for JSON outcome reports
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::EventId;
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
