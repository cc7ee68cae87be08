//! maestro-core: Shared types and entity policies for the Maestro music graph.
//!
//! This crate provides the foundational types used across all Maestro components:
//! - Validated labels and field names that are safe to splice into Cypher
//! - Property values and the `Node` record returned by graph reads
//! - The per-label entity policy table (which fields the graph stamps itself)
//! - Common error types

pub mod error;
pub mod policy;
pub mod types;

pub use error::ModelError;
pub use policy::{policy_for, EntityPolicy};
pub use types::{Label, Node, NodeId, Properties, PropertyValue};
