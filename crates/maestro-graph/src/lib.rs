//! Maestro Graph — label-generic node access over Neo4j.
//!
//! This crate is the single access point for the music knowledge graph.
//! [`NodeAccessor`] runs create/get/update/delete/list/count against any
//! validated label through a [`QueryExecutor`]; [`GraphClient`] is the
//! pooled Neo4j implementation of that executor.

pub mod client;
pub mod cypher;
pub mod executor;
pub mod nodes;
pub mod schema;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use executor::{CypherQuery, QueryExecutor, Record, Value};
pub use nodes::{NodeAccessor, DEFAULT_LIST_LIMIT};
pub use schema::{initialize_schema, SchemaReport};
