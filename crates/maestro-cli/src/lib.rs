//! maestro-cli — thin command-line layer over the Maestro node accessor.
//!
//! Pipeline: load config → connect to Neo4j → provision schema → run one
//! node operation → print the result as JSON.

pub mod config;
pub mod fields;
