//! Neo4j schema initialization (constraints and indexes).

use crate::executor::{CypherQuery, QueryExecutor};

/// Cypher statements for schema initialization, run in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // Uniqueness constraints
    "CREATE CONSTRAINT album_id_unique IF NOT EXISTS FOR (a:Album) REQUIRE a.id IS UNIQUE",
    "CREATE CONSTRAINT artist_id_unique IF NOT EXISTS FOR (a:Artist) REQUIRE a.id IS UNIQUE",
    "CREATE CONSTRAINT genre_id_unique IF NOT EXISTS FOR (g:Genre) REQUIRE g.id IS UNIQUE",
    // Lookup indexes
    "CREATE INDEX album_title_index IF NOT EXISTS FOR (a:Album) ON (a.title)",
    "CREATE INDEX artist_name_index IF NOT EXISTS FOR (a:Artist) ON (a.name)",
    "CREATE INDEX genre_name_index IF NOT EXISTS FOR (g:Genre) ON (g.name)",
    // Listing order
    "CREATE INDEX album_created_at_index IF NOT EXISTS FOR (a:Album) ON (a.created_at)",
];

/// Outcome of one provisioning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Initialize the schema with constraints and indexes.
///
/// Safe to run on every start: statements use IF NOT EXISTS. A failing
/// statement is logged and skipped so the rest still get applied; this
/// function never returns an error.
pub async fn initialize_schema(executor: &dyn QueryExecutor) -> SchemaReport {
    tracing::info!("Initializing Neo4j schema...");

    let mut report = SchemaReport::default();
    for statement in SCHEMA_STATEMENTS {
        match executor.execute(&CypherQuery::new(*statement)).await {
            Ok(_) => report.applied += 1,
            Err(e) => {
                tracing::warn!(statement, error = %e, "Schema statement failed, continuing");
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        applied = report.applied,
        skipped = report.skipped,
        "Neo4j schema initialized"
    );
    report
}
