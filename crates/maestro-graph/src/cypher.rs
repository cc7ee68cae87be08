//! Cypher builders for single-label node operations.
//!
//! Labels and property keys cannot be bound as parameters, so they are
//! spliced into the statement text. `Label` is validated on construction and
//! update keys are checked here; everything else travels as a parameter.

use maestro_core::policy::{EntityPolicy, CREATED_AT_FIELD, ID_FIELD};
use maestro_core::types::validate_field_name;
use maestro_core::{Label, ModelError, Properties};

use crate::executor::CypherQuery;

/// Column holding the matched node.
pub const NODE_COLUMN: &str = "n";
/// Column holding the number of deleted nodes.
pub const DELETED_COLUMN: &str = "deleted_count";
/// Column holding a node count.
pub const TOTAL_COLUMN: &str = "total";

pub fn create_node(label: &Label, props: Properties) -> CypherQuery {
    let cypher = format!(
        "CREATE (n:{label} $props)
         RETURN n"
    );
    CypherQuery::new(cypher)
        .param("props", props)
        .returns(NODE_COLUMN)
}

pub fn get_node(label: &Label, id: &str) -> CypherQuery {
    let cypher = format!(
        "MATCH (n:{label} {{id: $id}})
         RETURN n"
    );
    CypherQuery::new(cypher).param(ID_FIELD, id).returns(NODE_COLUMN)
}

/// Build a partial update: one `SET` assignment per key in `updates`.
///
/// Fails if any key is not a plain identifier or names `id`.
pub fn update_node(
    label: &Label,
    id: &str,
    updates: Properties,
) -> Result<CypherQuery, ModelError> {
    let mut assignments = Vec::with_capacity(updates.len());
    for key in updates.keys() {
        validate_field_name(key)?;
        if key == ID_FIELD {
            return Err(ModelError::ImmutableField(key.clone()));
        }
        assignments.push(format!("n.{key} = $updates.{key}"));
    }
    let set_clause = assignments.join(", ");

    let cypher = format!(
        "MATCH (n:{label} {{id: $id}})
         SET {set_clause}
         RETURN n"
    );
    Ok(CypherQuery::new(cypher)
        .param(ID_FIELD, id)
        .param("updates", updates)
        .returns(NODE_COLUMN))
}

pub fn delete_node(label: &Label, id: &str) -> CypherQuery {
    let cypher = format!(
        "MATCH (n:{label} {{id: $id}})
         DETACH DELETE n
         RETURN count(n) AS {DELETED_COLUMN}"
    );
    CypherQuery::new(cypher)
        .param(ID_FIELD, id)
        .returns(DELETED_COLUMN)
}

/// Page through a label, newest first when the label carries `created_at`.
///
/// Labels without `created_at` fall back to ascending `id` so that paging is
/// at least stable.
pub fn list_nodes(label: &Label, policy: &EntityPolicy, limit: u32, offset: u32) -> CypherQuery {
    let order = if policy.orders_by_created_at() {
        format!("n.{CREATED_AT_FIELD} DESC, n.{ID_FIELD}")
    } else {
        format!("n.{ID_FIELD}")
    };
    let cypher = format!(
        "MATCH (n:{label})
         RETURN n
         ORDER BY {order}
         SKIP $offset LIMIT $limit"
    );
    CypherQuery::new(cypher)
        .param("offset", i64::from(offset))
        .param("limit", i64::from(limit))
        .returns(NODE_COLUMN)
}

pub fn count_nodes(label: &Label) -> CypherQuery {
    let cypher = format!(
        "MATCH (n:{label})
         RETURN count(n) AS {TOTAL_COLUMN}"
    );
    CypherQuery::new(cypher).returns(TOTAL_COLUMN)
}
