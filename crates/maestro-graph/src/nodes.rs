//! Generic CRUD over single-label nodes.
//!
//! Every operation is one Cypher statement executed through the injected
//! [`QueryExecutor`]. The entity policy for the label decides which fields are
//! stamped on create and refreshed on update. Missing nodes are reported as
//! `None`/`false`; only executor and validation failures are errors.
//!
//! There is no optimistic locking: concurrent updates to the same node race
//! in the database and the last write wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use maestro_core::policy::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use maestro_core::types::validate_field_name;
use maestro_core::{policy_for, Label, ModelError, Node, NodeId, Properties, PropertyValue};

use crate::client::GraphError;
use crate::cypher::{self, DELETED_COLUMN, NODE_COLUMN, TOTAL_COLUMN};
use crate::executor::{QueryExecutor, Record};
use crate::schema::{self, SchemaReport};

/// Page size used by [`NodeAccessor::list_nodes_page`].
pub const DEFAULT_LIST_LIMIT: u32 = 100;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Label-parameterized node operations over a query executor.
///
/// Clone is cheap; clones share the executor.
#[derive(Clone)]
pub struct NodeAccessor {
    executor: Arc<dyn QueryExecutor>,
    clock: Clock,
}

impl NodeAccessor {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the source of `created_at`/`updated_at` instants.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Create a node, stamping its id and any policy-managed timestamps.
    ///
    /// Generated values win over caller fields with the same key, and
    /// caller-supplied `created_at`/`updated_at` are always dropped.
    pub async fn create_node(&self, label: &Label, fields: Properties) -> Result<Node, GraphError> {
        for key in fields.keys() {
            validate_field_name(key)?;
        }

        let policy = policy_for(label.as_str());
        let node_id = NodeId::new().to_string();
        let now = PropertyValue::Timestamp((self.clock)());
        tracing::info!(%label, id = %node_id, "Creating node");

        let mut props = fields;
        for managed in [CREATED_AT_FIELD, UPDATED_AT_FIELD] {
            if props.remove(managed).is_some() {
                tracing::debug!(%label, field = managed, "Ignoring caller-supplied timestamp");
            }
        }
        props.insert(ID_FIELD.to_string(), PropertyValue::String(node_id.clone()));
        if policy.created_at_on_create {
            props.insert(CREATED_AT_FIELD.to_string(), now.clone());
        }
        if policy.updated_at_on_create {
            props.insert(UPDATED_AT_FIELD.to_string(), now);
        }

        let q = cypher::create_node(label, storable(props));
        let Some(record) = self.executor.execute(&q).await?.into_iter().next() else {
            tracing::error!(%label, id = %node_id, "Create returned no rows");
            return Err(GraphError::CreationFailed {
                label: label.to_string(),
            });
        };

        let node = to_node(label, record)?;
        tracing::info!(%label, id = %node.id, "Created node");
        Ok(node)
    }

    /// Fetch a node by id, or `None` if no such node carries this label.
    pub async fn get_node(&self, label: &Label, id: &str) -> Result<Option<Node>, GraphError> {
        tracing::debug!(%label, id, "Fetching node");
        let q = cypher::get_node(label, id);
        match self.executor.execute(&q).await?.into_iter().next() {
            Some(record) => Ok(Some(to_node(label, record)?)),
            None => {
                tracing::debug!(%label, id, "Node not found");
                Ok(None)
            }
        }
    }

    /// Apply a partial update and return the node as stored afterwards.
    ///
    /// Fields not named in `updates` are left untouched. An empty update is
    /// a plain read.
    pub async fn update_node(
        &self,
        label: &Label,
        id: &str,
        updates: Properties,
    ) -> Result<Option<Node>, GraphError> {
        if updates.is_empty() {
            tracing::debug!(%label, id, "Empty update, returning current node");
            return self.get_node(label, id).await;
        }

        tracing::info!(%label, id, fields = updates.len(), "Updating node");
        let mut updates = updates;
        if policy_for(label.as_str()).refresh_updated_at {
            updates.insert(
                UPDATED_AT_FIELD.to_string(),
                PropertyValue::Timestamp((self.clock)()),
            );
        }

        let q = cypher::update_node(label, id, storable(updates))?;
        match self.executor.execute(&q).await?.into_iter().next() {
            Some(record) => {
                let node = to_node(label, record)?;
                tracing::info!(%label, id, "Updated node");
                Ok(Some(node))
            }
            None => {
                tracing::warn!(%label, id, "Update matched no node");
                Ok(None)
            }
        }
    }

    /// Delete a node. Returns false when nothing matched.
    pub async fn delete_node(&self, label: &Label, id: &str) -> Result<bool, GraphError> {
        tracing::info!(%label, id, "Deleting node");
        let q = cypher::delete_node(label, id);
        let deleted = match self.executor.execute(&q).await?.first() {
            Some(record) => record.integer(DELETED_COLUMN)? > 0,
            None => false,
        };

        if deleted {
            tracing::info!(%label, id, "Deleted node");
        } else {
            tracing::warn!(%label, id, "Delete matched no node");
        }
        Ok(deleted)
    }

    /// List one page of nodes, newest first for labels stamped with `created_at`.
    pub async fn list_nodes(
        &self,
        label: &Label,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Node>, GraphError> {
        tracing::debug!(%label, limit, offset, "Listing nodes");
        let q = cypher::list_nodes(label, &policy_for(label.as_str()), limit, offset);
        let records = self.executor.execute(&q).await?;

        let mut nodes = Vec::with_capacity(records.len());
        for record in records {
            match to_node(label, record) {
                Ok(node) => nodes.push(node),
                Err(GraphError::Model(ModelError::MissingId { .. })) => {
                    tracing::warn!(%label, "Skipping listed node without an id");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(%label, count = nodes.len(), "Listed nodes");
        Ok(nodes)
    }

    /// First page of [`DEFAULT_LIST_LIMIT`] nodes.
    pub async fn list_nodes_page(&self, label: &Label) -> Result<Vec<Node>, GraphError> {
        self.list_nodes(label, DEFAULT_LIST_LIMIT, 0).await
    }

    pub async fn count_nodes(&self, label: &Label) -> Result<u64, GraphError> {
        let q = cypher::count_nodes(label);
        match self.executor.execute(&q).await?.first() {
            Some(record) => Ok(record.integer(TOTAL_COLUMN)?.max(0) as u64),
            None => Ok(0),
        }
    }

    /// Provision constraints and indexes. Never fails; see [`schema::initialize_schema`].
    pub async fn initialize_schema(&self) -> SchemaReport {
        schema::initialize_schema(self.executor.as_ref()).await
    }
}

fn storable(props: Properties) -> Properties {
    props
        .into_iter()
        .map(|(key, value)| (key, value.into_storable()))
        .collect()
}

fn to_node(label: &Label, record: Record) -> Result<Node, GraphError> {
    let props = record.into_node(NODE_COLUMN)?;
    Ok(Node::from_properties(label.clone(), props)?)
}
