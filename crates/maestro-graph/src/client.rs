//! Neo4j connection management and the driver-backed query executor.

use std::sync::Arc;

use async_trait::async_trait;
use neo4rs::{BoltMap, BoltString, BoltType, ConfigBuilder, Graph, Row};
use serde::Deserialize;
use tokio::sync::RwLock;

use maestro_core::types::format_timestamp;
use maestro_core::{ModelError, Properties, PropertyValue};

use crate::executor::{CypherQuery, QueryExecutor, Record, Value};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Not connected to Neo4j: call connect() first")]
    NotConnected,

    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Failed to create {label} node: query returned no rows")]
    CreationFailed { label: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Configuration for connecting to Neo4j.
///
/// Read from the `[neo4j]` config section; every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Thread-safe Neo4j client with connection pooling.
///
/// Starts disconnected; every query fails with [`GraphError::NotConnected`]
/// until [`GraphClient::connect`] succeeds. Clone is cheap (inner Arc), and
/// clones share one connection state.
#[derive(Clone)]
pub struct GraphClient {
    config: GraphConfig,
    graph: Arc<RwLock<Option<Graph>>>,
}

impl GraphClient {
    /// Create a disconnected client.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            graph: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a client and connect it in one step.
    pub async fn connect_with(config: GraphConfig) -> Result<Self, GraphError> {
        let client = Self::new(config);
        client.connect().await?;
        Ok(client)
    }

    /// Open the connection pool and verify the server answers.
    ///
    /// `Graph::connect` only builds the pool, so a `RETURN 1` round trip
    /// forces the first bolt handshake.
    pub async fn connect(&self) -> Result<(), GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&self.config.uri)
            .user(&self.config.user)
            .password(&self.config.password)
            .db(self.config.database.as_str())
            .max_connections(self.config.max_connections as usize)
            .fetch_size(self.config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        if let Err(e) = graph.run(neo4rs::query("RETURN 1")).await {
            tracing::error!(uri = %self.config.uri, error = %e, "Failed to connect to Neo4j");
            return Err(GraphError::Connection(e.to_string()));
        }

        *self.graph.write().await = Some(graph);
        tracing::info!(uri = %self.config.uri, "Connected to Neo4j");
        Ok(())
    }

    /// Drop the connection pool. Safe to call when not connected.
    pub async fn disconnect(&self) {
        if self.graph.write().await.take().is_some() {
            tracing::info!(uri = %self.config.uri, "Disconnected from Neo4j");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.graph.read().await.is_some()
    }

    /// Health check: true iff a trivial query round-trips.
    pub async fn ping(&self) -> bool {
        let q = CypherQuery::new("RETURN 'ok' AS message").returns("message");
        match self.execute(&q).await {
            Ok(rows) => !rows.is_empty(),
            Err(e) => {
                tracing::warn!(error = %e, "Neo4j health check failed");
                false
            }
        }
    }

    async fn handle(&self) -> Result<Graph, GraphError> {
        self.graph
            .read()
            .await
            .clone()
            .ok_or(GraphError::NotConnected)
    }
}

#[async_trait]
impl QueryExecutor for GraphClient {
    async fn execute(&self, query: &CypherQuery) -> Result<Vec<Record>, GraphError> {
        let graph = self.handle().await?;

        let mut neo_query = neo4rs::query(&query.text);
        for (key, value) in &query.params {
            neo_query = neo_query.param(key, value_to_bolt(value));
        }

        let mut stream = graph.execute(neo_query).await?;
        let mut records = Vec::new();
        while let Some(row) = stream.next().await? {
            records.push(row_to_record(&row, &query.columns)?);
        }
        Ok(records)
    }
}

// ── Bolt conversion ──────────────────────────────────────────────

fn scalar_to_bolt(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::Bool(b) => BoltType::from(*b),
        PropertyValue::Integer(i) => BoltType::from(*i),
        PropertyValue::Float(f) => BoltType::from(*f),
        PropertyValue::String(s) => BoltType::from(s.clone()),
        PropertyValue::Timestamp(ts) => BoltType::from(format_timestamp(*ts)),
    }
}

fn value_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Scalar(v) => scalar_to_bolt(v),
        Value::Map(props) => {
            let mut map = BoltMap::new();
            for (key, v) in props {
                map.put(BoltString::from(key.as_str()), scalar_to_bolt(v));
            }
            BoltType::Map(map)
        }
    }
}

fn row_to_record(row: &Row, columns: &[String]) -> Result<Record, GraphError> {
    let mut record = Record::new();
    for column in columns {
        if let Ok(node) = row.get::<neo4rs::Node>(column) {
            record.insert(column, node_properties(&node));
            continue;
        }
        let value: PropertyValue = row.get(column).map_err(|e| {
            GraphError::Serialization(format!("Failed to read column {column}: {e}"))
        })?;
        record.insert(column, value);
    }
    Ok(record)
}

/// Copy every scalar property off a neo4rs node.
fn node_properties(node: &neo4rs::Node) -> Properties {
    let mut props = Properties::new();
    for key in node.keys() {
        match node.get::<PropertyValue>(key) {
            Ok(v) => {
                props.insert(key.to_string(), v);
            }
            Err(e) => {
                tracing::warn!(property = key, error = %e, "Skipping non-scalar node property");
            }
        }
    }
    props
}
