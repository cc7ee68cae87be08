//! The query-execution seam between the node accessor and a graph database.
//!
//! The accessor only ever talks to a [`QueryExecutor`]: it hands over Cypher
//! text with named parameters and receives plain [`Record`]s back. The Neo4j
//! implementation lives in [`crate::client`]; tests plug in their own.

use std::collections::BTreeMap;

use async_trait::async_trait;

use maestro_core::{Properties, PropertyValue};

use crate::client::GraphError;

/// A bound parameter or a returned column: either a scalar or a whole property map.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(PropertyValue),
    Map(Properties),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&PropertyValue> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&Properties> {
        match self {
            Self::Map(m) => Some(m),
            Self::Scalar(_) => None,
        }
    }
}

impl From<PropertyValue> for Value {
    fn from(v: PropertyValue) -> Self {
        Self::Scalar(v)
    }
}

impl From<Properties> for Value {
    fn from(m: Properties) -> Self {
        Self::Map(m)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(PropertyValue::from(s))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Scalar(PropertyValue::Integer(i))
    }
}

/// Named query parameters.
pub type Params = BTreeMap<String, Value>;

/// A Cypher statement ready for execution.
///
/// `columns` names the values in the `RETURN` clause so that executors can
/// lift them out of driver rows without knowing the statement's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    pub text: String,
    pub params: Params,
    pub columns: Vec<String>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Params::new(),
            columns: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn returns(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Take a node column's property map.
    pub fn into_node(mut self, column: &str) -> Result<Properties, GraphError> {
        match self.fields.remove(column) {
            Some(Value::Map(props)) => Ok(props),
            _ => Err(GraphError::Serialization(format!(
                "Column {column} is not a node"
            ))),
        }
    }

    /// Read an integer column.
    pub fn integer(&self, column: &str) -> Result<i64, GraphError> {
        self.get(column)
            .and_then(Value::as_scalar)
            .and_then(PropertyValue::as_i64)
            .ok_or_else(|| GraphError::Serialization(format!("Column {column} is not an integer")))
    }
}

/// Executes one Cypher statement and collects every result row.
///
/// Implementations must be safe for concurrent use and must report
/// [`GraphError::NotConnected`] when called before a connection exists.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &CypherQuery) -> Result<Vec<Record>, GraphError>;
}
