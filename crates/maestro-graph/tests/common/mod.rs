//! In-memory stand-in for Neo4j.
//!
//! Understands exactly the statement shapes built by `maestro_graph::cypher`
//! and `maestro_graph::schema`, which is enough to exercise the accessor
//! end to end without a database.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use maestro_core::{Properties, PropertyValue};
use maestro_graph::{CypherQuery, GraphError, NodeAccessor, QueryExecutor, Record, Value};

struct StoredNode {
    label: String,
    props: Properties,
}

pub struct MemoryGraph {
    nodes: Mutex<Vec<StoredNode>>,
    schema: Mutex<BTreeSet<String>>,
    queries: Mutex<Vec<CypherQuery>>,
    failing: Mutex<Vec<String>>,
    connected: AtomicBool,
    drop_creates: AtomicBool,
}

impl MemoryGraph {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            nodes: Mutex::new(Vec::new()),
            schema: Mutex::new(BTreeSet::new()),
            queries: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            drop_creates: AtomicBool::new(false),
        })
    }

    pub fn disconnected() -> Arc<Self> {
        let graph = Self::new();
        graph.connected.store(false, Ordering::SeqCst);
        graph
    }

    /// Make CREATE statements return no rows.
    pub fn drop_creates(&self) {
        self.drop_creates.store(true, Ordering::SeqCst);
    }

    /// Fail every statement whose text contains `fragment`.
    pub fn fail_on(&self, fragment: &str) {
        self.failing.lock().unwrap().push(fragment.to_string());
    }

    /// Store a node directly, bypassing the accessor.
    pub fn insert_raw(&self, label: &str, props: Properties) {
        self.nodes.lock().unwrap().push(StoredNode {
            label: label.to_string(),
            props,
        });
    }

    pub fn queries(&self) -> Vec<CypherQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn schema_objects(&self) -> BTreeSet<String> {
        self.schema.lock().unwrap().clone()
    }

    pub fn stored(&self, id: &str) -> Option<Properties> {
        self.nodes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.props.get("id").and_then(PropertyValue::as_str) == Some(id))
            .map(|n| n.props.clone())
    }
}

#[async_trait]
impl QueryExecutor for MemoryGraph {
    async fn execute(&self, query: &CypherQuery) -> Result<Vec<Record>, GraphError> {
        self.queries.lock().unwrap().push(query.clone());

        if !self.connected.load(Ordering::SeqCst) {
            return Err(GraphError::NotConnected);
        }
        let text = squash(&query.text);
        if self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|f| text.contains(f.as_str()))
        {
            return Err(GraphError::Connection("simulated failure".to_string()));
        }

        if text.starts_with("CREATE CONSTRAINT") || text.starts_with("CREATE INDEX") {
            let name = text.split(' ').nth(2).unwrap_or_default().to_string();
            self.schema.lock().unwrap().insert(name);
            return Ok(Vec::new());
        }

        let label = label_of(&text);
        let mut nodes = self.nodes.lock().unwrap();

        if text.starts_with("CREATE (n:") {
            if self.drop_creates.load(Ordering::SeqCst) {
                return Ok(Vec::new());
            }
            let props = map_param(query, "props");
            nodes.push(StoredNode {
                label,
                props: props.clone(),
            });
            return Ok(vec![Record::new().with("n", props)]);
        }

        if text.contains("DETACH DELETE") {
            let id = str_param(query, "id");
            let before = nodes.len();
            nodes.retain(|n| !(n.label == label && has_id(&n.props, &id)));
            let deleted = (before - nodes.len()) as i64;
            return Ok(vec![Record::new().with("deleted_count", deleted)]);
        }

        if text.contains(" SET ") {
            let id = str_param(query, "id");
            let updates = map_param(query, "updates");
            return Ok(nodes
                .iter_mut()
                .find(|n| n.label == label && has_id(&n.props, &id))
                .map(|n| {
                    n.props.extend(updates);
                    vec![Record::new().with("n", n.props.clone())]
                })
                .unwrap_or_default());
        }

        if text.contains("AS total") {
            let total = nodes.iter().filter(|n| n.label == label).count() as i64;
            return Ok(vec![Record::new().with("total", total)]);
        }

        if text.contains("ORDER BY") {
            let mut matching: Vec<&Properties> = nodes
                .iter()
                .filter(|n| n.label == label)
                .map(|n| &n.props)
                .collect();
            let newest_first = text.contains("ORDER BY n.created_at DESC");
            matching.sort_by(|a, b| {
                let by_id = text_of(a, "id").cmp(&text_of(b, "id"));
                if newest_first {
                    text_of(b, "created_at")
                        .cmp(&text_of(a, "created_at"))
                        .then(by_id)
                } else {
                    by_id
                }
            });
            let offset = int_param(query, "offset") as usize;
            let limit = int_param(query, "limit") as usize;
            return Ok(matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|props| Record::new().with("n", props.clone()))
                .collect());
        }

        let id = str_param(query, "id");
        Ok(nodes
            .iter()
            .filter(|n| n.label == label && has_id(&n.props, &id))
            .map(|n| Record::new().with("n", n.props.clone()))
            .collect())
    }
}

/// Accessor over `graph` whose clock advances one millisecond per reading.
pub fn accessor(graph: &Arc<MemoryGraph>) -> NodeAccessor {
    let executor: Arc<dyn QueryExecutor> = graph.clone();
    NodeAccessor::new(executor).with_clock(ticking_clock())
}

pub fn ticking_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let ticks = AtomicI64::new(0);
    move || start + TimeDelta::try_milliseconds(ticks.fetch_add(1, Ordering::SeqCst)).unwrap()
}

pub fn props<const N: usize>(pairs: [(&str, PropertyValue); N]) -> Properties {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn label_of(text: &str) -> String {
    text.split_once("(n:")
        .map(|(_, rest)| {
            rest.chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect()
        })
        .unwrap_or_default()
}

fn has_id(props: &Properties, id: &str) -> bool {
    props.get("id").and_then(PropertyValue::as_str) == Some(id)
}

fn text_of(props: &Properties, key: &str) -> String {
    props
        .get(key)
        .and_then(PropertyValue::as_str)
        .unwrap_or_default()
        .to_string()
}

fn map_param(query: &CypherQuery, key: &str) -> Properties {
    query
        .params
        .get(key)
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default()
}

fn str_param(query: &CypherQuery, key: &str) -> String {
    query
        .params
        .get(key)
        .and_then(Value::as_scalar)
        .and_then(PropertyValue::as_str)
        .unwrap_or_default()
        .to_string()
}

fn int_param(query: &CypherQuery, key: &str) -> i64 {
    query
        .params
        .get(key)
        .and_then(Value::as_scalar)
        .and_then(PropertyValue::as_i64)
        .unwrap_or_default()
}
