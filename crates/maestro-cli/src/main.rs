//! CLI entry point for the Maestro music graph.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

use maestro_core::{Label, Properties, PropertyValue};
use maestro_graph::{GraphClient, NodeAccessor, QueryExecutor, DEFAULT_LIST_LIMIT};

use maestro_cli::config::load_config;
use maestro_cli::fields::parse_field;

#[derive(Parser)]
#[command(name = "maestro")]
#[command(about = "Music knowledge graph over Neo4j")]
struct Cli {
    /// Config file prefix (default: maestro).
    #[arg(short, long, default_value = "maestro", global = true)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create constraints and indexes (safe to repeat).
    Schema,
    /// Check that Neo4j answers queries.
    Health,
    /// Create a node.
    Create {
        label: Label,
        /// Field as key=value; repeatable.
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, PropertyValue)>,
    },
    /// Fetch a node by id.
    Get { label: Label, id: String },
    /// Set or overwrite fields on a node.
    Update {
        label: Label,
        id: String,
        /// Field as key=value; repeatable.
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, PropertyValue)>,
    },
    /// Delete a node by id.
    Delete { label: Label, id: String },
    /// List nodes, newest first where the label is timestamped.
    List {
        label: Label,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Count nodes with a label.
    Count { label: Label },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let app_config = load_config(&cli.config)?;

    let client = GraphClient::new(app_config.neo4j);
    if let Err(e) = client.connect().await {
        if matches!(cli.command, Command::Health) {
            return print_json(&json!({ "status": "unhealthy", "database": "disconnected" }));
        }
        return Err(e.into());
    }

    let executor: Arc<dyn QueryExecutor> = Arc::new(client.clone());
    let nodes = NodeAccessor::new(executor);

    let outcome = run(cli.command, &client, &nodes).await;
    client.disconnect().await;
    outcome
}

async fn run(command: Command, client: &GraphClient, nodes: &NodeAccessor) -> anyhow::Result<()> {
    if !matches!(command, Command::Schema | Command::Health) {
        nodes.initialize_schema().await;
    }

    match command {
        Command::Schema => {
            let report = nodes.initialize_schema().await;
            print_json(&json!({ "applied": report.applied, "skipped": report.skipped }))
        }
        Command::Health => {
            let ok = client.ping().await;
            print_json(&json!({
                "status": if ok { "healthy" } else { "unhealthy" },
                "database": if ok { "connected" } else { "disconnected" },
            }))
        }
        Command::Create { label, fields } => {
            let node = nodes.create_node(&label, into_properties(fields)).await?;
            print_json(&node)
        }
        Command::Get { label, id } => match nodes.get_node(&label, &id).await? {
            Some(node) => print_json(&node),
            None => anyhow::bail!("{label} {id} not found"),
        },
        Command::Update { label, id, fields } => {
            match nodes.update_node(&label, &id, into_properties(fields)).await? {
                Some(node) => print_json(&node),
                None => anyhow::bail!("{label} {id} not found"),
            }
        }
        Command::Delete { label, id } => {
            let deleted = nodes.delete_node(&label, &id).await?;
            print_json(&json!({ "deleted": deleted }))
        }
        Command::List {
            label,
            limit,
            offset,
        } => print_json(&nodes.list_nodes(&label, limit, offset).await?),
        Command::Count { label } => {
            let count = nodes.count_nodes(&label).await?;
            print_json(&json!({ "label": label, "count": count }))
        }
    }
}

fn into_properties(fields: Vec<(String, PropertyValue)>) -> Properties {
    fields.into_iter().collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
