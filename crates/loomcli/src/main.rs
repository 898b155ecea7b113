use anyhow::Result;
use clap::{Parser, Subcommand};
use loomcore::{
    ActionConfig, ActionKind, ExecutionEvent, FetchConfig, FilterCondition, FilterConfig,
    FilterOperator, NodeKind, NodeSpec, OwnerScope, WorkflowDefinition,
};
use loomnodes::{HttpCompletionClient, HttpToolClient};
use loomruntime::{
    execution_order, validate, MemoryExecutionStore, MemoryWorkflowStore, WorkflowEngine,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "loom")]
#[command(about = "Loom workflow engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Base URL of the tool server
        #[arg(long, default_value = "http://localhost:7331")]
        tools_url: String,

        /// Base URL of the text-generation service
        #[arg(long, default_value = "http://localhost:7332")]
        textgen_url: String,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a workflow file
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// Print the execution order of a workflow file
    Order {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// Create a new example workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            tools_url,
            textgen_url,
            verbose,
        } => {
            if verbose {
                tracing_subscriber::fmt()
                    .with_max_level(tracing::Level::DEBUG)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_max_level(tracing::Level::WARN)
                    .init();
            }

            run_workflow(file, tools_url, textgen_url).await?;
        }

        Commands::Validate { file } => {
            validate_file(file)?;
        }

        Commands::Order { file } => {
            print_order(file)?;
        }

        Commands::Init { output } => {
            create_example_workflow(output)?;
        }
    }

    Ok(())
}

fn load_definition(file: &PathBuf) -> Result<WorkflowDefinition> {
    let json = std::fs::read_to_string(file)?;
    Ok(serde_json::from_str(&json)?)
}

async fn run_workflow(file: PathBuf, tools_url: String, textgen_url: String) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let definition = load_definition(&file)?;
    println!("📋 Workflow: {}", definition.name);
    println!("   Nodes: {}", definition.nodes.len());
    println!();

    let engine = WorkflowEngine::new(
        Arc::new(HttpToolClient::new(tools_url)),
        Arc::new(HttpCompletionClient::new(textgen_url)),
        Arc::new(MemoryWorkflowStore::new()),
        Arc::new(MemoryExecutionStore::new()),
    );

    // Print events live while the run progresses.
    let mut events = engine.subscribe_events();
    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::RunStarted { .. } => {
                    println!("▶️  Run started");
                }
                ExecutionEvent::NodeStarted {
                    node_id, node_kind, ..
                } => {
                    println!("  ⚡ Starting node: {node_id} ({node_kind})");
                }
                ExecutionEvent::NodeCompleted {
                    node_id,
                    duration_ms,
                    ..
                } => {
                    println!("  ✅ Node {node_id} completed in {duration_ms}ms");
                }
                ExecutionEvent::NodeFailed { node_id, error, .. } => {
                    println!("  ❌ Node {node_id} failed: {error}");
                }
                ExecutionEvent::RunCompleted {
                    success,
                    duration_ms,
                    ..
                } => {
                    if success {
                        println!("✨ Run completed successfully in {duration_ms}ms");
                    } else {
                        println!("💥 Run failed after {duration_ms}ms");
                    }
                }
            }
        }
    });

    let record = engine.execute_definition(&definition).await?;

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    println!();
    println!("📊 Execution Summary:");
    println!("   Execution ID: {}", record.id);
    println!("   Status: {:?}", record.status);
    println!("   Ledger entries: {}", record.logs.len());

    if let Some(failure) = &record.error {
        println!("   Failed node: {} ({})", failure.node_id, failure.message);
    }

    if let Some(result) = &record.result {
        println!();
        println!("📤 Result:");
        println!("{}", serde_json::to_string_pretty(result)?);
    }

    Ok(())
}

fn validate_file(file: PathBuf) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let definition = load_definition(&file)?;
    let report = validate(&definition);

    if report.is_valid() {
        println!("✅ Workflow is valid:");
        println!("   Name: {}", definition.name);
        println!("   Nodes: {}", definition.nodes.len());
    } else {
        println!("❌ Workflow is invalid:");
        for message in report.messages() {
            println!("   • {message}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_order(file: PathBuf) -> Result<()> {
    let definition = load_definition(&file)?;
    let order = execution_order(&definition)?;

    println!("📋 Execution order for {}:", definition.name);
    for (position, node_id) in order.iter().enumerate() {
        let kind = definition
            .find_node(node_id)
            .map(|n| n.kind_name())
            .unwrap_or("?");
        println!("  {}. {} ({})", position + 1, node_id, kind);
    }

    Ok(())
}

fn create_example_workflow(output: PathBuf) -> Result<()> {
    let mut workflow = WorkflowDefinition::new("example-fetch-filter")
        .with_owner(OwnerScope::User(uuid::Uuid::new_v4()))
        .with_description("Fetches rows from a tool server and keeps the large ones");

    workflow.add_node(NodeSpec::new(
        "rows",
        NodeKind::Fetch(FetchConfig {
            server_id: "demo-server".to_string(),
            tool_name: "list_rows".to_string(),
            parameters: serde_json::Map::new(),
        }),
    ));

    workflow.add_node(
        NodeSpec::new(
            "keep-large",
            NodeKind::Filter(FilterConfig {
                conditions: vec![FilterCondition {
                    field: "x".to_string(),
                    operator: FilterOperator::Gt,
                    value: serde_json::json!(3),
                }],
            }),
        )
        .with_inputs(["rows"]),
    );

    workflow.add_node(
        NodeSpec::new(
            "save",
            NodeKind::Action(ActionConfig {
                action: ActionKind::Save,
                message: None,
            }),
        )
        .with_inputs(["keep-large"]),
    );

    let json = serde_json::to_string_pretty(&workflow)?;
    std::fs::write(&output, json)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  loom run --file {}", output.display());

    Ok(())
}
