mod load;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use triageflow_config::OrchestrationBackend;
use triageflow_engine::{WorkflowEngine, assess};
use triageflow_runtime::Effects;

/// Triageflow - validate and run ticket triage workflows
#[derive(Parser)]
#[command(name = "triageflow")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check a workflow definition for structural errors
  Validate {
    /// Path to a workflow definition or execution payload (JSON)
    definition: PathBuf,
  },

  /// Run a workflow against an input record
  Run {
    /// Path to a workflow definition or execution payload (JSON)
    definition: PathBuf,

    /// Input record file, or `-` for stdin. Overrides a payload's input
    #[arg(long)]
    input: Option<PathBuf>,

    /// Organization making the request. Defaults to the payload's, or the
    /// definition owner's
    #[arg(long)]
    organization: Option<String>,

    /// Preferred orchestration backend (inline, temporal, durable-objects)
    #[arg(long, env = "TRIAGEFLOW_ORCHESTRATION")]
    orchestration: Option<OrchestrationBackend>,

    /// Soft execution deadline in milliseconds
    #[arg(long, env = "TRIAGEFLOW_MAX_EXECUTION_MS")]
    max_execution_ms: Option<u64>,
  },
}

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triageflow=info,warn")),
    )
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Validate { definition } => validate(definition),
    Commands::Run {
      definition,
      input,
      organization,
      orchestration,
      max_execution_ms,
    } => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run(RunArgs {
        definition,
        input,
        organization,
        orchestration,
        max_execution_ms,
      }))
    }
  }
}

fn validate(path: PathBuf) -> Result<ExitCode> {
  let payload = load::load_payload(&path)?;
  let engine = WorkflowEngine::new(Effects::simulated());

  let workflow = match engine.validate(&payload.definition) {
    Ok(workflow) => workflow,
    Err(e) => {
      eprintln!("invalid: {}", e);
      return Ok(ExitCode::FAILURE);
    }
  };

  let entry: Vec<&str> = workflow.entry_nodes().map(|node| node.id.as_str()).collect();
  eprintln!(
    "valid: {} (revision {}), {} nodes, {} edges, entry nodes: {}",
    workflow.metadata().name,
    workflow.metadata().revision,
    workflow.nodes().len(),
    workflow.edges().len(),
    entry.join(", ")
  );

  println!("{}", serde_json::to_string_pretty(&assess(&workflow))?);
  Ok(ExitCode::SUCCESS)
}

struct RunArgs {
  definition: PathBuf,
  input: Option<PathBuf>,
  organization: Option<String>,
  orchestration: Option<OrchestrationBackend>,
  max_execution_ms: Option<u64>,
}

async fn run(args: RunArgs) -> Result<ExitCode> {
  let mut payload = load::load_payload(&args.definition)?;

  if let Some(path) = &args.input {
    payload.input = load::load_input(path)?;
  }
  if let Some(organization) = args.organization {
    payload.organization_id = organization;
  }
  if let Some(orchestration) = args.orchestration {
    payload.options.orchestration = orchestration;
  }
  if let Some(max_execution_ms) = args.max_execution_ms {
    payload.options.max_execution_ms = max_execution_ms;
  }

  let engine = WorkflowEngine::new(Effects::simulated());

  // Stop dispatching new nodes on Ctrl-C
  let cancel = CancellationToken::new();
  let on_signal = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, cancelling run");
      on_signal.cancel();
    }
  });

  let result = engine
    .run_workflow_with_cancel(payload, cancel)
    .await
    .context("workflow rejected")?;

  eprintln!(
    "Run {} {:?}: executed {}",
    result.run.run_id,
    result.status(),
    result.executed_nodes().join(" -> ")
  );
  println!("{}", serde_json::to_string_pretty(&result)?);

  Ok(if result.succeeded() {
    ExitCode::SUCCESS
  } else {
    ExitCode::from(2)
  })
}
