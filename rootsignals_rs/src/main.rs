use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures_util::TryStreamExt;
use rootsignals_rs::{
    CalibrateBatchRequest, CalibrationParameter, EvaluatorExecutionRequest, EvaluatorListParams,
    RootSignalsClient,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "rootsignals", version, about = "Root Signals evaluator client")]
struct Cli {
    /// Falls back to a `.env` file in the working directory.
    #[arg(long, global = true, env = "ROOTSIGNALS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "ROOTSIGNALS_API_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect and run evaluators.
    Evaluators {
        #[command(subcommand)]
        cmd: EvaluatorsCommand,
    },

    /// Calibrate evaluator definitions against one test set and print RMS/MAE per model and prompt.
    CalibrateBatch(CalibrateBatchArgs),
}

#[derive(Debug, Subcommand)]
enum EvaluatorsCommand {
    /// Print evaluators as JSON lines.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    Run {
        evaluator_id: String,
        #[arg(long)]
        request: Option<String>,
        #[arg(long)]
        response: Option<String>,
    },
}

#[derive(Debug, Args)]
struct CalibrateBatchArgs {
    /// JSON array of evaluator definitions (`name`, `prompt`, `model`, ...).
    #[arg(long)]
    definitions: PathBuf,

    #[arg(long, conflicts_with = "test_data", required_unless_present = "test_data")]
    dataset_id: Option<String>,

    /// JSON array of rows, each `[expected_score, ...columns]`.
    #[arg(long)]
    test_data: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    parallel: usize,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rootsignals_core::o11y::init_global_from_env()?;
    let cli = Cli::parse();

    let mut client = RootSignalsClient::configured(cli.api_key, cli.base_url)?;
    if let Some(secs) = cli.timeout {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    let evaluators = client.evaluators();

    match cli.cmd {
        Command::Evaluators {
            cmd: EvaluatorsCommand::List { search, limit },
        } => {
            let params = EvaluatorListParams {
                search,
                ..EvaluatorListParams::default()
            };
            let items = evaluators.list(params, limit);
            futures_util::pin_mut!(items);
            while let Some(item) = items.try_next().await? {
                println!("{}", serde_json::to_string(&item)?);
            }
        }
        Command::Evaluators {
            cmd:
                EvaluatorsCommand::Run {
                    evaluator_id,
                    request,
                    response,
                },
        } => {
            let payload = EvaluatorExecutionRequest {
                request,
                response,
                ..EvaluatorExecutionRequest::default()
            };
            let result = evaluators.run(&evaluator_id, payload, None).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::CalibrateBatch(args) => {
            let definitions: Vec<CalibrationParameter> = read_json(&args.definitions)?;
            let mut request =
                CalibrateBatchRequest::new(definitions).with_parallel_requests(args.parallel);
            if let Some(id) = args.dataset_id {
                request = request.with_test_dataset_id(id);
            }
            if let Some(path) = args.test_data {
                request = request.with_test_data(read_json(&path)?);
            }
            tracing::info!(
                definitions = request.evaluator_definitions.len(),
                parallel = args.parallel,
                "starting calibration batch"
            );
            let result = evaluators.calibrate_batch(request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
