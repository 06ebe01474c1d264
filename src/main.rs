use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tfcost::bedrock::BedrockEstimator;
use tfcost::config::{self, Config};
use tfcost::error::AnalyzerError;
use tfcost::exit_codes::exit_code_for_anyhow;
use tfcost::report::{self, ReportFormat};
use tfcost::workflow;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tfcost")]
#[command(
    about = "Estimate monthly AWS costs of a Terraform plan",
    long_about = "tfcost reads a Terraform plan (JSON from `terraform show -json`, or a binary\n.tfplan when the terraform CLI is installed), asks an AWS Bedrock model to\nprice every resource being created or updated, and prints a monthly cost\nreport including hidden and data transfer costs."
)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Terraform plan file (JSON or binary .tfplan)
    #[arg(value_name = "PLAN_FILE")]
    plan_file: Option<PathBuf>,

    /// AWS region used for Bedrock and for pricing
    #[arg(long, env = "TFCOST_REGION")]
    region: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Bedrock model ID
    #[arg(long, value_name = "MODEL_ID")]
    model: Option<String>,

    /// Maximum concurrent Bedrock requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".tfcost.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(exit_code_for_anyhow(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Init { path }) = &cli.command {
        config::init_config(path)?;
        return Ok(());
    }

    let Some(plan_file) = cli.plan_file.clone() else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "the following required arguments were not provided:\n  <PLAN_FILE>",
            )
            .exit();
    };

    if cli.concurrency == Some(0) {
        return Err(AnalyzerError::Validation {
            field: "--concurrency".to_string(),
            reason: "must be at least 1".to_string(),
        }
        .into());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(region) = cli.region {
        config.analysis.region = region;
    }
    if let Some(model) = cli.model {
        config.bedrock.model_id = model;
    }
    if let Some(concurrency) = cli.concurrency {
        config.analysis.concurrency = concurrency;
    }
    config.validate()?;

    let resources = workflow::load_resources(&plan_file, &config)
        .with_context(|| format!("Failed to load Terraform plan {}", plan_file.display()))?;
    if resources.billable().next().is_none() {
        warn!("No resources to be created or updated in Terraform plan");
    }

    info!("Analyzing costs with Bedrock model {}", config.bedrock.model_id);
    let estimator = BedrockEstimator::from_config(&config).await;
    let progress = workflow::progress_bar();
    let analysis = workflow::estimate_costs(&resources, &estimator, &config, &progress).await;

    let failed = analysis.failed().count();
    if failed > 0 {
        eprintln!(
            "{} {} of {} resources could not be estimated and are counted as $0.00",
            style("warning:").yellow().bold(),
            failed,
            analysis.estimates.len()
        );
    }

    let rendered = report::render(&analysis, cli.format)?;
    report::write_report(&rendered, cli.output.as_deref())
        .context("Failed to write cost report")?;

    info!("Cost analysis completed");
    Ok(())
}
