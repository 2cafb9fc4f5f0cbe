use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use draftloop::llm::{AnthropicClient, LlmClient, LoggingClient, RetryingClient};
use draftloop::observe::{JsonlObserver, LogObserver};
use draftloop::orchestrator::{Orchestrator, RunReport, RunSettings};
use draftloop::prompt::{PromptLibrary, TEMPLATE_NAMES};
use draftloop::{FinalResult, TerminationReason};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftloop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("draftloop.log");

    // Setup env_logger with file output; RUST_LOG wins over the config level
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn load_prompts(config: &Config) -> Result<PromptLibrary> {
    match &config.prompts_dir {
        Some(dir) => PromptLibrary::with_overrides(dir)
            .context(format!("Failed to load prompt overrides from {}", dir.display())),
        None => PromptLibrary::builtin().context("Failed to register built-in prompts"),
    }
}

fn read_request(request: Option<&str>) -> Result<String> {
    match request {
        Some(request) => Ok(request.to_string()),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            Ok(buf)
        }
    }
}

struct RunArgs<'a> {
    request: Option<&'a str>,
    max_rounds: Option<u32>,
    model: Option<&'a str>,
    journal: Option<&'a PathBuf>,
    raw: bool,
}

async fn handle_run_command(args: RunArgs<'_>, config: &Config, verbose: bool) -> Result<()> {
    let request = read_request(args.request)?;

    let mut config = config.clone();
    if let Some(model) = args.model {
        config.llm.model = model.to_string();
    }
    let max_rounds = args.max_rounds.unwrap_or(config.loop_config.max_rounds);
    info!("Running request with model {} (max_rounds={})", config.llm.model, max_rounds);

    let anthropic = AnthropicClient::new(config.anthropic_config()).context("Failed to create Anthropic client")?;
    let client: Arc<dyn LlmClient> = Arc::new(LoggingClient::new(
        RetryingClient::new(anthropic, config.retry_policy()),
        "anthropic",
    ));

    let settings = RunSettings {
        max_rounds,
        normalize: config.output.normalize,
        ..Default::default()
    };
    let mut orchestrator = Orchestrator::with_client(client, Arc::new(load_prompts(&config)?), settings)
        .context("Failed to build orchestrator")?
        .with_observer(LogObserver);

    if let Some(dir) = args.journal.or(config.journal_dir.as_ref()) {
        let journal = JsonlObserver::new(dir).context(format!("Failed to open journal at {}", dir.display()))?;
        orchestrator = orchestrator.with_observer(journal);
    }

    if !args.raw {
        eprintln!("{} {} (max {} rounds)", "Refining:".cyan(), request.trim(), max_rounds);
    }

    let report = orchestrator.run(&request).await.context("Run failed")?;
    print_report(&report, &config, args.raw, verbose);
    Ok(())
}

fn print_report(report: &RunReport, config: &Config, raw: bool, verbose: bool) {
    if raw {
        match report.result.content() {
            Some(content) => println!("{}", content),
            None => eprintln!("{}", "No artifact produced".yellow()),
        }
        return;
    }

    if verbose {
        for round in &report.run.rounds {
            eprintln!(
                "  round {:>2} {:<8} -> {}",
                round.number,
                round.role.to_string(),
                round.directive
            );
        }
    }

    let reason = match report.reason {
        TerminationReason::Approved => report.reason.to_string().green(),
        TerminationReason::RoundCap => report.reason.to_string().yellow(),
    };
    eprintln!("{} {} after {} rounds", "Finished:".green(), reason, report.rounds());

    match &report.result {
        FinalResult::Artifact { round, .. } => {
            eprintln!("{} round {}", "Artifact from:".green(), round);
            println!("{}", report.result.render(config.output.fence_language.as_deref()));
        }
        FinalResult::NoArtifact => eprintln!("{}", report.result.render(None).yellow()),
    }

    eprintln!(
        "{} {} tokens (~${:.4})",
        "Usage:".cyan(),
        report.usage.total(),
        report.usage.cost_usd(&config.llm.model)
    );
}

fn handle_prompts_command(config: &Config) -> Result<()> {
    let library = load_prompts(config)?;
    for name in TEMPLATE_NAMES {
        println!("{} {}", "==>".cyan(), name.bold());
        println!("{}", library.source(name).unwrap_or_default());
    }
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Run {
            request,
            max_rounds,
            model,
            journal,
            raw,
        } => {
            let args = RunArgs {
                request: request.as_deref(),
                max_rounds: *max_rounds,
                model: model.as_deref(),
                journal: journal.as_ref(),
                raw: *raw,
            };
            handle_run_command(args, config, cli.is_verbose()).await
        }
        Commands::Prompts => handle_prompts_command(config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_env();

    // Setup logging once the level is known
    let level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    setup_logging(level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
