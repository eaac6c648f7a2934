use crate::{
    commands::{ConfigArgs, RunArgs},
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use commands::Commands;
use connectors::factory::{ConnectionFactory, PgConnectionFactory};
use engine_config::{env::EnvVars, settings::LoaderSettings};
use engine_runtime::{execution::planner::RunOptions, metrics::Metrics};
use model::execution::pipeline::Pipeline;
use planner::{
    catalog::StatementCatalog,
    plan::{self, PipelineKind},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "starload",
    version = "0.1.0",
    about = "Loads raw event data into a warehouse star schema"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Initialize logger, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match dispatch(cli.command, &shutdown).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

async fn dispatch(command: Commands, shutdown: &ShutdownCoordinator) -> Result<ExitCode, CliError> {
    match command {
        Commands::CreateTables { config, output } => {
            let settings = load_settings(&config)?;
            let pipeline = build_pipeline(PipelineKind::Reset, &settings)?;
            let run = RunArgs {
                workers: None,
                output,
            };
            run_pipeline(&pipeline, &settings, &run, shutdown).await
        }
        Commands::Etl { config, run } => {
            let settings = load_settings(&config)?;
            let pipeline = build_pipeline(PipelineKind::Load, &settings)?;
            run_pipeline(&pipeline, &settings, &run, shutdown).await
        }
        Commands::Run {
            config,
            run,
            pipeline,
        } => {
            let settings = load_settings(&config)?;
            let pipeline = match pipeline {
                Some(path) => engine_config::pipeline::load(&path, &load_env(&config)?)?,
                None => build_pipeline(PipelineKind::Full, &settings)?,
            };
            run_pipeline(&pipeline, &settings, &run, shutdown).await
        }
        Commands::Plan { config, kind } => {
            let settings = load_settings(&config)?;
            let kind: PipelineKind = kind.parse()?;
            let pipeline = build_pipeline(kind, &settings)?;

            info!(
                "Pipeline '{}' fingerprint: {}",
                pipeline.name(),
                plan::fingerprint(&pipeline)
            );
            output::print_json(&pipeline)?;
            Ok(ExitCode::Success)
        }
        Commands::TestConn { config } => {
            let settings = load_settings(&config)?;
            let factory = PgConnectionFactory::new(settings.connection_config())?;
            factory.ping().await?;
            println!("Connection to {} succeeded", factory.endpoint());
            Ok(ExitCode::Success)
        }
    }
}

fn load_env(args: &ConfigArgs) -> Result<EnvVars, CliError> {
    let mut env = EnvVars::from_system();
    if let Some(path) = &args.env_file {
        env.load_from_file(path)?;
    }
    Ok(env)
}

fn load_settings(args: &ConfigArgs) -> Result<LoaderSettings, CliError> {
    let env = load_env(args)?;
    let settings = LoaderSettings::load(&args.config, &env)?;
    Ok(settings)
}

fn build_pipeline(kind: PipelineKind, settings: &LoaderSettings) -> Result<Pipeline, CliError> {
    let catalog = match settings.bulk_load() {
        Some((sources, role)) => StatementCatalog::star_schema().with_bulk_load(sources, role),
        None => StatementCatalog::star_schema(),
    };

    let pipeline = plan::build(kind, &catalog)?;
    Ok(pipeline)
}

async fn run_pipeline(
    pipeline: &Pipeline,
    settings: &LoaderSettings,
    run: &RunArgs,
    shutdown: &ShutdownCoordinator,
) -> Result<ExitCode, CliError> {
    let factory: Arc<dyn ConnectionFactory> =
        Arc::new(PgConnectionFactory::new(settings.connection_config())?);

    let options = RunOptions {
        max_workers: run.workers.unwrap_or(settings.workers),
        cancel: shutdown.cancel_token(),
        metrics: Metrics::new(),
    };

    let report = engine_runtime::execution::planner::run(pipeline, factory, options).await?;

    output::print_summary(&report);
    if let Some(path) = &run.output {
        output::write_report(&report, path).await?;
        info!("Run report written to {}", path);
    }

    if shutdown.is_shutdown_requested() && report.is_success() {
        info!("Interrupt arrived during the last phase; the run still completed");
    }

    Ok(ExitCode::from_report(&report))
}
