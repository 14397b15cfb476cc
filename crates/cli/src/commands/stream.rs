//! `get` and `search` command implementations.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{GrpcMovie, SearchRequest};
use media_source::CatalogMediaService;
use movies_service::MoviesStreamService;
use relay::{FramedSink, LogSink, RecordSink, RelayOutcome};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::summary::StreamSummary;
use crate::cli::{SearchArgs, StreamArgs};
use crate::error::CliError;

/// Streaming operation selected on the command line
#[derive(Debug, Clone)]
enum Operation {
    Get,
    Search(String),
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Self::Get => movies_service::GET_MOVIES,
            Self::Search(_) => movies_service::SEARCH_MOVIES,
        }
    }
}

/// Execute the `get` command
pub async fn run_get(args: &StreamArgs) -> Result<()> {
    run_stream(args, Operation::Get).await
}

/// Execute the `search` command
pub async fn run_search(args: &SearchArgs) -> Result<()> {
    run_stream(&args.stream, Operation::Search(args.text.clone())).await
}

async fn run_stream(args: &StreamArgs, operation: Operation) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        movies = blueprint.movies.len(),
        metrics_prefix = %blueprint.service.metrics_prefix,
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let media = Arc::new(CatalogMediaService::from_blueprint(&blueprint));
    let service = MoviesStreamService::new(media, &blueprint.service.metrics_prefix);

    let started = Instant::now();
    let handle = match &args.output {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let sink = FramedSink::new(
                path.display().to_string(),
                file,
                blueprint.relay.write_high_water_bytes,
            );
            start(&service, &operation, sink)
        }
        None => start(&service, &operation, LogSink::new("log")),
    };
    let abort = handle.abort_handle();

    let outcome = tokio::select! {
        joined = handle => {
            joined.map_err(|e| CliError::stream_aborted(operation.name(), e.to_string()))?
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping stream...");
            abort.abort();
            return Err(CliError::stream_aborted(operation.name(), "interrupted").into());
        }
    };

    let timer = match operation {
        Operation::Get => service.get_timer(),
        Operation::Search(_) => service.search_timer(),
    };
    let summary = StreamSummary {
        operation: operation.name().to_string(),
        status: outcome.status(),
        written: outcome.written(),
        elapsed: started.elapsed(),
        timer_name: timer.name().to_string(),
        timer: timer.snapshot(),
    };
    summary.print_summary();

    match outcome {
        RelayOutcome::Completed { written } => {
            info!(operation = operation.name(), written, "Stream finished");
            Ok(())
        }
        RelayOutcome::Failed { written, error } => {
            Err(CliError::stream_failed(operation.name(), written, error).into())
        }
    }
}

fn start<K>(service: &MoviesStreamService, operation: &Operation, sink: K) -> JoinHandle<RelayOutcome>
where
    K: RecordSink<GrpcMovie> + Send + 'static,
{
    match operation {
        Operation::Get => service.get(sink),
        Operation::Search(text) => service.search(
            SearchRequest {
                search_text: text.clone(),
            },
            sink,
        ),
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
