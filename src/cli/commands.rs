//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::output::{
    OutputFormat, RunReport, StdoutSink, format_config, format_run_report,
};
use crate::cli::parser::{Cli, Commands, RunArgs, SettingsArgs};
use crate::error::{IngestError, Result};
use crate::ingest::open_input;
use crate::scribe::{IngestOutcome, Scribe};
use crate::summarize::{SummarySink, create_summarizer};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Run(args) => cmd_run(args, format).await,
        Commands::Config(settings) => cmd_config(settings, format),
    }
}

fn cmd_config(settings: &SettingsArgs, format: OutputFormat) -> Result<String> {
    let config = settings.to_config();
    config.validate()?;
    format_config(&config, format)
}

async fn cmd_run(args: &RunArgs, format: OutputFormat) -> Result<String> {
    let config = args.settings.to_config();
    config.validate()?;
    config.log_summary();

    let summarizer = create_summarizer(&config.summarizer, &config.llm)?;
    let sink: Arc<dyn SummarySink> = Arc::new(StdoutSink::stdout(format));
    let scribe = Scribe::new(config, summarizer, sink)?;
    let mut reader = open_input(args.input.as_deref()).await?;
    scribe.start()?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut report = RunReport::default();
    let mut interrupted = false;
    loop {
        let next = tokio::select! {
            biased;
            _ = &mut shutdown => {
                interrupted = true;
                break;
            }
            next = reader.next_event() => next,
        };
        let Some(next) = next else {
            break;
        };

        match next {
            Ok(event) => {
                report.events += 1;
                match scribe.ingest_event(event) {
                    IngestOutcome::RoomFiltered | IngestOutcome::Blank => report.filtered += 1,
                    IngestOutcome::Duplicate => report.duplicates += 1,
                    IngestOutcome::Buffered | IngestOutcome::Triggered { .. } => {}
                }
            }
            Err(IngestError::Read(reason)) => {
                scribe.stop();
                let _ = scribe.join().await;
                return Err(IngestError::Read(reason).into());
            }
            Err(e) => {
                report.malformed += 1;
                warn!(error = %e, "skipping malformed event");
            }
        }
    }

    report.worker = if interrupted {
        info!("interrupted, shutting down");
        scribe.stop();
        scribe.join().await
    } else {
        info!(events = report.events, "end of input");
        if args.flush {
            let _ = scribe.flush();
        }
        let finish = scribe.finish();
        tokio::pin!(finish);
        tokio::select! {
            stats = &mut finish => stats,
            _ = &mut shutdown => {
                info!("interrupted, cancelling pending summaries");
                scribe.stop();
                finish.await
            }
        }
    };
    report.dropped = scribe.queue().dropped();

    format_run_report(&report, format)
}
