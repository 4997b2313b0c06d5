//! CLI entrypoint for chorus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;
mod output;

use anyhow::{Result, bail};
use args::{Cli, OutputFormat};
use chorus_application::{ChorusInput, RunChorusUseCase, StreamChorusUseCase};
use chorus_domain::InvocationRequest;
use chorus_infrastructure::{ConfigLoader, RoutingGateway, encode_frame};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting chorus");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // === Dependency Injection ===
    let registry = Arc::new(config.to_registry()?);
    let params = config.to_execution_params();
    let gateway = Arc::new(RoutingGateway::from_config(&config.providers));

    let question = match cli.question {
        Some(q) => q,
        None => bail!("Question is required."),
    };

    let request =
        InvocationRequest::from_user_message(cli.system.clone().unwrap_or_default(), &question);
    let input = ChorusInput::new(request).with_selection(cli.model.clone());

    // Streaming mode: write SSE frames to stdout as they arrive
    if cli.stream {
        let use_case = StreamChorusUseCase::new(gateway, registry, params);
        let mut events = use_case.execute(input);

        let mut stdout = std::io::stdout();
        while let Some(event) = events.recv().await {
            let frame = encode_frame(&event)?;
            stdout.write_all(frame.as_bytes())?;
            stdout.flush()?;
        }
        return Ok(());
    }

    // Batch mode
    if !cli.quiet {
        let selection = if cli.model.is_empty() {
            registry
                .default_selection()
                .iter()
                .map(|m| m.name.clone())
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            cli.model.join(", ")
        };
        eprintln!();
        eprintln!("Question: {}", question);
        eprintln!("Models: {}", selection);
        eprintln!();
    }

    let use_case = RunChorusUseCase::new(gateway, registry, params);
    let report = use_case.execute(input).await?;

    let rendered = match cli.output {
        OutputFormat::Full => output::format_full(&question, &report),
        OutputFormat::Answer => output::format_answer(&report),
        OutputFormat::Json => output::format_json(&report),
    };

    println!("{}", rendered);

    Ok(())
}
