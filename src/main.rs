use anyhow::{Context, Result};
use clap::Parser;
use maize_stats::cli::{Cli, OutputFormat};
use maize_stats::csv_output::CsvRenderer;
use maize_stats::json_output::JsonRenderer;
use maize_stats::pipeline::run_analysis;
use maize_stats::report::ReportRenderer;
use maize_stats::text_output::TextRenderer;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn renderer(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Csv => Box::new(CsvRenderer),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = args
        .resolve_config()
        .context("Invalid analysis configuration")?;

    let report = run_analysis(&args.input, &config)
        .with_context(|| format!("Analysis of {} failed", args.input.display()))?;

    let output = renderer(args.format).render(&report);
    if output.ends_with('\n') {
        print!("{}", output);
    } else {
        println!("{}", output);
    }
    Ok(())
}
