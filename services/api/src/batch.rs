use clap::Args;
use scheme_engine::config::AppConfig;
use scheme_engine::error::AppError;
use scheme_engine::telemetry;
use scheme_engine::workflows::scheme::{
    BatchSummary, SchemeBatchProcessor, SchemeImportError, SchemeSettings,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ComputeArgs {
    /// Scheme CSV export to recompute
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Write the updated export here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Charge the upper bound of every processing fee, ranged or not
    #[arg(long)]
    pub(crate) force_flexi: bool,
}

pub(crate) fn run_compute(args: ComputeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let summary = compute(&args, config.scheme)?;
    eprintln!("{}", summary_line(&summary));
    Ok(())
}

/// The flag can only switch flexi charging on; configuration may already have done so.
pub(crate) fn compute(
    args: &ComputeArgs,
    settings: SchemeSettings,
) -> Result<BatchSummary, AppError> {
    let force_flexi = args.force_flexi || settings.force_flexi;
    let processor = SchemeBatchProcessor::new(settings.with_force_flexi(force_flexi));
    let (table, summary) = processor.process_path(&args.input)?;

    let written = match &args.output {
        Some(path) => table.to_writer(BufWriter::new(File::create(path)?)),
        None => table.to_writer(io::stdout().lock()),
    };
    written.map_err(SchemeImportError::from)?;

    Ok(summary)
}

pub(crate) fn summary_line(summary: &BatchSummary) -> String {
    let mut line = format!(
        "{} rows read: {} updated, {} skipped",
        summary.rows_read, summary.rows_updated, summary.rows_skipped
    );
    if summary.degenerate > 0 {
        line.push_str(&format!(
            ", {} with no unsecured portion",
            summary.degenerate
        ));
    }
    line
}
