// Entry point and high-level CLI flow.
//
// One run reads every input file, merges and classifies the orders, prints a
// per-region summary and writes the dispatch PDF (plus optional CSV and JSON
// exports). Any read, font or render failure aborts the run.
use anyhow::{Context, Result};
use clap::Parser;
use dispatch_sheets::cli::Cli;
use dispatch_sheets::render::font::FontFace;
use dispatch_sheets::render::pdf::PdfRenderer;
use dispatch_sheets::render::{Report, ReportRenderer};
use dispatch_sheets::{loader, normalize, output, regions, reports, util};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_target(false)
        .init();

    regions::validate_city_table(regions::CITY_TABLE).context("city reference table")?;

    if cli.inputs.is_empty() {
        println!("No order files given. Nothing to do.");
        return Ok(());
    }

    let date = util::local_date(&cli.timezone)?;
    let font = FontFace::resolve(cli.font.as_deref()).context("Failed to load font")?;

    let (tables, load_report) =
        loader::load_inputs(&cli.inputs).context("Failed to read order files")?;
    println!(
        "Processing orders... ({} files, {} sheets, {} rows read)",
        util::format_int(load_report.files),
        util::format_int(load_report.tables),
        util::format_int(load_report.total_rows)
    );

    let merged = normalize::prepare(&tables);
    if merged.records.is_empty() {
        warn!("every input row is empty");
        println!("No order rows found. No document written.");
        return Ok(());
    }
    let columns = merged.display_fields();
    println!(
        "Merged {} order lines across {} columns.\n",
        util::format_int(merged.records.len()),
        util::format_int(merged.columns.len())
    );

    let groups = reports::group_by_region(merged.records);
    let summary = reports::generate_summary(&date, load_report.files, load_report.tables, &groups);
    println!("Orders by Region ({date})\n");
    output::preview_table_rows(&summary.regions, cli.preview_rows);

    let report = Report {
        groups: &groups,
        columns: &columns,
        date: &date,
        brand: &cli.brand,
    };
    let document = PdfRenderer::new(font)
        .render(&report)
        .context("Failed to render dispatch document")?;
    let path = output::document_path(cli.output.as_deref(), &cli.out_dir, &date);
    std::fs::write(&path, document)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Dispatch sheets saved to {}", path.display());

    if let Some(csv_path) = &cli.csv {
        output::write_groups_csv(csv_path, &columns, &groups)
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
        println!("Merged table exported to {}", csv_path.display());
    }
    if let Some(summary_path) = &cli.summary {
        output::write_json(summary_path, &summary)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        println!("Summary saved to {}", summary_path.display());
    }
    Ok(())
}
