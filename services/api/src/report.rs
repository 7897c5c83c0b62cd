use chrono::Local;
use clap::Args;
use cpi_report::config::AppConfig;
use cpi_report::error::AppError;
use cpi_report::insights::analyze;
use cpi_report::render::{insight_press_release, press_release_docx};
use cpi_report::sources::{parse_upload, LocalWorkbookSource};
use cpi_report::statistics::{compute_statistics, StatisticsPreset, StatisticsResult};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct StatisticsArgs {
    /// Price-index workbook (.xlsx, .xls or .csv). Defaults to CPI_DATASET_PATH.
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Statistics preset: press-release or interesting
    #[arg(long, default_value = "press-release")]
    pub(crate) preset: StatisticsPreset,
    /// Worksheet name (defaults to CPI_DATASET_SHEET, then the first sheet)
    #[arg(long)]
    pub(crate) sheet: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct PressReleaseArgs {
    /// Price-index workbook (.xlsx, .xls or .csv). Defaults to CPI_DATASET_PATH.
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Destination .docx file (defaults to cpi_press_release_<date>.docx)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Worksheet name (defaults to CPI_DATASET_SHEET, then the first sheet)
    #[arg(long)]
    pub(crate) sheet: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct InsightsArgs {
    /// Any spreadsheet (.xlsx, .xls or .csv)
    #[arg(long)]
    pub(crate) input: PathBuf,
}

fn load_statistics(
    config: &AppConfig,
    input: Option<PathBuf>,
    sheet: Option<String>,
    preset: StatisticsPreset,
) -> Result<StatisticsResult, AppError> {
    let path = input.unwrap_or_else(|| config.dataset.path.clone());
    let sheet = sheet.or_else(|| config.dataset.sheet.clone());
    let table = LocalWorkbookSource::new(path)
        .with_sheet(sheet)
        .with_layout(config.dataset.layout())
        .load_blocking()?;
    Ok(compute_statistics(&table, preset)?)
}

pub(crate) fn run_statistics(args: StatisticsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let statistics = load_statistics(&config, args.input, args.sheet, args.preset)?;
    println!("{}", serde_json::to_string_pretty(&statistics)?);
    Ok(())
}

pub(crate) fn run_press_release(args: PressReleaseArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let statistics = load_statistics(
        &config,
        args.input,
        args.sheet,
        StatisticsPreset::PressRelease,
    )?;

    let today = Local::now().date_naive();
    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("cpi_press_release_{}.docx", today.format("%Y%m%d")))
    });
    let document = press_release_docx(&statistics, today)?;
    std::fs::write(&output, document)?;

    println!(
        "Press release written to {} ({} statistics)",
        output.display(),
        statistics.len()
    );
    Ok(())
}

pub(crate) fn run_insights(args: InsightsArgs) -> Result<(), AppError> {
    let text = insights_report(&args.input)?;
    println!("{text}");
    Ok(())
}

fn insights_report(input: &Path) -> Result<String, AppError> {
    let bytes = std::fs::read(input)?;
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let table = parse_upload(&file_name, &bytes)?;
    let insights = analyze(&table);
    let press_release = insight_press_release(&insights, Local::now().naive_local());
    Ok(format!(
        "{}\n{press_release}",
        serde_json::to_string_pretty(&insights)?
    ))
}
