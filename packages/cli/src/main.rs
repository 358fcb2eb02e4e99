#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crash analysis battery.
//!
//! Uses `indicatif-log-bridge` (via [`crash_analysis_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the battery progress bar never fight for the terminal.

mod interactive;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use crash_analysis::CrashTables;
use crash_analysis::queries::run_query;
use crash_analysis_cli_utils::{IndicatifProgress, MultiProgress};
use crash_analysis_config::{AnalysisConfig, OutputTarget, config_path};
use crash_analysis_database::OutputFormat;
use crash_analysis_models::{QueryId, QueryReport, ReportStatus};

#[derive(Parser)]
#[command(name = "crash_analysis", about = "Crash data analysis battery")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the input tables and run the query battery
    Run {
        /// Config file (overrides `CRASH_ANALYSIS_CONFIG` env var)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Comma-separated list of query ids or numbers to run (default: all)
        #[arg(long)]
        queries: Option<String>,
        /// Write a JSON report of every query outcome to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run a single query
    Query {
        /// Query id (e.g., "`speeding_makes`") or number (1-10)
        query: String,
        /// Config file (overrides `CRASH_ANALYSIS_CONFIG` env var)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output path (overrides the configured `OUTPUT_PATH`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format, `csv` or `json` (overrides `FILE_FORMAT`)
        #[arg(long)]
        format: Option<String>,
    },
    /// List all queries
    Queries,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crash_analysis_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Queries => list_queries(),
        Commands::Run {
            config,
            queries,
            report,
        } => {
            let config = load_config(config)?;
            let queries = match queries {
                Some(list) => parse_query_list(&list)?,
                None => QueryId::all(),
            };
            let tables = load_tables(&config)?;
            let reports = run_with_progress(&multi, &tables, &config, &queries);
            print_reports(&reports);
            if let Some(path) = report {
                write_report(&path, &reports)?;
            }
        }
        Commands::Query {
            query,
            config,
            output,
            format,
        } => {
            let query = QueryId::from_key(&query)
                .ok_or_else(|| format!("Unknown query '{query}'. Run `queries` to list them."))?;
            let config = load_config(config)?;
            let mut target = config.output_target(query);
            if let Some(format) = format {
                target.format = OutputFormat::parse(&format)?;
                if output.is_none() {
                    target.path.set_extension(target.format.extension());
                }
            }
            if let Some(path) = output {
                target = OutputTarget::new(path, target.format);
            }

            let tables = load_tables(&config)?;
            let outcome = run_query(&tables, query, Some(&target))?;
            println!("Q{} {query}: {outcome}", query.number());
            println!("  -> {}", target.path.display());
        }
    }

    Ok(())
}

fn list_queries() {
    println!("{:<4} {:<28} DESCRIPTION", "#", "ID");
    println!("{}", "-".repeat(100));
    for query in QueryId::all() {
        println!(
            "{:<4} {:<28} {}",
            query.number(),
            query.as_ref(),
            query.description()
        );
    }
}

fn load_config(explicit: Option<PathBuf>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    Ok(AnalysisConfig::load(&path)?)
}

fn load_tables(config: &AnalysisConfig) -> Result<CrashTables, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let tables = CrashTables::load(&config.inputs)?;
    let counts = tables.row_counts()?;
    let summary: Vec<String> = counts
        .iter()
        .map(|(table, rows)| format!("{table}={rows}"))
        .collect();
    log::info!(
        "Loaded all input tables in {:.1}s ({})",
        start.elapsed().as_secs_f64(),
        summary.join(", ")
    );
    Ok(tables)
}

/// Parses a comma-separated list of query ids or numbers.
fn parse_query_list(list: &str) -> Result<Vec<QueryId>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|key| QueryId::from_key(key).ok_or_else(|| format!("Unknown query '{key}'")))
        .collect()
}

fn run_with_progress(
    multi: &MultiProgress,
    tables: &CrashTables,
    config: &AnalysisConfig,
    queries: &[QueryId],
) -> Vec<QueryReport> {
    let start = Instant::now();
    let progress = IndicatifProgress::steps_bar(multi, "Queries", queries.len() as u64);
    let reports = crash_analysis::run_battery(tables, config, queries, &*progress);
    log::info!(
        "Battery finished in {:.1}s",
        start.elapsed().as_secs_f64()
    );
    reports
}

fn print_reports(reports: &[QueryReport]) {
    println!();
    for report in reports {
        let query = report.query;
        match &report.status {
            ReportStatus::Succeeded { outcome } => {
                println!("Q{:<3} {:<28} {outcome}", query.number(), query.as_ref());
            }
            ReportStatus::Failed { error } => {
                println!(
                    "Q{:<3} {:<28} FAILED: {error}",
                    query.number(),
                    query.as_ref()
                );
            }
        }
    }
}

fn write_report(path: &Path, reports: &[QueryReport]) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    log::info!("Wrote report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_list_accepts_ids_and_numbers() {
        assert_eq!(
            parse_query_list("1, alcohol_zip_codes,10,").unwrap(),
            [
                QueryId::MaleFatalities,
                QueryId::AlcoholZipCodes,
                QueryId::SpeedingMakes
            ]
        );
        assert!(parse_query_list("1,nope").is_err());
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::parse_from([
            "crash_analysis",
            "run",
            "--config",
            "cfg.toml",
            "--queries",
            "3,4",
        ]);
        assert!(matches!(
            cli.command,
            Some(Commands::Run { config: Some(c), queries: Some(q), report: None })
                if c == Path::new("cfg.toml") && q == "3,4"
        ));
    }

    #[test]
    fn report_is_written_as_json_array() {
        let path = std::env::temp_dir()
            .join("crash_analysis_cli")
            .join("report.json");
        let reports = vec![QueryReport {
            query: QueryId::TwoWheelerCrashes,
            output: None,
            status: ReportStatus::Failed {
                error: "Column not found: VEH_BODY_STYL_ID".to_string(),
            },
        }];
        write_report(&path, &reports).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<QueryReport> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, reports);
    }
}
