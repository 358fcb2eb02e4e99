//! Menu-driven battery runner using `dialoguer`, for running queries
//! without memorizing CLI flags.

use std::path::PathBuf;

use crash_analysis_cli_utils::MultiProgress;
use crash_analysis_config::{DEFAULT_CONFIG_FILE, config_path};
use crash_analysis_models::QueryId;
use dialoguer::{Confirm, Input, MultiSelect};

/// Prompts for a config file and a set of queries, then runs them.
///
/// # Errors
///
/// Returns an error if a prompt fails, or if the configuration or input
/// tables cannot be loaded.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let default_config = config_path(None);
    let config: String = Input::new()
        .with_prompt("Config file")
        .default(default_config.display().to_string())
        .interact_text()?;
    let config = if config.trim().is_empty() {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    } else {
        PathBuf::from(config.trim())
    };

    let all = QueryId::all();
    let labels: Vec<String> = all
        .iter()
        .map(|q| format!("{:>2}. {}", q.number(), q.description()))
        .collect();
    let defaults = vec![true; labels.len()];

    let selected = MultiSelect::new()
        .with_prompt("Select queries to run (space=toggle, a=all, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    if selected.is_empty() {
        println!("No queries selected.");
        return Ok(());
    }
    let queries: Vec<QueryId> = selected.into_iter().map(|i| all[i]).collect();

    let config = crate::load_config(Some(config))?;
    let tables = crate::load_tables(&config)?;
    let reports = crate::run_with_progress(multi, &tables, &config, &queries);
    crate::print_reports(&reports);

    let save = Confirm::new()
        .with_prompt("Save a JSON report?")
        .default(false)
        .interact()?;
    if save {
        let path: String = Input::new()
            .with_prompt("Report path")
            .default("output/report.json".to_string())
            .interact_text()?;
        crate::write_report(PathBuf::from(path).as_path(), &reports)?;
    }

    Ok(())
}
