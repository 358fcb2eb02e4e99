//! Runs a batch of queries against one loaded context.

use crash_analysis_config::AnalysisConfig;
use crash_analysis_models::{QueryId, QueryReport, ReportStatus};

use crate::CrashTables;
use crate::progress::ProgressCallback;
use crate::queries::run_query;

/// Runs `queries` in order, writing each derived table to the output target
/// `config` assigns it.
///
/// A failing query is logged and reported as [`ReportStatus::Failed`]; the
/// remaining queries still run.
#[must_use]
pub fn run_battery(
    tables: &CrashTables,
    config: &AnalysisConfig,
    queries: &[QueryId],
    progress: &dyn ProgressCallback,
) -> Vec<QueryReport> {
    progress.set_total(queries.len() as u64);

    let mut reports = Vec::with_capacity(queries.len());
    for &query in queries {
        progress.set_message(format!("Q{} {query}", query.number()));
        let target = config.output_target(query);

        let (output, status) = match run_query(tables, query, Some(&target)) {
            Ok(outcome) => {
                log::info!("Q{} {query}: {outcome}", query.number());
                (
                    Some(target.path.display().to_string()),
                    ReportStatus::Succeeded { outcome },
                )
            }
            Err(e) => {
                log::error!("Q{} {query} failed: {e}", query.number());
                (
                    None,
                    ReportStatus::Failed {
                        error: e.to_string(),
                    },
                )
            }
        };

        reports.push(QueryReport {
            query,
            output,
            status,
        });
        progress.inc(1);
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        log::warn!("{failed} of {} queries failed", reports.len());
    }
    progress.finish(format!(
        "{} of {} queries succeeded",
        reports.len() - failed,
        reports.len()
    ));

    reports
}
