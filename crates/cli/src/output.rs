use crate::error::CliError;
use model::execution::report::{PhaseStatus, PipelineOutcome, PipelineReport};
use serde::Serialize;

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(json)
}

pub async fn write_report(report: &PipelineReport, path: &str) -> Result<(), CliError> {
    let report_json = to_json(report)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = to_json(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_summary(report: &PipelineReport) {
    println!("Run '{}' of pipeline '{}':", report.run_id, report.pipeline);
    println!("-----------------------------");
    for phase in &report.phases {
        let status = match phase.status {
            PhaseStatus::Completed => "ok",
            PhaseStatus::Failed => "FAILED",
        };
        println!(
            "{:<22} {:<7} {:>3} stmt  {:>8.2}s",
            phase.name,
            status,
            phase.results.len(),
            phase.elapsed.as_secs_f64()
        );
        for failure in phase.failures() {
            let detail = failure
                .error()
                .map(ToString::to_string)
                .unwrap_or_default();
            println!("    {}: {}", failure.statement(), detail);
        }
    }
    println!("-----------------------------");
    println!("{:<22} {}", "Result", outcome_line(&report.outcome));
    println!("{:<22} {:.2}s", "Elapsed", report.elapsed.as_secs_f64());
}

fn outcome_line(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Completed => "completed".to_string(),
        PipelineOutcome::Failed { phase } => format!("failed in phase '{phase}'"),
        PipelineOutcome::Cancelled { before_phase } => {
            format!("interrupted before phase '{before_phase}'")
        }
    }
}
