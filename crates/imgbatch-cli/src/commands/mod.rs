pub mod apply;
pub mod list;
pub mod preview;

use imgbatch_core::{PipelineReport, StageOutcome};

/// One line per requested stage, e.g. `rotate: applied`.
pub(crate) fn describe_report(report: &PipelineReport) -> Vec<String> {
    [
        ("resize", &report.resize),
        ("rotate", &report.rotate),
        ("crop", &report.crop),
    ]
    .into_iter()
    .filter_map(|(stage, outcome)| match outcome {
        StageOutcome::Absent => None,
        StageOutcome::Applied => Some(format!("{stage}: applied")),
        StageOutcome::Skipped(reason) => Some(format!("{stage}: skipped ({reason})")),
    })
    .collect()
}
