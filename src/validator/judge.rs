use super::Verdict;
use crate::errors::DepMergeError;
use crate::toolchain::TestRun;

/// Summary line every jest run prints.
pub const SUMMARY_MARKER: &str = "Tests:";
pub const FAILURE_TOKEN: &str = "failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum JudgeMode {
    /// Pass when the output has a "Tests:" summary and never says "failed"
    #[default]
    Marker,
    /// Pass when the test command exits with status zero
    ExitCode,
}

/// Decide the verdict of a test run that ran to completion.
///
/// In marker mode this is a plain substring search over the whole output,
/// so a passing run that happens to log the word "failed" is judged Failed.
/// A clean summary only passes when the command also exited zero.
pub fn judge(run: &TestRun, mode: JudgeMode) -> Verdict {
    match mode {
        JudgeMode::Marker => {
            if !run.output.contains(SUMMARY_MARKER) {
                return Verdict::Errored(DepMergeError::TestRun(format!(
                    "no \"{}\" summary in test output (exit {})",
                    SUMMARY_MARKER,
                    if run.success { "ok" } else { "failure" }
                )));
            }
            if run.output.contains(FAILURE_TOKEN) {
                Verdict::Failed
            } else if !run.success {
                // e.g. a coverage threshold miss after a clean summary
                Verdict::Errored(DepMergeError::TestRun(
                    "test command exited non-zero without reporting failures".to_string(),
                ))
            } else {
                Verdict::Passed
            }
        }
        JudgeMode::ExitCode => {
            if run.success {
                Verdict::Passed
            } else {
                Verdict::Failed
            }
        }
    }
}
