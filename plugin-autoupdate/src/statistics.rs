use crate::error::UpdaterError;
use std::path::PathBuf;

/// Result of processing a single configured plugin.
#[derive(Debug)]
pub enum ItemOutcome {
    Downloaded(PathBuf),
    UpToDate,
    Skipped(String),
    Failed(UpdaterError),
}

/// Aggregated outcomes of one updater run.
#[derive(Debug, Default)]
pub struct Statistics {
    pub downloaded: usize,
    pub up_to_date: usize,
    pub problems: Vec<ProblemReport>,
    pub failures: Vec<ErrorReport>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, task_name: impl Into<String>, outcome: ItemOutcome) {
        let task_name = task_name.into();

        match outcome {
            ItemOutcome::Downloaded(path) => {
                tracing::trace!("{} wrote {}", task_name, path.display());
                self.downloaded += 1;
            }
            ItemOutcome::UpToDate => self.up_to_date += 1,
            ItemOutcome::Skipped(reason) => self.problems.push(ProblemReport { task_name, reason }),
            ItemOutcome::Failed(error) => self.failures.push(ErrorReport { task_name, error }),
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.up_to_date + self.problems.len() + self.failures.len()
    }

    /// Report the run once, including the cause chain of every failure.
    pub fn log_summary(&self, routine: &str) {
        if !self.problems.is_empty() {
            tracing::info!("{}: skipped plugins:", routine);
            for problem in &self.problems {
                tracing::info!("- {}: {}", problem.task_name, problem.reason);
            }
        }

        if !self.failures.is_empty() {
            tracing::warn!("{}: failed plugins:", routine);
            for failure in &self.failures {
                tracing::warn!("- {}: {}", failure.task_name, failure.error);

                let mut src = std::error::Error::source(&failure.error);
                while let Some(err) = src {
                    tracing::warn!("  -> Caused by: {}", err);
                    src = err.source();
                }
            }
        }

        tracing::info!(
            "{}: checked {} plugins, {} downloaded, {} up to date, {} skipped, {} failed",
            routine,
            self.total(),
            self.downloaded,
            self.up_to_date,
            self.problems.len(),
            self.failures.len()
        );
    }
}

#[derive(Debug)]
pub struct ProblemReport {
    pub task_name: String,
    pub reason: String,
}

#[derive(Debug)]
pub struct ErrorReport {
    pub task_name: String,
    pub error: UpdaterError,
}
