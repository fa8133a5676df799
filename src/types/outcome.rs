use std::fmt::Display;

use crate::result::ItemError;

/// Result of processing a single playlist item
#[derive(Debug)]
pub enum RunOutcome {
    /// The audio file has been produced during this run
    Completed {
        /// A raw file left by a previous run was converted instead of downloading it again
        reused_raw: bool,
    },

    /// The audio file already existed, nothing was done
    Skipped,

    Failed(ItemError),
}

/// Aggregation of all the item outcomes of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped: usize,
    /// Title and reason of every failed item, in processing order
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    pub fn record(&mut self, title: &str, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Completed { .. } => self.completed += 1,
            RunOutcome::Skipped => self.skipped += 1,
            RunOutcome::Failed(err) => self
                .failures
                .push((title.to_owned(), error_chain(&err))),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.completed + self.skipped + self.failed()
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} items: {} completed, {} skipped, {} failed",
            self.total(),
            self.completed,
            self.skipped,
            self.failed()
        )?;
        for (title, reason) in &self.failures {
            writeln!(f, "\t{title}: {reason}")?;
        }
        Ok(())
    }
}

/// Render an error along with all its sources on one line
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        msg.push_str(": ");
        msg.push_str(&err.to_string());
        source = err.source();
    }
    msg
}
