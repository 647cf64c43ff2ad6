use std::path::PathBuf;
use std::sync::mpsc;

use async_trait::async_trait;
use pagegrab_core::{progress_percent, BatchItem, SkippedLine};

use crate::persist::AtomicFileWriter;
use crate::types::{ActionError, BatchEvent, BatchResult};

/// Observer for one batch run's progress and log stream.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: BatchEvent);
}

/// Bridges a run's events to a std mpsc channel; a dropped receiver never
/// fails the run.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<BatchEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<BatchEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: BatchEvent) {
        let _ = self.tx.send(event);
    }
}

/// A pluggable per-item behavior driven by the [`BatchRunner`].
#[async_trait]
pub trait BatchAction: Send + Sync {
    /// Short name used in log lines.
    fn describe(&self) -> &str;

    async fn run(&self, item: &BatchItem) -> Result<PathBuf, ActionError>;
}

/// Where the runner writes its per-line summary of resolved URLs.
#[derive(Debug, Clone)]
pub struct SummaryTarget {
    pub dir: PathBuf,
    pub filename: String,
}

/// Drives batch items through one action, isolating per-item failures,
/// reporting progress after every item and completion exactly once.
#[derive(Default)]
pub struct BatchRunner {
    summary: Option<SummaryTarget>,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, target: SummaryTarget) -> Self {
        self.summary = Some(target);
        self
    }

    pub async fn run(
        &self,
        items: &[BatchItem],
        skipped: &[SkippedLine],
        action: &dyn BatchAction,
        sink: &dyn ProgressSink,
    ) -> Vec<BatchResult> {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut summary = String::new();

        for (done, item) in items.iter().enumerate() {
            let outcome = match item.resolved_url.as_deref() {
                Some(url) => {
                    summary.push_str(&format!("Full URL: {url}\n"));
                    action.run(item).await
                }
                None => Err(ActionError::MissingTarget),
            };

            let target = item.resolved_url.as_deref().unwrap_or(&item.raw_line);
            match &outcome {
                Ok(path) => {
                    sink.emit(BatchEvent::Log {
                        message: format!("{} {target} -> {}", action.describe(), path.display()),
                    });
                }
                Err(err) => {
                    log::warn!("{} failed for {target}: {err}", action.describe());
                    sink.emit(BatchEvent::Log {
                        message: format!("{} failed for {target}: {err}", action.describe()),
                    });
                }
            }

            results.push(BatchResult {
                item: item.clone(),
                outcome,
            });
            sink.emit(BatchEvent::Progress {
                percent: progress_percent(done + 1, total),
            });
        }

        self.write_summary(&summary, sink);
        self.report_skipped(skipped, sink);

        sink.emit(BatchEvent::Finished { results: results.clone() });
        results
    }

    // A failed summary write is logged but must not swallow the completion
    // signal.
    fn write_summary(&self, summary: &str, sink: &dyn ProgressSink) {
        let Some(target) = &self.summary else {
            return;
        };
        let writer = AtomicFileWriter::new(target.dir.clone());
        match writer.write(&target.filename, summary.as_bytes()) {
            Ok(path) => sink.emit(BatchEvent::Log {
                message: format!("summary written to {}", path.display()),
            }),
            Err(err) => {
                log::error!("could not write summary {}: {err}", target.filename);
                sink.emit(BatchEvent::Log {
                    message: format!("could not write summary {}: {err}", target.filename),
                });
            }
        }
    }

    fn report_skipped(&self, skipped: &[SkippedLine], sink: &dyn ProgressSink) {
        if skipped.is_empty() {
            return;
        }
        sink.emit(BatchEvent::Log {
            message: format!("{} line(s) could not be classified:", skipped.len()),
        });
        for line in skipped {
            sink.emit(BatchEvent::Log {
                message: line.raw_line.trim().to_string(),
            });
        }
    }
}
