use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use crate::batch::{BatchAction, BatchRunner, ProgressSink, SummaryTarget};
use crate::capture::{CaptureAction, CaptureConfig};
use crate::download::DownloadAction;
use crate::store::load_links;
use crate::types::{BatchEvent, StreamEvent, StreamKind};

/// Directory for fetched page text, relative to the output root.
pub const DOWNLOAD_DIR: &str = "downloaded_pages";
/// Directory for page captures, relative to the output root.
pub const SCREENSHOT_DIR: &str = "screenshots";

/// Which per-item behaviors a run launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Pages,
    Screenshots,
    Both,
}

impl RunMode {
    fn wants_pages(self) -> bool {
        matches!(self, RunMode::Pages | RunMode::Both)
    }

    fn wants_screenshots(self) -> bool {
        matches!(self, RunMode::Screenshots | RunMode::Both)
    }

    fn stream_count(self) -> usize {
        usize::from(self.wants_pages()) + usize::from(self.wants_screenshots())
    }
}

/// Everything one batch invocation needs. The link file is the only input
/// shared between streams, and it is read-only.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub links_file: PathBuf,
    pub base_url: String,
    pub keyword: Option<String>,
    pub mode: RunMode,
    pub extension: String,
    pub output_root: PathBuf,
    pub capture: CaptureConfig,
}

/// Owns the runtime thread of one run and hands its tagged event stream to
/// a single observer. The fetch and capture streams run concurrently with
/// independent progress counters.
pub struct BatchHandle {
    event_rx: mpsc::Receiver<StreamEvent>,
    streams: usize,
}

impl BatchHandle {
    pub fn spawn(plan: BatchPlan) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let streams = plan.mode.stream_count();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            runtime.block_on(async move {
                let mut tasks = Vec::new();
                if plan.mode.wants_pages() {
                    let plan = plan.clone();
                    let tx = event_tx.clone();
                    tasks.push(tokio::spawn(run_stream(StreamKind::Fetch, plan, tx)));
                }
                if plan.mode.wants_screenshots() {
                    let plan = plan.clone();
                    let tx = event_tx.clone();
                    tasks.push(tokio::spawn(run_stream(StreamKind::Capture, plan, tx)));
                }
                for task in tasks {
                    let _ = task.await;
                }
            });
        });

        Self { event_rx, streams }
    }

    /// Number of streams this run launched; the observer sees that many
    /// `Finished` events.
    pub fn stream_count(&self) -> usize {
        self.streams
    }

    /// Block until the next event; `None` once every stream is done and
    /// the sender side is gone.
    pub fn recv(&self) -> Option<StreamEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<StreamEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn run_stream(kind: StreamKind, plan: BatchPlan, tx: mpsc::Sender<StreamEvent>) {
    let sink = TaggedSink { kind, tx };

    // Each stream loads the file itself; items are owned by one runner
    // invocation and never shared.
    let (items, skipped) = match load_links(&plan.links_file, plan.keyword.as_deref(), &plan.base_url)
    {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!(
                "{kind} stream cannot load {}: {err}",
                plan.links_file.display()
            );
            sink.emit(BatchEvent::Log {
                message: format!("cannot load {}: {err}", plan.links_file.display()),
            });
            sink.emit(BatchEvent::Finished {
                results: Vec::new(),
            });
            return;
        }
    };

    let action: Box<dyn BatchAction> = match kind {
        StreamKind::Fetch => Box::new(DownloadAction::new(
            plan.output_root.join(DOWNLOAD_DIR),
            plan.extension.clone(),
        )),
        StreamKind::Capture => Box::new(CaptureAction::new(
            plan.capture.clone(),
            plan.output_root.join(SCREENSHOT_DIR),
        )),
    };

    let runner = match kind {
        StreamKind::Fetch => BatchRunner::new().with_summary(SummaryTarget {
            dir: plan.output_root.clone(),
            filename: format!("full_links.{}", plan.extension),
        }),
        StreamKind::Capture => BatchRunner::new(),
    };

    runner.run(&items, &skipped, action.as_ref(), &sink).await;
}

struct TaggedSink {
    kind: StreamKind,
    tx: mpsc::Sender<StreamEvent>,
}

impl ProgressSink for TaggedSink {
    fn emit(&self, event: BatchEvent) {
        let _ = self.tx.send(StreamEvent {
            stream: self.kind,
            event,
        });
    }
}
