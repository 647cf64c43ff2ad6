use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;

use async_trait::async_trait;
use pagegrab_core::{BatchItem, SkippedLine};
use pagegrab_engine::{
    ActionError, BatchAction, BatchEvent, BatchRunner, ChannelProgressSink, FetchError,
    FetchFailureKind, SummaryTarget,
};
use tempfile::TempDir;

/// Succeeds for every URL except the poisoned one. Panics when invoked
/// for an item without a URL; the runner must not let that happen.
struct StubAction {
    poison: Option<String>,
}

impl StubAction {
    fn reliable() -> Self {
        Self { poison: None }
    }

    fn poisoned(url: impl Into<String>) -> Self {
        Self {
            poison: Some(url.into()),
        }
    }
}

#[async_trait]
impl BatchAction for StubAction {
    fn describe(&self) -> &str {
        "stub"
    }

    async fn run(&self, item: &BatchItem) -> Result<PathBuf, ActionError> {
        let url = item.resolved_url.as_deref().expect("runner passed a url");
        if self.poison.as_deref() == Some(url) {
            return Err(ActionError::Fetch(FetchError {
                kind: FetchFailureKind::HttpStatus(500),
                message: "injected failure".to_string(),
            }));
        }
        Ok(PathBuf::from(format!("artifact_{}", item.index)))
    }
}

fn items(count: usize) -> Vec<BatchItem> {
    (0..count)
        .map(|index| BatchItem {
            index,
            raw_line: format!("№{}, https://e.example/{index} - t", index + 1),
            resolved_url: Some(format!("https://e.example/{index}")),
        })
        .collect()
}

fn run_collecting(
    items: &[BatchItem],
    skipped: &[SkippedLine],
    action: &dyn BatchAction,
    runner: &BatchRunner,
) -> (Vec<pagegrab_engine::BatchResult>, Vec<BatchEvent>) {
    let (tx, rx) = mpsc::channel();
    let sink = ChannelProgressSink::new(tx);
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let results = runtime.block_on(runner.run(items, skipped, action, &sink));
    drop(sink);
    (results, rx.iter().collect())
}

fn progress_values(events: &[BatchEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            BatchEvent::Progress { percent } => Some(*percent),
            _ => None,
        })
        .collect()
}

fn finished_count(events: &[BatchEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, BatchEvent::Finished { .. }))
        .count()
}

#[test]
fn one_poisoned_item_does_not_abort_the_run() {
    let items = items(5);
    let action = StubAction::poisoned("https://e.example/2");
    let (results, events) = run_collecting(&items, &[], &action, &BatchRunner::new());

    assert_eq!(results.len(), 5);
    assert_eq!(results.iter().filter(|r| r.outcome.is_ok()).count(), 4);
    assert!(results[2].outcome.is_err());
    // Order is preserved even around the failure.
    assert_eq!(results[3].item.index, 3);

    assert_eq!(progress_values(&events), vec![20, 40, 60, 80, 100]);
    assert_eq!(finished_count(&events), 1);
}

#[test]
fn progress_is_monotonic_and_ends_at_one_hundred() {
    let items = items(7);
    let action = StubAction::reliable();
    let (_, events) = run_collecting(&items, &[], &action, &BatchRunner::new());

    let progress = progress_values(&events);
    assert_eq!(progress.len(), 7);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100));
}

#[test]
fn empty_batch_completes_without_progress() {
    let action = StubAction::reliable();
    let (results, events) = run_collecting(&[], &[], &action, &BatchRunner::new());

    assert!(results.is_empty());
    assert!(progress_values(&events).is_empty());
    assert_eq!(finished_count(&events), 1);
}

#[test]
fn item_without_target_fails_without_invoking_the_action() {
    let batch = vec![
        BatchItem {
            index: 0,
            raw_line: "№1, odd line".to_string(),
            resolved_url: None,
        },
        items(1).remove(0),
    ];
    let action = StubAction::reliable();
    let (results, events) = run_collecting(&batch, &[], &action, &BatchRunner::new());

    assert!(matches!(
        results[0].outcome,
        Err(ActionError::MissingTarget)
    ));
    assert!(results[1].outcome.is_ok());
    assert_eq!(progress_values(&events), vec![50, 100]);
}

#[test]
fn skipped_lines_are_reported_not_dropped() {
    let skipped = vec![SkippedLine {
        raw_line: "№2, not a link".to_string(),
    }];
    let action = StubAction::reliable();
    let (_, events) = run_collecting(&items(1), &skipped, &action, &BatchRunner::new());

    let logs: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            BatchEvent::Log { message } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert!(logs.iter().any(|m| m.contains("№2, not a link")));
}

#[test]
fn summary_lists_every_resolved_url_in_order() {
    let temp = TempDir::new().unwrap();
    let runner = BatchRunner::new().with_summary(SummaryTarget {
        dir: temp.path().to_path_buf(),
        filename: "full_links.txt".to_string(),
    });
    let items = items(3);
    let action = StubAction::poisoned("https://e.example/1");
    run_collecting(&items, &[], &action, &runner);

    // The summary records the resolved URL of every processed line, the
    // failed one included.
    let content = fs::read_to_string(temp.path().join("full_links.txt")).unwrap();
    assert_eq!(
        content,
        "Full URL: https://e.example/0\n\
         Full URL: https://e.example/1\n\
         Full URL: https://e.example/2\n"
    );
}
