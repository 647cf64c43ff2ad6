use std::fs;

use pagegrab_core::LinkRecord;
use pagegrab_engine::{load_links, save_links, StoreError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    grab_logging::initialize_for_tests();
}

fn record(href: Option<&str>, title: Option<&str>) -> LinkRecord {
    LinkRecord {
        href: href.map(str::to_string),
        title: title.map(str::to_string),
    }
}

#[test]
fn save_writes_one_fixed_shape_line_per_record() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let records = [
        record(Some("/a"), Some("A")),
        record(Some("https://other.org/x"), None),
        record(None, Some("no link here")),
    ];

    let path = save_links(&records, "https://example.com", temp.path(), "txt").unwrap();
    assert_eq!(path.file_name().unwrap(), "links.txt");

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "№1, https://example.com/a - A\n\
         №2, https://other.org/x - no title\n\
         №3, no target - no link here\n"
    );
}

#[test]
fn load_of_saved_records_round_trips_resolved_urls() {
    let temp = TempDir::new().unwrap();
    let records = [
        record(Some("/news/"), Some("News")),
        record(Some("https://other.org/x"), Some("X")),
        record(Some("/misc/page/"), None),
    ];

    let path = save_links(&records, "https://example.com", temp.path(), "txt").unwrap();
    let (items, skipped) = load_links(&path, None, "https://example.com").unwrap();

    let urls: Vec<_> = items
        .iter()
        .filter_map(|item| item.resolved_url.as_deref())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/news/",
            "https://other.org/x",
            "https://example.com/misc/page/",
        ]
    );
    assert!(skipped.is_empty());
}

#[test]
fn sentinel_lines_come_back_as_skipped() {
    let temp = TempDir::new().unwrap();
    let records = [record(None, Some("dangling")), record(Some("/ok/"), Some("ok"))];

    let path = save_links(&records, "https://example.com", temp.path(), "txt").unwrap();
    let (items, skipped) = load_links(&path, None, "https://example.com").unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].raw_line, "№1, no target - dangling");
}

#[test]
fn keyword_filter_narrows_the_batch() {
    let temp = TempDir::new().unwrap();
    let records = [
        record(Some("/report/2024/"), Some("Annual Report")),
        record(Some("/misc/"), Some("Misc")),
    ];

    let path = save_links(&records, "https://example.com", temp.path(), "txt").unwrap();
    let (items, skipped) = load_links(&path, Some("report"), "https://example.com").unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].resolved_url.as_deref(),
        Some("https://example.com/report/2024/")
    );
    assert!(skipped.is_empty());
}

#[test]
fn missing_link_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let result = load_links(&temp.path().join("absent.txt"), None, "https://example.com");
    assert!(matches!(result, Err(StoreError::Io { .. })));
}

#[test]
fn invalid_keyword_pattern_is_fatal() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("links.txt");
    fs::write(&path, "№1, https://example.com/a - A\n").unwrap();

    let result = load_links(&path, Some("(unclosed"), "https://example.com");
    assert!(matches!(result, Err(StoreError::Pattern(_))));
}
