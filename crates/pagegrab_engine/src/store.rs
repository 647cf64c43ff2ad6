use std::fs;
use std::path::{Path, PathBuf};

use pagegrab_core::{
    classify_lines, format_link_line, keyword_matcher, resolve_records, BatchItem, LinkRecord,
    SkippedLine,
};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("link file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Serialize extracted anchors into `links.<extension>` under `dir`, one
/// `№<n>, <url> - <title>` line per anchor in extraction order. Fatal on
/// write failure; the link file is the pipeline's hand-off point.
pub fn save_links(
    records: &[LinkRecord],
    base_url: &str,
    dir: &Path,
    extension: &str,
) -> Result<PathBuf, StoreError> {
    let resolved = resolve_records(records, base_url);

    let mut buffer = String::new();
    for link in &resolved {
        buffer.push_str(&format_link_line(link));
        buffer.push('\n');
    }

    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let path = writer.write(&format!("links.{extension}"), buffer.as_bytes())?;
    log::info!("saved {} link(s) to {}", resolved.len(), path.display());
    Ok(path)
}

/// Read a link file back into batch items and skipped lines.
///
/// Lines not containing `keyword` are excluded from both buckets; every
/// remaining line lands in exactly one of them.
pub fn load_links(
    path: &Path,
    keyword: Option<&str>,
    base_url: &str,
) -> Result<(Vec<BatchItem>, Vec<SkippedLine>), StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let matcher = keyword.map(keyword_matcher).transpose()?;
    Ok(classify_lines(content.lines(), matcher.as_ref(), base_url))
}
