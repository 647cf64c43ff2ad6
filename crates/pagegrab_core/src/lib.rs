//! Pagegrab core: pure link-pipeline logic, no IO.
mod linkfile;
mod progress;
mod resolve;

pub use linkfile::{
    classify_lines, extract_url_token, format_link_line, keyword_matcher, resolve_records,
    BatchItem, LinkRecord, ResolvedLink, SkippedLine, NO_TARGET, NO_TITLE,
};
pub use progress::progress_percent;
pub use resolve::{resolve, ResolveError};
