use std::path::{Path, PathBuf};

use pagegrab_core::{keyword_matcher, LinkRecord};
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::store::{save_links, StoreError};
use crate::types::FetchError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch the seed page and collect its anchors in document order.
pub async fn extract_links(
    fetcher: &dyn Fetcher,
    page_url: &str,
    filter: Option<&Regex>,
) -> Result<Vec<LinkRecord>, FetchError> {
    let page = fetcher.fetch(page_url).await?;
    let records = collect_anchors(&page.body, filter);
    log::info!("extracted {} anchor(s) from {}", records.len(), page_url);
    Ok(records)
}

/// Collect every `<a>` element of a document. With a filter, keep only
/// anchors whose href matches it; title text is never filtered, and an
/// anchor without an href has nothing to match.
pub fn collect_anchors(html: &str, filter: Option<&Regex>) -> Vec<LinkRecord> {
    let document = Html::parse_document(html);
    let Ok(anchor) = Selector::parse("a") else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for element in document.select(&anchor) {
        let href = element
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string);

        if let Some(matcher) = filter {
            match href.as_deref() {
                Some(href) if matcher.is_match(href) => {}
                _ => continue,
            }
        }

        let title = element.value().attr("title").map(str::to_string);
        records.push(LinkRecord { href, title });
    }
    records
}

/// Blocking facade for the extraction flow: fetch the seed page, collect
/// anchors, persist the reviewable link file next to the other artifacts.
/// The seed URL doubles as the resolution base.
pub fn extract_to_file(
    seed_url: &str,
    filter: Option<&str>,
    extension: &str,
    out_dir: &Path,
) -> Result<PathBuf, ExtractError> {
    let matcher = filter.map(keyword_matcher).transpose()?;
    let fetcher = ReqwestFetcher::new(FetchSettings::extraction());
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let records = runtime.block_on(extract_links(&fetcher, seed_url, matcher.as_ref()))?;
    Ok(save_links(&records, seed_url, out_dir, extension)?)
}

#[cfg(test)]
mod tests {
    use super::collect_anchors;
    use pagegrab_core::keyword_matcher;

    const PAGE: &str = r#"
    <html><body>
        <a href="/news/" title="News">headlines</a>
        <a href="https://example.com/About">about</a>
        <a name="anchor-without-target">just a name</a>
    </body></html>
    "#;

    #[test]
    fn anchors_are_collected_in_document_order() {
        let records = collect_anchors(PAGE, None);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].href.as_deref(), Some("/news/"));
        assert_eq!(records[0].title.as_deref(), Some("News"));
        assert_eq!(records[1].title, None);
        assert_eq!(records[2].href, None);
    }

    #[test]
    fn filter_matches_href_case_insensitively() {
        let matcher = keyword_matcher("about").unwrap();
        let records = collect_anchors(PAGE, Some(&matcher));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].href.as_deref(), Some("https://example.com/About"));
    }

    #[test]
    fn filter_drops_anchors_without_href() {
        let matcher = keyword_matcher(".").unwrap();
        let records = collect_anchors(PAGE, Some(&matcher));
        assert!(records.iter().all(|r| r.href.is_some()));
    }
}
