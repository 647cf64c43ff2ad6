use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::resolve::resolve;

/// Marker written in the URL column for anchors that had no `href`.
pub const NO_TARGET: &str = "no target";
/// Marker written in the title column for anchors that had no `title`.
pub const NO_TITLE: &str = "no title";

/// One anchor element, in document order. Attributes that were absent in
/// the markup stay absent until serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub href: Option<String>,
    pub title: Option<String>,
}

/// A [`LinkRecord`] with its href resolved and a 1-based sequence number
/// assigned; the unit serialized into a link file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub sequence: usize,
    pub absolute_url: String,
    pub title: String,
}

/// One unit of batch work derived from a link-file line that passed the
/// keyword filter and yielded a URL token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// 0-based position among the candidate items of one load.
    pub index: usize,
    pub raw_line: String,
    pub resolved_url: Option<String>,
}

/// A candidate line that could not be classified into a usable URL.
/// Reported to the caller, never discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub raw_line: String,
}

/// Serialize one resolved link into the fixed line shape
/// `№<n>, <url> - <title>`. The shape is a compatibility contract; readers
/// tolerate lines that do not match it.
pub fn format_link_line(link: &ResolvedLink) -> String {
    format!(
        "№{}, {} - {}",
        link.sequence, link.absolute_url, link.title
    )
}

/// Assign sequence numbers and resolve hrefs against `base`.
///
/// Total: a missing href serializes as the [`NO_TARGET`] sentinel (which a
/// later load classifies as skipped), and a reference the resolver rejects
/// is kept verbatim so the reviewable file never loses a line.
pub fn resolve_records(records: &[LinkRecord], base: &str) -> Vec<ResolvedLink> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let absolute_url = match record.href.as_deref() {
                Some(href) => resolve(base, href).unwrap_or_else(|_| href.to_string()),
                None => NO_TARGET.to_string(),
            };
            let title = record
                .title
                .clone()
                .unwrap_or_else(|| NO_TITLE.to_string());
            ResolvedLink {
                sequence: idx + 1,
                absolute_url,
                title,
            }
        })
        .collect()
}

/// Build a case-insensitive matcher from a user-supplied keyword. A plain
/// keyword behaves as a substring match; regex metacharacters keep their
/// meaning.
pub fn keyword_matcher(keyword: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(keyword).case_insensitive(true).build()
}

fn url_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(https?://\S+|/[\w\-/]+/)").expect("url token pattern is valid")
    })
}

/// Extract the first URL-looking token from a line: either an absolute
/// `http(s)://...` run or a root-relative `/word/` path.
pub fn extract_url_token(line: &str) -> Option<&str> {
    url_token_regex().find(line).map(|m| m.as_str())
}

/// Classify link-file lines into batch items and skipped lines.
///
/// Lines not matching `keyword` are excluded from both buckets. Every
/// remaining line lands in exactly one bucket: a URL token makes a
/// [`BatchItem`] (root-relative tokens resolved against `base`), anything
/// else a [`SkippedLine`]. A root-relative token whose resolution fails is
/// skipped rather than aborting the classification.
pub fn classify_lines<'a, I>(
    lines: I,
    keyword: Option<&Regex>,
    base: &str,
) -> (Vec<BatchItem>, Vec<SkippedLine>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut items = Vec::new();
    let mut skipped = Vec::new();

    for line in lines {
        if let Some(matcher) = keyword {
            if !matcher.is_match(line) {
                continue;
            }
        }

        let Some(token) = extract_url_token(line) else {
            skipped.push(SkippedLine {
                raw_line: line.to_string(),
            });
            continue;
        };

        let resolved = if token.starts_with('/') {
            match resolve(base, token) {
                Ok(url) => url,
                Err(_) => {
                    skipped.push(SkippedLine {
                        raw_line: line.to_string(),
                    });
                    continue;
                }
            }
        } else {
            token.to_string()
        };

        items.push(BatchItem {
            index: items.len(),
            raw_line: line.to_string(),
            resolved_url: Some(resolved),
        });
    }

    (items, skipped)
}
