use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid base url: {0}")]
    InvalidBase(url::ParseError),
    #[error("failed to join reference against base: {0}")]
    Join(url::ParseError),
}

/// Resolve a possibly relative reference against a base URL.
///
/// Root-relative references (`/...`) join against the base's scheme and
/// host. References that already carry a `scheme://` prefix are returned
/// unchanged, byte for byte. Everything else joins as a relative path per
/// RFC 3986.
pub fn resolve(base: &str, reference: &str) -> Result<String, ResolveError> {
    if reference.starts_with('/') {
        return join(base, reference);
    }
    if looks_absolute(reference) {
        return Ok(reference.to_string());
    }
    join(base, reference)
}

fn join(base: &str, reference: &str) -> Result<String, ResolveError> {
    let base = Url::parse(base).map_err(ResolveError::InvalidBase)?;
    let joined = base.join(reference).map_err(ResolveError::Join)?;
    Ok(joined.into())
}

/// A reference counts as absolute when it starts with an RFC 3986 scheme
/// followed by `://`.
fn looks_absolute(reference: &str) -> bool {
    let Some((scheme, _)) = reference.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
