const MAX_STEM_LEN: usize = 128;

/// Derive a filesystem-safe artifact name from a page URL: strip the
/// leading scheme, replace characters illegal in path segments with `_`,
/// append the extension. Deterministic for the same input.
pub fn sanitize_page_filename(url: &str, extension: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let mut stem: String = stripped
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    if stem.is_empty() {
        stem.push('_');
    }
    if stem.len() > MAX_STEM_LEN {
        let mut end = MAX_STEM_LEN;
        while end > 0 && !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem.truncate(end);
    }
    format!("{stem}.{extension}")
}

fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '\0'..='\u{1F}'
    )
}
