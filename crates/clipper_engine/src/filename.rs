const MAX_STEM_LEN: usize = 80;

/// Deterministic, filesystem-safe name for a converted page: `source_url`
/// without its `http(s)://` prefix, every character outside `[A-Za-z0-9.-]`
/// replaced by `_`, cut to 80 characters, with `.md` appended.
///
/// The query is kept so paginated pages land in distinct files.
pub fn derive_filename(source_url: &str) -> String {
    let trimmed = source_url.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let stem: String = without_scheme
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();
    let stem = if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    };
    format!("{stem}.md")
}
