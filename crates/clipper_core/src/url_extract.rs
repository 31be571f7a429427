use std::sync::OnceLock;

use regex::Regex;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("static url pattern compiles")
    })
}

/// First `http(s)://` URL found in shared text such as "read this https://x.y/z later".
pub fn extract_url(text: &str) -> Option<String> {
    url_pattern().find(text).map(|m| m.as_str().to_string())
}
