use url::Url;

use crate::Cookie;

/// Host of `url`, or an empty string when it cannot be parsed.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(ToOwned::to_owned))
        .unwrap_or_default()
}

/// Splits a `Cookie:`-style header (`a=1; b=2`) into cookies scoped to the
/// host of `page_url`. Pairs without an `=` are dropped; capture order is kept.
pub fn parse_cookie_header(header: &str, page_url: &str) -> Vec<Cookie> {
    let domain = host_of(page_url);
    header
        .split(';')
        .filter_map(|raw| {
            let (name, value) = raw.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie::new(name, value.trim(), domain.clone()))
        })
        .collect()
}
