//! Display helpers for bookmark cards: title suggestions, favicon lookups and
//! card dates. Nothing here touches the network.

use chrono::{DateTime, Utc};
use reqwest::Url;

/// Derives a title from a URL when the user left the title empty.
///
/// `https://css-tricks.com/snippets/complete-guide-grid/` becomes
/// `"Complete Guide Grid"`; `https://www.github.com` becomes `"Github"`.
pub fn suggest_title(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let domain = host.replacen("www.", "", 1);

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let title = match segments.last() {
        Some(last) if !last.contains('.') => capitalize_words(&last.replace(['-', '_'], " ")),
        Some(_) => domain,
        None => capitalize_words(domain.split('.').next().unwrap_or(domain.as_str())),
    };
    Some(title)
}

/// Upper-cases the first character of every word.
fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !is_word;
    }
    out
}

/// Builds the favicon lookup URL for a bookmark. `template` contains a
/// `{domain}` placeholder. Returns `None` when the URL has no host.
pub fn favicon_url(template: &str, url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(template.replace("{domain}", host))
}

/// Card date, e.g. `"Oct 18, 2026"`.
pub fn display_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}
