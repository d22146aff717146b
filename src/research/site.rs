//! Source presentation helpers
//!
//! Favicon URL and display-name derivation for context chunks. These are
//! best-effort: any failure falls back to a neutral value and never aborts
//! the pipeline.

/// Icon shown when no favicon can be derived
pub const FALLBACK_ICON: &str = "./public/web.png";

/// Second-level labels that are part of the public suffix, not the site name
const SECOND_LEVEL_SUFFIXES: [&str; 7] = ["co", "com", "net", "org", "ac", "gov", "edu"];

/// Favicon URL for a source, via the Google favicon service.
///
/// Falls back to the bundled icon when the URL has no parseable host.
pub fn icon_for(url: &str) -> String {
    match url::Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
        Some(host) => format!("https://www.google.com/s2/favicons?domain={}&sz=64", host),
        None => FALLBACK_ICON.to_string(),
    }
}

/// Human-readable site name for a source: the registrable-domain label.
///
/// `https://en.wikipedia.org/wiki/Coffee` becomes `wikipedia`. Returns
/// `None` when the URL has no parseable host; callers substitute their own
/// `Source N` fallback.
pub fn display_name_for(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let name = match labels.len() {
        0 => return None,
        1 => labels[0],
        2 => labels[0],
        // For deeper hosts, skip a second-level public suffix (bbc.co.uk)
        // but keep the site label of ordinary subdomains (en.wikipedia.org).
        n => {
            if SECOND_LEVEL_SUFFIXES.contains(&labels[n - 2]) {
                labels[n - 3]
            } else {
                labels[n - 2]
            }
        }
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
