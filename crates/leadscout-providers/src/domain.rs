//! Host and path helpers shared by adapters and the candidate filter.

use reqwest::Url;

/// Reduces a URL or bare host to a comparable registrable-ish domain.
///
/// Lowercases and strips the scheme, userinfo, `www.` prefix, port, path,
/// query, fragment, and trailing dot. Returns `None` when no dotted host
/// remains.
///
/// ```
/// use leadscout_providers::normalize_domain;
/// assert_eq!(
///     normalize_domain("https://WWW.Acme.io:8443/about?x=1").as_deref(),
///     Some("acme.io")
/// );
/// ```
#[must_use]
pub fn normalize_domain(input: &str) -> Option<String> {
    let url = parse_lenient(input)?;
    let host = url
        .host_str()?
        .trim_end_matches('.')
        .to_ascii_lowercase();
    let host = host.strip_prefix("www.").map_or(host.clone(), str::to_owned);

    if host.is_empty() || !host.contains('.') || host.starts_with('.') {
        return None;
    }
    Some(host)
}

/// Lowercased, non-empty path segments of a URL. Query and fragment are
/// never part of the path.
#[must_use]
pub fn path_segments(url: &str) -> Vec<String> {
    let Some(url) = parse_lenient(url) else {
        return Vec::new();
    };
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_ascii_lowercase)
                .collect()
        })
        .unwrap_or_default()
}

/// Parses absolute URLs as-is; bare hosts such as `acme.io/about` are read as
/// `https://` URLs.
fn parse_lenient(input: &str) -> Option<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains("://") {
        return Url::parse(trimmed).ok();
    }
    Url::parse(&format!("https://{trimmed}")).ok()
}
