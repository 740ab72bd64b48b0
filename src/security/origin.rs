use url::Url;

use crate::config::AllowList;

/// Host part of an origin, lowercased. Values that do not parse as a URL
/// (a bare `example.com`, say) are used as-is.
fn host_from_origin(origin: &str) -> String {
    let lowered = origin.to_lowercase();
    match Url::parse(&lowered) {
        Ok(url) => match url.host_str() {
            Some(host) => host.to_string(),
            None => lowered,
        },
        Err(_) => lowered,
    }
}

/// Returns `true` if `origin` is trusted by the allow-list.
///
/// - A full-origin entry (`https://app.example.com`) matches the origin
///   exactly, case-insensitively.
/// - A bare-domain entry (`example.com`) matches the origin's host when it is
///   the domain itself or any subdomain of it. The scheme and port are ignored.
///
/// There is no wildcard syntax. An absent or empty origin is never allowed.
pub fn is_allowed(origin: Option<&str>, allowed: &AllowList) -> bool {
    let origin = match origin {
        Some(o) if !o.is_empty() => o,
        _ => return false,
    };

    let lowered = origin.to_lowercase();
    if allowed.contains(&lowered) {
        return true;
    }

    let host = host_from_origin(origin);
    allowed
        .iter()
        .filter(|entry| !entry.contains("://"))
        .any(|domain| {
            host == domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
}
