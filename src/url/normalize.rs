use crate::url::filter::{has_blocked_extension, Rejection};
use crate::SitewalkError;
use url::Url;

/// Derives the scope root used for both relative resolution and scope checks
///
/// The seed must be an absolute `http` or `https` URL. The root is the seed with its
/// first `www.` removed, any fragment dropped and trailing slashes trimmed.
///
/// # Examples
///
/// ```
/// use sitewalk::url::scope_root_for;
///
/// assert_eq!(scope_root_for("https://www.example.com/").unwrap(), "https://example.com");
/// ```
pub fn scope_root_for(seed: &str) -> Result<String, SitewalkError> {
    let seed = seed.trim();
    let parsed = Url::parse(seed).map_err(|e| SitewalkError::InvalidSeed {
        url: seed.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(SitewalkError::InvalidSeed {
            url: seed.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    if parsed.host_str().is_none() {
        return Err(SitewalkError::InvalidSeed {
            url: seed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    let mut root = seed.replacen("www.", "", 1);
    if let Some(idx) = root.find('#') {
        root.truncate(idx);
    }
    let trimmed = root.trim_end_matches('/').len();
    root.truncate(trimmed);

    Ok(root)
}

/// Validates a raw href and rewrites it into its canonical absolute form
///
/// # Normalization Steps
///
/// 1. Reject hrefs containing `@` and the bare fragment `#`
/// 2. Replace a leading `./` with the scope root
/// 3. Remove the first `www.`
/// 4. Truncate at the first `#`
/// 5. Reject if fewer than four characters remain
/// 6. Prefix the scope root if the result does not start with `http`
/// 7. Reject if the scope root is not a substring of the result
/// 8. Reject blocked four-character suffixes
///
/// # Examples
///
/// ```
/// use sitewalk::url::{classify_href, Rejection};
///
/// let root = "http://example.com";
/// assert_eq!(classify_href("./about", root).unwrap(), "http://example.com/about");
/// assert_eq!(classify_href("mailto:x@example.com", root), Err(Rejection::MailReference));
/// ```
pub fn classify_href(raw: &str, scope_root: &str) -> Result<String, Rejection> {
    if raw.contains('@') {
        return Err(Rejection::MailReference);
    }

    if raw == "#" {
        return Err(Rejection::BareFragment);
    }

    let mut href = match raw.strip_prefix("./") {
        Some(rest) => join_root(scope_root, rest),
        None => raw.to_string(),
    };

    href = href.replacen("www.", "", 1);

    if let Some(idx) = href.find('#') {
        href.truncate(idx);
    }

    if href.len() < 4 {
        return Err(Rejection::TooShort);
    }

    if !href.starts_with("http") {
        href = join_root(scope_root, &href);
    }

    if !href.contains(scope_root) {
        return Err(Rejection::OutOfScope);
    }

    if has_blocked_extension(&href) {
        return Err(Rejection::BlockedExtension);
    }

    Ok(href)
}

/// Returns the canonical URL for an accepted href, `None` for a rejected one
pub fn normalize_and_filter(raw: &str, scope_root: &str) -> Option<String> {
    classify_href(raw, scope_root).ok()
}

/// Concatenates the scope root and a relative remainder with exactly one `/` between
fn join_root(root: &str, rest: &str) -> String {
    match (root.ends_with('/'), rest.strip_prefix('/')) {
        (true, Some(stripped)) => format!("{}{}", root, stripped),
        (false, None) => format!("{}/{}", root, rest),
        _ => format!("{}{}", root, rest),
    }
}
