//! Rejection rules applied to discovered hrefs

use std::fmt;

/// Four-character URL suffixes that are never crawled.
///
/// Matching is a plain `ends_with` on the final URL, so `jpeg`, `docx` and `xlsx`
/// are matched on their last four characters only.
pub const BLOCKED_SUFFIXES: &[&str] = &[
    ".pdf", ".doc", ".xls", ".txt", ".rtf", ".jpg", "jpeg", "docx", "xlsx",
];

/// Why an href was not accepted into the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The href contains `@` (mailto links, obfuscated addresses)
    MailReference,

    /// The href is exactly `#`
    BareFragment,

    /// Fewer than four characters remain once the fragment is dropped
    TooShort,

    /// The final URL does not contain the scope root
    OutOfScope,

    /// The final URL ends with a blocked document or image suffix
    BlockedExtension,
}

impl Rejection {
    /// Short identifier used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MailReference => "mail_reference",
            Self::BareFragment => "bare_fragment",
            Self::TooShort => "too_short",
            Self::OutOfScope => "out_of_scope",
            Self::BlockedExtension => "blocked_extension",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true if the URL ends with one of [`BLOCKED_SUFFIXES`]
///
/// The comparison is case-sensitive.
pub fn has_blocked_extension(url: &str) -> bool {
    BLOCKED_SUFFIXES.iter().any(|suffix| url.ends_with(suffix))
}
