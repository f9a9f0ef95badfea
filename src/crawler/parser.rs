//! HTML tag extraction
//!
//! The worker only needs start tags and their attributes. This module runs the
//! html5ever tokenizer over a page body and collects each start-tag token it emits,
//! without building a tree. One `<a>` in the source is exactly one `StartTag`; the
//! tree builder's recovery (re-opening unclosed formatting elements) never applies.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

/// One start tag seen in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercase tag name
    pub name: String,

    /// Attribute name/value pairs in source order
    pub attrs: Vec<(String, String)>,
}

impl StartTag {
    /// Returns the first attribute named `key`
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Token sink that keeps start tags and drops everything else
#[derive(Default)]
struct StartTagSink {
    tags: Vec<StartTag>,
}

impl TokenSink for StartTagSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        else {
            return TokenSinkResult::Continue;
        };

        let name = name.to_string();
        let next = raw_text_state(&name);

        self.tags.push(StartTag {
            name,
            attrs: attrs
                .into_iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect(),
        });

        next
    }
}

/// Content models the tokenizer cannot pick on its own without a tree builder.
/// Markup inside these elements is text, not tags.
fn raw_text_state(name: &str) -> TokenSinkResult<()> {
    match name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

/// Tokenizes `html` and returns every start tag in source order
///
/// Malformed markup never fails; the tokenizer recovers the way a browser would
/// and the sequence is always finite.
pub fn start_tags(html: &str) -> Vec<StartTag> {
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(html));

    let mut tokenizer = Tokenizer::new(StartTagSink::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    tokenizer.sink.tags
}

/// Returns the raw `href` of every `<a>` start tag, unfiltered
///
/// # Example
///
/// ```
/// use sitewalk::crawler::anchor_hrefs;
///
/// let html = r#"<html><body><a href="./about">About</a><a name="top"></a></body></html>"#;
/// assert_eq!(anchor_hrefs(html), vec!["./about".to_string()]);
/// ```
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    start_tags(html)
        .into_iter()
        .filter(|tag| tag.name == "a")
        .filter_map(|tag| tag.attr("href").map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_tags_in_order() {
        let html = r#"<html><head><title>T</title></head><body><p class="x">hi</p></body></html>"#;
        let names: Vec<String> = start_tags(html).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["html", "head", "title", "body", "p"]);
    }

    #[test]
    fn test_no_implied_elements() {
        let names: Vec<String> = start_tags(r#"<a href="/x">x</a>"#)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_attributes_are_exposed() {
        let tags = start_tags(r#"<a href="/x" rel="nofollow">X</a>"#);
        let anchor = tags.iter().find(|t| t.name == "a").unwrap();
        assert_eq!(anchor.attr("href"), Some("/x"));
        assert_eq!(anchor.attr("rel"), Some("nofollow"));
        assert_eq!(anchor.attr("title"), None);
        assert_eq!(
            anchor.attrs,
            vec![
                ("href".to_string(), "/x".to_string()),
                ("rel".to_string(), "nofollow".to_string()),
            ]
        );
    }

    #[test]
    fn test_anchor_hrefs() {
        let html = r#"
            <html>
            <body>
                <a href="./about">About</a>
                <a href="mailto:x@example.com">Mail</a>
                <a>No href</a>
                <link rel="canonical" href="/canonical">
                <img src="/logo.png">
                <a href="https://other.org/">Elsewhere</a>
            </body>
            </html>
        "#;

        assert_eq!(
            anchor_hrefs(html),
            vec![
                "./about".to_string(),
                "mailto:x@example.com".to_string(),
                "https://other.org/".to_string(),
            ]
        );
    }

    #[test]
    fn test_unclosed_anchor_counts_once() {
        let html = r#"<p><a href="/x">one</p><p>two</p>"#;
        assert_eq!(anchor_hrefs(html), vec!["/x".to_string()]);
    }

    #[test]
    fn test_uppercase_tags_are_normalized() {
        let html = r#"<HTML><BODY><A HREF="/upper">Up</A></BODY></HTML>"#;
        assert_eq!(anchor_hrefs(html), vec!["/upper".to_string()]);
    }

    #[test]
    fn test_malformed_markup() {
        let html = r#"<body><a href="/one">one<a href="/two">two</p></div>"#;
        assert_eq!(
            anchor_hrefs(html),
            vec!["/one".to_string(), "/two".to_string()]
        );
    }

    #[test]
    fn test_markup_inside_script_is_text() {
        let html = r#"<script>document.write('<a href="/fake">x</a>');</script><a href="/real">r</a>"#;
        assert_eq!(anchor_hrefs(html), vec!["/real".to_string()]);
    }

    #[test]
    fn test_empty_body() {
        assert!(anchor_hrefs("").is_empty());
    }
}
