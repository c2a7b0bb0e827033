// Copyright 2024 Everything2 Development Team. All rights reserved.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! Classification of the text between the brackets of an internal link.
//!
//! The sub-patterns are mutually exclusive and tried in a fixed priority
//! order. That order matches what the site's renderer has always done with
//! stored content; changing it would silently relink existing writeups, so
//! it is load-bearing even where it looks accidental.

use memchr::memchr;

use crate::scanners::is_decimal_digits;

/// The pieces of a recognized internal link, still borrowed from the source
/// text. Nodetype casing and anchor synthesis happen when the token is
/// built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LinkSpec<'a> {
    pub title: &'a str,
    pub display: &'a str,
    pub nodetype: Option<&'a str>,
    pub author: Option<&'a str>,
    /// Decimal digits of a debate comment reference.
    pub comment_id: Option<&'a str>,
}

impl<'a> LinkSpec<'a> {
    fn plain(title: &'a str, display: &'a str) -> Self {
        LinkSpec {
            title,
            display,
            nodetype: None,
            author: None,
            comment_id: None,
        }
    }
}

/// Classifies bracket content as an internal link, or `None` when the
/// content matches no recognized grammar and must stay literal text.
///
/// Sub-patterns, in priority order:
///
/// 1. `display|title[typeSpec]`
/// 2. `title[typeSpec]`
/// 3. `title|display`
/// 4. `title` (bracket-free)
pub(crate) fn classify(content: &str) -> Option<LinkSpec<'_>> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    if let Some(spec) = match_piped_typed(content) {
        return Some(spec);
    }
    if let Some(spec) = match_typed(content) {
        return Some(spec);
    }
    if let Some((title_part, rest)) = content.split_once('|') {
        let title = title_part.trim();
        if !title.is_empty() {
            // only the second pipe-separated field counts as display text
            let display = rest.split('|').next().unwrap_or("").trim();
            let display = if display.is_empty() { title } else { display };
            return Some(LinkSpec::plain(title, display));
        }
    }
    if memchr(b'[', content.as_bytes()).is_none() && memchr(b']', content.as_bytes()).is_none() {
        return Some(LinkSpec::plain(content, content));
    }
    None
}

/// `display|title[typeSpec]`: explicit display text ahead of a typed link.
fn match_piped_typed(content: &str) -> Option<LinkSpec<'_>> {
    let pipe = memchr(b'|', content.as_bytes())?;
    let display_part = &content[..pipe];
    if display_part.bytes().any(|b| b == b'[' || b == b']') {
        return None;
    }
    let rest = &content[pipe + 1..];
    let (title_part, spec_part) = split_type_suffix(rest)?;
    let display = display_part.trim();
    let title = title_part.trim();
    let spec = spec_part.trim();
    if display.is_empty() || title.is_empty() || spec.is_empty() {
        return None;
    }
    Some(apply_typespec(title, display, spec))
}

/// `title[typeSpec]`: display text defaults to the title.
fn match_typed(content: &str) -> Option<LinkSpec<'_>> {
    if memchr(b'|', content.as_bytes()).is_some() {
        return None;
    }
    let (title_part, spec_part) = split_type_suffix(content)?;
    let title = title_part.trim();
    let spec = spec_part.trim();
    if title.is_empty() || spec.is_empty() {
        return None;
    }
    Some(apply_typespec(title, title, spec))
}

/// Splits `title[typeSpec]` at the first `[`, requiring the closing `]` to
/// be the final character and the type specifier to be free of `]` and `|`.
fn split_type_suffix(s: &str) -> Option<(&str, &str)> {
    let open = memchr(b'[', s.as_bytes())?;
    let title_part = &s[..open];
    if title_part.bytes().any(|b| b == b']') {
        return None;
    }
    if !s.ends_with(']') || open + 1 >= s.len() {
        return None;
    }
    let inner = &s[open + 1..s.len() - 1];
    if inner.bytes().any(|b| b == b']' || b == b'|') {
        return None;
    }
    Some((title_part, inner))
}

/// Resolves a type specifier: `nodetype by author`, a numeric debate
/// comment id, or a plain nodetype, in that order.
fn apply_typespec<'a>(title: &'a str, display: &'a str, spec: &'a str) -> LinkSpec<'a> {
    if let Some((nodetype, author)) = spec.split_once(" by ") {
        return LinkSpec {
            title,
            display,
            nodetype: Some(nodetype.trim()),
            author: Some(author.trim()),
            comment_id: None,
        };
    }
    if is_decimal_digits(spec) {
        return LinkSpec {
            title,
            display,
            nodetype: None,
            author: None,
            comment_id: Some(spec),
        };
    }
    LinkSpec {
        title,
        display,
        nodetype: Some(spec),
        author: None,
        comment_id: None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bare_title() {
        assert_eq!(
            classify("the nodeshell rescue team"),
            Some(LinkSpec::plain(
                "the nodeshell rescue team",
                "the nodeshell rescue team"
            ))
        );
        assert_eq!(classify("  trimmed  "), Some(LinkSpec::plain("trimmed", "trimmed")));
    }

    #[test]
    fn empty_and_whitespace_content_rejected() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   "), None);
    }

    #[test]
    fn pipelink() {
        assert_eq!(
            classify("actual title|shown text"),
            Some(LinkSpec::plain("actual title", "shown text"))
        );
        // empty display falls back to the title
        assert_eq!(classify("title|"), Some(LinkSpec::plain("title", "title")));
        // third field is dropped
        assert_eq!(classify("a|b|c"), Some(LinkSpec::plain("a", "b")));
    }

    #[test]
    fn pipe_with_empty_title_falls_to_bare_title() {
        assert_eq!(
            classify("|display"),
            Some(LinkSpec::plain("|display", "|display"))
        );
    }

    #[test]
    fn typed() {
        assert_eq!(
            classify("root[user]"),
            Some(LinkSpec {
                title: "root",
                display: "root",
                nodetype: Some("user"),
                author: None,
                comment_id: None,
            })
        );
        assert_eq!(
            classify("username [ user ]"),
            Some(LinkSpec {
                title: "username",
                display: "username",
                nodetype: Some("user"),
                author: None,
                comment_id: None,
            })
        );
    }

    #[test]
    fn typed_with_author() {
        assert_eq!(
            classify("The Thing[writeup by N-Wing]"),
            Some(LinkSpec {
                title: "The Thing",
                display: "The Thing",
                nodetype: Some("writeup"),
                author: Some("N-Wing"),
                comment_id: None,
            })
        );
    }

    #[test]
    fn comment_anchor() {
        assert_eq!(
            classify("Some Text[42]"),
            Some(LinkSpec {
                title: "Some Text",
                display: "Some Text",
                nodetype: None,
                author: None,
                comment_id: Some("42"),
            })
        );
    }

    #[test]
    fn display_piped_typed() {
        assert_eq!(
            classify("see this|E2 FAQ[superdoc]"),
            Some(LinkSpec {
                title: "E2 FAQ",
                display: "see this",
                nodetype: Some("superdoc"),
                author: None,
                comment_id: None,
            })
        );
        assert_eq!(
            classify("the comment|Node Title[17]"),
            Some(LinkSpec {
                title: "Node Title",
                display: "the comment",
                nodetype: None,
                author: None,
                comment_id: Some("17"),
            })
        );
    }

    #[test]
    fn unrecognized_nesting_rejected() {
        assert_eq!(classify("[x]"), None);
        assert_eq!(classify("a[b]c"), None);
        assert_eq!(classify("x[]"), None);
        assert_eq!(classify("[user]"), None);
    }

    #[test]
    fn by_split_is_literal_substring() {
        // no surrounding spaces, no author split
        let spec = classify("t[writeup by]").unwrap();
        assert_eq!(spec.nodetype, Some("writeup by"));
        assert_eq!(spec.author, None);

        let spec = classify("t[by author]").unwrap();
        assert_eq!(spec.nodetype, Some("by author"));
    }
}
