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

//! Pull parser for [Everything2](https://everything2.com) bracket link
//! markup. This crate provides a [Parser](struct.Parser.html) struct which is
//! an iterator over [Token](enum.Token.html)s. This iterator can be used
//! directly, or to output HTML using the [HTML module](html/index.html).
//!
//! The grammar is the hard-link syntax users type into writeups:
//! `[title]`, `[title|display]`, `[title[nodetype]]`,
//! `[display|title[nodetype]]`, `[title[nodetype by author]]` and external
//! `[http://...]` forms. Text inside `<code>` and `<pre>` regions is never
//! linked. Parsing is total: malformed markup degrades to literal text, it
//! is never an error.
//!
//! # Example
//! ```rust
//! use e2_links::Parser;
//!
//! let input = "Listen to [Brian Eno|Eno] on [discography[e2node]].";
//!
//! let parser = Parser::new(input);
//!
//! // Write to String buffer.
//! let mut html_output = String::new();
//! e2_links::html::push_html(&mut html_output, parser);
//!
//! // Check that the output is what we expected.
//! let expected_html = "Listen to <a href=\"/title/Brian%20Eno\" class=\"e2-link\">Eno</a> \
//!     on <a href=\"/e2node/discography\" class=\"e2-link\">discography</a>.";
//! assert_eq!(expected_html, &html_output);
//! ```
//!
//! Note that consecutive literal tokens can happen due to the manner in
//! which the parser evaluates the source. A utility `LiteralMergeStream`
//! exists to improve the comfort of iterating the tokens:
//!
//! ```rust
//! use e2_links::{LiteralMergeStream, Parser, Token};
//!
//! let input = "<code>[not a link]</code> but [this] is";
//!
//! let iterator = LiteralMergeStream::new(Parser::new(input));
//!
//! for token in iterator {
//!     match token {
//!         Token::Literal(text) => println!("{}", text),
//!         _ => {}
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod html;

pub mod analysis;
pub mod utils;

mod firstpass;
mod linkspec;
mod parse;
mod scanners;
mod strings;

pub use crate::parse::{parse, OffsetIter, Parser, EMPTY_LINK_LABEL};
pub use crate::strings::{CowStr, InlineStr};
pub use crate::utils::*;

/// One parsed piece of a document.
///
/// Concatenating the source spans of the tokens of a parse, in order,
/// reproduces the input exactly; see [`Parser::into_offset_iter`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Token<'a> {
    /// Plain text, emitted verbatim. Covers inter-link prose, protected
    /// `<code>`/`<pre>` regions and malformed bracket runs.
    #[cfg_attr(feature = "serde", serde(borrow))]
    Literal(CowStr<'a>),

    /// A `[http://...]` or `[https://...|display]` link to another site.
    ExternalLink {
        /// Trailing whitespace trimmed, otherwise exactly as written.
        #[cfg_attr(feature = "serde", serde(borrow))]
        url: CowStr<'a>,
        /// The piped display text, or the URL itself when no pipe was given.
        /// An empty display becomes [`EMPTY_LINK_LABEL`].
        display: CowStr<'a>,
    },

    /// A link to another node on the site.
    InternalLink {
        /// The target node title, case preserved.
        #[cfg_attr(feature = "serde", serde(borrow))]
        title: CowStr<'a>,
        /// What the reader sees; equals `title` when no pipe was given.
        display: CowStr<'a>,
        /// Lowercased nodetype from a `[title[nodetype]]` suffix.
        nodetype: Option<CowStr<'a>>,
        /// Author from a `[title[nodetype by author]]` suffix.
        author: Option<CowStr<'a>>,
        /// Fragment identifier from a `[title[123]]` suffix.
        anchor: Option<CowStr<'a>>,
    },
}

impl<'a> Token<'a> {
    pub fn into_static(self) -> Token<'static> {
        match self {
            Token::Literal(text) => Token::Literal(text.into_static()),
            Token::ExternalLink { url, display } => Token::ExternalLink {
                url: url.into_static(),
                display: display.into_static(),
            },
            Token::InternalLink {
                title,
                display,
                nodetype,
                author,
                anchor,
            } => Token::InternalLink {
                title: title.into_static(),
                display: display.into_static(),
                nodetype: nodetype.map(CowStr::into_static),
                author: author.map(CowStr::into_static),
                anchor: anchor.map(CowStr::into_static),
            },
        }
    }
}
