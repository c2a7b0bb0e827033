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

//! The token iterator that replays the span plan.

use std::iter::FusedIterator;
use std::ops::Range;

use crate::firstpass::{run_first_pass, Item, ItemBody};
use crate::strings::CowStr;
use crate::Token;

/// Display text substituted when an external link carries a pipe but no
/// display text, as in `[http://example.com|]`.
pub const EMPTY_LINK_LABEL: &str = "[link]";

const COMMENT_ANCHOR_PREFIX: &str = "debatecomment_";

/// An iterator of [`Token`]s over a source string.
///
/// Parsing never fails: every input produces a token sequence, with
/// anything unclassifiable degraded to [`Token::Literal`]. The iterator is
/// pure and holds no state beyond its position, so parsing the same string
/// twice yields the same sequence.
#[derive(Debug)]
pub struct Parser<'input> {
    text: &'input str,
    items: Vec<Item<'input>>,
    item_ix: usize,
    pos: usize,
}

impl<'input> Parser<'input> {
    pub fn new(text: &'input str) -> Self {
        Parser {
            text,
            items: run_first_pass(text),
            item_ix: 0,
            pos: 0,
        }
    }

    /// Consumes the parser and returns an iterator of `(Token, Range)`
    /// pairs, where the range locates the source bytes each token was
    /// derived from. Ranges are ascending, disjoint, and cover the source
    /// exactly.
    pub fn into_offset_iter(self) -> OffsetIter<'input> {
        OffsetIter { inner: self }
    }

    fn next_with_range(&mut self) -> Option<(Token<'input>, Range<usize>)> {
        if let Some(item) = self.items.get(self.item_ix).copied() {
            if self.pos < item.start {
                let range = self.pos..item.start;
                self.pos = item.start;
                return Some((Token::Literal(self.text[range.clone()].into()), range));
            }
            self.item_ix += 1;
            self.pos = item.end;
            return Some((self.build_token(&item), item.start..item.end));
        }
        if self.pos < self.text.len() {
            let range = self.pos..self.text.len();
            self.pos = self.text.len();
            return Some((Token::Literal(self.text[range.clone()].into()), range));
        }
        None
    }

    fn build_token(&self, item: &Item<'input>) -> Token<'input> {
        match item.body {
            ItemBody::Protected(_) => Token::Literal(self.text[item.start..item.end].into()),
            ItemBody::ExternalLink { url, display } => {
                let display = match display {
                    Some("") => CowStr::Borrowed(EMPTY_LINK_LABEL),
                    Some(display) => display.into(),
                    None => url.into(),
                };
                Token::ExternalLink {
                    url: url.into(),
                    display,
                }
            }
            ItemBody::InternalLink(spec) => Token::InternalLink {
                title: spec.title.into(),
                display: spec.display.into(),
                nodetype: spec.nodetype.map(lowercase),
                author: spec.author.map(CowStr::Borrowed),
                anchor: spec
                    .comment_id
                    .map(|digits| format!("{COMMENT_ANCHOR_PREFIX}{digits}").into()),
            },
        }
    }
}

/// Nodetypes are stored lowercase; borrow when the source already is.
fn lowercase(s: &str) -> CowStr<'_> {
    if s.bytes().any(|b| b.is_ascii_uppercase()) {
        s.to_ascii_lowercase().into()
    } else {
        CowStr::Borrowed(s)
    }
}

impl<'input> Iterator for Parser<'input> {
    type Item = Token<'input>;

    fn next(&mut self) -> Option<Token<'input>> {
        self.next_with_range().map(|(token, _)| token)
    }
}

impl<'input> FusedIterator for Parser<'input> {}

/// An iterator yielding tokens together with their source ranges, obtained
/// through the [`into_offset_iter`](Parser::into_offset_iter) method.
#[derive(Debug)]
pub struct OffsetIter<'input> {
    inner: Parser<'input>,
}

impl<'input> Iterator for OffsetIter<'input> {
    type Item = (Token<'input>, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_with_range()
    }
}

impl<'input> FusedIterator for OffsetIter<'input> {}

/// Parses a complete document in one call.
///
/// This is the single canonical entry point shared by the authoring
/// preview, the stored-document renderer, and the analysis tooling; there
/// is deliberately no second implementation of the grammar anywhere.
pub fn parse(text: &str) -> Vec<Token<'_>> {
    Parser::new(text).collect()
}
