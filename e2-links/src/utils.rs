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

//! Miscellaneous utilities to increase comfort.

use std::ops::Range;

use unicase::UniCase;

use crate::{CowStr, Token};

/// Merge consecutive `Token::Literal` tokens into only one.
///
/// The parser emits separate literals for inter-link gaps, protected
/// `<code>`/`<pre>` regions and consumed malformed candidates; consumers
/// that only care about the text rarely want those seams.
#[derive(Debug)]
pub struct LiteralMergeStream<'a, I> {
    inner: LiteralMergeWithOffset<'a, DummyOffsets<I>>,
}

impl<'a, I> LiteralMergeStream<'a, I>
where
    I: Iterator<Item = Token<'a>>,
{
    pub fn new(iter: I) -> Self {
        Self {
            inner: LiteralMergeWithOffset::new(DummyOffsets(iter)),
        }
    }
}

impl<'a, I> Iterator for LiteralMergeStream<'a, I>
where
    I: Iterator<Item = Token<'a>>,
{
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(token, _)| token)
    }
}

#[derive(Debug)]
struct DummyOffsets<I>(I);

impl<'a, I> Iterator for DummyOffsets<I>
where
    I: Iterator<Item = Token<'a>>,
{
    type Item = (Token<'a>, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|token| (token, 0..0))
    }
}

/// Merge consecutive `Token::Literal` tokens into only one, with offsets.
///
/// Compatible with [`OffsetIter`](crate::OffsetIter).
#[derive(Debug)]
pub struct LiteralMergeWithOffset<'a, I> {
    iter: I,
    last_token: Option<(Token<'a>, Range<usize>)>,
}

impl<'a, I> LiteralMergeWithOffset<'a, I>
where
    I: Iterator<Item = (Token<'a>, Range<usize>)>,
{
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            last_token: None,
        }
    }
}

impl<'a, I> Iterator for LiteralMergeWithOffset<'a, I>
where
    I: Iterator<Item = (Token<'a>, Range<usize>)>,
{
    type Item = (Token<'a>, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        match (self.last_token.take(), self.iter.next()) {
            (
                Some((Token::Literal(last_text), last_offset)),
                Some((Token::Literal(next_text), next_offset)),
            ) => {
                // We need to start merging consecutive literals together into one
                let mut string_buf: String = last_text.into_string();
                string_buf.push_str(&next_text);
                let mut offset = last_offset;
                offset.end = next_offset.end;
                loop {
                    // Avoid recursion to avoid stack overflow and to optimize concatenation
                    match self.iter.next() {
                        Some((Token::Literal(next_text), next_offset)) => {
                            string_buf.push_str(&next_text);
                            offset.end = next_offset.end;
                        }
                        next_token => {
                            self.last_token = next_token;
                            if string_buf.is_empty() {
                                // Discard literal(s) altogether if there is no text
                                break self.next();
                            } else {
                                break Some((
                                    Token::Literal(CowStr::Boxed(string_buf.into_boxed_str())),
                                    offset,
                                ));
                            }
                        }
                    }
                }
            }
            (None, Some(next_token)) => {
                // This only happens once during the first iteration and if there are items
                self.last_token = Some(next_token);
                self.next()
            }
            (None, None) => {
                // This happens when the iterator is depleted
                None
            }
            (last_token, next_token) => {
                // The ordinary case, emit one token after the other without modification
                self.last_token = next_token;
                last_token
            }
        }
    }
}

/// Case-insensitive key for a link target title.
///
/// Everything2 node titles are matched without regard to case, so two
/// links whose titles differ only in case resolve to the same node. Use
/// this when aggregating link targets across a document or corpus.
pub fn title_key(title: &str) -> UniCase<String> {
    UniCase::new(title.to_owned())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Parser;

    #[test]
    fn literal_merge_stream_around_code() {
        let source = "a <code>[not a link]</code> b";
        let parser = LiteralMergeStream::new(Parser::new(source));
        let tokens: Vec<_> = parser.collect();
        assert_eq!(tokens, [Token::Literal(source.into())]);
    }

    #[test]
    fn literal_merge_with_offset_around_code() {
        let source = "a <code>[x]</code> b";
        let parser = LiteralMergeWithOffset::new(Parser::new(source).into_offset_iter());
        let tokens: Vec<_> = parser.collect();
        assert_eq!(tokens, [(Token::Literal(source.into()), 0..source.len())]);
    }

    #[test]
    fn literal_merge_empty_is_discarded() {
        let link = Token::ExternalLink {
            url: "http://example.com".into(),
            display: "http://example.com".into(),
        };
        let tokens = [
            link.clone(),
            Token::Literal("".into()),
            Token::Literal("".into()),
            link.clone(),
        ];
        let result: Vec<_> = LiteralMergeStream::new(tokens.into_iter()).collect();
        assert_eq!(result, [link.clone(), link]);
    }

    #[test]
    fn title_key_is_case_insensitive() {
        assert_eq!(title_key("Brian Eno"), title_key("brian eno"));
        assert_ne!(title_key("Brian Eno"), title_key("Brian Enos"));
    }
}
