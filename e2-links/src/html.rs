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

//! HTML renderer that takes an iterator of link tokens as input.
//!
//! Literal text is passed through untouched, because Everything2 documents
//! carry their own HTML; link display text and hrefs are escaped here. The
//! authoring preview and the stored-document render path both go through
//! this writer, so their output cannot drift apart.

use std::io;

use crate::Token;
use e2_links_escape::{
    escape_href, escape_href_component, escape_html, FmtWriter, IoWriter, StrWrite,
};

struct HtmlWriter<I, W> {
    /// Iterator supplying tokens.
    iter: I,

    /// Writer to write to.
    writer: W,
}

impl<'a, I, W> HtmlWriter<I, W>
where
    I: Iterator<Item = Token<'a>>,
    W: StrWrite,
{
    fn new(iter: I, writer: W) -> Self {
        Self { iter, writer }
    }

    #[inline]
    fn write(&mut self, s: &str) -> Result<(), W::Error> {
        self.writer.write_str(s)
    }

    fn run(mut self) -> Result<(), W::Error> {
        while let Some(token) = self.iter.next() {
            match token {
                Token::Literal(text) => {
                    self.write(&text)?;
                }
                Token::ExternalLink { url, display } => {
                    self.write("<a href=\"")?;
                    escape_href(&mut self.writer, &url)?;
                    self.write("\" rel=\"nofollow\" class=\"externalLink\" target=\"_blank\">")?;
                    escape_html(&mut self.writer, &display)?;
                    self.write("</a>")?;
                }
                Token::InternalLink {
                    title,
                    display,
                    nodetype,
                    author,
                    anchor,
                } => {
                    self.write("<a href=\"")?;
                    if let Some(author) = &author {
                        self.write("/user/")?;
                        escape_href_component(&mut self.writer, author)?;
                        self.write("/writeups/")?;
                        escape_href_component(&mut self.writer, &title)?;
                    } else if let Some(nodetype) = &nodetype {
                        self.write("/")?;
                        escape_href_component(&mut self.writer, nodetype)?;
                        self.write("/")?;
                        escape_href_component(&mut self.writer, &title)?;
                    } else {
                        self.write("/title/")?;
                        escape_href_component(&mut self.writer, &title)?;
                    }
                    if let Some(anchor) = &anchor {
                        // synthesized anchors contain only href safe bytes
                        self.write("#")?;
                        self.write(anchor)?;
                    }
                    self.write("\" class=\"e2-link\">")?;
                    escape_html(&mut self.writer, &display)?;
                    self.write("</a>")?;
                }
            }
        }
        Ok(())
    }
}

/// Iterate over an iterator of link tokens, generate HTML for each token,
/// and push it to a `String`.
pub fn push_html<'a, I>(s: &mut String, iter: I)
where
    I: Iterator<Item = Token<'a>>,
{
    HtmlWriter::new(iter, s).run().unwrap()
}

/// Iterate over an iterator of link tokens, generate HTML for each token,
/// and write it out to an I/O stream.
///
/// **Note**: using this function with an unbuffered writer like a file or
/// socket will result in poor performance. Wrap these in a
/// [`BufWriter`](io::BufWriter) to prevent unnecessary slowdowns.
pub fn write_html_io<'a, I, W>(writer: W, iter: I) -> io::Result<()>
where
    I: Iterator<Item = Token<'a>>,
    W: io::Write,
{
    HtmlWriter::new(iter, IoWriter(writer)).run()
}

/// Iterate over an iterator of link tokens, generate HTML for each token,
/// and write it into Unicode-accepting buffer or stream.
pub fn write_html_fmt<'a, I, W>(writer: W, iter: I) -> std::fmt::Result
where
    I: Iterator<Item = Token<'a>>,
    W: std::fmt::Write,
{
    HtmlWriter::new(iter, FmtWriter(writer)).run()
}
