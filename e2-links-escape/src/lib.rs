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

//! Utility functions for HTML escaping and URL encoding. Only useful when
//! building an HTML renderer on top of the `e2-links` token stream.

#![forbid(unsafe_code)]

use std::convert::Infallible;
use std::fmt::{self, Arguments};
use std::io::{self, Write};

/// A fmt::Write adapter that implements [`StrWrite`].
#[derive(Debug)]
pub struct FmtWriter<W>(pub W);

/// An io::Write adapter that implements [`StrWrite`].
#[derive(Debug)]
pub struct IoWriter<W>(pub W);

/// Trait that allows writing string slices, generic over the error type.
///
/// This is implemented both for `String` (infallibly) and for fmt/io writers
/// through the [`FmtWriter`] and [`IoWriter`] adapters.
pub trait StrWrite {
    type Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error>;

    fn write_fmt(&mut self, args: Arguments) -> Result<(), Self::Error>;
}

impl<W> StrWrite for FmtWriter<W>
where
    W: fmt::Write,
{
    type Error = fmt::Error;

    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments) -> fmt::Result {
        self.0.write_fmt(args)
    }
}

impl<W> StrWrite for IoWriter<W>
where
    W: Write,
{
    type Error = io::Error;

    #[inline]
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.0.write_all(s.as_bytes())
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments) -> io::Result<()> {
        self.0.write_fmt(args)
    }
}

impl StrWrite for String {
    type Error = Infallible;

    #[inline]
    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.push_str(s);
        Ok(())
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments) -> Result<(), Infallible> {
        // FmtWrite infallible for String
        fmt::Write::write_fmt(self, args).map_err(|_| unreachable!())
    }
}

impl<W> StrWrite for &'_ mut W
where
    W: StrWrite,
{
    type Error = W::Error;

    #[inline]
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        (**self).write_str(s)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments) -> Result<(), Self::Error> {
        (**self).write_fmt(args)
    }
}

impl StrWrite for io::Sink {
    type Error = io::Error;

    fn write_str(&mut self, _s: &str) -> io::Result<()> {
        Ok(())
    }

    fn write_fmt(&mut self, _args: Arguments) -> io::Result<()> {
        Ok(())
    }
}

#[rustfmt::skip]
static HREF_SAFE: [u8; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 1, 0, 1, 1, 1, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 1,
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 0,
];

// The unreserved set of encodeURIComponent: ALPHA / DIGIT / - _ . ! ~ * ' ( )
#[rustfmt::skip]
static COMPONENT_SAFE: [u8; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 1, 0, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 0,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0,
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 1,
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 0,
];

static HEX_CHARS: &[u8] = b"0123456789ABCDEF";
static AMP_ESCAPE: &str = "&amp;";
static SINGLE_QUOTE_ESCAPE: &str = "&#x27;";

/// Writes an href to the buffer, escaping href unsafe bytes.
///
/// Ampersands and single quotes are entity-escaped so the result can be
/// placed inside a double-quoted HTML attribute; everything else unsafe is
/// percent-encoded. Intended for complete URLs, so `/`, `?`, `#` and the
/// other URL structure characters pass through untouched.
pub fn escape_href<W>(mut w: W, s: &str) -> Result<(), W::Error>
where
    W: StrWrite,
{
    let bytes = s.as_bytes();
    let mut mark = 0;
    for i in 0..bytes.len() {
        let c = bytes[i];
        if c >= 0x80 || HREF_SAFE[c as usize] == 0 {
            // character needing escape

            // write partial substring up to mark
            if mark < i {
                w.write_str(&s[mark..i])?;
            }
            match c {
                b'&' => {
                    w.write_str(AMP_ESCAPE)?;
                }
                b'\'' => {
                    w.write_str(SINGLE_QUOTE_ESCAPE)?;
                }
                _ => {
                    let mut buf = [0u8; 3];
                    buf[0] = b'%';
                    buf[1] = HEX_CHARS[((c as usize) >> 4) & 0xF];
                    buf[2] = HEX_CHARS[(c as usize) & 0xF];
                    let escaped = std::str::from_utf8(&buf).unwrap();
                    w.write_str(escaped)?;
                }
            }
            mark = i + 1; // all escaped characters are ASCII
        }
    }
    w.write_str(&s[mark..])
}

/// Writes a single path segment to the buffer, percent-encoding everything
/// outside the unreserved set of `encodeURIComponent`.
///
/// Unlike [`escape_href`] this also encodes `/`, `?`, `#` and `&`, which is
/// what node titles interpolated into site paths need.
pub fn escape_href_component<W>(mut w: W, s: &str) -> Result<(), W::Error>
where
    W: StrWrite,
{
    let bytes = s.as_bytes();
    let mut mark = 0;
    for i in 0..bytes.len() {
        let c = bytes[i];
        if c >= 0x80 || COMPONENT_SAFE[c as usize] == 0 {
            if mark < i {
                w.write_str(&s[mark..i])?;
            }
            let mut buf = [0u8; 3];
            buf[0] = b'%';
            buf[1] = HEX_CHARS[((c as usize) >> 4) & 0xF];
            buf[2] = HEX_CHARS[(c as usize) & 0xF];
            let escaped = std::str::from_utf8(&buf).unwrap();
            w.write_str(escaped)?;
            mark = i + 1;
        }
    }
    w.write_str(&s[mark..])
}

const fn create_html_escape_table(body: bool) -> [u8; 256] {
    let mut table = [0; 256];
    table[b'"' as usize] = if body { 0 } else { 1 };
    table[b'&' as usize] = 2;
    table[b'<' as usize] = 3;
    table[b'>' as usize] = 4;
    table
}

static HTML_ESCAPE_TABLE: [u8; 256] = create_html_escape_table(false);
static HTML_BODY_TEXT_ESCAPE_TABLE: [u8; 256] = create_html_escape_table(true);

static HTML_ESCAPES: [&str; 5] = ["", "&quot;", "&amp;", "&lt;", "&gt;"];

/// Writes the given string to the Write sink, replacing special HTML bytes
/// (`<`, `>`, `&`, `"`) by escape sequences.
///
/// Use this function to write output to quoted HTML attributes and to text
/// that may land in either attribute or body position.
pub fn escape_html<W: StrWrite>(w: W, s: &str) -> Result<(), W::Error> {
    escape_html_scalar(w, s, &HTML_ESCAPE_TABLE)
}

/// For use in HTML body text, writes the given string to the Write sink,
/// replacing special HTML bytes (`<`, `>`, `&`) by escape sequences.
///
/// `"` is not escaped, which is correct outside of attributes but makes
/// this function unsuitable for writing into quoted attribute values.
pub fn escape_html_body_text<W: StrWrite>(w: W, s: &str) -> Result<(), W::Error> {
    escape_html_scalar(w, s, &HTML_BODY_TEXT_ESCAPE_TABLE)
}

fn escape_html_scalar<W: StrWrite>(
    mut w: W,
    s: &str,
    table: &'static [u8; 256],
) -> Result<(), W::Error> {
    let bytes = s.as_bytes();
    let mut mark = 0;
    let mut i = 0;
    while i < s.len() {
        match bytes[i..].iter().position(|&c| table[c as usize] != 0) {
            Some(pos) => {
                i += pos;
            }
            None => break,
        }
        let c = bytes[i];
        let escape = table[c as usize];
        let escape_seq = HTML_ESCAPES[escape as usize];
        w.write_str(&s[mark..i])?;
        w.write_str(escape_seq)?;
        i += 1;
        mark = i; // all escaped characters are ASCII
    }
    w.write_str(&s[mark..])
}

#[cfg(test)]
mod test {
    use super::*;

    fn html(s: &str) -> String {
        let mut out = String::new();
        escape_html(&mut out, s).unwrap();
        out
    }

    fn component(s: &str) -> String {
        let mut out = String::new();
        escape_href_component(&mut out, s).unwrap();
        out
    }

    #[test]
    fn escape_html_specials() {
        assert_eq!(html("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(html("<script>"), "&lt;script&gt;");
        assert_eq!(html(r#"He said "hello""#), "He said &quot;hello&quot;");
        assert_eq!(html(""), "");
    }

    #[test]
    fn escape_html_body_keeps_quotes() {
        let mut out = String::new();
        escape_html_body_text(&mut out, r#"a "b" <c>"#).unwrap();
        assert_eq!(out, r#"a "b" &lt;c&gt;"#);
    }

    #[test]
    fn escape_href_entities_and_percent() {
        let mut out = String::new();
        escape_href(&mut out, "https://example.com/path?query=1&foo=bar").unwrap();
        assert_eq!(out, "https://example.com/path?query=1&amp;foo=bar");

        let mut out = String::new();
        escape_href(&mut out, "http://example.com/a b").unwrap();
        assert_eq!(out, "http://example.com/a%20b");

        let mut out = String::new();
        escape_href(&mut out, "http://example.com/it's").unwrap();
        assert_eq!(out, "http://example.com/it&#x27;s");
    }

    #[test]
    fn component_matches_encode_uri_component() {
        assert_eq!(component("Tom & Jerry"), "Tom%20%26%20Jerry");
        assert_eq!(component("a/b"), "a%2Fb");
        assert_eq!(component("brain-dump_2.0!"), "brain-dump_2.0!");
        // non-ascii goes through utf-8 percent encoding
        assert_eq!(component("caf\u{e9}"), "caf%C3%A9");
    }
}
