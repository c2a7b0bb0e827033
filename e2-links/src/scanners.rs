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

//! Scanners for fragments of the bracket link syntax.
//!
//! Everything here is a bounded forward scan over bytes; there is no regex
//! engine and no backtracking, so adversarial input cannot blow up a page
//! render. Scans slice at ASCII delimiters only, which keeps all the string
//! slicing in the parser on UTF-8 character boundaries.

use memchr::memchr;

/// HTML containers whose bodies are never scanned for link syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Code,
    Pre,
}

impl Container {
    pub(crate) fn tag_name(self) -> &'static [u8] {
        match self {
            Container::Code => b"code",
            Container::Pre => b"pre",
        }
    }
}

/// Bytes permitted inside the URL portion of an external link.
pub(crate) fn is_url_byte(b: u8) -> bool {
    !matches!(b, b'[' | b']' | b'|' | b'<' | b'>' | b'"')
}

/// Bytes permitted in the display portion of an external link. The
/// display text runs to the closing bracket, so pipes after the first one
/// are display text, not delimiters.
pub(crate) fn is_display_byte(b: u8) -> bool {
    !matches!(b, b'[' | b']')
}

/// Returns the length of the ASCII whitespace run at the start of `data`.
pub(crate) fn scan_whitespace(data: &[u8]) -> usize {
    data.iter()
        .take_while(|&&b| b.is_ascii_whitespace())
        .count()
}

/// Scans `http://` or `https://`, returning the matched length.
pub(crate) fn scan_http_prefix(data: &[u8]) -> Option<usize> {
    if data.starts_with(b"http://") {
        Some(7)
    } else if data.starts_with(b"https://") {
        Some(8)
    } else {
        None
    }
}

/// Returns the length of the URL byte run at the start of `data`.
pub(crate) fn scan_url_bytes(data: &[u8]) -> usize {
    data.iter().take_while(|&&b| is_url_byte(b)).count()
}

/// Returns the length of the display byte run at the start of `data`.
pub(crate) fn scan_display_bytes(data: &[u8]) -> usize {
    data.iter().take_while(|&&b| is_display_byte(b)).count()
}

/// A nonempty run of decimal digits, used to tell a debate comment anchor
/// apart from a nodetype specifier.
pub(crate) fn is_decimal_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn starts_with_ignoring_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Scans an opening `<code ...>` or `<pre ...>` tag. `data` must start at
/// the `<`. Returns the tag length including the closing `>`.
pub(crate) fn scan_container_open(data: &[u8]) -> Option<(usize, Container)> {
    debug_assert_eq!(data.first(), Some(&b'<'));
    let container = if starts_with_ignoring_case(&data[1..], b"code") {
        Container::Code
    } else if starts_with_ignoring_case(&data[1..], b"pre") {
        Container::Pre
    } else {
        return None;
    };
    let name_end = 1 + container.tag_name().len();
    match data.get(name_end) {
        Some(b'>') => Some((name_end + 1, container)),
        Some(b) if b.is_ascii_whitespace() => {
            // opening tag with attributes, runs to the next `>`
            let close = memchr(b'>', &data[name_end..])?;
            Some((name_end + close + 1, container))
        }
        _ => None,
    }
}

/// Finds the earliest closing tag for `container` in `data`, returning the
/// range of the `</...>` tag itself. The match is non-greedy by
/// construction: the first closing tag wins.
pub(crate) fn find_container_close(data: &[u8], container: Container) -> Option<(usize, usize)> {
    let name = container.tag_name();
    let mut ix = 0;
    while let Some(lt) = memchr(b'<', &data[ix..]) {
        let start = ix + lt;
        let rest = &data[start..];
        if rest.len() >= name.len() + 3
            && rest[1] == b'/'
            && rest[2..2 + name.len()].eq_ignore_ascii_case(name)
            && rest[2 + name.len()] == b'>'
        {
            return Some((start, start + name.len() + 3));
        }
        ix = start + 1;
    }
    None
}
