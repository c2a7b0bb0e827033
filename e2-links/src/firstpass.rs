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

//! The span-resolution pass.
//!
//! This runs before any token is handed out: protected `<code>`/`<pre>`
//! regions are located first and excluded wholesale, then external links are
//! claimed, then internal candidates, with any internal candidate that
//! touches an already-claimed external span discarded. What survives is a
//! sorted, disjoint span plan that the token iterator replays, filling the
//! gaps with literal text.

use memchr::memchr;

use crate::linkspec::{classify, LinkSpec};
use crate::scanners::{
    find_container_close, scan_container_open, scan_display_bytes, scan_http_prefix,
    scan_url_bytes, scan_whitespace, Container,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Item<'a> {
    pub start: usize,
    pub end: usize,
    pub body: ItemBody<'a>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ItemBody<'a> {
    /// A code/pre body, emitted as one atomic literal.
    Protected(Container),
    /// `display` is `None` when no pipe was present; an empty display after
    /// a pipe becomes the `[link]` placeholder at token build time.
    ExternalLink {
        url: &'a str,
        display: Option<&'a str>,
    },
    InternalLink(LinkSpec<'a>),
}

/// Resolves the complete span plan for `text`: sorted by start offset,
/// pairwise disjoint, never extending past the end of input.
pub(crate) fn run_first_pass(text: &str) -> Vec<Item<'_>> {
    let protected = scan_protected_regions(text);
    let external = scan_external_links(text, &protected);
    let internal = scan_internal_links(text, &protected, &external);

    let mut items = protected;
    items.extend(external);
    items.extend(internal);
    items.sort_unstable_by_key(|item| item.start);
    items
}

/// Locates `<code>...</code>` and `<pre>...</pre>` regions, left to right,
/// earliest opening tag first, each closed by the nearest matching closing
/// tag. An opening tag with no closing tag protects nothing.
pub(crate) fn scan_protected_regions(text: &str) -> Vec<Item<'_>> {
    let bytes = text.as_bytes();
    let mut regions = Vec::new();
    let mut ix = 0;
    while let Some(lt) = memchr(b'<', &bytes[ix..]) {
        let start = ix + lt;
        if let Some((open_len, container)) = scan_container_open(&bytes[start..]) {
            let body_start = start + open_len;
            if let Some((_, close_end)) = find_container_close(&bytes[body_start..], container) {
                let end = body_start + close_end;
                regions.push(Item {
                    start,
                    end,
                    body: ItemBody::Protected(container),
                });
                ix = end;
                continue;
            }
        }
        ix = start + 1;
    }
    regions
}

fn scan_external_links<'a>(text: &'a str, protected: &[Item<'a>]) -> Vec<Item<'a>> {
    let bytes = text.as_bytes();
    let mut links: Vec<Item<'a>> = Vec::new();
    let mut ix = 0;
    while let Some(br) = memchr(b'[', &bytes[ix..]) {
        let open = ix + br;
        ix = open + 1;
        if let Some(region_end) = region_end_containing(protected, open) {
            ix = region_end;
            continue;
        }

        let url_start = open + 1 + scan_whitespace(&bytes[open + 1..]);
        let prefix = match scan_http_prefix(&bytes[url_start..]) {
            Some(prefix) => prefix,
            None => continue,
        };
        let tail = scan_url_bytes(&bytes[url_start + prefix..]);
        if tail == 0 {
            continue;
        }
        let url_end = url_start + prefix + tail;

        let (end, display) = match bytes.get(url_end) {
            Some(b']') => (url_end + 1, None),
            Some(b'|') => {
                let display_start = url_end + 1;
                let display_end = display_start + scan_display_bytes(&bytes[display_start..]);
                if bytes.get(display_end) != Some(&b']') {
                    continue;
                }
                (display_end + 1, Some(text[display_start..display_end].trim()))
            }
            _ => continue,
        };
        if intersects(protected, open, end) {
            continue;
        }
        links.push(Item {
            start: open,
            end,
            body: ItemBody::ExternalLink {
                url: text[url_start..url_end].trim_end(),
                display,
            },
        });
        ix = end;
    }
    links
}

fn scan_internal_links<'a>(
    text: &'a str,
    protected: &[Item<'a>],
    external: &[Item<'a>],
) -> Vec<Item<'a>> {
    let bytes = text.as_bytes();
    let mut links = Vec::new();
    let mut ix = 0;
    while let Some(br) = memchr(b'[', &bytes[ix..]) {
        let open = ix + br;
        ix = open + 1;
        if let Some(region_end) = region_end_containing(protected, open) {
            ix = region_end;
            continue;
        }
        let end = match scan_candidate(bytes, open) {
            Some(end) => end,
            None => continue,
        };
        if intersects(protected, open, end) {
            continue;
        }
        // the candidate is consumed whether or not it survives, so a
        // discarded run is never re-scanned for links halfway through
        ix = end;
        if intersects(external, open, end) {
            continue;
        }
        if let Some(spec) = classify(&text[open + 1..end - 1]) {
            links.push(Item {
                start: open,
                end,
                body: ItemBody::InternalLink(spec),
            });
        }
    }
    links
}

/// Scans an internal-link candidate starting at the `[` at `open`:
/// either `[A]` or `[A[B]C]` with `A` and `C` bracket-free and `B` closed
/// by the first `]` that follows it. Returns the end offset past the
/// closing bracket, or `None` when no candidate terminates before the end
/// of input.
fn scan_candidate(bytes: &[u8], open: usize) -> Option<usize> {
    let (a_end, delim) = next_bracket(bytes, open + 1)?;
    if delim == b']' {
        return Some(a_end + 1);
    }
    let b_close = a_end + 1 + memchr(b']', &bytes[a_end + 1..])?;
    let (c_end, delim) = next_bracket(bytes, b_close + 1)?;
    if delim == b']' {
        Some(c_end + 1)
    } else {
        None
    }
}

fn next_bracket(bytes: &[u8], from: usize) -> Option<(usize, u8)> {
    memchr::memchr2(b'[', b']', &bytes[from..]).map(|ix| (from + ix, bytes[from + ix]))
}

/// If `pos` falls inside one of the sorted, disjoint `items`, returns that
/// item's end offset.
fn region_end_containing(items: &[Item<'_>], pos: usize) -> Option<usize> {
    let ix = items.partition_point(|item| item.end <= pos);
    items
        .get(ix)
        .filter(|item| item.start <= pos)
        .map(|item| item.end)
}

/// Whether `start..end` intersects any of the sorted, disjoint `items`.
fn intersects(items: &[Item<'_>], start: usize, end: usize) -> bool {
    let ix = items.partition_point(|item| item.end <= start);
    items.get(ix).is_some_and(|item| item.start < end)
}
