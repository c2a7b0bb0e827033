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

//! Document and corpus statistics for link markup.
//!
//! Everything2 carries decades of user-authored text, and a migration or
//! audit wants to know which documents lean on odd corners of the bracket
//! grammar before anything is rewritten. The reports here flag those
//! corners without re-deriving any extraction logic: every count comes
//! from the same [`Parser`] the renderer uses.

use std::collections::{BTreeMap, HashSet};

use memchr::memchr_iter;
use unicase::UniCase;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::firstpass::scan_protected_regions;
use crate::scanners::Container;
use crate::utils::title_key;
use crate::{CowStr, Parser, Token};

/// Unusual markup shapes worth a second look before bulk processing.
///
/// The names are stable identifiers (see [`EdgeCase::as_str`]) so that
/// reports can be diffed across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeCase {
    /// The document contains `[[`, which never opens two links.
    NestedBrackets,
    /// The counts of `[` and `]` in the document differ.
    UnbalancedBrackets,
    /// A `[` followed only by whitespace and `]`.
    EmptyBrackets,
    /// A link span containing more than one `|`.
    MultiplePipesInLink,
    /// A link title containing `<`, `>`, `"` or `'`.
    SpecialCharsInLink,
    /// A link title containing an HTML entity such as `&amp;`.
    HtmlEntitiesInLink,
    /// Bracket characters inside a `<code>` region.
    BracketsInCode,
    /// Bracket characters inside a `<pre>` region.
    BracketsInPre,
    /// A link span containing a newline.
    NewlineInLink,
    /// A link title longer than 100 characters.
    VeryLongLinkTitle,
}

impl EdgeCase {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeCase::NestedBrackets => "nested_brackets",
            EdgeCase::UnbalancedBrackets => "unbalanced_brackets",
            EdgeCase::EmptyBrackets => "empty_brackets",
            EdgeCase::MultiplePipesInLink => "multiple_pipes_in_link",
            EdgeCase::SpecialCharsInLink => "special_chars_in_link",
            EdgeCase::HtmlEntitiesInLink => "html_entities_in_link",
            EdgeCase::BracketsInCode => "brackets_in_code",
            EdgeCase::BracketsInPre => "brackets_in_pre",
            EdgeCase::NewlineInLink => "newline_in_link",
            EdgeCase::VeryLongLinkTitle => "very_long_link_title",
        }
    }
}

/// Statistics for a single document.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DocumentReport {
    /// Total number of link tokens.
    pub links: usize,
    pub external_links: usize,
    pub internal_links: usize,
    /// Internal links carrying a nodetype, author or comment anchor.
    pub typed_links: usize,
    /// Links whose display text differs from their target.
    pub piped_links: usize,
    /// Each detected edge case, at most once, in declaration order.
    pub edge_cases: Vec<EdgeCase>,
}

/// Run the parser over one document and collect a [`DocumentReport`].
pub fn scan_document(text: &str) -> DocumentReport {
    scan_document_with(text, |_| {})
}

/// Shared single pass: the corpus scanner hooks `on_target` to collect
/// internal link titles without parsing the document a second time.
fn scan_document_with<'a>(
    text: &'a str,
    mut on_target: impl FnMut(&CowStr<'a>),
) -> DocumentReport {
    let mut report = DocumentReport::default();

    if text.contains("[[") {
        note(&mut report.edge_cases, EdgeCase::NestedBrackets);
    }
    let bytes = text.as_bytes();
    if memchr_iter(b'[', bytes).count() != memchr_iter(b']', bytes).count() {
        note(&mut report.edge_cases, EdgeCase::UnbalancedBrackets);
    }
    if has_empty_brackets(text) {
        note(&mut report.edge_cases, EdgeCase::EmptyBrackets);
    }
    for region in scan_protected_regions(text) {
        let body = &text[region.start..region.end];
        if body.contains('[') || body.contains(']') {
            note(
                &mut report.edge_cases,
                match region.body {
                    crate::firstpass::ItemBody::Protected(Container::Code) => {
                        EdgeCase::BracketsInCode
                    }
                    _ => EdgeCase::BracketsInPre,
                },
            );
        }
    }

    for (token, range) in Parser::new(text).into_offset_iter() {
        let raw = &text[range];
        match token {
            Token::Literal(_) => continue,
            Token::ExternalLink { url, display } => {
                report.links += 1;
                report.external_links += 1;
                if display != url {
                    report.piped_links += 1;
                }
            }
            Token::InternalLink {
                title,
                display,
                nodetype,
                author,
                anchor,
            } => {
                report.links += 1;
                report.internal_links += 1;
                on_target(&title);
                if nodetype.is_some() || author.is_some() || anchor.is_some() {
                    report.typed_links += 1;
                }
                if display != title {
                    report.piped_links += 1;
                }
                if title.chars().count() > 100 {
                    note(&mut report.edge_cases, EdgeCase::VeryLongLinkTitle);
                }
                if title.contains(['<', '>', '"', '\'']) {
                    note(&mut report.edge_cases, EdgeCase::SpecialCharsInLink);
                }
                if has_html_entity(&title) {
                    note(&mut report.edge_cases, EdgeCase::HtmlEntitiesInLink);
                }
            }
        }
        if raw.contains('\n') {
            note(&mut report.edge_cases, EdgeCase::NewlineInLink);
        }
        if memchr_iter(b'|', raw.as_bytes()).count() > 1 {
            note(&mut report.edge_cases, EdgeCase::MultiplePipesInLink);
        }
    }

    report.edge_cases.sort_unstable();
    report
}

fn note(cases: &mut Vec<EdgeCase>, case: EdgeCase) {
    if !cases.contains(&case) {
        cases.push(case);
    }
}

fn has_empty_brackets(text: &str) -> bool {
    let bytes = text.as_bytes();
    for start in memchr_iter(b'[', bytes) {
        let mut ix = start + 1;
        while ix < bytes.len() && bytes[ix].is_ascii_whitespace() {
            ix += 1;
        }
        if bytes.get(ix) == Some(&b']') {
            return true;
        }
    }
    false
}

/// Matches `&name;` and `&#123;` shapes, the ones legacy documents
/// actually contain.
fn has_html_entity(s: &str) -> bool {
    let bytes = s.as_bytes();
    for start in memchr_iter(b'&', bytes) {
        let mut ix = start + 1;
        if bytes.get(ix) == Some(&b'#') {
            ix += 1;
        }
        let name_start = ix;
        while ix < bytes.len() && bytes[ix].is_ascii_alphanumeric() {
            ix += 1;
        }
        if ix > name_start && bytes.get(ix) == Some(&b';') {
            return true;
        }
    }
    false
}

/// Accumulates [`DocumentReport`]s across a corpus.
#[derive(Debug, Default)]
pub struct CorpusScanner {
    documents: usize,
    links: usize,
    external_links: usize,
    internal_links: usize,
    targets: HashSet<UniCase<String>>,
    edge_case_counts: BTreeMap<EdgeCase, usize>,
    samples: BTreeMap<EdgeCase, String>,
}

impl CorpusScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one document, fold it into the corpus totals, and return its
    /// individual report.
    pub fn scan(&mut self, text: &str) -> DocumentReport {
        let targets = &mut self.targets;
        let report = scan_document_with(text, |title| {
            targets.insert(title_key(title));
        });

        self.documents += 1;
        self.links += report.links;
        self.external_links += report.external_links;
        self.internal_links += report.internal_links;
        for &case in &report.edge_cases {
            *self.edge_case_counts.entry(case).or_insert(0) += 1;
            self.samples
                .entry(case)
                .or_insert_with(|| excerpt(text));
        }

        report
    }

    pub fn finish(self) -> CorpusReport {
        CorpusReport {
            documents: self.documents,
            links: self.links,
            external_links: self.external_links,
            internal_links: self.internal_links,
            distinct_targets: self.targets.len(),
            edge_case_counts: self.edge_case_counts,
            samples: self.samples,
        }
    }
}

/// Corpus-wide totals produced by [`CorpusScanner::finish`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CorpusReport {
    pub documents: usize,
    pub links: usize,
    pub external_links: usize,
    pub internal_links: usize,
    /// Number of distinct internal targets, compared case-insensitively.
    pub distinct_targets: usize,
    /// How many documents exhibited each edge case.
    pub edge_case_counts: BTreeMap<EdgeCase, usize>,
    /// An excerpt of the first document that exhibited each edge case.
    pub samples: BTreeMap<EdgeCase, String>,
}

const EXCERPT_CHARS: usize = 80;

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((ix, _)) => text[..ix].to_owned(),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_by_kind() {
        let report = scan_document("[a] then [http://example.com|out] and [b|c]");
        assert_eq!(report.links, 3);
        assert_eq!(report.external_links, 1);
        assert_eq!(report.internal_links, 2);
        assert_eq!(report.piped_links, 2);
        assert_eq!(report.typed_links, 0);
        assert!(report.edge_cases.is_empty());
    }

    #[test]
    fn typed_links_counted() {
        let report = scan_document("[a[person]] [b[writeup by someone]] [c[7]]");
        assert_eq!(report.typed_links, 3);
    }

    #[test]
    fn nested_and_unbalanced_detected() {
        let report = scan_document("a [[b] c");
        assert!(report.edge_cases.contains(&EdgeCase::NestedBrackets));
        assert!(report.edge_cases.contains(&EdgeCase::UnbalancedBrackets));
    }

    #[test]
    fn empty_brackets_detected() {
        let report = scan_document("before [  ] after");
        assert!(report.edge_cases.contains(&EdgeCase::EmptyBrackets));
    }

    #[test]
    fn brackets_in_code_and_pre() {
        let report = scan_document("<code>[x]</code> <pre>no brackets</pre>");
        assert!(report.edge_cases.contains(&EdgeCase::BracketsInCode));
        assert!(!report.edge_cases.contains(&EdgeCase::BracketsInPre));
    }

    #[test]
    fn multiple_pipes_flagged() {
        let report = scan_document("[a|b|c]");
        assert!(report.edge_cases.contains(&EdgeCase::MultiplePipesInLink));
    }

    #[test]
    fn entities_and_special_chars_flagged() {
        let report = scan_document("[Tom &amp; Jerry] [it's <odd>]");
        assert!(report.edge_cases.contains(&EdgeCase::HtmlEntitiesInLink));
        assert!(report.edge_cases.contains(&EdgeCase::SpecialCharsInLink));
    }

    #[test]
    fn newline_in_link_flagged() {
        let report = scan_document("[line\nbreak]");
        assert!(report.edge_cases.contains(&EdgeCase::NewlineInLink));
    }

    #[test]
    fn long_title_flagged() {
        let text = format!("[{}]", "x".repeat(101));
        let report = scan_document(&text);
        assert!(report.edge_cases.contains(&EdgeCase::VeryLongLinkTitle));
    }

    #[test]
    fn corpus_targets_are_case_insensitive() {
        let mut scanner = CorpusScanner::new();
        scanner.scan("[Brian Eno] and [music]");
        scanner.scan("[brian eno] again");
        let report = scanner.finish();
        assert_eq!(report.documents, 2);
        assert_eq!(report.internal_links, 3);
        assert_eq!(report.distinct_targets, 2);
    }

    #[test]
    fn corpus_scan_report_matches_scan_document() {
        let text = "[a] [b[e2node]] [http://x.example|y]";
        let mut scanner = CorpusScanner::new();
        let from_scanner = scanner.scan(text);
        assert_eq!(from_scanner, scan_document(text));
        let report = scanner.finish();
        assert_eq!(report.distinct_targets, 2);
    }

    #[test]
    fn corpus_counts_documents_per_edge_case() {
        let mut scanner = CorpusScanner::new();
        scanner.scan("[[x]]");
        scanner.scan("clean [link]");
        scanner.scan("[[y]]");
        let report = scanner.finish();
        assert_eq!(report.edge_case_counts[&EdgeCase::NestedBrackets], 2);
        assert!(report.samples[&EdgeCase::NestedBrackets].starts_with("[[x]]"));
    }
}
