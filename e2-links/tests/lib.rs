// Integration tests for the parser surface.

use e2_links::{parse, LiteralMergeStream, Parser, Token, EMPTY_LINK_LABEL};

/// Asserts that the offset iterator's spans are ascending, disjoint and
/// cover the whole input, then returns the tokens.
fn check_coverage(text: &str) -> Vec<Token<'_>> {
    let mut pos = 0;
    let mut tokens = Vec::new();
    for (token, range) in Parser::new(text).into_offset_iter() {
        assert_eq!(range.start, pos, "gap or overlap at {pos} in {text:?}");
        assert!(range.end >= range.start);
        tokens.push(token);
        pos = range.end;
    }
    assert_eq!(pos, text.len(), "spans do not reach end of {text:?}");
    tokens
}

#[test]
fn spans_cover_source_exactly() {
    let inputs = [
        "",
        "no markup at all",
        "[a]",
        "x[a]y[b|c]z",
        "[a[e2node]] mid [http://example.com|ex] end",
        "<code>[a]</code>[b]<pre>[c]</pre>",
        "mis [ matched ]] brackets [ everywhere",
        "[a[b]c[d]",
        "[[doubled]]",
        "ends with open [",
        "ends with pipe [a|",
    ];
    for input in inputs {
        check_coverage(input);
    }
}

#[test]
fn parsing_is_total_on_bracket_noise() {
    // Large runs of brackets must parse in one pass with no failure mode.
    let mut noise = String::new();
    for i in 0..4000 {
        noise.push(match i % 5 {
            0 => '[',
            1 => ']',
            2 => '|',
            3 => 'x',
            _ => ' ',
        });
    }
    let tokens = check_coverage(&noise);
    assert!(!tokens.is_empty());
}

#[test]
fn parsing_is_deterministic() {
    let input = "a [b] c [d|e] f [g[h]] <code>[i]</code> [http://j.example]";
    assert_eq!(parse(input), parse(input));
    assert_eq!(parse(input), Parser::new(input).collect::<Vec<_>>());
}

#[test]
fn rendered_literals_reconstruct_plain_text() {
    // With no recognized links, the merged stream is the input itself.
    let input = "nothing <code>[here]</code> links, not even ] or [ alone";
    let tokens: Vec<_> = LiteralMergeStream::new(Parser::new(input)).collect();
    assert_eq!(tokens, [Token::Literal(input.into())]);
}

#[test]
fn adjacent_links_have_no_gap_literal() {
    let tokens = parse("[a][b]");
    assert_eq!(
        tokens,
        [
            Token::InternalLink {
                title: "a".into(),
                display: "a".into(),
                nodetype: None,
                author: None,
                anchor: None,
            },
            Token::InternalLink {
                title: "b".into(),
                display: "b".into(),
                nodetype: None,
                author: None,
                anchor: None,
            },
        ]
    );
}

#[test]
fn external_priority_over_enclosing_candidate() {
    // The candidate "[x [http://a.example] y]" is discarded because it
    // overlaps the already-claimed external link.
    let tokens = parse("[x [http://a.example] y]");
    assert_eq!(
        tokens,
        [
            Token::Literal("[x ".into()),
            Token::ExternalLink {
                url: "http://a.example".into(),
                display: "http://a.example".into(),
            },
            Token::Literal(" y]".into()),
        ]
    );
}

#[test]
fn empty_external_display_uses_placeholder() {
    let tokens = parse("[https://example.org|]");
    assert_eq!(
        tokens,
        [Token::ExternalLink {
            url: "https://example.org".into(),
            display: EMPTY_LINK_LABEL.into(),
        }]
    );
}

#[test]
fn protected_regions_nest_no_links() {
    let input = "a <PRE class=\"x\">[one] [two|three]</pre> b [four]";
    let tokens = parse(input);
    assert_eq!(
        tokens,
        [
            Token::Literal("a ".into()),
            Token::Literal("<PRE class=\"x\">[one] [two|three]</pre>".into()),
            Token::Literal(" b ".into()),
            Token::InternalLink {
                title: "four".into(),
                display: "four".into(),
                nodetype: None,
                author: None,
                anchor: None,
            },
        ]
    );
}

#[test]
fn unterminated_protected_tag_protects_nothing() {
    let tokens = parse("before <code>[x] and no close");
    assert_eq!(
        tokens,
        [
            Token::Literal("before <code>".into()),
            Token::InternalLink {
                title: "x".into(),
                display: "x".into(),
                nodetype: None,
                author: None,
                anchor: None,
            },
            Token::Literal(" and no close".into()),
        ]
    );
}

#[test]
fn tokens_can_outlive_the_source() {
    let tokens: Vec<Token<'static>> = {
        let source = String::from("[owned title|shown]");
        parse(&source).into_iter().map(Token::into_static).collect()
    };
    assert_eq!(
        tokens,
        [Token::InternalLink {
            title: "owned title".into(),
            display: "shown".into(),
            nodetype: None,
            author: None,
            anchor: None,
        }]
    );
}

#[test]
fn author_case_is_preserved_nodetype_is_not() {
    let tokens = parse("[Title[Writeup by McSnarf]]");
    assert_eq!(
        tokens,
        [Token::InternalLink {
            title: "Title".into(),
            display: "Title".into(),
            nodetype: Some("writeup".into()),
            author: Some("McSnarf".into()),
            anchor: None,
        }]
    );
}
