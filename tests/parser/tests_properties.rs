//! Structural properties that hold for every input.

#![allow(clippy::unwrap_used)]

use msbuild::parser::{ExpressionNode, ExpressionText, ParseOptions};
use msbuild::{TextRange, TextSize};
use rstest::rstest;

use crate::helpers::expression_helpers::*;

#[rstest]
#[case("")]
#[case("plain text")]
#[case("$(Foo)")]
#[case("a;b;;c;")]
#[case(";leading")]
#[case("@(Foo->'%(Identity).x', ', ')")]
#[case("$(Foo.Replace('a', 'b').Length)")]
#[case("$([System.String]::Join(';', @(X)))")]
#[case("$([System.IO.Path]::Combine($(Root), 'bin'))")]
#[case("$(Foo")]
#[case("$(foo() tail")]
#[case("$([Not.A.Type]::Foo()) tail")]
#[case("$(Registry:HKEY_CURRENT_USER\\x@y)z")]
#[case("%(Compile.Link)%(X) %(")]
#[case("é$(Ünïcode)ü@(Ä)")]
#[case("$(A.)$(.B)$()")]
#[case("@(I, ';');$(P)%(M)")]
fn test_span_coverage_and_bounds(
    #[case] text: &str,
    #[values(
        ParseOptions::NONE,
        ParseOptions::LIST,
        ParseOptions::ITEMS,
        ParseOptions::ITEM_LIST,
        ParseOptions::TRANSFORM
    )]
    options: ParseOptions,
    #[values(0, 17)] offset: u32,
) {
    let expression = parse_at(text, options, offset);
    assert_span_coverage(text, offset, &expression);
    assert_offsets_in_bounds(text, offset, &expression);
}

#[rstest]
#[case("pre@(Foo)post")]
#[case("$(A);@(B->'%(C)');%(D.E)")]
#[case("$([System.Math]::Max(1, $(X))) and $(Y.Trim())")]
#[case("$(Broken.)")]
fn test_reparse_of_rendered_text_is_identical(
    #[case] text: &str,
    #[values(ParseOptions::NONE, ParseOptions::ITEM_LIST)] options: ParseOptions,
) {
    let first = parse_at(text, options, 3);
    let rendered = render(text, 3, &first);
    assert_eq!(rendered, text);
    assert_eq!(parse_at(&rendered, options, 3), first);
}

#[rstest]
#[case("$(A)", "@(B)")]
#[case("x", "%(M)")]
#[case("@(I->'%(F)')", "$(P.Trim())")]
#[case("$([System.Math]::Abs(-1))", "tail")]
fn test_split_matches_independent_parses(
    #[case] a: &str,
    #[case] b: &str,
    #[values(ParseOptions::LIST, ParseOptions::ITEM_LIST)] options: ParseOptions,
) {
    let joined = format!("{a};{b}");
    let combined = parse_at(&joined, options, 0);

    let separator_at = a.len() as u32;
    let mut expected = parse_at(a, options, 0);
    expected.push(ExpressionNode::Text(ExpressionText {
        value: ";".to_string(),
        range: TextRange::at(TextSize::new(separator_at), TextSize::new(1)),
    }));
    expected.extend(parse_at(b, options, separator_at + 1));

    assert_eq!(combined, expected);
    assert_eq!(references(&combined).len(), references(&expected).len());
}
