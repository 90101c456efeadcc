#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use msbuild::parser::{
    ExpressionErrorKind, ExpressionNode, Invocation, ParseOptions, has_errors,
};
use rstest::rstest;

use crate::helpers::expression_helpers::*;

fn single(text: &str, options: ParseOptions) -> ExpressionNode {
    let mut nodes = parse_at(text, options, 0);
    assert_eq!(nodes.len(), 1, "expected one node for {text:?}, got {nodes:?}");
    nodes.remove(0)
}

fn invocation(node: ExpressionNode) -> Invocation {
    match node {
        ExpressionNode::Invocation(invocation) => invocation,
        other => panic!("expected an invocation, got {other:?}"),
    }
}

fn error_kind(node: &ExpressionNode) -> &ExpressionErrorKind {
    match node {
        ExpressionNode::Error(error) => &error.kind,
        other => panic!("expected an error, got {other:?}"),
    }
}

// =============================================================================
// ITEMS
// =============================================================================

#[test]
fn test_bare_item_reference() {
    let node = single("@(Foo)", ParseOptions::ITEM_LIST);
    let ExpressionNode::Item(item) = node else {
        panic!("expected an item reference");
    };
    assert_eq!(item.name, "Foo");
    assert!(item.transform.is_none());
    assert!(item.separator.is_none());
    assert_eq!(item.range, range(0, 6));
    assert_eq!(item.name_range, range(2, 5));
}

#[test]
fn test_item_between_literals_at_offset() {
    let nodes = parse_at("pre@(Foo)post", ParseOptions::NONE.with_items(true), 5);
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].as_text().map(|t| t.value.as_str()), Some("pre"));
    assert_eq!(nodes[0].range(), range(5, 8));
    assert!(matches!(&nodes[1], ExpressionNode::Item(item) if item.name == "Foo"));
    assert_eq!(nodes[1].range(), range(8, 14));
    assert_eq!(nodes[2].as_text().map(|t| t.value.as_str()), Some("post"));
    assert_eq!(nodes[2].range(), range(14, 18));
}

#[test]
fn test_item_transform_and_separator() {
    let text = "@(Compile->'%(Filename).obj', ' ')";
    let ExpressionNode::Item(item) = single(text, ParseOptions::ITEM_LIST) else {
        panic!("expected an item reference");
    };
    let transform = item.transform.unwrap();
    let metadata = transform
        .iter()
        .find_map(|n| match n {
            ExpressionNode::Metadata(m) => Some(m),
            _ => None,
        })
        .unwrap();
    assert_eq!(metadata.metadata_name, "Filename");
    assert!(metadata.item_name.is_none());
    assert_eq!(slice(text, 0, metadata.range), "%(Filename)");

    let separator = item.separator.unwrap();
    assert_eq!(separator.len(), 1);
    assert_eq!(slice(text, 0, separator[0].range()), " ");
    assert_eq!(item.original_text, text);
}

#[rstest]
#[case("@(Foo")]
#[case("@()")]
#[case("@(1Foo)")]
#[case("@(Foo->)")]
fn test_malformed_items_stay_literal(#[case] text: &str) {
    let nodes = parse_at(text, ParseOptions::ITEM_LIST, 0);
    assert!(nodes.iter().all(|n| n.is_text()), "{text:?} produced {nodes:?}");
}

#[test]
fn test_items_not_recognised_without_option() {
    let nodes = parse_at("@(Foo)", ParseOptions::NONE, 0);
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].is_text());
}

// =============================================================================
// METADATA
// =============================================================================

#[test]
fn test_qualified_metadata() {
    let text = "%(Compile.Link)";
    let ExpressionNode::Metadata(metadata) = single(text, ParseOptions::ITEMS) else {
        panic!("expected a metadata reference");
    };
    assert_eq!(metadata.item_name.as_deref(), Some("Compile"));
    assert_eq!(metadata.metadata_name, "Link");
    assert_eq!(metadata.item_name_range, Some(range(2, 9)));
    assert_eq!(metadata.metadata_name_range, range(10, 14));
}

#[test]
fn test_metadata_requires_option() {
    let nodes = parse_at("%(Link)", ParseOptions::NONE, 0);
    assert!(nodes.iter().all(|n| n.is_text()));
}

// =============================================================================
// PROPERTIES AND INVOCATIONS
// =============================================================================

#[test]
fn test_simple_property() {
    let node = single("$( Foo )", ParseOptions::NONE);
    let ExpressionNode::Property(property) = node else {
        panic!("expected a property reference");
    };
    assert_eq!(property.name, "Foo");
    assert_eq!(property.name_range, range(3, 6));
    assert_eq!(property.range, range(0, 8));
}

#[test]
fn test_instance_method_on_property() {
    let call = invocation(single("$(Foo.Bar())", ParseOptions::NONE));
    assert_eq!(call.name, "Bar");
    assert_eq!(argument_texts(&call), Some(vec![]));
    assert!(call.static_type.is_none());
    match call.target.as_deref() {
        Some(ExpressionNode::Property(property)) => assert_eq!(property.name, "Foo"),
        other => panic!("expected a property receiver, got {other:?}"),
    }
}

#[test]
fn test_static_function_arguments() {
    let call = invocation(single("$([System.String]::Join(',', a))", ParseOptions::NONE));
    assert_eq!(call.static_type.as_deref(), Some("System.String"));
    assert!(call.target.is_none());
    assert_eq!(call.name, "Join");
    assert_eq!(argument_texts(&call), Some(vec!["','", " a"]));
}

#[test]
fn test_chain_nests_previous_call_as_target() {
    let text = "$(Foo.Replace('a', 'b').Length)";
    let last = invocation(single(text, ParseOptions::NONE));
    assert_eq!(last.name, "Length");
    assert!(last.arguments.is_none());
    assert_eq!(last.range, range(0, text.len() as u32));

    let replace = invocation(*last.target.unwrap());
    assert_eq!(replace.name, "Replace");
    assert_eq!(replace.arguments.as_ref().map(Vec::len), Some(2));
    assert!(matches!(replace.target.as_deref(), Some(ExpressionNode::Property(p)) if p.name == "Foo"));
}

#[test]
fn test_static_member_without_call() {
    let call = invocation(single("$([System.IO.Path]::DirectorySeparatorChar)", ParseOptions::NONE));
    assert_eq!(call.name, "DirectorySeparatorChar");
    assert!(call.arguments.is_none());
}

#[test]
fn test_unknown_static_type_is_error_at_bracket() {
    let node = single("$([Not.A.Type]::Foo())", ParseOptions::NONE);
    let ExpressionNode::Error(error) = &node else {
        panic!("expected an error");
    };
    assert_eq!(u32::from(error.position), 2);
    assert_eq!(error.kind, ExpressionErrorKind::UnknownType("Not.A.Type".into()));
    assert!(error.message().contains("Not.A.Type"));
}

#[test]
fn test_short_type_name_needs_full_name() {
    let node = single("$([String]::Empty)", ParseOptions::NONE);
    match error_kind(&node) {
        ExpressionErrorKind::NeedsFullTypeName { name, suggestion } => {
            assert_eq!(name, "String");
            assert_eq!(*suggestion, Some("System.String"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_disallowed_member_names_member() {
    let node = single("$([System.IO.File]::Delete('x'))", ParseOptions::NONE);
    let ExpressionNode::Error(error) = &node else {
        panic!("expected an error");
    };
    assert!(error.message().contains("Delete"));
    assert_eq!(error.range, range(0, 32));
}

#[rstest]
#[case("$(Foo", ExpressionErrorKind::UnterminatedReference)]
#[case("$(Foo.Bar(1, 2", ExpressionErrorKind::UnterminatedArguments)]
#[case("$([System.String]Join())", ExpressionErrorKind::ExpectedStaticMember)]
#[case("$(foo()", ExpressionErrorKind::MissingReceiver("foo".into()))]
#[case("$(Foo.Bar()x)", ExpressionErrorKind::UnexpectedCharacter('x'))]
fn test_property_errors(#[case] text: &str, #[case] expected: ExpressionErrorKind) {
    let nodes = parse_at(text, ParseOptions::NONE, 0);
    let error = nodes.iter().find(|n| n.is_error()).unwrap();
    assert_eq!(error_kind(error), &expected);
}

#[test]
fn test_error_recovers_after_balancing_paren() {
    let nodes = parse_at("$([Nope.X]::Y()) and $(Ok)", ParseOptions::NONE, 0);
    assert!(nodes[0].is_error());
    assert_eq!(nodes[0].range(), range(0, 16));
    assert!(matches!(nodes.last(), Some(ExpressionNode::Property(p)) if p.name == "Ok"));
}

#[test]
fn test_references_inside_arguments_are_parsed() {
    let text = "$([System.IO.Path]::Combine($(B), 'x'))";
    let call = invocation(single(text, ParseOptions::NONE));
    let arguments = call.arguments.unwrap();
    assert_eq!(arguments[0].range, range(28, 32));
    match arguments[0].expression.as_slice() {
        [ExpressionNode::Property(property)] => {
            assert_eq!(property.name, "B");
            assert_eq!(property.name_range, range(30, 31));
        }
        other => panic!("expected a property argument, got {other:?}"),
    }
}

#[test]
fn test_error_inside_argument_is_found() {
    let nodes = parse_at("$(Foo.Replace($([Nope]::X()), 'b'))", ParseOptions::NONE, 0);
    assert_eq!(nodes.len(), 1);
    assert!(!nodes[0].is_error());
    assert!(has_errors(&nodes));
}

#[test]
fn test_trailing_dot_ends_chain() {
    let nodes = parse_at("$(Foo.Trim().", ParseOptions::NONE, 0);
    assert!(!has_errors(&nodes));
    assert_eq!(invocation(nodes[0].clone()).name, "Trim");
}

#[test]
fn test_registry_reference_is_opaque() {
    let nodes = parse_at("$(Registry:HKEY_LOCAL_MACHINE\\Software@Path)", ParseOptions::NONE, 0);
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].is_text());
}

// =============================================================================
// LIST SPLITTING
// =============================================================================

#[test]
fn test_split_emits_separator_runs() {
    let nodes = parse_at("a;;$(B)", ParseOptions::LIST, 0);
    let values: Vec<_> = nodes
        .iter()
        .map(|n| slice("a;;$(B)", 0, n.range()).to_string())
        .collect();
    assert_eq!(values, vec!["a", ";", ";", "$(B)"]);
}

#[test]
fn test_semicolon_inside_reference_does_not_split() {
    let text = "$(Foo.Split(';'))";
    let nodes = parse_at(text, ParseOptions::LIST, 0);
    assert_eq!(nodes.len(), 1);
    assert_eq!(argument_texts(&invocation(nodes[0].clone())), Some(vec!["';'"]));
}
