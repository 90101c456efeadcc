#![allow(clippy::unwrap_used)]

use msbuild::hir::{Binder, BoundDocument, BoundElement};
use msbuild::parser::ExpressionNode;
use msbuild::syntax::{AttributeKind, ElementKind, XDocument};
use rstest::rstest;

fn bind(text: &str) -> BoundDocument {
    Binder::default().bind(&XDocument::parse(text))
}

fn element<'a>(document: &'a BoundDocument, name: &str) -> &'a BoundElement {
    document
        .elements()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("no element {name}"))
}

#[rstest]
#[case("<Project><PropertyGroup><A/></PropertyGroup></Project>", "A", ElementKind::Property)]
#[case("<Project><ItemGroup><A Include=\"x\"/></ItemGroup></Project>", "A", ElementKind::Item)]
#[case("<Project><ItemGroup><A Include=\"x\"><M/></A></ItemGroup></Project>", "M", ElementKind::Metadata)]
#[case("<Project><ItemDefinitionGroup><A/></ItemDefinitionGroup></Project>", "A", ElementKind::ItemDefinition)]
#[case("<Project><Target Name=\"T\"><Exec/></Target></Project>", "Exec", ElementKind::Task)]
#[case("<Project><Target Name=\"T\"><Exec><Output/></Exec></Target></Project>", "Output", ElementKind::Output)]
#[case("<Project><Import Project=\"x\"/></Project>", "Import", ElementKind::Import)]
#[case("<Project><Nope/></Project>", "Nope", ElementKind::Unknown)]
fn test_element_roles(#[case] text: &str, #[case] name: &str, #[case] kind: ElementKind) {
    assert_eq!(element(&bind(text), name).kind, kind);
}

#[test]
fn test_elements_inside_target_are_marked() {
    let document = bind(
        "<Project><Target Name=\"T\"><PropertyGroup><P>@(I)</P></PropertyGroup></Target></Project>",
    );
    let p = element(&document, "P");
    assert!(p.in_target);
    let value = p.value.as_ref().unwrap();
    assert!(matches!(value.expression.as_slice(), [ExpressionNode::Item(_)]));
}

#[test]
fn test_item_include_and_condition() {
    let text = r#"<Project><ItemGroup><C Include="a.cs;@(B)" Condition="'%(B.X)' == ''" /></ItemGroup></Project>"#;
    let document = bind(text);
    let c = element(&document, "C");

    let include = c.attribute(AttributeKind::Include).unwrap();
    let kinds: Vec<_> = include
        .value
        .expression
        .iter()
        .map(|n| match n {
            ExpressionNode::Text(t) => t.value.clone(),
            ExpressionNode::Item(i) => format!("@{}", i.name),
            other => format!("{other:?}"),
        })
        .collect();
    assert_eq!(kinds, vec!["a.cs", ";", "@B"]);

    let condition = c.attribute(AttributeKind::Condition).unwrap();
    assert!(condition
        .value
        .expression
        .iter()
        .any(|n| matches!(n, ExpressionNode::Metadata(m) if m.item_name.as_deref() == Some("B"))));
}

#[test]
fn test_value_ranges_point_into_source() {
    let text = r#"<Project><PropertyGroup><Out>$(Dir)\bin</Out></PropertyGroup></Project>"#;
    let document = bind(text);
    let value = element(&document, "Out").value.as_ref().unwrap();
    assert_eq!(document.slice(value.range), r"$(Dir)\bin");
    let property = &value.expression[0];
    assert_eq!(document.slice(property.range()), "$(Dir)");
}

#[test]
fn test_escaped_literals_are_unescaped() {
    let text = "<Project><PropertyGroup><A>a%3Bb &amp; $(X)</A></PropertyGroup></Project>";
    let document = bind(text);
    let value = element(&document, "A").value.as_ref().unwrap();
    assert_eq!(value.expression[0].as_text().unwrap().value, "a;b & ");
    assert_eq!(value.raw, "a%3Bb &amp; $(X)");
}

#[test]
fn test_xml_errors_are_kept_with_partial_tree() {
    let document = bind("<Project><PropertyGroup><A>1</B></PropertyGroup></Project>");
    assert!(!document.xml_errors.is_empty());
    assert!(document.root().is_some());
}
