#![allow(clippy::unwrap_used)]

use msbuild::hir::{
    Binder, BoundDocument, BuiltinSchema, ReferenceUsage, ResolvingVisitor, SymbolKey,
    SymbolKind, run_reference_search, symbol_at,
};
use msbuild::syntax::XDocument;
use msbuild::{TextRange, TextSize};
use rstest::rstest;

use crate::helpers::source_fixtures::SIMPLE_PROPERTY_READ;

fn bind(text: &str) -> BoundDocument {
    Binder::default().bind(&XDocument::parse(text))
}

fn search(document: &BoundDocument, key: &SymbolKey) -> Vec<(String, ReferenceUsage)> {
    let mut sink: Vec<(TextRange, ReferenceUsage)> = Vec::new();
    run_reference_search(document, key, &mut sink);
    sink.into_iter()
        .map(|(range, usage)| (document.slice(range).to_string(), usage))
        .collect()
}

#[test]
fn test_property_write_then_read_at_exact_offsets() {
    let text = SIMPLE_PROPERTY_READ;
    let document = bind(text);
    let mut sink: Vec<(TextRange, ReferenceUsage)> = Vec::new();
    run_reference_search(&document, &SymbolKey::property("Foo"), &mut sink);

    assert_eq!(sink.len(), 2);
    let (write, read) = (sink[0], sink[1]);
    assert_eq!(write.1, ReferenceUsage::Write);
    assert_eq!(write.0, TextRange::at(TextSize::new(25), TextSize::new(3)));
    assert_eq!(read.1, ReferenceUsage::Read);
    let read_start = text.find("$(Foo)").unwrap() as u32 + 2;
    assert_eq!(read.0, TextRange::at(TextSize::new(read_start), TextSize::new(3)));
}

#[rstest]
#[case::property(SymbolKey::property("Out"), vec![("Out", ReferenceUsage::Write), ("Out", ReferenceUsage::Read)])]
#[case::item(SymbolKey::item("Src"), vec![("Src", ReferenceUsage::Write), ("Src", ReferenceUsage::Read), ("Src", ReferenceUsage::Read)])]
#[case::metadata(SymbolKey::metadata(Some("Src"), "Kind"), vec![("Kind", ReferenceUsage::Write), ("Kind", ReferenceUsage::Read)])]
#[case::target(SymbolKey::target("Compile"), vec![("Compile", ReferenceUsage::Read), ("Compile", ReferenceUsage::Write)])]
fn test_usages_by_symbol_kind(
    #[case] key: SymbolKey,
    #[case] expected: Vec<(&str, ReferenceUsage)>,
) {
    let text = r#"<Project DefaultTargets="Compile">
  <ItemGroup>
    <Src Include="a.cs" Kind="code" />
  </ItemGroup>
  <Target Name="Compile" Inputs="@(Src)">
    <Csc Sources="@(Src->'%(Kind)')">
      <Output TaskParameter="Result" PropertyName="Out" />
    </Csc>
    <Message Text="$(Out)" />
  </Target>
</Project>"#;
    let document = bind(text);
    let found = search(&document, &key);
    let found: Vec<(&str, ReferenceUsage)> = found.iter().map(|(s, u)| (s.as_str(), *u)).collect();
    assert_eq!(found, expected);
}

#[test]
fn test_search_is_case_insensitive() {
    let document = bind("<Project><PropertyGroup><OutDir>x</OutDir><B>$(OUTDIR)</B></PropertyGroup></Project>");
    assert_eq!(search(&document, &SymbolKey::property("outdir")).len(), 2);
}

#[test]
fn test_opaque_sections_have_no_references() {
    let text = r#"<Project><ProjectExtensions><X>$(Foo)</X></ProjectExtensions><PropertyGroup><Foo /></PropertyGroup></Project>"#;
    let document = bind(text);
    assert_eq!(search(&document, &SymbolKey::property("Foo")).len(), 1);
}

#[test]
fn test_visitor_with_closure_collector_sees_every_kind() {
    let text = r#"<Project><Target Name="T"><Exec Command="$([System.IO.Path]::Combine($(A), 'x')) $(B) %(I.M) @(J)" /></Target></Project>"#;
    let document = bind(text);
    let mut kinds = Vec::new();
    let mut collect = |key: &SymbolKey, _: TextRange, _: ReferenceUsage| kinds.push(key.kind);
    let outcome = ResolvingVisitor::new(&document, &BuiltinSchema)
        .with_collector(&mut collect)
        .run();

    assert!(!outcome.cancelled);
    for kind in [
        SymbolKind::Element,
        SymbolKind::Target,
        SymbolKind::Task,
        SymbolKind::Attribute,
        SymbolKind::Function,
        SymbolKind::Property,
        SymbolKind::Item,
        SymbolKind::Metadata,
    ] {
        assert!(kinds.contains(&kind), "missing {kind:?} in {kinds:?}");
    }
}

#[test]
fn test_symbol_at_on_property_read() {
    let text = SIMPLE_PROPERTY_READ;
    let document = bind(text);
    let offset = TextSize::new(text.find("$(Foo)").unwrap() as u32 + 3);
    let occurrence = symbol_at(&document, offset).unwrap();
    assert_eq!(occurrence.key, SymbolKey::property("Foo"));
    assert_eq!(occurrence.usage, ReferenceUsage::Read);
}

#[rstest]
#[case::static_argument("<B>x</B><A>$([System.IO.Path]::Combine($(B), 'x'))</A>")]
#[case::instance_argument("<B>x</B><A>$(C.Replace('a', $(B)))</A>")]
#[case::nested_argument("<B>x</B><A>$([System.Math]::Max(1, $([System.Math]::Abs($(B)))))</A>")]
fn test_property_read_inside_call_arguments(#[case] body: &str) {
    let text = format!("<Project><PropertyGroup>{body}</PropertyGroup></Project>");
    let document = bind(&text);
    assert_eq!(
        search(&document, &SymbolKey::property("B")),
        vec![
            ("B".to_string(), ReferenceUsage::Write),
            ("B".to_string(), ReferenceUsage::Read),
        ]
    );
}

#[test]
fn test_item_read_inside_call_argument() {
    let text = r#"<Project><ItemGroup><X Include="a" /></ItemGroup><Target Name="T"><Message Text="$([System.String]::Join(';', @(X)))" /></Target></Project>"#;
    let document = bind(text);
    assert_eq!(
        search(&document, &SymbolKey::item("X")),
        vec![
            ("X".to_string(), ReferenceUsage::Write),
            ("X".to_string(), ReferenceUsage::Read),
        ]
    );
}

#[test]
fn test_references_on_both_sides_of_a_comment() {
    let text = "<Project><PropertyGroup><B>x</B><A>$(B)<!-- c -->;$(B)</A></PropertyGroup></Project>";
    let document = bind(text);
    let usages: Vec<_> = search(&document, &SymbolKey::property("B"))
        .into_iter()
        .map(|(_, usage)| usage)
        .collect();
    assert_eq!(
        usages,
        vec![ReferenceUsage::Write, ReferenceUsage::Read, ReferenceUsage::Read]
    );
}
