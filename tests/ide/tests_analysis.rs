#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use msbuild::TextSize;
use msbuild::hir::{ReferenceUsage, SymbolKey, codes};
use msbuild::ide::{AnalysisHost, AnalysisOptions, LoadError};
use tempfile::TempDir;

use crate::helpers::source_fixtures::*;
use crate::helpers::workspace::write_workspace;

#[test]
fn test_import_graph_follows_files_on_disk() {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let host = AnalysisHost::new();

    let graph = host.import_graph(&app);
    let names: Vec<_> = graph
        .files()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("app.proj"),
            PathBuf::from("common.props"),
            PathBuf::from("shared/targets.targets"),
        ]
    );
}

#[test]
fn test_clean_project_has_no_diagnostics() {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let host = AnalysisHost::new();
    let diagnostics = host.diagnostics(&app).unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_items_defined_in_imports_are_known() {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("main.proj");
    fs::write(
        &main,
        r#"<Project><Import Project="items.props" /><Target Name="T"><Message Text="@(Shared);@(Missing)" /></Target></Project>"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("items.props"),
        r#"<Project><ItemGroup><Shared Include="x" /></ItemGroup></Project>"#,
    )
    .unwrap();

    let host = AnalysisHost::new();
    let diagnostics = host.diagnostics(&main).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::UNDEFINED_ITEM));
    assert!(diagnostics[0].message.contains("Missing"));
}

#[test]
fn test_overlay_shadows_disk() {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let mut host = AnalysisHost::new();

    host.set_file_content(&app, "<Project><Bogus /></Project>");
    assert!(host.has_overlay(&app));
    let diagnostics = host.diagnostics(&app).unwrap();
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::UNKNOWN_ELEMENT));

    host.remove_file(&app);
    assert!(host.diagnostics(&app).unwrap().is_empty());
}

#[test]
fn test_overlay_for_file_not_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unsaved.proj");
    let mut host = AnalysisHost::new();
    assert!(matches!(host.document(&path), Err(LoadError::NotFound(_))));

    host.set_file_content(&path, SIMPLE_PROPERTY_READ);
    let occurrence = host
        .symbol_at(&path, TextSize::new(26))
        .unwrap()
        .unwrap();
    assert_eq!(occurrence.key, SymbolKey::property("Foo"));
    assert_eq!(occurrence.usage, ReferenceUsage::Write);
}

#[test]
fn test_disabled_rule_ids_from_options() {
    let dir = TempDir::new().unwrap();
    let path: &Path = &dir.path().join("x.proj");
    fs::write(path, "<Project><Bogus /></Project>").unwrap();

    let host = AnalysisHost::with_options(AnalysisOptions {
        disabled_rules: vec!["unknown-element".into()],
        ..AnalysisOptions::default()
    });
    assert!(host.diagnostics(path).unwrap().is_empty());
    assert!(host.rules().rule_ids().all(|id| id != "unknown-element"));
}
