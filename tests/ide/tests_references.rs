#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use msbuild::TextSize;
use msbuild::hir::{ReferenceUsage, SymbolKey};
use msbuild::ide::{AnalysisHost, AnalysisOptions, ReferenceResult};
use parking_lot::Mutex;
use rstest::rstest;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::helpers::source_fixtures::*;
use crate::helpers::workspace::write_workspace;

fn offset_of(text: &str, needle: &str, delta: u32) -> TextSize {
    TextSize::new(text.find(needle).unwrap() as u32 + delta)
}

fn find_foo(host: &AnalysisHost, app: &Path) -> ReferenceResult {
    host.find_references(
        app,
        offset_of(APP_PROJ, "<Foo>", 1),
        &CancellationToken::new(),
        None,
    )
    .unwrap()
}

#[rstest]
#[case::global_pool(None)]
#[case::dedicated_pool(Some(2))]
fn test_references_across_imported_files(#[case] search_threads: Option<usize>) {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let host = AnalysisHost::with_options(AnalysisOptions {
        search_threads,
        ..AnalysisOptions::default()
    });

    let result = find_foo(&host, &app);
    assert!(!result.cancelled);
    assert!(result.failed_files.is_empty());
    assert_eq!(result.symbol, Some(SymbolKey::property("Foo")));
    assert_eq!(result.in_file(&app).count(), 3);
    assert_eq!(result.in_file(&dir.path().join("common.props")).count(), 2);
    assert_eq!(
        result.in_file(&dir.path().join("shared/targets.targets")).count(),
        1
    );

    let writes = result
        .references
        .iter()
        .filter(|r| r.usage == ReferenceUsage::Write)
        .count();
    assert_eq!(writes, 2);
}

#[test]
fn test_reference_ranges_slice_to_name() {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let host = AnalysisHost::new();
    let result = find_foo(&host, &app);

    for reference in &result.references {
        let document = host.document(&reference.file).unwrap();
        assert_eq!(document.slice(reference.range), "Foo");
    }
}

#[test]
fn test_missing_import_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.proj");
    fs::write(&path, BROKEN_IMPORT).unwrap();
    let host = AnalysisHost::new();

    let result = host
        .find_references(
            &path,
            offset_of(BROKEN_IMPORT, "$(Foo)", 2),
            &CancellationToken::new(),
            None,
        )
        .unwrap();
    assert!(!result.cancelled);
    assert_eq!(result.len(), 1);
    assert_eq!(result.failed_files.len(), 1);
    assert!(result.failed_files[0].0.ends_with("missing.props"));
}

#[test]
fn test_no_symbol_under_cursor() {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let host = AnalysisHost::new();
    let result = host
        .find_references(&app, TextSize::new(0), &CancellationToken::new(), None)
        .unwrap();
    assert!(result.symbol.is_none());
    assert!(result.is_empty());
}

#[test]
fn test_cancelled_search_returns_flagged_partial_result() {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let host = AnalysisHost::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = host
        .find_references(&app, offset_of(APP_PROJ, "<Foo>", 1), &cancel, None)
        .unwrap();
    assert!(result.cancelled);
    assert!(result.is_empty());
}

#[test]
fn test_progress_is_strictly_increasing_and_completes() {
    let dir = TempDir::new().unwrap();
    let app = write_workspace(&dir);
    let host = AnalysisHost::with_options(AnalysisOptions {
        search_threads: Some(3),
        ..AnalysisOptions::default()
    });

    let seen = Mutex::new(Vec::new());
    let report = |percent: u32| seen.lock().push(percent);
    let result = host
        .find_references(
            &app,
            offset_of(APP_PROJ, "<Foo>", 1),
            &CancellationToken::new(),
            Some(&report),
        )
        .unwrap();
    assert_eq!(result.len(), 6);

    let seen = seen.into_inner();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
    assert_eq!(seen.last(), Some(&100));
}
