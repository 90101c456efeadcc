//! Import graph discovery.
//!
//! Follows `<Import Project="...">` forward from an origin document. A path
//! is resolved only when it is a literal or uses the well-known location
//! properties; anything that would need evaluation is skipped and logged.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;

use super::loader::{LoadError, normalize_path};
use crate::hir::{BoundDocument, BoundElement};
use crate::parser::ExpressionNode;
use crate::syntax::{AttributeKind, ElementKind};

/// An `<Import>` that could not be followed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedImport {
    pub from: PathBuf,
    pub project: String,
    pub reason: &'static str,
}

/// Files reachable from an origin through imports.
#[derive(Clone, Debug, Default)]
pub struct ImportGraph {
    /// Discovery order; the origin comes first.
    files: IndexSet<PathBuf>,
    edges: Vec<(PathBuf, PathBuf)>,
    skipped: Vec<SkippedImport>,
}

impl ImportGraph {
    /// Walk imports breadth-first from `origin`.
    ///
    /// `load` supplies bound documents. A file that fails to load stays in
    /// the graph (so a search can report it) but contributes no edges.
    pub fn build(
        origin: &Path,
        load: &dyn Fn(&Path) -> Result<Arc<BoundDocument>, LoadError>,
    ) -> ImportGraph {
        let origin = normalize_path(origin);
        let project_dir = origin.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut graph = ImportGraph::default();
        let mut queue = VecDeque::new();
        graph.files.insert(origin.clone());
        queue.push_back(origin);

        while let Some(file) = queue.pop_front() {
            let document = match load(&file) {
                Ok(document) => document,
                Err(error) => {
                    tracing::debug!(%error, "import graph: cannot read file");
                    continue;
                }
            };

            for project in import_projects(&document) {
                match resolve_import(&project, &file, &project_dir) {
                    Ok(paths) => {
                        for path in paths {
                            graph.edges.push((file.clone(), path.clone()));
                            if graph.files.insert(path.clone()) {
                                queue.push_back(path);
                            }
                        }
                    }
                    Err(reason) => {
                        tracing::warn!(from = %file.display(), project = %project.raw, reason, "skipping import");
                        graph.skipped.push(SkippedImport {
                            from: file.clone(),
                            project: project.raw.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        tracing::debug!(files = graph.files.len(), edges = graph.edges.len(), "import graph built");
        graph
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files directly imported by `path`.
    pub fn imports_of<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Path> {
        self.edges
            .iter()
            .filter(move |(from, _)| from == path)
            .map(|(_, to)| to.as_path())
    }

    pub fn skipped(&self) -> &[SkippedImport] {
        &self.skipped
    }
}

/// The `Project` attribute of an `<Import>`.
struct ImportProject<'a> {
    raw: String,
    expression: &'a [ExpressionNode],
}

fn import_projects(document: &BoundDocument) -> Vec<ImportProject<'_>> {
    document
        .elements()
        .filter(|e| e.kind == ElementKind::Import && !is_sdk_import(e))
        .filter_map(|e| e.attribute(AttributeKind::Project))
        .map(|a| ImportProject {
            raw: a.value.raw.clone(),
            expression: &a.value.expression,
        })
        .collect()
}

fn is_sdk_import(element: &BoundElement) -> bool {
    element.attribute(AttributeKind::Sdk).is_some()
}

/// Resolve an import's `Project` value to absolute, normalized paths.
fn resolve_import(
    project: &ImportProject<'_>,
    importing: &Path,
    project_dir: &Path,
) -> Result<Vec<PathBuf>, &'static str> {
    let this_dir = importing.parent().unwrap_or(Path::new(""));
    let mut value = String::new();

    for node in project.expression {
        match node {
            ExpressionNode::Text(text) => value.push_str(&text.value),
            ExpressionNode::Property(property) => {
                let name = property.name.as_str();
                if name.eq_ignore_ascii_case("MSBuildThisFileDirectory") {
                    value.push_str(&this_dir.to_string_lossy());
                    value.push(std::path::MAIN_SEPARATOR);
                } else if name.eq_ignore_ascii_case("MSBuildThisFile") {
                    let file = importing.file_name().unwrap_or_default();
                    value.push_str(&file.to_string_lossy());
                } else if name.eq_ignore_ascii_case("MSBuildProjectDirectory") {
                    value.push_str(&project_dir.to_string_lossy());
                } else {
                    return Err("depends on a property that needs evaluation");
                }
            }
            _ => return Err("contains an expression that needs evaluation"),
        }
    }

    let mut paths = Vec::new();
    for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        if part.contains(['*', '?']) {
            return Err("wildcard imports are not followed");
        }
        let part = part.replace('\\', "/");
        let path = Path::new(&part);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            this_dir.join(path)
        };
        paths.push(normalize_path(&joined));
    }
    Ok(paths)
}
