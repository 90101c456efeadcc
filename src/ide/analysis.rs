//! AnalysisHost: owns documents and answers queries about them.
//!
//! Open documents live as in-memory overlays; everything else is read through
//! a [`DocumentLoader`]. Bound documents are cached per path and invalidated
//! when an overlay changes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! host.set_file_content("/repo/app.proj", text);
//!
//! let diagnostics = host.diagnostics(Path::new("/repo/app.proj"))?;
//! let refs = host.find_references(path, offset, &CancellationToken::new(), None)?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use text_size::TextSize;
use tokio_util::sync::CancellationToken;

use super::imports::ImportGraph;
use super::loader::{DocumentLoader, FsLoader, LoadError, normalize_path};
use super::references::{ProgressSink, ReferenceResult, search_files};
use crate::base::ComputeCache;
use crate::hir::{
    Binder, BoundDocument, BuiltinSchema, Diagnostic, DocumentSchema, LayeredSchema,
    RuleRegistry, SymbolOccurrence, run_analysis, symbol_at,
};
use crate::syntax::XDocument;

/// Host configuration.
#[derive(Clone, Debug, Default)]
pub struct AnalysisOptions {
    /// Ids of built-in rules that are never registered.
    pub disabled_rules: Vec<String>,
    /// Threads for reference search; `None` uses the global rayon pool.
    pub search_threads: Option<usize>,
}

/// Owns all mutable state for the IDE layer.
pub struct AnalysisHost {
    loader: Box<dyn DocumentLoader>,
    overlays: FxHashMap<PathBuf, Arc<str>>,
    documents: ComputeCache<PathBuf, Arc<BoundDocument>>,
    binder: Binder,
    rules: Arc<RuleRegistry>,
    pool: Option<rayon::ThreadPool>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// Create a host reading from the file system with default options.
    pub fn new() -> Self {
        Self::with_options(AnalysisOptions::default())
    }

    pub fn with_options(options: AnalysisOptions) -> Self {
        let pool = options.search_threads.and_then(|threads| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("reference-search-{i}"))
                .build()
                .inspect_err(|error| {
                    tracing::warn!(%error, "cannot build search pool; using the global pool")
                })
                .ok()
        });
        Self {
            loader: Box::new(FsLoader),
            overlays: FxHashMap::default(),
            documents: ComputeCache::new(),
            binder: Binder::default(),
            rules: Arc::new(RuleRegistry::with_builtin_rules(&options.disabled_rules)),
            pool,
        }
    }

    /// Replace the loader used for paths without an overlay.
    pub fn with_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self.documents.clear();
        self
    }

    /// Replace the binder (and so the unescape routine).
    pub fn with_binder(mut self, binder: Binder) -> Self {
        self.binder = binder;
        self.documents.clear();
        self
    }

    /// The rules used by [`AnalysisHost::diagnostics`].
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Set the in-memory content of a file.
    pub fn set_file_content(&mut self, path: impl AsRef<Path>, content: &str) {
        let path = normalize_path(path.as_ref());
        self.documents.invalidate(&path);
        self.overlays.insert(path, Arc::from(content));
    }

    /// Drop the overlay of a file; later reads go to the loader.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        let path = normalize_path(path.as_ref());
        self.documents.invalidate(&path);
        self.overlays.remove(&path);
    }

    /// Check if a file has an overlay.
    pub fn has_overlay(&self, path: impl AsRef<Path>) -> bool {
        self.overlays.contains_key(&normalize_path(path.as_ref()))
    }

    /// The bound document for `path`, parsed on first use.
    pub fn document(&self, path: &Path) -> Result<Arc<BoundDocument>, LoadError> {
        let path = normalize_path(path);
        if let Some(document) = self.documents.get(&path) {
            tracing::trace!(path = %path.display(), "document cache hit");
            return Ok(document);
        }
        self.documents.try_get_or_compute(&path, || {
            tracing::debug!(path = %path.display(), "binding document");
            let text = match self.overlays.get(&path) {
                Some(text) => text.to_string(),
                None => self.loader.load(&path)?,
            };
            Ok(Arc::new(self.binder.bind(&XDocument::parse(&text))))
        })
    }

    /// Files reachable from `path` through imports, `path` first.
    pub fn import_graph(&self, path: &Path) -> ImportGraph {
        ImportGraph::build(path, &|p: &Path| self.document(p))
    }

    /// Builtin names layered over everything defined in the import graph.
    pub fn schema(&self, path: &Path) -> LayeredSchema {
        let graph = self.import_graph(path);
        let documents: Vec<_> = graph.files().filter_map(|p| self.document(p).ok()).collect();
        let defined = DocumentSchema::from_documents(documents.iter().map(Arc::as_ref));
        LayeredSchema::new()
            .with_layer(Arc::new(BuiltinSchema))
            .with_layer(Arc::new(defined))
    }

    /// Diagnostics for one document: XML errors, expression errors, rules.
    pub fn diagnostics(&self, path: &Path) -> Result<Vec<Diagnostic>, LoadError> {
        let document = self.document(path)?;
        let schema = self.schema(path);
        Ok(run_analysis(&document, &self.rules, &schema))
    }

    /// The symbol occurrence under `offset`, if any.
    pub fn symbol_at(
        &self,
        path: &Path,
        offset: TextSize,
    ) -> Result<Option<SymbolOccurrence>, LoadError> {
        let document = self.document(path)?;
        Ok(symbol_at(&document, offset))
    }

    /// Find every occurrence of the symbol under `offset` in the files
    /// reachable from `path`.
    pub fn find_references(
        &self,
        path: &Path,
        offset: TextSize,
        cancel: &CancellationToken,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ReferenceResult, LoadError> {
        let Some(occurrence) = self.symbol_at(path, offset)? else {
            return Ok(ReferenceResult::empty());
        };

        let graph = self.import_graph(path);
        let files: Vec<PathBuf> = graph.files().map(Path::to_path_buf).collect();
        let load = |p: &Path| self.document(p);
        let search = || search_files(&files, &occurrence.key, &load, cancel, progress);

        Ok(match &self.pool {
            Some(pool) => pool.install(search),
            None => search(),
        })
    }
}
