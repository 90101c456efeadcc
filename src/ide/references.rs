//! Find references across files.
//!
//! One unit of work per file: load (or reuse) the bound document and walk it
//! with a collector filtering for the target symbol. Units run on rayon, each
//! checks the cancellation token before starting and the walk checks it at
//! every element. A unit that fails is logged and listed; it never cancels
//! its siblings.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use text_size::TextRange;
use tokio_util::sync::CancellationToken;

use super::loader::LoadError;
use crate::hir::{BoundDocument, ReferenceUsage, SymbolKey, search_with_cancellation};

/// Result of a find-references request.
#[derive(Clone, Debug, Default)]
pub struct ReferenceResult {
    /// The symbol searched for.
    pub symbol: Option<SymbolKey>,
    /// All references found.
    pub references: Vec<Reference>,
    /// The search was cancelled; `references` is partial.
    pub cancelled: bool,
    /// Files that could not be searched, with the reason.
    pub failed_files: Vec<(PathBuf, String)>,
}

impl ReferenceResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if any references were found.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Get the number of references.
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// References in `file`.
    pub fn in_file<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a Reference> {
        self.references.iter().filter(move |r| r.file == file)
    }
}

/// One occurrence of the searched symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// The file containing the reference.
    pub file: PathBuf,
    pub range: TextRange,
    pub usage: ReferenceUsage,
}

/// Receives search progress as a percentage.
pub trait ProgressSink: Sync {
    fn report(&self, percent: u32);
}

impl<F: Fn(u32) + Sync> ProgressSink for F {
    fn report(&self, percent: u32) {
        self(percent)
    }
}

/// Reports each completed unit, never going backwards.
struct Progress<'a> {
    total: usize,
    completed: AtomicUsize,
    last: Mutex<u32>,
    sink: Option<&'a dyn ProgressSink>,
}

impl Progress<'_> {
    fn complete_one(&self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let Some(sink) = self.sink else {
            return;
        };
        let percent = (done * 100 / self.total.max(1)).min(100) as u32;
        let mut last = self.last.lock();
        if percent > *last {
            *last = percent;
            sink.report(percent);
        }
    }
}

enum FileOutcome {
    Found(Vec<Reference>),
    Failed(PathBuf, String),
    Cancelled(Vec<Reference>),
}

/// Search `files` for occurrences of `target`.
///
/// Results are grouped per file in the order of `files`, but callers should
/// not rely on any order.
pub fn search_files(
    files: &[PathBuf],
    target: &SymbolKey,
    load: &(dyn Fn(&Path) -> Result<Arc<BoundDocument>, LoadError> + Sync),
    cancel: &CancellationToken,
    progress: Option<&dyn ProgressSink>,
) -> ReferenceResult {
    let progress = Progress {
        total: files.len(),
        completed: AtomicUsize::new(0),
        last: Mutex::new(0),
        sink: progress,
    };

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|file| {
            let outcome = search_file(file, target, load, cancel);
            progress.complete_one();
            outcome
        })
        .collect();

    let mut result = ReferenceResult {
        symbol: Some(target.clone()),
        ..ReferenceResult::default()
    };
    for outcome in outcomes {
        match outcome {
            FileOutcome::Found(references) => result.references.extend(references),
            FileOutcome::Cancelled(references) => {
                result.cancelled = true;
                result.references.extend(references);
            }
            FileOutcome::Failed(file, reason) => result.failed_files.push((file, reason)),
        }
    }
    result.cancelled |= cancel.is_cancelled();

    tracing::debug!(
        symbol = %target.qualified_name(),
        files = files.len(),
        references = result.references.len(),
        failed = result.failed_files.len(),
        cancelled = result.cancelled,
        "reference search finished"
    );
    result
}

fn search_file(
    file: &Path,
    target: &SymbolKey,
    load: &(dyn Fn(&Path) -> Result<Arc<BoundDocument>, LoadError> + Sync),
    cancel: &CancellationToken,
) -> FileOutcome {
    if cancel.is_cancelled() {
        return FileOutcome::Cancelled(Vec::new());
    }

    let document = match load(file) {
        Ok(document) => document,
        Err(error) => {
            tracing::warn!(file = %file.display(), %error, "skipping file in reference search");
            return FileOutcome::Failed(file.to_path_buf(), error.to_string());
        }
    };
    if let Some(error) = document.xml_errors.first() {
        // The partial tree is still searched.
        tracing::warn!(file = %file.display(), %error, "searching malformed document");
    }

    let mut found: Vec<(TextRange, ReferenceUsage)> = Vec::new();
    let finished = search_with_cancellation(&document, target, &mut found, Some(cancel));
    let references = found
        .into_iter()
        .map(|(range, usage)| Reference {
            file: file.to_path_buf(),
            range,
            usage,
        })
        .collect();

    if finished {
        FileOutcome::Found(references)
    } else {
        FileOutcome::Cancelled(references)
    }
}
