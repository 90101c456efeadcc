//! IDE features: high-level APIs over bound documents.
//!
//! This module ties the lower layers to file paths: loading text, following
//! imports, caching bound documents, and running cross-file queries.
//!
//! ## Design Principles
//!
//! 1. **Paths in, data out**: no protocol types, callers convert at the edge
//! 2. **Failure is per file**: one unreadable import never fails a query
//! 3. **Cancellable**: long searches observe a `CancellationToken`
//!
//! ## Usage
//!
//! ```ignore
//! use msbuild::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content("/repo/app.proj", "<Project />");
//!
//! let diagnostics = host.diagnostics(Path::new("/repo/app.proj"))?;
//! ```

mod analysis;
mod imports;
mod loader;
mod references;

pub use analysis::{AnalysisHost, AnalysisOptions};
pub use imports::{ImportGraph, SkippedImport};
pub use loader::{DocumentLoader, FsLoader, LoadError, normalize_path};
pub use references::{ProgressSink, Reference, ReferenceResult, search_files};
