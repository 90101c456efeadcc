//! On-disk project trees for IDE tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use super::source_fixtures::{APP_PROJ, COMMON_PROPS, SHARED_TARGETS};

/// Write the app/common/shared fixture tree; returns the app project path.
pub fn write_workspace(dir: &TempDir) -> PathBuf {
    let root = dir.path();
    fs::create_dir_all(root.join("shared")).unwrap();
    fs::write(root.join("app.proj"), APP_PROJ).unwrap();
    fs::write(root.join("common.props"), COMMON_PROPS).unwrap();
    fs::write(root.join("shared/targets.targets"), SHARED_TARGETS).unwrap();
    root.join("app.proj")
}
