//! Shared test utilities for the leafpress test suite.
//!
//! Provides fixture setup, tree writers and lookup helpers that work with
//! discovery-phase data structures (`Site`, `Document`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = discover(&tmp.path().join("pages"), &[]).unwrap();
//!
//! let roast = find_document(&site, "recipes/nut-roast.md");
//! assert_eq!(roast.title, "Nut Roast");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::document::Document;
use crate::scan::Site;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `(relative path, content)` pairs under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
}

// =========================================================================
// Site lookups: panic with a clear message on miss
// =========================================================================

/// Find a document by its `/`-separated path under the pages root.
pub fn find_document<'a>(site: &'a Site, relative_path: &str) -> &'a Document {
    site.documents
        .iter()
        .find(|d| d.relative_path == relative_path)
        .unwrap_or_else(|| {
            let paths = relative_paths(site);
            panic!("document '{relative_path}' not found. Available: {paths:?}")
        })
}

/// All relative paths, sorted.
pub fn relative_paths(site: &Site) -> Vec<&str> {
    let mut paths: Vec<&str> = site
        .documents
        .iter()
        .map(|d| d.relative_path.as_str())
        .collect();
    paths.sort();
    paths
}
