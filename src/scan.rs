//! Source tree discovery.
//!
//! Walks the pages directory depth-first and turns every regular file into a
//! [`Document`]. The whole tree is read before anything else happens: the
//! index builder needs every document before any single page can know its
//! siblings.
//!
//! ## Directory Structure
//!
//! ```text
//! site/
//! ├── config.toml              # Optional site configuration
//! ├── templates/
//! │   ├── template.html        # Main page template
//! │   └── style.css            # Copied to the output root
//! └── pages/                   # Source root
//!     ├── index.md             # Home page (not listed in navigation)
//!     ├── about.md             # Top-level page → navigation entry
//!     └── recipes/             # Category → navigation entry
//!         ├── recipes.md       # Category landing page
//!         └── nut-roast.md
//! ```
//!
//! ## Skipped Entries
//!
//! - Names on the reserved list (by default `template.html`, `style.css`,
//!   `.git`), at any depth. A reserved directory is not descended into.
//! - Hidden entries (leading `.`), e.g. editor swap files.
//!
//! ## Validation
//!
//! - Any unreadable file or directory aborts discovery. There is no partial
//!   tree.
//! - Two documents mapping to the same output file (`about.md` next to
//!   `about.html`) is an error, reported before anything is written.

use crate::document::Document;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{first} and {second} would both be written to {target}")]
    DuplicateTarget {
        target: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Every document found under a pages root.
#[derive(Debug)]
pub struct Site {
    /// Sorted by source path. Consumers that display documents sort again by
    /// their own key; nothing relies on this order for correctness.
    pub documents: Vec<Document>,
}

/// Discover all documents under `pages_root`, skipping `reserved` names.
pub fn discover(pages_root: &Path, reserved: &[String]) -> Result<Site, ScanError> {
    let mut documents = Vec::new();

    let walker = WalkDir::new(pages_root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry, reserved));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let document =
            Document::load(pages_root, entry.path()).map_err(|source| ScanError::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;
        tracing::debug!(source = %document.relative_path, title = %document.title, "discovered");
        documents.push(document);
    }

    check_targets(&documents)?;

    Ok(Site { documents })
}

fn is_skipped(entry: &DirEntry, reserved: &[String]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || reserved.iter().any(|r| r.as_str() == name.as_ref())
}

/// Reject two documents that resolve to the same output file.
fn check_targets(documents: &[Document]) -> Result<(), ScanError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for doc in documents {
        if let Some(first) = seen.insert(&doc.target_path, &doc.source_path) {
            return Err(ScanError::DuplicateTarget {
                target: doc.target_path.clone(),
                first: first.to_path_buf(),
                second: doc.source_path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_reserved() -> Vec<String> {
        crate::config::SiteConfig::default().reserved
    }

    #[test]
    fn discovers_fixture_documents() {
        let tmp = setup_fixtures();
        let site = discover(&tmp.path().join("pages"), &default_reserved()).unwrap();

        assert_eq!(
            relative_paths(&site),
            vec!["index.md", "recipes/nut-roast.md", "recipes/recipes.md"]
        );
    }

    #[test]
    fn nested_documents_have_category_paths() {
        let tmp = setup_fixtures();
        let site = discover(&tmp.path().join("pages"), &default_reserved()).unwrap();

        let roast = find_document(&site, "recipes/nut-roast.md");
        assert_eq!(roast.category_path, vec!["recipes"]);
        assert_eq!(roast.title, "Nut Roast");

        let landing = find_document(&site, "recipes/recipes.md");
        assert!(landing.is_index_page);
    }

    #[test]
    fn reserved_names_skipped_at_any_depth() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                ("page.md", "# Page"),
                ("template.html", "<html></html>"),
                ("style.css", "body {}"),
                ("deep/style.css", "body {}"),
                ("deep/kept.md", "# Kept"),
                (".git/HEAD", "ref: refs/heads/main"),
            ],
        );

        let site = discover(tmp.path(), &default_reserved()).unwrap();
        assert_eq!(relative_paths(&site), vec!["deep/kept.md", "page.md"]);
    }

    #[test]
    fn hidden_files_skipped() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &[("a.md", "# A"), (".a.md.swp", "junk")]);

        let site = discover(tmp.path(), &default_reserved()).unwrap();
        assert_eq!(relative_paths(&site), vec!["a.md"]);
    }

    #[test]
    fn custom_reserved_list() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &[("a.md", "# A"), ("drafts/b.md", "# B")]);

        let site = discover(tmp.path(), &["drafts".to_string()]).unwrap();
        assert_eq!(relative_paths(&site), vec!["a.md"]);
    }

    #[test]
    fn empty_directories_contribute_nothing() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &[("a.md", "# A")]);
        fs::create_dir_all(tmp.path().join("empty/nested")).unwrap();

        let site = discover(tmp.path(), &default_reserved()).unwrap();
        assert_eq!(site.documents.len(), 1);
    }

    #[test]
    fn duplicate_target_is_error() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[("about.md", "# About"), ("about.html", "<p>About</p>")],
        );

        let result = discover(tmp.path(), &default_reserved());
        match result {
            Err(ScanError::DuplicateTarget { target, .. }) => {
                assert_eq!(target, PathBuf::from("about.html"));
            }
            other => panic!("expected duplicate target error, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_file_aborts() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &[("a.md", "# A")]);
        // Not valid UTF-8, so it cannot be read as text.
        fs::write(tmp.path().join("b.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let result = discover(tmp.path(), &default_reserved());
        assert!(matches!(result, Err(ScanError::Read { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_aborts() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &[("a.md", "# A"), ("locked/b.md", "# B")]);
        let locked = tmp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind root.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let result = discover(tmp.path(), &default_reserved());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(ScanError::Walk(err)) => {
                assert_eq!(err.path(), Some(locked.as_path()));
                assert_eq!(
                    err.io_error().map(std::io::Error::kind),
                    Some(std::io::ErrorKind::PermissionDenied)
                );
            }
            other => panic!("expected walk error, got {other:?}"),
        }
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = discover(&tmp.path().join("nope"), &default_reserved());
        assert!(matches!(result, Err(ScanError::Walk(_))));
    }
}
