//! The publish driver: discovery, indexing, rendering and incremental writes.
//!
//! A run has two strict phases. Nothing is written until the first is done.
//!
//! ```text
//! 1. Survey    pages/ → Site → SiteIndex        (read only)
//! 2. Publish   decide → render (parallel) → write + record (serial)
//! ```
//!
//! ## Build decisions
//!
//! Every document gets exactly one decision, made for all documents before
//! any file is written:
//!
//! ```text
//! Discovered ─┬─ fingerprint known, nothing forced ──→ Skipped
//!             └─ otherwise ──→ Converted → Rendered → Written → Recorded
//! ```
//!
//! Three signals force every document down the build path:
//!
//! - `--rebuild`.
//! - **Templates changed**: a template file's fingerprint is not in the store.
//! - **Structure changed**: the navigation list or any category index differs
//!   from the last recorded structure, so sibling links on unchanged pages
//!   are stale. Unlike pages and templates this compares against the latest
//!   record only, so returning to an earlier structure (a page deleted again,
//!   a title renamed back) still counts as a change.
//!
//! Template and structure fingerprints are recorded only after every page
//! has been written, so an interrupted run is retried in full next time.
//!
//! ## Concurrency
//!
//! Conversion and rendering are pure per document and run on rayon. Writes
//! and fingerprint appends happen on the calling thread, in discovery order.

use crate::config::{ConfigError, SiteConfig, SitePaths};
use crate::document::Document;
use crate::fingerprint::{
    BuildStats, Fingerprint, FingerprintError, FingerprintStore, unix_now,
};
use crate::index::SiteIndex;
use crate::render::{PageContext, RenderError, Renderer, load_renderer};
use crate::scan::{self, ScanError, Site};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Log filename under which the structure fingerprint is recorded.
pub const STRUCTURE_RECORD: &str = "<navigation>";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Build every document regardless of the fingerprint store.
    pub rebuild: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    Skipped,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// Source path relative to the pages root.
    pub source: String,
    /// Output path relative to the output root.
    pub target: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// One entry per document, in discovery order.
    pub pages: Vec<PageReport>,
    pub stats: BuildStats,
    pub templates_changed: bool,
    pub structure_changed: bool,
    pub stylesheet_updated: bool,
}

/// Discover and index the site without touching the output directory.
pub fn survey(paths: &SitePaths, config: &SiteConfig) -> Result<(Site, SiteIndex), PublishError> {
    paths.check()?;
    let site = scan::discover(&paths.pages, &config.reserved)?;
    let index = SiteIndex::build(&site.documents);
    Ok((site, index))
}

/// Run a full incremental build of the site at `paths`.
///
/// Setup errors (missing pages, templates or page template) and discovery
/// errors are raised before anything is written.
pub fn build(
    paths: &SitePaths,
    config: &SiteConfig,
    options: PublishOptions,
) -> Result<BuildReport, PublishError> {
    paths.check()?;
    let renderer = load_renderer(paths)?;
    let (site, index) = survey(paths, config)?;
    let mut store = FingerprintStore::open(&paths.fingerprint_log)?;
    publish_site(&site, &index, renderer.as_ref(), &mut store, paths, options)
}

/// Publish an already surveyed site.
pub fn publish_site(
    site: &Site,
    index: &SiteIndex,
    renderer: &dyn Renderer,
    store: &mut FingerprintStore,
    paths: &SitePaths,
    options: PublishOptions,
) -> Result<BuildReport, PublishError> {
    let now = unix_now();

    let templates = renderer
        .sources()
        .iter()
        .map(|path| {
            Fingerprint::of_file(path)
                .map(|fp| (fp, log_name(paths, path)))
                .map_err(|source| PublishError::Read {
                    path: path.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let templates_changed = templates.iter().any(|(fp, _)| !store.has_been_built(fp));
    if templates_changed {
        tracing::info!("templates changed, rebuilding every page");
    }

    let structure = Fingerprint::of(index.digest_source());
    let structure_changed = store.latest_for(STRUCTURE_RECORD) != Some(&structure);
    if structure_changed {
        tracing::info!("navigation changed, rebuilding every page");
    }

    let force = options.rebuild || templates_changed || structure_changed;
    let decisions: Vec<bool> = site
        .documents
        .iter()
        .map(|doc| force || !store.has_been_built(&doc.fingerprint))
        .collect();

    let rendered: Vec<Option<String>> = site
        .documents
        .par_iter()
        .zip(decisions.par_iter())
        .map(|(doc, &build)| {
            if build {
                render_document(doc, index, renderer).map(Some)
            } else {
                Ok(None)
            }
        })
        .collect::<Result<_, RenderError>>()?;

    create_dir(&paths.output)?;

    let mut report = BuildReport {
        templates_changed,
        structure_changed,
        ..BuildReport::default()
    };

    for (doc, html) in site.documents.iter().zip(rendered) {
        let outcome = match html {
            Some(html) => {
                let target = paths.output.join(&doc.target_path);
                write_file(&target, html.as_bytes())?;
                if !store.has_been_built(&doc.fingerprint) {
                    store.record(&doc.fingerprint, &doc.relative_path, now)?;
                }
                tracing::info!(source = %doc.relative_path, output = %target.display(), "written");
                report.stats.write();
                Outcome::Written
            }
            None => {
                tracing::debug!(source = %doc.relative_path, "unchanged, skip");
                report.stats.skip();
                Outcome::Skipped
            }
        };
        report.pages.push(PageReport {
            source: doc.relative_path.clone(),
            target: doc.target_path.clone(),
            outcome,
        });
    }

    report.stylesheet_updated = publish_stylesheet(store, paths, options, now)?;

    for (fingerprint, name) in &templates {
        if !store.has_been_built(fingerprint) {
            store.record(fingerprint, name, now)?;
        }
    }
    if structure_changed {
        store.record(&structure, STRUCTURE_RECORD, now)?;
    }

    Ok(report)
}

/// Convert and wrap one document in the page template.
pub fn render_document(
    doc: &Document,
    index: &SiteIndex,
    renderer: &dyn Renderer,
) -> Result<String, RenderError> {
    let content = doc.to_html();
    renderer.render(&PageContext {
        content: &content,
        title: &doc.title,
        navigation: &index.navigation,
        branches: index.branches_for(doc),
    })
}

/// Copy the stylesheet to the output root if it is new or forced.
/// Returns whether it was copied. A site without a stylesheet is fine.
fn publish_stylesheet(
    store: &mut FingerprintStore,
    paths: &SitePaths,
    options: PublishOptions,
    now: u64,
) -> Result<bool, PublishError> {
    let source = &paths.stylesheet;
    let Some(file_name) = source.file_name() else {
        return Ok(false);
    };
    if !source.is_file() {
        return Ok(false);
    }
    let bytes = fs::read(source).map_err(|e| PublishError::Read {
        path: source.clone(),
        source: e,
    })?;
    let fingerprint = Fingerprint::of(&bytes);
    let known = store.has_been_built(&fingerprint);
    if known && !options.rebuild {
        tracing::debug!(stylesheet = %source.display(), "unchanged, skip");
        return Ok(false);
    }

    let target = paths.output.join(file_name);
    write_file(&target, &bytes)?;
    if !known {
        store.record(&fingerprint, &log_name(paths, source), now)?;
    }
    tracing::info!(output = %target.display(), "stylesheet copied");
    Ok(true)
}

/// Path as written to the fingerprint log: relative to the site root when
/// possible.
fn log_name(paths: &SitePaths, path: &Path) -> String {
    let relative = path.strip_prefix(&paths.root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn create_dir(path: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(path).map_err(|source| PublishError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), PublishError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, contents).map_err(|source| PublishError::Write {
        path: path.to_path_buf(),
        source,
    })
}
