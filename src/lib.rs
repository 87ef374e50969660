//! # Leafpress
//!
//! A small static site generator. A tree of lightweight-markup pages becomes
//! a tree of HTML pages sharing one template, a caption-sorted navigation
//! bar and, for every directory, a nested category index. Rebuilds are
//! incremental: a page is only rewritten when its exact content has never
//! been built before.
//!
//! # Architecture: Survey, Then Publish
//!
//! ```text
//! 1. Survey    pages/  →  Site + SiteIndex   (read everything, write nothing)
//! 2. Publish   Site    →  output/ + logfile  (decide, render, write, record)
//! ```
//!
//! The index needs every document before any single page can know its
//! siblings, so the whole tree is read and indexed first. Only then are
//! pages rendered (in parallel) and written (serially).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`markup`] | Markup → HTML fragment: headings, bullet lists, emphasis, em-dashes |
//! | [`fingerprint`] | Append-only SHA-1 log of everything built so far |
//! | [`document`] | One source file: title, category path, target path, fingerprint |
//! | [`naming`] | Captions and display titles derived from stems |
//! | [`scan`] | Walks the pages directory into a [`scan::Site`] |
//! | [`index`] | Flat navigation and nested category indexes, rendered with Maud |
//! | [`render`] | Wraps a page in `template.html` (upon) or legacy prefix/suffix fragments |
//! | [`publish`] | The build: decisions, parallel rendering, writes, fingerprint records |
//! | [`remote`] | Hands the output directory to `rsync` (or another transfer tool) |
//! | [`config`] | `config.toml` loading, validation and directory layout |
//! | [`output`] | CLI output formatting for survey and publish runs |
//!
//! # Design Decisions
//!
//! ## Content-Addressed Rebuilds
//!
//! The fingerprint log answers "was this exact content ever built?", not "is
//! this file newer than its output?". Modification times never matter, and
//! renaming an unchanged file costs nothing. The log is plain text and only
//! ever appended to; deleting it forces a full rebuild. See [`fingerprint`]
//! for the one behaviour this implies: reverting a page to an old version
//! does not republish it.
//!
//! ## Line-Oriented Markup
//!
//! The converter handles exactly what the pages use and nothing more. Every
//! line is one block; there is no paragraph grouping, no links, no code
//! blocks. The passes are listed in [`markup`].
//!
//! ## Two Renderers
//!
//! Page templates are user files, so they are interpreted at runtime with
//! [upon](https://docs.rs/upon). Category indexes are generated markup, so
//! they use [Maud](https://maud.lambda.xyz/) and its compile-time checked,
//! auto-escaped HTML.

pub mod config;
pub mod document;
pub mod fingerprint;
pub mod index;
pub mod markup;
pub mod naming;
pub mod output;
pub mod publish;
pub mod remote;
pub mod render;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
