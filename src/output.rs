//! CLI output formatting for survey and publish runs.
//!
//! # Information-First Display
//!
//! Every entity leads with what a reader recognises (title, caption) and
//! shows filesystem paths as secondary, indented context. Positional indices
//! are per sibling level.
//!
//! # Output Format
//!
//! ## Survey (`--check`)
//!
//! ```text
//! Navigation
//! 001 About → /about.html
//! 002 Recipes → /recipes/recipes.html
//!
//! Pages
//! 001 Welcome → index.html
//!     Source: index.md
//! 002 Nut Roast → recipes/nut-roast.html
//!     Source: recipes/nut-roast.md
//!
//! Categories
//! 001 Recipes (2 pages)
//!     Landing: recipes/recipes.md
//! ```
//!
//! ## Publish
//!
//! ```text
//! index.md → index.html
//! recipes/nut-roast.md: unchanged
//! Stylesheet copied
//! Published 1 written, 1 unchanged (2 total)
//! ```
//!
//! # Architecture
//!
//! Each run type has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::document::href_for;
use crate::index::{Category, SiteIndex, categories};
use crate::naming::display_title;
use crate::publish::{BuildReport, Outcome};
use crate::scan::Site;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `/`-joined display form of a relative path.
fn display_path(path: &Path) -> String {
    href_for(path).trim_start_matches('/').to_string()
}

fn pages_label(n: usize) -> String {
    if n == 1 {
        "1 page".to_string()
    } else {
        format!("{n} pages")
    }
}

// ============================================================================
// Survey output
// ============================================================================

/// Format the discovered structure: navigation, pages and the category tree.
pub fn format_scan_output(site: &Site, index: &SiteIndex) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Navigation".to_string());
    for (i, link) in index.navigation.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            link.caption,
            link.href
        ));
    }

    lines.push(String::new());
    lines.push("Pages".to_string());
    let mut documents: Vec<_> = site.documents.iter().collect();
    documents.sort_by(|a, b| a.target_path.cmp(&b.target_path));
    for (i, doc) in documents.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            doc.title,
            display_path(&doc.target_path)
        ));
        lines.push(format!("    Source: {}", doc.relative_path));
    }

    let tree = categories(&site.documents);
    if !tree.is_empty() {
        lines.push(String::new());
        lines.push("Categories".to_string());
        for (i, category) in tree.values().enumerate() {
            format_category(category, i + 1, 0, &mut lines);
        }
    }

    lines
}

fn format_category(category: &Category<'_>, position: usize, depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth);
    lines.push(format!(
        "{pad}{} {} ({})",
        format_index(position),
        display_title(&category.name),
        pages_label(category.documents.len())
    ));
    if let Some(landing) = category.landing_page() {
        lines.push(format!("{pad}    Landing: {}", landing.relative_path));
    }
    for (i, child) in category.children.values().enumerate() {
        format_category(child, i + 1, depth + 1, lines);
    }
}

/// Print survey output to stdout.
pub fn print_scan_output(site: &Site, index: &SiteIndex) {
    for line in format_scan_output(site, index) {
        println!("{}", line);
    }
}

// ============================================================================
// Publish output
// ============================================================================

/// Format the per-page outcome of a publish run, then a one-line summary.
pub fn format_publish_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if report.templates_changed {
        lines.push("Templates changed, rebuilding every page".to_string());
    } else if report.structure_changed {
        lines.push("Navigation changed, rebuilding every page".to_string());
    }

    for page in &report.pages {
        match page.outcome {
            Outcome::Written => lines.push(format!(
                "{} \u{2192} {}",
                page.source,
                display_path(&page.target)
            )),
            Outcome::Skipped => lines.push(format!("{}: unchanged", page.source)),
        }
    }

    if report.stylesheet_updated {
        lines.push("Stylesheet copied".to_string());
    }
    lines.push(format!("Published {}", report.stats));
    lines
}

/// Print publish output to stdout.
pub fn print_publish_output(report: &BuildReport) {
    for line in format_publish_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
