//! Navigation and category index construction.
//!
//! Two structures are derived from the complete document set, because
//! templates put them in different places on the page:
//!
//! - **Navigation** ([`build_navigation`]): a flat, caption-sorted list of
//!   `{href, caption}` links to every top-level page and every top-level
//!   category. The home page is not listed; templates link to it themselves.
//! - **Category indexes** ([`build_category_index`]): for each category, a
//!   heading plus a nested `<ul>` of everything inside it. This is what a
//!   category's landing page (`fruit/fruit.md`) shows below its own content.
//!
//! # Category index shape
//!
//! ```text
//! <h2>Fruit</h2>                         rank = nesting depth + 1
//! <ul>
//!   <li><a href="/index.html">Home</a></li>     only if the category has a landing page
//!   <li><a href="/fruit/apple.html">Apple</a></li>
//!   <li><h3>Citrus</h3><ul>…</ul></li>   sub-categories nest inside an item
//! </ul>
//! ```
//!
//! Members are sorted by stem (documents) or directory name (categories). A
//! category's own landing page is never listed as an entry: it *is* the page
//! the heading stands for. A category with nothing to list renders as an
//! empty string, so no template ever shows a heading over an empty list.

use crate::document::{Document, HOME_STEM};
use crate::naming::{capitalize, display_title};
use maud::{Markup, html};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Site-absolute URL of the home page, used by the synthetic "Home" entry.
pub const HOME_HREF: &str = "/index.html";

/// One entry in the flat navigation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub href: String,
    pub caption: String,
}

/// A directory under the pages root that holds at least one document.
#[derive(Debug, Clone)]
pub struct Category<'a> {
    /// Directory name.
    pub name: String,
    /// Directory names from the pages root down to this one, inclusive.
    pub path: Vec<String>,
    /// Documents directly inside this directory.
    pub documents: Vec<&'a Document>,
    /// Sub-categories, keyed (and therefore ordered) by name.
    pub children: BTreeMap<String, Category<'a>>,
}

impl<'a> Category<'a> {
    fn new(path: Vec<String>) -> Self {
        Self {
            name: path.last().cloned().unwrap_or_default(),
            path,
            documents: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Nesting depth; 1 for a directory directly under the pages root.
    pub fn level(&self) -> usize {
        self.path.len()
    }

    /// The `name/name.md` document, if present.
    pub fn landing_page(&self) -> Option<&'a Document> {
        self.documents.iter().copied().find(|d| d.is_index_page)
    }

    /// Whether the index starts with a link back to the home page: when the
    /// category has its own landing page, or holds a page named `index`.
    pub fn links_home(&self) -> bool {
        self.landing_page().is_some() || self.documents.iter().any(|d| d.stem == HOME_STEM)
    }

    /// Site-absolute URL of the landing page location, whether or not the
    /// landing page exists: `/fruit/fruit.html`.
    pub fn href(&self) -> String {
        let mut href = String::new();
        for part in &self.path {
            href.push('/');
            href.push_str(part);
        }
        format!("{href}/{}.html", self.name)
    }

    fn insert(&mut self, doc: &'a Document, depth: usize) {
        if depth == doc.category_path.len() {
            self.documents.push(doc);
            return;
        }
        let name = &doc.category_path[depth];
        self.children
            .entry(name.clone())
            .or_insert_with(|| Category::new(doc.category_path[..=depth].to_vec()))
            .insert(doc, depth + 1);
    }

    /// Depth-first iteration over this category and all below it.
    pub fn walk(&self) -> Vec<&Category<'a>> {
        let mut out = vec![self];
        for child in self.children.values() {
            out.extend(child.walk());
        }
        out
    }
}

/// Group documents into the category tree. Returns the top-level categories,
/// ordered by name. Directories without any documents do not appear.
pub fn categories(documents: &[Document]) -> BTreeMap<String, Category<'_>> {
    let mut root = Category::new(Vec::new());
    for doc in documents.iter().filter(|d| !d.is_top_level()) {
        root.insert(doc, 0);
    }
    root.children
}

/// Flat top-level navigation, sorted by caption.
///
/// One entry per top-level document except the home page, plus one per
/// top-level category. Captions are the capitalized stem or directory name.
/// Ties (e.g. `news.md` next to a `news/` category) are broken by href.
pub fn build_navigation(documents: &[Document]) -> Vec<NavLink> {
    let pages = documents
        .iter()
        .filter(|d| d.is_top_level() && !d.is_home())
        .map(|d| NavLink {
            href: d.href(),
            caption: capitalize(&d.stem),
        });
    let sections = categories(documents).into_values().map(|c| NavLink {
        href: c.href(),
        caption: capitalize(&c.name),
    });

    let mut links: Vec<NavLink> = pages.chain(sections).collect();
    links.sort_by(|a, b| a.caption.cmp(&b.caption).then_with(|| a.href.cmp(&b.href)));
    links
}

/// Render a category's nested index as HTML, or `""` if it would be empty.
pub fn build_category_index(category: &Category<'_>) -> String {
    render_category(category)
        .map(Markup::into_string)
        .unwrap_or_default()
}

fn render_category(category: &Category<'_>) -> Option<Markup> {
    let mut members: Vec<(&str, Markup)> = category
        .documents
        .iter()
        .filter(|d| !d.is_index_page && d.stem != HOME_STEM)
        .map(|d| {
            (
                d.stem.as_str(),
                html! { a href=(d.href()) { (d.title) } },
            )
        })
        .collect();
    members.extend(
        category
            .children
            .values()
            .filter_map(|child| render_category(child).map(|m| (child.name.as_str(), m))),
    );

    if members.is_empty() {
        return None;
    }
    members.sort_by(|a, b| a.0.cmp(b.0));

    let title = display_title(&category.name);
    Some(html! {
        (heading(category.level() + 1, &title))
        ul {
            @if category.links_home() {
                li { a href=(HOME_HREF) { "Home" } }
            }
            @for (_, member) in &members {
                li { (member) }
            }
        }
    })
}

/// A heading element of the given rank, clamped to `h1`..`h6`.
fn heading(rank: usize, text: &str) -> Markup {
    match rank {
        0 | 1 => html! { h1 { (text) } },
        2 => html! { h2 { (text) } },
        3 => html! { h3 { (text) } },
        4 => html! { h4 { (text) } },
        5 => html! { h5 { (text) } },
        _ => html! { h6 { (text) } },
    }
}

/// Everything the renderer needs from the index, computed once per run.
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    pub navigation: Vec<NavLink>,
    /// Non-empty category indexes, keyed by category path.
    pub branches: HashMap<Vec<String>, String>,
}

impl SiteIndex {
    pub fn build(documents: &[Document]) -> Self {
        let navigation = build_navigation(documents);
        let mut branches = HashMap::new();
        for top in categories(documents).values() {
            for category in top.walk() {
                let rendered = build_category_index(category);
                if !rendered.is_empty() {
                    branches.insert(category.path.clone(), rendered);
                }
            }
        }
        Self {
            navigation,
            branches,
        }
    }

    /// The category index shown on `doc`, if `doc` is a landing page whose
    /// category has anything to list.
    pub fn branches_for(&self, doc: &Document) -> Option<&str> {
        if !doc.is_index_page {
            return None;
        }
        self.branches.get(&doc.category_path).map(String::as_str)
    }

    /// Stable text form of the whole index, for change detection.
    pub fn digest_source(&self) -> String {
        let mut out = String::new();
        for link in &self.navigation {
            out.push_str(&format!("nav {} {}\n", link.href, link.caption));
        }
        let mut keys: Vec<_> = self.branches.keys().collect();
        keys.sort();
        for key in keys {
            out.push_str(&format!("branch /{}\n{}\n", key.join("/"), self.branches[key]));
        }
        out
    }
}
