//! The source document model.
//!
//! A [`Document`] is one file under the pages directory, read once at
//! discovery time and never mutated afterwards. Everything the later stages
//! need (title, category path, output location, fingerprint, landing-page
//! status) is derived here, once, from the path and content.
//!
//! ```text
//! pages/                          category_path   target_path
//! ├── index.md                    []              index.html
//! ├── about.md                    []              about.html
//! └── recipes/
//!     ├── recipes.md              [recipes]       recipes/recipes.html   (index page)
//!     └── nut-roast.md            [recipes]       recipes/nut-roast.html
//! ```

use crate::fingerprint::Fingerprint;
use crate::markup;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extensions converted by the markup converter. Anything else is copied
/// into the template verbatim.
const MARKUP_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Stem of the site's home page in the pages root.
pub const HOME_STEM: &str = "index";

/// How a document's content becomes an HTML fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Lightweight markup, run through [`markup::convert`].
    Markup,
    /// Already HTML (or plain text); used as-is.
    Verbatim,
}

#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute path to the source file; unique per document.
    pub source_path: PathBuf,
    /// Path relative to the pages root, `/`-separated (e.g. `recipes/nut-roast.md`).
    pub relative_path: String,
    /// File name without extension.
    pub stem: String,
    /// Full text as read at discovery time.
    pub raw_content: String,
    /// First heading in the content, or the stem when there is none.
    pub title: String,
    /// Directory names between the pages root and the file, outermost first.
    pub category_path: Vec<String>,
    /// Output location relative to the destination root.
    pub target_path: PathBuf,
    pub fingerprint: Fingerprint,
    /// Stem equals the parent directory name (`fruit/fruit.md`).
    pub is_index_page: bool,
    pub kind: DocumentKind,
}

impl Document {
    /// Read `path` (somewhere under `pages_root`) and derive a document.
    pub fn load(pages_root: &Path, path: &Path) -> io::Result<Self> {
        let raw_content = fs::read_to_string(path)?;
        Self::from_content(pages_root, path, raw_content)
    }

    /// Derive a document from already-read content.
    ///
    /// Fails with [`io::ErrorKind::InvalidInput`] if `path` is not inside
    /// `pages_root` or has no usable file name.
    pub fn from_content(pages_root: &Path, path: &Path, raw_content: String) -> io::Result<Self> {
        let invalid = |why: &str| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}: {why}", path.display()),
            )
        };
        let relative = path
            .strip_prefix(pages_root)
            .map_err(|_| invalid("not inside the pages directory"))?;
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| invalid("no file name"))?;

        let category_path: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let kind = if relative
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| MARKUP_EXTENSIONS.contains(&e.as_str()))
        {
            DocumentKind::Markup
        } else {
            DocumentKind::Verbatim
        };

        let title = markup::first_heading(&raw_content).unwrap_or_else(|| stem.clone());
        let is_index_page = category_path.last().is_some_and(|parent| *parent == stem);
        let target_path = target_path(&category_path, &stem);
        let fingerprint = Fingerprint::of(&raw_content);
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self {
            source_path: path.to_path_buf(),
            relative_path,
            stem,
            raw_content,
            title,
            category_path,
            target_path,
            fingerprint,
            is_index_page,
            kind,
        })
    }

    /// Site-absolute link to the rendered page, e.g. `/recipes/nut-roast.html`.
    pub fn href(&self) -> String {
        href_for(&self.target_path)
    }

    /// Directly under the pages root.
    pub fn is_top_level(&self) -> bool {
        self.category_path.is_empty()
    }

    /// The site's root `index` page.
    pub fn is_home(&self) -> bool {
        self.is_top_level() && self.stem == HOME_STEM
    }

    /// HTML fragment for this document's content.
    pub fn to_html(&self) -> String {
        match self.kind {
            DocumentKind::Markup => markup::convert(&self.raw_content),
            DocumentKind::Verbatim => self.raw_content.clone(),
        }
    }
}

/// Map a category path and stem to an output path: `a/b/stem.html`.
pub fn target_path(category_path: &[String], stem: &str) -> PathBuf {
    let mut path: PathBuf = category_path.iter().collect();
    path.push(format!("{stem}.html"));
    path
}

/// Turn a relative output path into a site-absolute URL path.
pub fn href_for(target: &Path) -> String {
    let parts: Vec<_> = target
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(relative: &str, content: &str) -> Document {
        let root = Path::new("/site/pages");
        Document::from_content(root, &root.join(relative), content.to_string()).unwrap()
    }

    #[test]
    fn top_level_document() {
        let d = doc("about.md", "# About Us\n\nHello");
        assert_eq!(d.stem, "about");
        assert_eq!(d.title, "About Us");
        assert!(d.category_path.is_empty());
        assert_eq!(d.target_path, PathBuf::from("about.html"));
        assert_eq!(d.href(), "/about.html");
        assert!(d.is_top_level());
        assert!(!d.is_index_page);
        assert_eq!(d.kind, DocumentKind::Markup);
    }

    #[test]
    fn nested_document() {
        let d = doc("recipes/mains/nut-roast.md", "# Nut Roast\n");
        assert_eq!(d.category_path, vec!["recipes", "mains"]);
        assert_eq!(d.target_path, PathBuf::from("recipes/mains/nut-roast.html"));
        assert_eq!(d.href(), "/recipes/mains/nut-roast.html");
        assert_eq!(d.relative_path, "recipes/mains/nut-roast.md");
    }

    #[test]
    fn title_falls_back_to_stem() {
        let d = doc("notes.md", "no heading here\n- item");
        assert_eq!(d.title, "notes");
    }

    #[test]
    fn title_from_later_heading() {
        let d = doc("notes.md", "intro\n## Second Rank\n");
        assert_eq!(d.title, "Second Rank");
    }

    #[test]
    fn index_page_detection() {
        assert!(doc("fruit/fruit.md", "# Fruit").is_index_page);
        assert!(!doc("fruit/apple.md", "# Apple").is_index_page);
        assert!(!doc("fruit/citrus/fruit.md", "").is_index_page);
    }

    #[test]
    fn root_level_file_is_never_an_index_page() {
        // The pages root itself is not a category.
        assert!(!doc("pages.md", "").is_index_page);
    }

    #[test]
    fn home_page() {
        assert!(doc("index.md", "").is_home());
        assert!(!doc("recipes/index.md", "").is_home());
    }

    #[test]
    fn verbatim_kind_for_html() {
        let d = doc("raw.html", "<p>already html</p>");
        assert_eq!(d.kind, DocumentKind::Verbatim);
        assert_eq!(d.to_html(), "<p>already html</p>");
        assert_eq!(d.target_path, PathBuf::from("raw.html"));
    }

    #[test]
    fn markup_extension_is_case_insensitive() {
        assert_eq!(doc("LOUD.MD", "").kind, DocumentKind::Markup);
        assert_eq!(doc("long.markdown", "").kind, DocumentKind::Markup);
    }

    #[test]
    fn markup_converted_to_html() {
        let d = doc("a.md", "# A\n- x");
        assert_eq!(d.to_html(), "<h1>A</h1>\n<ul><li>x</li></ul>");
    }

    #[test]
    fn fingerprint_from_raw_content() {
        let d = doc("a.md", "# A\n");
        assert_eq!(d.fingerprint, Fingerprint::of("# A\n"));
    }

    #[test]
    fn outside_root_is_invalid() {
        let err = Document::from_content(
            Path::new("/site/pages"),
            Path::new("/elsewhere/a.md"),
            String::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let pages = tmp.path().join("pages");
        fs::create_dir_all(pages.join("fruit")).unwrap();
        let path = pages.join("fruit/apple.md");
        fs::write(&path, "# Apple\n").unwrap();

        let d = Document::load(&pages, &path).unwrap();
        assert_eq!(d.title, "Apple");
        assert_eq!(d.category_path, vec!["fruit"]);
        assert_eq!(d.source_path, path);
    }
}
