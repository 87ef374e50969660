//! Page rendering: wrapping a converted fragment in the site template.
//!
//! A site provides its page shell in one of two forms, checked in order:
//!
//! 1. `template.html`, an [upon] template with these variables:
//!
//!    | Variable | Value |
//!    |----------|-------|
//!    | `content` | the page's HTML fragment |
//!    | `title` | the document title |
//!    | `nav` | list of `{href, caption}` navigation links |
//!    | `branches` | the category index on landing pages, otherwise `""` |
//!
//! 2. `prefix.html` + `suffix.html`, plain HTML concatenated around the
//!    fragment (and the category index, where there is one). Older sites use
//!    this form. Neither fragment is interpreted.
//!
//! Values are inserted as-is: the fragment is already HTML.

use crate::config::SitePaths;
use crate::index::NavLink;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use upon::{Engine, Template};

pub const PREFIX_FRAGMENT: &str = "prefix.html";
pub const SUFFIX_FRAGMENT: &str = "suffix.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no page template: expected {template} or prefix.html and suffix.html beside it")]
    MissingTemplate { template: PathBuf },
    #[error("cannot read template {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] upon::Error),
}

/// Everything a template can show for one page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub content: &'a str,
    pub title: &'a str,
    pub navigation: &'a [NavLink],
    pub branches: Option<&'a str>,
}

/// Turns a page context into a complete HTML document.
pub trait Renderer: Send + Sync {
    fn render(&self, page: &PageContext<'_>) -> Result<String, RenderError>;

    /// Files this renderer was loaded from, for change detection.
    fn sources(&self) -> &[PathBuf];
}

/// Renders through a compiled `template.html`.
pub struct TemplateRenderer {
    engine: Engine<'static>,
    template: Template<'static>,
    sources: Vec<PathBuf>,
}

impl TemplateRenderer {
    /// Compile template source. Syntax errors surface here, not per page.
    pub fn compile(source: String, origin: PathBuf) -> Result<Self, RenderError> {
        let engine = Engine::new();
        let template = engine.compile(source)?;
        Ok(Self {
            engine,
            template,
            sources: vec![origin],
        })
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        Self::compile(read(path)?, path.to_path_buf())
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, page: &PageContext<'_>) -> Result<String, RenderError> {
        let context = upon::value! {
            content: page.content,
            title: page.title,
            nav: upon::to_value(page.navigation)?,
            branches: page.branches.unwrap_or_default(),
        };
        Ok(self.template.render(&self.engine, context).to_string()?)
    }

    fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Concatenates `prefix + content + branches + suffix`.
pub struct FragmentRenderer {
    prefix: String,
    suffix: String,
    sources: Vec<PathBuf>,
}

impl FragmentRenderer {
    pub fn new(prefix: String, suffix: String) -> Self {
        Self {
            prefix,
            suffix,
            sources: Vec::new(),
        }
    }

    pub fn load(templates_dir: &Path) -> Result<Self, RenderError> {
        let prefix_path = templates_dir.join(PREFIX_FRAGMENT);
        let suffix_path = templates_dir.join(SUFFIX_FRAGMENT);
        let mut renderer = Self::new(read(&prefix_path)?, read(&suffix_path)?);
        renderer.sources = vec![prefix_path, suffix_path];
        Ok(renderer)
    }
}

impl Renderer for FragmentRenderer {
    fn render(&self, page: &PageContext<'_>) -> Result<String, RenderError> {
        let branches = page.branches.unwrap_or_default();
        let mut out = String::with_capacity(
            self.prefix.len() + page.content.len() + branches.len() + self.suffix.len(),
        );
        out.push_str(&self.prefix);
        out.push_str(page.content);
        out.push_str(branches);
        out.push_str(&self.suffix);
        Ok(out)
    }

    fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Pick the renderer a site provides: the template if present, otherwise
/// both legacy fragments. Having neither is fatal.
pub fn load_renderer(paths: &SitePaths) -> Result<Box<dyn Renderer>, RenderError> {
    if paths.template.is_file() {
        tracing::debug!(template = %paths.template.display(), "using page template");
        return Ok(Box::new(TemplateRenderer::load(&paths.template)?));
    }
    let fragments = [PREFIX_FRAGMENT, SUFFIX_FRAGMENT].map(|f| paths.templates.join(f));
    if fragments.iter().all(|f| f.is_file()) {
        tracing::debug!(dir = %paths.templates.display(), "using prefix/suffix fragments");
        return Ok(Box::new(FragmentRenderer::load(&paths.templates)?));
    }
    Err(RenderError::MissingTemplate {
        template: paths.template.clone(),
    })
}

fn read(path: &Path) -> Result<String, RenderError> {
    fs::read_to_string(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })
}
