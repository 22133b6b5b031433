//! The seam between the site builder and HTML themes.
//!
//! The builder decides *which* pages exist and where they go; a [`Renderer`]
//! only turns one [`Page`] into a string. Rendering must be a pure function of
//! its inputs: the builder calls it from several threads at once and relies on
//! identical inputs producing identical output.

use crate::entity::Kind;
use crate::view::{self, AboutView, DetailView, IndexView, ListingView, SiteView};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{name}' not found")]
    Missing { name: String },
    #[error("failed to load templates from {dir}: {message}")]
    Load { dir: String, message: String },
    #[error("failed to render '{name}': {message}")]
    Render { name: String, message: String },
}

/// A page to render.
#[derive(Debug, Clone)]
pub enum Page {
    /// Site root `index.html`.
    Index(IndexView),
    /// `<kind>/index.html`.
    Listing(ListingView),
    /// `<kind>/<slug>.html`.
    Detail(DetailView),
    /// `about/index.html`, only when `about.md` exists.
    About(AboutView),
}

impl Page {
    /// Template stem used by template-directory themes.
    pub fn template_name(&self) -> String {
        match self {
            Page::Index(_) => "index.html".to_string(),
            Page::Listing(listing) => format!("{}.html", listing.kind.plural()),
            Page::Detail(detail) => format!("{}.html", detail.kind().singular()),
            Page::About(_) => "about.html".to_string(),
        }
    }

    /// Output path relative to the output root, `/`-separated.
    pub fn output_path(&self) -> String {
        match self {
            Page::Index(_) => "index.html".to_string(),
            Page::Listing(listing) => view::listing_path(listing.kind),
            Page::Detail(detail) => view::detail_path(detail.kind(), &detail.entry().slug),
            Page::About(_) => view::ABOUT_PATH.to_string(),
        }
    }

    /// Kind this page belongs to, `None` for the home and about pages.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Page::Index(_) | Page::About(_) => None,
            Page::Listing(listing) => Some(listing.kind),
            Page::Detail(detail) => Some(detail.kind()),
        }
    }
}

/// Turns pages into HTML.
pub trait Renderer: Send + Sync {
    /// Short name for logs and the build summary.
    fn name(&self) -> &str;

    fn render(&self, site: &SiteView, page: &Page) -> Result<String, TemplateError>;
}

/// A page rendered and ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub path: String,
    pub html: String,
}
