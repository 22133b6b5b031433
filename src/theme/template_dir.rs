//! Theme backed by a directory of Tera templates.
//!
//! Every `*.html` file under the directory is loaded, so templates can extend
//! a shared base or include partials. The five page templates must exist:
//!
//! | Template        | Context                                     |
//! |-----------------|---------------------------------------------|
//! | `index.html`    | `site`, `kinds`, `posts`, `projects`, `about_html` |
//! | `posts.html`    | `site`, `listing`, `entries`, `posts`       |
//! | `projects.html` | `site`, `listing`, `entries`, `projects`    |
//! | `post.html`     | `site`, `entry`, `post`                     |
//! | `project.html`  | `site`, `entry`, `project`                  |
//! | `about.html`    | `site`, `about`                             |
//!
//! `about.html` is only needed once the content directory has an `about.md`;
//! a build that plans the about page without it fails before writing.
//!
//! HTML fields (`body_html`, `summary_html`, `about_html`) must be output
//! with `| safe`; everything else is autoescaped.

use crate::entity::Kind;
use crate::render::{Page, Renderer, TemplateError};
use crate::view::SiteView;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

pub(super) const REQUIRED_TEMPLATES: [&str; 5] = [
    "index.html",
    "posts.html",
    "post.html",
    "projects.html",
    "project.html",
];

pub struct TeraTheme {
    tera: Tera,
}

impl TeraTheme {
    /// Load and parse every template under `dir`.
    ///
    /// Fails if the directory is missing, a template does not parse, or one of
    /// the page templates is absent.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::Load {
                dir: dir.display().to_string(),
                message: "not a directory".to_string(),
            });
        }
        let pattern = format!("{}/**/*.html", dir.display());
        let tera = Tera::new(&pattern).map_err(|err| TemplateError::Load {
            dir: dir.display().to_string(),
            message: error_chain(&err),
        })?;

        let loaded: Vec<&str> = tera.get_template_names().collect();
        debug!(dir = %dir.display(), templates = loaded.len(), "templates loaded");
        if let Some(missing) = REQUIRED_TEMPLATES
            .iter()
            .find(|name| !loaded.contains(*name))
        {
            return Err(TemplateError::Missing {
                name: format!("{}/{missing}", dir.display()),
            });
        }

        Ok(Self { tera })
    }
}

impl Renderer for TeraTheme {
    fn name(&self) -> &str {
        "tera"
    }

    fn render(&self, site: &SiteView, page: &Page) -> Result<String, TemplateError> {
        let name = page.template_name();
        if !self.tera.get_template_names().any(|loaded| loaded == name) {
            return Err(TemplateError::Missing { name });
        }
        let context = page_context(site, page);
        self.tera
            .render(&name, &context)
            .map_err(|err| TemplateError::Render {
                name,
                message: error_chain(&err),
            })
    }
}

fn page_context(site: &SiteView, page: &Page) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", site);
    match page {
        Page::Index(index) => {
            ctx.insert("kinds", &index.kinds);
            ctx.insert("about_html", &index.about_html);
            for kind in Kind::ALL {
                let latest = index
                    .kind(kind)
                    .map(|summary| summary.latest.as_slice())
                    .unwrap_or_default();
                ctx.insert(kind.plural(), latest);
            }
        }
        Page::Listing(listing) => {
            ctx.insert("listing", listing);
            ctx.insert("entries", &listing.entries);
            ctx.insert(listing.kind.plural(), &listing.entries);
        }
        Page::Detail(detail) => {
            ctx.insert("entry", detail);
            ctx.insert(detail.kind().singular(), detail);
        }
        Page::About(about) => {
            ctx.insert("about", about);
        }
    }
    ctx
}

/// Tera nests the useful message (line, column, variable) in the source chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
