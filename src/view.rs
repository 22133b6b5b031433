//! Typed page views handed to renderers.
//!
//! Views are the only thing a theme sees: Markdown is already rendered to
//! HTML, dates are already formatted and URLs are already resolved. They
//! serialize to the context the Tera theme exposes to user templates.
//!
//! URLs are root-relative (`/posts/hello.html`); the sitemap prefixes them
//! with `site.base_url`.

use crate::config::SiteConfig;
use crate::entity::{Details, Entry, Kind, TIMESTAMP_FORMAT};
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;

/// Characters of body text used when a post has no summary.
pub const SUMMARY_FALLBACK_CHARS: usize = 200;

/// Entries per kind shown on the home page.
pub const LATEST_ON_INDEX: usize = 5;

/// Render Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// Summary shown for a post without one: the start of the body plus `...`.
pub fn fallback_summary(body: &str) -> String {
    let mut summary: String = body.chars().take(SUMMARY_FALLBACK_CHARS).collect();
    summary.push_str("...");
    summary
}

/// Site-relative path of an entry's detail page.
pub fn detail_path(kind: Kind, slug: &str) -> String {
    format!("{}/{slug}.html", kind.plural())
}

/// Site-relative path of a kind's listing page.
pub fn listing_path(kind: Kind) -> String {
    format!("{}/index.html", kind.plural())
}

/// Site-relative path of the about page.
pub const ABOUT_PATH: &str = "about/index.html";

/// Root-relative URL of the about page.
pub const ABOUT_URL: &str = "/about/";

/// Site identity and navigation, shared by every page.
#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub title: String,
    pub description: String,
    pub author: String,
    pub base_url: Option<String>,
    pub nav: Vec<NavLink>,
    /// Set when the site has an about page.
    pub about_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub kind: Kind,
    pub label: String,
    pub url: String,
}

impl SiteView {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.site.title.clone(),
            description: config.site.description.clone(),
            author: config.site.author.clone(),
            base_url: config.base_url().map(str::to_string),
            nav: Kind::ALL
                .iter()
                .map(|&kind| NavLink {
                    kind,
                    label: kind.heading().to_string(),
                    url: format!("/{}/", kind.plural()),
                })
                .collect(),
            about_url: None,
        }
    }

    /// Link the about page from every page's navigation.
    pub fn with_about(mut self) -> Self {
        self.about_url = Some(ABOUT_URL.to_string());
        self
    }
}

/// Formatting choices applied while building views.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// strftime format for displayed dates.
    pub date_format: String,
    /// Author shown on posts without one.
    pub default_author: String,
}

impl ViewOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            date_format: config.build.date_format.clone(),
            default_author: config.site.author.clone(),
        }
    }
}

/// Fields every kind shares.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub kind: Kind,
    pub slug: String,
    pub title: String,
    pub url: String,
    /// Plain summary text (post summaries fall back to the body excerpt).
    pub summary: String,
    pub summary_html: String,
    pub body_html: String,
    /// `created_at` in the display format.
    pub date: String,
    /// `created_at` in storage format, for `<time datetime>` and sorting in templates.
    pub created_at: String,
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub entry: EntryView,
    pub author: String,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub entry: EntryView,
    pub project_type: String,
    pub duration: Option<String>,
    pub skills: Vec<String>,
}

/// A detail-page view of either kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DetailView {
    Post(PostView),
    Project(ProjectView),
}

impl DetailView {
    pub fn from_entry(entry: &Entry, options: &ViewOptions) -> Self {
        let kind = entry.kind();
        let summary = match (&entry.summary, kind) {
            (Some(summary), _) => summary.clone(),
            (None, Kind::Post) => fallback_summary(&entry.body),
            (None, Kind::Project) => String::new(),
        };
        let base = EntryView {
            kind,
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            url: format!("/{}", detail_path(kind, &entry.slug)),
            summary_html: markdown_to_html(&summary),
            summary,
            body_html: markdown_to_html(&entry.body),
            date: entry.created_at.format(&options.date_format).to_string(),
            created_at: entry.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated: entry
                .updated_at
                .map(|at| at.format(&options.date_format).to_string()),
        };

        match &entry.details {
            Details::Post(post) => DetailView::Post(PostView {
                entry: base,
                author: post
                    .author
                    .clone()
                    .unwrap_or_else(|| options.default_author.clone()),
                tags: post.tags.clone(),
                thumbnail_url: post.thumbnail_url.clone(),
            }),
            Details::Project(project) => DetailView::Project(ProjectView {
                entry: base,
                project_type: project.project_type.clone(),
                duration: project.duration.clone(),
                skills: project.skills.clone(),
            }),
        }
    }

    pub fn entry(&self) -> &EntryView {
        match self {
            DetailView::Post(post) => &post.entry,
            DetailView::Project(project) => &project.entry,
        }
    }

    pub fn kind(&self) -> Kind {
        self.entry().kind
    }

    /// Tags for posts, skills for projects.
    pub fn labels(&self) -> &[String] {
        match self {
            DetailView::Post(post) => &post.tags,
            DetailView::Project(project) => &project.skills,
        }
    }
}

/// All entries of one kind, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub kind: Kind,
    pub heading: String,
    pub url: String,
    pub entries: Vec<DetailView>,
}

impl ListingView {
    /// `entries` must already be in listing order.
    pub fn new(kind: Kind, entries: Vec<DetailView>) -> Self {
        Self {
            kind,
            heading: kind.heading().to_string(),
            url: format!("/{}/", kind.plural()),
            entries,
        }
    }

    pub fn summary(&self) -> KindSummary {
        KindSummary {
            kind: self.kind,
            heading: self.heading.clone(),
            url: self.url.clone(),
            count: self.entries.len(),
            latest: self
                .entries
                .iter()
                .take(LATEST_ON_INDEX)
                .cloned()
                .collect(),
        }
    }
}

/// One kind as shown on the home page.
#[derive(Debug, Clone, Serialize)]
pub struct KindSummary {
    pub kind: Kind,
    pub heading: String,
    pub url: String,
    pub count: usize,
    pub latest: Vec<DetailView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexView {
    pub kinds: Vec<KindSummary>,
    /// Rendered `about_summary.md`, shown on the home page.
    pub about_html: Option<String>,
}

impl IndexView {
    pub fn new(kinds: Vec<KindSummary>) -> Self {
        Self {
            kinds,
            about_html: None,
        }
    }

    pub fn with_about_summary(mut self, markdown: &str) -> Self {
        self.about_html = Some(markdown_to_html(markdown));
        self
    }

    pub fn kind(&self, kind: Kind) -> Option<&KindSummary> {
        self.kinds.iter().find(|summary| summary.kind == kind)
    }
}

/// The about page, rendered from `about.md`.
#[derive(Debug, Clone, Serialize)]
pub struct AboutView {
    pub heading: String,
    pub url: String,
    pub body_html: String,
}

impl AboutView {
    pub fn from_markdown(markdown: &str) -> Self {
        Self {
            heading: "About".to_string(),
            url: ABOUT_URL.to_string(),
            body_html: markdown_to_html(markdown),
        }
    }
}
