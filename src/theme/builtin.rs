//! Built-in theme.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating:
//! type-checked markup with automatic escaping. Rendered Markdown is the only
//! content inserted unescaped.
//!
//! CSS is embedded: `theme/style.css` with the configured color variables
//! prepended, inlined into every page so the output has no asset dependencies.

use crate::config::{self, SiteConfig};
use crate::entity::Kind;
use crate::render::{Page, Renderer, TemplateError};
use crate::view::{AboutView, DetailView, IndexView, KindSummary, ListingView, SiteView};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../../theme/style.css");

pub struct MaudTheme {
    css: String,
}

impl MaudTheme {
    pub fn new(config: &SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
        }
    }
}

impl Renderer for MaudTheme {
    fn name(&self) -> &str {
        "builtin"
    }

    fn render(&self, site: &SiteView, page: &Page) -> Result<String, TemplateError> {
        let markup = match page {
            Page::Index(index) => render_index(site, index, &self.css),
            Page::Listing(listing) => render_listing(site, listing, &self.css),
            Page::Detail(detail) => render_detail(site, detail, &self.css),
            Page::About(about) => render_about(site, about, &self.css),
        };
        Ok(markup.into_string())
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, site: &SiteView, css: &str, content: Markup) -> Markup {
    let full_title = if title == site.title {
        title.to_string()
    } else {
        format!("{} | {}", title, site.title)
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if !site.description.is_empty() {
                    meta name="description" content=(site.description);
                }
                title { (full_title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
                (site_footer(site))
            }
        }
    }
}

/// Renders the site header: site title, one link per kind, then About.
fn site_header(site: &SiteView, current: Option<Kind>) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (site.title) }
            nav.site-nav {
                ul {
                    @for link in &site.nav {
                        li class=[(current == Some(link.kind)).then_some("current")] {
                            a href=(link.url) { (link.label) }
                        }
                    }
                    @if let Some(url) = &site.about_url {
                        li { a href=(url) { "About" } }
                    }
                }
            }
        }
    }
}

fn site_footer(site: &SiteView) -> Markup {
    html! {
        footer.site-footer {
            @if site.author.is_empty() {
                (site.title)
            } @else {
                "© " (site.author)
            }
        }
    }
}

/// Tag or skill chips.
fn labels(items: &[String]) -> Markup {
    html! {
        @if !items.is_empty() {
            ul.labels {
                @for item in items {
                    li { (item) }
                }
            }
        }
    }
}

/// One entry in a listing: title, date and summary.
fn entry_card(detail: &DetailView) -> Markup {
    let entry = detail.entry();
    html! {
        li.entry-card {
            @if let DetailView::Post(post) = detail {
                @if let Some(thumb) = &post.thumbnail_url {
                    img src=(thumb) alt=(entry.title) loading="lazy";
                }
            }
            h3 { a href=(entry.url) { (entry.title) } }
            p.meta {
                time datetime=(entry.created_at) { (entry.date) }
                @if let DetailView::Project(project) = detail {
                    " · " (project.project_type)
                }
            }
            @if !entry.summary.is_empty() {
                div.summary { (PreEscaped(&entry.summary_html)) }
            }
            (labels(detail.labels()))
        }
    }
}

fn kind_section(summary: &KindSummary) -> Markup {
    html! {
        section.kind-summary {
            h2 { a href=(summary.url) { (summary.heading) } }
            @if summary.latest.is_empty() {
                p.meta { "Nothing here yet." }
            } @else {
                ul.entry-list {
                    @for detail in &summary.latest {
                        (entry_card(detail))
                    }
                }
                @if summary.count > summary.latest.len() {
                    p { a href=(summary.url) { "All " (summary.count) " " (summary.kind) " →" } }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_index(site: &SiteView, index: &IndexView, css: &str) -> Markup {
    let content = html! {
        (site_header(site, None))
        main.index-page {
            h1 { (site.title) }
            @if !site.description.is_empty() {
                p.site-description { (site.description) }
            }
            @if let Some(about) = &index.about_html {
                section.about-summary {
                    (PreEscaped(about))
                    @if let Some(url) = &site.about_url {
                        p { a href=(url) { "More about me →" } }
                    }
                }
            }
            @for summary in &index.kinds {
                (kind_section(summary))
            }
        }
    };
    base_document(&site.title, site, css, content)
}

fn render_listing(site: &SiteView, listing: &ListingView, css: &str) -> Markup {
    let content = html! {
        (site_header(site, Some(listing.kind)))
        main.listing-page {
            h1 { (listing.heading) }
            ul.entry-list {
                @for detail in &listing.entries {
                    (entry_card(detail))
                }
            }
        }
    };
    base_document(&listing.heading, site, css, content)
}

fn render_detail(site: &SiteView, detail: &DetailView, css: &str) -> Markup {
    let entry = detail.entry();
    let content = html! {
        (site_header(site, Some(entry.kind)))
        main.detail-page {
            article {
                header.entry-header {
                    h1 { (entry.title) }
                    p.meta {
                        time datetime=(entry.created_at) { (entry.date) }
                        @match detail {
                            DetailView::Post(post) => {
                                @if !post.author.is_empty() {
                                    " · " (post.author)
                                }
                            }
                            DetailView::Project(project) => {
                                " · " (project.project_type)
                                @if let Some(duration) = &project.duration {
                                    " · " (duration)
                                }
                            }
                        }
                    }
                    (labels(detail.labels()))
                }
                div.entry-body {
                    (PreEscaped(&entry.body_html))
                }
            }
            p { a href=(format!("/{}/", entry.kind.plural())) { "← " (entry.kind.heading()) } }
        }
    };
    base_document(&entry.title, site, css, content)
}

fn render_about(site: &SiteView, about: &AboutView, css: &str) -> Markup {
    let content = html! {
        (site_header(site, None))
        main.about-page {
            article {
                h1 { (about.heading) }
                div.entry-body {
                    (PreEscaped(&about.body_html))
                }
            }
        }
    };
    base_document(&about.heading, site, css, content)
}

// ============================================================================
// Tests
// ============================================================================
