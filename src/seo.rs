//! `sitemap.xml` and `robots.txt`.
//!
//! Both need an absolute site URL, so the builder only writes them when
//! `site.base_url` is configured. `lastmod` comes from entry timestamps, never
//! from the clock, so rebuilding unchanged content produces identical files.

use crate::entity::Kind;
use chrono::NaiveDateTime;

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    /// Site-relative path: `""` for the home page, `posts/` for a listing.
    pub path: String,
    pub lastmod: Option<NaiveDateTime>,
    pub changefreq: &'static str,
    pub priority: f32,
}

impl SitemapUrl {
    pub fn home(lastmod: Option<NaiveDateTime>) -> Self {
        Self {
            path: String::new(),
            lastmod,
            changefreq: "weekly",
            priority: 1.0,
        }
    }

    /// The about page has no timestamp of its own.
    pub fn about() -> Self {
        Self {
            path: "about/".to_string(),
            lastmod: None,
            changefreq: "monthly",
            priority: 0.8,
        }
    }

    pub fn listing(kind: Kind, lastmod: Option<NaiveDateTime>) -> Self {
        let (changefreq, priority) = match kind {
            Kind::Post => ("daily", 0.9),
            Kind::Project => ("weekly", 0.8),
        };
        Self {
            path: format!("{}/", kind.plural()),
            lastmod,
            changefreq,
            priority,
        }
    }

    pub fn detail(kind: Kind, slug: &str, lastmod: NaiveDateTime) -> Self {
        let priority = match kind {
            Kind::Post => 0.6,
            Kind::Project => 0.7,
        };
        Self {
            path: crate::view::detail_path(kind, slug),
            lastmod: Some(lastmod),
            changefreq: "monthly",
            priority,
        }
    }
}

/// Render a sitemap for `urls` under `base_url` (no trailing slash).
pub fn sitemap_xml(base_url: &str, urls: &[SitemapUrl]) -> String {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#.to_string(),
    ];
    for url in urls {
        lines.push("  <url>".to_string());
        lines.push(format!(
            "    <loc>{}</loc>",
            escape_xml(&format!("{base_url}/{}", url.path))
        ));
        if let Some(lastmod) = url.lastmod {
            lines.push(format!("    <lastmod>{}</lastmod>", lastmod.format("%Y-%m-%d")));
        }
        lines.push(format!("    <changefreq>{}</changefreq>", url.changefreq));
        lines.push(format!("    <priority>{:.1}</priority>", url.priority));
        lines.push("  </url>".to_string());
    }
    lines.push("</urlset>".to_string());
    let mut xml = lines.join("\n");
    xml.push('\n');
    xml
}

pub fn robots_txt(base_url: &str) -> String {
    format!("User-agent: *\nAllow: /\n\nSitemap: {base_url}/sitemap.xml\n")
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
