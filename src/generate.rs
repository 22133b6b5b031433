//! Static site generation.
//!
//! Turns the contents of a [`ContentStore`] into an output tree:
//!
//! ```text
//! dist/
//! ├── index.html               # Home: every kind with its latest entries
//! ├── about/index.html         # Only when content/about.md exists
//! ├── posts/
//! │   ├── index.html           # Listing, newest first
//! │   └── hello.html           # One page per valid entry
//! ├── projects/
//! │   └── ...
//! ├── static/                  # Copied verbatim from paths.static_dir
//! ├── sitemap.xml              # Only with site.base_url
//! ├── robots.txt               # Only with site.base_url
//! └── .build-manifest.json     # Ledger of everything above
//! ```
//!
//! ## Pipeline
//!
//! 1. **Load**: `list_all` per kind, plus the optional `about.md` and
//!    `about_summary.md` from `paths.content_dir`. A store that cannot list
//!    is fatal, and so is an about file that exists but cannot be read.
//! 2. **Validate**: invalid entries are skipped and reported; the build goes on.
//! 3. **Render**: every page is rendered, in parallel, before anything is
//!    written. A template error aborts the build with the output untouched.
//! 4. **Write**: pages, static assets and SEO files. A file that cannot be
//!    written is reported and the rest are still written.
//! 5. **Prune**: files the previous build wrote that this one did not are
//!    removed (`build.prune_stale`).
//!
//! Rendering is a pure function of the store contents and the config, so
//! rebuilding unchanged content produces byte-identical files.

use crate::config::{BuildConfig, SiteConfig};
use crate::entity::{self, Entry, Kind};
use crate::ledger::{self, FileStats, FileStatus, OutputLedger};
use crate::render::{Page, RenderedPage, Renderer, TemplateError};
use crate::seo::{self, SitemapUrl};
use crate::store::{ContentStore, StoreError};
use crate::theme;
use crate::view::{AboutView, DetailView, IndexView, ListingView, SiteView, ViewOptions};
use crate::writer::{OutputWriter, WriteFailure};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Directory under the output root that receives `paths.static_dir`.
pub const STATIC_PREFIX: &str = "static";

/// Markdown for the about page, under `paths.content_dir`.
pub const ABOUT_FILE: &str = "about.md";

/// Markdown shown on the home page, under `paths.content_dir`.
pub const ABOUT_SUMMARY_FILE: &str = "about_summary.md";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("failed to load {kind}: {source}")]
    Store {
        kind: Kind,
        #[source]
        source: StoreError,
    },
    #[error("Cannot read {path}: {source}")]
    Content {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Cannot create output directory {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An entry left out of the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub kind: Kind,
    pub slug: String,
    pub reason: String,
}

/// Per-kind counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCount {
    pub kind: Kind,
    /// Entries returned by the store.
    pub attempted: usize,
    /// Entries that passed validation.
    pub valid: usize,
}

/// Result of [`check`].
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub kinds: Vec<KindCount>,
    pub skipped: Vec<SkippedItem>,
}

impl CheckReport {
    pub fn attempted(&self) -> usize {
        self.kinds.iter().map(|k| k.attempted).sum()
    }
}

/// A file the build wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
    /// Entry title or listing heading; empty for assets.
    pub label: String,
    pub kind: Option<Kind>,
}

/// Everything a build did.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub renderer: String,
    pub kinds: Vec<KindCount>,
    pub skipped: Vec<SkippedItem>,
    pub pages: Vec<FileOutcome>,
    pub assets: Vec<FileOutcome>,
    /// `sitemap.xml` / `robots.txt`.
    pub seo: Vec<FileOutcome>,
    pub write_failures: Vec<WriteFailure>,
    pub pruned: Vec<String>,
}

impl BuildReport {
    pub fn attempted(&self) -> usize {
        self.kinds.iter().map(|k| k.attempted).sum()
    }

    pub fn page_stats(&self) -> FileStats {
        let mut stats = FileStats::default();
        for page in &self.pages {
            stats.count(page.status);
        }
        stats
    }

    /// Whether write failures should fail the run under `build`.
    pub fn should_fail(&self, build: &BuildConfig) -> bool {
        build.fail_on_write_error && !self.write_failures.is_empty()
    }
}

/// Valid entries of one kind, in listing order (newest first).
struct KindBatch {
    kind: Kind,
    entries: Vec<Entry>,
}

/// Load and validate every kind. Stops on the first kind the store cannot list.
fn load_valid(
    store: &dyn ContentStore,
) -> Result<(Vec<KindBatch>, CheckReport), GenerateError> {
    let mut batches = Vec::new();
    let mut report = CheckReport::default();

    for kind in Kind::ALL {
        let entries = store
            .list_all(kind)
            .map_err(|source| GenerateError::Store { kind, source })?;
        let attempted = entries.len();

        let mut valid = Vec::with_capacity(attempted);
        for entry in entries {
            match entity::validate(&entry) {
                Ok(()) => valid.push(entry),
                Err(err) => {
                    warn!(%kind, slug = %entry.slug, reason = %err, "skipping entry");
                    report.skipped.push(SkippedItem {
                        kind,
                        slug: entry.slug,
                        reason: err.to_string(),
                    });
                }
            }
        }
        sort_for_listing(&mut valid);

        report.kinds.push(KindCount {
            kind,
            attempted,
            valid: valid.len(),
        });
        batches.push(KindBatch {
            kind,
            entries: valid,
        });
    }
    Ok((batches, report))
}

/// Site-level Markdown that lives beside the store rather than in it.
#[derive(Debug, Default)]
struct AboutContent {
    page: Option<String>,
    summary: Option<String>,
}

fn load_about(content_dir: &Path) -> Result<AboutContent, GenerateError> {
    Ok(AboutContent {
        page: read_optional(&content_dir.join(ABOUT_FILE))?,
        summary: read_optional(&content_dir.join(ABOUT_SUMMARY_FILE))?,
    })
}

/// A missing or blank file is `None`.
fn read_optional(path: &Path) -> Result<Option<String>, GenerateError> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(None),
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GenerateError::Content {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Newest first; entries created in the same second by slug.
fn sort_for_listing(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

/// Validate store contents without rendering or writing anything.
pub fn check(store: &dyn ContentStore) -> Result<CheckReport, GenerateError> {
    load_valid(store).map(|(_, report)| report)
}

pub struct SiteBuilder {
    config: SiteConfig,
    renderer: Box<dyn Renderer>,
}

impl SiteBuilder {
    pub fn new(config: SiteConfig, renderer: Box<dyn Renderer>) -> Self {
        Self { config, renderer }
    }

    /// Builder with the theme `config` selects (built-in or template directory).
    pub fn from_config(config: SiteConfig) -> Result<Self, TemplateError> {
        let renderer = theme::from_config(&config)?;
        Ok(Self::new(config, renderer))
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Run a full build into `output_dir`.
    pub fn build(
        &self,
        store: &dyn ContentStore,
        output_dir: &Path,
    ) -> Result<BuildReport, GenerateError> {
        let started_at = Instant::now();
        let (batches, check) = load_valid(store)?;
        info!(
            attempted = check.attempted(),
            skipped = check.skipped.len(),
            "content loaded"
        );

        let about = load_about(&self.config.paths.content_dir)?;

        let mut site = SiteView::from_config(&self.config);
        if about.page.is_some() {
            site = site.with_about();
        }
        let pages = self.plan_pages(&batches, &about);
        let rendered = self.render_all(&site, &pages)?;
        info!(
            pages = rendered.len(),
            renderer = self.renderer.name(),
            "pages rendered"
        );

        let writer = OutputWriter::create(output_dir).map_err(|source| {
            GenerateError::OutputRoot {
                path: output_dir.to_path_buf(),
                source,
            }
        })?;
        let previous = OutputLedger::load(output_dir);
        let mut current = OutputLedger::empty();

        let mut report = BuildReport {
            renderer: self.renderer.name().to_string(),
            kinds: check.kinds,
            skipped: check.skipped,
            ..BuildReport::default()
        };

        // Pages
        for (page, rendered) in pages.iter().zip(rendered) {
            let label = page_label(page);
            if let Some(outcome) = write_file(
                &writer,
                &previous,
                &mut current,
                &mut report.write_failures,
                &rendered.path,
                rendered.html.as_bytes(),
            ) {
                report.pages.push(FileOutcome {
                    path: rendered.path,
                    status: outcome,
                    label,
                    kind: page.kind(),
                });
            }
        }

        // Static assets
        let (copied, failures) = writer.copy_tree(&self.config.paths.static_dir, STATIC_PREFIX);
        for asset in copied {
            let hash = ledger::hash_bytes(&asset.bytes);
            let status = previous.classify(&asset.path, &hash, output_dir);
            current.record(&asset.path, hash);
            report.assets.push(FileOutcome {
                path: asset.path,
                status,
                label: String::new(),
                kind: None,
            });
        }
        for failure in failures {
            keep_previous(&previous, &mut current, &failure.path);
            warn!(path = %failure.path, error = %failure.source, "failed to copy asset");
            report.write_failures.push(failure);
        }

        // Sitemap and robots.txt
        if let Some(base_url) = self.config.base_url() {
            let urls = sitemap_urls(&batches, about.page.is_some());
            let files = [
                ("sitemap.xml", seo::sitemap_xml(base_url, &urls)),
                ("robots.txt", seo::robots_txt(base_url)),
            ];
            for (path, content) in files {
                if let Some(status) = write_file(
                    &writer,
                    &previous,
                    &mut current,
                    &mut report.write_failures,
                    path,
                    content.as_bytes(),
                ) {
                    report.seo.push(FileOutcome {
                        path: path.to_string(),
                        status,
                        label: String::new(),
                        kind: None,
                    });
                }
            }
        }

        // Prune what the previous build wrote and this one didn't
        if self.config.build.prune_stale {
            for path in previous.stale_paths(&current) {
                if !is_safe_relative(&path) {
                    warn!(path = %path, "ignoring unsafe ledger path");
                    continue;
                }
                match writer.remove(&path) {
                    Ok(()) => {
                        info!(path = %path, "pruned stale file");
                        report.pruned.push(path);
                    }
                    Err(source) => {
                        warn!(path = %path, error = %source, "failed to prune");
                        report.write_failures.push(WriteFailure { path, source });
                    }
                }
            }
        } else {
            // Keep tracking old files so a later pruning build can still remove them
            for path in previous.stale_paths(&current) {
                keep_previous(&previous, &mut current, &path);
            }
        }

        if let Err(source) = current.save(output_dir) {
            warn!(error = %source, "failed to save build ledger");
            report.write_failures.push(WriteFailure {
                path: ledger::LEDGER_FILENAME.to_string(),
                source,
            });
        }

        info!(
            pages = report.pages.len(),
            assets = report.assets.len(),
            pruned = report.pruned.len(),
            failures = report.write_failures.len(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "build finished"
        );
        Ok(report)
    }

    /// Every page this build produces: details, then listings, then the about
    /// page if any, then the home page.
    fn plan_pages(&self, batches: &[KindBatch], about: &AboutContent) -> Vec<Page> {
        let options = ViewOptions::from_config(&self.config);
        let mut details = Vec::new();
        let mut listings = Vec::new();

        for batch in batches {
            let views: Vec<DetailView> = batch
                .entries
                .par_iter()
                .map(|entry| DetailView::from_entry(entry, &options))
                .collect();
            details.extend(views.iter().cloned().map(Page::Detail));
            listings.push(ListingView::new(batch.kind, views));
        }

        let mut index = IndexView::new(listings.iter().map(ListingView::summary).collect());
        if let Some(summary) = &about.summary {
            index = index.with_about_summary(summary);
        }
        let mut pages = details;
        pages.extend(listings.into_iter().map(Page::Listing));
        if let Some(markdown) = &about.page {
            pages.push(Page::About(AboutView::from_markdown(markdown)));
        }
        pages.push(Page::Index(index));
        pages
    }

    /// Render all pages in parallel, keeping input order. The first template
    /// error wins.
    fn render_all(
        &self,
        site: &SiteView,
        pages: &[Page],
    ) -> Result<Vec<RenderedPage>, TemplateError> {
        pages
            .par_iter()
            .map(|page| {
                self.renderer.render(site, page).map(|html| RenderedPage {
                    path: page.output_path(),
                    html,
                })
            })
            .collect()
    }
}

/// Write one file, classify it against the previous build and record it.
///
/// Failures are pushed onto `failures` and return `None`.
fn write_file(
    writer: &OutputWriter,
    previous: &OutputLedger,
    current: &mut OutputLedger,
    failures: &mut Vec<WriteFailure>,
    path: &str,
    content: &[u8],
) -> Option<FileStatus> {
    let hash = ledger::hash_bytes(content);
    let status = previous.classify(path, &hash, writer.root());
    match writer.write(path, content) {
        Ok(()) => {
            current.record(path, hash);
            Some(status)
        }
        Err(failure) => {
            warn!(path = %failure.path, error = %failure.source, "failed to write");
            keep_previous(previous, current, path);
            failures.push(failure);
            None
        }
    }
}

/// Carry a path's previous ledger entry forward so it is not pruned.
fn keep_previous(previous: &OutputLedger, current: &mut OutputLedger, path: &str) {
    if let Some(hash) = previous.hash_of(path) {
        current.record(path, hash.to_string());
    }
}

fn page_label(page: &Page) -> String {
    match page {
        Page::Index(_) => "Home".to_string(),
        Page::Listing(listing) => listing.heading.clone(),
        Page::Detail(detail) => detail.entry().title.clone(),
        Page::About(about) => about.heading.clone(),
    }
}

/// Last time an entry changed.
fn last_modified(entry: &Entry) -> NaiveDateTime {
    entry.updated_at.unwrap_or(entry.created_at)
}

fn sitemap_urls(batches: &[KindBatch], has_about: bool) -> Vec<SitemapUrl> {
    let newest = |entries: &[Entry]| entries.iter().map(last_modified).max();
    let site_lastmod = batches.iter().filter_map(|b| newest(&b.entries)).max();

    let mut urls = vec![SitemapUrl::home(site_lastmod)];
    if has_about {
        urls.push(SitemapUrl::about());
    }
    for batch in batches {
        urls.push(SitemapUrl::listing(batch.kind, newest(&batch.entries)));
    }
    for batch in batches {
        urls.extend(
            batch
                .entries
                .iter()
                .map(|e| SitemapUrl::detail(batch.kind, &e.slug, last_modified(e))),
        );
    }
    urls
}

/// Ledger paths must stay inside the output root.
fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Draft;
    use crate::store::MemoryStore;
    use crate::test_helpers::{output_files, read_output, ts};
    use std::fs;
    use tempfile::TempDir;

    fn builder() -> SiteBuilder {
        SiteBuilder::from_config(SiteConfig::default()).unwrap()
    }

    /// Renderer that fails on one template.
    struct FailingTheme;

    impl Renderer for FailingTheme {
        fn name(&self) -> &str {
            "failing"
        }

        fn render(&self, _site: &SiteView, page: &Page) -> Result<String, TemplateError> {
            match page {
                Page::Listing(_) => Err(TemplateError::Render {
                    name: page.template_name(),
                    message: "boom".into(),
                }),
                _ => Ok(String::from("ok")),
            }
        }
    }

    /// Store whose project table is broken.
    struct BrokenStore;

    impl ContentStore for BrokenStore {
        fn create(&mut self, _: Kind, _: Draft) -> Result<Entry, StoreError> {
            unimplemented!()
        }
        fn update(&mut self, _: Kind, _: &str, _: entity::Patch) -> Result<Entry, StoreError> {
            unimplemented!()
        }
        fn soft_delete(&mut self, _: Kind, _: &str) -> Result<entity::ArchivedEntry, StoreError> {
            unimplemented!()
        }
        fn list_all(&self, kind: Kind) -> Result<Vec<Entry>, StoreError> {
            match kind {
                Kind::Post => Ok(vec![]),
                Kind::Project => Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery)),
            }
        }
        fn get(&self, _: Kind, _: &str) -> Result<Option<Entry>, StoreError> {
            Ok(None)
        }
        fn list_archived(&self, _: Kind) -> Result<Vec<entity::ArchivedEntry>, StoreError> {
            Ok(vec![])
        }
    }

    #[test]
    fn listing_order_is_newest_first_then_slug() {
        let store = MemoryStore::with_drafts([
            Draft::post("b", "B", "x").with_created_at(ts("2024-01-01 00:00:00")),
            Draft::post("a", "A", "x").with_created_at(ts("2024-01-01 00:00:00")),
            Draft::post("c", "C", "x").with_created_at(ts("2024-06-01 00:00:00")),
        ])
        .unwrap();
        let (batches, _) = load_valid(&store).unwrap();
        let slugs: Vec<&str> = batches[0].entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a", "b"]);
    }

    #[test]
    fn check_reports_invalid_entries() {
        let store = MemoryStore::with_drafts([
            Draft::post("ok", "Fine", "body"),
            Draft::post("untitled", "", "body"),
            Draft::project("index", "Reserved", "body"),
        ])
        .unwrap();
        let report = check(&store).unwrap();
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].slug, "untitled");
        assert!(report.skipped[0].reason.contains("title"));
        assert_eq!(report.skipped[1].kind, Kind::Project);
    }

    #[test]
    fn list_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = builder().build(&BrokenStore, tmp.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Store { kind: Kind::Project, .. }));
        assert!(output_files(tmp.path()).is_empty());
    }

    #[test]
    fn template_error_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let store = MemoryStore::with_drafts([Draft::post("hello", "Hello", "world")]).unwrap();
        let builder = SiteBuilder::new(SiteConfig::default(), Box::new(FailingTheme));

        let err = builder.build(&store, &out).unwrap_err();
        assert!(matches!(err, GenerateError::Template(_)));
        assert!(!out.exists());
    }

    #[test]
    fn pages_are_classified_across_builds() {
        let tmp = TempDir::new().unwrap();
        let mut store = MemoryStore::with_drafts([
            Draft::post("a", "A", "one").with_created_at(ts("2024-01-01 00:00:00")),
            Draft::post("b", "B", "two").with_created_at(ts("2024-01-02 00:00:00")),
        ])
        .unwrap();

        let first = builder().build(&store, tmp.path()).unwrap();
        assert!(first.pages.iter().all(|p| p.status == FileStatus::Created));

        store
            .update(Kind::Post, "a", entity::Patch::default().body("changed"))
            .unwrap();
        let second = builder().build(&store, tmp.path()).unwrap();
        let status = |path: &str| {
            second
                .pages
                .iter()
                .find(|p| p.path == path)
                .map(|p| p.status)
                .unwrap()
        };
        assert_eq!(status("posts/a.html"), FileStatus::Updated);
        assert_eq!(status("posts/b.html"), FileStatus::Unchanged);
        assert_eq!(status("projects/index.html"), FileStatus::Unchanged);
    }

    #[test]
    fn prune_respects_config() {
        let tmp = TempDir::new().unwrap();
        let mut store = MemoryStore::with_drafts([Draft::post("gone", "Gone", "x")]).unwrap();
        builder().build(&store, tmp.path()).unwrap();
        store.soft_delete(Kind::Post, "gone").unwrap();

        let mut config = SiteConfig::default();
        config.build.prune_stale = false;
        let kept = SiteBuilder::from_config(config)
            .unwrap()
            .build(&store, tmp.path())
            .unwrap();
        assert!(kept.pruned.is_empty());
        assert!(tmp.path().join("posts/gone.html").exists());

        // Still tracked, so a pruning build removes it later
        let pruned = builder().build(&store, tmp.path()).unwrap();
        assert_eq!(pruned.pruned, vec!["posts/gone.html"]);
        assert!(!tmp.path().join("posts/gone.html").exists());
    }

    #[test]
    fn unsafe_ledger_paths_are_never_pruned() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        fs::create_dir_all(&out).unwrap();
        fs::write(tmp.path().join("precious.txt"), "keep").unwrap();
        fs::write(
            ledger::ledger_path(&out),
            r#"{"version": 1, "files": {"../precious.txt": "x"}}"#,
        )
        .unwrap();

        let report = builder().build(&MemoryStore::new(), &out).unwrap();
        assert!(report.pruned.is_empty());
        assert!(tmp.path().join("precious.txt").exists());
    }

    #[test]
    fn static_assets_are_copied_and_tracked() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("assets");
        fs::create_dir_all(assets.join("img")).unwrap();
        fs::write(assets.join("img/me.png"), [0u8, 1, 2]).unwrap();
        let out = tmp.path().join("dist");

        let mut config = SiteConfig::default();
        config.paths.static_dir = assets.clone();
        let report = SiteBuilder::from_config(config.clone())
            .unwrap()
            .build(&MemoryStore::new(), &out)
            .unwrap();
        assert_eq!(report.assets.len(), 1);
        assert_eq!(report.assets[0].path, "static/img/me.png");
        assert!(out.join("static/img/me.png").exists());

        fs::remove_file(assets.join("img/me.png")).unwrap();
        let report = SiteBuilder::from_config(config)
            .unwrap()
            .build(&MemoryStore::new(), &out)
            .unwrap();
        assert_eq!(report.pruned, vec!["static/img/me.png"]);
    }

    #[test]
    fn seo_files_need_base_url() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::with_drafts([
            Draft::post("hello", "Hello", "world").with_created_at(ts("2024-05-06 07:08:09")),
        ])
        .unwrap();

        let report = builder().build(&store, tmp.path()).unwrap();
        assert!(report.seo.is_empty());
        assert!(!tmp.path().join("sitemap.xml").exists());

        let mut config = SiteConfig::default();
        config.site.base_url = Some("https://ada.dev/".into());
        let report = SiteBuilder::from_config(config)
            .unwrap()
            .build(&store, tmp.path())
            .unwrap();
        assert_eq!(report.seo.len(), 2);
        let sitemap = read_output(tmp.path(), "sitemap.xml");
        assert!(sitemap.contains("<loc>https://ada.dev/posts/hello.html</loc>"));
        assert!(sitemap.contains("<lastmod>2024-05-06</lastmod>"));
        assert!(tmp.path().join("robots.txt").exists());
    }

    #[test]
    fn about_files_add_page_summary_and_sitemap_entry() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("content");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join(ABOUT_FILE), "I build **static sites**.").unwrap();
        fs::write(content.join(ABOUT_SUMMARY_FILE), "Writer of *small tools*.").unwrap();
        let out = tmp.path().join("dist");

        let mut config = SiteConfig::default();
        config.paths.content_dir = content.clone();
        config.site.base_url = Some("https://ada.dev".into());
        let report = SiteBuilder::from_config(config.clone())
            .unwrap()
            .build(&MemoryStore::new(), &out)
            .unwrap();

        let about = report.pages.iter().find(|p| p.path == "about/index.html").unwrap();
        assert_eq!(about.label, "About");
        assert_eq!(about.kind, None);
        assert!(read_output(&out, "about/index.html").contains("<strong>static sites</strong>"));
        let home = read_output(&out, "index.html");
        assert!(home.contains("<em>small tools</em>"));
        assert!(home.contains(r#"href="/about/""#));
        assert!(read_output(&out, "sitemap.xml").contains("<loc>https://ada.dev/about/</loc>"));

        // Removing about.md drops the page on the next build
        fs::remove_file(content.join(ABOUT_FILE)).unwrap();
        let report = SiteBuilder::from_config(config)
            .unwrap()
            .build(&MemoryStore::new(), &out)
            .unwrap();
        assert_eq!(report.pruned, vec!["about/index.html"]);
        assert!(!read_output(&out, "index.html").contains(r#"href="/about/""#));
        assert!(!read_output(&out, "sitemap.xml").contains("/about/"));
    }

    #[test]
    fn missing_about_files_are_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let about = load_about(&tmp.path().join("no-such-dir")).unwrap();
        assert!(about.page.is_none());
        assert!(about.summary.is_none());

        fs::write(tmp.path().join(ABOUT_FILE), "  \n").unwrap();
        assert!(load_about(tmp.path()).unwrap().page.is_none());
    }

    #[test]
    fn unreadable_about_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        // A directory where about.md should be
        fs::create_dir_all(tmp.path().join(ABOUT_FILE)).unwrap();
        let err = load_about(tmp.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Content { ref path, .. } if path.ends_with(ABOUT_FILE)));
    }

    #[test]
    fn write_failure_does_not_stop_build() {
        let tmp = TempDir::new().unwrap();
        // A file where the projects directory should go
        fs::write(tmp.path().join("projects"), "blocker").unwrap();
        let store = MemoryStore::with_drafts([
            Draft::post("hello", "Hello", "world"),
            Draft::project("engine", "Engine", "text"),
        ])
        .unwrap();

        let report = builder().build(&store, tmp.path()).unwrap();
        let failed: Vec<&str> = report
            .write_failures
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(failed, vec!["projects/engine.html", "projects/index.html"]);
        assert!(tmp.path().join("posts/hello.html").exists());
        assert!(tmp.path().join("index.html").exists());

        let mut build = BuildConfig::default();
        assert!(!report.should_fail(&build));
        build.fail_on_write_error = true;
        assert!(report.should_fail(&build));
    }

    #[test]
    fn safe_relative_paths() {
        assert!(is_safe_relative("posts/a.html"));
        assert!(!is_safe_relative("../a.html"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative("posts//a.html"));
        assert!(!is_safe_relative(""));
    }
}
