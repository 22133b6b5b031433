//! # static-folio
//!
//! A static site generator for a personal blog and project portfolio. Posts
//! and projects are stored records; every build renders the whole site from
//! them into plain HTML files.
//!
//! # Architecture: Store → Views → Pages → Files
//!
//! ```text
//! 1. Load      ContentStore   →  valid entries     (invalid ones reported, skipped)
//! 2. Plan      entries        →  typed views       (index, listings, details)
//! 3. Render    views          →  HTML strings      (maud or Tera, in parallel)
//! 4. Write     HTML + static/ →  dist/             (ledger-tracked, stale files pruned)
//! ```
//!
//! Rendering finishes for every page before the first byte is written, so a
//! template error leaves the previous output untouched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`entity`] | Entry kinds, records, drafts, patches and validation |
//! | [`slug`] | Slug derivation from filenames and slug safety rules |
//! | [`store`] | [`store::ContentStore`] trait with in-memory and SQLite backends |
//! | [`ingest`] | Markdown file import into a store |
//! | [`view`] | Typed template inputs built from entries and config |
//! | [`render`] | [`render::Renderer`] trait, pages and template errors |
//! | [`theme`] | Built-in maud theme and Tera template-directory theme |
//! | [`generate`] | [`generate::SiteBuilder`]: the full build pass and its report |
//! | [`writer`] | Output tree writes, static copies, removals |
//! | [`ledger`] | Per-build record of written files (change detection, pruning) |
//! | [`seo`] | `sitemap.xml` and `robots.txt` |
//! | [`config`] | `config.toml` loading, merging, validation, theme CSS |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Full Rebuilds
//!
//! Every build regenerates every page. Sites of this size render in well under
//! a second, and a full rebuild can never serve a stale listing. The
//! [`ledger`] still tells which files actually changed.
//!
//! ## Soft Delete
//!
//! Deleting an entry copies the full record into a per-kind archive before
//! removing it, in one transaction. Nothing is ever lost, and recreating a
//! slug after deleting it is allowed.
//!
//! ## Two Themes, One Trait
//!
//! The built-in theme is [maud](https://maud.lambda.xyz/): compile-time
//! checked, auto-escaped, nothing to ship. Pointing `paths.templates_dir` at a
//! directory switches to Tera templates for full control over markup. Both
//! receive the same typed views.

pub mod config;
pub mod entity;
pub mod generate;
pub mod ingest;
pub mod ledger;
pub mod output;
pub mod render;
pub mod seo;
pub mod slug;
pub mod store;
pub mod theme;
pub mod view;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
