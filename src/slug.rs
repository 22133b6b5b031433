//! Slug derivation and checking.
//!
//! A slug is the external identity of an entry: it names the output file
//! (`posts/<slug>.html`) and therefore the public URL. Every entry kind uses
//! the same rules, so they live here rather than on each kind.
//!
//! ## Derivation
//!
//! Imported Markdown files get their slug from the filename stem:
//! - `Hello World.md` → `hello-world`
//! - `2024_Retro!!.md` → `2024-retro`
//! - `--draft--.md` → `draft`
//!
//! ## Accepted slugs
//!
//! Lowercase ASCII letters, digits, `-` and `_`, starting with a letter or
//! digit. `index` is reserved because `<kind>/index.html` is the listing page.

use std::path::Path;

/// Slug that would collide with a kind's listing page.
pub const RESERVED_SLUG: &str = "index";

/// Derive a URL-friendly slug from a filename.
///
/// Uses the file stem, lowercases it, replaces every character outside
/// `[a-z0-9-]` with `-`, collapses runs of dashes and trims dashes at both ends.
pub fn slugify(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mut slug = String::with_capacity(stem.len());
    for c in stem.chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug.trim_matches('-').to_string()
}

/// Check that a slug is safe to use as a file name and URL segment.
///
/// Returns the reason on rejection. An empty slug is the caller's business
/// (it is a missing field, not an invalid one).
pub fn check_slug(slug: &str) -> Result<(), String> {
    if slug == RESERVED_SLUG {
        return Err(format!("`{RESERVED_SLUG}` is reserved for listing pages"));
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
    {
        return Err(format!("character {bad:?} is not allowed in a slug"));
    }
    if slug.starts_with(['-', '_']) {
        return Err("must start with a letter or digit".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes_spaces() {
        assert_eq!(slugify("Hello World.md"), "hello-world");
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("2024_Retro!!.md"), "2024-retro");
    }

    #[test]
    fn slugify_trims_leading_and_trailing_dashes() {
        assert_eq!(slugify("--draft--.md"), "draft");
    }

    #[test]
    fn slugify_keeps_existing_dashes() {
        assert_eq!(slugify("rust-in-prod.md"), "rust-in-prod");
    }

    #[test]
    fn slugify_without_extension() {
        assert_eq!(slugify("Notes"), "notes");
    }

    #[test]
    fn slugify_non_ascii_becomes_dash() {
        assert_eq!(slugify("café-notes.md"), "caf-notes");
    }

    #[test]
    fn check_accepts_plain_slug() {
        assert!(check_slug("hello-world_2").is_ok());
    }

    #[test]
    fn check_rejects_path_separator() {
        let reason = check_slug("../etc").unwrap_err();
        assert!(reason.contains("'.'"));
    }

    #[test]
    fn check_rejects_uppercase() {
        assert!(check_slug("Hello").is_err());
    }

    #[test]
    fn check_rejects_reserved_index() {
        assert!(check_slug("index").unwrap_err().contains("reserved"));
    }

    #[test]
    fn check_rejects_leading_underscore() {
        assert!(check_slug("_partial").is_err());
    }
}
