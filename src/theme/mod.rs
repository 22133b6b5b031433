//! Themes: [`Renderer`] implementations.
//!
//! - [`MaudTheme`]: compiled-in HTML via maud, colors from `[colors]`.
//! - [`TeraTheme`]: user templates loaded from `paths.templates_dir`.

use crate::config::SiteConfig;
use crate::render::{Renderer, TemplateError};

mod builtin;
mod template_dir;

pub use builtin::MaudTheme;
pub use template_dir::TeraTheme;

/// Pick the theme the config asks for.
pub fn from_config(config: &SiteConfig) -> Result<Box<dyn Renderer>, TemplateError> {
    match &config.paths.templates_dir {
        Some(dir) => Ok(Box::new(TeraTheme::load(dir)?)),
        None => Ok(Box::new(MaudTheme::new(config))),
    }
}
