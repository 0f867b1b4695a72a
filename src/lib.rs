pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod markup;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{AnySource, FileSource, HttpSource};
pub use config::toml_config::SiteConfig;
pub use crate::core::{
    composer::{CompositionReport, PageComposer},
    page::Page,
    registry::ComponentRegistry,
};
pub use utils::error::{FragmentError, Result, SiteError};
