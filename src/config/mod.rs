pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "site-composer")]
#[command(about = "Compose a static page from reusable HTML fragments")]
pub struct CliConfig {
    #[arg(long, help = "Host page to compose")]
    pub page: PathBuf,

    #[arg(long, help = "Site configuration (TOML); built-in layout when omitted")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Fragment base directory or http(s) URL, overrides site.base")]
    pub base: Option<String>,

    #[arg(long, help = "Navigation path used to pick the page; defaults to --page")]
    pub path: Option<String>,

    #[arg(long, help = "Write the composed page here instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print the composition report as JSON on stderr")]
    pub report: bool,

    #[arg(long, help = "Exit with an error when any component fails")]
    pub strict: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn navigation_path(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| self.page.to_string_lossy().replace('\\', "/"))
    }
}
