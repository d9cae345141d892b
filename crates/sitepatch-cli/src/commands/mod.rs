mod describe;
mod patch;
mod preview;
mod slogan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sitepatch_contracts::config::SiteConfig;
use sitepatch_contracts::events::EventWriter;

use crate::site::{detect_root, site_name};

pub use describe::{run_describe, DescribeReport};
pub use patch::run_patch;
pub use preview::{run_preview, PreviewReport};
pub use slogan::{run_slogan, SloganOutcome};

pub const EVENTS_FILE_NAME: &str = "sitepatch-events.jsonl";
pub const SUMMARY_FILE_NAME: &str = "sitepatch-summary.json";

/// Site root given on the command line (or detected) is not a directory.
#[derive(Debug, thiserror::Error)]
#[error("site root {} does not exist", .0.display())]
pub struct MissingRoot(pub PathBuf);

/// Options shared by every subcommand, before defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct SiteOptions {
    pub root: Option<PathBuf>,
    pub brand: Option<String>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub events: Option<PathBuf>,
}

/// Resolved site settings: flags override `sitepatch.json`, which overrides
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub brand: String,
    pub dry_run: bool,
    pub keywords_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub events_path: PathBuf,
}

impl SiteContext {
    pub fn resolve(options: SiteOptions) -> Result<Self> {
        let root = match options.root {
            Some(root) => root,
            None => {
                let cwd = std::env::current_dir().context("failed to read current directory")?;
                detect_root(&cwd)
            }
        };
        if !root.is_dir() {
            return Err(MissingRoot(root).into());
        }

        let config = SiteConfig::load(&root, options.config.as_deref())?;
        let brand = options
            .brand
            .or_else(|| config.brand.clone())
            .filter(|brand| !brand.trim().is_empty())
            .unwrap_or_else(|| site_name(&root));
        let keywords_dir = root.join(&config.keywords_dir);
        let logs_dir = root.join(&config.logs_dir);
        let events_path = options
            .events
            .unwrap_or_else(|| logs_dir.join(EVENTS_FILE_NAME));

        Ok(Self {
            dry_run: options.dry_run || config.dry_run,
            root,
            config,
            brand,
            keywords_dir,
            logs_dir,
            events_path,
        })
    }

    /// Event log for a new run. Dry runs get `None` so nothing is written.
    pub fn event_writer(&self) -> Option<EventWriter> {
        (!self.dry_run).then(|| EventWriter::for_new_run(&self.events_path))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.logs_dir.join(SUMMARY_FILE_NAME)
    }

    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
