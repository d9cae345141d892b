use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use similar::TextDiff;
use sitepatch_contracts::config::SiteConfig;
use walkdir::{DirEntry, WalkDir};

/// Entries whose presence marks a directory as a site root.
pub const ROOT_MARKERS: [&str; 3] = ["keywords", "sitemap.xml", "index.html"];
const ROOT_SEARCH_DEPTH: usize = 4;

/// Walks up from `start` looking for a site root, falling back to `start`.
pub fn detect_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .take(ROOT_SEARCH_DEPTH + 1)
        .find(|dir| is_site_root(dir))
        .unwrap_or(start)
        .to_path_buf()
}

fn is_site_root(dir: &Path) -> bool {
    ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists())
}

/// Key the allocation state is stored under.
pub fn site_key(root: &Path) -> String {
    fs::canonicalize(root)
        .unwrap_or_else(|_| root.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Last path component of the root, used as the default brand.
pub fn site_name(root: &Path) -> String {
    let resolved = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "site".to_string())
}

/// Every `.html`/`.htm` file under `root` in path order, leaving out the
/// keyword and log directories and hidden directories.
pub fn html_files(root: &Path, config: &SiteConfig) -> Result<Vec<PathBuf>> {
    let skipped = [root.join(&config.keywords_dir), root.join(&config.logs_dir)];
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, &skipped));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() && is_html(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry, skipped: &[PathBuf]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry.file_name().to_string_lossy().starts_with('.')
        || skipped.iter().any(|dir| entry.path() == dir)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Reads a page, replacing invalid UTF-8 instead of failing.
pub fn read_page(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Unchanged,
    Written { backup_created: bool },
    /// Dry run: the unified diff that would have been applied.
    Previewed(String),
}

impl WriteOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, WriteOutcome::Unchanged)
    }
}

/// Writes `updated` over `path`, copying the file to `<path>.bak` first if no
/// backup exists yet. Nothing touches disk on a dry run.
pub fn write_with_backup(
    path: &Path,
    original: &str,
    updated: &str,
    dry_run: bool,
) -> Result<WriteOutcome> {
    if original == updated {
        return Ok(WriteOutcome::Unchanged);
    }
    if dry_run {
        return Ok(WriteOutcome::Previewed(unified_diff(path, original, updated)));
    }

    let backup = backup_path(path);
    let backup_created = !backup.exists();
    if backup_created {
        fs::copy(path, &backup)
            .with_context(|| format!("failed to back up {}", path.display()))?;
    }
    fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(WriteOutcome::Written { backup_created })
}

pub fn unified_diff(path: &Path, original: &str, updated: &str) -> String {
    let label = path.display().to_string();
    TextDiff::from_lines(original, updated)
        .unified_diff()
        .header(&label, &label)
        .to_string()
}
