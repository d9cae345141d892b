use std::fmt;
use std::path::Path;

/// A page's path relative to its site root, always `/`-separated.
///
/// Used both as the persistence key for keyword allocation and as the seed
/// source for every synthesized field of the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageIdentity(String);

impl PageIdentity {
    pub fn new(relative_path: impl AsRef<str>) -> Self {
        let normalized = relative_path
            .as_ref()
            .replace('\\', "/")
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self(normalized)
    }

    /// Builds an identity from an absolute page path under `root`.
    pub fn from_paths(root: &Path, page: &Path) -> Option<Self> {
        let relative = page.strip_prefix(root).ok()?;
        let parts = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        Some(Self::new(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// File name without its last extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// Parent directory components, innermost first, lowercased.
    pub fn directory_context(&self) -> Vec<String> {
        let mut parts = self.0.split('/').collect::<Vec<_>>();
        parts.pop();
        parts
            .into_iter()
            .rev()
            .map(str::to_lowercase)
            .collect()
    }

    /// Name of the directory directly containing the page, if any.
    pub fn parent_dir(&self) -> Option<String> {
        self.directory_context().into_iter().next()
    }
}

impl fmt::Display for PageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
