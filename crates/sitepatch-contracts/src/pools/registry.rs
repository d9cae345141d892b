use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;

/// Pool consulted when no directory component names a pool.
pub const FALLBACK_POOL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPool {
    pub name: String,
    pub phrases: Vec<String>,
}

impl KeywordPool {
    pub fn new(name: impl Into<String>, phrases: Vec<String>) -> Self {
        Self {
            name: name.into(),
            phrases,
        }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Named keyword pools for one run, keyed by lowercased directory name.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: IndexMap<String, KeywordPool>,
}

impl PoolRegistry {
    pub fn new(pools: impl IntoIterator<Item = KeywordPool>) -> Self {
        let mut registry = Self::default();
        for pool in pools {
            registry.insert(pool);
        }
        registry
    }

    /// Loads every `<name>.txt` in `dir`. A missing directory yields an empty registry.
    pub fn load_dir(dir: &Path) -> anyhow::Result<Self> {
        let mut registry = Self::default();
        if !dir.is_dir() {
            return Ok(registry);
        }
        let mut files = std::fs::read_dir(dir)
            .with_context(|| format!("failed to list {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
            })
            .collect::<Vec<_>>();
        files.sort();
        for path in files {
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            registry.insert(KeywordPool::new(stem, read_phrase_lines(&path)?));
        }
        Ok(registry)
    }

    pub fn insert(&mut self, pool: KeywordPool) {
        let key = pool.name.to_lowercase();
        self.pools.insert(key, pool);
    }

    pub fn get(&self, name: &str) -> Option<&KeywordPool> {
        self.pools.get(&name.to_lowercase())
    }

    pub fn fallback(&self) -> Option<&KeywordPool> {
        self.get(FALLBACK_POOL)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Non-empty, trimmed lines of a UTF-8 (lossy) text file; missing file gives none.
pub fn read_phrase_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
