use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use super::AllocationState;

pub const ALLOCATION_FILE_NAME: &str = "used_keywords.json";

/// Load/save access to persisted allocation state, keyed by site root.
pub trait AllocationStore {
    fn load(&mut self, site_key: &str) -> anyhow::Result<AllocationState>;
    fn save(&mut self, site_key: &str, state: &AllocationState) -> anyhow::Result<()>;
}

/// JSON document of the form `{ "<site_root>": { "map": {..}, "used_set": [..] } }`.
///
/// Saving re-reads the file and only replaces the entry for the saved site,
/// so other site roots sharing the file survive.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<keywords_dir>/used_keywords.json`.
    pub fn in_dir(keywords_dir: &Path) -> Self {
        Self::new(keywords_dir.join(ALLOCATION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AllocationStore for JsonFileStore {
    fn load(&mut self, site_key: &str) -> anyhow::Result<AllocationState> {
        let document = read_json_object(&self.path)?;
        let Some(entry) = document.get(site_key) else {
            return Ok(AllocationState::default());
        };
        serde_json::from_value(entry.clone()).with_context(|| {
            format!(
                "malformed allocation entry for {site_key} in {}",
                self.path.display()
            )
        })
    }

    fn save(&mut self, site_key: &str, state: &AllocationState) -> anyhow::Result<()> {
        let mut document = read_json_object(&self.path)?;
        document.insert(site_key.to_string(), serde_json::to_value(state)?);
        write_json_object(&self.path, &document)
    }
}

/// Process-local store, for previews and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, AllocationState>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(site_key: &str, state: AllocationState) -> Self {
        let mut store = Self::default();
        store.entries.insert(site_key.to_string(), state);
        store
    }

    pub fn get(&self, site_key: &str) -> Option<&AllocationState> {
        self.entries.get(site_key)
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl AllocationStore for MemoryStore {
    fn load(&mut self, site_key: &str) -> anyhow::Result<AllocationState> {
        Ok(self.entries.get(site_key).cloned().unwrap_or_default())
    }

    fn save(&mut self, site_key: &str, state: &AllocationState) -> anyhow::Result<()> {
        self.entries.insert(site_key.to_string(), state.clone());
        self.saves += 1;
        Ok(())
    }
}

fn read_json_object(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    let parsed: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    match parsed {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{} is not a JSON object", path.display()),
    }
}

// Written to a sibling temp file first so an interrupted write leaves the
// previous document intact.
fn write_json_object(path: &Path, payload: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    std::fs::write(
        &tmp_path,
        serde_json::to_string_pretty(&Value::Object(payload.clone()))?,
    )
    .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{AllocationStore, JsonFileStore, MemoryStore};
    use crate::allocation::AllocationState;

    fn state(pairs: &[(&str, &str)]) -> AllocationState {
        let mut state = AllocationState::default();
        for (page, keyword) in pairs {
            state.record(page, keyword);
        }
        state
    }

    #[test]
    fn missing_file_loads_empty_state() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = JsonFileStore::in_dir(temp.path());
        assert_eq!(store.load("/site")?, AllocationState::default());
        Ok(())
    }

    #[test]
    fn save_writes_nested_layout() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut store = JsonFileStore::in_dir(&temp.path().join("keywords"));
        store.save("/site", &state(&[("bedroom/a.html", "warm light")]))?;

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(store.path())?)?;
        assert_eq!(
            parsed,
            json!({"/site": {"map": {"bedroom/a.html": "warm light"}, "used_set": ["warm light"]}})
        );
        assert_eq!(store.load("/site")?, state(&[("bedroom/a.html", "warm light")]));
        Ok(())
    }

    #[test]
    fn save_preserves_other_sites() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("used_keywords.json");
        let mut first = JsonFileStore::new(&path);
        let mut second = JsonFileStore::new(&path);

        first.save("/a", &state(&[("x.html", "one")]))?;
        second.save("/b", &state(&[("y.html", "two")]))?;
        first.save("/a", &state(&[("x.html", "one"), ("z.html", "three")]))?;

        let mut reloaded = JsonFileStore::new(&path);
        assert_eq!(reloaded.load("/b")?, state(&[("y.html", "two")]));
        assert_eq!(reloaded.load("/a")?.map.len(), 2);
        Ok(())
    }

    #[test]
    fn corrupt_file_is_an_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("used_keywords.json");
        std::fs::write(&path, "{not json")?;
        let mut store = JsonFileStore::new(&path);
        assert!(store.load("/site").is_err());
        assert!(store.save("/site", &AllocationState::default()).is_err());
        assert_eq!(std::fs::read_to_string(&path)?, "{not json");
        Ok(())
    }

    #[test]
    fn memory_store_counts_saves() -> anyhow::Result<()> {
        let mut store = MemoryStore::new();
        store.save("/site", &state(&[("a.html", "k")]))?;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load("/site")?.keyword_for("a.html"), Some("k"));
        assert_eq!(store.load("/other")?, AllocationState::default());
        Ok(())
    }
}
