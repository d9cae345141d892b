use std::io::Write;
use std::path::{Path, PathBuf};

pub const MISS_LOG_FILE_NAME: &str = "kw_miss.txt";

/// Append sink for pages that found no keyword pool.
pub trait MissSink {
    fn record(&mut self, page: &str) -> anyhow::Result<()>;
}

/// One relative page path per line in `logs/kw_miss.txt`.
#[derive(Debug, Clone)]
pub struct MissLog {
    path: PathBuf,
}

impl MissLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(logs_dir: &Path) -> Self {
        Self::new(logs_dir.join(MISS_LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MissSink for MissLog {
    fn record(&mut self, page: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(page.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

impl MissSink for Vec<String> {
    fn record(&mut self, page: &str) -> anyhow::Result<()> {
        self.push(page.to_string());
        Ok(())
    }
}
