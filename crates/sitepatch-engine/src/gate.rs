use sitepatch_contracts::config::QualityThresholds;

use crate::compose::char_len;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityVerdict {
    pub needs_rewrite: bool,
    pub title_len: usize,
    pub description_len: usize,
    pub visible_text_len: usize,
}

impl QualityVerdict {
    /// Lists the checks that failed, for logging.
    pub fn failures(&self, thresholds: &QualityThresholds) -> Vec<&'static str> {
        let mut failures = Vec::new();
        if self.title_len < thresholds.title_min {
            failures.push("title");
        }
        if self.description_len < thresholds.description_min {
            failures.push("description");
        }
        if self.visible_text_len < thresholds.body_min {
            failures.push("body");
        }
        failures
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QualityGate {
    thresholds: QualityThresholds,
}

impl QualityGate {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// A page needs rewriting when any measure is strictly below its threshold.
    pub fn assess(&self, title: &str, description: &str, visible_text_len: usize) -> QualityVerdict {
        let title_len = char_len(title);
        let description_len = char_len(description);
        QualityVerdict {
            needs_rewrite: title_len < self.thresholds.title_min
                || description_len < self.thresholds.description_min
                || visible_text_len < self.thresholds.body_min,
            title_len,
            description_len,
            visible_text_len,
        }
    }
}
