use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::pools::read_phrase_lines;

pub const CONFIG_FILE_NAME: &str = "sitepatch.json";
pub const SLOGANS_FILE_NAME: &str = "slogans.txt";
pub const CATEGORY_TEMPLATES_FILE_NAME: &str = "category_desc_templates.txt";

/// Minimum lengths a page must already meet to be left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub title_min: usize,
    pub description_min: usize,
    pub body_min: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            title_min: 30,
            description_min: 110,
            body_min: 200,
        }
    }
}

/// Target length windows for synthesized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthWindows {
    pub title_min: usize,
    pub title_max: usize,
    pub description_min: usize,
    pub description_max: usize,
    pub body_min: usize,
    pub paragraph_max: usize,
}

impl Default for LengthWindows {
    fn default() -> Self {
        Self {
            title_min: 45,
            title_max: 60,
            description_min: 130,
            description_max: 155,
            body_min: 200,
            paragraph_max: 300,
        }
    }
}

/// Word pools for the six per-page facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetPools {
    pub styles: Vec<String>,
    pub moods: Vec<String>,
    pub lights: Vec<String>,
    pub compositions: Vec<String>,
    pub wardrobes: Vec<String>,
    pub backgrounds: Vec<String>,
}

impl Default for FacetPools {
    fn default() -> Self {
        Self {
            styles: strings(&[
                "modern",
                "vintage",
                "minimal",
                "urban",
                "cinematic",
                "natural",
                "studio",
                "retro",
            ]),
            moods: strings(&[
                "elegant", "playful", "moody", "romantic", "calm", "bold", "warm", "cool",
            ]),
            lights: strings(&[
                "soft lighting",
                "golden-hour glow",
                "window light",
                "neon lights",
                "backlight",
                "overcast",
            ]),
            compositions: strings(&[
                "close-up",
                "rule-of-thirds",
                "symmetry",
                "leading lines",
                "wide shot",
            ]),
            wardrobes: strings(&[
                "casual",
                "streetwear",
                "office",
                "evening dress",
                "sporty",
                "retro",
            ]),
            backgrounds: strings(&[
                "urban backdrop",
                "nature scene",
                "indoor studio",
                "minimal set",
                "bedroom scene",
            ]),
        }
    }
}

/// Per-site settings, read from `sitepatch.json` at the site root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub brand: Option<String>,
    pub quality: QualityThresholds,
    pub windows: LengthWindows,
    pub facets: FacetPools,
    pub keywords_dir: String,
    pub logs_dir: String,
    pub category_dirs: Vec<String>,
    pub category_templates: Vec<String>,
    pub slogans: Vec<String>,
    pub dry_run: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand: None,
            quality: QualityThresholds::default(),
            windows: LengthWindows::default(),
            facets: FacetPools::default(),
            keywords_dir: "keywords".to_string(),
            logs_dir: "logs".to_string(),
            category_dirs: strings(&[
                "bedroom", "dark", "soft", "office", "uniform", "fitness", "mirror", "shower",
                "luxury",
            ]),
            category_templates: default_category_templates(),
            slogans: default_slogans(),
            dry_run: false,
        }
    }
}

impl SiteConfig {
    /// Reads `sitepatch.json` (or `explicit`) under `root`, then lets
    /// `slogans.txt` and `category_desc_templates.txt` replace the built-in lists.
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));
        let mut config = if path.is_file() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<SiteConfig>(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else if explicit.is_some() {
            anyhow::bail!("config file {} does not exist", path.display());
        } else {
            SiteConfig::default()
        };

        let slogans = read_phrase_lines(&root.join(SLOGANS_FILE_NAME))?;
        if !slogans.is_empty() {
            config.slogans = slogans;
        }
        let templates = read_phrase_lines(&root.join(CATEGORY_TEMPLATES_FILE_NAME))?;
        if !templates.is_empty() {
            config.category_templates = templates;
        }
        Ok(config)
    }

    pub fn is_category_dir(&self, name: &str) -> bool {
        self.category_dirs
            .iter()
            .any(|dir| dir.eq_ignore_ascii_case(name))
    }
}

fn default_category_templates() -> Vec<String> {
    strings(&[
        "Explore {bedroom|gallery|collection} portraits with {soft|gentle|subtle} lighting and {natural|casual} moods. This page curates {intimate|quiet|serene} moments and {elegant|clean} frames.",
        "Browse {bedroom|portrait} images featuring {morning light|cozy atmosphere|warm tones} and {relaxed|honest} expressions. A {handpicked|curated} set for {inspiration|reference}.",
        "Discover {bedroom-themed|indoor} portraits focused on {texture|light|color} and {emotion|presence}. Crafted for viewers who enjoy {subtle|minimal} aesthetics.",
    ])
}

fn default_slogans() -> Vec<String> {
    strings(&[
        "Images that whisper stories.",
        "A quiet gallery of light and mood.",
        "Elegance in subtle frames.",
        "Where portraits meet emotion.",
        "Gentle tones, honest moments.",
    ])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}
