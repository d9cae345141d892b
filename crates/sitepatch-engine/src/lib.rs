pub mod allocator;
pub mod blurbs;
pub mod compose;
pub mod document;
pub mod facets;
pub mod gate;
pub mod seed;
pub mod synth;
pub mod template;

use anyhow::Result;
use serde_json::{json, Map, Value};
use sitepatch_contracts::allocation::AllocationStore;
use sitepatch_contracts::config::SiteConfig;
use sitepatch_contracts::events::EventWriter;
use sitepatch_contracts::runs::miss_log::MissSink;
use sitepatch_contracts::PageIdentity;

pub use allocator::{Allocation, AllocationError, KeywordAllocator};
pub use document::{infer_keyword, PageDocument};
pub use gate::{QualityGate, QualityVerdict};
pub use seed::{stream, stream_for, Purpose, RandomStream};
pub use synth::{ContentSynthesizer, SynthesizedContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSource {
    /// Assigned on an earlier run.
    Existing,
    Pool,
    /// Pool exhausted; the keyword is shared with another page.
    Reused,
    /// No pool covered the page; taken from its heading or file name.
    Inferred,
}

impl KeywordSource {
    pub fn label(self) -> &'static str {
        match self {
            KeywordSource::Existing => "existing",
            KeywordSource::Pool => "pool",
            KeywordSource::Reused => "reused",
            KeywordSource::Inferred => "inferred",
        }
    }

    pub fn of(allocation: &Allocation) -> Self {
        match allocation {
            Allocation::Existing(_) => KeywordSource::Existing,
            Allocation::Assigned { reused: true, .. } => KeywordSource::Reused,
            Allocation::Assigned { .. } => KeywordSource::Pool,
            Allocation::NotFound => KeywordSource::Inferred,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub verdict: QualityVerdict,
    pub keyword: String,
    pub keyword_source: KeywordSource,
    pub content: SynthesizedContent,
    pub paragraph_inserted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Skipped(QualityVerdict),
    Patched(PatchReport),
}

/// Gate, allocate, synthesize and apply for one page at a time.
pub struct PatchEngine<S, M> {
    gate: QualityGate,
    allocator: KeywordAllocator<S, M>,
    synth: ContentSynthesizer,
    brand: String,
    events: Option<EventWriter>,
}

impl<S: AllocationStore, M: MissSink> PatchEngine<S, M> {
    pub fn new(config: &SiteConfig, brand: impl Into<String>, allocator: KeywordAllocator<S, M>) -> Self {
        Self {
            gate: QualityGate::new(config.quality),
            allocator,
            synth: ContentSynthesizer::new(config.windows, config.facets.clone()),
            brand: brand.into(),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventWriter) -> Self {
        self.events = Some(events);
        self
    }

    pub fn allocator(&self) -> &KeywordAllocator<S, M> {
        &self.allocator
    }

    pub fn assess(&self, title: &str, description: &str, visible_text_len: usize) -> QualityVerdict {
        self.gate.assess(title, description, visible_text_len)
    }

    /// Allocates a keyword, degrading instead of failing.
    ///
    /// A persistence failure switches the allocator to in-memory mode for the
    /// rest of the run; a miss-log failure is reported and treated as a miss.
    pub fn allocate_keyword(&mut self, page: &PageIdentity) -> Result<Allocation> {
        match self.allocator.allocate(page) {
            Ok(allocation) => Ok(allocation),
            Err(AllocationError::Persist {
                page: failed,
                allocation,
                source,
            }) => {
                eprintln!(
                    "[warn] keyword state not persisted for {failed}: {source:#}; continuing in memory, uniqueness is no longer durable across runs"
                );
                self.allocator.disable_persistence();
                self.emit(
                    "persistence_degraded",
                    map_object(json!({
                        "page": failed,
                        "error": format!("{source:#}"),
                    })),
                )?;
                Ok(allocation)
            }
            Err(AllocationError::MissLog { page: failed, source }) => {
                eprintln!("[warn] could not log keyword miss for {failed}: {source:#}");
                Ok(Allocation::NotFound)
            }
        }
    }

    pub fn synthesize(&self, keyword: &str, seed: &str) -> SynthesizedContent {
        self.synth.synthesize(keyword, &self.brand, seed)
    }

    /// Leaves a page that passes the gate untouched; otherwise rewrites its
    /// title and description, and adds a paragraph when the body is short.
    pub fn patch<D: PageDocument>(&mut self, page: &PageIdentity, doc: &mut D) -> Result<PageOutcome> {
        let verdict = self.gate.assess(
            &doc.title(),
            &doc.meta_description(),
            doc.visible_text_len(),
        );
        if !verdict.needs_rewrite {
            self.emit(
                "page_skipped",
                map_object(json!({
                    "page": page.as_str(),
                    "title_len": verdict.title_len,
                    "description_len": verdict.description_len,
                    "visible_text_len": verdict.visible_text_len,
                })),
            )?;
            return Ok(PageOutcome::Skipped(verdict));
        }

        let allocation = self.allocate_keyword(page)?;
        let keyword_source = KeywordSource::of(&allocation);
        let keyword = match allocation.keyword() {
            Some(keyword) => keyword.to_string(),
            None => {
                self.emit("keyword_miss", map_object(json!({ "page": page.as_str() })))?;
                infer_keyword(doc.first_heading().as_deref(), page.stem())
            }
        };

        let content = self.synthesize(&keyword, page.as_str());
        doc.set_title(&content.title);
        doc.set_meta_description(&content.description);
        let paragraph_inserted = verdict.visible_text_len < self.gate.thresholds().body_min;
        if paragraph_inserted {
            doc.insert_paragraph(&content.paragraph);
        }

        self.emit(
            "page_patched",
            map_object(json!({
                "page": page.as_str(),
                "keyword": keyword,
                "keyword_source": keyword_source.label(),
                "failed_checks": verdict.failures(self.gate.thresholds()),
                "paragraph_inserted": paragraph_inserted,
            })),
        )?;

        Ok(PageOutcome::Patched(PatchReport {
            verdict,
            keyword,
            keyword_source,
            content,
            paragraph_inserted,
        }))
    }

    fn emit(&self, event_type: &str, payload: Map<String, Value>) -> Result<()> {
        if let Some(events) = &self.events {
            events.emit(event_type, payload)?;
        }
        Ok(())
    }
}

pub fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use sitepatch_contracts::allocation::{AllocationState, AllocationStore, MemoryStore};
    use sitepatch_contracts::config::SiteConfig;
    use sitepatch_contracts::events::EventWriter;
    use sitepatch_contracts::pools::{KeywordPool, PoolRegistry, PoolSelector};
    use sitepatch_contracts::PageIdentity;
    use serde_json::Value;

    use super::{KeywordAllocator, KeywordSource, PageDocument, PageOutcome, PatchEngine};

    #[derive(Debug, Default, Clone)]
    struct FakeDoc {
        title: String,
        description: String,
        text_len: usize,
        heading: Option<String>,
        paragraphs: Vec<String>,
    }

    impl PageDocument for FakeDoc {
        fn title(&self) -> String {
            self.title.clone()
        }
        fn set_title(&mut self, title: &str) {
            self.title = title.to_string();
        }
        fn meta_description(&self) -> String {
            self.description.clone()
        }
        fn set_meta_description(&mut self, description: &str) {
            self.description = description.to_string();
        }
        fn visible_text_len(&self) -> usize {
            self.text_len
        }
        fn first_heading(&self) -> Option<String> {
            self.heading.clone()
        }
        fn insert_paragraph(&mut self, text: &str) {
            self.paragraphs.push(text.to_string());
        }
    }

    fn selector() -> PoolSelector {
        PoolSelector::new(PoolRegistry::new([KeywordPool::new(
            "bedroom",
            vec!["warm light".to_string(), "soft pillow".to_string()],
        )]))
    }

    fn engine() -> anyhow::Result<PatchEngine<MemoryStore, Vec<String>>> {
        let allocator = KeywordAllocator::new("/site", MemoryStore::new(), selector(), Vec::new())?;
        Ok(PatchEngine::new(&SiteConfig::default(), "Lumen", allocator))
    }

    fn good_doc() -> FakeDoc {
        FakeDoc {
            title: "t".repeat(30),
            description: "d".repeat(110),
            text_len: 200,
            ..FakeDoc::default()
        }
    }

    #[test]
    fn passing_page_is_untouched_and_allocates_nothing() -> anyhow::Result<()> {
        let mut engine = engine()?;
        let mut doc = good_doc();
        let outcome = engine.patch(&PageIdentity::new("bedroom/a.html"), &mut doc)?;
        assert!(matches!(outcome, PageOutcome::Skipped(_)));
        assert_eq!(doc.title, "t".repeat(30));
        assert!(doc.paragraphs.is_empty());
        assert!(engine.allocator().state().map.is_empty());
        assert_eq!(engine.allocator().store().save_count(), 0);
        Ok(())
    }

    #[test]
    fn short_title_is_rewritten_without_paragraph() -> anyhow::Result<()> {
        let mut engine = engine()?;
        let mut doc = FakeDoc {
            title: "Home".to_string(),
            ..good_doc()
        };
        let outcome = engine.patch(&PageIdentity::new("bedroom/a.html"), &mut doc)?;
        let PageOutcome::Patched(report) = outcome else {
            panic!("expected a patch");
        };
        assert_eq!(report.keyword_source, KeywordSource::Pool);
        assert_eq!(doc.title, report.content.title);
        assert_eq!(doc.description, report.content.description);
        assert!(!report.paragraph_inserted);
        assert!(doc.paragraphs.is_empty());
        assert!(doc.title.contains(&report.keyword));
        Ok(())
    }

    #[test]
    fn thin_body_gets_paragraph() -> anyhow::Result<()> {
        let mut engine = engine()?;
        let mut doc = FakeDoc {
            text_len: 40,
            ..good_doc()
        };
        let outcome = engine.patch(&PageIdentity::new("bedroom/a.html"), &mut doc)?;
        assert!(matches!(outcome, PageOutcome::Patched(ref r) if r.paragraph_inserted));
        assert_eq!(doc.paragraphs.len(), 1);
        Ok(())
    }

    #[test]
    fn rerun_produces_identical_output() -> anyhow::Result<()> {
        let page = PageIdentity::new("bedroom/a.html");
        let mut first_doc = FakeDoc::default();
        let mut engine_a = engine()?;
        engine_a.patch(&page, &mut first_doc)?;

        let state: AllocationState = engine_a.allocator().state().clone();
        let mut store = MemoryStore::new();
        store.save("/site", &state)?;
        let allocator = KeywordAllocator::new("/site", store, selector(), Vec::new())?;
        let mut engine_b = PatchEngine::new(&SiteConfig::default(), "Lumen", allocator);
        let mut second_doc = FakeDoc::default();
        let outcome = engine_b.patch(&page, &mut second_doc)?;

        assert_eq!(first_doc.title, second_doc.title);
        assert_eq!(first_doc.description, second_doc.description);
        assert_eq!(first_doc.paragraphs, second_doc.paragraphs);
        assert!(matches!(outcome, PageOutcome::Patched(ref r) if r.keyword_source == KeywordSource::Existing));
        Ok(())
    }

    #[derive(Debug, Default)]
    struct ReadOnlyStore {
        save_attempts: usize,
    }

    impl AllocationStore for ReadOnlyStore {
        fn load(&mut self, _site_key: &str) -> anyhow::Result<AllocationState> {
            Ok(AllocationState::default())
        }

        fn save(&mut self, _site_key: &str, _state: &AllocationState) -> anyhow::Result<()> {
            self.save_attempts += 1;
            anyhow::bail!("read-only filesystem")
        }
    }

    #[test]
    fn failed_save_degrades_to_memory_and_continues() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let allocator =
            KeywordAllocator::new("/site", ReadOnlyStore::default(), selector(), Vec::new())?;
        let mut engine = PatchEngine::new(&SiteConfig::default(), "Lumen", allocator)
            .with_events(EventWriter::new(&events_path, "run-1"));

        let mut keywords = Vec::new();
        for name in ["bedroom/a.html", "bedroom/b.html"] {
            let mut doc = FakeDoc::default();
            let outcome = engine.patch(&PageIdentity::new(name), &mut doc)?;
            let PageOutcome::Patched(report) = outcome else {
                panic!("expected {name} to be patched");
            };
            assert_eq!(report.keyword_source, KeywordSource::Pool);
            assert_eq!(doc.paragraphs.len(), 1);
            keywords.push(report.keyword);
        }

        assert_ne!(keywords[0], keywords[1]);
        assert!(!engine.allocator().is_durable());
        assert_eq!(engine.allocator().store().save_attempts, 1);
        assert_eq!(engine.allocator().state().map.len(), 2);

        let events = std::fs::read_to_string(&events_path)?
            .lines()
            .map(serde_json::from_str::<Value>)
            .collect::<Result<Vec<_>, _>>()?;
        let degraded: Vec<&Value> = events
            .iter()
            .filter(|event| event["type"] == "persistence_degraded")
            .collect();
        assert_eq!(degraded.len(), 1);
        assert_eq!(degraded[0]["page"], Value::from("bedroom/a.html"));
        Ok(())
    }

    #[test]
    fn unmatched_page_uses_heading() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("events.jsonl");
        let mut engine = engine()?.with_events(EventWriter::new(&events_path, "run-1"));
        let mut doc = FakeDoc {
            heading: Some("Night Walk".to_string()),
            ..FakeDoc::default()
        };
        let outcome = engine.patch(&PageIdentity::new("street/night.html"), &mut doc)?;
        let PageOutcome::Patched(report) = outcome else {
            panic!("expected a patch");
        };
        assert_eq!(report.keyword, "Night Walk");
        assert_eq!(report.keyword_source, KeywordSource::Inferred);
        assert_eq!(engine.allocator().misses(), &vec!["street/night.html".to_string()]);

        let types = std::fs::read_to_string(&events_path)?
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).map(|v| v["type"].clone()))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            types,
            vec![Value::from("keyword_miss"), Value::from("page_patched")]
        );
        Ok(())
    }
}
