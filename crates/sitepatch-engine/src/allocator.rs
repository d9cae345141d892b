use sitepatch_contracts::allocation::{AllocationState, AllocationStore};
use sitepatch_contracts::pools::PoolSelector;
use sitepatch_contracts::runs::miss_log::MissSink;
use sitepatch_contracts::PageIdentity;

use crate::seed::{stream_for, Purpose};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// The page already had a keyword; nothing changed.
    Existing(String),
    /// A keyword was picked from `pool`. `reused` means the pool was exhausted.
    Assigned {
        keyword: String,
        pool: String,
        reused: bool,
    },
    /// No pool for the page's context and the fallback pool is empty.
    NotFound,
}

impl Allocation {
    pub fn keyword(&self) -> Option<&str> {
        match self {
            Allocation::Existing(keyword) => Some(keyword),
            Allocation::Assigned { keyword, .. } => Some(keyword),
            Allocation::NotFound => None,
        }
    }

    pub fn is_reused(&self) -> bool {
        matches!(self, Allocation::Assigned { reused: true, .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// The allocation was recorded in memory but could not be written out.
    #[error("failed to persist keyword allocation for {page}")]
    Persist {
        page: String,
        allocation: Allocation,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to record keyword miss for {page}")]
    MissLog {
        page: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Assigns each page one keyword from the pool matching its directory, keeping
/// keywords unique across the site until a pool runs out.
///
/// State is loaded once and written through the store after every new
/// assignment. A single writer per site root is assumed.
pub struct KeywordAllocator<S, M> {
    site_key: String,
    state: AllocationState,
    store: S,
    selector: PoolSelector,
    misses: M,
    durable: bool,
}

impl<S: AllocationStore, M: MissSink> KeywordAllocator<S, M> {
    pub fn new(
        site_key: impl Into<String>,
        mut store: S,
        selector: PoolSelector,
        misses: M,
    ) -> anyhow::Result<Self> {
        let site_key = site_key.into();
        let state = store.load(&site_key)?;
        Ok(Self {
            site_key,
            state,
            store,
            selector,
            misses,
            durable: true,
        })
    }

    pub fn state(&self) -> &AllocationState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn misses(&self) -> &M {
        &self.misses
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Stops writing state through to the store for the rest of the run.
    pub fn disable_persistence(&mut self) {
        self.durable = false;
    }

    /// Allocates using the page's own directory context.
    pub fn allocate(&mut self, page: &PageIdentity) -> Result<Allocation, AllocationError> {
        let context = page.directory_context();
        self.allocate_in(page, &context)
    }

    /// Allocates against an explicit context, innermost directory first.
    pub fn allocate_in(
        &mut self,
        page: &PageIdentity,
        context: &[String],
    ) -> Result<Allocation, AllocationError> {
        if let Some(keyword) = self.state.keyword_for(page.as_str()) {
            return Ok(Allocation::Existing(keyword.to_string()));
        }

        let allocation = self.choose(page, context);
        let Some(keyword) = allocation.keyword() else {
            self.misses
                .record(page.as_str())
                .map_err(|source| AllocationError::MissLog {
                    page: page.to_string(),
                    source,
                })?;
            return Ok(allocation);
        };

        self.state.record(page.as_str(), keyword);
        if self.durable {
            if let Err(source) = self.store.save(&self.site_key, &self.state) {
                return Err(AllocationError::Persist {
                    page: page.to_string(),
                    allocation,
                    source,
                });
            }
        }
        Ok(allocation)
    }

    /// What [`KeywordAllocator::allocate_in`] would return, without recording anything.
    pub fn peek(&self, page: &PageIdentity, context: &[String]) -> Allocation {
        if let Some(keyword) = self.state.keyword_for(page.as_str()) {
            return Allocation::Existing(keyword.to_string());
        }
        self.choose(page, context)
    }

    fn choose(&self, page: &PageIdentity, context: &[String]) -> Allocation {
        let Some(selection) = self.selector.select(context) else {
            return Allocation::NotFound;
        };
        let phrases = &selection.pool.phrases;
        let mut rand = stream_for(Purpose::Keyword, page.as_str());
        let Some(start) = rand.index(phrases.len()) else {
            return Allocation::NotFound;
        };

        let used = self.state.used_lookup();
        let fresh = (0..phrases.len())
            .map(|offset| &phrases[(start + offset) % phrases.len()])
            .find(|phrase| !used.contains(phrase.as_str()));
        let (keyword, reused) = match fresh {
            Some(phrase) => (phrase.clone(), false),
            None => (phrases[start].clone(), true),
        };
        Allocation::Assigned {
            keyword,
            pool: selection.pool.name.clone(),
            reused,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use sitepatch_contracts::allocation::{AllocationState, AllocationStore, MemoryStore};
    use sitepatch_contracts::pools::{KeywordPool, PoolRegistry, PoolSelector};
    use sitepatch_contracts::PageIdentity;

    use super::{Allocation, AllocationError, KeywordAllocator};

    const SITE: &str = "/srv/site";

    fn selector(pools: &[(&str, &[&str])]) -> PoolSelector {
        PoolSelector::new(PoolRegistry::new(pools.iter().map(|(name, phrases)| {
            KeywordPool::new(*name, phrases.iter().map(|p| p.to_string()).collect())
        })))
    }

    fn bedroom() -> PoolSelector {
        selector(&[("bedroom", &["warm light", "soft pillow", "morning glow"])])
    }

    fn allocator(selector: PoolSelector) -> KeywordAllocator<MemoryStore, Vec<String>> {
        match KeywordAllocator::new(SITE, MemoryStore::new(), selector, Vec::new()) {
            Ok(allocator) => allocator,
            Err(err) => panic!("memory store load failed: {err}"),
        }
    }

    struct FailingStore;

    impl AllocationStore for FailingStore {
        fn load(&mut self, _site_key: &str) -> anyhow::Result<AllocationState> {
            Ok(AllocationState::default())
        }

        fn save(&mut self, _site_key: &str, _state: &AllocationState) -> anyhow::Result<()> {
            anyhow::bail!("read-only filesystem")
        }
    }

    #[test]
    fn allocation_is_idempotent() -> anyhow::Result<()> {
        let mut alloc = allocator(bedroom());
        let page = PageIdentity::new("bedroom/cozy-01.html");

        let first = alloc.allocate(&page)?;
        let keyword = first.keyword().map(str::to_string);
        assert!(matches!(first, Allocation::Assigned { reused: false, .. }));

        let second = alloc.allocate(&page)?;
        assert_eq!(second, Allocation::Existing(keyword.clone().unwrap_or_default()));
        assert_eq!(alloc.state().used_set.len(), 1);
        assert_eq!(alloc.store().save_count(), 1);
        Ok(())
    }

    #[test]
    fn allocation_is_reproducible_across_runs() -> anyhow::Result<()> {
        let page = PageIdentity::new("bedroom/cozy-01.html");
        let first = allocator(bedroom()).allocate(&page)?;
        let second = allocator(bedroom()).allocate(&page)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn pool_is_unique_until_exhausted() -> anyhow::Result<()> {
        let mut alloc = allocator(bedroom());
        let mut seen = HashSet::new();
        for idx in 0..3 {
            let page = PageIdentity::new(format!("bedroom/p{idx}.html"));
            let allocation = alloc.allocate(&page)?;
            assert!(!allocation.is_reused());
            seen.insert(allocation.keyword().unwrap_or_default().to_string());
        }
        assert_eq!(seen.len(), 3);

        let extra = alloc.allocate(&PageIdentity::new("bedroom/p3.html"))?;
        assert!(extra.is_reused());
        assert!(seen.contains(extra.keyword().unwrap_or_default()));
        assert_eq!(alloc.state().used_set.len(), 4);
        Ok(())
    }

    #[test]
    fn start_offset_depends_on_page() -> anyhow::Result<()> {
        let pool: Vec<String> = (0..50).map(|idx| format!("kw-{idx}")).collect();
        let refs: Vec<&str> = pool.iter().map(String::as_str).collect();
        let firsts = (0..20)
            .map(|idx| {
                let mut alloc = allocator(selector(&[("all", &refs)]));
                alloc
                    .allocate(&PageIdentity::new(format!("misc/{idx}.html")))
                    .map(|a| a.keyword().unwrap_or_default().to_string())
            })
            .collect::<Result<HashSet<_>, _>>()?;
        assert!(firsts.len() > 1);
        Ok(())
    }

    #[test]
    fn used_set_is_shared_across_pools() -> anyhow::Result<()> {
        let mut alloc = allocator(selector(&[("dark", &["shared"]), ("soft", &["shared", "own"])]));
        let dark = alloc.allocate(&PageIdentity::new("dark/a.html"))?;
        assert_eq!(dark.keyword(), Some("shared"));
        let soft = alloc.allocate(&PageIdentity::new("soft/b.html"))?;
        assert_eq!(soft.keyword(), Some("own"));
        Ok(())
    }

    #[test]
    fn missing_pool_is_logged_and_not_recorded() -> anyhow::Result<()> {
        let mut alloc = allocator(bedroom());
        let page = PageIdentity::new("office/desk.html");
        assert_eq!(alloc.allocate(&page)?, Allocation::NotFound);
        assert_eq!(alloc.misses(), &vec!["office/desk.html".to_string()]);
        assert!(alloc.state().map.is_empty());
        Ok(())
    }

    #[test]
    fn fallback_pool_serves_unmatched_context() -> anyhow::Result<()> {
        let mut alloc = allocator(selector(&[("all", &["generic"])]));
        let allocation = alloc.allocate_in(
            &PageIdentity::new("x.html"),
            &["office".to_string()],
        )?;
        assert_eq!(
            allocation,
            Allocation::Assigned {
                keyword: "generic".to_string(),
                pool: "all".to_string(),
                reused: false,
            }
        );
        Ok(())
    }

    #[test]
    fn peek_does_not_record() {
        let alloc = allocator(bedroom());
        let page = PageIdentity::new("bedroom/cozy-01.html");
        let peeked = alloc.peek(&page, &page.directory_context());
        assert!(peeked.keyword().is_some());
        assert!(alloc.state().map.is_empty());
        assert_eq!(alloc.store().save_count(), 0);
    }

    #[test]
    fn existing_state_is_honored() -> anyhow::Result<()> {
        let mut state = AllocationState::default();
        state.record("bedroom/cozy-01.html", "legacy");
        let store = MemoryStore::with_state(SITE, state);
        let mut alloc = KeywordAllocator::new(SITE, store, bedroom(), Vec::new())?;
        assert_eq!(
            alloc.allocate(&PageIdentity::new("bedroom/cozy-01.html"))?,
            Allocation::Existing("legacy".to_string())
        );
        Ok(())
    }

    #[test]
    fn persistence_failure_keeps_memory_state() -> anyhow::Result<()> {
        let mut alloc = KeywordAllocator::new(SITE, FailingStore, bedroom(), Vec::new())?;
        let page = PageIdentity::new("bedroom/cozy-01.html");
        let err = match alloc.allocate(&page) {
            Err(err) => err,
            Ok(other) => panic!("expected persistence failure, got {other:?}"),
        };
        let AllocationError::Persist { allocation, .. } = &err else {
            panic!("unexpected error {err}");
        };
        assert_eq!(alloc.state().keyword_for(page.as_str()), allocation.keyword());
        assert_eq!(
            err.to_string(),
            "failed to persist keyword allocation for bedroom/cozy-01.html"
        );

        alloc.disable_persistence();
        assert!(!alloc.is_durable());
        let next = alloc.allocate(&PageIdentity::new("bedroom/cozy-02.html"))?;
        assert!(next.keyword().is_some());
        Ok(())
    }
}
