use super::registry::{KeywordPool, PoolRegistry, FALLBACK_POOL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSelection<'a> {
    pub pool: &'a KeywordPool,
}

#[derive(Debug, Clone)]
pub struct PoolSelector {
    pub registry: PoolRegistry,
}

impl PoolSelector {
    pub fn new(registry: PoolRegistry) -> Self {
        Self { registry }
    }

    /// Resolves a directory context (innermost component first) to a pool.
    ///
    /// Components naming an empty pool are passed over. Returns `None` when
    /// nothing matches and the fallback pool is missing or empty.
    pub fn select(&self, context: &[String]) -> Option<PoolSelection<'_>> {
        for component in context {
            if component.eq_ignore_ascii_case(FALLBACK_POOL) {
                continue;
            }
            if let Some(pool) = self.registry.get(component).filter(|pool| !pool.is_empty()) {
                return Some(PoolSelection { pool });
            }
        }
        self.registry
            .fallback()
            .filter(|pool| !pool.is_empty())
            .map(|pool| PoolSelection { pool })
    }
}
