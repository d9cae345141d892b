mod registry;
mod selector;

pub use registry::{read_phrase_lines, KeywordPool, PoolRegistry, FALLBACK_POOL};
pub use selector::{PoolSelection, PoolSelector};
