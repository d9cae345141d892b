mod state;
mod store;

pub use state::AllocationState;
pub use store::{AllocationStore, JsonFileStore, MemoryStore, ALLOCATION_FILE_NAME};
