pub mod allocation;
pub mod config;
pub mod events;
pub mod page;
pub mod pools;
pub mod runs;

pub use page::PageIdentity;
