pub mod app_config;
pub mod json_store;
pub mod memory;
pub mod records;

pub use app_config::Config;
pub use json_store::JsonSnapshotStore;
pub use memory::MemoryStore;
