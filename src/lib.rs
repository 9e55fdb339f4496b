pub mod celebrations;
pub mod config;
pub mod directory;
pub mod model;
pub mod requests;
pub mod roster;
pub mod store;

pub fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

// Re-export commonly used types
pub use celebrations::{upcoming_celebrations, EventKind, Occurrence, Window};
pub use config::Config;
pub use model::{Family, Person, Principal};
pub use roster::{import_families, ImportDefaults, ImportReport};
pub use store::{DirectoryStore, MemoryDirectoryStore, RequestStore};
