#![forbid(unsafe_code)]

pub mod curriculum;
pub mod repository;
pub mod sqlite;

pub use curriculum::CurriculumRepository;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError, StorageKey};
