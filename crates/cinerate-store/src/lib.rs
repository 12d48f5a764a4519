pub mod traits;
pub mod error;
pub mod collections;
pub mod memory;
pub mod json;

pub use traits::DocumentStore;
pub use error::StoreError;
pub use collections::Collections;
pub use memory::MemoryStore;
pub use json::JsonFileStore;
