pub mod base;
pub mod json_file;
pub mod memory;

pub use base::DocumentStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
