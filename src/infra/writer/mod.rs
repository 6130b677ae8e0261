//! Durable writer backends.

pub mod file;
pub mod memory;

pub use file::AtomicFileWriter;
pub use memory::InMemoryWriter;
