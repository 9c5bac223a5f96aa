//! Persistence adapters for the domain's driven storage ports.

pub mod memory;

pub use memory::MemoryStore;
