//! Durable store backends. Records are insert-only; expired rows are kept
//! and handed back unchanged for the caller to classify.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
