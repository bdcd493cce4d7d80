//! Storage Adapters
//!
//! Implementations of the UsageLedgerStore port.
//!
//! ## Available Adapters
//!
//! - **FileLedgerStore** - One YAML file per device on disk
//! - **InMemoryLedgerStore** - Shared in-memory map (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileLedgerStore, InMemoryLedgerStore};
//!
//! // Production: file-based storage
//! let store = FileLedgerStore::new("./data/ledgers");
//!
//! // Testing: in-memory storage
//! let store = InMemoryLedgerStore::new();
//! ```

mod file_ledger_store;
mod in_memory_ledger_store;

pub use file_ledger_store::FileLedgerStore;
pub use in_memory_ledger_store::InMemoryLedgerStore;
