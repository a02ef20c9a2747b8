//! Vigil Storage Layer
//!
//! Implements the `VerdictStore` trait from `vigil-domain`.
//!
//! # Stores
//!
//! - `MemoryStore`: session-scoped HashMap, lost on exit
//! - `SqliteStore`: durable SQLite table, one row per domain
//!
//! Both stores replace records whole (last write wins) and report backend
//! failures as `StoreError::Unavailable`, which callers downgrade to a
//! cache miss.
//!
//! # Examples
//!
//! ```no_run
//! use vigil_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for verdict operations
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
