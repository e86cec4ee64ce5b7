//! registra-store — In-memory persistence boundary for registra.
//!
//! Implements the `Registry` and `AttendanceStatistics` traits over a
//! single snapshot guarded by a `RwLock`, so every storage call — the
//! multi-row scheme/promotion/freeze operations included — applies as
//! one atomic unit. Snapshots serialize to JSON for the stateful CLI.

pub mod memory;
pub mod persist;
pub mod seed;

pub use memory::{InMemoryRegistry, Snapshot};
