//! Load orchestration services.
//!
//! # Responsibility
//! - Decide which remote page to fetch next and commit it atomically
//!   (`load_coordinator`).
//! - Expose the cache as a scrollable window sequence (`paged_reader`).
//!
//! # Invariants
//! - Services never bypass the store's `run_atomic` contract.
//! - Retry policy lives with the caller, never in these services.

pub mod load_coordinator;
pub mod paged_reader;
