//! Cache store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the atomic-write and cursor-read contracts the coordinator and
//!   reader depend on.
//! - Isolate SQL details from load orchestration.
//!
//! # Invariants
//! - All writes happen inside `run_atomic`; readers never observe a
//!   partially applied page.
//! - Write paths validate items before persistence; read paths reject
//!   invalid persisted state.

pub mod item_repo;
