//! Domain model for cached catalog records.
//!
//! # Responsibility
//! - Define the canonical item shape shared by the remote source and the
//!   local cache store.
//!
//! # Invariants
//! - Item identifiers are remote-assigned and never generated locally.
//! - The identifier doubles as the sort/cursor key for paged reads.

pub mod item;
