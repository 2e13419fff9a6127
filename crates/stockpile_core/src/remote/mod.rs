//! Remote catalog source contracts and HTTP implementation.
//!
//! # Responsibility
//! - Define the paged fetch contract the load coordinator consumes.
//! - Keep transport details behind the `CatalogSource` seam.
//!
//! # Invariants
//! - A page past the end of the catalog is an empty list, not an error.
//! - The source performs no retry; retry policy belongs to the caller.

pub mod http;
pub mod source;
