//! Catalog item domain record.
//!
//! # Responsibility
//! - Define the persisted catalog record and its validity rules.
//!
//! # Invariants
//! - `id` is assigned by the remote catalog and is never reused locally.
//! - `id >= 1`; the append cursor derivation depends on it.
//! - `name` is never empty.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Remote-assigned identifier, also the local sort/cursor key.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ItemId = i64;

/// One catalog record as cached locally.
///
/// The local cache is a disposable projection of the remote catalog, so this
/// shape carries only the display fields the remote source returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Remote-assigned stable identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Short display description. Empty when the remote omits it.
    #[serde(default)]
    pub summary: String,
    /// Optional image location.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Validation failure for a catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    NonPositiveId(ItemId),
    EmptyName(ItemId),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "catalog item id must be >= 1, got {id}"),
            Self::EmptyName(id) => write!(f, "catalog item {id} has an empty name"),
        }
    }
}

impl Error for ItemValidationError {}

impl CatalogItem {
    /// Creates an item with the given remote identity and display name.
    pub fn new(id: ItemId, name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            summary: summary.into(),
            image_url: None,
        }
    }

    /// Checks the persistence invariants.
    ///
    /// Write paths must call this before SQL mutations; read paths use it to
    /// reject invalid persisted state instead of masking it.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id < 1 {
            return Err(ItemValidationError::NonPositiveId(self.id));
        }
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName(self.id));
        }
        Ok(())
    }
}
