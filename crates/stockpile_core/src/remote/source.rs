//! Paged fetch contract for the remote catalog.

use crate::model::item::CatalogItem;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::{NonZeroU32, NonZeroU64};

/// One remote page request. `page` is 1-based; `per_page` is fixed at
/// coordinator configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: NonZeroU64,
    pub per_page: NonZeroU32,
}

impl PageRequest {
    /// Builds a request, rejecting zero page or page size.
    pub fn new(page: u64, per_page: u32) -> Option<Self> {
        Some(Self {
            page: NonZeroU64::new(page)?,
            per_page: NonZeroU32::new(per_page)?,
        })
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Transport-level failure from the remote catalog.
#[derive(Debug)]
pub enum SourceError {
    /// Connectivity or protocol failure before a status was obtained.
    Transport(String),
    /// Non-success HTTP status.
    Status { status: u16, url: String },
    /// Response body could not be decoded as a catalog page.
    Decode(String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "catalog transport failure: {message}"),
            Self::Status { status, url } => {
                write!(f, "catalog returned HTTP {status} for {url}")
            }
            Self::Decode(message) => write!(f, "catalog page decode failure: {message}"),
        }
    }
}

impl Error for SourceError {}

impl SourceError {
    /// Classifies a reqwest failure into the source taxonomy.
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Remote catalog behind a fetch-one-page contract.
///
/// Implementations must not retry internally and must report a page past the
/// end of the catalog as `Ok(vec![])`.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> SourceResult<Vec<CatalogItem>>;
}
