//! Cache key definitions.

use crate::application::pagination::PageRequest;

/// The two resource kinds served by this API. Each owns one cache tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Authors,
    Books,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authors => "authors",
            Self::Books => "books",
        }
    }

    pub fn tag(self) -> CacheTag {
        CacheTag(self)
    }
}

/// Invalidation tag grouping every cached list page of one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheTag(ResourceKind);

impl CacheTag {
    pub fn kind(self) -> ResourceKind {
        self.0
    }
}

/// Key for one cached list payload: (kind, page, limit).
///
/// Page requests are sanitized before key derivation, so equal effective
/// parameters always map to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub kind: ResourceKind,
    pub page: u32,
    pub limit: u32,
}

impl ListKey {
    pub fn new(kind: ResourceKind, page: PageRequest) -> Self {
        Self {
            kind,
            page: page.page(),
            limit: page.limit(),
        }
    }

    pub fn tag(&self) -> CacheTag {
        self.kind.tag()
    }
}
