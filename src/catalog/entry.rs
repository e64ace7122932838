use serde::{Deserialize, Serialize};

use super::nicify::{display_path_from_qualified, last_segment};
use super::registry::{NodeType, NodeTypeId, NodeTypeRegistry};

/// A node type resolved to its menu placement: (type id, display path, tags).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub type_id: NodeTypeId,
    // Slash-delimited; interior segments are menu folders
    pub display_path: String,
    pub tags: Vec<String>,
}

impl CatalogEntry {
    /// The label shown for this entry outside folder navigation: the final
    /// path segment, not the full path.
    pub fn display_name(&self) -> &str {
        last_segment(&self.display_path, '/').unwrap_or(&self.display_path)
    }

    /// Path segments, empty ones dropped.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.display_path.split('/').filter(|s| !s.is_empty())
    }
}

/// Resolve one node type. An explicit placement is used verbatim; otherwise
/// the display path is derived from the qualified name (dots become slashes,
/// each segment nicified) with no tags.
pub fn resolve(ty: &NodeType) -> CatalogEntry {
    match &ty.placement {
        Some(placement) => CatalogEntry {
            type_id: ty.id.clone(),
            display_path: placement.menu_path.clone(),
            tags: placement.tags.clone(),
        },
        None => CatalogEntry {
            type_id: ty.id.clone(),
            display_path: display_path_from_qualified(&ty.qualified_name),
            tags: Vec::new(),
        },
    }
}

/// Resolved snapshot of a registry, computed once per catalog load.
/// Entries keep registry order, which is the order search preserves.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_registry(registry: &NodeTypeRegistry) -> Self {
        Catalog { entries: registry.iter().map(resolve).collect() }
    }

    /// Build directly from pre-resolved entries (tests, external catalogs).
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
