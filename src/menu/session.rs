//! Per-popup palette state. The original design kept the menu tree and the
//! navigation cursor in process-wide statics; a session object makes two
//! popups over two catalogs independent and keeps tests from sharing state.

use log::debug;

use crate::catalog::entry::Catalog;
use crate::catalog::registry::NodeTypeId;
use crate::menu::search;
use crate::menu::tree::{MenuNodeId, MenuTree, MenuTreeError};

/// One row of the palette listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaletteItem {
    /// Navigable menu folder.
    Folder { node: MenuNodeId, label: String },
    /// Concrete instantiable type. Label is the final path segment.
    Leaf { label: String, type_id: NodeTypeId },
}

impl PaletteItem {
    pub fn label(&self) -> &str {
        match self {
            PaletteItem::Folder { label, .. } => label,
            PaletteItem::Leaf { label, .. } => label,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, PaletteItem::Folder { .. })
    }
}

/// Outcome of activating a palette row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Cursor moved into a folder; keep the popup open.
    Descend,
    /// A leaf was chosen; the caller should instantiate this type and close.
    Create(NodeTypeId),
}

/// Browsing/search state for one create-node popup over one catalog.
pub struct PaletteSession {
    catalog: Catalog,
    // Built on the first folder listing, kept for the session
    tree: Option<MenuTree>,
    cursor: Option<MenuNodeId>,
    query: String,
}

impl PaletteSession {
    pub fn new(catalog: Catalog) -> Self {
        PaletteSession { catalog, tree: None, cursor: None, query: String::new() }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    /// Search mode is active whenever the query is non-empty; otherwise the
    /// popup shows tree navigation.
    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
    }

    /// True before the first folder listing and whenever the cursor sits on
    /// the tree root. The back row is hidden at the root.
    pub fn at_root(&self) -> bool {
        match (&self.tree, self.cursor) {
            (Some(tree), Some(cursor)) => cursor == tree.root(),
            _ => true,
        }
    }

    /// Rows to render: search matches when a query is present, the current
    /// folder's children otherwise.
    pub fn items(&mut self) -> Result<Vec<PaletteItem>, MenuTreeError> {
        if self.is_searching() {
            return Ok(self.search_items());
        }
        self.folder_items()
    }

    fn search_items(&self) -> Vec<PaletteItem> {
        search::search(&self.query, &self.catalog)
            .into_iter()
            .map(|entry| PaletteItem::Leaf {
                label: entry.display_name().to_string(),
                type_id: entry.type_id.clone(),
            })
            .collect()
    }

    fn folder_items(&mut self) -> Result<Vec<PaletteItem>, MenuTreeError> {
        self.ensure_tree()?;
        let Some(tree) = self.tree.as_ref() else {
            return Ok(Vec::new());
        };
        let cursor = self.cursor.unwrap_or_else(|| tree.root());
        Ok(tree
            .children(cursor)
            .iter()
            .map(|&child| match tree.type_id(child) {
                Some(type_id) if tree.is_leaf(child) => PaletteItem::Leaf {
                    label: tree.name(child).to_string(),
                    type_id: type_id.clone(),
                },
                _ => PaletteItem::Folder {
                    node: child,
                    label: tree.name(child).to_string(),
                },
            })
            .collect())
    }

    /// Activate a row: descend into folders, surface leaves to the caller.
    pub fn select(&mut self, item: &PaletteItem) -> Selection {
        match item {
            PaletteItem::Folder { node, label } => {
                debug!("palette: descend into {label}");
                self.cursor = Some(*node);
                Selection::Descend
            }
            PaletteItem::Leaf { type_id, .. } => Selection::Create(type_id.clone()),
        }
    }

    /// Move the cursor to the parent folder. A no-op at the root.
    pub fn back(&mut self) {
        if let (Some(tree), Some(cursor)) = (&self.tree, self.cursor)
            && let Some(parent) = tree.parent(cursor)
        {
            self.cursor = Some(parent);
        }
    }

    /// Cursor back to the root and query cleared, as when re-opening the
    /// popup. The built tree is kept.
    pub fn reset(&mut self) {
        if let Some(tree) = &self.tree {
            self.cursor = Some(tree.root());
        }
        self.query.clear();
    }

    /// Breadcrumb for the popup header: path of the current folder.
    pub fn current_path(&self) -> String {
        match (&self.tree, self.cursor) {
            (Some(tree), Some(cursor)) => tree.path_of(cursor),
            _ => String::new(),
        }
    }

    fn ensure_tree(&mut self) -> Result<(), MenuTreeError> {
        if self.tree.is_none() {
            let tree = MenuTree::build(&self.catalog)?;
            debug!("palette: built menu tree for {} entries", self.catalog.len());
            self.cursor = Some(tree.root());
            self.tree = Some(tree);
        }
        if self.cursor.is_none() {
            self.cursor = self.tree.as_ref().map(|t| t.root());
        }
        Ok(())
    }
}
