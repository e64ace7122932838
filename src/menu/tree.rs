use thiserror::Error;

use crate::catalog::entry::Catalog;
use crate::catalog::registry::NodeTypeId;

/// Index of a node inside a [`MenuTree`] arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MenuNodeId(usize);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuTreeError {
    /// A path would make a leaf and an interior node share a prefix, or two
    /// entries share the exact same leaf path.
    #[error("menu path {path:?} conflicts with an existing entry at segment {segment:?}")]
    ConflictingPath { path: String, segment: String },
    /// The display path contained no usable segments.
    #[error("menu path {0:?} has no usable segments")]
    EmptyPath(String),
}

#[derive(Debug)]
struct MenuNode {
    // Empty only on the root
    name: String,
    parent: Option<MenuNodeId>,
    // Insertion order is display order
    children: Vec<MenuNodeId>,
    // Present exactly on leaves
    type_id: Option<NodeTypeId>,
}

/// Hierarchy implied by the slash-delimited display paths of a catalog.
/// Interior nodes are menu folders; leaves carry the instantiable type.
#[derive(Debug)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl MenuTree {
    pub fn new() -> Self {
        MenuTree {
            nodes: vec![MenuNode {
                name: String::new(),
                parent: None,
                children: Vec::new(),
                type_id: None,
            }],
        }
    }

    /// Build the full tree for a resolved catalog. Fails fast on the first
    /// conflicting or empty path.
    pub fn build(catalog: &Catalog) -> Result<Self, MenuTreeError> {
        let mut tree = MenuTree::new();
        for entry in catalog.entries() {
            let segments: Vec<&str> = entry.path_segments().collect();
            tree.insert(&entry.display_path, &segments, entry.type_id.clone())?;
        }
        Ok(tree)
    }

    /// Insert one entry. Interior nodes are created for every segment but
    /// the last and merged with existing folders of the same name; the last
    /// segment becomes a leaf carrying `type_id`.
    pub fn insert(
        &mut self,
        display_path: &str,
        segments: &[&str],
        type_id: NodeTypeId,
    ) -> Result<(), MenuTreeError> {
        let Some((last, interior)) = segments.split_last() else {
            return Err(MenuTreeError::EmptyPath(display_path.to_string()));
        };
        let mut cursor = self.root();
        for &segment in interior {
            cursor = match self.child_named(cursor, segment) {
                Some(child) => {
                    if self.node(child).type_id.is_some() {
                        // descending through an existing leaf
                        return Err(MenuTreeError::ConflictingPath {
                            path: display_path.to_string(),
                            segment: segment.to_string(),
                        });
                    }
                    child
                }
                None => self.push_child(cursor, segment, None),
            };
        }
        if self.child_named(cursor, last).is_some() {
            // either a duplicate leaf path or a leaf shadowing a folder
            return Err(MenuTreeError::ConflictingPath {
                path: display_path.to_string(),
                segment: last.to_string(),
            });
        }
        self.push_child(cursor, last, Some(type_id));
        Ok(())
    }

    pub fn root(&self) -> MenuNodeId {
        MenuNodeId(0)
    }

    pub fn name(&self, id: MenuNodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: MenuNodeId) -> Option<MenuNodeId> {
        self.node(id).parent
    }

    /// Immediate children in insertion order.
    pub fn children(&self, id: MenuNodeId) -> &[MenuNodeId] {
        &self.node(id).children
    }

    pub fn is_leaf(&self, id: MenuNodeId) -> bool {
        self.node(id).children.is_empty()
    }

    pub fn type_id(&self, id: MenuNodeId) -> Option<&NodeTypeId> {
        self.node(id).type_id.as_ref()
    }

    pub fn child_named(&self, id: MenuNodeId, name: &str) -> Option<MenuNodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).name == name)
    }

    /// Follow a segment path from the root; None if any hop is missing.
    pub fn descend<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Option<MenuNodeId> {
        let mut cursor = self.root();
        for segment in segments {
            cursor = self.child_named(cursor, segment)?;
        }
        Some(cursor)
    }

    /// Full path of a node, root excluded, joined with '/'.
    pub fn path_of(&self, id: MenuNodeId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            if c != self.root() {
                segments.push(self.node(c).name.as_str());
            }
            cursor = self.node(c).parent;
        }
        segments.reverse();
        segments.join("/")
    }

    fn node(&self, id: MenuNodeId) -> &MenuNode {
        &self.nodes[id.0]
    }

    fn push_child(
        &mut self,
        parent: MenuNodeId,
        name: &str,
        type_id: Option<NodeTypeId>,
    ) -> MenuNodeId {
        let id = MenuNodeId(self.nodes.len());
        self.nodes.push(MenuNode {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            type_id,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

impl Default for MenuTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::CatalogEntry;

    fn entry(id: &str, path: &str) -> CatalogEntry {
        CatalogEntry {
            type_id: NodeTypeId::from(id),
            display_path: path.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn builds_merged_folders_in_insertion_order() {
        let catalog = Catalog::from_entries(vec![
            entry("t1", "Math/Add"),
            entry("t2", "Math/Subtract"),
            entry("t3", "Logic/And"),
        ]);
        let tree = MenuTree::build(&catalog).unwrap();
        let top: Vec<&str> = tree
            .children(tree.root())
            .iter()
            .map(|&c| tree.name(c))
            .collect();
        assert_eq!(top, vec!["Math", "Logic"]);

        let math = tree.child_named(tree.root(), "Math").unwrap();
        let math_children: Vec<&str> =
            tree.children(math).iter().map(|&c| tree.name(c)).collect();
        assert_eq!(math_children, vec!["Add", "Subtract"]);
        assert!(!tree.is_leaf(math));
    }

    #[test]
    fn leaves_carry_their_type_ids() {
        let catalog = Catalog::from_entries(vec![
            entry("t1", "Math/Add"),
            entry("t2", "Solo"),
        ]);
        let tree = MenuTree::build(&catalog).unwrap();
        let add = tree.descend(["Math", "Add"]).unwrap();
        assert!(tree.is_leaf(add));
        assert_eq!(tree.type_id(add), Some(&NodeTypeId::from("t1")));

        // single-segment path is a direct leaf under the root
        let solo = tree.child_named(tree.root(), "Solo").unwrap();
        assert!(tree.is_leaf(solo));
        assert_eq!(tree.type_id(solo), Some(&NodeTypeId::from("t2")));
        assert_eq!(tree.parent(solo), Some(tree.root()));
    }

    #[test]
    fn path_of_round_trips() {
        let catalog = Catalog::from_entries(vec![entry("t", "A/B/C")]);
        let tree = MenuTree::build(&catalog).unwrap();
        let c = tree.descend(["A", "B", "C"]).unwrap();
        assert_eq!(tree.path_of(c), "A/B/C");
        assert_eq!(tree.path_of(tree.root()), "");
    }

    #[test]
    fn leaf_then_folder_conflict_is_rejected() {
        let catalog =
            Catalog::from_entries(vec![entry("t1", "A"), entry("t2", "A/B")]);
        let err = MenuTree::build(&catalog).unwrap_err();
        assert_eq!(
            err,
            MenuTreeError::ConflictingPath { path: "A/B".into(), segment: "A".into() }
        );
    }

    #[test]
    fn folder_then_leaf_conflict_is_rejected() {
        let catalog =
            Catalog::from_entries(vec![entry("t1", "A/B"), entry("t2", "A")]);
        let err = MenuTree::build(&catalog).unwrap_err();
        assert_eq!(
            err,
            MenuTreeError::ConflictingPath { path: "A".into(), segment: "A".into() }
        );
    }

    #[test]
    fn duplicate_leaf_path_is_rejected() {
        let catalog =
            Catalog::from_entries(vec![entry("t1", "A/B"), entry("t2", "A/B")]);
        assert!(matches!(
            MenuTree::build(&catalog),
            Err(MenuTreeError::ConflictingPath { .. })
        ));
    }

    #[test]
    fn empty_segments_are_dropped_and_all_empty_errors() {
        let catalog = Catalog::from_entries(vec![entry("t1", "A//B/")]);
        let tree = MenuTree::build(&catalog).unwrap();
        assert!(tree.descend(["A", "B"]).is_some());

        let catalog = Catalog::from_entries(vec![entry("t2", "///")]);
        assert_eq!(
            MenuTree::build(&catalog).unwrap_err(),
            MenuTreeError::EmptyPath("///".into())
        );
    }
}
