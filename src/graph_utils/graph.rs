use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::nicify::{last_segment, nicify};
use crate::catalog::registry::{NodeType, NodeTypeId};

// Basic type aliases for clarity
pub type NodeHandle = Uuid;
pub type ConnectionId = Uuid;

/// Grid-space position of a node in the document.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: f32,
    pub y: f32,
}

impl GridPos {
    pub fn new(x: f32, y: f32) -> Self {
        GridPos { x, y }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeHandle,
    pub type_id: NodeTypeId,
    pub title: String,
    pub position: GridPos,
    // Port names copied from the node type at creation time
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_node: NodeHandle,
    pub from_port: String,
    pub to_node: NodeHandle,
    pub to_port: String,
}

/// The graph the palette inserts into. Owns nodes and their port-to-port
/// connections; the palette only ever calls `create_node`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: HashMap<NodeHandle, GraphNode>,
    pub connections: HashMap<ConnectionId, Connection>,
}

impl GraphDocument {
    // Instantiate a new, empty document
    pub fn new() -> Self {
        GraphDocument { nodes: HashMap::new(), connections: HashMap::new() }
    }

    /// Instantiate `ty` at a grid position and return the new node's handle.
    /// This is the outward boundary the create-node popup calls.
    pub fn create_node(&mut self, ty: &NodeType, position: GridPos) -> NodeHandle {
        let id = Uuid::now_v7();
        // Same label the catalog shows the type under
        let title = match &ty.placement {
            Some(p) => last_segment(&p.menu_path, '/').unwrap_or(&p.menu_path).to_string(),
            None => last_segment(&ty.qualified_name, '.')
                .map(nicify)
                .unwrap_or_else(|| "Node".to_string()),
        };
        let node = GraphNode {
            id,
            type_id: ty.id.clone(),
            title,
            position,
            inputs: ty.inputs.iter().map(|p| p.name.clone()).collect(),
            outputs: ty.outputs.iter().map(|p| p.name.clone()).collect(),
        };
        self.nodes.insert(id, node);
        id
    }

    /// Connect an output port to an input port if both endpoints and both
    /// port names exist; returns the connection ID.
    pub fn connect(
        &mut self,
        from_node: NodeHandle,
        from_port: &str,
        to_node: NodeHandle,
        to_port: &str,
    ) -> Option<ConnectionId> {
        let from_ok = self
            .nodes
            .get(&from_node)
            .is_some_and(|n| n.outputs.iter().any(|p| p == from_port));
        let to_ok = self
            .nodes
            .get(&to_node)
            .is_some_and(|n| n.inputs.iter().any(|p| p == to_port));
        if from_ok && to_ok {
            let id = Uuid::now_v7();
            let connection = Connection {
                id,
                from_node,
                from_port: from_port.to_string(),
                to_node,
                to_port: to_port.to_string(),
            };
            self.connections.insert(id, connection);
            Some(id)
        } else {
            None
        }
    }

    pub fn set_node_position(&mut self, id: NodeHandle, position: GridPos) -> bool {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
            true
        } else {
            false
        }
    }

    pub fn rename_node(&mut self, id: NodeHandle, new_title: String) -> bool {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.title = new_title;
            true
        } else {
            false
        }
    }

    // Delete operations
    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    pub fn remove_node(&mut self, id: NodeHandle) -> bool {
        if self.nodes.remove(&id).is_some() {
            // Cascade delete connections touching this node
            let to_remove: Vec<ConnectionId> = self
                .connections
                .iter()
                .filter_map(|(cid, c)| {
                    if c.from_node == id || c.to_node == id { Some(*cid) } else { None }
                })
                .collect();
            for cid in to_remove {
                self.connections.remove(&cid);
            }
            true
        } else {
            false
        }
    }

    pub fn get_node(&self, id: NodeHandle) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn get_connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // Fetch helpers
    pub fn find_nodes_by_type(&self, type_id: &NodeTypeId) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .filter_map(|(&id, node)| if &node.type_id == type_id { Some(id) } else { None })
            .collect()
    }

    pub fn connections_of(&self, id: NodeHandle) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter_map(|(&cid, c)| {
                if c.from_node == id || c.to_node == id { Some(cid) } else { None }
            })
            .collect()
    }
}
