use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for an instantiable node type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeTypeId(String);

impl NodeTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeTypeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeTypeId {
    fn from(s: &str) -> Self {
        NodeTypeId(s.to_string())
    }
}

/// Named input or output port declared by a node type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
}

impl PortSpec {
    pub fn new(name: impl Into<String>) -> Self {
        PortSpec { name: name.into() }
    }
}

/// Explicit menu placement for a node type: a slash-delimited menu path and
/// optional extra search tags. Types without one get a path derived from
/// their qualified name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuPlacement {
    pub menu_path: String,
    pub tags: Vec<String>,
}

impl MenuPlacement {
    pub fn new(menu_path: impl Into<String>) -> Self {
        MenuPlacement { menu_path: menu_path.into(), tags: Vec::new() }
    }

    pub fn with_tags<I, S>(menu_path: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MenuPlacement {
            menu_path: menu_path.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// An instantiable node type as supplied by the host's type discovery.
#[derive(Clone, Debug)]
pub struct NodeType {
    pub id: NodeTypeId,
    // Dot-separated, namespace-style ("weave.math.AddValues")
    pub qualified_name: String,
    pub placement: Option<MenuPlacement>,
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
}

impl NodeType {
    pub fn new(id: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        NodeType {
            id: NodeTypeId::new(id),
            qualified_name: qualified_name.into(),
            placement: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn placed(mut self, placement: MenuPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_inputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = names.into_iter().map(PortSpec::new).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = names.into_iter().map(PortSpec::new).collect();
        self
    }
}

/// Ordered collection of the node types known to an editor session.
/// Registration order is the catalog's original order; search results and
/// menu listings derive from it.
pub struct NodeTypeRegistry {
    types: Vec<NodeType>,
    by_id: HashMap<NodeTypeId, usize>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        NodeTypeRegistry { types: Vec::new(), by_id: HashMap::new() }
    }

    /// Register a type. A second registration with the same id replaces the
    /// first in place, keeping its position.
    pub fn register(&mut self, ty: NodeType) {
        if let Some(&idx) = self.by_id.get(&ty.id) {
            self.types[idx] = ty;
        } else {
            self.by_id.insert(ty.id.clone(), self.types.len());
            self.types.push(ty);
        }
    }

    pub fn get(&self, id: &NodeTypeId) -> Option<&NodeType> {
        self.by_id.get(id).map(|&idx| &self.types[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The demo node set shipped with the editor binary.
    pub fn builtin() -> Self {
        let mut reg = NodeTypeRegistry::new();
        reg.register(
            NodeType::new("math.add", "weave.math.AddValues")
                .placed(MenuPlacement::with_tags("Math/Add", ["sum", "plus", "arithmetic"]))
                .with_inputs(["a", "b"])
                .with_outputs(["result"]),
        );
        reg.register(
            NodeType::new("math.subtract", "weave.math.SubtractValues")
                .placed(MenuPlacement::with_tags("Math/Subtract", ["minus", "difference", "arithmetic"]))
                .with_inputs(["a", "b"])
                .with_outputs(["result"]),
        );
        reg.register(
            NodeType::new("math.multiply", "weave.math.MultiplyValues")
                .placed(MenuPlacement::with_tags("Math/Multiply", ["product", "times", "arithmetic"]))
                .with_inputs(["a", "b"])
                .with_outputs(["result"]),
        );
        reg.register(
            NodeType::new("math.clamp", "weave.math.ClampValue")
                .placed(MenuPlacement::with_tags("Math/Clamp", ["limit", "range"]))
                .with_inputs(["value", "min", "max"])
                .with_outputs(["result"]),
        );
        reg.register(
            NodeType::new("logic.and", "weave.logic.AndGate")
                .placed(MenuPlacement::with_tags("Logic/And", ["boolean", "gate"]))
                .with_inputs(["a", "b"])
                .with_outputs(["out"]),
        );
        reg.register(
            NodeType::new("logic.or", "weave.logic.OrGate")
                .placed(MenuPlacement::with_tags("Logic/Or", ["boolean", "gate"]))
                .with_inputs(["a", "b"])
                .with_outputs(["out"]),
        );
        reg.register(
            NodeType::new("logic.not", "weave.logic.NotGate")
                .placed(MenuPlacement::with_tags("Logic/Not", ["boolean", "gate", "invert"]))
                .with_inputs(["in"])
                .with_outputs(["out"]),
        );
        reg.register(
            NodeType::new("logic.branch", "weave.logic.Branch")
                .placed(MenuPlacement::with_tags("Logic/Branch", ["if", "condition", "select"]))
                .with_inputs(["condition", "then", "else"])
                .with_outputs(["out"]),
        );
        reg.register(
            NodeType::new("io.constant", "weave.io.ConstantValue")
                .placed(MenuPlacement::with_tags("Input/Constant", ["literal", "value"]))
                .with_outputs(["value"]),
        );
        reg.register(
            NodeType::new("io.time", "weave.io.TimeSource")
                .placed(MenuPlacement::with_tags("Input/Time", ["clock", "seconds"]))
                .with_outputs(["seconds"]),
        );
        reg.register(
            NodeType::new("io.output", "weave.io.GraphOutput")
                .placed(MenuPlacement::with_tags("Output/Graph Output", ["result", "sink"]))
                .with_inputs(["value"]),
        );
        // Types without a placement exercise the derived-path branch:
        // "weave.string.ConcatStrings" -> "Weave/String/Concat Strings"
        reg.register(
            NodeType::new("string.concat", "weave.string.ConcatStrings")
                .with_inputs(["a", "b"])
                .with_outputs(["out"]),
        );
        reg.register(
            NodeType::new("string.format", "weave.string.FormatString")
                .with_inputs(["template", "value"])
                .with_outputs(["out"]),
        );
        reg
    }
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
