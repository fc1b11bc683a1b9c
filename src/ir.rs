use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

pub const ROOT_ID: &str = "top";
pub const DEFAULT_STROKE: &str = "black";
pub const DEFAULT_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// How a node arranges its own children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Column,
    Row,
    Ring,
    #[default]
    Zigzag,
}

impl LayoutMode {
    /// Unrecognized names fall back to zigzag, the default arrangement.
    pub fn from_token(token: &str) -> Self {
        match token {
            "column" => Self::Column,
            "row" => Self::Row,
            "ring" => Self::Ring,
            _ => Self::Zigzag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStyle {
    Line,
    Arrow,
}

impl ConnectionStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "line" => Some(Self::Line),
            "arrow" => Some(Self::Arrow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub style: ConnectionStyle,
    pub stroke: String,
    pub stroke_index: usize,
    pub label: Option<String>,
}

impl Connection {
    pub fn new(style: ConnectionStyle) -> Self {
        Self {
            style,
            stroke: DEFAULT_STROKE.to_string(),
            stroke_index: 0,
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub title: String,
    pub icon_name: String,
    pub children: Vec<NodeId>,
    pub connections: BTreeMap<NodeId, Connection>,
    pub layout: LayoutMode,
    pub stroke: String,
}

impl Node {
    pub fn new(id: &NodeId) -> Self {
        let defaults = derive_defaults(id);
        Self {
            title: defaults.title,
            icon_name: defaults.icon_name,
            children: Vec::new(),
            connections: BTreeMap::new(),
            layout: LayoutMode::default(),
            stroke: DEFAULT_STROKE.to_string(),
        }
    }

    fn root() -> Self {
        Self {
            title: String::new(),
            icon_name: String::new(),
            children: Vec::new(),
            connections: BTreeMap::new(),
            layout: LayoutMode::default(),
            stroke: DEFAULT_STROKE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedDefaults {
    pub title: String,
    pub icon_name: String,
}

/// Display title and icon key for a freshly created node. The namespace is
/// everything up to the first `:`.
pub fn derive_defaults(id: &NodeId) -> DerivedDefaults {
    let bare = match id.as_str().split_once(':') {
        Some((_, rest)) => rest,
        None => id.as_str(),
    };
    DerivedDefaults {
        title: bare.replace('_', " "),
        icon_name: bare.replace('_', ""),
    }
}

/// Typed patch for the style fields of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub layout: Option<LayoutMode>,
    pub stroke: Option<String>,
}

impl NodeStyle {
    /// Returns false for keys a node does not have.
    pub fn set(&mut self, key: &str, value: String) -> bool {
        match key {
            "title" => self.title = Some(value),
            "icon" => self.icon = Some(value),
            "layout" => self.layout = Some(LayoutMode::from_token(&value)),
            "stroke" => self.stroke = Some(value),
            _ => return false,
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, node: &mut Node) {
        if let Some(title) = &self.title {
            node.title = title.clone();
        }
        if let Some(icon) = &self.icon {
            node.icon_name = icon.clone();
        }
        if let Some(layout) = self.layout {
            node.layout = layout;
        }
        if let Some(stroke) = &self.stroke {
            node.stroke = stroke.clone();
        }
    }
}

/// Typed patch for the style fields of a connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionPatch {
    pub stroke: Option<String>,
    pub label: Option<String>,
}

impl ConnectionPatch {
    pub fn set(&mut self, key: &str, value: String) -> bool {
        match key {
            "stroke" => self.stroke = Some(value),
            "label" => self.label = Some(value),
            _ => return false,
        }
        true
    }

    pub fn apply(&self, connection: &mut Connection) {
        if let Some(stroke) = &self.stroke {
            connection.stroke = stroke.clone();
        }
        if let Some(label) = &self.label {
            connection.label = Some(label.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramState {
    pub nodes: BTreeMap<NodeId, Node>,
    pub focus: NodeId,
    pub editing: NodeId,
    pub depth: usize,
    pub strokes: Vec<String>,
    pub drawing_opacity: f32,
    pub markup: Vec<String>,
    pub in_code_block: bool,
}

impl DiagramState {
    pub fn new(depth: usize) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::root(), Node::root());
        Self {
            nodes,
            focus: NodeId::root(),
            editing: NodeId::root(),
            depth,
            strokes: vec![DEFAULT_STROKE.to_string()],
            drawing_opacity: 0.0,
            markup: Vec::new(),
            in_code_block: false,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.children.iter().any(|child| child.as_str() == id))
            .map(|(parent, _)| parent)
    }

    /// True if `ancestor` is `id` itself or lies on the parent chain above it.
    pub fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.parent_of(cur).map(NodeId::as_str);
        }
        false
    }

    /// Removes `id` from every child list. The node itself is kept.
    pub fn detach(&mut self, id: &str) {
        for node in self.nodes.values_mut() {
            node.children.retain(|child| child.as_str() != id);
        }
    }

    /// Returns the node, creating it with derived defaults if absent. Does not
    /// attach it anywhere.
    pub fn ensure_node(&mut self, id: &NodeId) -> &mut Node {
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| Node::new(id))
    }

    /// Palette index of `stroke`, appending it first if it is new.
    pub fn stroke_index(&mut self, stroke: &str) -> usize {
        if let Some(index) = self.strokes.iter().position(|s| s == stroke) {
            return index;
        }
        self.strokes.push(stroke.to_string());
        self.strokes.len() - 1
    }
}

impl Default for DiagramState {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}
