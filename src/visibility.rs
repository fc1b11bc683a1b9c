use crate::ir::{Connection, DiagramState, LayoutMode, NodeId};
use std::collections::BTreeMap;

/// A node as seen through the visibility filter. Folded nodes have no
/// children and an empty title.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub title: String,
    pub icon_name: String,
    pub children: Vec<NodeId>,
    pub connections: BTreeMap<NodeId, Connection>,
    pub layout: LayoutMode,
    pub stroke: String,
}

/// The pruned, deep-copied part of a [`DiagramState`] that can be seen from
/// its focus.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub focus: NodeId,
    pub depth: usize,
    pub strokes: Vec<String>,
    pub drawing_opacity: f32,
    pub nodes: BTreeMap<NodeId, SceneNode>,
}

pub fn filter_visible(state: &DiagramState) -> Scene {
    let mut nodes = BTreeMap::new();
    collect_visible(state, &mut nodes, &state.focus, state.depth);

    // Connections can only be judged once the whole visible set is known.
    let visible: Vec<NodeId> = nodes.keys().cloned().collect();
    for (from, scene_node) in nodes.iter_mut() {
        let Some(node) = state.node(from.as_str()) else {
            continue;
        };
        scene_node.connections = node
            .connections
            .iter()
            .filter(|(to, _)| visible.binary_search(to).is_ok())
            .map(|(to, connection)| (to.clone(), connection.clone()))
            .collect();
    }

    Scene {
        focus: state.focus.clone(),
        depth: state.depth,
        strokes: state.strokes.clone(),
        drawing_opacity: state.drawing_opacity,
        nodes,
    }
}

fn collect_visible(
    state: &DiagramState,
    out: &mut BTreeMap<NodeId, SceneNode>,
    id: &NodeId,
    depth: usize,
) {
    let Some(node) = state.node(id.as_str()) else {
        return;
    };
    let mut scene_node = SceneNode {
        title: node.title.clone(),
        icon_name: node.icon_name.clone(),
        children: node.children.clone(),
        connections: BTreeMap::new(),
        layout: node.layout,
        stroke: node.stroke.clone(),
    };
    if depth == 0 {
        scene_node.children.clear();
        scene_node.title.clear();
        out.insert(id.clone(), scene_node);
        return;
    }
    out.insert(id.clone(), scene_node);
    for child in &node.children {
        if !out.contains_key(child) {
            collect_visible(state, out, child, depth - 1);
        }
    }
}
