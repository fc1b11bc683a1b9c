//! Cross-fading between two laid-out snapshots.
//!
//! Nodes present on both sides move, nodes that disappear fade out, new
//! nodes fade in. Non-numeric attributes such as stroke colour or title
//! switch to the new value immediately.

use crate::ir::NodeId;
use crate::layout::{ConnectionLayout, Layout, NodeLayout};
use std::collections::BTreeMap;

/// Linear blend, written so that fraction 0 and 1 reproduce the endpoints
/// exactly.
pub fn animate_number(before: f32, after: f32, fraction: f32) -> f32 {
    before * (1.0 - fraction) + after * fraction
}

/// Blends `before` into `after`. The inputs are left untouched so the same
/// pair can be evaluated once per frame.
pub fn animate(before: &Layout, after: &Layout, fraction: f32) -> Layout {
    let t = fraction.clamp(0.0, 1.0);
    let mut nodes = BTreeMap::new();

    for (id, node) in &before.nodes {
        if let Some(blended) = animate_node(Some(node), after.nodes.get(id), t) {
            nodes.insert(id.clone(), blended);
        }
    }
    for (id, node) in &after.nodes {
        if !before.nodes.contains_key(id)
            && let Some(blended) = animate_node(None, Some(node), t)
        {
            nodes.insert(id.clone(), blended);
        }
    }

    Layout {
        focus: after.focus.clone(),
        strokes: after.strokes.clone(),
        drawing_opacity: animate_number(before.drawing_opacity, after.drawing_opacity, t),
        width: after.width,
        height: after.height,
        nodes,
    }
}

fn animate_node(
    before: Option<&NodeLayout>,
    after: Option<&NodeLayout>,
    t: f32,
) -> Option<NodeLayout> {
    let mut result = after.or(before)?.clone();
    match (before, after) {
        (Some(before), Some(after)) => {
            result.geometry = before.geometry.lerp(&after.geometry, t);
            result.opacity = 1.0;
        }
        (Some(_), None) => result.opacity = 1.0 - t,
        _ => result.opacity = t,
    }
    result.connections = animate_connections(
        before.map(|n| &n.connections),
        after.map(|n| &n.connections),
        t,
    );
    Some(result)
}

/// Same three cases as nodes, per directed pair. A connection has no
/// geometry of its own; only its opacity changes.
fn animate_connections(
    before: Option<&BTreeMap<NodeId, ConnectionLayout>>,
    after: Option<&BTreeMap<NodeId, ConnectionLayout>>,
    t: f32,
) -> BTreeMap<NodeId, ConnectionLayout> {
    let empty = BTreeMap::new();
    let before = before.unwrap_or(&empty);
    let after = after.unwrap_or(&empty);
    let mut result = BTreeMap::new();

    for (to, connection) in before {
        let blended = match after.get(to) {
            Some(next) => ConnectionLayout {
                opacity: 1.0,
                ..next.clone()
            },
            None => ConnectionLayout {
                opacity: 1.0 - t,
                ..connection.clone()
            },
        };
        result.insert(to.clone(), blended);
    }
    for (to, connection) in after {
        if !before.contains_key(to) {
            result.insert(
                to.clone(),
                ConnectionLayout {
                    opacity: t,
                    ..connection.clone()
                },
            );
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::icons::BlankIcons;
    use crate::layout::{Rect, compute_layout};
    use crate::parser::interpret_text;
    use crate::visibility::filter_visible;

    fn layout_of(text: &str) -> Layout {
        let scene = filter_visible(&interpret_text(text));
        compute_layout(
            &scene,
            Rect::new(0.0, 0.0, 1200.0, 800.0),
            &BlankIcons,
            &LayoutConfig::default(),
        )
    }

    fn pair() -> (Layout, Layout) {
        (
            layout_of("add a\nadd b\narrow a b red"),
            layout_of("add a\nadd c layout row stroke blue\nedit c\nadd d\nline a c\nslide"),
        )
    }

    #[test]
    fn start_matches_before_geometry() {
        let (before, after) = pair();
        let frame = animate(&before, &after, 0.0);
        for (id, node) in &before.nodes {
            if after.nodes.contains_key(id) {
                assert_eq!(frame.nodes[id].geometry, node.geometry, "node {id}");
                assert_eq!(frame.nodes[id].opacity, 1.0);
            }
        }
        assert_eq!(frame.nodes["b"].opacity, 1.0);
        assert_eq!(frame.nodes["d"].opacity, 0.0);
        assert_eq!(frame.drawing_opacity, 1.0);
    }

    #[test]
    fn end_matches_after_geometry() {
        let (before, after) = pair();
        let frame = animate(&before, &after, 1.0);
        for (id, node) in &after.nodes {
            assert_eq!(frame.nodes[id].geometry, node.geometry, "node {id}");
            assert_eq!(frame.nodes[id].opacity, 1.0);
        }
        // b only exists before and has fully faded
        assert_eq!(frame.nodes["b"].opacity, 0.0);
        assert_eq!(frame.drawing_opacity, 0.0);
        assert_eq!(frame.strokes, after.strokes);
    }

    #[test]
    fn midpoint_blends_and_snaps() {
        let (before, after) = pair();
        let frame = animate(&before, &after, 0.5);
        let a0 = &before.nodes["a"].geometry;
        let a1 = &after.nodes["a"].geometry;
        let a = &frame.nodes["a"];
        assert!((a.geometry.x - (a0.x + a1.x) / 2.0).abs() < 1e-3);
        assert_eq!(a.opacity, 1.0);
        assert_eq!(frame.nodes["b"].opacity, 0.5);
        assert_eq!(frame.nodes["c"].opacity, 0.5);
        assert_eq!(frame.nodes["c"].stroke, "blue");

        let out = &a.connections;
        assert_eq!(out["b"].opacity, 0.5);
        assert_eq!(out["c"].opacity, 0.5);
    }

    #[test]
    fn shared_connections_take_the_new_style() {
        let before = layout_of("add a\nadd b\narrow a b red");
        let after = layout_of("add a\nadd b\nline a b label hi");
        let frame = animate(&before, &after, 0.25);
        let ab = &frame.nodes["a"].connections["b"];
        assert_eq!(ab.opacity, 1.0);
        assert_eq!(ab.stroke, "black");
        assert_eq!(ab.label.as_deref(), Some("hi"));
    }

    #[test]
    fn reverse_direction_is_a_different_connection() {
        let before = layout_of("add a\nadd b\narrow a b");
        let after = layout_of("add a\nadd b\narrow b a");
        let frame = animate(&before, &after, 0.25);
        assert_eq!(frame.nodes["a"].connections["b"].opacity, 0.75);
        assert_eq!(frame.nodes["b"].connections["a"].opacity, 0.25);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let (before, after) = pair();
        let (b, a) = (before.clone(), after.clone());
        let _ = animate(&before, &after, 0.3);
        let _ = animate(&before, &after, 0.7);
        assert_eq!(before, b);
        assert_eq!(after, a);
    }
}
