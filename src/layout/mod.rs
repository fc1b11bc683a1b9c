mod arrange;
pub mod routing;
pub(crate) mod types;
pub use arrange::*;
pub use routing::{ConnectorPath, LabelBox, route};
pub use types::*;

use crate::config::LayoutConfig;
use crate::icons::IconResolver;
use crate::ir::{LayoutMode, NodeId};
use crate::visibility::{Scene, SceneNode};
use std::collections::BTreeMap;
use tracing::debug_span;

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

struct LayoutPass<'a> {
    scene: &'a Scene,
    icons: &'a dyn IconResolver,
    config: &'a LayoutConfig,
    nodes: BTreeMap<NodeId, NodeLayout>,
}

/// Lays out `scene` inside `viewport`, giving the focus node the whole area.
pub fn compute_layout(
    scene: &Scene,
    viewport: Rect,
    icons: &dyn IconResolver,
    config: &LayoutConfig,
) -> Layout {
    let _span = debug_span!("layout", focus = %scene.focus, nodes = scene.nodes.len()).entered();
    let mut pass = LayoutPass {
        scene,
        icons,
        config,
        nodes: BTreeMap::new(),
    };
    pass.layout_node(&scene.focus, viewport, None);

    Layout {
        focus: scene.focus.clone(),
        strokes: scene.strokes.clone(),
        drawing_opacity: scene.drawing_opacity,
        width: viewport.width,
        height: viewport.height,
        nodes: pass.nodes,
    }
}

impl LayoutPass<'_> {
    /// `incoming` is the arrangement the parent used to place this node.
    fn layout_node(&mut self, id: &NodeId, rect: Rect, incoming: Option<LayoutMode>) {
        let Some(node) = self.scene.nodes.get(id) else {
            return;
        };
        if self.nodes.contains_key(id) {
            return;
        }
        let has_icon = !node.icon_name.is_empty();
        let has_title = !node.title.is_empty();

        let mut g = NodeGeometry {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            top_opacity: flag(incoming == Some(LayoutMode::Column)),
            left_opacity: flag(incoming == Some(LayoutMode::Row)),
            icon_opacity: flag(has_icon),
            title_opacity: flag(has_title),
            ..NodeGeometry::default()
        };
        // A separator line already delimits the node; skip the full border.
        g.box_opacity = flag(g.top_opacity == 0.0 && g.left_opacity == 0.0);

        let Rect {
            x,
            y,
            width: w,
            height: h,
        } = rect;
        let mut slots = Vec::new();
        if node.children.is_empty() && g.box_opacity > 0.0 {
            let iw = w.min(h) * self.config.leaf_icon_fraction;
            g.icon_width = iw;
            g.icon_x = x + w / 2.0 - iw / 2.0;
            g.icon_y = y;
            g.title_x = x;
            g.title_y = y + iw;
            g.title_width = w;
            g.title_height = iw;
            if !has_icon {
                g.title_y = y + h / 2.0 - iw / 2.0;
            }
            if !has_title {
                g.icon_y = y + h / 2.0 - iw / 2.0;
            }
            if has_icon {
                g.x = g.icon_x;
                g.y = g.icon_y;
                g.width = iw;
                g.height = iw;
            }
        } else {
            let iw = w.min(h) * self.config.band_icon_fraction;
            g.icon_width = iw;
            g.icon_x = x;
            g.icon_y = y;
            g.title_x = x + iw;
            g.title_y = y;
            g.title_width = w - 2.0 * iw;
            g.title_height = iw;
            let mut inner = rect.inset(self.config.margin);
            if has_title || has_icon {
                inner.y += iw;
                inner.height = (inner.height - iw).max(0.0);
            }
            slots = self.child_slots(node, inner);
        }

        self.nodes.insert(id.clone(), self.node_layout(id, node, g));
        for (child, slot, mode) in slots {
            self.layout_node(&child, slot, mode);
        }
    }

    fn child_slots(&self, node: &SceneNode, inner: Rect) -> Vec<(NodeId, Rect, Option<LayoutMode>)> {
        let count = node.children.len();
        let config = self.config;
        let (rects, mode) = match node.layout {
            LayoutMode::Column => (column_slots(inner, count), Some(LayoutMode::Column)),
            LayoutMode::Row => (row_slots(inner, count), Some(LayoutMode::Row)),
            LayoutMode::Ring => {
                // A lone child fills the ring's area like a plain box.
                let mode = (count > 1).then_some(LayoutMode::Ring);
                (ring_slots(inner, count, config.aspect_ratio), mode)
            }
            LayoutMode::Zigzag => (
                zigzag_slots(inner, count, config.aspect_ratio, config.zigzag_fill),
                Some(LayoutMode::Zigzag),
            ),
        };
        node.children
            .iter()
            .cloned()
            .zip(rects)
            .map(|(child, rect)| (child, rect, mode))
            .collect()
    }

    fn node_layout(&self, id: &NodeId, node: &SceneNode, geometry: NodeGeometry) -> NodeLayout {
        NodeLayout {
            id: id.clone(),
            title: node.title.clone(),
            icon_name: node.icon_name.clone(),
            icon: self.icons.resolve(&node.icon_name),
            stroke: node.stroke.clone(),
            layout: node.layout,
            children: node.children.clone(),
            connections: node
                .connections
                .iter()
                .map(|(to, connection)| {
                    (
                        to.clone(),
                        ConnectionLayout {
                            style: connection.style,
                            stroke: connection.stroke.clone(),
                            stroke_index: connection.stroke_index,
                            label: connection.label.clone(),
                            opacity: 1.0,
                        },
                    )
                })
                .collect(),
            geometry,
            opacity: 1.0,
        }
    }
}
