use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::{ConnectionStyle, LayoutMode, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn inset(self, padding: f32) -> Self {
        Self {
            x: self.x + padding,
            y: self.y + padding,
            width: (self.width - padding * 2.0).max(0.0),
            height: (self.height - padding * 2.0).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Point) -> f32 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Every numeric, animatable field of a laid-out node: the box, the icon
/// square, the title band, and the opacity of each drawn part.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NodeGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub icon_x: f32,
    pub icon_y: f32,
    pub icon_width: f32,
    pub title_x: f32,
    pub title_y: f32,
    pub title_width: f32,
    pub title_height: f32,
    pub top_opacity: f32,
    pub left_opacity: f32,
    pub box_opacity: f32,
    pub icon_opacity: f32,
    pub title_opacity: f32,
}

impl NodeGeometry {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn lerp(&self, after: &Self, t: f32) -> Self {
        let mix = |a: f32, b: f32| crate::animate::animate_number(a, b, t);
        Self {
            x: mix(self.x, after.x),
            y: mix(self.y, after.y),
            width: mix(self.width, after.width),
            height: mix(self.height, after.height),
            icon_x: mix(self.icon_x, after.icon_x),
            icon_y: mix(self.icon_y, after.icon_y),
            icon_width: mix(self.icon_width, after.icon_width),
            title_x: mix(self.title_x, after.title_x),
            title_y: mix(self.title_y, after.title_y),
            title_width: mix(self.title_width, after.title_width),
            title_height: mix(self.title_height, after.title_height),
            top_opacity: mix(self.top_opacity, after.top_opacity),
            left_opacity: mix(self.left_opacity, after.left_opacity),
            box_opacity: mix(self.box_opacity, after.box_opacity),
            icon_opacity: mix(self.icon_opacity, after.icon_opacity),
            title_opacity: mix(self.title_opacity, after.title_opacity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionLayout {
    pub style: ConnectionStyle,
    pub stroke: String,
    pub stroke_index: usize,
    pub label: Option<String>,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: NodeId,
    pub title: String,
    pub icon_name: String,
    /// Asset reference from the icon resolver.
    pub icon: String,
    pub stroke: String,
    pub layout: LayoutMode,
    pub children: Vec<NodeId>,
    pub connections: BTreeMap<NodeId, ConnectionLayout>,
    pub geometry: NodeGeometry,
    pub opacity: f32,
}

/// A laid-out snapshot: a scene with pixel geometry for every node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub focus: NodeId,
    pub strokes: Vec<String>,
    pub drawing_opacity: f32,
    pub width: f32,
    pub height: f32,
    pub nodes: BTreeMap<NodeId, NodeLayout>,
}
