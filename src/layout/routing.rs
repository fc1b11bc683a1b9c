//! Circular-arc connectors between two boxes.
//!
//! The arc is the circle through both box centres whose radius is twice the
//! half-distance between them. Curved connectors cannot be mistaken for box
//! edges, and the circle meets each box edge at a closed-form point.

use serde::Serialize;

use super::{ConnectionLayout, Point, Rect};

/// Fraction the label anchor is pushed from the chord midpoint towards the
/// outside of the arc.
const LABEL_BULGE: f32 = 0.09;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelBox {
    pub x: f32,
    pub y: f32,
    /// Side length of the square the label is centred in.
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorPath {
    pub start: Point,
    pub end: Point,
    pub radius: f32,
    pub center: Point,
    pub label: Option<LabelBox>,
}

/// Routes a connector from `from` to `to`. `None` means there is nothing
/// sensible to draw this frame (coincident centres, non-finite geometry).
pub fn route(from: Rect, to: Rect, connection: &ConnectionLayout) -> Option<ConnectorPath> {
    let c1 = from.center();
    let c2 = to.center();
    let half = Point::new((c1.x - c2.x) / 2.0, (c1.y - c2.y) / 2.0);
    let half_sq = half.x * half.x + half.y * half.y;
    if !(half_sq > 0.0) || !half_sq.is_finite() {
        return None;
    }
    let radius_sq = 4.0 * half_sq;
    let radius = radius_sq.sqrt();
    // Offset from the chord midpoint to the circle centre, in units of the
    // perpendicular half-chord.
    let m = -((radius_sq - half_sq) / half_sq).sqrt();
    let center = Point::new(
        m * half.y + (c1.x + c2.x) / 2.0,
        -m * half.x + (c1.y + c2.y) / 2.0,
    );

    let start = edge_crossing(center, radius, from, c2);
    let end = edge_crossing(center, radius, to, c1);
    if !start.is_finite() || !end.is_finite() || !center.is_finite() {
        return None;
    }

    let label = connection.label.as_ref().map(|_| {
        let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        LabelBox {
            x: (1.0 + LABEL_BULGE) * mid.x - LABEL_BULGE * center.x,
            y: (1.0 + LABEL_BULGE) * mid.y - LABEL_BULGE * center.y,
            size: start.distance_squared(end).sqrt(),
        }
    });

    Some(ConnectorPath {
        start,
        end,
        radius,
        center,
        label,
    })
}

/// Where the circle leaves `rect` heading for `target`: the edge crossing
/// nearest to `target`, if any crossing is nearer than the rectangle's own
/// centre. Otherwise the centre itself.
///
/// A rectangle that contains `target` usually has no such crossing, so its
/// connector ends at the centre.
fn edge_crossing(center: Point, radius: f32, rect: Rect, target: Point) -> Point {
    let mut best_point = rect.center();
    let mut best = best_point.distance_squared(target);

    // (horizontal edge, fixed coordinate, span start, span end)
    let edges = [
        (false, rect.x, rect.y, rect.bottom()),
        (false, rect.right(), rect.y, rect.bottom()),
        (true, rect.y, rect.x, rect.right()),
        (true, rect.bottom(), rect.x, rect.right()),
    ];
    for (horizontal, fixed, lo, hi) in edges {
        let (ca, cb, ta, tb) = if horizontal {
            (center.y, center.x, target.y, target.x)
        } else {
            (center.x, center.y, target.x, target.y)
        };
        let d2 = radius * radius - (fixed - ca).powi(2);
        if d2 < 0.0 {
            continue;
        }
        let d = d2.sqrt();
        for along in [cb - d, cb + d] {
            if along < lo || along > hi {
                continue;
            }
            let dz = (fixed - ta).powi(2) + (along - tb).powi(2);
            if dz < best {
                best = dz;
                best_point = if horizontal {
                    Point::new(along, fixed)
                } else {
                    Point::new(fixed, along)
                };
            }
        }
    }
    best_point
}
