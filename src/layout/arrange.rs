//! Slot computation for the four child arrangements. Each function returns
//! one rectangle per child, in child order.

use std::f32::consts::PI;

use super::Rect;

/// Equal-height horizontal bands.
pub fn column_slots(rect: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let ih = rect.height / count as f32;
    (0..count)
        .map(|i| Rect::new(rect.x, rect.y + i as f32 * ih, rect.width, ih))
        .collect()
}

/// Equal-width vertical bands.
pub fn row_slots(rect: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let iw = rect.width / count as f32;
    (0..count)
        .map(|i| Rect::new(rect.x + i as f32 * iw, rect.y, iw, rect.height))
        .collect()
}

/// Children on an ellipse inscribed in `rect`, starting at the bottom and
/// running clockwise. A single child takes the whole rectangle.
pub fn ring_slots(rect: Rect, count: usize, aspect: f32) -> Vec<Rect> {
    match count {
        0 => return Vec::new(),
        1 => return vec![rect],
        _ => {}
    }
    let Rect {
        x,
        y,
        width: w,
        height: h,
    } = rect;
    let a = 2.0 * PI / count as f32;
    let ratio = 2.0 * (a / 2.0).sin();
    let (iw, ih) = if w > h {
        let r = h / (1.0 + ratio);
        let ih = r * ratio / 2.0;
        (aspect * ih, ih)
    } else {
        let r = w / (1.0 + ratio);
        let iw = r * ratio / 2.0;
        (iw, iw / aspect)
    };
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI - (i + 1) as f32 * a;
            let ix = x + w / 2.0 + (w - iw) * angle.cos() / 2.0 - iw / 2.0;
            let iy = y + h / 2.0 - (h - ih) * angle.sin() / 2.0 - ih / 2.0;
            Rect::new(ix, iy, iw, ih)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GridFit {
    columns: usize,
    rows: usize,
    item_width: f32,
    item_height: f32,
}

/// Probes column counts upwards and keeps the last one before the covered
/// area first drops. This is a greedy local maximum, not an optimal packing.
fn best_grid(rect: Rect, count: usize, aspect: f32) -> GridFit {
    let mut best_area = 0.0;
    let mut best = GridFit {
        columns: 1,
        rows: count,
        item_width: 0.0,
        item_height: 0.0,
    };
    for columns in 1..=count {
        let rows = count.div_ceil(columns);
        let item_height = (rect.width / columns as f32 / aspect).min(rect.height / rows as f32);
        let item_width = (rect.width / columns as f32).min(aspect * rect.height / rows as f32);
        let area = item_width * item_height * (columns * rows) as f32;
        if area < best_area {
            break;
        }
        best_area = area;
        best = GridFit {
            columns,
            rows,
            item_width,
            item_height,
        };
    }
    best
}

/// Rows filled alternately left-to-right and right-to-left so reading order
/// snakes through the grid. Rows may hold different numbers of children.
pub fn zigzag_slots(rect: Rect, count: usize, aspect: f32, fill: f32) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let fit = best_grid(rect, count, aspect);
    let rows = fit.rows;
    let iw = fit.item_width * fill;
    let ih = fit.item_height * fill;
    let vm = (rect.height - rows as f32 * ih) / (rows + 1) as f32;

    (0..count)
        .map(|i| {
            let row = i * rows / count;
            let row_start = (row * count).div_ceil(rows);
            let column = i - row_start;
            let in_row = ((row + 1) * count).div_ceil(rows) - row_start;
            let hm = (rect.width - in_row as f32 * iw) / (in_row + 1) as f32;
            let c = column as f32;
            let offset = if row % 2 == 1 {
                rect.width - (c + 1.0) * hm - (c + 1.0) * iw
            } else {
                (c + 1.0) * hm + c * iw
            };
            Rect::new(
                rect.x + offset,
                rect.y + (row + 1) as f32 * vm + row as f32 * ih,
                iw,
                ih,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPECT: f32 = 4.0 / 3.0;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn column_partitions_height_exactly() {
        let rect = Rect::new(10.0, 20.0, 300.0, 600.0);
        let slots = column_slots(rect, 4);
        assert_eq!(slots.len(), 4);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(slot.height, 150.0);
            assert_eq!(slot.x, rect.x);
            assert_eq!(slot.width, rect.width);
            assert_eq!(slot.y, 20.0 + 150.0 * i as f32);
        }
        let total: f32 = slots.iter().map(|s| s.height).sum();
        assert_eq!(total, rect.height);
        assert!(column_slots(rect, 0).is_empty());
    }

    #[test]
    fn row_partitions_width() {
        let slots = row_slots(Rect::new(0.0, 0.0, 300.0, 90.0), 3);
        let xs: Vec<f32> = slots.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![0.0, 100.0, 200.0]);
        assert!(slots.iter().all(|s| s.width == 100.0 && s.height == 90.0));
    }

    #[test]
    fn ring_starts_at_the_bottom_and_turns_clockwise() {
        let rect = Rect::new(0.0, 0.0, 400.0, 300.0);
        let slots = ring_slots(rect, 4, ASPECT);
        let centers: Vec<_> = slots.iter().map(Rect::center).collect();
        // bottom, left, top, right
        assert!(approx(centers[0].x, 200.0) && centers[0].y > 150.0);
        assert!(centers[1].x < 200.0 && approx(centers[1].y, 150.0));
        assert!(approx(centers[2].x, 200.0) && centers[2].y < 150.0);
        assert!(centers[3].x > 200.0 && approx(centers[3].y, 150.0));
        assert!(approx(slots[0].width / slots[0].height, ASPECT));
        for slot in &slots {
            assert!(slot.x >= -1e-3 && slot.right() <= 400.0 + 1e-3);
            assert!(slot.y >= -1e-3 && slot.bottom() <= 300.0 + 1e-3);
        }
    }

    #[test]
    fn ring_with_one_child_uses_the_whole_rect() {
        let rect = Rect::new(5.0, 5.0, 50.0, 40.0);
        assert_eq!(ring_slots(rect, 1, ASPECT), vec![rect]);
    }

    #[test]
    fn zigzag_prefers_a_single_row_in_a_wide_rect() {
        let slots = zigzag_slots(Rect::new(0.0, 0.0, 300.0, 100.0), 3, ASPECT, 0.9);
        let xs: Vec<f32> = slots.iter().map(|s| s.x).collect();
        assert!(approx(xs[0], 7.5) && approx(xs[1], 105.0) && approx(xs[2], 202.5));
        for slot in &slots {
            assert!(approx(slot.y, 16.25));
            assert!(approx(slot.width, 90.0));
            assert!(approx(slot.height, 67.5));
        }
    }

    #[test]
    fn zigzag_snakes_through_rows() {
        let slots = zigzag_slots(Rect::new(0.0, 0.0, 100.0, 100.0), 4, ASPECT, 0.9);
        assert!(slots[0].x < slots[1].x);
        assert!(slots[2].x > slots[3].x);
        assert!(approx(slots[0].y, slots[1].y));
        assert!(slots[2].y > slots[0].y);
        assert!(approx(slots[1].x, slots[2].x));
        assert!(approx(slots[0].width, 45.0));
        assert!(approx(slots[0].height, 33.75));
    }

    #[test]
    fn zigzag_uneven_rows_stay_inside() {
        let rect = Rect::new(0.0, 0.0, 160.0, 120.0);
        let slots = zigzag_slots(rect, 5, ASPECT, 0.9);
        assert_eq!(slots.len(), 5);
        for slot in &slots {
            assert!(slot.x >= 0.0 && slot.right() <= rect.width + 1e-3);
            assert!(slot.y >= 0.0 && slot.bottom() <= rect.height + 1e-3);
        }
    }
}
