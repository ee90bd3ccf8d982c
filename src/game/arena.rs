//! Arena geometry - static obstacle layout, spawn points, collision primitives

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in arena units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
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

    /// Rectangle of the given side length centered on a point
    pub fn centered_square(cx: f32, cy: f32, size: f32) -> Self {
        Self::new(cx - size / 2.0, cy - size / 2.0, size, size)
    }
}

/// Fixed cover layout: four corner blocks, one center block, and four
/// smaller blocks on the top/bottom mid-lanes.
pub const OBSTACLES: [Rect; 9] = [
    Rect::new(200.0, 200.0, 100.0, 100.0),
    Rect::new(900.0, 200.0, 100.0, 100.0),
    Rect::new(200.0, 500.0, 100.0, 100.0),
    Rect::new(900.0, 500.0, 100.0, 100.0),
    Rect::new(550.0, 350.0, 100.0, 100.0), // center
    Rect::new(400.0, 100.0, 80.0, 40.0),
    Rect::new(720.0, 100.0, 80.0, 40.0),
    Rect::new(400.0, 660.0, 80.0, 40.0),
    Rect::new(720.0, 660.0, 80.0, 40.0),
];

/// One spawn point per player slot, at opposite ends of the arena
pub const SPAWN_POINTS: [(f32, f32); 2] = [(100.0, 400.0), (1100.0, 400.0)];

/// Strict rectangle overlap test on both axes.
///
/// Touching edges do not count as overlap, so a player can slide flush
/// against cover.
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// Inclusive point containment test, used for laser hit checks since
/// lasers are treated as points.
pub fn point_in_rect(px: f32, py: f32, r: &Rect) -> bool {
    px >= r.x && px <= r.x + r.width && py >= r.y && py <= r.y + r.height
}

/// Pick the spawn point maximizing the minimum distance to the given
/// positions (the other living players). Falls back to the first spawn
/// when no positions are given.
pub fn farthest_spawn(others: &[(f32, f32)]) -> (f32, f32) {
    let mut best = SPAWN_POINTS[0];
    let mut max_dist = 0.0_f32;

    for spawn in SPAWN_POINTS {
        let min_dist = others
            .iter()
            .map(|&(x, y)| {
                let dx = spawn.0 - x;
                let dy = spawn.1 - y;
                (dx * dx + dy * dy).sqrt()
            })
            .fold(f32::INFINITY, f32::min);

        if min_dist > max_dist {
            max_dist = min_dist;
            best = spawn;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_detects_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(rect_overlap(&a, &b));
        assert!(rect_overlap(&b, &a));
    }

    #[test]
    fn overlap_is_strict_at_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let apart = Rect::new(10.1, 0.0, 10.0, 10.0);
        assert!(!rect_overlap(&a, &touching));
        assert!(!rect_overlap(&a, &apart));
    }

    #[test]
    fn overlap_requires_both_axes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 20.0, 10.0, 10.0);
        assert!(!rect_overlap(&a, &b));
    }

    #[test]
    fn point_containment_is_inclusive() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(point_in_rect(10.0, 10.0, &r));
        assert!(point_in_rect(30.0, 30.0, &r));
        assert!(point_in_rect(20.0, 15.0, &r));
        assert!(!point_in_rect(9.9, 15.0, &r));
        assert!(!point_in_rect(20.0, 30.1, &r));
    }

    #[test]
    fn centered_square_wraps_center() {
        let r = Rect::centered_square(100.0, 200.0, 32.0);
        assert_eq!(r.x, 84.0);
        assert_eq!(r.y, 184.0);
        assert!(point_in_rect(100.0, 200.0, &r));
    }

    #[test]
    fn farthest_spawn_avoids_enemy() {
        // Enemy sits on the left spawn, so the right one wins
        let spawn = farthest_spawn(&[SPAWN_POINTS[0]]);
        assert_eq!(spawn, SPAWN_POINTS[1]);

        let spawn = farthest_spawn(&[(1000.0, 400.0)]);
        assert_eq!(spawn, SPAWN_POINTS[0]);
    }

    #[test]
    fn farthest_spawn_defaults_to_first() {
        assert_eq!(farthest_spawn(&[]), SPAWN_POINTS[0]);
    }
}
