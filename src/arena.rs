//! Arena geometry: the bounded square, wall ray casting, robot proximity,
//! and projectile stepping.

use crate::config;
use crate::types::{Point, Projectile, WallSide};

/// The battle square. Positions live in [0, size-1] on both axes; y grows
/// south.
#[derive(Debug, Clone, Copy)]
pub struct Arena {
    pub size: u32,
}

/// One projectile's movement within a single tick.
#[derive(Debug, Clone)]
pub struct ProjectileAdvance {
    pub from: Point,
    pub to: Point,
    pub hit: bool,
    /// Projectile is finished after this step (hit, range, or wall).
    pub retired: bool,
}

impl Arena {
    pub fn new(size: u32) -> Self {
        Arena { size }
    }

    /// Largest coordinate on either axis.
    pub fn max_coord(&self) -> f64 {
        self.size as f64 - 1.0
    }

    /// Clamp a point into the arena. The flag reports whether clamping moved it.
    pub fn clamp_point(&self, p: Point) -> (Point, bool) {
        let max = self.max_coord();
        let clamped = Point::new(p.x.clamp(0.0, max), p.y.clamp(0.0, max));
        let moved = (clamped.x - p.x).abs() > 1e-12 || (clamped.y - p.y).abs() > 1e-12;
        (clamped, moved)
    }

    /// Whether two robot centers stand closer than two collision radii.
    pub fn robots_overlap(a: Point, b: Point) -> bool {
        a.distance(&b) < 2.0 * config::ROBOT_COLLISION_RADIUS
    }

    /// Cast a ray from inside the arena along a unit direction and return the
    /// nearest boundary crossing: (distance, crossing point, wall side).
    ///
    /// Only walls the ray actually moves toward are candidates, so a robot
    /// pressed against a wall and facing away reads the full span ahead.
    pub fn raycast(&self, from: Point, dir: Point) -> (f64, Point, WallSide) {
        let max = self.max_coord();
        let mut best: Option<(f64, Point, WallSide)> = None;

        let mut consider = |t: f64, point: Point, side: WallSide| {
            if best.as_ref().map_or(true, |(bt, _, _)| t < *bt) {
                best = Some((t, point, side));
            }
        };

        if dir.x < -1e-12 {
            let t = (0.0 - from.x) / dir.x;
            let y = from.y + t * dir.y;
            if y >= -1e-9 && y <= max + 1e-9 {
                consider(t, Point::new(0.0, y.clamp(0.0, max)), WallSide::West);
            }
        }
        if dir.x > 1e-12 {
            let t = (max - from.x) / dir.x;
            let y = from.y + t * dir.y;
            if y >= -1e-9 && y <= max + 1e-9 {
                consider(t, Point::new(max, y.clamp(0.0, max)), WallSide::East);
            }
        }
        if dir.y < -1e-12 {
            let t = (0.0 - from.y) / dir.y;
            let x = from.x + t * dir.x;
            if x >= -1e-9 && x <= max + 1e-9 {
                consider(t, Point::new(x.clamp(0.0, max), 0.0), WallSide::North);
            }
        }
        if dir.y > 1e-12 {
            let t = (max - from.y) / dir.y;
            let x = from.x + t * dir.x;
            if x >= -1e-9 && x <= max + 1e-9 {
                consider(t, Point::new(x.clamp(0.0, max), max), WallSide::South);
            }
        }

        // A point inside the square always exits through some wall.
        best.map(|(t, p, s)| (t.max(0.0), p, s))
            .unwrap_or((0.0, from, WallSide::North))
    }

    /// Ray cast along a heading angle in radians.
    pub fn raycast_angle(&self, from: Point, angle: f64) -> (f64, Point, WallSide) {
        self.raycast(from, Point::new(angle.cos(), angle.sin()))
    }

    /// Step one in-flight projectile through a single tick.
    ///
    /// The step distance is bounded by per-tick speed, remaining range, and
    /// the wall ahead. The target is hit when it stands within the hit radius
    /// of the swept segment; the trace then terminates on the target itself.
    pub fn advance_projectile(
        &self,
        projectile: &mut Projectile,
        target_position: Point,
        target_can_be_hit: bool,
    ) -> ProjectileAdvance {
        let from = projectile.position;
        let (wall_distance, _, _) = self.raycast(from, projectile.direction);
        let remaining = (projectile.max_range - projectile.traveled).max(0.0);
        let step = config::PROJECTILE_STEP_PER_TICK.min(remaining).min(wall_distance);

        let to = Point::new(
            from.x + projectile.direction.x * step,
            from.y + projectile.direction.y * step,
        );

        if target_can_be_hit
            && point_segment_distance(target_position, from, to) <= config::SHOT_HIT_RADIUS
        {
            return ProjectileAdvance {
                from,
                to: target_position,
                hit: true,
                retired: true,
            };
        }

        projectile.position = to;
        projectile.traveled += step;
        let out_of_range = projectile.traveled >= projectile.max_range - 1e-9;
        let at_wall = step >= wall_distance - 1e-9;

        ProjectileAdvance {
            from,
            to,
            hit: false,
            retired: out_of_range || at_wall,
        }
    }
}

/// Distance from a point to the closest point of the segment [a, b].
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = Point::new(b.x - a.x, b.y - a.y);
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= 1e-18 {
        return p.distance(&a);
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
    let closest = Point::new(a.x + ab.x * t, a.y + ab.y * t);
    p.distance(&closest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cardinal;
    use assert_approx_eq::assert_approx_eq;

    fn arena() -> Arena {
        Arena::new(10)
    }

    #[test]
    fn test_raycast_four_directions() {
        // At (2, 3) in a 10-arena: east 7, north 3, south 6, west 2.
        let a = arena();
        let from = Point::new(2.0, 3.0);

        let (d, p, side) = a.raycast_angle(from, 0.0);
        assert_approx_eq!(d, 7.0);
        assert_approx_eq!(p.x, 9.0);
        assert_eq!(side, WallSide::East);

        let (d, _, side) = a.raycast_angle(from, -std::f64::consts::FRAC_PI_2);
        assert_approx_eq!(d, 3.0);
        assert_eq!(side, WallSide::North);

        let (d, _, side) = a.raycast_angle(from, std::f64::consts::FRAC_PI_2);
        assert_approx_eq!(d, 6.0);
        assert_eq!(side, WallSide::South);

        let (d, _, side) = a.raycast_angle(from, std::f64::consts::PI);
        assert_approx_eq!(d, 2.0);
        assert_eq!(side, WallSide::West);
    }

    #[test]
    fn test_raycast_ignores_wall_behind() {
        // Pressed against the west wall facing east: the full span lies ahead.
        let a = arena();
        let (d, _, side) = a.raycast_angle(Point::new(0.0, 5.0), 0.0);
        assert_approx_eq!(d, 9.0);
        assert_eq!(side, WallSide::East);

        // Facing the wall it stands on: distance zero.
        let (d, _, side) = a.raycast_angle(Point::new(0.0, 5.0), std::f64::consts::PI);
        assert_approx_eq!(d, 0.0);
        assert_eq!(side, WallSide::West);
    }

    #[test]
    fn test_raycast_diagonal() {
        let a = arena();
        let angle = std::f64::consts::FRAC_PI_4; // southeast
        let (d, p, side) = a.raycast_angle(Point::new(8.0, 8.0), angle);
        assert_approx_eq!(d, std::f64::consts::SQRT_2);
        assert_approx_eq!(p.x, 9.0);
        assert_approx_eq!(p.y, 9.0);
        // Ties resolve to the first wall considered; both are one tile out.
        assert!(side == WallSide::East || side == WallSide::South);
    }

    #[test]
    fn test_clamp_point() {
        let a = arena();
        let (p, moved) = a.clamp_point(Point::new(-0.5, 4.0));
        assert_approx_eq!(p.x, 0.0);
        assert!(moved);
        let (p, moved) = a.clamp_point(Point::new(3.0, 9.5));
        assert_approx_eq!(p.y, 9.0);
        assert!(moved);
        let (_, moved) = a.clamp_point(Point::new(3.0, 4.0));
        assert!(!moved);
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_approx_eq!(point_segment_distance(Point::new(5.0, 3.0), a, b), 3.0);
        assert_approx_eq!(point_segment_distance(Point::new(-4.0, 3.0), a, b), 5.0);
        assert_approx_eq!(point_segment_distance(Point::new(12.0, 0.0), a, b), 2.0);
        // Degenerate segment
        assert_approx_eq!(point_segment_distance(Point::new(1.0, 1.0), a, a), 2.0_f64.sqrt());
    }

    fn projectile_at(x: f64, y: f64) -> Projectile {
        Projectile {
            shooter: 0,
            target: 1,
            position: Point::new(x, y),
            direction: Point::new(1.0, 0.0),
            cardinal: Cardinal::E,
            traveled: 0.0,
            max_range: config::SHOT_RANGE,
        }
    }

    #[test]
    fn test_projectile_steps_half_tile() {
        let a = arena();
        let mut p = projectile_at(3.0, 5.0);
        let adv = a.advance_projectile(&mut p, Point::new(9.0, 9.0), true);
        assert!(!adv.hit);
        assert!(!adv.retired);
        assert_approx_eq!(adv.to.x, 3.5);
        assert_approx_eq!(p.traveled, 0.5);
    }

    #[test]
    fn test_projectile_expires_exactly_at_range() {
        let a = Arena::new(40);
        let mut p = projectile_at(3.0, 5.0);
        let far_target = Point::new(30.0, 30.0);
        let mut last = None;
        for _ in 0..20 {
            let adv = a.advance_projectile(&mut p, far_target, true);
            let done = adv.retired;
            last = Some(adv);
            if done {
                break;
            }
        }
        let last = last.unwrap();
        assert!(last.retired);
        assert!(!last.hit);
        assert_approx_eq!(p.traveled, config::SHOT_RANGE);
        assert_approx_eq!(last.to.x, 8.0); // 3 + 5 tiles of range
    }

    #[test]
    fn test_projectile_retires_at_wall() {
        let a = arena();
        let mut p = projectile_at(8.8, 5.0);
        let adv = a.advance_projectile(&mut p, Point::new(0.0, 0.0), true);
        assert!(adv.retired);
        assert!(!adv.hit);
        assert_approx_eq!(adv.to.x, 9.0);
    }

    #[test]
    fn test_projectile_hit_stops_on_target() {
        let a = arena();
        let mut p = projectile_at(6.4, 5.0);
        let target = Point::new(7.0, 5.0);
        let adv = a.advance_projectile(&mut p, target, true);
        assert!(adv.hit);
        assert!(adv.retired);
        assert_approx_eq!(adv.to.x, 7.0);
        assert_approx_eq!(adv.to.y, 5.0);
    }

    #[test]
    fn test_projectile_passes_untouchable_target() {
        let a = arena();
        let mut p = projectile_at(6.4, 5.0);
        let target = Point::new(7.0, 5.0);
        let adv = a.advance_projectile(&mut p, target, false);
        assert!(!adv.hit);
        assert_approx_eq!(p.position.x, 6.9);
    }

    #[test]
    fn test_robots_overlap() {
        assert!(Arena::robots_overlap(
            Point::new(1.0, 1.0),
            Point::new(1.5, 1.0)
        ));
        assert!(!Arena::robots_overlap(
            Point::new(1.0, 1.0),
            Point::new(1.7, 1.0)
        ));
    }
}
