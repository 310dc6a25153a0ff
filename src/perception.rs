//! Per-tick perception: what one robot observes of the enemy and the walls.
//!
//! Perception is rebuilt from world state at tick boundaries and is the only
//! input (besides own state) the sensor table exposes to scripts. Values are
//! stored already rounded to the reporting precision.

use serde::Serialize;

use crate::arena::Arena;
use crate::config;
use crate::types::{Bearing, DistanceBand, Point, RelativeDirection, WallSide};
use crate::utils::{heading_degrees, round2, round4};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Perception {
    pub enemy_visible: bool,
    pub enemy: Option<EnemyPerception>,
    pub wall: WallPerception,
}

/// Relative geometry of a visible enemy. Deltas are opponent minus self.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyPerception {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub distance: f64,
    pub band: DistanceBand,
    pub bearing: Bearing,
    pub heading: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallRayHit {
    pub distance: f64,
    pub point: Point,
    pub side: WallSide,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallPerception {
    pub ahead: WallRayHit,
    pub left: WallRayHit,
    pub right: WallRayHit,
    pub back: WallRayHit,
    pub nearest_distance: f64,
    pub nearest_direction: RelativeDirection,
    /// Boundary hits of the sight-arc edges at heading -PI/3 and +PI/3.
    pub sight_arc: Vec<WallRayHit>,
}

/// Whether the opponent falls inside the actor's vision cone.
///
/// Requires the opponent alive, within the vision radius, a positive forward
/// component, and an off-axis angle within the half-angle of the cone.
pub fn enemy_in_cone(
    actor_position: Point,
    actor_heading: f64,
    opponent_position: Point,
    opponent_alive: bool,
) -> bool {
    if !opponent_alive {
        return false;
    }
    let dx = opponent_position.x - actor_position.x;
    let dy = opponent_position.y - actor_position.y;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance > config::VISION_RADIUS {
        return false;
    }

    let (forward, lateral) = forward_lateral(actor_heading, dx, dy);
    if forward <= 0.0 {
        return false;
    }
    lateral.abs().atan2(forward.max(1e-9)) <= config::VISION_HALF_ANGLE
}

/// Decompose a world-frame offset into the actor's forward/right basis.
/// Right is the heading rotated a quarter turn clockwise on screen.
pub fn forward_lateral(heading: f64, dx: f64, dy: f64) -> (f64, f64) {
    let (sin_h, cos_h) = heading.sin_cos();
    let forward = dx * cos_h + dy * sin_h;
    let lateral = dx * -sin_h + dy * cos_h;
    (forward, lateral)
}

/// Build the full perception record for one robot.
pub fn build_perception(
    arena: &Arena,
    actor_position: Point,
    actor_heading: f64,
    opponent_position: Point,
    opponent_heading: f64,
    opponent_alive: bool,
) -> Perception {
    let visible = enemy_in_cone(actor_position, actor_heading, opponent_position, opponent_alive);

    let enemy = if visible {
        let dx = opponent_position.x - actor_position.x;
        let dy = opponent_position.y - actor_position.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let (_, lateral) = forward_lateral(actor_heading, dx, dy);
        let bearing = if lateral.abs() <= config::BEARING_FRONT_LATERAL {
            Bearing::Front
        } else if lateral < 0.0 {
            Bearing::FrontLeft
        } else {
            Bearing::FrontRight
        };
        Some(EnemyPerception {
            x: round4(opponent_position.x),
            y: round4(opponent_position.y),
            dx: round4(dx),
            dy: round4(dy),
            distance: round2(distance),
            band: DistanceBand::from_distance(distance),
            bearing,
            heading: round2(heading_degrees(opponent_heading)),
        })
    } else {
        None
    };

    let wall = build_wall_perception(arena, actor_position, actor_heading);

    Perception {
        enemy_visible: visible,
        enemy,
        wall,
    }
}

fn wall_ray(arena: &Arena, from: Point, angle: f64) -> WallRayHit {
    let (distance, point, side) = arena.raycast_angle(from, angle);
    WallRayHit {
        distance: round2(distance),
        point: Point::new(round4(point.x), round4(point.y)),
        side,
    }
}

fn build_wall_perception(arena: &Arena, position: Point, heading: f64) -> WallPerception {
    use std::f64::consts::FRAC_PI_2;
    use std::f64::consts::PI;

    let ahead = wall_ray(arena, position, heading);
    let left = wall_ray(arena, position, heading - FRAC_PI_2);
    let right = wall_ray(arena, position, heading + FRAC_PI_2);
    let back = wall_ray(arena, position, heading + PI);

    let rays = [
        (RelativeDirection::Ahead, ahead.distance),
        (RelativeDirection::Left, left.distance),
        (RelativeDirection::Right, right.distance),
        (RelativeDirection::Back, back.distance),
    ];
    let (nearest_direction, nearest_distance) = rays
        .iter()
        .fold((RelativeDirection::Ahead, f64::INFINITY), |acc, &(d, dist)| {
            if dist < acc.1 {
                (d, dist)
            } else {
                acc
            }
        });

    let sight_arc = vec![
        wall_ray(arena, position, heading - config::VISION_HALF_ANGLE),
        wall_ray(arena, position, heading + config::VISION_HALF_ANGLE),
    ];

    WallPerception {
        ahead,
        left,
        right,
        back,
        nearest_distance,
        nearest_direction,
        sight_arc,
    }
}
