//! Per-tick sensor table.
//!
//! Sensors read the actor's own state plus the perception built immediately
//! before rule evaluation. A sensor that has no value this tick (enemy not
//! visible, no sighting on record) reads as `None`; expression evaluation
//! propagates that to an unavailable result instead of an error.

use crate::perception::Perception;
use crate::robot::RobotState;
use crate::script::Sensor;
use crate::utils::heading_degrees;

/// Everything sensors may observe for one robot on one tick.
pub struct SensorContext<'a> {
    pub actor: &'a RobotState,
    pub perception: &'a Perception,
    pub arena_size: u32,
}

/// Current value of a sensor, or None when unavailable this tick.
pub fn sensor_value(ctx: &SensorContext<'_>, sensor: Sensor) -> Option<f64> {
    use Sensor::*;

    let enemy = ctx.perception.enemy.as_ref();
    let prev = ctx.actor.memory.prev.as_ref();

    match sensor {
        SelfX => Some(ctx.actor.position.x),
        SelfY => Some(ctx.actor.position.y),
        SelfHeading => Some(heading_degrees(ctx.actor.heading)),
        SelfEnergy => Some(ctx.actor.energy),
        BoostCooldown => Some(ctx.actor.boost.cooldown as f64),
        TicksSinceEnemySeen => {
            if ctx.perception.enemy_visible {
                Some(0.0)
            } else {
                Some(ctx.actor.memory.ticks_since_seen as f64)
            }
        }
        ArenaSize => Some(ctx.arena_size as f64),

        EnemyX => enemy.map(|e| e.x),
        EnemyY => enemy.map(|e| e.y),
        EnemyDx => enemy.map(|e| e.dx),
        EnemyDy => enemy.map(|e| e.dy),
        EnemyDistance => enemy.map(|e| e.distance),
        EnemyHeading => enemy.map(|e| e.heading),

        PrevEnemyX => prev.map(|p| p.x),
        PrevEnemyY => prev.map(|p| p.y),
        PrevEnemyHeading => prev.map(|p| p.heading),
        PrevEnemyDx => prev.map(|p| p.dx),
        PrevEnemyDy => prev.map(|p| p.dy),
        PrevEnemyDistance => prev.map(|p| p.distance),

        EnemyXDelta => pair(enemy.map(|e| e.x), prev.map(|p| p.x)),
        EnemyYDelta => pair(enemy.map(|e| e.y), prev.map(|p| p.y)),
        EnemyHeadingDelta => pair(enemy.map(|e| e.heading), prev.map(|p| p.heading)),
        EnemyDxDelta => pair(enemy.map(|e| e.dx), prev.map(|p| p.dx)),
        EnemyDyDelta => pair(enemy.map(|e| e.dy), prev.map(|p| p.dy)),
        EnemyDistanceDelta => pair(enemy.map(|e| e.distance), prev.map(|p| p.distance)),

        WallAheadDistance => Some(ctx.perception.wall.ahead.distance),
        WallLeftDistance => Some(ctx.perception.wall.left.distance),
        WallRightDistance => Some(ctx.perception.wall.right.distance),
        WallBackDistance => Some(ctx.perception.wall.back.distance),
        WallNearestDistance => Some(ctx.perception.wall.nearest_distance),
    }
}

fn pair(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(c), Some(p)) => Some(c - p),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::perception::build_perception;
    use crate::types::Point;
    use assert_approx_eq::assert_approx_eq;

    fn setup(visible: bool) -> (RobotState, Perception) {
        let actor = RobotState::new(0, "A", Point::new(3.0, 5.0), 0.0);
        let opponent_pos = if visible {
            Point::new(7.0, 5.0)
        } else {
            Point::new(1.0, 5.0) // behind the actor
        };
        let arena = Arena::new(10);
        let perception = build_perception(
            &arena,
            actor.position,
            actor.heading,
            opponent_pos,
            std::f64::consts::PI,
            true,
        );
        (actor, perception)
    }

    #[test]
    fn test_self_sensors_always_available() {
        let (actor, perception) = setup(false);
        let ctx = SensorContext {
            actor: &actor,
            perception: &perception,
            arena_size: 10,
        };
        assert_approx_eq!(sensor_value(&ctx, Sensor::SelfX).unwrap(), 3.0);
        assert_approx_eq!(sensor_value(&ctx, Sensor::SelfHeading).unwrap(), 0.0);
        assert_approx_eq!(sensor_value(&ctx, Sensor::SelfEnergy).unwrap(), 100.0);
        assert_approx_eq!(sensor_value(&ctx, Sensor::ArenaSize).unwrap(), 10.0);
        assert_approx_eq!(sensor_value(&ctx, Sensor::WallAheadDistance).unwrap(), 6.0);
    }

    #[test]
    fn test_enemy_sensors_unavailable_when_hidden() {
        let (actor, perception) = setup(false);
        let ctx = SensorContext {
            actor: &actor,
            perception: &perception,
            arena_size: 10,
        };
        assert!(sensor_value(&ctx, Sensor::EnemyX).is_none());
        assert!(sensor_value(&ctx, Sensor::EnemyDistance).is_none());
        assert!(sensor_value(&ctx, Sensor::EnemyDxDelta).is_none());
    }

    #[test]
    fn test_enemy_sensors_when_visible() {
        let (actor, perception) = setup(true);
        let ctx = SensorContext {
            actor: &actor,
            perception: &perception,
            arena_size: 10,
        };
        assert_approx_eq!(sensor_value(&ctx, Sensor::EnemyX).unwrap(), 7.0);
        assert_approx_eq!(sensor_value(&ctx, Sensor::EnemyDx).unwrap(), 4.0);
        assert_approx_eq!(sensor_value(&ctx, Sensor::EnemyDistance).unwrap(), 4.0);
        assert_approx_eq!(sensor_value(&ctx, Sensor::EnemyHeading).unwrap(), 180.0);
    }

    #[test]
    fn test_ticks_since_seen_zero_while_visible() {
        let (mut actor, perception) = setup(true);
        actor.memory.ticks_since_seen = 42;
        let ctx = SensorContext {
            actor: &actor,
            perception: &perception,
            arena_size: 10,
        };
        assert_approx_eq!(
            sensor_value(&ctx, Sensor::TicksSinceEnemySeen).unwrap(),
            0.0
        );

        let (mut actor, perception) = setup(false);
        actor.memory.ticks_since_seen = 42;
        let ctx = SensorContext {
            actor: &actor,
            perception: &perception,
            arena_size: 10,
        };
        assert_approx_eq!(
            sensor_value(&ctx, Sensor::TicksSinceEnemySeen).unwrap(),
            42.0
        );
    }

    #[test]
    fn test_prev_and_delta_sensors() {
        let (mut actor, perception) = setup(true);
        // No sighting on record yet
        let ctx = SensorContext {
            actor: &actor,
            perception: &perception,
            arena_size: 10,
        };
        assert!(sensor_value(&ctx, Sensor::PrevEnemyX).is_none());
        assert!(sensor_value(&ctx, Sensor::EnemyXDelta).is_none());

        actor.memory.prev = Some(crate::robot::EnemySighting {
            x: 6.5,
            y: 5.0,
            heading: 180.0,
            dx: 3.5,
            dy: 0.0,
            distance: 3.5,
        });
        let ctx = SensorContext {
            actor: &actor,
            perception: &perception,
            arena_size: 10,
        };
        assert_approx_eq!(sensor_value(&ctx, Sensor::PrevEnemyX).unwrap(), 6.5);
        assert_approx_eq!(sensor_value(&ctx, Sensor::EnemyXDelta).unwrap(), 0.5);
        assert_approx_eq!(sensor_value(&ctx, Sensor::EnemyDistanceDelta).unwrap(), 0.5);
    }
}
