//! Wire types for the battle result: snapshots, per-tick logs, and
//! pre-rendered replay frames.
//!
//! This is the authoritative interchange format; collaborators serialize it
//! as JSON with lowerCamelCase field names. All numerics pass through the
//! reporting rounding rule here: positions/energy/deltas at four decimals,
//! headings/distances at two.

use serde::Serialize;

use crate::config;
use crate::perception::Perception;
use crate::robot::RobotState;
use crate::types::{BoostDirection, Cardinal, ControlState, Point, Projectile};
use crate::utils::{heading_degrees, round2, round4};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotSnapshot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub direction: Cardinal,
    pub alive: bool,
    pub energy: f64,
    pub fire_cooldown: u32,
    pub boost_cooldown: u32,
    pub boost_burst_remaining: u32,
    pub boost_direction: Option<BoostDirection>,
    pub ticks_since_enemy_seen: u32,
}

impl RobotSnapshot {
    pub fn capture(robot: &RobotState) -> Self {
        RobotSnapshot {
            id: robot.id.clone(),
            x: round4(robot.position.x),
            y: round4(robot.position.y),
            heading: round2(heading_degrees(robot.heading)),
            direction: Cardinal::from_heading(robot.heading),
            alive: robot.alive,
            energy: round4(robot.energy),
            fire_cooldown: robot.fire_cooldown,
            boost_cooldown: robot.boost.cooldown,
            boost_burst_remaining: robot.boost.burst_remaining,
            boost_direction: robot.boost.locked_direction,
            ticks_since_enemy_seen: robot.memory.ticks_since_seen,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileSnapshot {
    pub shooter: String,
    pub target: String,
    pub x: f64,
    pub y: f64,
    pub direction: Cardinal,
    pub traveled: f64,
    pub max_range: f64,
}

impl ProjectileSnapshot {
    pub fn capture(projectile: &Projectile, ids: &[String; 2]) -> Self {
        ProjectileSnapshot {
            shooter: ids[projectile.shooter].clone(),
            target: ids[projectile.target].clone(),
            x: round4(projectile.position.x),
            y: round4(projectile.position.y),
            direction: projectile.cardinal,
            traveled: round2(projectile.traveled),
            max_range: round2(projectile.max_range),
        }
    }
}

/// World state at a tick boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaSnapshot {
    pub robots: Vec<RobotSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

/// One projectile's path within a single tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileTrace {
    pub shooter: String,
    pub target_robot_id: String,
    pub from: Point,
    pub to: Point,
    pub direction: Cardinal,
    pub range: f64,
    pub hit: bool,
}

impl ProjectileTrace {
    pub fn new(
        projectile: &Projectile,
        ids: &[String; 2],
        from: Point,
        to: Point,
        hit: bool,
    ) -> Self {
        ProjectileTrace {
            shooter: ids[projectile.shooter].clone(),
            target_robot_id: ids[projectile.target].clone(),
            from: Point::new(round4(from.x), round4(from.y)),
            to: Point::new(round4(to.x), round4(to.y)),
            direction: projectile.cardinal,
            range: round2(from.distance(&to)),
            hit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsRecord {
    pub throttle: f64,
    pub strafe: f64,
    pub turn: f64,
    pub fire: bool,
    pub boost: Option<BoostDirection>,
}

impl ControlsRecord {
    pub fn capture(controls: &ControlState) -> Self {
        ControlsRecord {
            throttle: round4(controls.throttle),
            strafe: round4(controls.strafe),
            turn: round4(controls.turn),
            fire: controls.fire,
            boost: controls.boost,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
    pub from: Point,
    pub to: Point,
    pub attempted: bool,
    pub hit_boundary: bool,
    pub blocked_by_robot: bool,
    pub boost_applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FireBlockReason {
    Cooldown,
    NoEnergy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireRecord {
    pub requested: bool,
    pub shot_fired: bool,
    pub blocked: Option<FireBlockReason>,
}

/// Everything one robot did in one tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub robot_id: String,
    pub controls: ControlsRecord,
    pub matched_rules: Vec<u32>,
    /// Degrees turned this tick.
    pub rotation_delta: f64,
    pub movement: MovementRecord,
    pub fire: FireRecord,
    pub projectile: Option<ProjectileTrace>,
    pub details: String,
}

/// Lateral shove segment a boost burst produced this tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostEffect {
    pub robot_id: String,
    pub from: Point,
    pub to: Point,
    pub direction: BoostDirection,
    pub level: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickLog {
    pub tick: u32,
    pub start_snapshot: ArenaSnapshot,
    pub start_perception: Vec<Perception>,
    pub actions: Vec<ActionRecord>,
    pub projectiles: Vec<ProjectileTrace>,
    pub end_snapshot: ArenaSnapshot,
    pub end_perception: Vec<Perception>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionHint {
    pub robot_id: String,
    pub action: String,
    pub event: Option<String>,
    pub boost: Option<BoostDirection>,
}

/// One renderable frame. Frame 0 is the initial state; frame t mirrors the
/// end of tick t.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFrame {
    pub index: u32,
    pub snapshot: ArenaSnapshot,
    pub projectiles: Vec<ProjectileTrace>,
    pub boost_effects: Vec<BoostEffect>,
    pub actions: Vec<ActionHint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStatus {
    Finished,
    Draw,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantsEcho {
    pub vision_radius: f64,
    pub shot_range: f64,
    pub shot_hit_radius: f64,
    pub fire_energy_cost: f64,
    pub fire_cooldown_ticks: u32,
    pub side_boost_energy_cost: f64,
    pub side_boost_cooldown_ticks: u32,
    pub energy_max: f64,
    pub energy_regen_per_sec: f64,
    pub robot_collision_radius: f64,
}

impl ConstantsEcho {
    pub fn current() -> Self {
        ConstantsEcho {
            vision_radius: config::VISION_RADIUS,
            shot_range: config::SHOT_RANGE,
            shot_hit_radius: config::SHOT_HIT_RADIUS,
            fire_energy_cost: config::FIRE_ENERGY_COST,
            fire_cooldown_ticks: config::FIRE_COOLDOWN_TICKS,
            side_boost_energy_cost: config::SIDE_BOOST_ENERGY_COST,
            side_boost_cooldown_ticks: config::SIDE_BOOST_COOLDOWN_TICKS,
            energy_max: config::ENERGY_MAX,
            energy_regen_per_sec: config::ENERGY_REGEN_PER_SEC,
            robot_collision_radius: config::ROBOT_COLLISION_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEcho {
    pub arena_size: u32,
    pub max_ticks: u32,
    pub tick_ms: f64,
    pub frame_rate: u32,
    pub constants: ConstantsEcho,
}

impl ConfigEcho {
    pub fn new(arena_size: u32, max_ticks: u32) -> Self {
        ConfigEcho {
            arena_size,
            max_ticks,
            tick_ms: round2(config::TICK_MILLIS),
            frame_rate: (1000.0 / config::TICK_MILLIS).round() as u32,
            constants: ConstantsEcho::current(),
        }
    }
}

/// The full deterministic battle record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResult {
    pub config: ConfigEcho,
    pub initial_snapshot: ArenaSnapshot,
    pub final_snapshot: ArenaSnapshot,
    pub initial_perception: Vec<Perception>,
    pub final_perception: Vec<Perception>,
    pub ticks: Vec<TickLog>,
    pub frames: Vec<ReplayFrame>,
    pub status: BattleStatus,
    pub winner: Option<String>,
}
