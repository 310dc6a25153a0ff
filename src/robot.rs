//! Robot state: position, heading, energy, fire cooldown, the side-boost
//! state machine, and enemy-sighting memory.

use crate::config;
use crate::perception::{EnemyPerception, Perception};
use crate::types::{BoostDirection, ControlState, Point, RobotSlot};
use crate::utils::normalize_rad;

/// Side-boost bookkeeping. While a burst is active the direction stays
/// locked; re-ignition requests are ignored until cooldown and burst clear.
#[derive(Debug, Clone, Copy, Default)]
pub struct SideBoost {
    pub cooldown: u32,
    pub burst_remaining: u32,
    pub locked_direction: Option<BoostDirection>,
}

/// Values recorded the last time the enemy was sighted.
#[derive(Debug, Clone, Copy)]
pub struct EnemySighting {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub dx: f64,
    pub dy: f64,
    pub distance: f64,
}

impl EnemySighting {
    fn from_perception(enemy: &EnemyPerception) -> Self {
        EnemySighting {
            x: enemy.x,
            y: enemy.y,
            heading: enemy.heading,
            dx: enemy.dx,
            dy: enemy.dy,
            distance: enemy.distance,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyMemory {
    pub prev: Option<EnemySighting>,
    pub ticks_since_seen: u32,
}

impl EnemyMemory {
    pub fn new() -> Self {
        EnemyMemory {
            prev: None,
            ticks_since_seen: config::TICKS_SINCE_SEEN_SENTINEL,
        }
    }

    /// Seed from the battle-start perception so tick 1 sensors behave the
    /// same as any later tick.
    pub fn seed(&mut self, initial: &Perception) {
        if let Some(enemy) = &initial.enemy {
            self.prev = Some(EnemySighting::from_perception(enemy));
            self.ticks_since_seen = 0;
        }
    }

    /// End-of-tick update. The sighting counter follows the post-tick
    /// perception; the recorded values are the sighting the rules evaluated
    /// this tick, so the delta sensors compare two distinct world states.
    pub fn update(&mut self, start: &Perception, end: &Perception) {
        if let Some(enemy) = &start.enemy {
            self.prev = Some(EnemySighting::from_perception(enemy));
        }
        if end.enemy_visible {
            self.ticks_since_seen = 0;
        } else {
            self.ticks_since_seen = self
                .ticks_since_seen
                .saturating_add(1)
                .min(config::TICKS_SINCE_SEEN_SENTINEL);
        }
    }
}

impl Default for EnemyMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct RobotState {
    pub slot: RobotSlot,
    pub id: String,
    pub position: Point,
    /// Radians; 0 points east, rotation is clockwise on screen.
    pub heading: f64,
    pub alive: bool,
    pub energy: f64,
    pub fire_cooldown: u32,
    pub boost: SideBoost,
    pub memory: EnemyMemory,
}

impl RobotState {
    pub fn new(slot: RobotSlot, id: impl Into<String>, position: Point, heading: f64) -> Self {
        RobotState {
            slot,
            id: id.into(),
            position,
            heading,
            alive: true,
            energy: config::ENERGY_MAX,
            fire_cooldown: 0,
            boost: SideBoost::default(),
            memory: EnemyMemory::new(),
        }
    }

    /// Unit vector along the heading.
    pub fn heading_unit(&self) -> Point {
        Point::new(self.heading.cos(), self.heading.sin())
    }

    /// Unit vector a quarter turn clockwise from the heading.
    pub fn right_unit(&self) -> Point {
        Point::new(-self.heading.sin(), self.heading.cos())
    }

    /// Boost cooldown tick-down and energy regeneration. Runs before
    /// movement each tick; dead robots are skipped by the caller.
    pub fn housekeeping(&mut self) {
        self.boost.cooldown = self.boost.cooldown.saturating_sub(1);
        self.energy = (self.energy + config::ENERGY_REGEN_PER_TICK).min(config::ENERGY_MAX);
    }

    /// Rotate by the turn control. Returns the applied delta in radians.
    pub fn apply_rotation(&mut self, controls: &ControlState) -> f64 {
        let penalty = if controls.fire {
            config::FIRE_MOVE_PENALTY
        } else {
            1.0
        };
        let delta = controls.turn
            * config::TURN_RATE_DEGREES_PER_SEC.to_radians()
            * penalty
            * config::TICK_SECONDS;
        self.heading = normalize_rad(self.heading + delta);
        delta
    }

    /// Try to ignite a side boost. Ignition requires a request, no active
    /// burst, cooldown at zero, and enough energy; otherwise the request is
    /// dropped without any debit.
    pub fn try_ignite_boost(&mut self, controls: &ControlState) -> bool {
        let Some(direction) = controls.boost else {
            return false;
        };
        if self.boost.burst_remaining > 0
            || self.boost.cooldown > 0
            || self.energy < config::SIDE_BOOST_ENERGY_COST
        {
            crate::debug_drive!(
                &self.id,
                "boost {:?} ignored (burst {}, cooldown {}, energy {:.2})",
                direction,
                self.boost.burst_remaining,
                self.boost.cooldown,
                self.energy
            );
            return false;
        }

        self.energy -= config::SIDE_BOOST_ENERGY_COST;
        self.boost.cooldown = config::SIDE_BOOST_COOLDOWN_TICKS;
        self.boost.burst_remaining = config::SIDE_BOOST_BURST_TICKS;
        self.boost.locked_direction = Some(direction);
        crate::debug_drive!(
            &self.id,
            "boost {:?} ignited, energy now {:.2}",
            direction,
            self.energy
        );
        true
    }

    /// Consume one burst tick. Returns the locked direction and the lateral
    /// distance for this tick, or None when no burst is active.
    pub fn burst_tick(&mut self) -> Option<(BoostDirection, f64)> {
        if self.boost.burst_remaining == 0 {
            return None;
        }
        let direction = self.boost.locked_direction?;
        let index = (config::SIDE_BOOST_BURST_TICKS - self.boost.burst_remaining) as usize;
        let level = config::SIDE_BOOST_FORCE_SEQUENCE[index];
        self.boost.burst_remaining -= 1;
        if self.boost.burst_remaining == 0 {
            self.boost.locked_direction = None;
        }
        Some((direction, level * config::STRAFE_STEP_PER_TICK))
    }

    /// Robot-frame throttle/strafe turned into a world-frame delta for this
    /// tick. Backward motion uses its slower base and the same fire penalty.
    pub fn linear_delta(&self, controls: &ControlState) -> Point {
        let penalty = if controls.fire {
            config::FIRE_MOVE_PENALTY
        } else {
            1.0
        };
        let axial_step = if controls.throttle >= 0.0 {
            config::FORWARD_STEP_PER_TICK
        } else {
            config::BACKWARD_STEP_PER_TICK
        };
        let axial = controls.throttle * axial_step * penalty;
        let lateral = controls.strafe * config::STRAFE_STEP_PER_TICK * penalty;

        let h = self.heading_unit();
        let r = self.right_unit();
        Point::new(axial * h.x + lateral * r.x, axial * h.y + lateral * r.y)
    }

    /// Mark the robot dead. Any active burst ends immediately.
    pub fn kill(&mut self) {
        self.alive = false;
        self.boost.burst_remaining = 0;
        self.boost.locked_direction = None;
    }
}
