//! Battle driver: owns the world, advances ticks, and assembles the result.
//!
//! Phase order within a tick is part of the observable contract:
//! snapshot -> perception -> rule evaluation -> rotation -> movement and
//! side boost -> fire spawn -> projectile advance -> kills -> end
//! perception -> memory update -> log append. Both robots' inputs are read
//! from the pre-tick state, so neither sees the other's same-tick actions.

use log::info;
use thiserror::Error;

use crate::arena::Arena;
use crate::config;
use crate::perception::{build_perception, Perception};
use crate::replay::{
    ActionHint, ActionRecord, ArenaSnapshot, BattleResult, BattleStatus, BoostEffect, ConfigEcho,
    ControlsRecord, FireBlockReason, FireRecord, MovementRecord, ProjectileSnapshot,
    ProjectileTrace, ReplayFrame, RobotSnapshot, TickLog,
};
use crate::robot::RobotState;
use crate::rules::evaluate_program;
use crate::script::Program;
use crate::sensors::SensorContext;
use crate::types::{BoostDirection, Cardinal, ControlState, Point, Projectile};
use crate::utils::round2;

/// Driver-boundary precondition violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("arena size {0} is outside [{min}, {max}]", min = config::MIN_ARENA_SIZE, max = config::MAX_ARENA_SIZE)]
    ArenaSizeOutOfRange(u32),
    #[error("max ticks {0} is outside [{min}, {max}]", min = config::MIN_MAX_TICKS, max = config::MAX_MAX_TICKS)]
    MaxTicksOutOfRange(u32),
    #[error("robot ids must be distinct and non-empty")]
    InvalidRobotIds,
}

#[derive(Debug, Clone)]
pub struct BattleConfig {
    pub arena_size: u32,
    pub max_ticks: u32,
    pub robot_a_id: String,
    pub robot_b_id: String,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            arena_size: config::DEFAULT_ARENA_SIZE,
            max_ticks: config::DEFAULT_MAX_TICKS,
            robot_a_id: "A".to_string(),
            robot_b_id: "B".to_string(),
        }
    }
}

impl BattleConfig {
    fn validate(&self) -> Result<(), BattleError> {
        if !(config::MIN_ARENA_SIZE..=config::MAX_ARENA_SIZE).contains(&self.arena_size) {
            return Err(BattleError::ArenaSizeOutOfRange(self.arena_size));
        }
        if !(config::MIN_MAX_TICKS..=config::MAX_MAX_TICKS).contains(&self.max_ticks) {
            return Err(BattleError::MaxTicksOutOfRange(self.max_ticks));
        }
        if self.robot_a_id.is_empty()
            || self.robot_b_id.is_empty()
            || self.robot_a_id == self.robot_b_id
        {
            return Err(BattleError::InvalidRobotIds);
        }
        Ok(())
    }
}

/// Run a full deterministic battle between two parsed programs.
pub fn simulate(
    a: &Program,
    b: &Program,
    cfg: &BattleConfig,
) -> Result<BattleResult, BattleError> {
    cfg.validate()?;
    let mut battle = Battle::new(a, b, cfg);
    Ok(battle.run())
}

struct Battle<'a> {
    arena: Arena,
    programs: [&'a Program; 2],
    robots: [RobotState; 2],
    ids: [String; 2],
    projectiles: Vec<Projectile>,
    /// Perceptions at the current tick boundary; rules read these.
    perceptions: [Perception; 2],
    max_ticks: u32,
}

/// Everything `step` produces for one tick.
struct TickOutcome {
    log: TickLog,
    frame: ReplayFrame,
}

impl<'a> Battle<'a> {
    fn new(a: &'a Program, b: &'a Program, cfg: &BattleConfig) -> Self {
        let arena = Arena::new(cfg.arena_size);
        let max = arena.max_coord();
        let robots = [
            RobotState::new(0, cfg.robot_a_id.clone(), Point::new(0.0, 0.0), 0.0),
            RobotState::new(
                1,
                cfg.robot_b_id.clone(),
                Point::new(max, max),
                std::f64::consts::PI,
            ),
        ];
        let ids = [cfg.robot_a_id.clone(), cfg.robot_b_id.clone()];

        let mut battle = Battle {
            arena,
            programs: [a, b],
            robots,
            ids,
            projectiles: Vec::new(),
            perceptions: [
                empty_perception(&arena),
                empty_perception(&arena),
            ],
            max_ticks: cfg.max_ticks,
        };
        battle.rebuild_perceptions();
        for i in 0..2 {
            let p = battle.perceptions[i].clone();
            battle.robots[i].memory.seed(&p);
        }
        battle
    }

    fn rebuild_perceptions(&mut self) {
        for i in 0..2 {
            let o = 1 - i;
            self.perceptions[i] = build_perception(
                &self.arena,
                self.robots[i].position,
                self.robots[i].heading,
                self.robots[o].position,
                self.robots[o].heading,
                self.robots[o].alive,
            );
        }
    }

    fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            robots: self.robots.iter().map(RobotSnapshot::capture).collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileSnapshot::capture(p, &self.ids))
                .collect(),
        }
    }

    fn run(&mut self) -> BattleResult {
        info!(
            "battle start: {} vs {} on a {}x{} arena, up to {} ticks",
            self.ids[0], self.ids[1], self.arena.size, self.arena.size, self.max_ticks
        );

        let initial_snapshot = self.snapshot();
        let initial_perception = self.perceptions.to_vec();

        let mut ticks = Vec::with_capacity(self.max_ticks as usize);
        let mut frames = Vec::with_capacity(self.max_ticks as usize + 1);
        frames.push(ReplayFrame {
            index: 0,
            snapshot: initial_snapshot.clone(),
            projectiles: Vec::new(),
            boost_effects: Vec::new(),
            actions: Vec::new(),
        });

        let mut status = BattleStatus::Draw;
        let mut winner = None;

        for tick in 1..=self.max_ticks {
            let outcome = self.step(tick);
            ticks.push(outcome.log);
            frames.push(outcome.frame);

            let alive = [self.robots[0].alive, self.robots[1].alive];
            match (alive[0], alive[1]) {
                (true, true) => {}
                (false, false) => {
                    status = BattleStatus::Draw;
                    winner = None;
                    break;
                }
                (a_alive, _) => {
                    status = BattleStatus::Finished;
                    let survivor = if a_alive { 0 } else { 1 };
                    winner = Some(self.ids[survivor].clone());
                    break;
                }
            }
        }

        match &winner {
            Some(id) => info!("battle finished after {} ticks, {} wins", ticks.len(), id),
            None => info!("battle ended in a draw after {} ticks", ticks.len()),
        }

        BattleResult {
            config: ConfigEcho::new(self.arena.size, self.max_ticks),
            initial_snapshot,
            final_snapshot: self.snapshot(),
            initial_perception,
            final_perception: self.perceptions.to_vec(),
            ticks,
            frames,
            status,
            winner,
        }
    }

    fn step(&mut self, tick: u32) -> TickOutcome {
        let start_snapshot = self.snapshot();
        let start_perceptions = self.perceptions.clone();

        // Rule evaluation against the pre-tick state. Dead robots keep
        // neutral controls and take no actions.
        let mut controls = [ControlState::neutral(), ControlState::neutral()];
        let mut matched = [Vec::new(), Vec::new()];
        for i in 0..2 {
            if !self.robots[i].alive {
                continue;
            }
            let ctx = SensorContext {
                actor: &self.robots[i],
                perception: &start_perceptions[i],
                arena_size: self.arena.size,
            };
            let outcome = evaluate_program(self.programs[i], &ctx);
            controls[i] = outcome.controls;
            matched[i] = outcome.matched_lines;
        }

        // Rotation
        let mut rotation_deltas = [0.0_f64; 2];
        for i in 0..2 {
            if self.robots[i].alive {
                rotation_deltas[i] = self.robots[i].apply_rotation(&controls[i]);
            }
        }

        // Movement and side boost, resolved simultaneously.
        let starts = [self.robots[0].position, self.robots[1].position];
        let mut proposals = starts;
        let mut attempted = [false; 2];
        let mut bursts: [Option<(BoostDirection, f64)>; 2] = [None, None];
        for i in 0..2 {
            if !self.robots[i].alive {
                continue;
            }
            self.robots[i].housekeeping();
            self.robots[i].try_ignite_boost(&controls[i]);

            let linear = self.robots[i].linear_delta(&controls[i]);
            let burst = self.robots[i].burst_tick();
            let mut delta = linear;
            if let Some((direction, distance)) = burst {
                let r = self.robots[i].right_unit();
                let sign = match direction {
                    BoostDirection::Right => 1.0,
                    BoostDirection::Left => -1.0,
                };
                delta.x += sign * distance * r.x;
                delta.y += sign * distance * r.y;
            }
            bursts[i] = burst;
            attempted[i] = delta.x.abs() > 1e-12 || delta.y.abs() > 1e-12;
            proposals[i] = Point::new(starts[i].x + delta.x, starts[i].y + delta.y);
        }

        let mut hit_boundary = [false; 2];
        for i in 0..2 {
            let (clamped, moved) = self.arena.clamp_point(proposals[i]);
            proposals[i] = clamped;
            hit_boundary[i] = moved;
        }

        let mut blocked_by_robot = [false; 2];
        if self.robots[0].alive
            && self.robots[1].alive
            && Arena::robots_overlap(proposals[0], proposals[1])
        {
            for i in 0..2 {
                if attempted[i] {
                    proposals[i] = starts[i];
                    blocked_by_robot[i] = true;
                    crate::debug_drive!(&self.ids[i], tick, "move blocked by robot");
                }
            }
        }
        for i in 0..2 {
            self.robots[i].position = proposals[i];
        }

        // Firing: cooldown tick-down, then spawn intents.
        for i in 0..2 {
            if self.robots[i].alive {
                self.robots[i].fire_cooldown = self.robots[i].fire_cooldown.saturating_sub(1);
            }
        }

        let mut fire_records = [
            FireRecord {
                requested: false,
                shot_fired: false,
                blocked: None,
            },
            FireRecord {
                requested: false,
                shot_fired: false,
                blocked: None,
            },
        ];
        let mut spawned_index: [Option<usize>; 2] = [None, None];
        for i in 0..2 {
            fire_records[i].requested = controls[i].fire;
            if !controls[i].fire || !self.robots[i].alive {
                continue;
            }
            if self.robots[i].fire_cooldown > 0 {
                fire_records[i].blocked = Some(FireBlockReason::Cooldown);
                crate::debug_weapon!(&self.ids[i], tick, "fire blocked: cooldown");
                continue;
            }
            if self.robots[i].energy < config::FIRE_ENERGY_COST {
                fire_records[i].blocked = Some(FireBlockReason::NoEnergy);
                crate::debug_weapon!(&self.ids[i], tick, "fire blocked: no energy");
                continue;
            }
            self.robots[i].energy -= config::FIRE_ENERGY_COST;
            self.robots[i].fire_cooldown = config::FIRE_COOLDOWN_TICKS;
            fire_records[i].shot_fired = true;

            let projectile = Projectile {
                shooter: i,
                target: 1 - i,
                position: self.robots[i].position,
                direction: self.robots[i].heading_unit(),
                cardinal: Cardinal::from_heading(self.robots[i].heading),
                traveled: 0.0,
                max_range: config::SHOT_RANGE,
            };
            spawned_index[i] = Some(self.projectiles.len());
            crate::debug_weapon!(
                &self.ids[i],
                tick,
                "fired toward {:?}, energy now {:.2}",
                projectile.cardinal,
                self.robots[i].energy
            );
            self.projectiles.push(projectile);
        }

        // Advance every in-flight projectile, oldest first.
        let mut pending_kill = [false; 2];
        let mut tick_traces = Vec::new();
        let mut action_traces: [Option<ProjectileTrace>; 2] = [None, None];
        let in_flight = std::mem::take(&mut self.projectiles);
        for (k, mut projectile) in in_flight.into_iter().enumerate() {
            let target = projectile.target;
            let target_can_be_hit = self.robots[target].alive && !pending_kill[target];
            let advance = self.arena.advance_projectile(
                &mut projectile,
                self.robots[target].position,
                target_can_be_hit,
            );
            let trace = ProjectileTrace::new(
                &projectile,
                &self.ids,
                advance.from,
                advance.to,
                advance.hit,
            );
            if advance.hit {
                pending_kill[target] = true;
            }
            if spawned_index[projectile.shooter] == Some(k) {
                action_traces[projectile.shooter] = Some(trace.clone());
            }
            tick_traces.push(trace);
            if !advance.retired {
                self.projectiles.push(projectile);
            }
        }

        // Apply pending kills before end-of-tick perception.
        for i in 0..2 {
            if pending_kill[i] {
                self.robots[i].kill();
                info!("{} destroyed by {} on tick {}", self.ids[i], self.ids[1 - i], tick);
            }
        }

        self.rebuild_perceptions();
        let end_perceptions = self.perceptions.clone();
        for i in 0..2 {
            if end_perceptions[i].enemy_visible != start_perceptions[i].enemy_visible {
                crate::debug_sense!(
                    &self.ids[i],
                    tick,
                    "enemy {}",
                    if end_perceptions[i].enemy_visible {
                        "sighted"
                    } else {
                        "lost"
                    }
                );
            }
        }
        for i in 0..2 {
            self.robots[i]
                .memory
                .update(&start_perceptions[i], &end_perceptions[i]);
        }
        let end_snapshot = self.snapshot();

        // Per-robot action records and replay decoration.
        let mut actions = Vec::with_capacity(2);
        let mut boost_effects = Vec::new();
        let mut hints = Vec::with_capacity(2);
        for i in 0..2 {
            let movement = MovementRecord {
                from: rounded_point(starts[i]),
                to: rounded_point(self.robots[i].position),
                attempted: attempted[i],
                hit_boundary: hit_boundary[i],
                blocked_by_robot: blocked_by_robot[i],
                boost_applied: bursts[i].is_some(),
            };
            let details = action_details(
                &controls[i],
                rotation_deltas[i],
                &movement,
                &fire_records[i],
                bursts[i],
            );
            actions.push(ActionRecord {
                robot_id: self.ids[i].clone(),
                controls: ControlsRecord::capture(&controls[i]),
                matched_rules: matched[i].clone(),
                rotation_delta: round2(rotation_deltas[i].to_degrees()),
                movement: movement.clone(),
                fire: fire_records[i].clone(),
                projectile: action_traces[i].clone(),
                details,
            });

            if let Some((direction, distance)) = bursts[i] {
                boost_effects.push(BoostEffect {
                    robot_id: self.ids[i].clone(),
                    from: rounded_point(starts[i]),
                    to: rounded_point(self.robots[i].position),
                    direction,
                    level: (distance * config::STRAFE_TICKS_PER_TILE).round(),
                });
            }

            let action = if fire_records[i].shot_fired {
                "fire"
            } else if attempted[i] {
                "move"
            } else {
                "idle"
            };
            let shooter_hit = tick_traces
                .iter()
                .any(|t| t.shooter == self.ids[i] && t.hit);
            let event = if pending_kill[i] {
                Some("destroyed".to_string())
            } else if shooter_hit {
                Some("hit".to_string())
            } else if blocked_by_robot[i] {
                Some("blocked".to_string())
            } else {
                None
            };
            hints.push(ActionHint {
                robot_id: self.ids[i].clone(),
                action: action.to_string(),
                event,
                boost: bursts[i].map(|(d, _)| d),
            });
        }

        let log = TickLog {
            tick,
            start_snapshot,
            start_perception: start_perceptions.to_vec(),
            actions,
            projectiles: tick_traces.clone(),
            end_snapshot: end_snapshot.clone(),
            end_perception: end_perceptions.to_vec(),
        };

        let frame = ReplayFrame {
            index: tick,
            snapshot: end_snapshot,
            projectiles: tick_traces,
            boost_effects,
            actions: hints,
        };

        TickOutcome { log, frame }
    }
}

fn rounded_point(p: Point) -> Point {
    Point::new(crate::utils::round4(p.x), crate::utils::round4(p.y))
}

fn empty_perception(arena: &Arena) -> Perception {
    build_perception(arena, Point::new(0.0, 0.0), 0.0, Point::new(0.0, 0.0), 0.0, false)
}

fn action_details(
    controls: &ControlState,
    rotation_delta: f64,
    movement: &MovementRecord,
    fire: &FireRecord,
    burst: Option<(BoostDirection, f64)>,
) -> String {
    let mut parts = Vec::new();
    if rotation_delta.abs() > 1e-12 {
        parts.push(format!("turned {:.2} deg", rotation_delta.to_degrees()));
    }
    if movement.attempted {
        parts.push(format!(
            "moved to ({:.2}, {:.2})",
            movement.to.x, movement.to.y
        ));
    } else if controls.throttle == 0.0 && controls.strafe == 0.0 {
        parts.push("held position".to_string());
    }
    if movement.hit_boundary {
        parts.push("hit boundary".to_string());
    }
    if movement.blocked_by_robot {
        parts.push("blocked by robot".to_string());
    }
    if let Some((direction, _)) = burst {
        parts.push(format!("boost {:?}", direction).to_lowercase());
    }
    if fire.shot_fired {
        parts.push("fired".to_string());
    } else if let Some(reason) = fire.blocked {
        parts.push(format!("fire blocked: {:?}", reason).to_lowercase());
    }
    parts.join("; ")
}
