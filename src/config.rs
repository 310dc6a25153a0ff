//! Configuration constants for the duelbots arena.

// All rates are per-second unless noted; the tick loop scales by TICK_SECONDS.

// Tick timing
pub const TICK_RATE: u32 = 60; // Logical ticks per second
pub const TICK_SECONDS: f64 = 1.0 / TICK_RATE as f64;
pub const TICK_MILLIS: f64 = 1000.0 / TICK_RATE as f64;

// Arena
pub const DEFAULT_ARENA_SIZE: u32 = 10;
pub const MIN_ARENA_SIZE: u32 = 6;
pub const MAX_ARENA_SIZE: u32 = 40;

// Battle length
pub const DEFAULT_MAX_TICKS: u32 = 500;
pub const MIN_MAX_TICKS: u32 = 20;
pub const MAX_MAX_TICKS: u32 = 5000;

// Script limits
pub const MAX_SCRIPT_LINES: usize = 200;

// Vision
pub const VISION_RADIUS: f64 = 8.0; // Tiles
pub const VISION_HALF_ANGLE: f64 = std::f64::consts::FRAC_PI_3; // +/- 60 degrees
pub const DISTANCE_BAND_NEAR: f64 = 2.0;
pub const DISTANCE_BAND_MID: f64 = 4.0;
pub const BEARING_FRONT_LATERAL: f64 = 0.75; // |lateral| at or under this reads FRONT

// Movement (ticks to cross one tile at full control input)
pub const FORWARD_TICKS_PER_TILE: f64 = 8.0;
pub const BACKWARD_TICKS_PER_TILE: f64 = 16.0;
pub const STRAFE_TICKS_PER_TILE: f64 = 12.0;
pub const TURN_RATE_DEGREES_PER_SEC: f64 = 360.0;
pub const FIRE_MOVE_PENALTY: f64 = 0.5; // Applied to rotation and both movement axes while trigger held

// Collision
pub const ROBOT_COLLISION_RADIUS: f64 = 0.34;

// Energy (shared pool for firing and boosting)
pub const ENERGY_MAX: f64 = 100.0;
pub const ENERGY_REGEN_PER_SEC: f64 = 15.0;

// Firing
pub const FIRE_ENERGY_COST: f64 = 6.0;
pub const FIRE_COOLDOWN_TICKS: u32 = 1;
pub const PROJECTILE_TICKS_PER_TILE: f64 = 2.0;
pub const SHOT_RANGE: f64 = 5.0; // Tiles
pub const SHOT_HIT_RADIUS: f64 = 0.36;

// Side boost
pub const SIDE_BOOST_ENERGY_COST: f64 = 35.0;
pub const SIDE_BOOST_COOLDOWN_TICKS: u32 = 10;
pub const SIDE_BOOST_BURST_TICKS: u32 = 5;
pub const SIDE_BOOST_FORCE_SEQUENCE: [f64; 5] = [5.0, 4.0, 3.0, 2.0, 1.0];

// Enemy memory
pub const TICKS_SINCE_SEEN_SENTINEL: u32 = 9999;

/// Tiles a projectile covers in one tick.
pub const PROJECTILE_STEP_PER_TICK: f64 = 1.0 / PROJECTILE_TICKS_PER_TILE;

/// Tiles moved in one tick at full forward throttle, before penalties.
pub const FORWARD_STEP_PER_TICK: f64 = 1.0 / FORWARD_TICKS_PER_TILE;

/// Tiles moved in one tick at full reverse throttle, before penalties.
pub const BACKWARD_STEP_PER_TICK: f64 = 1.0 / BACKWARD_TICKS_PER_TILE;

/// Tiles moved in one tick at full strafe, before penalties.
pub const STRAFE_STEP_PER_TICK: f64 = 1.0 / STRAFE_TICKS_PER_TILE;

/// Energy restored per tick.
pub const ENERGY_REGEN_PER_TICK: f64 = ENERGY_REGEN_PER_SEC * TICK_SECONDS;
