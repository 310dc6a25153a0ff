//! Shared primitive types for the arena, scripts, and the wire format.

use serde::{Deserialize, Serialize};

use crate::config;

/// A position or direction vector in arena tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Robot slot within a battle. Slot 0 spawns at the origin corner.
pub type RobotSlot = usize;

/// Cardinal reported alongside headings, derived by quadrant:
/// E for [315, 45), S for [45, 135), W for [135, 225), N for [225, 315).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinal {
    E,
    S,
    W,
    N,
}

impl Cardinal {
    /// Derive the cardinal from a heading in radians (y grows south, E = 0).
    pub fn from_heading(heading: f64) -> Self {
        let deg = heading.to_degrees().rem_euclid(360.0);
        if deg >= 45.0 && deg < 135.0 {
            Cardinal::S
        } else if deg >= 135.0 && deg < 225.0 {
            Cardinal::W
        } else if deg >= 225.0 && deg < 315.0 {
            Cardinal::N
        } else {
            Cardinal::E
        }
    }
}

/// Which control field a SET command writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlField {
    Throttle,
    Strafe,
    Turn,
}

/// Side a boost burst pushes toward, relative to heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoostDirection {
    Left,
    Right,
}

/// The control vector a rule pass produces. Starts neutral each tick;
/// later matching rules overwrite earlier ones per field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub throttle: f64,
    pub strafe: f64,
    pub turn: f64,
    pub fire: bool,
    pub boost: Option<BoostDirection>,
}

impl ControlState {
    pub fn neutral() -> Self {
        ControlState {
            throttle: 0.0,
            strafe: 0.0,
            turn: 0.0,
            fire: false,
            boost: None,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Distance band the perception reports for a visible enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceBand {
    Near,
    Mid,
    Far,
}

impl DistanceBand {
    pub fn from_distance(distance: f64) -> Self {
        if distance <= config::DISTANCE_BAND_NEAR {
            DistanceBand::Near
        } else if distance <= config::DISTANCE_BAND_MID {
            DistanceBand::Mid
        } else {
            DistanceBand::Far
        }
    }
}

/// Bearing of a visible enemy relative to the actor's heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bearing {
    Front,
    FrontLeft,
    FrontRight,
}

/// Arena wall a ray terminates on. NORTH is y = 0 (y grows south).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WallSide {
    North,
    East,
    South,
    West,
}

/// Heading-relative ray direction used for wall sensing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelativeDirection {
    Ahead,
    Left,
    Right,
    Back,
}

/// A projectile in flight between ticks.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub shooter: RobotSlot,
    pub target: RobotSlot,
    pub position: Point,
    /// Unit direction fixed at spawn.
    pub direction: Point,
    /// Cardinal of the shooter's heading at spawn.
    pub cardinal: Cardinal,
    pub traveled: f64,
    pub max_range: f64,
}
