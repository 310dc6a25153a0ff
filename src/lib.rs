//! duelbots: a deterministic two-robot combat arena driven by a rule DSL.
//!
//! The crate exposes two entry points: [`parse_program`] turns script text
//! into a typed program or a line-tagged diagnostic, and [`simulate`] runs a
//! full battle between two programs, producing a per-tick log, replay
//! frames, and final snapshots. Given identical inputs the serialized
//! result is byte-identical.

pub mod arena;
pub mod config;
pub mod game;
pub mod logging;
pub mod perception;
pub mod replay;
pub mod robot;
pub mod rules;
pub mod script;
pub mod sensors;
pub mod types;
pub mod utils;

pub use game::{simulate, BattleConfig, BattleError};
pub use replay::{BattleResult, BattleStatus};
pub use script::{parse_program, ParseError, Program};
