//! Typed rule-program representation produced by the parser.
//!
//! A program is an ordered rule list; rules keep their 1-based source line
//! for diagnostics and telemetry. `Display` renders canonical DSL text that
//! re-parses to a structurally equal program.

use std::fmt;

use crate::types::{BoostDirection, ControlField};

/// An immutable, parsed rule script.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// 1-based line in the source text.
    pub line: usize,
    pub condition: Option<Condition>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetControl { field: ControlField, value: f64 },
    Fire { enabled: bool },
    Boost { direction: BoostDirection },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Visibility {
        visible: bool,
    },
    Compare {
        left: NumExpr,
        op: CompareOp,
        right: NumExpr,
    },
    Logical {
        op: LogicalOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },
    Not {
        operand: Box<Condition>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Built-in numeric functions. Arity is enforced at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Min,
    Max,
    Clamp,
    Atan2,
    AngleDiff,
    NormalizeAngle,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ABS" => Some(Function::Abs),
            "MIN" => Some(Function::Min),
            "MAX" => Some(Function::Max),
            "CLAMP" => Some(Function::Clamp),
            "ATAN2" => Some(Function::Atan2),
            "ANGLE_DIFF" => Some(Function::AngleDiff),
            "NORMALIZE_ANGLE" => Some(Function::NormalizeAngle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "ABS",
            Function::Min => "MIN",
            Function::Max => "MAX",
            Function::Clamp => "CLAMP",
            Function::Atan2 => "ATAN2",
            Function::AngleDiff => "ANGLE_DIFF",
            Function::NormalizeAngle => "NORMALIZE_ANGLE",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Abs | Function::NormalizeAngle => 1,
            Function::Min | Function::Max | Function::Atan2 | Function::AngleDiff => 2,
            Function::Clamp => 3,
        }
    }
}

/// Sensor identifiers scripts may reference. Availability is decided per
/// tick by the sensor evaluator; the parser only checks the name is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    SelfX,
    SelfY,
    SelfHeading,
    SelfEnergy,
    BoostCooldown,
    TicksSinceEnemySeen,
    ArenaSize,
    EnemyX,
    EnemyY,
    EnemyDx,
    EnemyDy,
    EnemyDistance,
    EnemyHeading,
    PrevEnemyX,
    PrevEnemyY,
    PrevEnemyHeading,
    PrevEnemyDx,
    PrevEnemyDy,
    PrevEnemyDistance,
    EnemyXDelta,
    EnemyYDelta,
    EnemyHeadingDelta,
    EnemyDxDelta,
    EnemyDyDelta,
    EnemyDistanceDelta,
    WallAheadDistance,
    WallLeftDistance,
    WallRightDistance,
    WallBackDistance,
    WallNearestDistance,
}

impl Sensor {
    pub fn from_name(name: &str) -> Option<Self> {
        use Sensor::*;
        match name {
            "SELF_X" => Some(SelfX),
            "SELF_Y" => Some(SelfY),
            "SELF_HEADING" => Some(SelfHeading),
            "SELF_ENERGY" => Some(SelfEnergy),
            "BOOST_COOLDOWN" => Some(BoostCooldown),
            "TICKS_SINCE_ENEMY_SEEN" => Some(TicksSinceEnemySeen),
            "ARENA_SIZE" => Some(ArenaSize),
            "ENEMY_X" => Some(EnemyX),
            "ENEMY_Y" => Some(EnemyY),
            "ENEMY_DX" => Some(EnemyDx),
            "ENEMY_DY" => Some(EnemyDy),
            "ENEMY_DISTANCE" => Some(EnemyDistance),
            "ENEMY_HEADING" => Some(EnemyHeading),
            "PREV_ENEMY_X" => Some(PrevEnemyX),
            "PREV_ENEMY_Y" => Some(PrevEnemyY),
            "PREV_ENEMY_HEADING" => Some(PrevEnemyHeading),
            "PREV_ENEMY_DX" => Some(PrevEnemyDx),
            "PREV_ENEMY_DY" => Some(PrevEnemyDy),
            "PREV_ENEMY_DISTANCE" => Some(PrevEnemyDistance),
            "ENEMY_X_DELTA" => Some(EnemyXDelta),
            "ENEMY_Y_DELTA" => Some(EnemyYDelta),
            "ENEMY_HEADING_DELTA" => Some(EnemyHeadingDelta),
            "ENEMY_DX_DELTA" => Some(EnemyDxDelta),
            "ENEMY_DY_DELTA" => Some(EnemyDyDelta),
            "ENEMY_DISTANCE_DELTA" => Some(EnemyDistanceDelta),
            "WALL_AHEAD_DISTANCE" => Some(WallAheadDistance),
            "WALL_LEFT_DISTANCE" => Some(WallLeftDistance),
            "WALL_RIGHT_DISTANCE" => Some(WallRightDistance),
            "WALL_BACK_DISTANCE" => Some(WallBackDistance),
            "WALL_NEAREST_DISTANCE" => Some(WallNearestDistance),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        use Sensor::*;
        match self {
            SelfX => "SELF_X",
            SelfY => "SELF_Y",
            SelfHeading => "SELF_HEADING",
            SelfEnergy => "SELF_ENERGY",
            BoostCooldown => "BOOST_COOLDOWN",
            TicksSinceEnemySeen => "TICKS_SINCE_ENEMY_SEEN",
            ArenaSize => "ARENA_SIZE",
            EnemyX => "ENEMY_X",
            EnemyY => "ENEMY_Y",
            EnemyDx => "ENEMY_DX",
            EnemyDy => "ENEMY_DY",
            EnemyDistance => "ENEMY_DISTANCE",
            EnemyHeading => "ENEMY_HEADING",
            PrevEnemyX => "PREV_ENEMY_X",
            PrevEnemyY => "PREV_ENEMY_Y",
            PrevEnemyHeading => "PREV_ENEMY_HEADING",
            PrevEnemyDx => "PREV_ENEMY_DX",
            PrevEnemyDy => "PREV_ENEMY_DY",
            PrevEnemyDistance => "PREV_ENEMY_DISTANCE",
            EnemyXDelta => "ENEMY_X_DELTA",
            EnemyYDelta => "ENEMY_Y_DELTA",
            EnemyHeadingDelta => "ENEMY_HEADING_DELTA",
            EnemyDxDelta => "ENEMY_DX_DELTA",
            EnemyDyDelta => "ENEMY_DY_DELTA",
            EnemyDistanceDelta => "ENEMY_DISTANCE_DELTA",
            WallAheadDistance => "WALL_AHEAD_DISTANCE",
            WallLeftDistance => "WALL_LEFT_DISTANCE",
            WallRightDistance => "WALL_RIGHT_DISTANCE",
            WallBackDistance => "WALL_BACK_DISTANCE",
            WallNearestDistance => "WALL_NEAREST_DISTANCE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumExpr {
    Number(f64),
    Sensor(Sensor),
    Unary {
        op: UnaryOp,
        expr: Box<NumExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<NumExpr>,
        right: Box<NumExpr>,
    },
    Call {
        function: Function,
        args: Vec<NumExpr>,
    },
}

// --- Canonical text rendering ---

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Some(cond) => write!(f, "IF {} THEN {}", cond, self.command),
            None => write!(f, "{}", self.command),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetControl { field, value } => {
                let name = match field {
                    ControlField::Throttle => "THROTTLE",
                    ControlField::Strafe => "STRAFE",
                    ControlField::Turn => "TURN",
                };
                write!(f, "SET {} {}", name, value)
            }
            Command::Fire { enabled } => {
                write!(f, "FIRE {}", if *enabled { "ON" } else { "OFF" })
            }
            Command::Boost { direction } => {
                let side = match direction {
                    BoostDirection::Left => "LEFT",
                    BoostDirection::Right => "RIGHT",
                };
                write!(f, "BOOST {}", side)
            }
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Visibility { visible: true } => f.write_str("ENEMY_VISIBLE"),
            Condition::Visibility { visible: false } => f.write_str("NOT ENEMY_VISIBLE"),
            Condition::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Condition::Logical { op, left, right } => {
                let word = match op {
                    LogicalOp::And => "AND",
                    LogicalOp::Or => "OR",
                };
                // Logical nodes always print parenthesized so the tree survives
                // NOT > AND > OR binding on re-parse.
                write!(f, "({} {} {})", left, word, right)
            }
            Condition::Not { operand } => write!(f, "NOT {}", operand),
        }
    }
}

impl fmt::Display for NumExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumExpr::Number(n) => write!(f, "{}", n),
            NumExpr::Sensor(s) => f.write_str(s.name()),
            NumExpr::Unary { op, expr } => {
                let sign = match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Neg => "-",
                };
                write!(f, "{}{}", sign, expr)
            }
            NumExpr::Binary { op, left, right } => {
                let sym = match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                };
                write!(f, "({} {} {})", left, sym, right)
            }
            NumExpr::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_arity() {
        assert_eq!(Function::Abs.arity(), 1);
        assert_eq!(Function::Min.arity(), 2);
        assert_eq!(Function::Clamp.arity(), 3);
        assert_eq!(Function::AngleDiff.arity(), 2);
    }

    #[test]
    fn test_sensor_name_round_trip() {
        let all = [
            Sensor::SelfX,
            Sensor::TicksSinceEnemySeen,
            Sensor::EnemyDistanceDelta,
            Sensor::PrevEnemyHeading,
            Sensor::WallNearestDistance,
        ];
        for s in all {
            assert_eq!(Sensor::from_name(s.name()), Some(s));
        }
        assert_eq!(Sensor::from_name("ENEMY_SPEED"), None);
    }

    #[test]
    fn test_display_command() {
        let cmd = Command::SetControl {
            field: ControlField::Turn,
            value: -0.5,
        };
        assert_eq!(cmd.to_string(), "SET TURN -0.5");
        assert_eq!(Command::Fire { enabled: false }.to_string(), "FIRE OFF");
        assert_eq!(
            Command::Boost {
                direction: BoostDirection::Right
            }
            .to_string(),
            "BOOST RIGHT"
        );
    }

    #[test]
    fn test_display_condition_parenthesizes_logic() {
        let cond = Condition::Logical {
            op: LogicalOp::Or,
            left: Box::new(Condition::Visibility { visible: true }),
            right: Box::new(Condition::Not {
                operand: Box::new(Condition::Compare {
                    left: NumExpr::Sensor(Sensor::SelfEnergy),
                    op: CompareOp::Lt,
                    right: NumExpr::Number(50.0),
                }),
            }),
        };
        assert_eq!(
            cond.to_string(),
            "(ENEMY_VISIBLE OR NOT SELF_ENERGY < 50)"
        );
    }
}
