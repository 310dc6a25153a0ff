//! Rule evaluation: walk a program top to bottom against the sensor table
//! and produce the tick's control vector. Later matches overwrite earlier
//! ones per field; authors rely on that ordering for default-then-override
//! scripts, so rules are never reordered or deduplicated.

use crate::script::ast::{
    BinaryOp, Command, CompareOp, Condition, Function, LogicalOp, NumExpr, UnaryOp,
};
use crate::script::Program;
use crate::sensors::{sensor_value, SensorContext};
use crate::types::{ControlField, ControlState};
use crate::utils::{angle_diff_deg, normalize_deg};

/// Result of one rule pass.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub controls: ControlState,
    /// Source lines of the rules that matched, in evaluation order.
    pub matched_lines: Vec<u32>,
}

pub fn evaluate_program(program: &Program, ctx: &SensorContext<'_>) -> RuleOutcome {
    let mut controls = ControlState::neutral();
    let mut matched_lines = Vec::new();

    for rule in &program.rules {
        let fires = match &rule.condition {
            None => true,
            Some(cond) => eval_condition(cond, ctx),
        };
        if !fires {
            continue;
        }
        matched_lines.push(rule.line as u32);
        match &rule.command {
            Command::SetControl { field, value } => match field {
                ControlField::Throttle => controls.throttle = *value,
                ControlField::Strafe => controls.strafe = *value,
                ControlField::Turn => controls.turn = *value,
            },
            Command::Fire { enabled } => controls.fire = *enabled,
            Command::Boost { direction } => controls.boost = Some(*direction),
        }
    }

    if !matched_lines.is_empty() {
        crate::debug_rules!(&ctx.actor.id, "matched lines {:?}", matched_lines);
    }

    RuleOutcome {
        controls,
        matched_lines,
    }
}

/// Conditions never fail: an unavailable operand makes its comparison false.
pub fn eval_condition(condition: &Condition, ctx: &SensorContext<'_>) -> bool {
    match condition {
        Condition::Visibility { visible } => ctx.perception.enemy_visible == *visible,
        Condition::Compare { left, op, right } => {
            match (eval_expr(left, ctx), eval_expr(right, ctx)) {
                (Some(l), Some(r)) => match op {
                    CompareOp::Gt => l > r,
                    CompareOp::Ge => l >= r,
                    CompareOp::Lt => l < r,
                    CompareOp::Le => l <= r,
                    CompareOp::Eq => l == r,
                    CompareOp::Ne => l != r,
                },
                _ => false,
            }
        }
        Condition::Logical { op, left, right } => {
            let l = eval_condition(left, ctx);
            let r = eval_condition(right, ctx);
            match op {
                LogicalOp::And => l && r,
                LogicalOp::Or => l || r,
            }
        }
        Condition::Not { operand } => !eval_condition(operand, ctx),
    }
}

/// Evaluate a numeric expression. None means unavailable: a referenced
/// sensor had no value, or the arithmetic produced NaN/Inf.
pub fn eval_expr(expr: &NumExpr, ctx: &SensorContext<'_>) -> Option<f64> {
    let value = match expr {
        NumExpr::Number(n) => *n,
        NumExpr::Sensor(sensor) => sensor_value(ctx, *sensor)?,
        NumExpr::Unary { op, expr } => {
            let v = eval_expr(expr, ctx)?;
            match op {
                UnaryOp::Plus => v,
                UnaryOp::Neg => -v,
            }
        }
        NumExpr::Binary { op, left, right } => {
            let l = eval_expr(left, ctx)?;
            let r = eval_expr(right, ctx)?;
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
            }
        }
        NumExpr::Call { function, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, ctx)?);
            }
            apply_function(*function, &values)
        }
    };
    value.is_finite().then_some(value)
}

fn apply_function(function: Function, args: &[f64]) -> f64 {
    match function {
        Function::Abs => args[0].abs(),
        Function::Min => args[0].min(args[1]),
        Function::Max => args[0].max(args[1]),
        // Manual clamp: a reversed lo/hi from a script must not panic.
        Function::Clamp => args[0].max(args[1]).min(args[2]),
        Function::Atan2 => normalize_deg(args[0].atan2(args[1]).to_degrees()),
        Function::AngleDiff => angle_diff_deg(args[0], args[1]),
        Function::NormalizeAngle => normalize_deg(args[0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::perception::build_perception;
    use crate::robot::RobotState;
    use crate::script::parse_program;
    use crate::types::{BoostDirection, Point};
    use assert_approx_eq::assert_approx_eq;

    struct Fixture {
        actor: RobotState,
        perception: crate::perception::Perception,
    }

    fn fixture(enemy_visible: bool) -> Fixture {
        let actor = RobotState::new(0, "A", Point::new(3.0, 5.0), 0.0);
        let opponent = if enemy_visible {
            Point::new(6.0, 5.0)
        } else {
            Point::new(1.0, 5.0)
        };
        let arena = Arena::new(10);
        let perception = build_perception(
            &arena,
            actor.position,
            actor.heading,
            opponent,
            std::f64::consts::PI,
            true,
        );
        Fixture { actor, perception }
    }

    fn eval(fix: &Fixture, source: &str) -> RuleOutcome {
        let program = parse_program(source).unwrap();
        let ctx = SensorContext {
            actor: &fix.actor,
            perception: &fix.perception,
            arena_size: 10,
        };
        evaluate_program(&program, &ctx)
    }

    #[test]
    fn test_last_match_wins_per_field() {
        let fix = fixture(true);
        let out = eval(
            &fix,
            "SET THROTTLE 1\nSET TURN 0.5\nIF ENEMY_VISIBLE THEN SET THROTTLE 0.25\n",
        );
        assert_approx_eq!(out.controls.throttle, 0.25);
        assert_approx_eq!(out.controls.turn, 0.5);
        assert_eq!(out.matched_lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_fields_are_independent() {
        let fix = fixture(true);
        let out = eval(&fix, "SET THROTTLE 1\nFIRE ON\nBOOST LEFT\nFIRE OFF\n");
        assert_approx_eq!(out.controls.throttle, 1.0);
        assert!(!out.controls.fire);
        assert_eq!(out.controls.boost, Some(BoostDirection::Left));
    }

    #[test]
    fn test_unmatched_condition_skips_command() {
        let fix = fixture(false);
        let out = eval(&fix, "SET THROTTLE 1\nIF ENEMY_VISIBLE THEN FIRE ON\n");
        assert!(!out.controls.fire);
        assert_eq!(out.matched_lines, vec![1]);
    }

    #[test]
    fn test_unavailable_sensor_comparison_is_false() {
        let fix = fixture(false);
        let out = eval(&fix, "IF ENEMY_DISTANCE < 5 THEN FIRE ON\nSET TURN 1\n");
        assert!(!out.controls.fire);
        // NOT of an unavailable comparison is true.
        let out = eval(&fix, "IF NOT ENEMY_DISTANCE < 5 THEN SET THROTTLE 1\n");
        assert_approx_eq!(out.controls.throttle, 1.0);
    }

    #[test]
    fn test_division_by_zero_is_unavailable_not_a_crash() {
        let fix = fixture(true);
        let out = eval(&fix, "IF 1 / 0 > 0 THEN FIRE ON\nSET TURN 0.1\n");
        assert!(!out.controls.fire);
        assert_approx_eq!(out.controls.turn, 0.1);
    }

    #[test]
    fn test_visible_comparison_fires() {
        let fix = fixture(true);
        let out = eval(&fix, "IF ENEMY_DISTANCE <= 4 AND ENEMY_DX > 0 THEN FIRE ON\n");
        assert!(out.controls.fire);
    }

    #[test]
    fn test_function_evaluation() {
        let fix = fixture(true);
        let out = eval(
            &fix,
            "IF MAX(ENEMY_DX, 1) == 3 AND CLAMP(10, 0, 5) == 5 THEN FIRE ON\n",
        );
        assert!(out.controls.fire);

        // Reversed CLAMP bounds must not panic.
        let out = eval(&fix, "IF CLAMP(1, 5, 0) >= 0 THEN SET STRAFE 1\n");
        assert_approx_eq!(out.controls.strafe, 1.0);
    }

    #[test]
    fn test_angle_functions_in_degrees() {
        let fix = fixture(true);
        // Enemy due east: ATAN2(dy, dx) is 0 degrees, matching SELF_HEADING 0.
        let out = eval(
            &fix,
            "IF ABS(ANGLE_DIFF(ATAN2(ENEMY_DY, ENEMY_DX), SELF_HEADING)) < 1 THEN FIRE ON\n",
        );
        assert!(out.controls.fire);

        let out = eval(&fix, "IF NORMALIZE_ANGLE(-90) == 270 THEN SET TURN 1\n");
        assert_approx_eq!(out.controls.turn, 1.0);
    }
}
