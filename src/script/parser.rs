//! Rule DSL parser: turns script text into a typed [`Program`].
//!
//! One rule per line. Blank lines and `#` comments are skipped. Every error
//! carries the 1-based source line; no partial program is ever returned.

use thiserror::Error;

use super::ast::{
    BinaryOp, Command, CompareOp, Condition, Function, LogicalOp, NumExpr, Program, Rule, Sensor,
    UnaryOp,
};
use super::lexer::{tokenize, Token};
use crate::config;
use crate::types::{BoostDirection, ControlField};
use crate::utils::round4;

/// Script diagnostic with its 1-based source line.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

fn err(line: usize, message: impl Into<String>) -> ParseError {
    ParseError {
        line,
        message: message.into(),
    }
}

/// Parse a rule script into an immutable program.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    if source.trim().is_empty() {
        return Err(err(1, "script is empty"));
    }

    let line_count = source.lines().count();
    if line_count > config::MAX_SCRIPT_LINES {
        return Err(err(
            config::MAX_SCRIPT_LINES + 1,
            format!(
                "script has {} lines, maximum is {}",
                line_count,
                config::MAX_SCRIPT_LINES
            ),
        ));
    }

    let mut rules = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line = idx + 1;

        // Strip '#' comments, then whitespace
        let code = raw_line.split('#').next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }

        let tokens = tokenize(code).map_err(|message| err(line, message))?;
        rules.push(parse_rule(&tokens, line)?);
    }

    if rules.is_empty() {
        return Err(err(1, "script has no executable rules"));
    }

    Ok(Program { rules })
}

fn parse_rule(tokens: &[Token], line: usize) -> Result<Rule, ParseError> {
    if tokens.first() == Some(&Token::Ident("IF".to_string())) {
        let then_pos = find_depth_zero_ident(tokens, 1, "THEN")
            .ok_or_else(|| err(line, "IF without matching THEN"))?;
        let cond_tokens = &tokens[1..then_pos];
        if cond_tokens.is_empty() {
            return Err(err(line, "IF requires a condition before THEN"));
        }
        let cmd_tokens = &tokens[then_pos + 1..];
        if cmd_tokens.is_empty() {
            return Err(err(line, "THEN requires a command"));
        }
        let condition = parse_condition(cond_tokens, line)?;
        let command = parse_command(cmd_tokens, line)?;
        Ok(Rule {
            line,
            condition: Some(condition),
            command,
        })
    } else {
        let command = parse_command(tokens, line)?;
        Ok(Rule {
            line,
            condition: None,
            command,
        })
    }
}

/// Position of the first `name` identifier at parenthesis depth zero, or None.
fn find_depth_zero_ident(tokens: &[Token], start: usize, name: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate().skip(start) {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            Token::Ident(s) if depth == 0 && s == name => return Some(i),
            _ => {}
        }
    }
    None
}

// --- Commands ---

fn parse_command(tokens: &[Token], line: usize) -> Result<Command, ParseError> {
    let head = match tokens.first() {
        Some(Token::Ident(s)) => s.as_str(),
        Some(tok) => return Err(err(line, format!("expected a command, found {}", tok.describe()))),
        None => return Err(err(line, "expected a command")),
    };

    match head {
        "SET" => parse_set(&tokens[1..], line),
        "FIRE" => parse_fire(&tokens[1..], line),
        "SHOOT" => {
            if tokens.len() > 1 {
                return Err(err(line, "SHOOT takes no arguments"));
            }
            Ok(Command::Fire { enabled: true })
        }
        "BOOST" => parse_boost(&tokens[1..], line),
        other => Err(err(line, format!("unknown command '{}'", other))),
    }
}

fn parse_set(tokens: &[Token], line: usize) -> Result<Command, ParseError> {
    let field = match tokens.first() {
        Some(Token::Ident(s)) => match s.as_str() {
            "THROTTLE" => ControlField::Throttle,
            "STRAFE" => ControlField::Strafe,
            "TURN" => ControlField::Turn,
            other => {
                return Err(err(
                    line,
                    format!("unknown SET field '{}', expected THROTTLE, STRAFE, or TURN", other),
                ))
            }
        },
        _ => return Err(err(line, "SET requires a field and a value")),
    };

    let (value, consumed) = parse_signed_number(&tokens[1..])
        .ok_or_else(|| err(line, "SET requires a numeric value"))?;
    if tokens.len() > 1 + consumed {
        return Err(err(line, "unexpected tokens after SET value"));
    }
    if !(-1.0..=1.0).contains(&value) {
        return Err(err(
            line,
            format!("SET value {} is outside [-1, 1]", value),
        ));
    }
    Ok(Command::SetControl {
        field,
        value: round4(value),
    })
}

/// Parse an optionally signed numeric literal. Returns (value, tokens consumed).
fn parse_signed_number(tokens: &[Token]) -> Option<(f64, usize)> {
    match tokens {
        [Token::Number(n), ..] => Some((*n, 1)),
        [Token::Minus, Token::Number(n), ..] => Some((-n, 2)),
        [Token::Plus, Token::Number(n), ..] => Some((*n, 2)),
        _ => None,
    }
}

fn parse_fire(tokens: &[Token], line: usize) -> Result<Command, ParseError> {
    let enabled = match tokens {
        [] => true,
        [Token::Ident(s)] => match s.as_str() {
            "ON" | "TRUE" => true,
            "OFF" | "FALSE" => false,
            other => {
                return Err(err(
                    line,
                    format!("FIRE accepts ON, OFF, 1, 0, TRUE, or FALSE, not '{}'", other),
                ))
            }
        },
        [Token::Number(n)] if *n == 1.0 => true,
        [Token::Number(n)] if *n == 0.0 => false,
        _ => return Err(err(line, "FIRE accepts ON, OFF, 1, 0, TRUE, or FALSE")),
    };
    Ok(Command::Fire { enabled })
}

fn parse_boost(tokens: &[Token], line: usize) -> Result<Command, ParseError> {
    let direction = match tokens {
        [Token::Ident(s)] => match s.as_str() {
            "LEFT" => BoostDirection::Left,
            "RIGHT" => BoostDirection::Right,
            other => {
                return Err(err(
                    line,
                    format!("BOOST requires LEFT or RIGHT, not '{}'", other),
                ))
            }
        },
        _ => return Err(err(line, "BOOST requires LEFT or RIGHT")),
    };
    Ok(Command::Boost { direction })
}

// --- Conditions ---

fn parse_condition(tokens: &[Token], line: usize) -> Result<Condition, ParseError> {
    let mut pos = 0;
    let cond = parse_or(tokens, &mut pos, line)?;
    if pos != tokens.len() {
        return Err(err(
            line,
            format!("unexpected {} after condition", tokens[pos].describe()),
        ));
    }
    Ok(cond)
}

fn parse_or(tokens: &[Token], pos: &mut usize, line: usize) -> Result<Condition, ParseError> {
    let mut left = parse_and(tokens, pos, line)?;
    while matches!(tokens.get(*pos), Some(Token::Ident(s)) if s == "OR") {
        *pos += 1;
        let right = parse_and(tokens, pos, line)?;
        left = Condition::Logical {
            op: LogicalOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_and(tokens: &[Token], pos: &mut usize, line: usize) -> Result<Condition, ParseError> {
    let mut left = parse_not(tokens, pos, line)?;
    while matches!(tokens.get(*pos), Some(Token::Ident(s)) if s == "AND") {
        *pos += 1;
        let right = parse_not(tokens, pos, line)?;
        left = Condition::Logical {
            op: LogicalOp::And,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_not(tokens: &[Token], pos: &mut usize, line: usize) -> Result<Condition, ParseError> {
    if matches!(tokens.get(*pos), Some(Token::Ident(s)) if s == "NOT") {
        *pos += 1;
        let operand = parse_not(tokens, pos, line)?;
        return Ok(Condition::Not {
            operand: Box::new(operand),
        });
    }
    parse_atom_condition(tokens, pos, line)
}

/// Parse one atomic condition: a parenthesized condition, ENEMY_VISIBLE, or a
/// comparison. The comparison operator is looked for at depth zero only, so
/// parenthesized arithmetic on either side never splits the wrong way.
fn parse_atom_condition(
    tokens: &[Token],
    pos: &mut usize,
    line: usize,
) -> Result<Condition, ParseError> {
    let start = *pos;
    let end = atom_extent(tokens, start, line)?;
    if start == end {
        return Err(err(line, "expected a condition"));
    }

    let cmp_pos = (start..end).find(|&i| {
        tokens[i].is_cmp() && depth_at(tokens, start, i) == 0
    });

    if let Some(cmp) = cmp_pos {
        let op = compare_op(&tokens[cmp]);
        if cmp == start {
            return Err(err(line, "comparison is missing its left side"));
        }
        if cmp + 1 == end {
            return Err(err(line, "comparison is missing its right side"));
        }
        let left = parse_num_expr(&tokens[start..cmp], line)?;
        let right = parse_num_expr(&tokens[cmp + 1..end], line)?;
        *pos = end;
        return Ok(Condition::Compare { left, op, right });
    }

    // ENEMY_VISIBLE atom
    if end == start + 1 {
        if let Token::Ident(s) = &tokens[start] {
            if s == "ENEMY_VISIBLE" {
                *pos = end;
                return Ok(Condition::Visibility { visible: true });
            }
        }
    }

    // Parenthesized sub-condition
    if tokens[start] == Token::LParen {
        if let Some(close) = matching_rparen(tokens, start) {
            if close == end - 1 {
                let mut inner_pos = 0;
                let inner = &tokens[start + 1..close];
                if inner.is_empty() {
                    return Err(err(line, "empty parentheses in condition"));
                }
                let cond = parse_or(inner, &mut inner_pos, line)?;
                if inner_pos != inner.len() {
                    return Err(err(
                        line,
                        format!(
                            "unexpected {} in condition",
                            inner[inner_pos].describe()
                        ),
                    ));
                }
                *pos = end;
                return Ok(cond);
            }
        }
        return Err(err(line, "unbalanced parentheses in condition"));
    }

    Err(err(
        line,
        format!(
            "expected a comparison or ENEMY_VISIBLE, found {}",
            tokens[start].describe()
        ),
    ))
}

/// End (exclusive) of the current atomic condition: the first depth-zero
/// AND/OR keyword, or the end of the token list.
fn atom_extent(tokens: &[Token], start: usize, line: usize) -> Result<usize, ParseError> {
    let mut depth = 0i32;
    for i in start..tokens.len() {
        match &tokens[i] {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth < 0 {
                    return Err(err(line, "unbalanced parentheses in condition"));
                }
            }
            Token::Ident(s) if depth == 0 && (s == "AND" || s == "OR") => return Ok(i),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(err(line, "unbalanced parentheses in condition"));
    }
    Ok(tokens.len())
}

fn depth_at(tokens: &[Token], start: usize, target: usize) -> i32 {
    let mut depth = 0i32;
    for tok in &tokens[start..target] {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            _ => {}
        }
    }
    depth
}

fn matching_rparen(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn compare_op(token: &Token) -> CompareOp {
    match token {
        Token::Gt => CompareOp::Gt,
        Token::Ge => CompareOp::Ge,
        Token::Lt => CompareOp::Lt,
        Token::Le => CompareOp::Le,
        Token::EqEq => CompareOp::Eq,
        Token::Ne => CompareOp::Ne,
        _ => unreachable!("compare_op called on a non-comparison token"),
    }
}

// --- Numeric expressions ---

fn parse_num_expr(tokens: &[Token], line: usize) -> Result<NumExpr, ParseError> {
    let mut pos = 0;
    let expr = parse_additive(tokens, &mut pos, line)?;
    if pos != tokens.len() {
        return Err(err(
            line,
            format!("unexpected {} in expression", tokens[pos].describe()),
        ));
    }
    Ok(expr)
}

fn parse_additive(tokens: &[Token], pos: &mut usize, line: usize) -> Result<NumExpr, ParseError> {
    let mut left = parse_term(tokens, pos, line)?;
    loop {
        let op = match tokens.get(*pos) {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Sub,
            _ => break,
        };
        *pos += 1;
        let right = parse_term(tokens, pos, line)?;
        left = NumExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_term(tokens: &[Token], pos: &mut usize, line: usize) -> Result<NumExpr, ParseError> {
    let mut left = parse_factor(tokens, pos, line)?;
    loop {
        let op = match tokens.get(*pos) {
            Some(Token::Star) => BinaryOp::Mul,
            Some(Token::Slash) => BinaryOp::Div,
            _ => break,
        };
        *pos += 1;
        let right = parse_factor(tokens, pos, line)?;
        left = NumExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_factor(tokens: &[Token], pos: &mut usize, line: usize) -> Result<NumExpr, ParseError> {
    match tokens.get(*pos) {
        Some(Token::Plus) => {
            *pos += 1;
            let expr = parse_factor(tokens, pos, line)?;
            Ok(NumExpr::Unary {
                op: UnaryOp::Plus,
                expr: Box::new(expr),
            })
        }
        Some(Token::Minus) => {
            *pos += 1;
            let expr = parse_factor(tokens, pos, line)?;
            Ok(NumExpr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            })
        }
        Some(Token::Number(n)) => {
            *pos += 1;
            Ok(NumExpr::Number(*n))
        }
        Some(Token::LParen) => {
            *pos += 1;
            let expr = parse_additive(tokens, pos, line)?;
            if tokens.get(*pos) != Some(&Token::RParen) {
                return Err(err(line, "missing closing parenthesis in expression"));
            }
            *pos += 1;
            Ok(expr)
        }
        Some(Token::Ident(name)) => {
            let name = name.clone();
            *pos += 1;
            if tokens.get(*pos) == Some(&Token::LParen) {
                return parse_call(&name, tokens, pos, line);
            }
            match name.as_str() {
                "PI" => Ok(NumExpr::Number(std::f64::consts::PI)),
                "TAU" => Ok(NumExpr::Number(std::f64::consts::TAU)),
                _ => match Sensor::from_name(&name) {
                    Some(sensor) => Ok(NumExpr::Sensor(sensor)),
                    None => Err(err(line, format!("unknown identifier '{}'", name))),
                },
            }
        }
        Some(tok) => Err(err(
            line,
            format!("unexpected {} in expression", tok.describe()),
        )),
        None => Err(err(line, "expression ended unexpectedly")),
    }
}

fn parse_call(
    name: &str,
    tokens: &[Token],
    pos: &mut usize,
    line: usize,
) -> Result<NumExpr, ParseError> {
    let function = Function::from_name(name)
        .ok_or_else(|| err(line, format!("unknown function '{}'", name)))?;

    // Consume '('
    *pos += 1;
    let mut args = Vec::new();
    if tokens.get(*pos) == Some(&Token::RParen) {
        *pos += 1;
    } else {
        loop {
            args.push(parse_additive(tokens, pos, line)?);
            match tokens.get(*pos) {
                Some(Token::Comma) => {
                    *pos += 1;
                }
                Some(Token::RParen) => {
                    *pos += 1;
                    break;
                }
                _ => {
                    return Err(err(
                        line,
                        format!("missing closing parenthesis in {} call", function.name()),
                    ))
                }
            }
        }
    }

    if args.len() != function.arity() {
        return Err(err(
            line,
            format!(
                "{} expects {} argument{}, got {}",
                function.name(),
                function.arity(),
                if function.arity() == 1 { "" } else { "s" },
                args.len()
            ),
        ));
    }

    Ok(NumExpr::Call { function, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Rule {
        let program = parse_program(line).unwrap();
        assert_eq!(program.rules.len(), 1);
        program.rules.into_iter().next().unwrap()
    }

    #[test]
    fn test_unconditional_commands() {
        assert_eq!(
            parse_one("SET THROTTLE 1").command,
            Command::SetControl {
                field: ControlField::Throttle,
                value: 1.0
            }
        );
        assert_eq!(
            parse_one("SET TURN -0.25").command,
            Command::SetControl {
                field: ControlField::Turn,
                value: -0.25
            }
        );
        assert_eq!(parse_one("FIRE").command, Command::Fire { enabled: true });
        assert_eq!(parse_one("FIRE OFF").command, Command::Fire { enabled: false });
        assert_eq!(parse_one("FIRE 0").command, Command::Fire { enabled: false });
        assert_eq!(parse_one("SHOOT").command, Command::Fire { enabled: true });
        assert_eq!(
            parse_one("BOOST LEFT").command,
            Command::Boost {
                direction: BoostDirection::Left
            }
        );
    }

    #[test]
    fn test_set_value_normalized_to_four_decimals() {
        let rule = parse_one("SET STRAFE 0.123456");
        assert_eq!(
            rule.command,
            Command::SetControl {
                field: ControlField::Strafe,
                value: 0.1235
            }
        );
    }

    #[test]
    fn test_set_value_out_of_range() {
        let e = parse_program("SET THROTTLE 1.5").unwrap_err();
        assert_eq!(e.line, 1);
        assert!(e.message.contains("outside"));
        assert!(parse_program("SET TURN -1.01").is_err());
    }

    #[test]
    fn test_conditional_rule() {
        let rule = parse_one("IF ENEMY_VISIBLE THEN FIRE ON");
        assert_eq!(
            rule.condition,
            Some(Condition::Visibility { visible: true })
        );
        assert_eq!(rule.command, Command::Fire { enabled: true });
    }

    #[test]
    fn test_comparison_condition() {
        let rule = parse_one("IF ENEMY_DISTANCE <= 4 THEN SET THROTTLE 0.5");
        match rule.condition.unwrap() {
            Condition::Compare { left, op, right } => {
                assert_eq!(left, NumExpr::Sensor(Sensor::EnemyDistance));
                assert_eq!(op, CompareOp::Le);
                assert_eq!(right, NumExpr::Number(4.0));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_equals_alias() {
        let a = parse_one("IF TICKS_SINCE_ENEMY_SEEN = 0 THEN FIRE").condition;
        let b = parse_one("IF TICKS_SINCE_ENEMY_SEEN == 0 THEN FIRE").condition;
        assert_eq!(a, b);
    }

    #[test]
    fn test_logic_precedence_not_and_or() {
        // NOT binds tighter than AND, AND tighter than OR:
        // A OR NOT B AND C == A OR ((NOT B) AND C)
        let rule = parse_one(
            "IF ENEMY_VISIBLE OR NOT SELF_ENERGY < 35 AND SELF_X > 2 THEN FIRE",
        );
        match rule.condition.unwrap() {
            Condition::Logical {
                op: LogicalOp::Or,
                left,
                right,
            } => {
                assert_eq!(*left, Condition::Visibility { visible: true });
                match *right {
                    Condition::Logical {
                        op: LogicalOp::And,
                        ref left,
                        ..
                    } => {
                        assert!(matches!(**left, Condition::Not { .. }));
                    }
                    ref other => panic!("expected AND, got {:?}", other),
                }
            }
            other => panic!("expected OR at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_condition() {
        let rule = parse_one("IF (ENEMY_VISIBLE OR SELF_ENERGY > 50) AND SELF_X < 5 THEN FIRE");
        match rule.condition.unwrap() {
            Condition::Logical {
                op: LogicalOp::And,
                left,
                ..
            } => {
                assert!(matches!(
                    *left,
                    Condition::Logical {
                        op: LogicalOp::Or,
                        ..
                    }
                ));
            }
            other => panic!("expected AND at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_split_only_at_depth_zero() {
        // The '>' inside CLAMP's parentheses must not split the comparison.
        let rule = parse_one("IF CLAMP(SELF_X, 0, 9) - 1 > 2 THEN FIRE");
        match rule.condition.unwrap() {
            Condition::Compare { op, right, .. } => {
                assert_eq!(op, CompareOp::Gt);
                assert_eq!(right, NumExpr::Number(2.0));
            }
            other => panic!("expected comparison, got {:?}", other),
        }

        let rule = parse_one("IF (1 + 2) * 2 > SELF_X THEN FIRE");
        assert!(matches!(
            rule.condition.unwrap(),
            Condition::Compare { op: CompareOp::Gt, .. }
        ));
    }

    #[test]
    fn test_expression_precedence() {
        let rule = parse_one("IF SELF_X + 2 * 3 == 7 THEN FIRE");
        match rule.condition.unwrap() {
            Condition::Compare { left, .. } => match left {
                NumExpr::Binary {
                    op: BinaryOp::Add,
                    right,
                    ..
                } => {
                    assert!(matches!(
                        *right,
                        NumExpr::Binary {
                            op: BinaryOp::Mul,
                            ..
                        }
                    ));
                }
                other => panic!("expected addition at the top, got {:?}", other),
            },
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_function_arity_enforced() {
        let e = parse_program("IF MIN(1) > 0 THEN FIRE").unwrap_err();
        assert!(e.message.contains("MIN expects 2 arguments"));
        let e = parse_program("IF CLAMP(1, 2) > 0 THEN FIRE").unwrap_err();
        assert!(e.message.contains("CLAMP expects 3 arguments"));
        assert!(parse_program("IF ABS(-1) > 0 THEN FIRE").is_ok());
        assert!(parse_program("IF ANGLE_DIFF(ATAN2(ENEMY_DY, ENEMY_DX), SELF_HEADING) < 10 THEN FIRE").is_ok());
    }

    #[test]
    fn test_unknown_identifiers_fail() {
        let e = parse_program("IF ENEMY_SPEED > 1 THEN FIRE").unwrap_err();
        assert!(e.message.contains("ENEMY_SPEED"));
        let e = parse_program("IF SQRT(4) > 1 THEN FIRE").unwrap_err();
        assert!(e.message.contains("SQRT"));
        let e = parse_program("FLY UP").unwrap_err();
        assert!(e.message.contains("unknown command"));
    }

    #[test]
    fn test_pi_and_tau_constants() {
        let rule = parse_one("IF PI < TAU THEN FIRE");
        match rule.condition.unwrap() {
            Condition::Compare { left, right, .. } => {
                assert_eq!(left, NumExpr::Number(std::f64::consts::PI));
                assert_eq!(right, NumExpr::Number(std::f64::consts::TAU));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_error_lines_are_one_based() {
        let e = parse_program("FIRE ON\n\nBOOST SIDEWAYS\n").unwrap_err();
        assert_eq!(e.line, 3);
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let program = parse_program("# lead with defaults\nSET THROTTLE 1 # full ahead\n\nFIRE ON\n").unwrap();
        assert_eq!(program.rules.len(), 2);
        assert_eq!(program.rules[0].line, 2);
        assert_eq!(program.rules[1].line, 4);
    }

    #[test]
    fn test_empty_and_comment_only_scripts_fail() {
        assert!(parse_program("").is_err());
        assert!(parse_program("   \n\t\n").is_err());
        let e = parse_program("# nothing here\n# still nothing\n").unwrap_err();
        assert!(e.message.contains("no executable rules"));
    }

    #[test]
    fn test_line_limit() {
        let source = "FIRE ON\n".repeat(config::MAX_SCRIPT_LINES + 1);
        let e = parse_program(&source).unwrap_err();
        assert!(e.message.contains("maximum"));

        let source = "FIRE ON\n".repeat(config::MAX_SCRIPT_LINES);
        assert!(parse_program(&source).is_ok());
    }

    #[test]
    fn test_if_without_then() {
        let e = parse_program("IF ENEMY_VISIBLE FIRE").unwrap_err();
        assert!(e.message.contains("THEN"));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(parse_program("IF (ENEMY_VISIBLE THEN FIRE").is_err());
        assert!(parse_program("IF ENEMY_VISIBLE) THEN FIRE").is_err());
        assert!(parse_program("IF (SELF_X > 1 THEN FIRE").is_err());
    }

    #[test]
    fn test_division_parses() {
        assert!(parse_program("IF SELF_X / 0 > 1 THEN FIRE").is_ok());
    }

    #[test]
    fn test_round_trip_display_then_reparse() {
        let source = "\
SET THROTTLE 0.75
SET TURN -1
IF ENEMY_VISIBLE AND ENEMY_DISTANCE <= 4 THEN FIRE ON
IF NOT ENEMY_VISIBLE OR TICKS_SINCE_ENEMY_SEEN > 30 THEN SET TURN 0.5
IF (SELF_X < 1 OR SELF_X > ARENA_SIZE - 2) AND WALL_AHEAD_DISTANCE < 2 THEN BOOST LEFT
IF CLAMP(ENEMY_DX, -1, 1) * 2 + ABS(ENEMY_DY) >= 1.5 THEN SHOOT
IF ANGLE_DIFF(ATAN2(ENEMY_DY, ENEMY_DX), SELF_HEADING) < -10 THEN SET TURN -0.4
";
        let first = parse_program(source).unwrap();
        let rendered = first.to_string();
        let second = parse_program(&rendered).unwrap();
        assert_eq!(first.rules.len(), second.rules.len());
        for (a, b) in first.rules.iter().zip(second.rules.iter()) {
            assert_eq!(a.condition, b.condition);
            assert_eq!(a.command, b.command);
        }
    }
}
