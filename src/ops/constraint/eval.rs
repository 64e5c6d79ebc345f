use std::cmp::Ordering;

use crate::document::Scalar;

use super::parser::{BinaryOp, Expr};
use super::ExprError;

/// Evaluates `expr` with `v` bound to `subject`.
pub fn eval(expr: &Expr, subject: &Scalar) -> Result<Scalar, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Subject => Ok(subject.clone()),
        Expr::Not(operand) => match eval(operand, subject)? {
            Scalar::Bool(b) => Ok(Scalar::Bool(!b)),
            other => Err(unary_type("not", &other)),
        },
        Expr::Neg(operand) => match eval(operand, subject)? {
            Scalar::Int(i) => i
                .checked_neg()
                .map(Scalar::Int)
                .ok_or(ExprError::Overflow { op: "-" }),
            Scalar::Float(x) => Ok(Scalar::Float(-x)),
            other => Err(unary_type("-", &other)),
        },
        Expr::And(lhs, rhs) => {
            if !truth("and", eval(lhs, subject)?)? {
                return Ok(Scalar::Bool(false));
            }
            truth("and", eval(rhs, subject)?).map(Scalar::Bool)
        }
        Expr::Or(lhs, rhs) => {
            if truth("or", eval(lhs, subject)?)? {
                return Ok(Scalar::Bool(true));
            }
            truth("or", eval(rhs, subject)?).map(Scalar::Bool)
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, subject)?;
            let rhs = eval(rhs, subject)?;
            binary(*op, &lhs, &rhs)
        }
        Expr::In(needle, set) => {
            let needle = eval(needle, subject)?;
            Ok(Scalar::Bool(set.iter().any(|item| equal(&needle, item))))
        }
    }
}

fn truth(op: &'static str, value: Scalar) -> Result<bool, ExprError> {
    match value {
        Scalar::Bool(b) => Ok(b),
        other => Err(unary_type(op, &other)),
    }
}

fn binary(op: BinaryOp, lhs: &Scalar, rhs: &Scalar) -> Result<Scalar, ExprError> {
    match op {
        BinaryOp::Eq => Ok(Scalar::Bool(equal(lhs, rhs))),
        BinaryOp::Ne => Ok(Scalar::Bool(!equal(lhs, rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = order(op, lhs, rhs)?;
            let holds = ordering.is_some_and(|ord| match op {
                BinaryOp::Lt => ord == Ordering::Less,
                BinaryOp::Le => ord != Ordering::Greater,
                BinaryOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            });
            Ok(Scalar::Bool(holds))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, lhs, rhs)
        }
    }
}

/// Equality across kinds: numbers compare by value, other mixed kinds are unequal.
fn equal(lhs: &Scalar, rhs: &Scalar) -> bool {
    match (lhs, rhs) {
        (Scalar::Int(a), Scalar::Int(b)) => a == b,
        (Scalar::String(a), Scalar::String(b)) => a == b,
        (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
        _ => match (as_float(lhs), as_float(rhs)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// `None` when the operands are unordered (a NaN is involved).
fn order(op: BinaryOp, lhs: &Scalar, rhs: &Scalar) -> Result<Option<Ordering>, ExprError> {
    match (lhs, rhs) {
        (Scalar::Int(a), Scalar::Int(b)) => Ok(Some(a.cmp(b))),
        (Scalar::String(a), Scalar::String(b)) => Ok(Some(a.cmp(b))),
        _ => match (as_float(lhs), as_float(rhs)) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(binary_type(op, lhs, rhs)),
        },
    }
}

fn arithmetic(op: BinaryOp, lhs: &Scalar, rhs: &Scalar) -> Result<Scalar, ExprError> {
    if let (Scalar::Int(a), Scalar::Int(b)) = (lhs, rhs) {
        let (a, b) = (*a, *b);
        let overflow = ExprError::Overflow { op: op.symbol() };
        return match op {
            BinaryOp::Add => a.checked_add(b).map(Scalar::Int).ok_or(overflow),
            BinaryOp::Sub => a.checked_sub(b).map(Scalar::Int).ok_or(overflow),
            BinaryOp::Mul => a.checked_mul(b).map(Scalar::Int).ok_or(overflow),
            BinaryOp::Div => Ok(Scalar::Float(a as f64 / b as f64)),
            _ => match b {
                0 => Err(ExprError::ModuloByZero),
                // Anything modulo -1 is 0, including `i64::MIN`.
                -1 => Ok(Scalar::Int(0)),
                _ => Ok(Scalar::Int(floor_adjust(a % b, b))),
            },
        };
    }

    let (Some(a), Some(b)) = (as_float(lhs), as_float(rhs)) else {
        return Err(binary_type(op, lhs, rhs));
    };
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => a - (a / b).floor() * b,
    };
    Ok(Scalar::Float(value))
}

/// Shifts a truncated remainder so it takes the divisor's sign.
fn floor_adjust(remainder: i64, divisor: i64) -> i64 {
    if remainder != 0 && (remainder < 0) != (divisor < 0) {
        remainder + divisor
    } else {
        remainder
    }
}

fn as_float(value: &Scalar) -> Option<f64> {
    match value {
        Scalar::Int(i) => Some(*i as f64),
        Scalar::Float(x) => Some(*x),
        _ => None,
    }
}

fn unary_type(op: &'static str, operand: &Scalar) -> ExprError {
    ExprError::UnaryType {
        op,
        operand: operand.kind().name(),
    }
}

fn binary_type(op: BinaryOp, lhs: &Scalar, rhs: &Scalar) -> ExprError {
    ExprError::BinaryType {
        op: op.symbol(),
        lhs: lhs.kind().name(),
        rhs: rhs.kind().name(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;

    fn run(src: &str, v: Scalar) -> Result<Scalar, ExprError> {
        eval(&parse(src).unwrap(), &v)
    }

    fn holds(src: &str, v: Scalar) -> bool {
        run(src, v) == Ok(Scalar::Bool(true))
    }

    #[test]
    fn test_range_check() {
        let expr = "v >= 0 and v < 150";
        assert!(holds(expr, Scalar::Int(74)));
        assert!(!holds(expr, Scalar::Int(200)));
        assert!(!holds(expr, Scalar::Int(-1)));
        assert!(holds(expr, Scalar::Float(0.0)));
    }

    #[test]
    fn test_modulo_is_floored() {
        assert_eq!(run("v % 3", Scalar::Int(-7)), Ok(Scalar::Int(2)));
        assert_eq!(run("v % -3", Scalar::Int(7)), Ok(Scalar::Int(-2)));
        assert_eq!(run("v % 2", Scalar::Int(12)), Ok(Scalar::Int(0)));
        assert_eq!(run("v % 2", Scalar::Float(5.5)), Ok(Scalar::Float(1.5)));
        assert_eq!(run("v % 0", Scalar::Int(1)), Err(ExprError::ModuloByZero));
        assert_eq!(run("v % -1", Scalar::Int(i64::MIN)), Ok(Scalar::Int(0)));
        assert_eq!(run("v % -1", Scalar::Int(7)), Ok(Scalar::Int(0)));
    }

    #[test]
    fn test_division_yields_float() {
        assert_eq!(run("v / 2", Scalar::Int(7)), Ok(Scalar::Float(3.5)));
    }

    #[test]
    fn test_int_float_promotion() {
        assert!(holds("v == 2.0", Scalar::Int(2)));
        assert!(holds("v + 0.5 > 2", Scalar::Int(2)));
        assert_eq!(run("v * 2", Scalar::Int(21)), Ok(Scalar::Int(42)));
    }

    #[test]
    fn test_mixed_kind_equality_is_false() {
        assert!(!holds("v == 1", Scalar::String("1".into())));
        assert!(holds("v != 1", Scalar::String("1".into())));
        assert!(holds("v == 'Handel'", Scalar::String("Handel".into())));
    }

    #[test]
    fn test_string_ordering() {
        assert!(holds("v < 'b'", Scalar::String("a".into())));
    }

    #[test]
    fn test_membership() {
        let expr = "ops_in(v, {'Messiah', 'Water Music'})";
        assert!(holds(expr, Scalar::String("Messiah".into())));
        assert!(!holds(expr, Scalar::String("Rinaldo".into())));
        assert!(holds("ops_in(v, {1, 2.5})", Scalar::Float(1.0)));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        assert!(!holds("v > 1 and v % 0 == 0", Scalar::Int(0)));
        assert!(holds("v < 1 or v % 0 == 0", Scalar::Int(0)));
        assert_eq!(
            run("v < 1 and v % 0 == 0", Scalar::Int(0)),
            Err(ExprError::ModuloByZero)
        );
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            run("v < 1", Scalar::String("a".into())),
            Err(ExprError::BinaryType {
                op: "<",
                lhs: "string",
                rhs: "integer",
            })
        );
        assert_eq!(
            run("v and true", Scalar::Int(1)),
            Err(ExprError::UnaryType {
                op: "and",
                operand: "integer",
            })
        );
        assert_eq!(
            run("v + 1", Scalar::Bool(true)),
            Err(ExprError::BinaryType {
                op: "+",
                lhs: "boolean",
                rhs: "integer",
            })
        );
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            run("v + 1", Scalar::Int(i64::MAX)),
            Err(ExprError::Overflow { op: "+" })
        );
    }

    #[test]
    fn test_nan_never_ordered() {
        assert!(!holds("v < 1", Scalar::Float(f64::NAN)));
        assert!(!holds("v >= 1", Scalar::Float(f64::NAN)));
    }
}
