use thiserror::Error;

/// A malformed constraint, or one that cannot be evaluated for the value at hand.
///
/// Positions are byte offsets into the expression source.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExprError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: usize },

    #[error("invalid escape '\\{ch}' at {pos}")]
    InvalidEscape { ch: char, pos: usize },

    #[error("invalid number '{text}' at {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("expected {expected}, found {found} at {pos}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        pos: usize,
    },

    #[error("unknown name '{name}' at {pos}; only 'v' and 'ops_in' are defined")]
    UnknownName { name: String, pos: usize },

    #[error("cannot apply '{op}' to {lhs} and {rhs}")]
    BinaryType {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("cannot apply '{op}' to {operand}")]
    UnaryType {
        op: &'static str,
        operand: &'static str,
    },

    #[error("expression nested too deeply at {pos}")]
    TooDeep { pos: usize },

    #[error("integer overflow in '{op}'")]
    Overflow { op: &'static str },

    #[error("integer modulo by zero")]
    ModuloByZero,

    #[error("expression produced {found}, not a boolean")]
    NotBoolean { found: &'static str },
}
