//! Conversion of document nodes into typed values.
//!
//! Kinds match strictly. The single implicit conversion is integer to float.
//! Strings are never produced from numbers and floats are never truncated.

use std::fmt;

use crate::document::{NodeKind, NodeRef, Scalar};

/// Why a node could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub enum CoerceError {
    Mismatch {
        expected: &'static str,
        actual: NodeKind,
    },
    OutOfRange {
        target: &'static str,
        value: i64,
    },
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoerceError::Mismatch { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            CoerceError::OutOfRange { target, value } => {
                write!(f, "{value} does not fit in {target}")
            }
        }
    }
}

/// Element types that can be read from a single scalar.
pub trait FromScalar: Sized {
    /// Name of the accepted shape, as shown in mismatch reports.
    const EXPECTED: &'static str;

    fn from_scalar(scalar: &Scalar) -> Result<Self, CoerceError>;

    /// The value as seen by constraint expressions.
    fn to_scalar(&self) -> Scalar;
}

/// Types an [`Ops`](crate::Ops) lookup can return.
pub trait FromNode: Sized {
    const EXPECTED: &'static str;

    /// Whether [`subjects`](Self::subjects) are the elements of a vector.
    const ELEMENTWISE: bool = false;

    fn from_node(node: NodeRef<'_>) -> Result<Self, CoerceError>;

    /// Values a constraint is checked against: the value itself, or each
    /// element of a vector in order.
    fn subjects(&self) -> Vec<Scalar>;
}

fn mismatch(expected: &'static str, scalar: &Scalar) -> CoerceError {
    CoerceError::Mismatch {
        expected,
        actual: NodeKind::Scalar(scalar.kind()),
    }
}

impl FromScalar for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_scalar(scalar: &Scalar) -> Result<Self, CoerceError> {
        match scalar {
            Scalar::Int(i) => Ok(*i),
            other => Err(mismatch(<Self as FromScalar>::EXPECTED, other)),
        }
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Int(*self)
    }
}

impl FromScalar for i32 {
    const EXPECTED: &'static str = "integer";

    fn from_scalar(scalar: &Scalar) -> Result<Self, CoerceError> {
        let wide = i64::from_scalar(scalar)?;
        i32::try_from(wide).map_err(|_| CoerceError::OutOfRange {
            target: "i32",
            value: wide,
        })
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Int(i64::from(*self))
    }
}

impl FromScalar for f64 {
    const EXPECTED: &'static str = "float";

    fn from_scalar(scalar: &Scalar) -> Result<Self, CoerceError> {
        match scalar {
            Scalar::Float(x) => Ok(*x),
            Scalar::Int(i) => Ok(*i as f64),
            other => Err(mismatch(<Self as FromScalar>::EXPECTED, other)),
        }
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Float(*self)
    }
}

impl FromScalar for f32 {
    const EXPECTED: &'static str = "float";

    fn from_scalar(scalar: &Scalar) -> Result<Self, CoerceError> {
        f64::from_scalar(scalar).map(|x| x as f32)
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Float(f64::from(*self))
    }
}

impl FromScalar for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_scalar(scalar: &Scalar) -> Result<Self, CoerceError> {
        match scalar {
            Scalar::Bool(b) => Ok(*b),
            other => Err(mismatch(<Self as FromScalar>::EXPECTED, other)),
        }
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Bool(*self)
    }
}

impl FromScalar for String {
    const EXPECTED: &'static str = "string";

    fn from_scalar(scalar: &Scalar) -> Result<Self, CoerceError> {
        match scalar {
            Scalar::String(s) => Ok(s.clone()),
            other => Err(mismatch(<Self as FromScalar>::EXPECTED, other)),
        }
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::String(self.clone())
    }
}

macro_rules! impl_from_node {
    ($($ty:ty => $vector:literal),* $(,)?) => {$(
        impl FromNode for $ty {
            const EXPECTED: &'static str = <$ty as FromScalar>::EXPECTED;

            fn from_node(node: NodeRef<'_>) -> Result<Self, CoerceError> {
                match node {
                    NodeRef::Scalar(scalar) => <$ty>::from_scalar(scalar),
                    other => Err(CoerceError::Mismatch {
                        expected: <Self as FromNode>::EXPECTED,
                        actual: other.kind(),
                    }),
                }
            }

            fn subjects(&self) -> Vec<Scalar> {
                vec![self.to_scalar()]
            }
        }

        impl FromNode for Vec<$ty> {
            const EXPECTED: &'static str = $vector;
            const ELEMENTWISE: bool = true;

            fn from_node(node: NodeRef<'_>) -> Result<Self, CoerceError> {
                match node {
                    NodeRef::Vector(items) => items
                        .iter()
                        .map(|item| {
                            <$ty>::from_scalar(item).map_err(|e| match e {
                                CoerceError::Mismatch { actual, .. } => CoerceError::Mismatch {
                                    expected: <Self as FromNode>::EXPECTED,
                                    actual,
                                },
                                out_of_range => out_of_range,
                            })
                        })
                        .collect(),
                    other => Err(CoerceError::Mismatch {
                        expected: <Self as FromNode>::EXPECTED,
                        actual: other.kind(),
                    }),
                }
            }

            fn subjects(&self) -> Vec<Scalar> {
                self.iter().map(FromScalar::to_scalar).collect()
            }
        }
    )*};
}

impl_from_node! {
    i64 => "vector of integers",
    i32 => "vector of integers",
    f64 => "vector of floats",
    f32 => "vector of floats",
    bool => "vector of booleans",
    String => "vector of strings",
}
