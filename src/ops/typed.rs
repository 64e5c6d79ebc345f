//! Per-type entry points over the generic [`Ops`] getters.
//!
//! Each takes `(key, constraint, default)`; an empty constraint checks
//! nothing and `None` means the key is required.

use super::coerce::FromNode;
use super::facade::Ops;
use crate::Result;

macro_rules! typed_getters {
    ($($name:ident => $ty:ty),* $(,)?) => {
        impl Ops {
            $(
                pub fn $name(&self, key: &str, constraint: &str, default: Option<$ty>) -> Result<$ty> {
                    self.get_with_default(key, constraint, default)
                }
            )*
        }
    };
}

typed_getters! {
    get_int => i64,
    get_float => f64,
    get_bool => bool,
    get_string => String,
    get_vect_int => Vec<i64>,
    get_vect_float => Vec<f64>,
    get_vect_bool => Vec<bool>,
    get_vect_string => Vec<String>,
}

impl Ops {
    fn get_with_default<T: FromNode>(
        &self,
        key: &str,
        constraint: &str,
        default: Option<T>,
    ) -> Result<T> {
        match default {
            Some(default) => self.get_or(key, constraint, default),
            None => self.get_checked(key, constraint),
        }
    }
}
