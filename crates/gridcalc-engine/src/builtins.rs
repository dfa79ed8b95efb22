//! Built-in aggregate functions and the registry that resolves them by name.
//!
//! Conventions:
//! - Formula-facing names are lowercase letters (e.g. `sum`, `mean`) and are
//!   matched exactly.
//! - Every function is variadic over scalars. Ranges are expanded by the
//!   evaluator before the call, so a function never sees cell references.
//! - If you add a new built-in, add a row to `BUILTINS`. The validator and
//!   the evaluator only ever look functions up by name.

use std::collections::BTreeMap;
use std::fmt;

use crate::engine::EngineError;

/// Signature shared by every built-in.
pub type NativeFn = fn(&[f64]) -> f64;

pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
    pub apply: NativeFn,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "sum",
        description: "sum(value1, value2, ..., valueN) - sum of a list of values",
        apply: sum,
    },
    Builtin {
        name: "mean",
        description: "mean(value1, value2, ..., valueN) - average of a list of values",
        apply: mean,
    },
    Builtin {
        name: "max",
        description: "max(value1, value2, ..., valueN) - largest value of a list",
        apply: max,
    },
    Builtin {
        name: "min",
        description: "min(value1, value2, ..., valueN) - smallest value of a list",
        apply: min,
    },
];

fn sum(values: &[f64]) -> f64 {
    // Iterator::sum over f64 starts from -0.0.
    values.iter().fold(0.0, |acc, v| acc + v)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

fn max(values: &[f64]) -> f64 {
    let Some((first, rest)) = values.split_first() else {
        return 0.0;
    };
    rest.iter()
        .fold(*first, |best, &v| if v > best { v } else { best })
}

fn min(values: &[f64]) -> f64 {
    let Some((first, rest)) = values.split_first() else {
        return 0.0;
    };
    rest.iter()
        .fold(*first, |best, &v| if v < best { v } else { best })
}

struct Function {
    description: String,
    apply: Box<dyn Fn(&[f64]) -> f64>,
}

/// Named variadic functions available to formulas.
pub struct FunctionRegistry {
    functions: BTreeMap<String, Function>,
}

impl FunctionRegistry {
    /// A registry with no functions at all.
    pub fn empty() -> Self {
        FunctionRegistry {
            functions: BTreeMap::new(),
        }
    }

    /// A registry holding every entry of [`BUILTINS`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for builtin in BUILTINS {
            registry.functions.insert(
                builtin.name.to_string(),
                Function {
                    description: builtin.description.to_string(),
                    apply: Box::new(builtin.apply),
                },
            );
        }
        registry
    }

    /// Register (or replace) a function.
    ///
    /// Names must be ASCII letters only; anything else could never be written
    /// in a formula, so it is rejected up front.
    pub fn register<F>(&mut self, name: &str, description: &str, apply: F) -> Result<(), EngineError>
    where
        F: Fn(&[f64]) -> f64 + 'static,
    {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(EngineError::InvalidFunctionName(name.to_string()));
        }
        self.functions.insert(
            name.to_string(),
            Function {
                description: description.to_string(),
                apply: Box::new(apply),
            },
        );
        Ok(())
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Call a function by name. Returns None for unknown names.
    pub fn call(&self, name: &str, values: &[f64]) -> Option<f64> {
        self.functions.get(name).map(|f| (f.apply)(values))
    }

    /// `(name, description)` pairs in name order, for help listings.
    pub fn describe(&self) -> impl Iterator<Item = (&str, &str)> {
        self.functions
            .iter()
            .map(|(name, f)| (name.as_str(), f.description.as_str()))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lists_aggregate_to_zero() {
        let registry = FunctionRegistry::with_builtins();
        for name in ["sum", "mean", "max", "min"] {
            let value = registry.call(name, &[]).unwrap();
            assert_eq!(value, 0.0, "{name}");
            assert!(value.is_sign_positive(), "{name} gave negative zero");
        }
    }

    #[test]
    fn test_builtin_aggregates() {
        let registry = FunctionRegistry::with_builtins();
        let values = [4.0, -2.5, 10.0, 0.5];
        assert_eq!(registry.call("sum", &values), Some(12.0));
        assert_eq!(registry.call("mean", &values), Some(3.0));
        assert_eq!(registry.call("max", &values), Some(10.0));
        assert_eq!(registry.call("min", &values), Some(-2.5));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = FunctionRegistry::with_builtins();
        assert!(registry.is_function("sum"));
        assert!(!registry.is_function("SUM"));
        assert_eq!(registry.call("avg", &[1.0]), None);
    }

    #[test]
    fn test_register_extends_registry() {
        let mut registry = FunctionRegistry::with_builtins();
        registry
            .register("count", "count(values...) - number of values", |v| v.len() as f64)
            .unwrap();
        assert_eq!(registry.call("count", &[1.0, 2.0, 3.0]), Some(3.0));
        assert_eq!(registry.len(), BUILTINS.len() + 1);
    }

    #[test]
    fn test_register_rejects_unwritable_names() {
        let mut registry = FunctionRegistry::empty();
        assert!(registry.register("log10", "", |_| 0.0).is_err());
        assert!(registry.register("", "", |_| 0.0).is_err());
        assert!(registry.is_empty());
    }
}
