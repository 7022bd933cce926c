//! DSC-011: Variable interning for composite values.
//!
//! Each composite value that is constructed by its own statement gets a unique
//! variable. The interner remembers the canonical rendering of every such value
//! and swaps matching sub-trees for `$variable` references.
//!
//! One interner lives for exactly one generated script.

use super::expr::Expr;
use indexmap::IndexMap;

/// Per-script table of canonical rendering → variable name.
pub struct Interner {
    entries: IndexMap<String, String>,
    next_name: Box<dyn FnMut() -> String>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner")
            .field("variables", &self.entries.values().collect::<Vec<_>>())
            .finish()
    }
}

/// A random variable name: a v4 UUID with dashes turned into underscores,
/// since PowerShell variable names cannot contain dashes.
pub fn random_variable_name() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "_")
}

impl Interner {
    pub fn new() -> Self {
        Self::with_name_source(random_variable_name)
    }

    /// Use a custom name generator (deterministic names in tests and benches).
    pub fn with_name_source(source: impl FnMut() -> String + 'static) -> Self {
        Self {
            entries: IndexMap::new(),
            next_name: Box::new(source),
        }
    }

    /// Register a canonical rendering, returning its variable name and whether
    /// it was newly created. Re-registering returns the existing name.
    pub fn intern(&mut self, canonical: String) -> (String, bool) {
        if let Some(existing) = self.entries.get(&canonical) {
            return (existing.clone(), false);
        }
        let mut name = (self.next_name)();
        while self.entries.values().any(|v| *v == name) {
            name = (self.next_name)();
        }
        self.entries.insert(canonical, name.clone());
        (name, true)
    }

    pub fn lookup(&self, canonical: &str) -> Option<&str> {
        self.entries.get(canonical).map(String::as_str)
    }

    /// Replace every interned composite in `expr` with a variable reference.
    ///
    /// Walks outermost first: once a node matches, its children are never
    /// visited, so a value built from earlier variables always collapses to its
    /// own reference rather than a mix of inner references and literal text.
    pub fn substitute(&self, expr: Expr) -> Expr {
        if self.entries.is_empty() {
            return expr;
        }
        if expr.is_composite() {
            if let Some(name) = self.lookup(&expr.render()) {
                return Expr::Variable(name.to_string());
            }
        }
        match expr {
            Expr::Array(items) => {
                Expr::Array(items.into_iter().map(|e| self.substitute(e)).collect())
            }
            Expr::Cast { type_name, inner } => Expr::Cast {
                type_name,
                inner: Box::new(self.substitute(*inner)),
            },
            Expr::Hashtable(entries) => Expr::Hashtable(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, self.substitute(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Variable names in registration order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name source yielding `v1`, `v2`, ... for predictable test output.
#[cfg(test)]
pub(crate) fn sequential_names() -> impl FnMut() -> String {
    let mut n = 0;
    move || {
        n += 1;
        format!("v{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::expr::{lower, Key};
    use crate::core::types::{CimInstance, PsValue};
    use indexmap::IndexMap;
    use std::collections::HashSet;

    fn instance(class: &str, props: Vec<(&str, PsValue)>) -> PsValue {
        PsValue::Instance(CimInstance {
            class_name: class.to_string(),
            properties: props
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<IndexMap<_, _>>(),
        })
    }

    #[test]
    fn test_dsc011_random_names_are_identifiers() {
        let name = random_variable_name();
        assert_eq!(name.len(), 36);
        assert!(!name.contains('-'));
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_dsc011_intern_dedupes() {
        let mut interner = Interner::with_name_source(sequential_names());
        let (a, new_a) = interner.intern("@{'x' = 1}".to_string());
        let (b, new_b) = interner.intern("@{'x' = 1}".to_string());
        assert!(new_a);
        assert!(!new_b);
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_dsc011_distinct_values_never_collide() {
        let mut interner = Interner::new();
        let mut seen = HashSet::new();
        for i in 0..200 {
            let (name, _) = interner.intern(format!("@{{'i' = {}}}", i));
            assert!(seen.insert(name));
        }
    }

    #[test]
    fn test_dsc011_colliding_generator_is_retried() {
        let mut calls = 0;
        let mut interner = Interner::with_name_source(move || {
            calls += 1;
            if calls <= 2 { "same".to_string() } else { format!("n{}", calls) }
        });
        let (a, _) = interner.intern("@(1)".to_string());
        let (b, _) = interner.intern("@(2)".to_string());
        assert_eq!(a, "same");
        assert_ne!(a, b);
    }

    #[test]
    fn test_dsc011_outer_wins_over_inner() {
        let inner = instance("Inner", vec![("k", PsValue::from("v"))]);
        let outer = instance("Outer", vec![("child", inner.clone())]);

        let mut interner = Interner::with_name_source(sequential_names());
        let (inner_var, _) = interner.intern(lower(&inner).render());
        let (outer_var, _) = interner.intern(lower(&outer).render());

        let text = Expr::Hashtable(vec![(Key::Bare("P".to_string()), lower(&outer))]);
        let substituted = interner.substitute(text).render();
        assert_eq!(substituted, format!("@{{P = ${}}}", outer_var));
        assert!(!substituted.contains(&format!("${}", inner_var)));
    }

    #[test]
    fn test_dsc011_inner_substituted_inside_unregistered_outer() {
        let inner = instance("Inner", vec![("k", PsValue::from("v"))]);
        let outer = instance("Outer", vec![("child", inner.clone())]);

        let mut interner = Interner::with_name_source(sequential_names());
        interner.intern(lower(&inner).render());
        let rendered = interner.substitute(lower(&outer)).render();
        assert_eq!(rendered, "@{'cim_instance_type' = 'Outer'; 'child' = $v1}");
    }

    #[test]
    fn test_dsc011_scalars_untouched() {
        let mut interner = Interner::with_name_source(sequential_names());
        interner.intern("'plain'".to_string());
        let e = Expr::Str("plain".to_string());
        assert_eq!(interner.substitute(e.clone()), e);
    }

    #[test]
    fn test_dsc011_variables_in_registration_order() {
        let mut interner = Interner::with_name_source(sequential_names());
        interner.intern("@(1)".to_string());
        interner.intern("@(2)".to_string());
        let vars: Vec<_> = interner.variables().collect();
        assert_eq!(vars, vec!["v1", "v2"]);
    }
}
