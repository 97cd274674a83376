//! Per-session variable bindings.
//!
//! An [`AssignmentMemory`] records `<letter> = <value>` assignments and
//! substitutes bound variables into later expressions. Substitution is a
//! single left-to-right pass: a substituted value is never re-expanded, so
//! after `x = a` and `a = 1`, the expression `x` becomes `a`, not `1`. This
//! also means cyclic bindings such as `a = b`, `b = a` cannot loop.

use crate::classify::lexical::{identifier_regex, is_exponent};
use crate::classify::{normalize, parse_assignment};
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single variable binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBinding {
    /// Variable name, a single lowercase ASCII letter.
    pub name: char,

    /// Literal right-hand side of the assignment, whitespace removed.
    pub value: String,
}

/// Variable bindings owned by one session.
///
/// Not synchronized: a memory must only be used by one caller at a time.
/// Share it across threads through [`crate::session::SessionStore`], which
/// serializes each session behind its own mutex.
///
/// # Examples
///
/// ```
/// use mathgate::session::AssignmentMemory;
///
/// let mut memory = AssignmentMemory::new();
/// assert_eq!(memory.process("a = 5"), "a = 5");
/// assert_eq!(memory.process("a + 1"), "5 + 1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentMemory {
    bindings: HashMap<char, VariableBinding>,
}

impl AssignmentMemory {
    /// Creates an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one raw expression.
    ///
    /// If the expression is an assignment, the binding is stored (replacing
    /// any previous value for that name) and the canonical form
    /// `"<name> = <value>"` is returned. Otherwise every bound variable that
    /// appears as a standalone token is replaced by its value.
    pub fn process(&mut self, raw: &str) -> String {
        let normalized = normalize(raw);

        if let Some((name, value)) = parse_assignment(&normalized) {
            let previous = self.bindings.insert(
                name,
                VariableBinding {
                    name,
                    value: value.to_string(),
                },
            );
            tracing::debug!(
                variable = %name,
                value,
                replaced = previous.is_some(),
                "stored binding"
            );
            return format!("{name} = {value}");
        }

        self.substitute(raw)
    }

    /// Replaces bound variables in `expression` without recording anything.
    ///
    /// Only whole identifier tokens are replaced: with `a` bound, `a1`, `a_b`
    /// and `tan` are left untouched, as is the `e` of `2.5e-3`. A variable
    /// written directly after a number keeps its implied product, so `2a`
    /// becomes `2*5` rather than `25`.
    #[must_use]
    pub fn substitute(&self, expression: &str) -> String {
        if self.bindings.is_empty() {
            return expression.to_string();
        }

        let substituted = identifier_regex().replace_all(expression, |caps: &Captures<'_>| {
            let Some(found) = caps.get(0) else {
                return String::new();
            };
            let token = found.as_str();
            let mut chars = token.chars();
            let binding = match (chars.next(), chars.next()) {
                (Some(name), None) => self.bindings.get(&name),
                _ => None,
            };
            let Some(binding) = binding else {
                return token.to_string();
            };
            if is_exponent(expression, found.start(), found.end()) {
                return token.to_string();
            }

            let after_number = expression[..found.start()]
                .ends_with(|c: char| c.is_ascii_digit() || c == '.');
            if after_number {
                format!("*{}", binding.value)
            } else {
                binding.value.clone()
            }
        });

        if substituted != expression {
            tracing::debug!(from = expression, to = %substituted, "substituted bindings");
        }
        substituted.into_owned()
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: char) -> Option<&str> {
        self.bindings.get(&name).map(|b| b.value.as_str())
    }

    /// Removes one binding. Returns `true` if it existed.
    pub fn unset(&mut self, name: char) -> bool {
        self.bindings.remove(&name).is_some()
    }

    /// Removes all bindings.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Returns an independent copy of the current bindings.
    ///
    /// Mutating the snapshot does not affect the memory.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<char, String> {
        self.bindings
            .iter()
            .map(|(name, binding)| (*name, binding.value.clone()))
            .collect()
    }

    /// Lists bindings sorted by name.
    #[must_use]
    pub fn bindings(&self) -> Vec<&VariableBinding> {
        let mut items: Vec<_> = self.bindings.values().collect();
        items.sort_by_key(|b| b.name);
        items
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
