//! Axiom and production rule storage.

use crate::error::{LSystemError, Result};
use std::collections::BTreeMap;

/// A single grammar symbol.
pub type Symbol = char;

/// A deterministic, context-free L-System grammar.
///
/// Holds the axiom and at most one replacement per symbol. Symbols without a
/// rule rewrite to themselves. Rules may be recursive or never fire at all;
/// expansion is bounded by the iteration count, not by reaching a fixed point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar {
    axiom: String,
    rules: BTreeMap<Symbol, String>,
}

impl Grammar {
    /// Creates a grammar with the given axiom and no rules.
    ///
    /// Fails with [`LSystemError::EmptyAxiom`] if `axiom` is empty.
    pub fn new(axiom: impl Into<String>) -> Result<Self> {
        let axiom = axiom.into();
        if axiom.is_empty() {
            return Err(LSystemError::EmptyAxiom);
        }
        Ok(Self {
            axiom,
            rules: BTreeMap::new(),
        })
    }

    /// Registers the rule `symbol -> replacement`, replacing any previous rule for `symbol`.
    pub fn set_rule(&mut self, symbol: Symbol, replacement: impl Into<String>) {
        self.rules.insert(symbol, replacement.into());
    }

    /// Builder form of [`set_rule`](Self::set_rule).
    pub fn with_rule(mut self, symbol: Symbol, replacement: impl Into<String>) -> Self {
        self.set_rule(symbol, replacement);
        self
    }

    /// Builder form of [`parse_rule`](Self::parse_rule).
    pub fn with_rule_str(mut self, rule: &str) -> Result<Self> {
        let (symbol, replacement) = Self::parse_rule(rule)?;
        self.set_rule(symbol, replacement);
        Ok(self)
    }

    /// Parses a rule written as `A -> F[A]A`.
    ///
    /// Whitespace around the arrow is ignored. The predecessor must be exactly
    /// one symbol; the successor may be empty (an erasing rule).
    pub fn parse_rule(rule: &str) -> Result<(Symbol, String)> {
        let malformed = |reason: &str| LSystemError::MalformedRule {
            rule: rule.to_string(),
            reason: reason.to_string(),
        };

        let (lhs, rhs) = rule
            .split_once("->")
            .ok_or_else(|| malformed("missing `->`"))?;
        let symbol = single_symbol(lhs.trim())
            .ok_or_else(|| malformed("predecessor must be exactly one symbol"))?;
        Ok((symbol, rhs.trim().to_string()))
    }

    /// The initial symbol string.
    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    /// The replacement for `symbol`, if a rule is registered.
    pub fn rule(&self, symbol: Symbol) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }

    /// All rules in symbol order.
    pub fn rules(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.rules.iter().map(|(s, r)| (*s, r.as_str()))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Returns the only character of `s`, or `None` if `s` is empty or longer.
pub(crate) fn single_symbol(s: &str) -> Option<Symbol> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
