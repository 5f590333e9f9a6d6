//! Iterated parallel rewriting of a [`Grammar`].

use crate::error::{LSystemError, Result};
use crate::grammar::{Grammar, Symbol};
use log::debug;
use std::collections::HashMap;

/// Rewrites a grammar's axiom a fixed number of times.
///
/// Expansion is pure: the same grammar and iteration count always produce the
/// same string. Rules may grow the string exponentially, so callers should keep
/// `iterations` small or set a symbol cap with
/// [`with_max_symbols`](Self::with_max_symbols).
#[derive(Clone, Copy, Debug, Default)]
pub struct Expander {
    max_symbols: Option<usize>,
}

impl Expander {
    /// An expander without a symbol cap. It only fails if a generation overflows `usize`
    /// or cannot be allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses to build any generation longer than `max_symbols` symbols.
    pub fn with_max_symbols(mut self, max_symbols: usize) -> Self {
        self.max_symbols = Some(max_symbols);
        self
    }

    pub fn max_symbols(&self) -> Option<usize> {
        self.max_symbols
    }

    /// Applies the grammar's rules `iterations` times to its axiom.
    ///
    /// `iterations == 0` returns the axiom unchanged. The length of each
    /// generation is computed before it is built; if it would exceed the cap
    /// the call fails with [`LSystemError::ExpansionLimit`], reporting how many
    /// iterations were completed.
    pub fn expand(&self, grammar: &Grammar, iterations: u32) -> Result<String> {
        let mut generations = self.run(grammar, iterations, false)?;
        Ok(generations.pop().unwrap_or_default())
    }

    /// Like [`expand`](Self::expand) but returns every generation from the axiom
    /// (index 0) to generation `iterations`.
    pub fn expand_each(&self, grammar: &Grammar, iterations: u32) -> Result<Vec<String>> {
        self.run(grammar, iterations, true)
    }

    fn run(&self, grammar: &Grammar, iterations: u32, keep_all: bool) -> Result<Vec<String>> {
        let limit = self.max_symbols.unwrap_or(usize::MAX);
        let lengths: HashMap<Symbol, (usize, usize)> = grammar
            .rules()
            .map(|(sym, rep)| (sym, (rep.chars().count(), rep.len())))
            .collect();

        let mut current = grammar.axiom().to_string();
        let mut current_len = current.chars().count();
        if current_len > limit {
            return Err(LSystemError::ExpansionLimit {
                completed_iterations: 0,
                requested_iterations: iterations,
                limit,
            });
        }

        let mut generations = Vec::new();
        for done in 0..iterations {
            let too_long = || LSystemError::ExpansionLimit {
                completed_iterations: done,
                requested_iterations: iterations,
                limit,
            };
            let (next_len, next_bytes) = next_length(&current, &lengths)
                .filter(|&(len, _)| len <= limit)
                .ok_or_else(too_long)?;

            // Allocation failure is reported like any other size limit.
            let mut next = String::new();
            next.try_reserve_exact(next_bytes).map_err(|_| too_long())?;
            for sym in current.chars() {
                match grammar.rule(sym) {
                    Some(replacement) => next.push_str(replacement),
                    None => next.push(sym),
                }
            }
            debug!(
                "expansion pass {}/{}: {} -> {} symbols",
                done + 1,
                iterations,
                current_len,
                next_len
            );

            let previous = std::mem::replace(&mut current, next);
            if keep_all {
                generations.push(previous);
            }
            current_len = next_len;
        }

        generations.push(current);
        Ok(generations)
    }
}

/// Expands `grammar` by `iterations` passes with no symbol cap.
pub fn expand(grammar: &Grammar, iterations: u32) -> Result<String> {
    Expander::new().expand(grammar, iterations)
}

/// Symbol and byte counts of the next generation, or `None` on overflow.
fn next_length(
    current: &str,
    lengths: &HashMap<Symbol, (usize, usize)>,
) -> Option<(usize, usize)> {
    current.chars().try_fold((0usize, 0usize), |(syms, bytes), sym| {
        let (n, b) = lengths
            .get(&sym)
            .copied()
            .unwrap_or((1, sym.len_utf8()));
        Some((syms.checked_add(n)?, bytes.checked_add(b)?))
    })
}
