//! Scene configuration: the single immutable value the whole pipeline is built from.
//!
//! A live edit (new axiom, iteration count or spread) is a new config value and
//! a re-run of the pipeline; nothing is patched in place.

use crate::error::{LSystemError, Result};
use crate::grammar::{Grammar, single_symbol};
use crate::interpreter::{TurtleConfig, TurtleConvention, TurtleInterpreter};
use crate::render::MeshConvention;
use crate::turtle::TurtleOp;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything needed to expand, interpret and place one plant.
///
/// ```toml
/// axiom = "A"
/// iterations = 3
/// spread = 25.0
///
/// [rules]
/// A = "F[+A][-A]FA"
///
/// [symbols]
/// "L" = "ornament"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LSystemConfig {
    /// Seed string for the grammar.
    pub axiom: String,
    /// Number of rewrite passes.
    pub iterations: u32,
    /// Spread angle in degrees for the root turtle state.
    pub spread: f32,
    /// Length of one `F`/`f` step.
    pub step_length: f32,
    /// Scale factor applied by `!`.
    pub shrink_factor: f32,
    /// Refuse expansions longer than this many symbols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_symbols: Option<usize>,
    /// Deepest allowed `[` nesting.
    pub max_stack_depth: usize,
    /// Root position of the plant.
    pub origin: Vec3,
    /// Production rules, keyed by a single-symbol predecessor.
    pub rules: BTreeMap<String, String>,
    /// Overrides applied on top of the standard symbol convention.
    pub symbols: BTreeMap<String, TurtleOp>,
    /// Local convention of the branch mesh.
    pub branch_mesh: MeshConvention,
    /// Local convention of the ornament mesh.
    pub ornament_mesh: MeshConvention,
}

impl Default for LSystemConfig {
    /// The sample scene: two trunk segments, an invisible spacer branch and a flower.
    fn default() -> Self {
        Self {
            axiom: "FF[f]A".to_string(),
            iterations: 1,
            spread: 60.0,
            step_length: 1.0,
            shrink_factor: 0.8,
            max_symbols: Some(1 << 22),
            max_stack_depth: 1024,
            origin: Vec3::ZERO,
            rules: BTreeMap::new(),
            symbols: BTreeMap::new(),
            branch_mesh: MeshConvention::default(),
            ornament_mesh: MeshConvention {
                offset: Vec3::new(0.75, -1.0, 0.0),
                scale: 10.0,
                ..Default::default()
            },
        }
    }
}

impl LSystemConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Builder helper for a single rule.
    pub fn with_rule(mut self, symbol: char, replacement: impl Into<String>) -> Self {
        self.rules.insert(symbol.to_string(), replacement.into());
        self
    }

    /// Checks every value the pipeline depends on.
    pub fn validate(&self) -> Result<()> {
        if self.axiom.is_empty() {
            return Err(LSystemError::EmptyAxiom);
        }
        for key in self.rules.keys().chain(self.symbols.keys()) {
            if single_symbol(key).is_none() {
                return Err(LSystemError::InvalidConfig(format!(
                    "`{key}` is not a single symbol"
                )));
            }
        }
        if !self.spread.is_finite() {
            return Err(LSystemError::InvalidConfig(format!(
                "spread must be finite, got {}",
                self.spread
            )));
        }
        if !(self.step_length.is_finite() && self.step_length > 0.0) {
            return Err(LSystemError::InvalidConfig(format!(
                "step_length must be positive, got {}",
                self.step_length
            )));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor <= 1.0) {
            return Err(LSystemError::InvalidConfig(format!(
                "shrink_factor must be in (0, 1], got {}",
                self.shrink_factor
            )));
        }
        if !self.origin.is_finite() {
            return Err(LSystemError::InvalidConfig("origin must be finite".into()));
        }
        Ok(())
    }

    /// Builds the grammar described by `axiom` and `rules`.
    pub fn grammar(&self) -> Result<Grammar> {
        self.validate()?;
        let mut grammar = Grammar::new(self.axiom.clone())?;
        for (key, replacement) in &self.rules {
            if let Some(sym) = single_symbol(key) {
                grammar.set_rule(sym, replacement.clone());
            }
        }
        Ok(grammar)
    }

    /// The standard convention with `symbols` overrides applied.
    pub fn convention(&self) -> TurtleConvention {
        let mut convention = TurtleConvention::standard();
        for (key, op) in &self.symbols {
            if let Some(sym) = single_symbol(key) {
                convention.set_op(sym, *op);
            }
        }
        convention
    }

    pub fn turtle_config(&self) -> TurtleConfig {
        TurtleConfig {
            origin: self.origin,
            step_length: self.step_length,
            spread: self.spread,
            shrink_factor: self.shrink_factor,
            max_stack_depth: self.max_stack_depth,
        }
    }

    pub fn interpreter(&self) -> TurtleInterpreter {
        TurtleInterpreter::new(self.turtle_config()).with_convention(self.convention())
    }
}
