//! The full pipeline: config -> grammar -> expansion -> placements -> batches.

use crate::config::LSystemConfig;
use crate::error::Result;
use crate::expander::Expander;
use crate::grammar::Grammar;
use crate::instance::InstanceList;
use crate::interpreter::TurtleInterpreter;
use crate::render::InstanceBatches;
use crate::turtle::TurtleState;
use log::{debug, trace};

/// A configured plant with its expansion cached.
///
/// Expansion is the expensive step and depends only on the axiom, the rules and
/// the iteration count, so changing the spread re-uses the cached string while
/// changing the iteration count re-expands.
#[derive(Clone, Debug)]
pub struct LSystem {
    config: LSystemConfig,
    grammar: Grammar,
    interpreter: TurtleInterpreter,
    expanded: String,
}

impl LSystem {
    /// Validates `config`, builds its grammar and expands it.
    pub fn new(config: LSystemConfig) -> Result<Self> {
        let grammar = config.grammar()?;
        let expanded = expander_for(&config).expand(&grammar, config.iterations)?;
        debug!(
            "expanded `{}` x{} into {} symbols",
            grammar.axiom(),
            config.iterations,
            expanded.chars().count()
        );
        Ok(Self {
            interpreter: config.interpreter(),
            config,
            grammar,
            expanded,
        })
    }

    pub fn config(&self) -> &LSystemConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn interpreter(&self) -> &TurtleInterpreter {
        &self.interpreter
    }

    /// The cached command string.
    pub fn expanded(&self) -> &str {
        &self.expanded
    }

    pub fn root_state(&self) -> TurtleState {
        self.interpreter.root_state()
    }

    /// Interprets the cached command string from the configured root state.
    pub fn instances(&self) -> Result<InstanceList> {
        self.interpreter.interpret(&self.expanded, &self.root_state())
    }

    /// Interprets and groups the result per mesh using the configured mesh conventions.
    pub fn batches(&self) -> Result<InstanceBatches> {
        let instances = self.instances()?;
        Ok(InstanceBatches::build(
            &instances,
            &self.config.branch_mesh,
            &self.config.ornament_mesh,
        ))
    }

    /// A copy with a different spread angle. The expansion is re-used.
    pub fn with_spread(&self, spread: f32) -> Result<Self> {
        let config = LSystemConfig {
            spread,
            ..self.config.clone()
        };
        config.validate()?;
        trace!("re-using cached expansion for spread {spread}");
        Ok(Self {
            interpreter: config.interpreter(),
            config,
            grammar: self.grammar.clone(),
            expanded: self.expanded.clone(),
        })
    }

    /// A copy expanded to a different iteration count.
    pub fn with_iterations(&self, iterations: u32) -> Result<Self> {
        if iterations == self.config.iterations {
            return Ok(self.clone());
        }
        Self::new(LSystemConfig {
            iterations,
            ..self.config.clone()
        })
    }
}

fn expander_for(config: &LSystemConfig) -> Expander {
    match config.max_symbols {
        Some(max) => Expander::new().with_max_symbols(max),
        None => Expander::new(),
    }
}
