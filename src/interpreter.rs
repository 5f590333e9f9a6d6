//! Interpreter that converts an expanded command string into an [`InstanceList`].
//!
//! The entry point is [`TurtleInterpreter`]. Configure it with a [`TurtleConfig`]
//! and a [`TurtleConvention`] (which symbol does what), then call
//! [`TurtleInterpreter::interpret`] with the output of the expander, or
//! [`TurtleInterpreter::interpret_symbios`] with a [`symbios::SymbiosState`].

use crate::error::{LSystemError, Result};
use crate::grammar::Symbol;
use crate::instance::{InstanceList, MeshSelector, Placement};
use crate::turtle::{TurtleAxis, TurtleOp, TurtleState};
use glam::{Quat, Vec3};
use log::debug;
use std::collections::BTreeMap;
use symbios::{SymbiosState, SymbolTable};

/// Configuration for turtle interpretation.
#[derive(Clone, Debug)]
pub struct TurtleConfig {
    /// Where the root state starts (the mesh origin of the plant).
    pub origin: Vec3,
    /// Default step length for `F`/`f`.
    pub step_length: f32,
    /// Default spread angle in degrees for spread-relative rotations.
    pub spread: f32,
    /// Factor applied to the accumulated scale by `!`.
    pub shrink_factor: f32,
    /// Maximum stack depth for push/pop operations.
    pub max_stack_depth: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            step_length: 1.0,
            spread: 60.0,
            shrink_factor: 0.8,
            max_stack_depth: 1024,
        }
    }
}

impl TurtleConfig {
    /// The canonical starting state: at `origin`, facing `+Z` with `+Y` up,
    /// unit scale, and the configured step and spread.
    pub fn root_state(&self) -> TurtleState {
        TurtleState {
            position: self.origin,
            rotation: Quat::IDENTITY,
            step_length: self.step_length,
            spread: self.spread,
            scale: 1.0,
        }
    }
}

/// The symbol-to-operation table used by the interpreter.
///
/// | Symbol | Operation |
/// |---|---|
/// | `F` | [`TurtleOp::Draw`] |
/// | `f` | [`TurtleOp::Move`] |
/// | `A` | [`TurtleOp::Ornament`] |
/// | `+` / `-` | [`TurtleOp::Yaw`] `(+1 / -1)` |
/// | `&` / `^` | [`TurtleOp::Pitch`] `(+1 / -1)` |
/// | `\` / `/` | [`TurtleOp::Roll`] `(+1 / -1)` |
/// | `\|` | [`TurtleOp::Turn`] 180 degrees about Up |
/// | `!` | [`TurtleOp::Shrink`] |
/// | `[` / `]` | [`TurtleOp::Push`] / [`TurtleOp::Pop`] |
///
/// [`TurtleOp::SetSpread`] and [`TurtleOp::SetStep`] have no standard symbol;
/// map them with [`set_op`](Self::set_op).
///
/// Any other symbol is [`TurtleOp::Ignore`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurtleConvention {
    ops: BTreeMap<Symbol, TurtleOp>,
}

impl TurtleConvention {
    /// A convention where every symbol is ignored.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The conventional bracketed-plant mappings listed on the type.
    pub fn standard() -> Self {
        let mut convention = Self::empty();
        convention.populate_standard_symbols();
        convention
    }

    /// Registers the standard mappings, overwriting any existing entry for those symbols.
    pub fn populate_standard_symbols(&mut self) {
        let mappings = [
            // Geometry
            ('F', TurtleOp::Draw),
            ('f', TurtleOp::Move),
            ('A', TurtleOp::Ornament),
            // Orientation
            ('+', TurtleOp::Yaw(1.0)),
            ('-', TurtleOp::Yaw(-1.0)),
            ('&', TurtleOp::Pitch(1.0)),
            ('^', TurtleOp::Pitch(-1.0)),
            ('\\', TurtleOp::Roll(1.0)),
            ('/', TurtleOp::Roll(-1.0)),
            (
                '|',
                TurtleOp::Turn {
                    axis: TurtleAxis::Up,
                    degrees: 180.0,
                },
            ),
            // Style
            ('!', TurtleOp::Shrink),
            // Flow
            ('[', TurtleOp::Push),
            (']', TurtleOp::Pop),
        ];

        for (sym, op) in mappings {
            self.set_op(sym, op);
        }
    }

    /// Assigns `op` to `symbol`. Mapping to [`TurtleOp::Ignore`] removes the entry.
    pub fn set_op(&mut self, symbol: Symbol, op: TurtleOp) {
        if op == TurtleOp::Ignore {
            self.ops.remove(&symbol);
        } else {
            self.ops.insert(symbol, op);
        }
    }

    /// Builder form of [`set_op`](Self::set_op).
    pub fn with_op(mut self, symbol: Symbol, op: TurtleOp) -> Self {
        self.set_op(symbol, op);
        self
    }

    pub fn op(&self, symbol: Symbol) -> TurtleOp {
        self.ops.get(&symbol).copied().unwrap_or(TurtleOp::Ignore)
    }

    /// Every explicitly mapped symbol, in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, TurtleOp)> + '_ {
        self.ops.iter().map(|(s, op)| (*s, *op))
    }

    /// Builds an op map indexed by symbol ID as returned by [`symbios::SymbolTable`].
    ///
    /// Symbols that are not present in the interner are skipped; any ID that
    /// falls outside the returned vector is treated as [`TurtleOp::Ignore`].
    pub fn symbios_op_map(&self, interner: &SymbolTable) -> Vec<TurtleOp> {
        let mut map = Vec::new();
        for (sym, op) in self.iter() {
            if let Some(id) = interner.resolve_id(&sym.to_string()) {
                let idx = id as usize;
                if idx >= map.len() {
                    map.resize(idx + 1, TurtleOp::Ignore);
                }
                map[idx] = op;
            }
        }
        map
    }
}

/// Interprets L-System output to build an [`InstanceList`].
#[derive(Clone, Debug)]
pub struct TurtleInterpreter {
    convention: TurtleConvention,
    config: TurtleConfig,
}

impl TurtleInterpreter {
    /// Creates a new interpreter with the given configuration and the standard convention.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            convention: TurtleConvention::standard(),
            config,
        }
    }

    /// Replaces the symbol convention (builder pattern).
    pub fn with_convention(mut self, convention: TurtleConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Assigns a single [`TurtleOp`] to a symbol.
    pub fn set_op(&mut self, symbol: Symbol, op: TurtleOp) {
        self.convention.set_op(symbol, op);
    }

    pub fn convention(&self) -> &TurtleConvention {
        &self.convention
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// The state interpretation starts from when the caller has no other preference.
    pub fn root_state(&self) -> TurtleState {
        self.config.root_state()
    }

    /// Interprets `commands` starting from `root` and returns the placements.
    ///
    /// Walks every symbol in order, dispatching each to its registered
    /// [`TurtleOp`]. Symbols with no registered mapping are ignored.
    ///
    /// # Placement
    ///
    /// `F` emits a [`MeshSelector::Branch`] placement from the state *before* the
    /// move, oriented along the heading and scaled to the segment length, then
    /// advances the turtle to the segment's tip. `A` emits a
    /// [`MeshSelector::Ornament`] placement at the current state without moving.
    ///
    /// # Push / Pop
    ///
    /// `[` saves a copy of the full turtle state; `]` restores it, so the path
    /// after `]` continues from the branch point. States still on the stack
    /// when the string ends are discarded.
    ///
    /// # Errors
    ///
    /// A `]` on an empty stack fails with [`LSystemError::UnmatchedPop`] and a
    /// `[` beyond `max_stack_depth` with [`LSystemError::StackOverflow`]. Both
    /// carry the placements emitted so far.
    pub fn interpret(&self, commands: &str, root: &TurtleState) -> Result<InstanceList> {
        let mut run = Run::new(root, &self.config);
        for (position, sym) in commands.chars().enumerate() {
            run.step(self.convention.op(sym), None, position)?;
        }
        Ok(run.finish())
    }

    /// Interprets a [`symbios::SymbiosState`] using the same convention.
    ///
    /// Symbol IDs are resolved through `interner`. When a module carries a first
    /// parameter it overrides the segment length for `F`/`f` (sign ignored),
    /// the angle in degrees for rotations, and the value of
    /// [`TurtleOp::SetSpread`] / [`TurtleOp::SetStep`].
    pub fn interpret_symbios(
        &self,
        state: &SymbiosState,
        interner: &SymbolTable,
        root: &TurtleState,
    ) -> Result<InstanceList> {
        let op_map = self.convention.symbios_op_map(interner);
        let mut run = Run::new(root, &self.config);

        for i in 0..state.len() {
            let view = match state.get_view(i) {
                Some(v) => v,
                None => break,
            };

            let op = op_map
                .get(view.sym as usize)
                .copied()
                .unwrap_or(TurtleOp::Ignore);
            let arg = view.params.first().map(|&x| x as f32);
            run.step(op, arg, i)?;
        }

        Ok(run.finish())
    }
}

/// Mutable bookkeeping for a single interpretation pass.
struct Run<'a> {
    config: &'a TurtleConfig,
    turtle: TurtleState,
    stack: Vec<TurtleState>,
    instances: InstanceList,
}

impl<'a> Run<'a> {
    fn new(root: &TurtleState, config: &'a TurtleConfig) -> Self {
        Self {
            config,
            turtle: root.clone(),
            stack: Vec::new(),
            instances: InstanceList::new(),
        }
    }

    /// Applies one operation. `arg` overrides the length or angle when present.
    fn step(&mut self, op: TurtleOp, arg: Option<f32>, position: usize) -> Result<()> {
        let angle = |s: f32, t: &TurtleState| arg.unwrap_or(t.spread) * s;

        match op {
            // --- GEOMETRY ---
            TurtleOp::Draw => {
                let len = arg.map_or_else(|| self.turtle.effective_step(), f32::abs);
                self.instances.push(Placement {
                    mesh: MeshSelector::Branch,
                    translation: self.turtle.position,
                    rotation: self.turtle.rotation,
                    scale: len,
                });
                self.turtle = self.turtle.forward(len);
            }
            TurtleOp::Move => {
                let len = arg.map_or_else(|| self.turtle.effective_step(), f32::abs);
                self.turtle = self.turtle.forward(len);
            }
            TurtleOp::Ornament => self.instances.push(Placement {
                mesh: MeshSelector::Ornament,
                translation: self.turtle.position,
                rotation: self.turtle.rotation,
                scale: self.turtle.scale,
            }),

            // --- ORIENTATION ---
            TurtleOp::Yaw(s) => {
                self.turtle = self.turtle.rotate(TurtleAxis::Up, angle(s, &self.turtle));
            }
            TurtleOp::Pitch(s) => {
                self.turtle = self.turtle.rotate(TurtleAxis::Right, angle(s, &self.turtle));
            }
            TurtleOp::Roll(s) => {
                self.turtle = self
                    .turtle
                    .rotate(TurtleAxis::Heading, angle(s, &self.turtle));
            }
            TurtleOp::Turn { axis, degrees } => {
                self.turtle = self.turtle.rotate(axis, arg.unwrap_or(degrees));
            }

            // --- STYLE ---
            TurtleOp::Shrink => {
                self.turtle = self.turtle.scaled(self.config.shrink_factor);
            }
            TurtleOp::SetSpread(degrees) => {
                self.turtle = self.turtle.with_spread(arg.unwrap_or(degrees));
            }
            TurtleOp::SetStep(length) => {
                self.turtle = self.turtle.with_step_length(arg.unwrap_or(length).abs());
            }

            // --- FLOW ---
            TurtleOp::Push => {
                if self.stack.len() >= self.config.max_stack_depth {
                    return Err(LSystemError::StackOverflow {
                        position,
                        depth: self.config.max_stack_depth,
                        partial: std::mem::take(&mut self.instances),
                    });
                }
                self.stack.push(self.turtle.clone());
            }
            TurtleOp::Pop => match self.stack.pop() {
                Some(state) => self.turtle = state,
                None => {
                    return Err(LSystemError::UnmatchedPop {
                        position,
                        partial: std::mem::take(&mut self.instances),
                    });
                }
            },
            TurtleOp::Ignore => {}
        }
        Ok(())
    }

    fn finish(self) -> InstanceList {
        debug!(
            "interpreted {} placements ({} branches, {} ornaments), {} unclosed branches",
            self.instances.len(),
            self.instances.count(MeshSelector::Branch),
            self.instances.count(MeshSelector::Ornament),
            self.stack.len()
        );
        self.instances
    }
}
