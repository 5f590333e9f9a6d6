//! # lsystem-garden
//!
//! Grows branching plants from a bracketed L-System grammar and turns them into
//! instanced geometry using glam.
//!
//! The pipeline is pure and synchronous: a [`Grammar`] is rewritten by the
//! [`Expander`] into a command string, the [`TurtleInterpreter`] walks that
//! string with a stack of [`TurtleState`]s and emits an [`InstanceList`] of
//! branch and ornament placements, and [`InstanceBatches`] groups those into
//! per-mesh model matrices for a [`RendererAdapter`]. [`LSystem`] wires the
//! whole thing up from one [`LSystemConfig`].

pub mod config;
pub mod error;
pub mod expander;
pub mod grammar;
pub mod instance;
pub mod interpreter;
pub mod lsystem;
pub mod render;
pub mod turtle;

pub use config::*;
pub use error::*;
pub use expander::*;
pub use grammar::*;
pub use instance::*;
pub use interpreter::*;
pub use lsystem::*;
pub use render::*;
pub use turtle::*;
