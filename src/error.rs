//! Error values returned by grammar construction, expansion and interpretation.

use crate::instance::InstanceList;
use thiserror::Error;

/// Result type alias using the crate's [`LSystemError`].
pub type Result<T> = std::result::Result<T, LSystemError>;

/// Coarse classification of an [`LSystemError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied an unusable axiom, rule or setting.
    Config,
    /// The command string could not be interpreted to the end.
    Interpreter,
    /// Expansion would outgrow the configured (or addressable) size.
    Resource,
}

/// Errors that can occur while building or running an L-System.
#[derive(Error, Debug)]
pub enum LSystemError {
    /// The axiom has no symbols.
    #[error("axiom must contain at least one symbol")]
    EmptyAxiom,

    /// A textual rule could not be parsed.
    #[error("malformed rule `{rule}`: {reason}")]
    MalformedRule { rule: String, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML configuration could not be decoded.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration could not be encoded as TOML.
    #[error("failed to serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A `]` was read while the state stack was empty.
    ///
    /// `partial` holds every placement emitted before the offending symbol.
    #[error("unmatched pop at symbol {position}")]
    UnmatchedPop {
        position: usize,
        partial: InstanceList,
    },

    /// A `[` would grow the state stack beyond `depth`.
    #[error("state stack exceeded {depth} entries at symbol {position}")]
    StackOverflow {
        position: usize,
        depth: usize,
        partial: InstanceList,
    },

    /// The next expansion pass would exceed `limit` symbols.
    #[error(
        "expansion exceeds {limit} symbols; {completed_iterations} of {requested_iterations} iterations completed"
    )]
    ExpansionLimit {
        completed_iterations: u32,
        requested_iterations: u32,
        limit: usize,
    },
}

impl LSystemError {
    /// Returns the broad category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyAxiom
            | Self::MalformedRule { .. }
            | Self::InvalidConfig(_)
            | Self::Toml(_)
            | Self::TomlSerialize(_) => ErrorKind::Config,
            Self::UnmatchedPop { .. } | Self::StackOverflow { .. } => ErrorKind::Interpreter,
            Self::ExpansionLimit { .. } => ErrorKind::Resource,
        }
    }

    /// The placements accumulated before an interpretation pass was aborted.
    pub fn partial(&self) -> Option<&InstanceList> {
        match self {
            Self::UnmatchedPop { partial, .. } | Self::StackOverflow { partial, .. } => {
                Some(partial)
            }
            _ => None,
        }
    }

    /// Consumes the error, keeping the partial placements if there are any.
    pub fn into_partial(self) -> Option<InstanceList> {
        match self {
            Self::UnmatchedPop { partial, .. } | Self::StackOverflow { partial, .. } => {
                Some(partial)
            }
            _ => None,
        }
    }
}
