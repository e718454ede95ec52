//! Error types of the prover kernel

use crate::expression::Type;
use crate::proof_tree::NodeId;
use thiserror::Error;

/// A error produced when building or transforming a [`Sequent`](crate::Sequent)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequentError {
    #[error("type conflict for `{name}`: {existing} vs {new}")]
    TypeConflict {
        name: String,
        existing: Type,
        new: Type,
    },

    #[error("identifier `{0}` is not bound in the type environment")]
    UnboundIdentifier(String),

    #[error("ill-typed formula: {0}")]
    TypeMismatch(String),
}

/// A reasoner rejected its input against a sequent. No rule was produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reasoner}: {message}")]
pub struct ReasonerFailure {
    pub reasoner: String,
    pub message: String,
}

impl ReasonerFailure {
    pub fn new(reasoner: impl Into<String>, message: impl Into<String>) -> Self {
        ReasonerFailure {
            reasoner: reasoner.into(),
            message: message.into(),
        }
    }
}

/// Illegal state transition on a [`ProofTree`](crate::ProofTree)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofTreeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} already has a rule")]
    NotOpen(NodeId),

    #[error("node {0} has no rule to prune")]
    NotApplied(NodeId),

    #[error("rule `{reasoner}` was not computed against the sequent of node {node}")]
    SequentMismatch { node: NodeId, reasoner: String },
}

/// Reasons for a skeleton to be an "ill-formed proof"
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("unknown reasoner `{0}`")]
    UnknownReasoner(String),

    #[error(transparent)]
    Reasoner(#[from] ReasonerFailure),

    #[error("`{reasoner}` produced {found} antecedents, the skeleton records {expected}")]
    ShapeMismatch {
        reasoner: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Tree(#[from] ProofTreeError),

    #[error("invalid proof dependencies: {0}")]
    Dependencies(#[from] SequentError),

    #[error("skeleton is deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a reasoner with id `{0}` is already registered")]
    DuplicateId(String),

    #[error("the global registry is already installed")]
    AlreadyInstalled,
}

/// Why a tactic could not be applied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TacticFailure(pub String);

impl TacticFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        TacticFailure(reason.into())
    }
}

impl From<ReasonerFailure> for TacticFailure {
    fn from(e: ReasonerFailure) -> Self {
        TacticFailure(e.to_string())
    }
}

impl From<ProofTreeError> for TacticFailure {
    fn from(e: ProofTreeError) -> Self {
        TacticFailure(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
