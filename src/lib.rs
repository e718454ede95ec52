//! `seqprove` is the kernel of an interactive sequent-calculus prover. It represents proof
//! obligations as sequents, applies inference rules to them to grow proof trees, and rebuilds
//! proof trees from stored skeletons.
//!
//! # Main data structures
//! There are five main data structures in `seqprove`: [`Sequent`]s, [`Rule`]s,
//! [`ProofTree`]s, [`ProofSkeleton`]s and [`Tactic`](tactic::Tactic)s.
//!
//! ## Sequents
//! A [`Sequent`] is a proof obligation like _x : s, x = y ⊢ y : s_. It consists of a
//! [type environment](typing::TypeEnvironment) declaring the free identifiers, a set of
//! [`Hypothesis`]es and a goal. Hypotheses carry two presentation flags, _selected_ and
//! _hidden_, which do not change the meaning of the sequent.
//!
//! Sequents are immutable. Adding hypotheses, replacing the goal or changing flags creates a new
//! sequent.
//!
//! ## Rules
//! A [`Rule`] is what a [reasoner](reasoner::Reasoner) produces when it is applied to a sequent
//! with some input: zero or more new sequents (_antecedents_) which together imply the original
//! one, and a confidence. A rule with no antecedents and the maximal confidence
//! ([`DISCHARGED_MAX`]) discharges its sequent outright.
//!
//! Reasoners are known by a string id and looked up in a
//! [`ReasonerRegistry`](reasoner::ReasonerRegistry).
//!
//! ## Proof trees
//! A [`ProofTree`] starts as a single open node holding the sequent to prove. Applying a rule to an
//! open node creates one open child per antecedent. The confidence of a node is the minimum of its
//! rule and all its children, so a single open node anywhere below keeps it pending. The tree is
//! closed when its root is discharged.
//!
//! ## Skeletons
//! A [`ProofSkeleton`] records which reasoner was applied with which input at every node of a
//! tree, and nothing else. The [`ProofBuilder`] replays a skeleton onto a fresh tree, repairing
//! references to identifiers that got renamed on the way (see [`ReplayHints`]).
//!
//! ## Tactics
//! [Tactics](tactic) combine reasoner applications into strategies: sequencing, alternation,
//! repetition and application to all open nodes.

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

mod builder;
mod config;
pub mod error;
pub mod expression;
mod hypothesis;
mod proof_tree;
pub mod reasoner;
mod rule;
mod sequent;
pub mod serialization;
mod skeleton;
pub mod tactic;
mod types;
pub mod typing;

pub use builder::*;
pub use config::ProverConfig;
pub use hypothesis::Hypothesis;
pub use proof_tree::*;
pub use rule::*;
pub use sequent::*;
pub use skeleton::*;
pub use types::*;
