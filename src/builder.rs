use crate::{
    config::ProverConfig,
    error::{ProofTreeError, ReplayError},
    expression::{Expression, Substitution},
    proof_tree::{NodeId, ProofTree},
    reasoner::{apply_checked, ReasonerRegistry},
    sequent::{ProofDependencies, Sequent},
    serialization::Formatter,
    skeleton::ProofSkeleton,
};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Renamings of identifiers recorded in a skeleton to the identifiers generated while replaying
/// it.
///
/// When a rule introduces a fresh identifier the name it picks depends on the sequent. Replaying
/// against a slightly different sequent can pick another name, and inputs recorded further down
/// the skeleton still refer to the old one. Hints are immutable, each replay step derives the
/// hints for its children from those of its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayHints {
    renamings: BTreeMap<String, Expression>,
}

impl ReplayHints {
    pub fn new() -> Self {
        ReplayHints {
            renamings: BTreeMap::new(),
        }
    }

    /// Returns these hints extended by renaming `recorded[i]` to `current[i]`.
    ///
    /// ```
    /// use seqprove::ReplayHints;
    ///
    /// let hints = ReplayHints::new().extended(&["x".to_owned()], &["x0".to_owned()]);
    /// assert_eq!(hints.renaming("x"), Some("x0"));
    /// // introducing the recorded name again removes the renaming
    /// let hints = hints.extended(&["x".to_owned()], &["x".to_owned()]);
    /// assert!(hints.is_empty());
    /// ```
    pub fn extended(&self, recorded: &[String], current: &[String]) -> Self {
        let mut renamings = self.renamings.clone();
        for (old, new) in recorded.iter().zip(current) {
            if old == new {
                renamings.remove(old);
            } else {
                renamings.insert(old.clone(), Expression::identifier(new.clone()));
            }
        }
        ReplayHints { renamings }
    }

    pub fn renaming(&self, name: &str) -> Option<&str> {
        match self.renamings.get(name) {
            Some(Expression::Identifier(new)) => Some(new),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.renamings.is_empty()
    }
}

impl Substitution for ReplayHints {
    fn substitution_opt(&self, name: &str) -> Option<&Expression> {
        self.renamings.get(name)
    }
}

/// Cancellation flag owned by the caller of a replay.
///
/// It is polled before every replay step. A single reasoner application is not interrupted.
pub trait Monitor {
    fn is_cancelled(&self) -> bool;
}

impl Monitor for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl Monitor for Cell<bool> {
    fn is_cancelled(&self) -> bool {
        self.get()
    }
}

/// A [`Monitor`] for replays that run to the end
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancelled;

impl Monitor for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Outcome of a replay that did not fail
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReplayStatus {
    /// Every recorded rule was applied
    Complete,
    /// The monitor asked to stop. The nodes not reached yet are left open.
    Cancelled,
}

/// Reconstructs proof trees from skeletons
#[derive(Debug, Clone)]
pub struct ProofBuilder<'r> {
    registry: &'r ReasonerRegistry,
    formatter: Formatter,
    config: ProverConfig,
}

impl ProofBuilder<'static> {
    /// A builder using the process-wide registry
    pub fn with_global_registry(config: ProverConfig) -> Self {
        ProofBuilder::new(ReasonerRegistry::global(), Formatter::new(), config)
    }
}

impl<'r> ProofBuilder<'r> {
    pub fn new(registry: &'r ReasonerRegistry, formatter: Formatter, config: ProverConfig) -> Self {
        ProofBuilder {
            registry,
            formatter,
            config,
        }
    }

    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// Replays `skeleton` on the open node `node` of `tree`.
    ///
    /// On failure the proof is ill-formed. The nodes replayed before the failure stay in the
    /// tree, the caller decides whether to prune them.
    ///
    /// # Errors
    /// * `UnknownReasoner` - if the skeleton uses a reasoner missing from the registry
    /// * `Reasoner` - if a recorded input is rejected
    /// * `ShapeMismatch` - if a reasoner now produces a different number of antecedents
    /// * `Tree` - if `node` is not an open node of `tree`
    /// * `TooDeep` - if the skeleton is deeper than configured
    pub fn rebuild(
        &self,
        tree: &mut ProofTree,
        node: NodeId,
        skeleton: &ProofSkeleton,
        monitor: &dyn Monitor,
    ) -> Result<ReplayStatus, ReplayError> {
        match tree.node(node) {
            None => return Err(ProofTreeError::UnknownNode(node).into()),
            Some(n) if !n.is_open() => return Err(ProofTreeError::NotOpen(node).into()),
            Some(_) => {}
        }
        let result = self.replay(tree, node, skeleton, monitor);
        match &result {
            Ok(ReplayStatus::Complete) => debug!(node = %node, "replay complete"),
            Ok(ReplayStatus::Cancelled) => warn!(node = %node, "replay cancelled"),
            Err(e) => warn!(node = %node, error = %e, "ill-formed proof"),
        }
        result
    }

    /// Builds the root sequent from `dependencies` and replays `skeleton` on it
    pub fn rebuild_from_dependencies(
        &self,
        dependencies: &ProofDependencies,
        skeleton: &ProofSkeleton,
        monitor: &dyn Monitor,
    ) -> Result<(ProofTree, ReplayStatus), ReplayError> {
        let sequent = Sequent::from_dependencies(dependencies)?;
        let mut tree = ProofTree::with_formatter(sequent, self.formatter);
        let root = tree.root();
        let status = self.rebuild(&mut tree, root, skeleton, monitor)?;
        Ok((tree, status))
    }

    /// Replays depth first, children left to right, with an explicit work list so that the
    /// depth of a skeleton is only bounded by configuration.
    fn replay(
        &self,
        tree: &mut ProofTree,
        root: NodeId,
        skeleton: &ProofSkeleton,
        monitor: &dyn Monitor,
    ) -> Result<ReplayStatus, ReplayError> {
        let mut pending = vec![(root, skeleton, ReplayHints::new(), 1usize)];
        while let Some((node, skeleton, hints, depth)) = pending.pop() {
            if monitor.is_cancelled() {
                return Ok(ReplayStatus::Cancelled);
            }
            if depth > self.config.max_replay_depth {
                return Err(ReplayError::TooDeep(self.config.max_replay_depth));
            }
            if !skeleton.comment.is_empty() {
                tree.set_comment(node, skeleton.comment.clone())?;
            }
            let recorded = match &skeleton.rule {
                Some(rule) => rule,
                None => continue,
            };
            let reasoner = self
                .registry
                .get(&recorded.reasoner_id)
                .ok_or_else(|| ReplayError::UnknownReasoner(recorded.reasoner_id.clone()))?;
            let mut input = self
                .formatter
                .read_input(reasoner.input_kind(), &recorded.input);
            if self.config.apply_replay_hints && !hints.is_empty() {
                input = input.substitute(&hints);
            }
            let sequent = tree
                .sequent(node)
                .ok_or(ProofTreeError::UnknownNode(node))?;
            let rule = apply_checked(reasoner, sequent, &input)?;
            if rule.antecedents().len() != skeleton.children.len() {
                return Err(ReplayError::ShapeMismatch {
                    reasoner: recorded.reasoner_id.clone(),
                    expected: skeleton.children.len(),
                    found: rule.antecedents().len(),
                });
            }
            let added: Vec<Vec<String>> = rule
                .antecedents()
                .iter()
                .map(|a| a.added_identifiers().to_vec())
                .collect();
            debug!(node = %node, reasoner = %recorded.reasoner_id, depth, "replayed rule");
            let children = tree.apply_rule(node, rule)?;
            let steps: Vec<_> = children
                .into_iter()
                .zip(&skeleton.children)
                .enumerate()
                .map(|(i, (child, child_skeleton))| {
                    let child_hints = match recorded.added_identifiers.get(i) {
                        Some(names) => hints.extended(names, &added[i]),
                        None => hints.clone(),
                    };
                    (child, child_skeleton, child_hints, depth + 1)
                })
                .collect();
            // the leftmost child is replayed first
            pending.extend(steps.into_iter().rev());
        }
        Ok(ReplayStatus::Complete)
    }
}
