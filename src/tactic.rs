//! Composable proof strategies.
//!
//! A [`Tactic`] is applied to a node of a [`ProofTree`] and either succeeds or reports why it
//! could not be applied. Tactics hold no state between applications, so one instance can be used
//! on any number of nodes and trees.
//!
//! ```
//! use seqprove::reasoner::{ReasonerInput, ReasonerRegistry};
//! use seqprove::serialization::Formatter;
//! use seqprove::tactic::{first_of, on_all_pending, reasoner_in, repeat, Tactic};
//! use seqprove::typing::TypeEnvironment;
//! use seqprove::{ProofTree, ProverConfig, Sequent};
//!
//! let registry = ReasonerRegistry::with_builtins();
//! let step = |id: &str| reasoner_in(&registry, id, ReasonerInput::Empty);
//! let auto = repeat(
//!     on_all_pending(first_of(vec![step("hyp"), step("conjI"), step("impI")])),
//!     &ProverConfig::default(),
//! );
//!
//! let fmt = Formatter::new();
//! let sequent = Sequent::new(
//!     TypeEnvironment::new(),
//!     vec![],
//!     fmt.read_predicate("((P => P) & (Q => (P => Q)))").unwrap(),
//! )
//! .unwrap();
//! let mut tree = ProofTree::new(sequent);
//! let root = tree.root();
//! auto.apply(&mut tree, root).unwrap();
//! assert!(tree.is_closed());
//! ```

use crate::{
    config::ProverConfig,
    error::TacticFailure,
    proof_tree::{NodeId, ProofTree},
    reasoner::{apply_checked, ReasonerInput, ReasonerRegistry},
};
use tracing::debug;

pub trait Tactic {
    fn name(&self) -> String;

    fn apply(&self, tree: &mut ProofTree, node: NodeId) -> Result<(), TacticFailure>;
}

pub type BoxedTactic<'a> = Box<dyn Tactic + 'a>;

fn names(tactics: &[BoxedTactic<'_>]) -> String {
    tactics
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

struct ReasonerTactic<'r> {
    registry: &'r ReasonerRegistry,
    id: String,
    input: ReasonerInput,
}

impl Tactic for ReasonerTactic<'_> {
    fn name(&self) -> String {
        self.id.clone()
    }

    fn apply(&self, tree: &mut ProofTree, node: NodeId) -> Result<(), TacticFailure> {
        let reasoner = self
            .registry
            .get(&self.id)
            .ok_or_else(|| TacticFailure::new(format!("unknown reasoner `{}`", self.id)))?;
        let sequent = match tree.node(node) {
            Some(n) if n.is_open() => n.sequent(),
            Some(_) => return Err(TacticFailure::new(format!("node {} is not open", node))),
            None => return Err(TacticFailure::new(format!("node {} does not exist", node))),
        };
        let rule = apply_checked(reasoner, sequent, &self.input)?;
        tree.apply_rule(node, rule)?;
        Ok(())
    }
}

/// Applies the reasoner `id` of the process-wide registry to an open node
pub fn reasoner(id: impl Into<String>, input: ReasonerInput) -> BoxedTactic<'static> {
    reasoner_in(ReasonerRegistry::global(), id, input)
}

/// Applies the reasoner `id` of `registry` to an open node
pub fn reasoner_in<'r>(
    registry: &'r ReasonerRegistry,
    id: impl Into<String>,
    input: ReasonerInput,
) -> BoxedTactic<'r> {
    Box::new(ReasonerTactic {
        registry,
        id: id.into(),
        input,
    })
}

struct Prune;

impl Tactic for Prune {
    fn name(&self) -> String {
        "prune".to_owned()
    }

    fn apply(&self, tree: &mut ProofTree, node: NodeId) -> Result<(), TacticFailure> {
        tree.prune(node)?;
        Ok(())
    }
}

/// Removes the rule applied to the node
pub fn prune() -> BoxedTactic<'static> {
    Box::new(Prune)
}

struct Compose<'a>(Vec<BoxedTactic<'a>>);

impl Tactic for Compose<'_> {
    fn name(&self) -> String {
        format!("compose({})", names(&self.0))
    }

    fn apply(&self, tree: &mut ProofTree, node: NodeId) -> Result<(), TacticFailure> {
        for tactic in &self.0 {
            tactic.apply(tree, node)?;
        }
        Ok(())
    }
}

/// Applies `tactics` to the same node in order, stopping at the first failure.
///
/// Changes made by the tactics before the failing one are kept.
pub fn compose(tactics: Vec<BoxedTactic<'_>>) -> BoxedTactic<'_> {
    Box::new(Compose(tactics))
}

struct FirstOf<'a>(Vec<BoxedTactic<'a>>);

impl Tactic for FirstOf<'_> {
    fn name(&self) -> String {
        format!("firstOf({})", names(&self.0))
    }

    fn apply(&self, tree: &mut ProofTree, node: NodeId) -> Result<(), TacticFailure> {
        let was_open = tree.is_open(node);
        let mut reasons = Vec::new();
        for tactic in &self.0 {
            match tactic.apply(tree, node) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if was_open && !tree.is_open(node) {
                        tree.prune(node)?;
                    }
                    reasons.push(format!("{}: {}", tactic.name(), e));
                }
            }
        }
        Err(TacticFailure::new(reasons.join("; ")))
    }
}

/// Applies the first of `tactics` that succeeds. A failing tactic that applied a rule to a
/// previously open node is undone before the next one is tried.
pub fn first_of(tactics: Vec<BoxedTactic<'_>>) -> BoxedTactic<'_> {
    Box::new(FirstOf(tactics))
}

struct OnAllPending<'a>(BoxedTactic<'a>);

impl Tactic for OnAllPending<'_> {
    fn name(&self) -> String {
        format!("onAllPending({})", self.0.name())
    }

    fn apply(&self, tree: &mut ProofTree, node: NodeId) -> Result<(), TacticFailure> {
        let pending = tree.open_descendants(node);
        if pending.is_empty() {
            return Err(TacticFailure::new(format!("no pending node below {}", node)));
        }
        let mut succeeded = false;
        let mut first_failure = None;
        for id in pending {
            match self.0.apply(tree, id) {
                Ok(()) => succeeded = true,
                Err(e) => {
                    first_failure.get_or_insert(e);
                }
            }
        }
        match first_failure {
            Some(e) if !succeeded => Err(e),
            _ => Ok(()),
        }
    }
}

/// Applies `tactic` to every open node at or below the node. Succeeds if it succeeded on at least
/// one of them.
pub fn on_all_pending(tactic: BoxedTactic<'_>) -> BoxedTactic<'_> {
    Box::new(OnAllPending(tactic))
}

struct Repeat<'a> {
    tactic: BoxedTactic<'a>,
    limit: usize,
}

impl Tactic for Repeat<'_> {
    fn name(&self) -> String {
        format!("repeat({})", self.tactic.name())
    }

    fn apply(&self, tree: &mut ProofTree, node: NodeId) -> Result<(), TacticFailure> {
        for _ in 0..self.limit {
            let before = tree.open_descendants(node);
            if self.tactic.apply(tree, node).is_err() || tree.open_descendants(node) == before {
                return Ok(());
            }
        }
        debug!(tactic = %self.name(), limit = self.limit, "repeat stopped at iteration limit");
        Ok(())
    }
}

/// Applies `tactic` until it fails or the open nodes below the node stay the same, for at most
/// `config.max_repeat_iterations` rounds. Never fails.
pub fn repeat<'a>(tactic: BoxedTactic<'a>, config: &ProverConfig) -> BoxedTactic<'a> {
    repeat_with_limit(tactic, config.max_repeat_iterations)
}

/// Like [`repeat`], giving up after `limit` rounds
pub fn repeat_with_limit(tactic: BoxedTactic<'_>, limit: usize) -> BoxedTactic<'_> {
    Box::new(Repeat { tactic, limit })
}

struct Fail(String);

impl Tactic for Fail {
    fn name(&self) -> String {
        "fail".to_owned()
    }

    fn apply(&self, _tree: &mut ProofTree, _node: NodeId) -> Result<(), TacticFailure> {
        Err(TacticFailure::new(self.0.clone()))
    }
}

/// Always fails with `message`
pub fn fail(message: impl Into<String>) -> BoxedTactic<'static> {
    Box::new(Fail(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::Formatter;
    use crate::typing::TypeEnvironment;
    use crate::Sequent;

    fn tree(hyps: &[&str], goal: &str) -> ProofTree {
        let fmt = Formatter::new();
        ProofTree::new(
            Sequent::new(
                TypeEnvironment::new(),
                hyps.iter().map(|h| fmt.read_predicate(h).unwrap()),
                fmt.read_predicate(goal).unwrap(),
            )
            .unwrap(),
        )
    }

    fn goals(tree: &ProofTree) -> Vec<String> {
        tree.open_leaves()
            .into_iter()
            .map(|id| tree.sequent(id).unwrap().goal().to_string())
            .collect()
    }

    #[test]
    fn reasoner_tactic() {
        let registry = ReasonerRegistry::with_builtins();
        let mut t = tree(&["P"], "P");
        let root = t.root();
        assert!(reasoner_in(&registry, "conjI", ReasonerInput::Empty)
            .apply(&mut t, root)
            .is_err());
        assert!(reasoner_in(&registry, "nope", ReasonerInput::Empty)
            .apply(&mut t, root)
            .is_err());
        let hyp = reasoner_in(&registry, "hyp", ReasonerInput::Empty);
        hyp.apply(&mut t, root).unwrap();
        assert!(t.is_closed());
        // the node is not open any more
        assert!(hyp.apply(&mut t, root).is_err());
        prune().apply(&mut t, root).unwrap();
        assert!(prune().apply(&mut t, root).is_err());
    }

    #[test]
    fn compose_stops_at_first_failure() {
        let registry = ReasonerRegistry::with_builtins();
        let mut t = tree(&[], "(P => (P & Q))");
        let root = t.root();
        let tactic = compose(vec![
            reasoner_in(&registry, "impI", ReasonerInput::Empty),
            fail("stop here"),
            reasoner_in(&registry, "conjI", ReasonerInput::Empty),
        ]);
        assert_eq!(tactic.apply(&mut t, root), Err(TacticFailure::new("stop here")));
        assert_eq!(goals(&t), vec!["(P & Q)"]);
        assert_eq!(tactic.name(), "compose(impI, fail, conjI)");
    }

    #[test]
    fn first_of_undoes_failed_attempts() {
        let registry = ReasonerRegistry::with_builtins();
        let mut t = tree(&["Q"], "(P => Q)");
        let root = t.root();
        let tactic = first_of(vec![
            compose(vec![
                reasoner_in(&registry, "impI", ReasonerInput::Empty),
                fail("dead end"),
            ]),
            reasoner_in(&registry, "cut", ReasonerInput::Predicate(Formatter::new().read_predicate("Q").unwrap())),
        ]);
        tactic.apply(&mut t, root).unwrap();
        assert_eq!(
            t.node(root).and_then(|n| n.rule()).map(|r| r.reasoner_id()),
            Some("cut")
        );

        let all_fail = first_of(vec![fail("a"), fail("b")]);
        let mut t = tree(&[], "P");
        let root = t.root();
        assert_eq!(
            all_fail.apply(&mut t, root),
            Err(TacticFailure::new("fail: a; fail: b"))
        );
    }

    #[test]
    fn on_all_pending_continues_after_failure() {
        let registry = ReasonerRegistry::with_builtins();
        let mut t = tree(&["Q"], "((P & Q) & Q)");
        let root = t.root();
        reasoner_in(&registry, "conjI", ReasonerInput::Empty)
            .apply(&mut t, root)
            .unwrap();
        let left = t.open_leaves()[0];
        reasoner_in(&registry, "conjI", ReasonerInput::Empty)
            .apply(&mut t, left)
            .unwrap();
        assert_eq!(goals(&t), vec!["P", "Q", "Q"]);

        let hyp = on_all_pending(reasoner_in(&registry, "hyp", ReasonerInput::Empty));
        hyp.apply(&mut t, root).unwrap();
        assert_eq!(goals(&t), vec!["P"]);
        assert!(hyp.apply(&mut t, root).is_err());
    }

    #[test]
    fn repeat_until_no_progress() {
        let registry = ReasonerRegistry::with_builtins();
        let step = |id: &str| reasoner_in(&registry, id, ReasonerInput::Empty);
        let auto = repeat(
            on_all_pending(first_of(vec![step("hyp"), step("conjI"), step("impI")])),
            &ProverConfig::default(),
        );

        let mut t = tree(&["P"], "((P & (Q => Q)) & (R => P))");
        let root = t.root();
        auto.apply(&mut t, root).unwrap();
        assert!(t.is_closed());

        // the same tactic instance works on another tree
        let mut t = tree(&[], "((P => P) & R)");
        let root = t.root();
        auto.apply(&mut t, root).unwrap();
        assert_eq!(goals(&t), vec!["R"]);
    }

    #[test]
    fn repeat_respects_limit() {
        let registry = ReasonerRegistry::with_builtins();
        let split = || on_all_pending(reasoner_in(&registry, "conjI", ReasonerInput::Empty));
        let mut t = tree(&[], "(((P & Q) & R) & S)");
        let root = t.root();
        repeat_with_limit(split(), 1).apply(&mut t, root).unwrap();
        assert_eq!(goals(&t), vec!["((P & Q) & R)", "S"]);
        repeat_with_limit(split(), 0).apply(&mut t, root).unwrap();
        assert_eq!(t.open_leaves().len(), 2);
        repeat(split(), &ProverConfig::default())
            .apply(&mut t, root)
            .unwrap();
        assert_eq!(goals(&t), vec!["P", "Q", "R", "S"]);
    }

    #[test]
    fn repeat_uses_configured_limit() {
        let registry = ReasonerRegistry::with_builtins();
        let config = ProverConfig::from_toml_str("max_repeat_iterations = 2").unwrap();
        let split = on_all_pending(reasoner_in(&registry, "conjI", ReasonerInput::Empty));
        let mut t = tree(&[], "(((P & Q) & R) & S)");
        let root = t.root();
        repeat(split, &config).apply(&mut t, root).unwrap();
        assert_eq!(goals(&t), vec!["(P & Q)", "R", "S"]);
    }
}
