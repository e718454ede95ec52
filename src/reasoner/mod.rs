//! Reasoners turn a sequent and an input into a [`Rule`].
//!
//! A reasoner is identified by a stable string id, which is what a
//! [`ProofSkeleton`](crate::ProofSkeleton) records together with the textual form of the input.
//! Reasoners are looked up by id in a [`ReasonerRegistry`].

use crate::{
    error::ReasonerFailure,
    expression::{Expression, Predicate, Substitution},
    rule::Rule,
    sequent::Sequent,
    types::Confidence,
};
use tracing::debug;

mod membership;
mod propositional;
mod quantifier;
mod registry;
mod structural;

pub use membership::MembershipGoal;
pub use propositional::{
    Conjunction, ConjunctionElimination, Contradiction, DisjunctionElimination, FalseHypothesis,
    Hyp, Implication, ImplicationElimination, ModusPonens, TrueGoal,
};
pub use quantifier::{ExistentialElimination, UniversalElimination, UniversalIntroduction};
pub use registry::ReasonerRegistry;
pub use structural::{Cut, ManageHypotheses, Review};

/// An inference engine producing rules.
///
/// Implementations must not have side effects. They are shared through the process-wide
/// registry, hence `Send + Sync`.
pub trait Reasoner: Send + Sync {
    /// Stable identifier recorded in proof skeletons
    fn id(&self) -> &'static str;

    /// The kind of input this reasoner expects
    fn input_kind(&self) -> InputKind;

    /// Computes the rule obtained by applying this reasoner to `sequent`.
    ///
    /// Callers should go through [`apply_checked`], which rejects inputs carrying an error or of
    /// the wrong kind before this is called.
    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure>;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputKind {
    Empty,
    Hypothesis,
    Predicate,
    Instantiation,
    Confidence,
    HypAction,
}

/// Flag change requested from the `mngHyp` reasoner
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum HypAction {
    Hide,
    Show,
    Select,
    Deselect,
}

impl HypAction {
    pub fn keyword(self) -> &'static str {
        match self {
            HypAction::Hide => "hide",
            HypAction::Show => "show",
            HypAction::Select => "select",
            HypAction::Deselect => "deselect",
        }
    }
}

/// The input of a reasoner.
///
/// An input that could not be read is represented by `Error` rather than failing early, so that
/// the failure is reported by the reasoner it was meant for.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ReasonerInput {
    Empty,
    /// A hypothesis of the sequent the reasoner is applied to
    Hypothesis(Predicate),
    /// An arbitrary predicate, like the lemma of a cut
    Predicate(Predicate),
    Instantiation {
        hypothesis: Predicate,
        witnesses: Vec<Expression>,
    },
    Confidence(Confidence),
    HypAction {
        action: HypAction,
        hypotheses: Vec<Predicate>,
    },
    Error(String),
}

impl ReasonerInput {
    /// Returns the kind of this input, or `None` if it carries an error
    pub fn kind(&self) -> Option<InputKind> {
        match self {
            ReasonerInput::Empty => Some(InputKind::Empty),
            ReasonerInput::Hypothesis(_) => Some(InputKind::Hypothesis),
            ReasonerInput::Predicate(_) => Some(InputKind::Predicate),
            ReasonerInput::Instantiation { .. } => Some(InputKind::Instantiation),
            ReasonerInput::Confidence(_) => Some(InputKind::Confidence),
            ReasonerInput::HypAction { .. } => Some(InputKind::HypAction),
            ReasonerInput::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ReasonerInput::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Uses the given substitution on every formula referenced by this input
    pub fn substitute<S: Substitution + ?Sized>(&self, substitution: &S) -> ReasonerInput {
        match self {
            ReasonerInput::Hypothesis(p) => ReasonerInput::Hypothesis(p.substitute(substitution)),
            ReasonerInput::Predicate(p) => ReasonerInput::Predicate(p.substitute(substitution)),
            ReasonerInput::Instantiation {
                hypothesis,
                witnesses,
            } => ReasonerInput::Instantiation {
                hypothesis: hypothesis.substitute(substitution),
                witnesses: witnesses.iter().map(|w| w.substitute(substitution)).collect(),
            },
            ReasonerInput::HypAction { action, hypotheses } => ReasonerInput::HypAction {
                action: *action,
                hypotheses: hypotheses
                    .iter()
                    .map(|p| p.substitute(substitution))
                    .collect(),
            },
            ReasonerInput::Empty | ReasonerInput::Confidence(_) | ReasonerInput::Error(_) => {
                self.clone()
            }
        }
    }
}

/// Applies `reasoner` after checking that `input` carries no error and is of the expected kind.
///
/// Failing is deterministic: the same reasoner, sequent and input always fail the same way.
pub fn apply_checked(
    reasoner: &dyn Reasoner,
    sequent: &Sequent,
    input: &ReasonerInput,
) -> Result<Rule, ReasonerFailure> {
    if let Some(message) = input.error() {
        return Err(ReasonerFailure::new(reasoner.id(), message));
    }
    if input.kind() != Some(reasoner.input_kind()) {
        return Err(ReasonerFailure::new(
            reasoner.id(),
            format!("expected {:?} input, got {:?}", reasoner.input_kind(), input),
        ));
    }
    let rule = reasoner.apply(sequent, input)?;
    debug!(
        reasoner = reasoner.id(),
        antecedents = rule.antecedents().len(),
        confidence = rule.confidence(),
        "applied reasoner"
    );
    Ok(rule)
}

/// All reasoners shipped with this crate
pub fn builtins() -> Vec<Box<dyn Reasoner>> {
    vec![
        Box::new(Hyp),
        Box::new(TrueGoal),
        Box::new(FalseHypothesis),
        Box::new(Contradiction),
        Box::new(Conjunction),
        Box::new(ConjunctionElimination),
        Box::new(DisjunctionElimination),
        Box::new(Implication),
        Box::new(ImplicationElimination),
        Box::new(ModusPonens),
        Box::new(UniversalIntroduction),
        Box::new(UniversalElimination),
        Box::new(ExistentialElimination),
        Box::new(Cut),
        Box::new(Review),
        Box::new(ManageHypotheses),
        Box::new(MembershipGoal),
    ]
}

/// Extracts the hypothesis referenced by `input` and checks that it is a visible hypothesis of
/// `sequent`
pub(crate) fn visible_hypothesis<'a>(
    id: &str,
    sequent: &Sequent,
    input: &'a ReasonerInput,
) -> Result<&'a Predicate, ReasonerFailure> {
    let p = match input {
        ReasonerInput::Hypothesis(p) => p,
        ReasonerInput::Instantiation { hypothesis, .. } => hypothesis,
        _ => return Err(ReasonerFailure::new(id, "expected a hypothesis")),
    };
    if sequent.contains_visible_hypothesis(p) {
        Ok(p)
    } else {
        Err(ReasonerFailure::new(
            id,
            format!("`{}` is not a visible hypothesis", p),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::serialization::Formatter;
    use crate::typing::TypeEnvironment;

    pub(crate) fn read(input: &str) -> Predicate {
        Formatter::new().read_predicate(input).unwrap()
    }

    /// A sequent over the untyped atoms and the integer `x`
    pub(crate) fn sequent(hyps: &[&str], goal: &str) -> Sequent {
        let env = TypeEnvironment::from_pairs([
            ("x", crate::expression::Type::Integer),
            ("s", crate::expression::Type::power(crate::expression::Type::Integer)),
        ])
        .unwrap();
        Sequent::new(env, hyps.iter().map(|h| read(h)), read(goal)).unwrap()
    }

    #[test]
    fn error_input_is_reported() {
        let s = sequent(&["P"], "P");
        let e = apply_checked(&Hyp, &s, &ReasonerInput::Error("bad input".to_owned()))
            .unwrap_err();
        assert_eq!(e, ReasonerFailure::new("hyp", "bad input"));
    }

    #[test]
    fn wrong_kind_is_reported() {
        let s = sequent(&["P"], "P");
        let input = ReasonerInput::Predicate(read("P"));
        let first = apply_checked(&Hyp, &s, &input).unwrap_err();
        // failing again gives the same answer
        assert_eq!(apply_checked(&Hyp, &s, &input).unwrap_err(), first);
    }

    #[test]
    fn builtin_ids_are_unique() {
        let mut ids: Vec<_> = builtins().iter().map(|r| r.id()).collect();
        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn substitute_input() {
        let mut sub = crate::expression::WholeSubstitution::new();
        sub.insert("x", Expression::identifier("y"));
        let input = ReasonerInput::Instantiation {
            hypothesis: read("(! a:INT . (a < x))"),
            witnesses: vec![Expression::identifier("x")],
        };
        assert_eq!(
            input.substitute(&sub),
            ReasonerInput::Instantiation {
                hypothesis: read("(! a:INT . (a < y))"),
                witnesses: vec![Expression::identifier("y")],
            }
        );
    }
}
