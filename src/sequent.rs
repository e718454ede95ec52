use crate::{
    error::SequentError, expression::Predicate, hypothesis::Hypothesis,
    serialization::Formatter, typing::TypeEnvironment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The minimal `{type environment, used hypotheses, goal}` of a stored proof, from which the root
/// sequent is rebuilt before replaying a skeleton
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofDependencies {
    pub type_environment: TypeEnvironment,
    pub hypotheses: Vec<Predicate>,
    pub goal: Predicate,
}

/// A proof obligation: hypotheses and a goal under a type environment.
///
/// A sequent is immutable. Every transformation returns a new sequent and leaves `self` usable.
///
/// Hypotheses are kept in their standard representation (sorted and unique by predicate), so two
/// sequents are equal exactly when their type environments, hypothesis predicates and goals are
/// equal. Selection and hidden flags are presentation state and do not take part in equality.
///
/// When using this struct it is guaranteed that every free identifier of every hypothesis and of
/// the goal is bound in the type environment and that all of them are well typed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sequent {
    type_environment: TypeEnvironment,
    hypotheses: Vec<Hypothesis>,
    goal: Predicate,
}

impl Sequent {
    /// Create a new `Sequent`. All hypotheses are visible and selected.
    ///
    /// # Errors
    /// * `UnboundIdentifier` - if a hypothesis or the goal uses an identifier missing from
    /// `type_environment`
    /// * `TypeMismatch` - if a hypothesis or the goal is ill typed
    ///
    /// # Example
    /// ```
    /// use seqprove::expression::{Predicate, Type};
    /// use seqprove::serialization::Formatter;
    /// use seqprove::typing::TypeEnvironment;
    /// use seqprove::Sequent;
    ///
    /// let fmt = Formatter::new();
    /// let env = TypeEnvironment::from_pairs([("x", Type::Integer)]).unwrap();
    /// let s = Sequent::new(
    ///     env.clone(),
    ///     vec![fmt.read_predicate("(0 < x)").unwrap(), Predicate::atom("P")],
    ///     fmt.read_predicate("(0 <= x)").unwrap(),
    /// )
    /// .unwrap();
    /// assert_eq!(s.hypotheses().len(), 2);
    /// assert_eq!(s.to_string(), "(0 < x), P |- (0 <= x)");
    ///
    /// assert!(Sequent::new(env, vec![], fmt.read_predicate("(y = 1)").unwrap()).is_err());
    /// ```
    pub fn new<I>(
        type_environment: TypeEnvironment,
        hypotheses: I,
        goal: Predicate,
    ) -> Result<Self, SequentError>
    where
        I: IntoIterator<Item = Predicate>,
    {
        type_environment.check_predicate(&goal)?;
        let mut hyps = Vec::new();
        for p in hypotheses {
            type_environment.check_predicate(&p)?;
            hyps.push(Hypothesis::selected(p));
        }
        let mut sequent = Sequent {
            type_environment,
            hypotheses: hyps,
            goal,
        };
        sequent.standardize();
        Ok(sequent)
    }

    /// Rebuilds the root sequent of a stored proof
    pub fn from_dependencies(dependencies: &ProofDependencies) -> Result<Self, SequentError> {
        Sequent::new(
            dependencies.type_environment.clone(),
            dependencies.hypotheses.iter().cloned(),
            dependencies.goal.clone(),
        )
    }

    /// Sorts the hypotheses and removes duplicates, keeping the flags of the first occurence
    fn standardize(&mut self) {
        self.hypotheses.sort();
        self.hypotheses.dedup();
    }

    pub fn type_environment(&self) -> &TypeEnvironment {
        &self.type_environment
    }

    pub fn goal(&self) -> &Predicate {
        &self.goal
    }

    /// Returns all hypotheses, hidden or not, in their standard order
    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    pub fn hypothesis(&self, predicate: &Predicate) -> Option<&Hypothesis> {
        self.position(predicate).ok().map(|i| &self.hypotheses[i])
    }

    pub fn contains_hypothesis(&self, predicate: &Predicate) -> bool {
        self.position(predicate).is_ok()
    }

    /// Tests whether `predicate` is a hypothesis that is not hidden
    pub fn contains_visible_hypothesis(&self, predicate: &Predicate) -> bool {
        self.hypothesis(predicate)
            .map(Hypothesis::is_visible)
            .unwrap_or(false)
    }

    pub fn selected_hypotheses(&self) -> impl Iterator<Item = &Predicate> {
        self.hypotheses
            .iter()
            .filter(|h| h.is_selected())
            .map(Hypothesis::predicate)
    }

    pub fn visible_hypotheses(&self) -> impl Iterator<Item = &Predicate> {
        self.hypotheses
            .iter()
            .filter(|h| h.is_visible())
            .map(Hypothesis::predicate)
    }

    pub fn hidden_hypotheses(&self) -> impl Iterator<Item = &Predicate> {
        self.hypotheses
            .iter()
            .filter(|h| h.is_hidden())
            .map(Hypothesis::predicate)
    }

    fn position(&self, predicate: &Predicate) -> Result<usize, usize> {
        self.hypotheses
            .binary_search_by(|h| h.predicate().cmp(predicate))
    }

    /// Returns a new sequent with `hypotheses` added and `extra` merged into the type
    /// environment. Added hypotheses are visible and selected, including those that were already
    /// present (possibly hidden). Duplicates collapse.
    ///
    /// # Errors
    /// * `TypeConflict` - if `extra` redefines an identifier with a different type
    /// * `UnboundIdentifier`, `TypeMismatch` - if an added hypothesis does not type check under
    /// the merged environment
    pub fn add_hyps<I>(&self, hypotheses: I, extra: &TypeEnvironment) -> Result<Self, SequentError>
    where
        I: IntoIterator<Item = Predicate>,
    {
        let type_environment = self.type_environment.merge(extra)?;
        let mut hyps = self.hypotheses.clone();
        for p in hypotheses {
            type_environment.check_predicate(&p)?;
            match hyps.binary_search_by(|h| h.predicate().cmp(&p)) {
                Ok(i) => {
                    hyps[i].set_hidden(false);
                    hyps[i].set_selected(true);
                }
                Err(i) => hyps.insert(i, Hypothesis::selected(p)),
            }
        }
        Ok(Sequent {
            type_environment,
            hypotheses: hyps,
            goal: self.goal.clone(),
        })
    }

    /// Returns a new sequent with `goal` as its goal and `extra` merged into the type
    /// environment.
    ///
    /// # Errors
    /// The same as [`add_hyps`](#method.add_hyps)
    pub fn replace_goal(&self, goal: Predicate, extra: &TypeEnvironment) -> Result<Self, SequentError> {
        let type_environment = self.type_environment.merge(extra)?;
        type_environment.check_predicate(&goal)?;
        Ok(Sequent {
            type_environment,
            hypotheses: self.hypotheses.clone(),
            goal,
        })
    }

    fn with_flag<F>(&self, predicates: &[Predicate], f: F) -> Self
    where
        F: Fn(&mut Hypothesis),
    {
        let mut hypotheses = self.hypotheses.clone();
        for p in predicates {
            if let Ok(i) = hypotheses.binary_search_by(|h| h.predicate().cmp(p)) {
                f(&mut hypotheses[i]);
            }
        }
        Sequent {
            type_environment: self.type_environment.clone(),
            hypotheses,
            goal: self.goal.clone(),
        }
    }

    /// Hides the given hypotheses. Predicates that are no hypotheses are ignored.
    pub fn hide_hypotheses(&self, predicates: &[Predicate]) -> Self {
        self.with_flag(predicates, |h| h.set_hidden(true))
    }

    pub fn show_hypotheses(&self, predicates: &[Predicate]) -> Self {
        self.with_flag(predicates, |h| h.set_hidden(false))
    }

    /// Selects the given hypotheses. Hidden hypotheses keep reading as deselected until they are
    /// shown.
    pub fn select_hypotheses(&self, predicates: &[Predicate]) -> Self {
        self.with_flag(predicates, |h| h.set_selected(true))
    }

    pub fn deselect_hypotheses(&self, predicates: &[Predicate]) -> Self {
        self.with_flag(predicates, |h| h.set_selected(false))
    }
}

impl PartialEq for Sequent {
    fn eq(&self, other: &Self) -> bool {
        self.goal == other.goal
            && self.hypotheses == other.hypotheses
            && self.type_environment == other.type_environment
    }
}

impl Eq for Sequent {}

impl Hash for Sequent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_environment.hash(state);
        self.hypotheses.hash(state);
        self.goal.hash(state);
    }
}

impl fmt::Display for Sequent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt = Formatter::new();
        let mut s = String::new();
        for (i, p) in self.visible_hypotheses().enumerate() {
            if i > 0 {
                s.push_str(", ");
            }
            fmt.format_predicate(&mut s, p, &mut Vec::new());
        }
        if !s.is_empty() {
            s.push(' ');
        }
        s.push_str("|- ");
        fmt.format_predicate(&mut s, &self.goal, &mut Vec::new());
        f.write_str(&s)
    }
}
