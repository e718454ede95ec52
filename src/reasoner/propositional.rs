use super::{visible_hypothesis, InputKind, Reasoner, ReasonerInput};
use crate::{
    error::{ReasonerFailure, SequentError},
    expression::{Connective, Predicate},
    rule::{Antecedent, Rule},
    sequent::Sequent,
    types::DISCHARGED_MAX,
    typing::TypeEnvironment,
};

fn failure(id: &str) -> impl Fn(SequentError) -> ReasonerFailure + '_ {
    move |e| ReasonerFailure::new(id, e.to_string())
}

/// Discharges a goal that is one of the visible hypotheses
#[derive(Debug, Default, Clone, Copy)]
pub struct Hyp;

impl Reasoner for Hyp {
    fn id(&self) -> &'static str {
        "hyp"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Empty
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        if !sequent.contains_visible_hypothesis(sequent.goal()) {
            return Err(ReasonerFailure::new(self.id(), "goal is not a hypothesis"));
        }
        Ok(Rule::discharge(self.id(), input.clone(), sequent.clone(), "hyp"))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TrueGoal;

impl Reasoner for TrueGoal {
    fn id(&self) -> &'static str {
        "trueGoal"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Empty
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        if sequent.goal() != &Predicate::True {
            return Err(ReasonerFailure::new(self.id(), "goal is not `true`"));
        }
        Ok(Rule::discharge(self.id(), input.clone(), sequent.clone(), "⊤ goal"))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FalseHypothesis;

impl Reasoner for FalseHypothesis {
    fn id(&self) -> &'static str {
        "falseHyp"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Empty
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        if !sequent.contains_visible_hypothesis(&Predicate::False) {
            return Err(ReasonerFailure::new(self.id(), "`false` is not a hypothesis"));
        }
        Ok(Rule::discharge(self.id(), input.clone(), sequent.clone(), "⊥ hyp"))
    }
}

/// Discharges any goal given a hypothesis `P` such that `~P` is a hypothesis as well (or `P` is
/// `~Q` and `Q` is a hypothesis)
#[derive(Debug, Default, Clone, Copy)]
pub struct Contradiction;

impl Reasoner for Contradiction {
    fn id(&self) -> &'static str {
        "contradiction"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Hypothesis
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let p = visible_hypothesis(self.id(), sequent, input)?;
        let negated = Predicate::not(p.clone());
        let contradicted = sequent.contains_visible_hypothesis(&negated)
            || matches!(p, Predicate::Not(q) if sequent.contains_visible_hypothesis(q));
        if !contradicted {
            return Err(ReasonerFailure::new(
                self.id(),
                format!("the negation of `{}` is not a hypothesis", p),
            ));
        }
        Ok(Rule::discharge(
            self.id(),
            input.clone(),
            sequent.clone(),
            format!("contradiction {}", p),
        ))
    }
}

/// Splits a conjunctive goal `(P & Q)` into the goals `P` and `Q`
#[derive(Debug, Default, Clone, Copy)]
pub struct Conjunction;

impl Reasoner for Conjunction {
    fn id(&self) -> &'static str {
        "conjI"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Empty
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let (p, q) = sequent
            .goal()
            .split(Connective::And)
            .ok_or_else(|| ReasonerFailure::new(self.id(), "goal is not a conjunction"))?;
        let empty = TypeEnvironment::new();
        let left = sequent
            .replace_goal(p.clone(), &empty)
            .map_err(failure(self.id()))?;
        let right = sequent
            .replace_goal(q.clone(), &empty)
            .map_err(failure(self.id()))?;
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::new(left), Antecedent::new(right)],
            DISCHARGED_MAX,
            "∧ goal",
        ))
    }
}

/// Replaces a hypothesis `(P & Q)` by `P` and `Q`. The conjunction is hidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConjunctionElimination;

impl Reasoner for ConjunctionElimination {
    fn id(&self) -> &'static str {
        "conjE"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Hypothesis
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let hyp = visible_hypothesis(self.id(), sequent, input)?;
        let (p, q) = hyp.split(Connective::And).ok_or_else(|| {
            ReasonerFailure::new(self.id(), format!("`{}` is not a conjunction", hyp))
        })?;
        let antecedent = sequent
            .add_hyps(vec![p.clone(), q.clone()], &TypeEnvironment::new())
            .map_err(failure(self.id()))?
            .hide_hypotheses(&[hyp.clone()]);
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::new(antecedent)],
            DISCHARGED_MAX,
            format!("∧ hyp ({})", hyp),
        ))
    }
}

/// Case distinction on a hypothesis `(P | Q)`
#[derive(Debug, Default, Clone, Copy)]
pub struct DisjunctionElimination;

impl Reasoner for DisjunctionElimination {
    fn id(&self) -> &'static str {
        "disjE"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Hypothesis
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let hyp = visible_hypothesis(self.id(), sequent, input)?;
        let (p, q) = hyp.split(Connective::Or).ok_or_else(|| {
            ReasonerFailure::new(self.id(), format!("`{}` is not a disjunction", hyp))
        })?;
        let empty = TypeEnvironment::new();
        let antecedents = [p, q]
            .iter()
            .map(|case| {
                sequent
                    .add_hyps(vec![(*case).clone()], &empty)
                    .map(|s| Antecedent::new(s.hide_hypotheses(&[hyp.clone()])))
                    .map_err(failure(self.id()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            antecedents,
            DISCHARGED_MAX,
            format!("∨ hyp ({})", hyp),
        ))
    }
}

/// Proves a goal `(P => Q)` by assuming `P`
#[derive(Debug, Default, Clone, Copy)]
pub struct Implication;

impl Reasoner for Implication {
    fn id(&self) -> &'static str {
        "impI"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Empty
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let (p, q) = sequent
            .goal()
            .split(Connective::Implies)
            .ok_or_else(|| ReasonerFailure::new(self.id(), "goal is not an implication"))?;
        let empty = TypeEnvironment::new();
        let antecedent = sequent
            .add_hyps(vec![p.clone()], &empty)
            .and_then(|s| s.replace_goal(q.clone(), &empty))
            .map_err(failure(self.id()))?;
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::new(antecedent)],
            DISCHARGED_MAX,
            "⇒ goal",
        ))
    }
}

/// Uses a hypothesis `(P => Q)`: proves `P`, then continues with `Q` as an additional hypothesis
#[derive(Debug, Default, Clone, Copy)]
pub struct ImplicationElimination;

impl Reasoner for ImplicationElimination {
    fn id(&self) -> &'static str {
        "impE"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Hypothesis
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let hyp = visible_hypothesis(self.id(), sequent, input)?;
        let (p, q) = hyp.split(Connective::Implies).ok_or_else(|| {
            ReasonerFailure::new(self.id(), format!("`{}` is not an implication", hyp))
        })?;
        let empty = TypeEnvironment::new();
        let premise = sequent
            .replace_goal(p.clone(), &empty)
            .map_err(failure(self.id()))?;
        let conclusion = sequent
            .add_hyps(vec![q.clone()], &empty)
            .map_err(failure(self.id()))?;
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::new(premise), Antecedent::new(conclusion)],
            DISCHARGED_MAX,
            format!("⇒ hyp ({})", hyp),
        ))
    }
}

/// Modus ponens: `impE` whose premise is closed by `hyp`
#[derive(Debug, Default, Clone, Copy)]
pub struct ModusPonens;

impl Reasoner for ModusPonens {
    fn id(&self) -> &'static str {
        "mp"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Hypothesis
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let elimination = ImplicationElimination
            .apply(sequent, input)
            .map_err(|e| ReasonerFailure::new(self.id(), e.message))?;
        let premise = elimination.antecedents()[0].sequent();
        let closed = Hyp
            .apply(premise, &ReasonerInput::Empty)
            .map_err(|_| {
                ReasonerFailure::new(
                    self.id(),
                    format!("premise `{}` is not a hypothesis", premise.goal()),
                )
            })?;
        let display = elimination.display().replacen("⇒ hyp", "mp", 1);
        Ok(elimination.combine(&closed, 0).relabel(self.id(), display))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{read, sequent};
    use super::super::apply_checked;
    use super::*;

    fn goals(rule: &Rule) -> Vec<Predicate> {
        rule.antecedents()
            .iter()
            .map(|a| a.sequent().goal().clone())
            .collect()
    }

    #[test]
    fn hyp() {
        let s = sequent(&["P", "(x < 1)"], "(x < 1)");
        let rule = apply_checked(&Hyp, &s, &ReasonerInput::Empty).unwrap();
        assert!(rule.antecedents().is_empty());
        assert_eq!(rule.confidence(), DISCHARGED_MAX);

        let hidden = s.hide_hypotheses(&[read("(x < 1)")]);
        assert!(apply_checked(&Hyp, &hidden, &ReasonerInput::Empty).is_err());
        assert!(apply_checked(&Hyp, &sequent(&["P"], "Q"), &ReasonerInput::Empty).is_err());
    }

    #[test]
    fn true_goal_and_false_hyp() {
        assert!(apply_checked(&TrueGoal, &sequent(&[], "true"), &ReasonerInput::Empty).is_ok());
        assert!(apply_checked(&TrueGoal, &sequent(&[], "P"), &ReasonerInput::Empty).is_err());
        let s = sequent(&["false"], "P");
        assert!(apply_checked(&FalseHypothesis, &s, &ReasonerInput::Empty).is_ok());
        let s = sequent(&["P"], "false");
        assert!(apply_checked(&FalseHypothesis, &s, &ReasonerInput::Empty).is_err());
    }

    #[test]
    fn discharge_by_contradiction() {
        let s = sequent(&["P", "~P"], "false");
        for p in ["P", "~P"] {
            let rule =
                apply_checked(&Contradiction, &s, &ReasonerInput::Hypothesis(read(p))).unwrap();
            assert!(rule.antecedents().is_empty());
            assert_eq!(rule.confidence(), DISCHARGED_MAX);
        }
        let s = sequent(&["P", "~Q"], "false");
        assert!(apply_checked(&Contradiction, &s, &ReasonerInput::Hypothesis(read("P"))).is_err());
        assert!(apply_checked(&Contradiction, &s, &ReasonerInput::Hypothesis(read("R"))).is_err());
    }

    #[test]
    fn conjunction_split() {
        let s = sequent(&["R"], "(P & Q)");
        let rule = apply_checked(&Conjunction, &s, &ReasonerInput::Empty).unwrap();
        assert_eq!(goals(&rule), vec![read("P"), read("Q")]);
        for a in rule.antecedents() {
            assert_eq!(a.sequent().hypotheses(), s.hypotheses());
            assert_eq!(a.sequent().type_environment(), s.type_environment());
        }
        assert!(apply_checked(&Conjunction, &sequent(&[], "(P | Q)"), &ReasonerInput::Empty).is_err());
    }

    #[test]
    fn conjunction_elimination_hides() {
        let s = sequent(&["(P & Q)"], "P");
        let input = ReasonerInput::Hypothesis(read("(P & Q)"));
        let rule = apply_checked(&ConjunctionElimination, &s, &input).unwrap();
        let t = rule.antecedents()[0].sequent();
        assert!(t.contains_visible_hypothesis(&read("P")));
        assert!(t.contains_visible_hypothesis(&read("Q")));
        assert_eq!(t.hidden_hypotheses().collect::<Vec<_>>(), vec![&read("(P & Q)")]);
        // the conjunction is hidden now
        assert!(apply_checked(&ConjunctionElimination, t, &input).is_err());
    }

    #[test]
    fn disjunction_elimination() {
        let s = sequent(&["(P | Q)"], "R");
        let input = ReasonerInput::Hypothesis(read("(P | Q)"));
        let rule = apply_checked(&DisjunctionElimination, &s, &input).unwrap();
        assert_eq!(goals(&rule), vec![read("R"), read("R")]);
        assert!(rule.antecedents()[0].sequent().contains_visible_hypothesis(&read("P")));
        assert!(rule.antecedents()[1].sequent().contains_visible_hypothesis(&read("Q")));
    }

    #[test]
    fn implication() {
        let s = sequent(&[], "(P => (x < 1))");
        let rule = apply_checked(&Implication, &s, &ReasonerInput::Empty).unwrap();
        let t = rule.antecedents()[0].sequent();
        assert_eq!(t.goal(), &read("(x < 1)"));
        assert!(t.contains_visible_hypothesis(&read("P")));
    }

    #[test]
    fn implication_elimination_and_modus_ponens() {
        let s = sequent(&["(P => Q)"], "R");
        let input = ReasonerInput::Hypothesis(read("(P => Q)"));
        let rule = apply_checked(&ImplicationElimination, &s, &input).unwrap();
        assert_eq!(goals(&rule), vec![read("P"), read("R")]);

        // the premise is missing
        assert!(apply_checked(&ModusPonens, &s, &input).is_err());

        let s = sequent(&["(P => Q)", "P"], "R");
        let rule = apply_checked(&ModusPonens, &s, &input).unwrap();
        assert_eq!(rule.reasoner_id(), "mp");
        assert_eq!(goals(&rule), vec![read("R")]);
        assert!(rule.antecedents()[0].sequent().contains_visible_hypothesis(&read("Q")));
        assert_eq!(rule.confidence(), DISCHARGED_MAX);
    }
}
