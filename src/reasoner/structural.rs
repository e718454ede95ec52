use super::{HypAction, InputKind, Reasoner, ReasonerInput};
use crate::{
    error::ReasonerFailure,
    rule::{Antecedent, Rule},
    sequent::Sequent,
    types::{is_reviewed, Confidence, DISCHARGED_MAX, PENDING, REVIEWED_MAX},
    typing::TypeEnvironment,
};

/// Introduces a lemma: proves it, then uses it as a hypothesis
#[derive(Debug, Default, Clone, Copy)]
pub struct Cut;

impl Reasoner for Cut {
    fn id(&self) -> &'static str {
        "cut"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Predicate
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let lemma = match input {
            ReasonerInput::Predicate(p) => p,
            _ => return Err(ReasonerFailure::new(self.id(), "expected a predicate")),
        };
        let empty = TypeEnvironment::new();
        let to_failure = |e: crate::error::SequentError| ReasonerFailure::new(self.id(), e.to_string());
        let proof = sequent.replace_goal(lemma.clone(), &empty).map_err(to_failure)?;
        let usage = sequent.add_hyps(vec![lemma.clone()], &empty).map_err(to_failure)?;
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::new(proof), Antecedent::new(usage)],
            DISCHARGED_MAX,
            format!("ah ({})", lemma),
        ))
    }
}

/// Closes a sequent that was checked by a human, with a confidence below the discharged level
#[derive(Debug, Default, Clone, Copy)]
pub struct Review;

impl Reasoner for Review {
    fn id(&self) -> &'static str {
        "review"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Confidence
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let confidence: Confidence = match input {
            ReasonerInput::Confidence(c) => *c,
            _ => return Err(ReasonerFailure::new(self.id(), "expected a confidence")),
        };
        if !is_reviewed(confidence) {
            return Err(ReasonerFailure::new(
                self.id(),
                format!(
                    "confidence {} is outside of {}..={}",
                    confidence,
                    PENDING + 1,
                    REVIEWED_MAX
                ),
            ));
        }
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            Vec::new(),
            confidence,
            format!("reviewed ({})", confidence),
        ))
    }
}

/// Changes the hidden or selected flag of some hypotheses
#[derive(Debug, Default, Clone, Copy)]
pub struct ManageHypotheses;

impl Reasoner for ManageHypotheses {
    fn id(&self) -> &'static str {
        "mngHyp"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::HypAction
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let (action, hypotheses) = match input {
            ReasonerInput::HypAction { action, hypotheses } => (*action, hypotheses),
            _ => return Err(ReasonerFailure::new(self.id(), "expected a hypothesis action")),
        };
        if hypotheses.is_empty() {
            return Err(ReasonerFailure::new(self.id(), "no hypotheses given"));
        }
        if let Some(p) = hypotheses.iter().find(|p| !sequent.contains_hypothesis(p)) {
            return Err(ReasonerFailure::new(
                self.id(),
                format!("`{}` is not a hypothesis", p),
            ));
        }
        let antecedent = match action {
            HypAction::Hide => sequent.hide_hypotheses(hypotheses),
            HypAction::Show => sequent.show_hypotheses(hypotheses),
            HypAction::Select => sequent.select_hypotheses(hypotheses),
            HypAction::Deselect => sequent.deselect_hypotheses(hypotheses),
        };
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::new(antecedent)],
            DISCHARGED_MAX,
            action.keyword(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::apply_checked;
    use super::super::tests::{read, sequent};
    use super::*;

    #[test]
    fn cut() {
        let s = sequent(&["P"], "R");
        let rule = apply_checked(&Cut, &s, &ReasonerInput::Predicate(read("(x < 0)"))).unwrap();
        assert_eq!(rule.antecedents()[0].sequent().goal(), &read("(x < 0)"));
        assert!(rule.antecedents()[1]
            .sequent()
            .contains_visible_hypothesis(&read("(x < 0)")));

        // `y` is not bound
        let unbound = ReasonerInput::Predicate(read("(y < 0)"));
        assert!(apply_checked(&Cut, &s, &unbound).is_err());
    }

    #[test]
    fn review_bounds() {
        let s = sequent(&[], "P");
        let rule = apply_checked(&Review, &s, &ReasonerInput::Confidence(REVIEWED_MAX)).unwrap();
        assert!(rule.antecedents().is_empty());
        assert_eq!(rule.confidence(), REVIEWED_MAX);
        for c in [PENDING, REVIEWED_MAX + 1, DISCHARGED_MAX, -3] {
            assert!(apply_checked(&Review, &s, &ReasonerInput::Confidence(c)).is_err());
        }
        for c in [PENDING - 1, PENDING, PENDING + 1, REVIEWED_MAX, REVIEWED_MAX + 1] {
            let accepted = apply_checked(&Review, &s, &ReasonerInput::Confidence(c)).is_ok();
            assert_eq!(accepted, is_reviewed(c));
        }
    }

    #[test]
    fn manage_hypotheses() {
        let s = sequent(&["P", "Q"], "R");
        let hide = ReasonerInput::HypAction {
            action: HypAction::Hide,
            hypotheses: vec![read("P")],
        };
        let rule = apply_checked(&ManageHypotheses, &s, &hide).unwrap();
        let t = rule.antecedents()[0].sequent();
        assert_eq!(t.hidden_hypotheses().count(), 1);
        // hidden hypotheses can still be shown
        let show = ReasonerInput::HypAction {
            action: HypAction::Show,
            hypotheses: vec![read("P")],
        };
        let rule = apply_checked(&ManageHypotheses, t, &show).unwrap();
        assert_eq!(rule.antecedents()[0].sequent().hidden_hypotheses().count(), 0);

        let missing = ReasonerInput::HypAction {
            action: HypAction::Select,
            hypotheses: vec![read("S")],
        };
        assert!(apply_checked(&ManageHypotheses, &s, &missing).is_err());
    }
}
