use super::{InputKind, Reasoner, ReasonerInput};
use crate::{
    error::ReasonerFailure,
    expression::{BinaryOperator, Expression, Predicate, Relation, Type},
    rule::Rule,
    sequent::Sequent,
};

/// Discharges a goal `(e : s)` from the visible hypotheses.
///
/// The goal holds when `(e : s)` is a hypothesis, when `(e = f)` (or `(f = e)`) and `(f : s)`
/// are hypotheses, or, for `s` a union or intersection, when membership in one (respectively
/// both) of the operands holds. Membership of pairs in relation sets is not supported.
#[derive(Debug, Default, Clone, Copy)]
pub struct MembershipGoal;

impl MembershipGoal {
    fn holds(&self, sequent: &Sequent, element: &Expression, set: &Expression) -> bool {
        let member = |e: &Expression| {
            sequent.contains_visible_hypothesis(&Predicate::relation(
                Relation::In,
                e.clone(),
                set.clone(),
            ))
        };
        if member(element) {
            return true;
        }
        let via_equality = sequent.visible_hypotheses().any(|h| match h {
            Predicate::Relation(Relation::Equal, left, right) if left == element => member(right),
            Predicate::Relation(Relation::Equal, left, right) if right == element => member(left),
            _ => false,
        });
        if via_equality {
            return true;
        }
        match set {
            Expression::Binary(BinaryOperator::Union, left, right) => {
                self.holds(sequent, element, left) || self.holds(sequent, element, right)
            }
            Expression::Binary(BinaryOperator::Intersection, left, right) => {
                self.holds(sequent, element, left) && self.holds(sequent, element, right)
            }
            _ => false,
        }
    }
}

impl Reasoner for MembershipGoal {
    fn id(&self) -> &'static str {
        "mbGoal"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Empty
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let (element, set) = match sequent.goal() {
            Predicate::Relation(Relation::In, element, set) => (element, set),
            _ => return Err(ReasonerFailure::new(self.id(), "goal is not a membership")),
        };
        let ty = sequent
            .type_environment()
            .type_of(element, &[])
            .map_err(|e| ReasonerFailure::new(self.id(), e.to_string()))?;
        if matches!(ty, Type::Product(..)) {
            return Err(ReasonerFailure::new(
                self.id(),
                "unsupported: membership in a relation set",
            ));
        }
        if !self.holds(sequent, element, set) {
            return Err(ReasonerFailure::new(
                self.id(),
                format!("cannot derive `{}` from the hypotheses", sequent.goal()),
            ));
        }
        Ok(Rule::discharge(
            self.id(),
            input.clone(),
            sequent.clone(),
            "∈ goal",
        ))
    }
}
