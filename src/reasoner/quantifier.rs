use super::{visible_hypothesis, InputKind, Reasoner, ReasonerInput};
use crate::{
    error::ReasonerFailure,
    expression::{BoundDecl, Expression, Predicate, Quantifier},
    rule::{Antecedent, Rule},
    sequent::Sequent,
    types::DISCHARGED_MAX,
    typing::TypeEnvironment,
};

/// Picks an unused name for every declaration. Returns the names together with an environment
/// typing exactly them.
fn fresh_identifiers(
    id: &str,
    env: &TypeEnvironment,
    decls: &[BoundDecl],
) -> Result<(Vec<String>, TypeEnvironment), ReasonerFailure> {
    let mut all = env.clone();
    let mut extra = TypeEnvironment::new();
    let mut names = Vec::with_capacity(decls.len());
    for decl in decls {
        let name = all.fresh_name(&decl.name);
        all.insert(name.clone(), decl.ty.clone())
            .and_then(|_| extra.insert(name.clone(), decl.ty.clone()))
            .map_err(|e| ReasonerFailure::new(id, e.to_string()))?;
        names.push(name);
    }
    Ok((names, extra))
}

/// Instantiates `quantified` with fresh identifiers
fn skolemize(
    id: &str,
    sequent: &Sequent,
    quantified: &Predicate,
) -> Result<(Predicate, Vec<String>, TypeEnvironment), ReasonerFailure> {
    let decls = match quantified {
        Predicate::Quantified(_, decls, _) => decls,
        _ => return Err(ReasonerFailure::new(id, "expected a quantified predicate")),
    };
    let (names, extra) = fresh_identifiers(id, sequent.type_environment(), decls)?;
    let witnesses: Vec<_> = names.iter().map(Expression::identifier).collect();
    let body = quantified
        .instantiate(&witnesses)
        .ok_or_else(|| ReasonerFailure::new(id, "cannot instantiate"))?;
    Ok((body, names, extra))
}

/// Proves a goal `(! x:T . P)` by proving `P` for a fresh `x`
#[derive(Debug, Default, Clone, Copy)]
pub struct UniversalIntroduction;

impl Reasoner for UniversalIntroduction {
    fn id(&self) -> &'static str {
        "allI"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Empty
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        if !matches!(sequent.goal(), Predicate::Quantified(Quantifier::Forall, ..)) {
            return Err(ReasonerFailure::new(self.id(), "goal is not universally quantified"));
        }
        let (body, names, extra) = skolemize(self.id(), sequent, sequent.goal())?;
        let antecedent = sequent
            .replace_goal(body, &extra)
            .map_err(|e| ReasonerFailure::new(self.id(), e.to_string()))?;
        let display = format!("∀ goal (frees {})", names.join(", "));
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::with_identifiers(antecedent, names)],
            DISCHARGED_MAX,
            display,
        ))
    }
}

/// Adds an instance of a universally quantified hypothesis
#[derive(Debug, Default, Clone, Copy)]
pub struct UniversalElimination;

impl Reasoner for UniversalElimination {
    fn id(&self) -> &'static str {
        "allE"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Instantiation
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let hyp = visible_hypothesis(self.id(), sequent, input)?;
        let witnesses = match input {
            ReasonerInput::Instantiation { witnesses, .. } => witnesses,
            _ => return Err(ReasonerFailure::new(self.id(), "expected an instantiation")),
        };
        let decls = match hyp {
            Predicate::Quantified(Quantifier::Forall, decls, _) => decls,
            _ => {
                return Err(ReasonerFailure::new(
                    self.id(),
                    format!("`{}` is not universally quantified", hyp),
                ))
            }
        };
        if decls.len() != witnesses.len() {
            return Err(ReasonerFailure::new(
                self.id(),
                format!(
                    "`{}` binds {} variables, {} witnesses given",
                    hyp,
                    decls.len(),
                    witnesses.len()
                ),
            ));
        }
        let env = sequent.type_environment();
        for (decl, witness) in decls.iter().zip(witnesses) {
            if witness.has_loose_bound(0) {
                return Err(ReasonerFailure::new(
                    self.id(),
                    format!("witness `{}` is not closed", witness),
                ));
            }
            let ty = env
                .type_of(witness, &[])
                .map_err(|e| ReasonerFailure::new(self.id(), e.to_string()))?;
            if ty != decl.ty {
                return Err(ReasonerFailure::new(
                    self.id(),
                    format!(
                        "witness `{}` for `{}` has type {}, expected {}",
                        witness, decl.name, ty, decl.ty
                    ),
                ));
            }
        }
        let instance = hyp
            .instantiate(witnesses)
            .ok_or_else(|| ReasonerFailure::new(self.id(), "cannot instantiate"))?;
        let display = format!("∀ hyp ({})", instance);
        let antecedent = sequent
            .add_hyps(vec![instance], &TypeEnvironment::new())
            .map_err(|e| ReasonerFailure::new(self.id(), e.to_string()))?;
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::new(antecedent)],
            DISCHARGED_MAX,
            display,
        ))
    }
}

/// Replaces a hypothesis `(# x:T . P)` by `P` for a fresh `x`. The existential is hidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExistentialElimination;

impl Reasoner for ExistentialElimination {
    fn id(&self) -> &'static str {
        "exE"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Hypothesis
    }

    fn apply(&self, sequent: &Sequent, input: &ReasonerInput) -> Result<Rule, ReasonerFailure> {
        let hyp = visible_hypothesis(self.id(), sequent, input)?;
        if !matches!(hyp, Predicate::Quantified(Quantifier::Exists, ..)) {
            return Err(ReasonerFailure::new(
                self.id(),
                format!("`{}` is not existentially quantified", hyp),
            ));
        }
        let (body, names, extra) = skolemize(self.id(), sequent, hyp)?;
        let antecedent = sequent
            .add_hyps(vec![body], &extra)
            .map_err(|e| ReasonerFailure::new(self.id(), e.to_string()))?
            .hide_hypotheses(&[hyp.clone()]);
        let display = format!("∃ hyp (frees {})", names.join(", "));
        Ok(Rule::new(
            self.id(),
            input.clone(),
            sequent.clone(),
            vec![Antecedent::with_identifiers(antecedent, names)],
            DISCHARGED_MAX,
            display,
        ))
    }
}
