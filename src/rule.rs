use crate::{
    reasoner::ReasonerInput,
    sequent::Sequent,
    types::{Confidence, DISCHARGED_MAX},
};

/// A sequent produced by a [`Rule`], together with the identifiers the rule freshly introduced
/// into its type environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Antecedent {
    sequent: Sequent,
    added_identifiers: Vec<String>,
}

impl Antecedent {
    pub fn new(sequent: Sequent) -> Self {
        Antecedent {
            sequent,
            added_identifiers: Vec::new(),
        }
    }

    pub fn with_identifiers(sequent: Sequent, added_identifiers: Vec<String>) -> Self {
        Antecedent {
            sequent,
            added_identifiers,
        }
    }

    pub fn sequent(&self) -> &Sequent {
        &self.sequent
    }

    pub fn added_identifiers(&self) -> &[String] {
        &self.added_identifiers
    }
}

/// The application of one reasoner to one sequent with one input.
///
/// A rule proves its `sequent` provided all of its antecedents are proved. It can only be replayed
/// from its `(reasoner_id, input)` pair, there is no way to undo it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    reasoner_id: String,
    input: ReasonerInput,
    sequent: Sequent,
    antecedents: Vec<Antecedent>,
    confidence: Confidence,
    display: String,
}

impl Rule {
    pub fn new(
        reasoner_id: impl Into<String>,
        input: ReasonerInput,
        sequent: Sequent,
        antecedents: Vec<Antecedent>,
        confidence: Confidence,
        display: impl Into<String>,
    ) -> Self {
        Rule {
            reasoner_id: reasoner_id.into(),
            input,
            sequent,
            antecedents,
            confidence,
            display: display.into(),
        }
    }

    /// Creates a rule closing `sequent` outright
    pub fn discharge(
        reasoner_id: impl Into<String>,
        input: ReasonerInput,
        sequent: Sequent,
        display: impl Into<String>,
    ) -> Self {
        Rule::new(reasoner_id, input, sequent, Vec::new(), DISCHARGED_MAX, display)
    }

    pub fn reasoner_id(&self) -> &str {
        &self.reasoner_id
    }

    pub fn input(&self) -> &ReasonerInput {
        &self.input
    }

    /// The sequent this rule was computed against
    pub fn sequent(&self) -> &Sequent {
        &self.sequent
    }

    pub fn antecedents(&self) -> &[Antecedent] {
        &self.antecedents
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Human readable justification
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Creates a new `Rule` by proving the antecedent with index `index` of this rule using
    /// `other`. The antecedents of `other` take its place, in order, and the confidence is the
    /// minimum of both.
    ///
    /// The result still carries the reasoner id and input of `self`, see
    /// [`relabel`](#method.relabel).
    ///
    /// # Panics
    /// If `index >= self.antecedents().len()` or `other` was not computed against the sequent of
    /// that antecedent. Both indicate a bug in the caller.
    pub fn combine(&self, other: &Rule, index: usize) -> Self {
        assert!(
            index < self.antecedents.len(),
            "cannot combine `{}` into antecedent {} of `{}` with {} antecedents",
            other.reasoner_id,
            index,
            self.reasoner_id,
            self.antecedents.len()
        );
        assert!(
            other.sequent == self.antecedents[index].sequent,
            "`{}` was not computed against antecedent {} of `{}`",
            other.reasoner_id,
            index,
            self.reasoner_id
        );
        let mut antecedents = Vec::with_capacity(self.antecedents.len() + other.antecedents.len());
        antecedents.extend_from_slice(&self.antecedents[..index]);
        antecedents.extend_from_slice(&other.antecedents);
        antecedents.extend_from_slice(&self.antecedents[index + 1..]);
        Rule {
            reasoner_id: self.reasoner_id.clone(),
            input: self.input.clone(),
            sequent: self.sequent.clone(),
            antecedents,
            confidence: self.confidence.min(other.confidence),
            display: format!("{}; {}", self.display, other.display),
        }
    }

    /// Attributes this rule to another reasoner, as done for derived rules built with
    /// [`combine`](#method.combine)
    pub fn relabel(self, reasoner_id: impl Into<String>, display: impl Into<String>) -> Self {
        Rule {
            reasoner_id: reasoner_id.into(),
            display: display.into(),
            ..self
        }
    }
}
