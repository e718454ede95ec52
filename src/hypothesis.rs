use crate::expression::Predicate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A predicate assumed in a [`Sequent`](crate::Sequent), together with its presentation flags.
///
/// A hypothesis can be _selected_ (relevant for the current proof step) and _hidden_ (not shown
/// to the user and not considered by reasoners that search hypotheses). Both flags are stored
/// independently, but a hidden hypothesis always reads as deselected. Showing it again restores
/// its previous selection.
///
/// Equality, ordering and hashing only consider the predicate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hypothesis {
    predicate: Predicate,
    selected: bool,
    hidden: bool,
}

impl Hypothesis {
    /// Creates a visible, deselected hypothesis
    pub fn new(predicate: Predicate) -> Self {
        Hypothesis {
            predicate,
            selected: false,
            hidden: false,
        }
    }

    /// Creates a visible, selected hypothesis
    pub fn selected(predicate: Predicate) -> Self {
        Hypothesis {
            predicate,
            selected: true,
            hidden: false,
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn into_predicate(self) -> Predicate {
        self.predicate
    }

    pub fn is_selected(&self) -> bool {
        self.selected && !self.hidden
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

impl PartialEq for Hypothesis {
    fn eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate
    }
}

impl Eq for Hypothesis {}

impl PartialOrd for Hypothesis {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hypothesis {
    fn cmp(&self, other: &Self) -> Ordering {
        self.predicate.cmp(&other.predicate)
    }
}

impl Hash for Hypothesis {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.predicate.hash(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_reads_deselected() {
        let mut h = Hypothesis::selected(Predicate::atom("P"));
        assert!(h.is_selected());
        h.set_hidden(true);
        assert!(!h.is_selected());
        assert!(!h.is_visible());
        h.set_hidden(false);
        assert!(h.is_selected());
    }

    #[test]
    fn equality_ignores_flags() {
        let mut a = Hypothesis::new(Predicate::atom("P"));
        a.set_hidden(true);
        assert_eq!(a, Hypothesis::selected(Predicate::atom("P")));
        assert_ne!(a, Hypothesis::new(Predicate::atom("Q")));
    }
}
