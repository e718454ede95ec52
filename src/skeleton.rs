use crate::types::Confidence;
use serde::{Deserialize, Serialize};

/// The recorded application of a reasoner in a [`ProofSkeleton`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonRule {
    pub reasoner_id: String,
    /// Textual form of the input (see [`Formatter::format_input`](crate::serialization::Formatter::format_input))
    pub input: String,
    pub confidence: Confidence,
    pub display: String,
    /// Identifiers the rule freshly introduced, one list per antecedent
    #[serde(default)]
    pub added_identifiers: Vec<Vec<String>>,
}

/// A proof tree stripped down to what is needed to replay it: reasoner ids, inputs and shape.
///
/// How skeletons are stored is up to the caller. They can be serialized with any `serde` format.
///
/// ```
/// use seqprove::ProofSkeleton;
///
/// let open = ProofSkeleton::open();
/// assert!(open.rule.is_none());
/// assert_eq!(open.rule_count(), 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSkeleton {
    #[serde(default)]
    pub comment: String,
    pub rule: Option<SkeletonRule>,
    #[serde(default)]
    pub children: Vec<ProofSkeleton>,
}

impl ProofSkeleton {
    /// A skeleton of an open node
    pub fn open() -> Self {
        ProofSkeleton::default()
    }

    /// Number of recorded rule applications
    pub fn rule_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(skeleton) = stack.pop() {
            count += usize::from(skeleton.rule.is_some());
            stack.extend(&skeleton.children);
        }
        count
    }

    /// Length of the longest path from this node to a leaf, counting nodes
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((skeleton, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(skeleton.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(reasoner_id: &str, input: &str, children: Vec<ProofSkeleton>) -> ProofSkeleton {
        ProofSkeleton {
            comment: String::new(),
            rule: Some(SkeletonRule {
                reasoner_id: reasoner_id.to_owned(),
                input: input.to_owned(),
                confidence: 1000,
                display: reasoner_id.to_owned(),
                added_identifiers: vec![Vec::new(); children.len()],
            }),
            children,
        }
    }

    #[test]
    fn counts() {
        let s = step(
            "conjI",
            "",
            vec![step("hyp", "", vec![]), ProofSkeleton::open()],
        );
        assert_eq!(s.rule_count(), 2);
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn serde() {
        let s = step("conjE", "(P & Q)", vec![step("hyp", "", vec![])]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<ProofSkeleton>(&json).unwrap(), s);

        // optional fields may be left out
        let minimal: ProofSkeleton = serde_json::from_str(
            r#"{"rule": {"reasoner_id": "hyp", "input": "", "confidence": 1000, "display": "hyp"}}"#,
        )
        .unwrap();
        assert!(minimal.children.is_empty());
        assert_eq!(minimal.rule_count(), 1);
    }
}
