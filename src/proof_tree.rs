use crate::{
    error::ProofTreeError,
    rule::Rule,
    sequent::Sequent,
    serialization::Formatter,
    skeleton::{ProofSkeleton, SkeletonRule},
    types::{is_discharged, Confidence, PENDING},
};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Handle of a node in a [`ProofTree`].
///
/// Ids are never reused: once a node is pruned away its id stays invalid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of a [`ProofTree`]: a sequent, and if the node is not open the rule applied to it and
/// one child per antecedent of that rule
#[derive(Clone, Debug)]
pub struct ProofTreeNode {
    sequent: Sequent,
    rule: Option<Rule>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    confidence: Confidence,
    comment: String,
}

impl ProofTreeNode {
    fn open(sequent: Sequent, parent: Option<NodeId>) -> Self {
        ProofTreeNode {
            sequent,
            rule: None,
            children: Vec::new(),
            parent,
            confidence: PENDING,
            comment: String::new(),
        }
    }

    pub fn sequent(&self) -> &Sequent {
        &self.sequent
    }

    pub fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Minimum of the confidence of the rule and of all children, [`PENDING`] for open nodes
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn is_open(&self) -> bool {
        self.rule.is_none()
    }

    pub fn is_discharged(&self) -> bool {
        is_discharged(self.confidence)
    }
}

/// A proof in progress.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. The nodes reachable from the root
/// always form a tree, and every node in the arena is reachable from the root.
///
/// # Example
/// ```
/// use seqprove::reasoner::{apply_checked, Conjunction, Hyp, ReasonerInput};
/// use seqprove::serialization::Formatter;
/// use seqprove::typing::TypeEnvironment;
/// use seqprove::{ProofTree, Sequent};
///
/// let fmt = Formatter::new();
/// let sequent = Sequent::new(
///     TypeEnvironment::new(),
///     vec![fmt.read_predicate("P").unwrap()],
///     fmt.read_predicate("(P & P)").unwrap(),
/// )
/// .unwrap();
/// let mut tree = ProofTree::new(sequent);
/// let root = tree.root();
///
/// let rule = apply_checked(&Conjunction, tree.sequent(root).unwrap(), &ReasonerInput::Empty).unwrap();
/// let children = tree.apply_rule(root, rule).unwrap();
/// assert_eq!(tree.open_leaves(), children);
///
/// for child in children {
///     let rule = apply_checked(&Hyp, tree.sequent(child).unwrap(), &ReasonerInput::Empty).unwrap();
///     tree.apply_rule(child, rule).unwrap();
/// }
/// assert!(tree.is_closed());
/// ```
#[derive(Clone, Debug)]
pub struct ProofTree {
    nodes: Vec<Option<ProofTreeNode>>,
    root: NodeId,
    formatter: Formatter,
}

impl ProofTree {
    /// Creates a tree with a single open node
    pub fn new(sequent: Sequent) -> Self {
        ProofTree::with_formatter(sequent, Formatter::new())
    }

    /// Creates a tree using `formatter` to write rule inputs into skeletons
    pub fn with_formatter(sequent: Sequent, formatter: Formatter) -> Self {
        ProofTree {
            nodes: vec![Some(ProofTreeNode::open(sequent, None))],
            root: NodeId(0),
            formatter,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&ProofTreeNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ProofTreeNode, ProofTreeError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ProofTreeError::UnknownNode(id))
    }

    fn get(&self, id: NodeId) -> Result<&ProofTreeNode, ProofTreeError> {
        self.node(id).ok_or(ProofTreeError::UnknownNode(id))
    }

    pub fn sequent(&self, id: NodeId) -> Option<&Sequent> {
        self.node(id).map(ProofTreeNode::sequent)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(ProofTreeNode::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(ProofTreeNode::children).unwrap_or(&[])
    }

    pub fn confidence(&self, id: NodeId) -> Option<Confidence> {
        self.node(id).map(ProofTreeNode::confidence)
    }

    pub fn is_open(&self, id: NodeId) -> bool {
        self.node(id).map(ProofTreeNode::is_open).unwrap_or(false)
    }

    /// Tests whether the root is discharged, that is every rule of the tree is discharged and no
    /// node is open
    pub fn is_closed(&self) -> bool {
        self.node(self.root)
            .map(ProofTreeNode::is_discharged)
            .unwrap_or(false)
    }

    pub fn set_comment(&mut self, id: NodeId, comment: impl Into<String>) -> Result<(), ProofTreeError> {
        self.node_mut(id)?.comment = comment.into();
        Ok(())
    }

    /// Applies `rule` to the open node `id`. Returns the new (open) children, one per antecedent
    /// of `rule`, in order.
    ///
    /// # Errors
    /// * `UnknownNode` - if `id` is not in this tree
    /// * `NotOpen` - if a rule was applied to `id` already
    /// * `SequentMismatch` - if `rule` was computed against another sequent
    pub fn apply_rule(&mut self, id: NodeId, rule: Rule) -> Result<Vec<NodeId>, ProofTreeError> {
        let node = self.get(id)?;
        if !node.is_open() {
            return Err(ProofTreeError::NotOpen(id));
        }
        if rule.sequent() != node.sequent() {
            return Err(ProofTreeError::SequentMismatch {
                node: id,
                reasoner: rule.reasoner_id().to_owned(),
            });
        }
        let children: Vec<NodeId> = rule
            .antecedents()
            .iter()
            .map(|a| {
                self.nodes
                    .push(Some(ProofTreeNode::open(a.sequent().clone(), Some(id))));
                NodeId(self.nodes.len() - 1)
            })
            .collect();
        debug!(
            node = %id,
            reasoner = rule.reasoner_id(),
            children = children.len(),
            "applied rule"
        );
        let node = self.node_mut(id)?;
        node.rule = Some(rule);
        node.children = children.clone();
        self.update_confidence(id);
        Ok(children)
    }

    /// Removes the rule of `id` and all nodes below it, leaving `id` open. Returns the removed
    /// part as a skeleton, which can be replayed later.
    ///
    /// # Errors
    /// * `UnknownNode` - if `id` is not in this tree
    /// * `NotApplied` - if `id` is open
    pub fn prune(&mut self, id: NodeId) -> Result<ProofSkeleton, ProofTreeError> {
        if self.get(id)?.is_open() {
            return Err(ProofTreeError::NotApplied(id));
        }
        let skeleton = self.skeleton(id)?;
        let mut stack = std::mem::take(&mut self.node_mut(id)?.children);
        while let Some(child) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(child.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        self.node_mut(id)?.rule = None;
        debug!(node = %id, "pruned");
        self.update_confidence(id);
        Ok(skeleton)
    }

    /// Recomputes the cached confidence of `id` and its ancestors
    fn update_confidence(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let (confidence, parent) = match self.node(id) {
                Some(node) => {
                    let confidence = match &node.rule {
                        None => PENDING,
                        Some(rule) => node
                            .children
                            .iter()
                            .filter_map(|c| self.confidence(*c))
                            .fold(rule.confidence(), Confidence::min),
                    };
                    (confidence, node.parent)
                }
                None => return,
            };
            if let Some(node) = self.nodes[id.0].as_mut() {
                node.confidence = confidence;
            }
            current = parent;
        }
    }

    /// The open nodes at or below `id`, in depth first order, children left to right
    pub fn open_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                if node.is_open() {
                    result.push(id);
                }
                stack.extend(node.children.iter().rev());
            }
        }
        result
    }

    /// All open nodes of the tree, in the order remaining obligations should be worked on
    pub fn open_leaves(&self) -> Vec<NodeId> {
        self.open_descendants(self.root)
    }

    /// Extracts the skeleton of the subtree at `id`
    pub fn skeleton(&self, id: NodeId) -> Result<ProofSkeleton, ProofTreeError> {
        // Parents come before their children in `order`, so walking it backwards finishes every
        // child skeleton before the parent needs it.
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend_from_slice(&self.get(current)?.children);
            order.push(current);
        }
        let mut finished: BTreeMap<NodeId, ProofSkeleton> = BTreeMap::new();
        for current in order.into_iter().rev() {
            let node = self.get(current)?;
            let children = node
                .children
                .iter()
                .map(|c| finished.remove(c).ok_or(ProofTreeError::UnknownNode(*c)))
                .collect::<Result<Vec<_>, _>>()?;
            let skeleton = ProofSkeleton {
                comment: node.comment.clone(),
                rule: node.rule.as_ref().map(|rule| self.skeleton_rule(rule)),
                children,
            };
            finished.insert(current, skeleton);
        }
        finished.remove(&id).ok_or(ProofTreeError::UnknownNode(id))
    }

    fn skeleton_rule(&self, rule: &Rule) -> SkeletonRule {
        SkeletonRule {
            reasoner_id: rule.reasoner_id().to_owned(),
            input: self.formatter.write_input(rule.input()),
            confidence: rule.confidence(),
            display: rule.display().to_owned(),
            added_identifiers: rule
                .antecedents()
                .iter()
                .map(|a| a.added_identifiers().to_vec())
                .collect(),
        }
    }

    /// Number of nodes currently in the tree
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoner::{
        apply_checked, Conjunction, Hyp, Implication, Reasoner, ReasonerInput, Review,
    };
    use crate::types::{DISCHARGED_MAX, REVIEWED_MAX};
    use crate::typing::TypeEnvironment;

    fn read(input: &str) -> crate::expression::Predicate {
        Formatter::new().read_predicate(input).unwrap()
    }

    fn tree(hyps: &[&str], goal: &str) -> ProofTree {
        ProofTree::new(
            Sequent::new(TypeEnvironment::new(), hyps.iter().map(|h| read(h)), read(goal)).unwrap(),
        )
    }

    fn apply(tree: &mut ProofTree, id: NodeId, reasoner: &dyn Reasoner, input: ReasonerInput) -> Vec<NodeId> {
        let rule = apply_checked(reasoner, tree.sequent(id).unwrap(), &input).unwrap();
        tree.apply_rule(id, rule).unwrap()
    }

    #[test]
    fn open_child_keeps_parent_pending() {
        let mut t = tree(&["P"], "(P & Q)");
        let root = t.root();
        let children = apply(&mut t, root, &Conjunction, ReasonerInput::Empty);
        apply(&mut t, children[0], &Hyp, ReasonerInput::Empty);
        assert_eq!(t.confidence(children[0]), Some(DISCHARGED_MAX));
        assert_eq!(t.confidence(children[1]), Some(PENDING));
        assert_eq!(t.confidence(root), Some(PENDING));
        assert!(!t.is_closed());
        assert_eq!(t.open_leaves(), vec![children[1]]);
    }

    #[test]
    fn confidence_is_minimum() {
        let mut t = tree(&["P"], "(P & Q)");
        let root = t.root();
        let children = apply(&mut t, root, &Conjunction, ReasonerInput::Empty);
        apply(&mut t, children[0], &Hyp, ReasonerInput::Empty);
        apply(&mut t, children[1], &Review, ReasonerInput::Confidence(REVIEWED_MAX));
        assert_eq!(t.confidence(root), Some(REVIEWED_MAX));
        assert!(!t.is_closed());
    }

    #[test]
    fn illegal_transitions() {
        let mut t = tree(&["P"], "P");
        let root = t.root();
        assert_eq!(t.prune(root), Err(ProofTreeError::NotApplied(root)));
        let rule = apply_checked(&Hyp, t.sequent(root).unwrap(), &ReasonerInput::Empty).unwrap();
        t.apply_rule(root, rule.clone()).unwrap();
        assert!(t.is_closed());
        assert_eq!(t.apply_rule(root, rule), Err(ProofTreeError::NotOpen(root)));

        let mut other = tree(&["Q"], "Q");
        let foreign = apply_checked(&Hyp, other.sequent(other.root()).unwrap(), &ReasonerInput::Empty)
            .unwrap();
        let root = t.root();
        t.prune(root).unwrap();
        assert!(matches!(
            t.apply_rule(root, foreign.clone()),
            Err(ProofTreeError::SequentMismatch { .. })
        ));
        let other_root = other.root();
        other.apply_rule(other_root, foreign).unwrap();
    }

    #[test]
    fn prune_returns_skeleton_and_invalidates_ids() {
        let mut t = tree(&[], "(P => (Q => P))");
        let root = t.root();
        let c1 = apply(&mut t, root, &Implication, ReasonerInput::Empty);
        let c2 = apply(&mut t, c1[0], &Implication, ReasonerInput::Empty);
        apply(&mut t, c2[0], &Hyp, ReasonerInput::Empty);
        t.set_comment(c1[0], "second step").unwrap();
        assert!(t.is_closed());
        assert_eq!(t.len(), 3);

        let skeleton = t.prune(c1[0]).unwrap();
        assert_eq!(skeleton.comment, "second step");
        assert_eq!(skeleton.rule.as_ref().map(|r| r.reasoner_id.as_str()), Some("impI"));
        assert_eq!(skeleton.children.len(), 1);
        assert_eq!(skeleton.children[0].rule.as_ref().map(|r| r.reasoner_id.as_str()), Some("hyp"));

        assert!(t.node(c2[0]).is_none());
        assert_eq!(t.len(), 2);
        assert_eq!(t.open_leaves(), vec![c1[0]]);
        assert_eq!(t.confidence(root), Some(PENDING));
        assert_eq!(t.node(c1[0]).map(|n| n.comment()), Some("second step"));

        // new children get new ids
        let c3 = apply(&mut t, c1[0], &Implication, ReasonerInput::Empty);
        assert_ne!(c3, c2);
    }

    #[test]
    fn open_leaves_are_left_to_right() {
        let mut t = tree(&[], "((P & Q) & R)");
        let root = t.root();
        let c = apply(&mut t, root, &Conjunction, ReasonerInput::Empty);
        let left = apply(&mut t, c[0], &Conjunction, ReasonerInput::Empty);
        let goals: Vec<_> = t
            .open_leaves()
            .into_iter()
            .map(|id| t.sequent(id).unwrap().goal().clone())
            .collect();
        assert_eq!(goals, vec![read("P"), read("Q"), read("R")]);
        assert_eq!(t.open_descendants(c[0]), left);
        assert_eq!(t.parent(left[1]), Some(c[0]));
        assert_eq!(t.children(c[0]), left.as_slice());
    }
}
