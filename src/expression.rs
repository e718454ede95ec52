use crate::serialization::Formatter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The type of an identifier or expression
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Type {
    Integer,
    Boolean,
    /// A carrier set introduced by the model, like `S`
    Given(String),
    Power(Box<Type>),
    Product(Box<Type>, Box<Type>),
}

impl Type {
    pub fn given(name: impl Into<String>) -> Self {
        Type::Given(name.into())
    }

    pub fn power(ty: Type) -> Self {
        Type::Power(Box::new(ty))
    }

    /// Returns the element type if this is a power set type
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Power(ty) => Some(ty),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Union,
    Intersection,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Union => "\\/",
            BinaryOperator::Intersection => "/\\",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Times
        )
    }
}

/// A term of the formula language.
///
/// Bound variables use de Bruijn indices: `Bound(0)` refers to the innermost binder in scope. A
/// quantifier declaring `x, y` binds `y` to index `0` and `x` to index `1`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Expression {
    Identifier(String),
    Bound(usize),
    Integer(i64),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn collect_free_identifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            Expression::Identifier(name) => {
                out.insert(name.clone());
            }
            Expression::Bound(_) | Expression::Integer(_) => {}
            Expression::Binary(_, left, right) => {
                left.collect_free_identifiers(out);
                right.collect_free_identifiers(out);
            }
        }
    }

    pub fn free_identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free_identifiers(&mut out);
        out
    }

    /// Tests whether this expression refers to a binder that is not declared inside of it, when
    /// `depth` binders are in scope
    pub fn has_loose_bound(&self, depth: usize) -> bool {
        match self {
            Expression::Bound(i) => *i >= depth,
            Expression::Identifier(_) | Expression::Integer(_) => false,
            Expression::Binary(_, left, right) => {
                left.has_loose_bound(depth) || right.has_loose_bound(depth)
            }
        }
    }

    /// Use the given substitution on the free identifiers of this expression.
    ///
    /// Replacements are expected to be closed (see [`Expression::has_loose_bound`]), so no
    /// index shifting is needed.
    ///
    /// # Example
    /// ```
    /// use seqprove::expression::{BinaryOperator, Expression, WholeSubstitution};
    ///
    /// let expr = Expression::binary(
    ///     BinaryOperator::Plus,
    ///     Expression::identifier("x"),
    ///     Expression::Integer(1),
    /// );
    /// let mut sub = WholeSubstitution::new();
    /// sub.insert("x", Expression::identifier("y"));
    /// assert_eq!(expr.substitute(&sub).to_string(), "(y + 1)");
    /// ```
    pub fn substitute<S: Substitution + ?Sized>(&self, substitution: &S) -> Expression {
        match self {
            Expression::Identifier(name) => substitution
                .substitution_opt(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Expression::Bound(_) | Expression::Integer(_) => self.clone(),
            Expression::Binary(op, left, right) => Expression::binary(
                *op,
                left.substitute(substitution),
                right.substitute(substitution),
            ),
        }
    }

    fn instantiate_bound(&self, depth: usize, witnesses: &[Expression]) -> Expression {
        match self {
            Expression::Bound(i) if *i < depth => self.clone(),
            Expression::Bound(i) if *i < depth + witnesses.len() => {
                witnesses[witnesses.len() - 1 - (i - depth)].clone()
            }
            Expression::Bound(i) => Expression::Bound(i - witnesses.len()),
            Expression::Identifier(_) | Expression::Integer(_) => self.clone(),
            Expression::Binary(op, left, right) => Expression::binary(
                *op,
                left.instantiate_bound(depth, witnesses),
                right.instantiate_bound(depth, witnesses),
            ),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Connective {
    And,
    Or,
    Implies,
    Equivalent,
}

impl Connective {
    pub fn symbol(self) -> &'static str {
        match self {
            Connective::And => "&",
            Connective::Or => "|",
            Connective::Implies => "=>",
            Connective::Equivalent => "<=>",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Relation {
    Equal,
    In,
    Less,
    LessEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::In => ":",
            Relation::Less => "<",
            Relation::LessEqual => "<=",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Quantifier {
    Forall,
    Exists,
}

/// A variable declared by a quantifier.
///
/// The name is only used for display, comparisons look at the type alone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoundDecl {
    pub name: String,
    pub ty: Type,
}

impl PartialEq for BoundDecl {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

impl Eq for BoundDecl {}

impl PartialOrd for BoundDecl {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundDecl {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ty.cmp(&other.ty)
    }
}

impl std::hash::Hash for BoundDecl {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
    }
}

impl BoundDecl {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        BoundDecl {
            name: name.into(),
            ty,
        }
    }
}

/// A typed, immutable predicate.
///
/// Equality, ordering and hashing are structural. Since bound variables are de Bruijn indices,
/// two predicates differing only in the names of their bound variables are equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Predicate {
    True,
    False,
    Not(Box<Predicate>),
    Binary(Connective, Box<Predicate>, Box<Predicate>),
    Relation(Relation, Expression, Expression),
    /// An uninterpreted predicate symbol applied to zero or more arguments
    Atom(String, Vec<Expression>),
    Quantified(Quantifier, Vec<BoundDecl>, Box<Predicate>),
}

impl Predicate {
    pub fn atom(name: impl Into<String>) -> Self {
        Predicate::Atom(name.into(), Vec::new())
    }

    pub fn not(p: Predicate) -> Self {
        Predicate::Not(Box::new(p))
    }

    pub fn and(p: Predicate, q: Predicate) -> Self {
        Predicate::Binary(Connective::And, Box::new(p), Box::new(q))
    }

    pub fn or(p: Predicate, q: Predicate) -> Self {
        Predicate::Binary(Connective::Or, Box::new(p), Box::new(q))
    }

    pub fn implies(p: Predicate, q: Predicate) -> Self {
        Predicate::Binary(Connective::Implies, Box::new(p), Box::new(q))
    }

    pub fn relation(relation: Relation, left: Expression, right: Expression) -> Self {
        Predicate::Relation(relation, left, right)
    }

    pub fn forall(decls: Vec<BoundDecl>, body: Predicate) -> Self {
        Predicate::Quantified(Quantifier::Forall, decls, Box::new(body))
    }

    pub fn exists(decls: Vec<BoundDecl>, body: Predicate) -> Self {
        Predicate::Quantified(Quantifier::Exists, decls, Box::new(body))
    }

    /// Returns both sides if this predicate is built with the given connective
    pub fn split(&self, connective: Connective) -> Option<(&Predicate, &Predicate)> {
        match self {
            Predicate::Binary(c, left, right) if *c == connective => Some((left, right)),
            _ => None,
        }
    }

    /// Tests whether `self` is `~other`
    pub fn is_negation_of(&self, other: &Predicate) -> bool {
        matches!(self, Predicate::Not(inner) if inner.as_ref() == other)
    }

    pub fn collect_free_identifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            Predicate::True | Predicate::False => {}
            Predicate::Not(p) => p.collect_free_identifiers(out),
            Predicate::Binary(_, left, right) => {
                left.collect_free_identifiers(out);
                right.collect_free_identifiers(out);
            }
            Predicate::Relation(_, left, right) => {
                left.collect_free_identifiers(out);
                right.collect_free_identifiers(out);
            }
            Predicate::Atom(_, args) => {
                for arg in args {
                    arg.collect_free_identifiers(out);
                }
            }
            Predicate::Quantified(_, _, body) => body.collect_free_identifiers(out),
        }
    }

    /// Returns the set of free identifiers occuring in this predicate
    ///
    /// # Example
    /// ```
    /// use seqprove::serialization::Formatter;
    ///
    /// let p = Formatter::new().read_predicate("(! y:INT . (x < y))").unwrap();
    /// assert_eq!(p.free_identifiers().into_iter().collect::<Vec<_>>(), vec!["x"]);
    /// ```
    pub fn free_identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free_identifiers(&mut out);
        out
    }

    /// Use the given substitution on the free identifiers of this predicate to create a new
    /// predicate. Replacements have to be closed expressions.
    pub fn substitute<S: Substitution + ?Sized>(&self, substitution: &S) -> Predicate {
        match self {
            Predicate::True | Predicate::False => self.clone(),
            Predicate::Not(p) => Predicate::not(p.substitute(substitution)),
            Predicate::Binary(c, left, right) => Predicate::Binary(
                *c,
                Box::new(left.substitute(substitution)),
                Box::new(right.substitute(substitution)),
            ),
            Predicate::Relation(r, left, right) => Predicate::Relation(
                *r,
                left.substitute(substitution),
                right.substitute(substitution),
            ),
            Predicate::Atom(name, args) => Predicate::Atom(
                name.clone(),
                args.iter().map(|a| a.substitute(substitution)).collect(),
            ),
            Predicate::Quantified(q, decls, body) => {
                Predicate::Quantified(*q, decls.clone(), Box::new(body.substitute(substitution)))
            }
        }
    }

    /// Replaces the variables bound by this quantified predicate with `witnesses` (one per
    /// declaration, in declaration order) and returns the body.
    ///
    /// Returns `None` if this is not a quantified predicate or the number of witnesses does not
    /// match.
    ///
    /// # Example
    /// ```
    /// use seqprove::expression::Expression;
    /// use seqprove::serialization::Formatter;
    ///
    /// let p = Formatter::new().read_predicate("(! a:INT, b:INT . (a < b))").unwrap();
    /// let inst = p
    ///     .instantiate(&[Expression::identifier("x"), Expression::Integer(3)])
    ///     .unwrap();
    /// assert_eq!(inst.to_string(), "(x < 3)");
    /// ```
    pub fn instantiate(&self, witnesses: &[Expression]) -> Option<Predicate> {
        match self {
            Predicate::Quantified(_, decls, body) if decls.len() == witnesses.len() => {
                Some(body.instantiate_bound(0, witnesses))
            }
            _ => None,
        }
    }

    fn instantiate_bound(&self, depth: usize, witnesses: &[Expression]) -> Predicate {
        match self {
            Predicate::True | Predicate::False => self.clone(),
            Predicate::Not(p) => Predicate::not(p.instantiate_bound(depth, witnesses)),
            Predicate::Binary(c, left, right) => Predicate::Binary(
                *c,
                Box::new(left.instantiate_bound(depth, witnesses)),
                Box::new(right.instantiate_bound(depth, witnesses)),
            ),
            Predicate::Relation(r, left, right) => Predicate::Relation(
                *r,
                left.instantiate_bound(depth, witnesses),
                right.instantiate_bound(depth, witnesses),
            ),
            Predicate::Atom(name, args) => Predicate::Atom(
                name.clone(),
                args.iter()
                    .map(|a| a.instantiate_bound(depth, witnesses))
                    .collect(),
            ),
            Predicate::Quantified(q, decls, body) => Predicate::Quantified(
                *q,
                decls.clone(),
                Box::new(body.instantiate_bound(depth + decls.len(), witnesses)),
            ),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        Formatter::new().format_type(&mut s, self);
        f.write_str(&s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        Formatter::new().format_expression(&mut s, self, &mut Vec::new());
        f.write_str(&s)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        Formatter::new().format_predicate(&mut s, self, &mut Vec::new());
        f.write_str(&s)
    }
}

/// A `Substitution` maps free identifiers to (closed) expressions.
///
/// This is intented to be used together with [`Expression::substitute`] and
/// [`Predicate::substitute`].
pub trait Substitution {
    /// Get the stored replacement for the identifier `name`. Or `None` if the identifier
    /// should not be replaced.
    fn substitution_opt(&self, name: &str) -> Option<&Expression>;
}

/// A general [`Substitution`] backed by an ordered map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WholeSubstitution {
    substitution: BTreeMap<String, Expression>,
}

impl WholeSubstitution {
    pub fn new() -> Self {
        WholeSubstitution {
            substitution: BTreeMap::new(),
        }
    }

    /// Marks `name` to be substituted by `expr`, replacing any previous entry.
    ///
    /// # Example
    /// ```
    /// use seqprove::expression::{Expression, Substitution, WholeSubstitution};
    ///
    /// let mut sub = WholeSubstitution::new();
    /// sub.insert("x", Expression::Integer(0));
    /// assert_eq!(sub.substitution_opt("x"), Some(&Expression::Integer(0)));
    /// assert_eq!(sub.substitution_opt("y"), None);
    /// ```
    pub fn insert(&mut self, name: impl Into<String>, expr: Expression) {
        self.substitution.insert(name.into(), expr);
    }

    pub fn is_empty(&self) -> bool {
        self.substitution.is_empty()
    }

    pub fn len(&self) -> usize {
        self.substitution.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Expression)> {
        self.substitution.iter()
    }
}

impl Substitution for WholeSubstitution {
    fn substitution_opt(&self, name: &str) -> Option<&Expression> {
        self.substitution.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expression {
        Expression::identifier("x")
    }

    #[test]
    fn instantiate_nested_quantifier() {
        // (! a:INT . (# b:INT . (a < b)))
        let inner = Predicate::exists(
            vec![BoundDecl::new("b", Type::Integer)],
            Predicate::relation(Relation::Less, Expression::Bound(1), Expression::Bound(0)),
        );
        let p = Predicate::forall(vec![BoundDecl::new("a", Type::Integer)], inner);
        let inst = p.instantiate(&[x()]).unwrap();
        assert_eq!(
            inst,
            Predicate::exists(
                vec![BoundDecl::new("b", Type::Integer)],
                Predicate::relation(Relation::Less, x(), Expression::Bound(0)),
            )
        );
        assert_eq!(p.instantiate(&[]), None);
        assert_eq!(Predicate::True.instantiate(&[x()]), None);
    }

    #[test]
    fn substitute_leaves_bound_variables() {
        let p = Predicate::forall(
            vec![BoundDecl::new("x", Type::Integer)],
            Predicate::relation(Relation::Equal, Expression::Bound(0), x()),
        );
        let mut sub = WholeSubstitution::new();
        sub.insert("x", Expression::Integer(7));
        let q = p.substitute(&sub);
        assert_eq!(
            q,
            Predicate::forall(
                vec![BoundDecl::new("x", Type::Integer)],
                Predicate::relation(Relation::Equal, Expression::Bound(0), Expression::Integer(7)),
            )
        );
        assert!(q.free_identifiers().is_empty());
    }

    #[test]
    fn bound_names_do_not_matter() {
        let body = Predicate::relation(Relation::Less, Expression::Bound(0), x());
        let p = Predicate::forall(vec![BoundDecl::new("a", Type::Integer)], body.clone());
        let q = Predicate::forall(vec![BoundDecl::new("b", Type::Integer)], body.clone());
        let r = Predicate::forall(vec![BoundDecl::new("a", Type::Boolean)], body);
        assert_eq!(p, q);
        assert_ne!(p, r);
    }

    #[test]
    fn negation() {
        let p = Predicate::atom("P");
        assert!(Predicate::not(p.clone()).is_negation_of(&p));
        assert!(!p.is_negation_of(&Predicate::not(p.clone())));
    }

    #[test]
    fn loose_bound() {
        assert!(Expression::Bound(0).has_loose_bound(0));
        assert!(!Expression::Bound(0).has_loose_bound(1));
        assert!(!x().has_loose_bound(0));
    }
}
