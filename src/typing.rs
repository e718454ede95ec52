use crate::{
    error::SequentError,
    expression::{BinaryOperator, Expression, Predicate, Relation, Type},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable mapping from identifier names to their types
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TypeEnvironment {
    names: BTreeMap<String, Type>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        TypeEnvironment {
            names: BTreeMap::new(),
        }
    }

    /// Creates a type environment from `(name, type)` pairs.
    ///
    /// # Errors
    /// Returns a `TypeConflict` if the same name is given two different types
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, SequentError>
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        let mut env = TypeEnvironment::new();
        for (name, ty) in pairs {
            env.insert(name, ty)?;
        }
        Ok(env)
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.names.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Type)> {
        self.names.iter()
    }

    /// Adds `name` with type `ty`. Re-inserting a name with the same type is allowed.
    pub fn insert(&mut self, name: impl Into<String>, ty: Type) -> Result<(), SequentError> {
        let name = name.into();
        match self.names.get(&name) {
            Some(existing) if existing != &ty => Err(SequentError::TypeConflict {
                name,
                existing: existing.clone(),
                new: ty,
            }),
            Some(_) => Ok(()),
            None => {
                self.names.insert(name, ty);
                Ok(())
            }
        }
    }

    /// Returns the union of both environments.
    ///
    /// # Errors
    /// Returns a `TypeConflict` if `other` redefines an identifier of `self` with a different
    /// type.
    ///
    /// # Example
    /// ```
    /// use seqprove::expression::Type;
    /// use seqprove::typing::TypeEnvironment;
    ///
    /// let a = TypeEnvironment::from_pairs([("x", Type::Integer)]).unwrap();
    /// let b = TypeEnvironment::from_pairs([("y", Type::Boolean)]).unwrap();
    /// assert_eq!(a.merge(&b).unwrap().len(), 2);
    ///
    /// let c = TypeEnvironment::from_pairs([("x", Type::Boolean)]).unwrap();
    /// assert!(a.merge(&c).is_err());
    /// ```
    pub fn merge(&self, other: &TypeEnvironment) -> Result<Self, SequentError> {
        let mut env = self.clone();
        for (name, ty) in other.iter() {
            env.insert(name.clone(), ty.clone())?;
        }
        Ok(env)
    }

    /// Returns `base` if it is unused, otherwise the first unused name of `base0`, `base1`, ...
    ///
    /// # Example
    /// ```
    /// use seqprove::expression::Type;
    /// use seqprove::typing::TypeEnvironment;
    ///
    /// let env = TypeEnvironment::from_pairs([("x", Type::Integer), ("x0", Type::Integer)]).unwrap();
    /// assert_eq!(env.fresh_name("y"), "y");
    /// assert_eq!(env.fresh_name("x"), "x1");
    /// ```
    pub fn fresh_name(&self, base: &str) -> String {
        fresh_name(base, |name| self.contains(name))
    }

    /// Computes the type of `expr`. `bound` holds the types of the bound variables in scope,
    /// innermost last.
    pub fn type_of(&self, expr: &Expression, bound: &[Type]) -> Result<Type, SequentError> {
        match expr {
            Expression::Identifier(name) => self
                .get(name)
                .cloned()
                .ok_or_else(|| SequentError::UnboundIdentifier(name.clone())),
            Expression::Bound(i) => bound
                .len()
                .checked_sub(i + 1)
                .map(|index| bound[index].clone())
                .ok_or_else(|| {
                    SequentError::TypeMismatch(format!("bound variable {} is not declared", i))
                }),
            Expression::Integer(_) => Ok(Type::Integer),
            Expression::Binary(op, left, right) => {
                let left_ty = self.type_of(left, bound)?;
                let right_ty = self.type_of(right, bound)?;
                if op.is_arithmetic() {
                    if left_ty != Type::Integer || right_ty != Type::Integer {
                        return Err(SequentError::TypeMismatch(format!(
                            "operands of `{}` must be integers, found {} and {}",
                            op.symbol(),
                            left_ty,
                            right_ty
                        )));
                    }
                    Ok(Type::Integer)
                } else if left_ty.element_type().is_some() && left_ty == right_ty {
                    Ok(left_ty)
                } else {
                    debug_assert!(matches!(
                        op,
                        BinaryOperator::Union | BinaryOperator::Intersection
                    ));
                    Err(SequentError::TypeMismatch(format!(
                        "operands of `{}` must be sets of the same type, found {} and {}",
                        op.symbol(),
                        left_ty,
                        right_ty
                    )))
                }
            }
        }
    }

    /// Checks that every free identifier of `pred` is bound in this environment and that `pred`
    /// is well typed.
    pub fn check_predicate(&self, pred: &Predicate) -> Result<(), SequentError> {
        self.check_predicate_bound(pred, &mut Vec::new())
    }

    fn check_predicate_bound(
        &self,
        pred: &Predicate,
        bound: &mut Vec<Type>,
    ) -> Result<(), SequentError> {
        match pred {
            Predicate::True | Predicate::False => Ok(()),
            Predicate::Not(p) => self.check_predicate_bound(p, bound),
            Predicate::Binary(_, left, right) => {
                self.check_predicate_bound(left, bound)?;
                self.check_predicate_bound(right, bound)
            }
            Predicate::Relation(relation, left, right) => {
                let left_ty = self.type_of(left, bound)?;
                let right_ty = self.type_of(right, bound)?;
                let ok = match relation {
                    Relation::Equal => left_ty == right_ty,
                    Relation::In => right_ty.element_type() == Some(&left_ty),
                    Relation::Less | Relation::LessEqual => {
                        left_ty == Type::Integer && right_ty == Type::Integer
                    }
                };
                if ok {
                    Ok(())
                } else {
                    Err(SequentError::TypeMismatch(format!(
                        "`{}` cannot relate {} and {}",
                        relation.symbol(),
                        left_ty,
                        right_ty
                    )))
                }
            }
            Predicate::Atom(_, args) => {
                for arg in args {
                    self.type_of(arg, bound)?;
                }
                Ok(())
            }
            Predicate::Quantified(_, decls, body) => {
                let depth = bound.len();
                bound.extend(decls.iter().map(|d| d.ty.clone()));
                let result = self.check_predicate_bound(body, bound);
                bound.truncate(depth);
                result
            }
        }
    }
}

/// Returns `base` if it is not `taken`, otherwise the first of `base0`, `base1`, ... that is not
pub(crate) fn fresh_name<F>(base: &str, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !taken(base) {
        return base.to_owned();
    }
    let mut i = 0usize;
    loop {
        let name = format!("{}{}", base, i);
        if !taken(&name) {
            return name;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::Formatter;

    fn env() -> TypeEnvironment {
        TypeEnvironment::from_pairs([
            ("x", Type::Integer),
            ("s", Type::power(Type::Integer)),
            ("t", Type::power(Type::given("S"))),
        ])
        .unwrap()
    }

    fn check(input: &str) -> Result<(), SequentError> {
        env().check_predicate(&Formatter::new().read_predicate(input).unwrap())
    }

    #[test]
    fn well_typed() {
        assert_eq!(check("(x : s)"), Ok(()));
        assert_eq!(check("(! y:INT . ((x + y) : (s \\/ s)))"), Ok(()));
        assert_eq!(check("(# e:S . (e : t))"), Ok(()));
        assert_eq!(check("R(x, s)"), Ok(()));
    }

    #[test]
    fn ill_typed() {
        assert!(matches!(check("(x : t)"), Err(SequentError::TypeMismatch(_))));
        assert!(matches!(check("(x < s)"), Err(SequentError::TypeMismatch(_))));
        assert!(matches!(check("((s + 1) = x)"), Err(SequentError::TypeMismatch(_))));
        assert_eq!(
            check("(z = x)"),
            Err(SequentError::UnboundIdentifier("z".to_owned()))
        );
    }

    #[test]
    fn insert_conflict() {
        let mut env = env();
        assert_eq!(env.insert("x", Type::Integer), Ok(()));
        assert_eq!(
            env.insert("x", Type::Boolean),
            Err(SequentError::TypeConflict {
                name: "x".to_owned(),
                existing: Type::Integer,
                new: Type::Boolean,
            })
        );
    }
}
