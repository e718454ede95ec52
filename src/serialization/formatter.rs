use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map, map_opt, opt, recognize, verify},
    error::context,
    multi::separated_list1,
    sequence::{pair, preceded, terminated},
    IResult,
};
use std::fmt::Write;

use crate::expression::{
    BinaryOperator, BoundDecl, Connective, Expression, Predicate, Quantifier, Relation, Type,
};

use super::error::{GreedyError, SyntaxError};
use crate::typing::fresh_name;

pub(crate) type ParseResult<'a, T> = IResult<&'a str, T, GreedyError<&'a str>>;

/// Reads and writes the textual form of types, expressions and predicates.
///
/// The formatter is the formula service of this crate. It is passed explicitly to everything that
/// needs to read formulas (see [`ProofBuilder`](crate::ProofBuilder)).
///
/// ```
/// use seqprove::serialization::Formatter;
///
/// let fmt = Formatter::new();
/// let p = fmt
///     .read_predicate("(! x:INT, s:POW(INT) . ((x : s) => ~(x < 0)))")
///     .unwrap();
///
/// let mut s = String::new();
/// fmt.format_predicate(&mut s, &p, &mut Vec::new());
/// assert_eq!(s, "(! x:INT, s:POW(INT) . ((x : s) => ~(x < 0)))");
/// assert_eq!(fmt.read_predicate(&s).unwrap(), p);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter;

impl Formatter {
    pub fn new() -> Self {
        Formatter
    }

    pub fn format_type(&self, s: &mut String, ty: &Type) {
        match ty {
            Type::Integer => s.push_str("INT"),
            Type::Boolean => s.push_str("BOOL"),
            Type::Given(name) => s.push_str(name),
            Type::Power(ty) => {
                s.push_str("POW(");
                self.format_type(s, ty);
                s.push(')');
            }
            Type::Product(left, right) => {
                s.push('(');
                self.format_type(s, left);
                s.push_str(" ** ");
                self.format_type(s, right);
                s.push(')');
            }
        }
    }

    /// Writes `expr` to `s`. `bound` holds the names of the bound variables in scope, innermost
    /// last.
    pub fn format_expression(&self, s: &mut String, expr: &Expression, bound: &mut Vec<String>) {
        match expr {
            Expression::Identifier(name) => s.push_str(name),
            Expression::Bound(i) => match bound.len().checked_sub(i + 1) {
                Some(index) => s.push_str(&bound[index]),
                None => write!(s, "_{}", i).unwrap(),
            },
            Expression::Integer(n) => write!(s, "{}", n).unwrap(),
            Expression::Binary(op, left, right) => {
                s.push('(');
                self.format_expression(s, left, bound);
                write!(s, " {} ", op.symbol()).unwrap();
                self.format_expression(s, right, bound);
                s.push(')');
            }
        }
    }

    pub fn format_predicate(&self, s: &mut String, pred: &Predicate, bound: &mut Vec<String>) {
        match pred {
            Predicate::True => s.push_str("true"),
            Predicate::False => s.push_str("false"),
            Predicate::Not(p) => {
                s.push('~');
                self.format_predicate(s, p, bound);
            }
            Predicate::Binary(c, left, right) => {
                s.push('(');
                self.format_predicate(s, left, bound);
                write!(s, " {} ", c.symbol()).unwrap();
                self.format_predicate(s, right, bound);
                s.push(')');
            }
            Predicate::Relation(r, left, right) => {
                s.push('(');
                self.format_expression(s, left, bound);
                write!(s, " {} ", r.symbol()).unwrap();
                self.format_expression(s, right, bound);
                s.push(')');
            }
            Predicate::Atom(name, args) => {
                s.push_str(name);
                if !args.is_empty() {
                    s.push('(');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            s.push_str(", ");
                        }
                        self.format_expression(s, arg, bound);
                    }
                    s.push(')');
                }
            }
            Predicate::Quantified(q, decls, body) => {
                s.push_str(match q {
                    Quantifier::Forall => "(! ",
                    Quantifier::Exists => "(# ",
                });
                // A binder must not capture a free identifier of its body or hide a binder in
                // scope, otherwise the text reads back as a different predicate.
                let free = body.free_identifiers();
                let depth = bound.len();
                for (i, decl) in decls.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    let name = fresh_name(&decl.name, |n| {
                        free.contains(n) || bound.iter().any(|b| b == n)
                    });
                    write!(s, "{}:", name).unwrap();
                    self.format_type(s, &decl.ty);
                    bound.push(name);
                }
                s.push_str(" . ");
                self.format_predicate(s, body, bound);
                bound.truncate(depth);
                s.push(')');
            }
        }
    }

    /// Returns the textual form of `pred`
    pub fn write_predicate(&self, pred: &Predicate) -> String {
        let mut s = String::new();
        self.format_predicate(&mut s, pred, &mut Vec::new());
        s
    }

    /// Returns the textual form of `expr`
    pub fn write_expression(&self, expr: &Expression) -> String {
        let mut s = String::new();
        self.format_expression(&mut s, expr, &mut Vec::new());
        s
    }

    pub fn read_type(&self, input: &str) -> Result<Type, SyntaxError> {
        all_consuming(terminated(|i| self.parse_type(i), multispace0))(input)
            .map(|(_, ty)| ty)
            .map_err(|e| SyntaxError::from_nom(input, e))
    }

    pub fn read_expression(&self, input: &str) -> Result<Expression, SyntaxError> {
        all_consuming(terminated(
            |i| self.parse_expression(&[], i),
            multispace0,
        ))(input)
        .map(|(_, e)| e)
        .map_err(|e| SyntaxError::from_nom(input, e))
    }

    pub fn read_predicate(&self, input: &str) -> Result<Predicate, SyntaxError> {
        all_consuming(terminated(|i| self.parse_predicate(&[], i), multispace0))(input)
            .map(|(_, p)| p)
            .map_err(|e| SyntaxError::from_nom(input, e))
    }

    pub fn parse_type<'a>(&self, input: &'a str) -> ParseResult<'a, Type> {
        let (input, _) = multispace0(input)?;
        alt((
            context("product", |input| self.parse_product_type(input)),
            context("power", |input| self.parse_power_type(input)),
            context(
                "named",
                map(upper_name, |name: &str| match name {
                    "INT" => Type::Integer,
                    "BOOL" => Type::Boolean,
                    _ => Type::given(name),
                }),
            ),
        ))(input)
    }

    fn parse_product_type<'a>(&self, input: &'a str) -> ParseResult<'a, Type> {
        let (input, _) = char('(')(input)?;
        let (input, left) = self.parse_type(input)?;
        let (input, _) = preceded(multispace0, tag("**"))(input)?;
        let (input, right) = self.parse_type(input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((input, Type::Product(Box::new(left), Box::new(right))))
    }

    fn parse_power_type<'a>(&self, input: &'a str) -> ParseResult<'a, Type> {
        let (input, _) = tag("POW(")(input)?;
        let (input, ty) = self.parse_type(input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((input, Type::power(ty)))
    }

    /// Parses an expression. `bound` holds the names of the bound variables in scope, innermost
    /// last; identifiers matching one of them are turned into bound variables.
    pub fn parse_expression<'a>(
        &self,
        bound: &[String],
        input: &'a str,
    ) -> ParseResult<'a, Expression> {
        let (input, _) = multispace0(input)?;
        alt((
            context(
                "integer",
                map_opt(recognize(pair(opt(char('-')), digit1)), |s: &str| {
                    s.parse::<i64>().ok().map(Expression::Integer)
                }),
            ),
            context(
                "identifier",
                map(lower_name, |name: &str| resolve(bound, name)),
            ),
            context("binary", |input| self.parse_binary_expression(bound, input)),
        ))(input)
    }

    fn parse_binary_expression<'a>(
        &self,
        bound: &[String],
        input: &'a str,
    ) -> ParseResult<'a, Expression> {
        let (input, _) = char('(')(input)?;
        let (input, left) = self.parse_expression(bound, input)?;
        let (input, _) = multispace0(input)?;
        let (input, op) = alt((
            map(tag("+"), |_| BinaryOperator::Plus),
            map(tag("-"), |_| BinaryOperator::Minus),
            map(tag("*"), |_| BinaryOperator::Times),
            map(tag("\\/"), |_| BinaryOperator::Union),
            map(tag("/\\"), |_| BinaryOperator::Intersection),
        ))(input)?;
        let (input, right) = self.parse_expression(bound, input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((input, Expression::binary(op, left, right)))
    }

    pub fn parse_predicate<'a>(
        &self,
        bound: &[String],
        input: &'a str,
    ) -> ParseResult<'a, Predicate> {
        let (input, _) = multispace0(input)?;
        alt((
            context("true", map(keyword("true"), |_| Predicate::True)),
            context("false", map(keyword("false"), |_| Predicate::False)),
            context("not", |input| self.parse_not(bound, input)),
            context("atom", |input| self.parse_atom(bound, input)),
            context("quantified", |input| self.parse_quantified(bound, input)),
            context("connective", |input| self.parse_connective(bound, input)),
            context("relation", |input| self.parse_relation(bound, input)),
        ))(input)
    }

    fn parse_not<'a>(&self, bound: &[String], input: &'a str) -> ParseResult<'a, Predicate> {
        let (input, _) = char('~')(input)?;
        let (input, p) = self.parse_predicate(bound, input)?;
        Ok((input, Predicate::not(p)))
    }

    fn parse_atom<'a>(&self, bound: &[String], input: &'a str) -> ParseResult<'a, Predicate> {
        let (input, name) = upper_name(input)?;
        let (input, args) = opt(|input| self.parse_arguments(bound, input))(input)?;
        Ok((
            input,
            Predicate::Atom(name.to_owned(), args.unwrap_or_default()),
        ))
    }

    fn parse_arguments<'a>(
        &self,
        bound: &[String],
        input: &'a str,
    ) -> ParseResult<'a, Vec<Expression>> {
        let (input, _) = char('(')(input)?;
        let (input, args) = separated_list1(preceded(multispace0, char(',')), |input| {
            self.parse_expression(bound, input)
        })(input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((input, args))
    }

    fn parse_quantified<'a>(
        &self,
        bound: &[String],
        input: &'a str,
    ) -> ParseResult<'a, Predicate> {
        let (input, _) = char('(')(input)?;
        let (input, _) = multispace0(input)?;
        let (input, quantifier) = alt((
            map(char('!'), |_| Quantifier::Forall),
            map(char('#'), |_| Quantifier::Exists),
        ))(input)?;
        let (input, decls) = separated_list1(preceded(multispace0, char(',')), |input| {
            self.parse_bound_decl(input)
        })(input)?;
        let (input, _) = preceded(multispace0, char('.'))(input)?;
        let mut inner = bound.to_vec();
        inner.extend(decls.iter().map(|d| d.name.clone()));
        let (input, body) = self.parse_predicate(&inner, input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((
            input,
            Predicate::Quantified(quantifier, decls, Box::new(body)),
        ))
    }

    fn parse_bound_decl<'a>(&self, input: &'a str) -> ParseResult<'a, BoundDecl> {
        let (input, _) = multispace0(input)?;
        let (input, name) = lower_name(input)?;
        let (input, _) = preceded(multispace0, char(':'))(input)?;
        let (input, ty) = self.parse_type(input)?;
        Ok((input, BoundDecl::new(name, ty)))
    }

    fn parse_connective<'a>(
        &self,
        bound: &[String],
        input: &'a str,
    ) -> ParseResult<'a, Predicate> {
        let (input, _) = char('(')(input)?;
        let (input, left) = self.parse_predicate(bound, input)?;
        let (input, _) = multispace0(input)?;
        let (input, connective) = alt((
            map(tag("<=>"), |_| Connective::Equivalent),
            map(tag("=>"), |_| Connective::Implies),
            map(tag("&"), |_| Connective::And),
            map(tag("|"), |_| Connective::Or),
        ))(input)?;
        let (input, right) = self.parse_predicate(bound, input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((
            input,
            Predicate::Binary(connective, Box::new(left), Box::new(right)),
        ))
    }

    fn parse_relation<'a>(&self, bound: &[String], input: &'a str) -> ParseResult<'a, Predicate> {
        let (input, _) = char('(')(input)?;
        let (input, left) = self.parse_expression(bound, input)?;
        let (input, _) = multispace0(input)?;
        let (input, relation) = alt((
            map(tag("<="), |_| Relation::LessEqual),
            map(tag("<"), |_| Relation::Less),
            map(tag("="), |_| Relation::Equal),
            map(tag(":"), |_| Relation::In),
        ))(input)?;
        let (input, right) = self.parse_expression(bound, input)?;
        let (input, _) = preceded(multispace0, char(')'))(input)?;
        Ok((input, Predicate::Relation(relation, left, right)))
    }
}

fn resolve(bound: &[String], name: &str) -> Expression {
    bound
        .iter()
        .rev()
        .position(|b| b == name)
        .map(Expression::Bound)
        .unwrap_or_else(|| Expression::identifier(name))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\''
}

/// Identifiers start with a lowercase letter
pub(crate) fn lower_name(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_lowercase()),
        take_while(is_name_char),
    ))(input)
}

/// Types and predicate symbols start with an uppercase letter
pub(crate) fn upper_name(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_uppercase()),
        take_while(is_name_char),
    ))(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, &'a str> {
    verify(lower_name, move |s: &str| s == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types() {
        let fmt = Formatter::new();
        assert_eq!(fmt.read_type("INT").unwrap(), Type::Integer);
        assert_eq!(
            fmt.read_type("POW((S ** BOOL))").unwrap(),
            Type::power(Type::Product(
                Box::new(Type::given("S")),
                Box::new(Type::Boolean)
            ))
        );
        assert_eq!(fmt.read_type("INTEGER").unwrap(), Type::given("INTEGER"));
    }

    #[test]
    fn bound_variables() {
        let fmt = Formatter::new();
        let p = fmt.read_predicate("(! x:INT, y:INT . (x < y))").unwrap();
        assert_eq!(
            p,
            Predicate::forall(
                vec![
                    BoundDecl::new("x", Type::Integer),
                    BoundDecl::new("y", Type::Integer)
                ],
                Predicate::relation(Relation::Less, Expression::Bound(1), Expression::Bound(0)),
            )
        );
        // alpha-equivalent predicates are equal
        assert_eq!(fmt.read_predicate("(! a:INT, b:INT . (a < b))").unwrap(), p);
    }

    #[test]
    fn predicates() {
        let fmt = Formatter::new();
        for input in [
            "true",
            "~false",
            "(P & Q)",
            "((P | Q) <=> ~R(x, (y + 1)))",
            "(x <= -3)",
            "((s \\/ t) = (s /\\ t))",
            "(# e:S . (e : s))",
        ] {
            let p = fmt.read_predicate(input).unwrap();
            assert_eq!(fmt.write_predicate(&p), input);
        }
    }

    #[test]
    fn clashing_binders_are_renamed() {
        let fmt = Formatter::new();
        // `(# y:INT . (y < y))` where the first `y` is free
        let p = Predicate::exists(
            vec![BoundDecl::new("y", Type::Integer)],
            Predicate::relation(
                Relation::Less,
                Expression::identifier("y"),
                Expression::Bound(0),
            ),
        );
        let text = fmt.write_predicate(&p);
        assert_eq!(text, "(# y0:INT . (y < y0))");
        assert_eq!(fmt.read_predicate(&text).unwrap(), p);

        // an inner binder hiding an outer one that is still referenced
        let q = Predicate::forall(
            vec![BoundDecl::new("x", Type::Integer)],
            Predicate::forall(
                vec![BoundDecl::new("x", Type::Integer)],
                Predicate::relation(Relation::Less, Expression::Bound(1), Expression::Bound(0)),
            ),
        );
        let text = fmt.write_predicate(&q);
        assert_eq!(text, "(! x:INT . (! x0:INT . (x < x0)))");
        assert_eq!(fmt.read_predicate(&text).unwrap(), q);
    }

    #[test]
    fn whitespace() {
        let fmt = Formatter::new();
        assert_eq!(
            fmt.read_predicate("  ( P   &Q )  ").unwrap(),
            Predicate::and(Predicate::atom("P"), Predicate::atom("Q"))
        );
    }

    #[test]
    fn syntax_errors() {
        let fmt = Formatter::new();
        assert!(fmt.read_predicate("(P &").is_err());
        assert!(fmt.read_predicate("x").is_err());
        assert!(fmt.read_predicate("(x - y)").is_err());
        assert!(fmt.read_predicate("P Q").is_err());
        assert!(fmt.read_expression("(x = y)").is_err());
    }
}
