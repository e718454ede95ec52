use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, cut, map, map_opt, opt, recognize},
    multi::{separated_list0, separated_list1},
    sequence::{pair, preceded, terminated},
};

use crate::reasoner::{HypAction, InputKind, ReasonerInput};
use crate::types::Confidence;

use super::error::SyntaxError;
use super::formatter::{Formatter, ParseResult};

impl Formatter {
    /// Writes the textual form of a reasoner input, as recorded in proof skeletons.
    ///
    /// The forms are
    /// * `Empty`: nothing
    /// * `Hypothesis`, `Predicate`: the predicate
    /// * `Instantiation`: `<predicate> with <expr>, <expr>, ...`
    /// * `Confidence`: the number
    /// * `HypAction`: `hide|show|select|deselect <predicate> ; <predicate> ; ...`
    ///
    /// An `Error` input has no textual form and is written as nothing.
    pub fn format_input(&self, s: &mut String, input: &ReasonerInput) {
        match input {
            ReasonerInput::Empty | ReasonerInput::Error(_) => {}
            ReasonerInput::Hypothesis(p) | ReasonerInput::Predicate(p) => {
                self.format_predicate(s, p, &mut Vec::new())
            }
            ReasonerInput::Instantiation {
                hypothesis,
                witnesses,
            } => {
                self.format_predicate(s, hypothesis, &mut Vec::new());
                s.push_str(" with");
                for (i, w) in witnesses.iter().enumerate() {
                    s.push_str(if i == 0 { " " } else { ", " });
                    self.format_expression(s, w, &mut Vec::new());
                }
            }
            ReasonerInput::Confidence(c) => s.push_str(&c.to_string()),
            ReasonerInput::HypAction { action, hypotheses } => {
                s.push_str(action.keyword());
                for (i, p) in hypotheses.iter().enumerate() {
                    s.push_str(if i == 0 { " " } else { " ; " });
                    self.format_predicate(s, p, &mut Vec::new());
                }
            }
        }
    }

    pub fn write_input(&self, input: &ReasonerInput) -> String {
        let mut s = String::new();
        self.format_input(&mut s, input);
        s
    }

    /// Reads an input of the given kind. Unreadable text yields an `Error` input carrying the
    /// syntax error, to be reported by the reasoner that receives it.
    ///
    /// # Example
    /// ```
    /// use seqprove::reasoner::{InputKind, ReasonerInput};
    /// use seqprove::serialization::Formatter;
    ///
    /// let fmt = Formatter::new();
    /// let input = fmt.read_input(InputKind::Instantiation, "(! a:INT . P(a)) with (x + 1)");
    /// assert_eq!(fmt.write_input(&input), "(! a:INT . P(a)) with (x + 1)");
    ///
    /// assert!(fmt.read_input(InputKind::Confidence, "lots").error().is_some());
    /// ```
    pub fn read_input(&self, kind: InputKind, raw: &str) -> ReasonerInput {
        let result = match kind {
            InputKind::Empty => {
                if raw.trim().is_empty() {
                    Ok(ReasonerInput::Empty)
                } else {
                    Err(SyntaxError {
                        input: raw.to_owned(),
                        reason: "expected no input".to_owned(),
                    })
                }
            }
            InputKind::Hypothesis => self.read_predicate(raw).map(ReasonerInput::Hypothesis),
            InputKind::Predicate => self.read_predicate(raw).map(ReasonerInput::Predicate),
            InputKind::Instantiation => self.read_with(raw, |i| self.parse_instantiation(i)),
            InputKind::Confidence => self.read_with(raw, |i| self.parse_confidence(i)),
            InputKind::HypAction => self.read_with(raw, |i| self.parse_hyp_action(i)),
        };
        result.unwrap_or_else(|e| ReasonerInput::Error(e.to_string()))
    }

    fn read_with<'a, F>(&self, raw: &'a str, parser: F) -> Result<ReasonerInput, SyntaxError>
    where
        F: FnMut(&'a str) -> ParseResult<'a, ReasonerInput>,
    {
        all_consuming(terminated(parser, multispace0))(raw)
            .map(|(_, input)| input)
            .map_err(|e| SyntaxError::from_nom(raw, e))
    }

    fn parse_instantiation<'a>(&self, input: &'a str) -> ParseResult<'a, ReasonerInput> {
        let (input, hypothesis) = self.parse_predicate(&[], input)?;
        let (input, _) = preceded(multispace1, tag("with"))(input)?;
        let (input, witnesses) = cut(separated_list0(
            preceded(multispace0, char(',')),
            |i| self.parse_expression(&[], i),
        ))(input)?;
        Ok((
            input,
            ReasonerInput::Instantiation {
                hypothesis,
                witnesses,
            },
        ))
    }

    fn parse_confidence<'a>(&self, input: &'a str) -> ParseResult<'a, ReasonerInput> {
        let (input, _) = multispace0(input)?;
        map_opt(recognize(pair(opt(char('-')), digit1)), |s: &str| {
            s.parse::<Confidence>().ok().map(ReasonerInput::Confidence)
        })(input)
    }

    fn parse_hyp_action<'a>(&self, input: &'a str) -> ParseResult<'a, ReasonerInput> {
        let (input, _) = multispace0(input)?;
        let (input, action) = alt((
            map(tag("hide"), |_| HypAction::Hide),
            map(tag("show"), |_| HypAction::Show),
            map(tag("select"), |_| HypAction::Select),
            map(tag("deselect"), |_| HypAction::Deselect),
        ))(input)?;
        let (input, hypotheses) = cut(separated_list1(
            preceded(multispace0, char(';')),
            |i| self.parse_predicate(&[], i),
        ))(input)?;
        Ok((input, ReasonerInput::HypAction { action, hypotheses }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Expression, Predicate};

    #[test]
    fn hyp_action() {
        let fmt = Formatter::new();
        let input = fmt.read_input(InputKind::HypAction, "deselect P ; (x < 1)");
        assert_eq!(
            input,
            ReasonerInput::HypAction {
                action: HypAction::Deselect,
                hypotheses: vec![
                    Predicate::atom("P"),
                    fmt.read_predicate("(x < 1)").unwrap()
                ],
            }
        );
        assert_eq!(fmt.write_input(&input), "deselect P ; (x < 1)");
        assert!(fmt.read_input(InputKind::HypAction, "hide").error().is_some());
        assert!(fmt.read_input(InputKind::HypAction, "forget P").error().is_some());
    }

    #[test]
    fn instantiation() {
        let fmt = Formatter::new();
        let input = fmt.read_input(InputKind::Instantiation, "(! a:INT, b:INT . (a < b)) with x, -2");
        match &input {
            ReasonerInput::Instantiation { witnesses, .. } => assert_eq!(
                witnesses,
                &vec![Expression::identifier("x"), Expression::Integer(-2)]
            ),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            fmt.write_input(&input),
            "(! a:INT, b:INT . (a < b)) with x, -2"
        );
        assert!(fmt
            .read_input(InputKind::Instantiation, "(! a:INT . P(a)) with x,")
            .error()
            .is_some());
    }

    #[test]
    fn simple_kinds() {
        let fmt = Formatter::new();
        assert_eq!(fmt.read_input(InputKind::Empty, "  "), ReasonerInput::Empty);
        assert!(fmt.read_input(InputKind::Empty, "P").error().is_some());
        assert_eq!(
            fmt.read_input(InputKind::Confidence, " 250 "),
            ReasonerInput::Confidence(250)
        );
        assert!(fmt.read_input(InputKind::Confidence, "99999").error().is_some());
        assert_eq!(
            fmt.read_input(InputKind::Hypothesis, "(P & Q)"),
            ReasonerInput::Hypothesis(fmt.read_predicate("(P & Q)").unwrap())
        );
        assert!(fmt.read_input(InputKind::Predicate, "(P &").error().is_some());
    }
}
