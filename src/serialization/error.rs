use std::fmt;

use nom::{
    error::{ContextError, ErrorKind, ParseError},
    InputLength,
};
use thiserror::Error;

/// One step of a failed parse: where it happened and what was expected there
#[derive(Debug)]
struct Frame<I> {
    input: I,
    expected: Expected,
}

#[derive(Debug)]
enum Expected {
    Context(&'static str),
    Nom(ErrorKind),
    Char(char),
}

/// A parse error for the formula syntax.
///
/// When alternatives fail, the error of the alternative that consumed the most input wins. Its
/// trace is kept from the innermost frame outwards.
#[derive(Debug)]
pub struct GreedyError<I> {
    trace: Vec<Frame<I>>,
}

impl<I: InputLength> GreedyError<I> {
    fn start(input: I, expected: Expected) -> Self {
        GreedyError {
            trace: vec![Frame { input, expected }],
        }
    }

    fn push(mut self, input: I, expected: Expected) -> Self {
        self.trace.push(Frame { input, expected });
        self
    }

    /// Input left over where the innermost frame failed
    fn remaining(&self) -> usize {
        self.trace
            .first()
            .map(|frame| frame.input.input_len())
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for GreedyError<&str> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.trace {
            let near: String = frame.input.chars().take(20).collect();
            match frame.expected {
                Expected::Context(ctx) => write!(f, "in {}", ctx)?,
                Expected::Nom(kind) => write!(f, "expected {}", kind.description())?,
                Expected::Char(c) => write!(f, "expected `{}`", c)?,
            }
            writeln!(f, " near {:?}", near)?;
        }
        Ok(())
    }
}

impl<I: InputLength> ParseError<I> for GreedyError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        GreedyError::start(input, Expected::Nom(kind))
    }

    fn append(input: I, kind: ErrorKind, other: Self) -> Self {
        other.push(input, Expected::Nom(kind))
    }

    fn from_char(input: I, c: char) -> Self {
        GreedyError::start(input, Expected::Char(c))
    }

    fn or(self, other: Self) -> Self {
        if other.remaining() < self.remaining() {
            other
        } else {
            self
        }
    }
}

impl<I: InputLength> ContextError<I> for GreedyError<I> {
    fn add_context(input: I, ctx: &'static str, other: Self) -> Self {
        other.push(input, Expected::Context(ctx))
    }
}

/// A formula or reasoner input that could not be read
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse `{input}`: {reason}")]
pub struct SyntaxError {
    pub input: String,
    pub reason: String,
}

impl SyntaxError {
    pub(crate) fn from_nom(input: &str, error: nom::Err<GreedyError<&str>>) -> Self {
        let reason = match error {
            nom::Err::Incomplete(_) => "incomplete input".to_owned(),
            nom::Err::Error(e) | nom::Err::Failure(e) => e.to_string().trim_end().to_owned(),
        };
        SyntaxError {
            input: input.to_owned(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::{branch::alt, bytes::complete::tag, sequence::preceded, IResult};

    fn parse(input: &str) -> IResult<&str, &str, GreedyError<&str>> {
        alt((preceded(tag("ab"), tag("cd")), tag("x")))(input)
    }

    #[test]
    fn furthest_alternative_wins() {
        let error = match parse("abzz") {
            Err(nom::Err::Error(e)) => e,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(error.remaining(), 2);
        assert!(error.to_string().contains("near \"zz\""));
    }

    #[test]
    fn short_input_displays() {
        let error = GreedyError::from_char("", ')');
        assert_eq!(error.to_string(), "expected `)` near \"\"\n");
    }
}
