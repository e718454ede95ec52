//! Textual form of formulas and reasoner inputs

pub mod error;
mod formatter;
mod input;

pub use error::SyntaxError;
pub use formatter::*;
