//! Debuggee expressions.
//!
//! The supported grammar is a path through locals, members and array elements:
//!
//! ```text
//! expression := identifier ( "." identifier | "[" index ( "," index )* "]" )*
//! ```
//!
//! Whitespace is allowed around indices and separators.

use std::fmt;

use crate::{
    session::StackFrame,
    value::{format_indices, Value},
    Error, Result,
};

/// One step after the root local
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// `.name`
    Member(String),
    /// `[i, j, ...]`
    Index(Vec<usize>),
}

/// A parsed expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    root: String,
    accessors: Vec<Accessor>,
}

fn invalid(text: &str, message: impl Into<String>) -> Error {
    Error::Expression {
        expression: text.to_string(),
        message: message.into(),
    }
}

struct Parser<'a> {
    text: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Parser {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn identifier(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = match self.chars.peek() {
            Some(&(index, c)) if c.is_alphabetic() || c == '_' => index,
            Some(&(index, c)) => {
                return Err(invalid(
                    self.text,
                    format!("expected an identifier at {index}, found '{c}'"),
                ))
            }
            None => return Err(invalid(self.text, "expected an identifier")),
        };

        let mut end = start;
        while let Some((index, c)) = self
            .chars
            .next_if(|(_, c)| c.is_alphanumeric() || *c == '_')
        {
            end = index + c.len_utf8();
        }

        Ok(self.text[start..end].to_string())
    }

    fn index(&mut self) -> Result<usize> {
        self.skip_whitespace();
        let mut digits = String::new();
        while let Some((_, c)) = self.chars.next_if(|(_, c)| c.is_ascii_digit()) {
            digits.push(c);
        }

        if digits.is_empty() {
            return Err(invalid(self.text, "expected a non-negative index"));
        }
        digits
            .parse()
            .map_err(|_| invalid(self.text, format!("index {digits} is too large")))
    }

    fn indices(&mut self) -> Result<Vec<usize>> {
        let mut indices = vec![self.index()?];
        loop {
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => indices.push(self.index()?),
                Some((_, ']')) => return Ok(indices),
                Some((index, c)) => {
                    return Err(invalid(
                        self.text,
                        format!("expected ',' or ']' at {index}, found '{c}'"),
                    ))
                }
                None => return Err(invalid(self.text, "missing ']'")),
            }
        }
    }

    fn expression(mut self) -> Result<Expression> {
        let root = self.identifier()?;
        let mut accessors = Vec::new();

        loop {
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, '.')) => accessors.push(Accessor::Member(self.identifier()?)),
                Some((_, '[')) => accessors.push(Accessor::Index(self.indices()?)),
                Some((index, c)) => {
                    return Err(invalid(
                        self.text,
                        format!("unexpected '{c}' at {index}"),
                    ))
                }
                None => return Ok(Expression { root, accessors }),
            }
        }
    }
}

impl Expression {
    /// Parse expression text
    ///
    /// # Errors
    /// Returns [`Error::Expression`] if the text does not follow the grammar.
    pub fn parse(text: &str) -> Result<Self> {
        Parser::new(text).expression()
    }

    /// The local variable the expression starts at
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The member and element steps, in order
    #[must_use]
    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    /// Evaluate against the locals of a stack frame
    ///
    /// # Errors
    /// Returns the first failure of a step: an unknown local or member, an index error, or a
    /// step that does not apply to the value's kind.
    pub fn evaluate<'p>(&self, frame: &StackFrame<'p>) -> Result<Value<'p>> {
        let mut value = frame.local_variable_value(&self.root)?;
        for accessor in &self.accessors {
            value = match accessor {
                Accessor::Member(name) => value.get_member_value(name)?,
                Accessor::Index(indices) => value.get_array_element(indices)?,
            };
        }

        Ok(value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for accessor in &self.accessors {
            match accessor {
                Accessor::Member(name) => write!(f, ".{name}")?,
                Accessor::Index(indices) => f.write_str(&format_indices(indices))?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let expression = Expression::parse("array.Length").unwrap();
        assert_eq!(expression.root(), "array");
        assert_eq!(
            expression.accessors(),
            &[Accessor::Member("Length".to_string())]
        );

        let expression = Expression::parse(" grid [1 ,2].Values[0] ").unwrap();
        assert_eq!(
            expression.accessors(),
            &[
                Accessor::Index(vec![1, 2]),
                Accessor::Member("Values".to_string()),
                Accessor::Index(vec![0]),
            ]
        );
        assert_eq!(expression.to_string(), "grid[1, 2].Values[0]");
    }

    #[test]
    fn test_parse_errors() {
        for text in ["", "1abc", "a.", "a[", "a[]", "a[-1]", "a[1;2]", "a b", "a..b"] {
            assert!(
                matches!(Expression::parse(text), Err(Error::Expression { .. })),
                "{text} should not parse"
            );
        }
    }
}
