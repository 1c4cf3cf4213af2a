//! Path expression parser.

use super::ast::{Axis, Expr, Function, LocationPath, NodeTest, Step};
use super::error::QueryError;

/// Parser for path expression strings.
pub struct Parser {
    input: Vec<char>,
    position: usize,
}

impl Parser {
    /// Creates a new parser for the given expression.
    pub fn new(expression: &str) -> Self {
        Self {
            input: expression.chars().collect(),
            position: 0,
        }
    }

    /// Parses an expression into a location path.
    pub fn parse(expression: &str) -> Result<LocationPath, QueryError> {
        let mut parser = Parser::new(expression);
        parser.skip_whitespace();
        if parser.is_eof() {
            return Err(QueryError::InvalidSyntax {
                message: "Expression is empty".to_string(),
            });
        }

        let path = parser.parse_location_path()?;

        parser.skip_whitespace();
        if let Some(ch) = parser.peek() {
            return Err(QueryError::UnexpectedToken {
                position: parser.position,
                found: ch.to_string(),
                expected: "'/' or end of expression".to_string(),
            });
        }
        Ok(path)
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Returns the character `offset` places ahead without advancing.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Returns the next character and advances position.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Expects a specific character and advances, or returns an error.
    fn expect(&mut self, expected: char) -> Result<(), QueryError> {
        self.skip_whitespace();
        let pos = self.position;
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(QueryError::UnexpectedToken {
                position: pos,
                found: ch.to_string(),
                expected: format!("'{}'", expected),
            }),
            None => Err(QueryError::UnexpectedEnd {
                expected: format!("'{}'", expected),
            }),
        }
    }

    fn is_name_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn is_name_char(ch: char) -> bool {
        ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':')
    }

    /// Parses an element or attribute name.
    fn parse_name(&mut self) -> Result<String, QueryError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if Self::is_name_start(ch) => {}
            Some(ch) => {
                return Err(QueryError::UnexpectedToken {
                    position: self.position,
                    found: ch.to_string(),
                    expected: "a name".to_string(),
                })
            }
            None => {
                return Err(QueryError::UnexpectedEnd {
                    expected: "a name".to_string(),
                })
            }
        }

        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if !Self::is_name_char(ch) {
                break;
            }
            name.push(ch);
            self.position += 1;
        }
        Ok(name)
    }

    /// Consumes `keyword` if it appears next as a whole word.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let len = keyword.chars().count();
        let matches = keyword
            .chars()
            .enumerate()
            .all(|(offset, ch)| self.peek_at(offset) == Some(ch));
        let boundary = !matches!(self.peek_at(len), Some(ch) if Self::is_name_char(ch));
        if matches && boundary {
            self.position += len;
            true
        } else {
            false
        }
    }

    fn starts_step(&self) -> bool {
        matches!(self.peek(), Some(ch) if ch == '.' || ch == '*' || Self::is_name_start(ch))
    }

    /// Parses `/`, `//`-separated steps. Stops before a trailing `/@attr`.
    fn parse_location_path(&mut self) -> Result<LocationPath, QueryError> {
        self.skip_whitespace();
        let mut absolute = false;
        let mut axis = Axis::Child;
        let mut steps = Vec::new();

        if self.peek() == Some('/') {
            absolute = true;
            self.next();
            if self.peek() == Some('/') {
                self.next();
                axis = Axis::Descendant;
            } else {
                self.skip_whitespace();
                if !self.starts_step() {
                    // Bare "/" selects the document itself
                    return Ok(LocationPath { absolute, steps });
                }
            }
        }

        loop {
            steps.push(self.parse_step(axis)?);
            self.skip_whitespace();
            if self.peek() != Some('/') || self.peek_at(1) == Some('@') {
                break;
            }
            self.next();
            axis = if self.peek() == Some('/') {
                self.next();
                Axis::Descendant
            } else {
                Axis::Child
            };
        }

        Ok(LocationPath { absolute, steps })
    }

    fn parse_step(&mut self, axis: Axis) -> Result<Step, QueryError> {
        const EXPECTED: &str = "a step name, '*' or '.'";
        self.skip_whitespace();

        let mut step = match self.peek() {
            Some('.') => {
                self.next();
                if self.peek() == Some('.') {
                    return Err(QueryError::InvalidSyntax {
                        message: "The parent step '..' is not supported".to_string(),
                    });
                }
                match axis {
                    Axis::Descendant => Step::new(Axis::Descendant, NodeTest::Any),
                    _ => Step::new(Axis::SelfNode, NodeTest::Any),
                }
            }
            Some('*') => {
                self.next();
                Step::new(axis, NodeTest::Wildcard)
            }
            Some('@') => {
                return Err(QueryError::InvalidSyntax {
                    message: "Attribute selection is only supported inside predicates"
                        .to_string(),
                })
            }
            Some(ch) if Self::is_name_start(ch) => {
                let name = self.parse_name()?;
                self.skip_whitespace();
                if self.peek() == Some('(') {
                    if name != "text" {
                        return Err(QueryError::InvalidSyntax {
                            message: format!("Function '{}' cannot be used as a step", name),
                        });
                    }
                    self.expect('(')?;
                    self.expect(')')?;
                    Step::new(axis, NodeTest::Text)
                } else {
                    Step::new(axis, NodeTest::Name(name))
                }
            }
            Some(ch) => {
                return Err(QueryError::UnexpectedToken {
                    position: self.position,
                    found: ch.to_string(),
                    expected: EXPECTED.to_string(),
                })
            }
            None => {
                return Err(QueryError::UnexpectedEnd {
                    expected: EXPECTED.to_string(),
                })
            }
        };

        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                break;
            }
            self.next();
            step.predicates.push(self.parse_or()?);
            self.expect(']')?;
        }

        Ok(step)
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_equality()?;
        while self.eat_keyword("and") {
            let right = self.parse_equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, QueryError> {
        let left = self.parse_primary()?;
        self.skip_whitespace();
        match (self.peek(), self.peek_at(1)) {
            (Some('='), _) => {
                self.next();
                let right = self.parse_primary()?;
                Ok(Expr::Equals(Box::new(left), Box::new(right)))
            }
            (Some('!'), Some('=')) => {
                self.position += 2;
                let right = self.parse_primary()?;
                Ok(Expr::NotEquals(Box::new(left), Box::new(right)))
            }
            _ => Ok(left),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        const EXPECTED: &str = "a value";
        self.skip_whitespace();

        match self.peek() {
            Some('\'') | Some('"') => Ok(Expr::Literal(self.parse_literal()?)),
            Some('(') => {
                self.next();
                let inner = self.parse_or()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('@') => {
                self.next();
                Ok(Expr::Attribute(self.parse_name()?))
            }
            Some('/') | Some('.') | Some('*') => self.parse_path_expr(),
            Some(ch) if Self::is_name_start(ch) => {
                let saved = self.position;
                let name = self.parse_name()?;
                self.skip_whitespace();
                if self.peek() == Some('(') && name != "text" {
                    return self.parse_call(name);
                }
                self.position = saved;
                self.parse_path_expr()
            }
            Some(ch) if ch.is_ascii_digit() || ch == '-' => Err(QueryError::InvalidSyntax {
                message: "Numeric expressions are not supported".to_string(),
            }),
            Some(ch) => Err(QueryError::UnexpectedToken {
                position: self.position,
                found: ch.to_string(),
                expected: EXPECTED.to_string(),
            }),
            None => Err(QueryError::UnexpectedEnd {
                expected: EXPECTED.to_string(),
            }),
        }
    }

    fn parse_path_expr(&mut self) -> Result<Expr, QueryError> {
        let path = self.parse_location_path()?;
        if self.peek() == Some('/') && self.peek_at(1) == Some('@') {
            self.position += 2;
            let attribute = self.parse_name()?;
            return Ok(Expr::Path(path, Some(attribute)));
        }
        Ok(Expr::Path(path, None))
    }

    /// Parses a quoted string. There are no escape sequences.
    fn parse_literal(&mut self) -> Result<String, QueryError> {
        let quote = match self.next() {
            Some(ch @ ('\'' | '"')) => ch,
            _ => {
                return Err(QueryError::InvalidSyntax {
                    message: "Expected a quoted string".to_string(),
                })
            }
        };

        let mut value = String::new();
        loop {
            match self.next() {
                Some(ch) if ch == quote => return Ok(value),
                Some(ch) => value.push(ch),
                None => {
                    return Err(QueryError::UnexpectedEnd {
                        expected: format!("closing quote {}", quote),
                    })
                }
            }
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, QueryError> {
        self.expect('(')?;
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() != Some(')') {
            loop {
                args.push(self.parse_or()?);
                self.skip_whitespace();
                if self.peek() == Some(',') {
                    self.next();
                } else {
                    break;
                }
            }
        }
        self.expect(')')?;

        let arity = match name.as_str() {
            "translate" => 3,
            "contains" => 2,
            "not" => 1,
            _ => {
                return Err(QueryError::InvalidSyntax {
                    message: format!("Unknown function '{}'", name),
                })
            }
        };
        if args.len() != arity {
            return Err(QueryError::InvalidSyntax {
                message: format!(
                    "Function '{}' expects {} argument(s), got {}",
                    name,
                    arity,
                    args.len()
                ),
            });
        }

        let mut args = args.into_iter().map(Box::new);
        let mut arg = || {
            args.next().ok_or_else(|| QueryError::InvalidSyntax {
                message: format!("Missing argument for '{}'", name),
            })
        };
        let function = match name.as_str() {
            "translate" => Function::Translate(arg()?, arg()?, arg()?),
            "contains" => Function::Contains(arg()?, arg()?),
            _ => Function::Not(arg()?),
        };
        Ok(Expr::Call(function))
    }
}
