//! Parser for arithmetic expressions
//!
//! Implements a recursive descent parser over the grammar
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := NUMBER | '(' expression ')'
//! ```
//!
//! Operators at the same level fold to the left, so `1 - 2 - 3` parses as
//! `(1 - 2) - 3`. The whole token sequence must be consumed: anything left
//! after a complete expression is reported as trailing input.

use crate::calculator::ast::{BinaryOperator, Expression};
use crate::calculator::lexer::{Token, tokenize};
use crate::error::ParseError;

/// Maximum parenthesis nesting accepted before parsing is aborted
pub const MAX_NESTING_DEPTH: usize = 256;

const ADDITIVE: [BinaryOperator; 2] = [BinaryOperator::Add, BinaryOperator::Subtract];
const MULTIPLICATIVE: [BinaryOperator; 2] = [BinaryOperator::Multiply, BinaryOperator::Divide];

/// Recursive descent parser over a borrowed token sequence
///
/// Each parser owns its own cursor, so independent parses never share state.
pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, position: 0, nesting: 0 }
    }

    /// Parse the complete token sequence into an expression tree
    pub fn parse(mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_expression()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::TrailingInput { token: token.to_string() });
        }

        Ok(expr)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consume the next token if it is one of the accepted operators
    fn next_operator(&mut self, accepted: &[BinaryOperator]) -> Option<BinaryOperator> {
        let operator = self.peek().and_then(|token| BinaryOperator::try_from(token).ok())?;

        if accepted.contains(&operator) {
            self.position += 1;
            Some(operator)
        } else {
            None
        }
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_term()?;

        while let Some(operator) = self.next_operator(&ADDITIVE) {
            let right = self.parse_term()?;
            expr = Expression::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_factor()?;

        while let Some(operator) = self.next_operator(&MULTIPLICATIVE) {
            let right = self.parse_factor()?;
            expr = Expression::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expression, ParseError> {
        match self.advance() {
            None => Err(ParseError::UnexpectedEnd),
            Some(Token::LeftParen) => self.parse_group(),
            Some(Token::Number(text)) => text
                .parse::<f64>()
                .map(Expression::number)
                .map_err(|_| ParseError::InvalidNumber { token: text.clone() }),
            Some(other) => Err(ParseError::UnexpectedToken { token: other.to_string() }),
        }
    }

    /// Parse the inside of a group whose `(` was just consumed
    fn parse_group(&mut self) -> Result<Expression, ParseError> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep { limit: MAX_NESTING_DEPTH });
        }

        self.nesting += 1;
        let inner = self.parse_expression()?;
        self.nesting -= 1;

        match self.peek() {
            Some(Token::RightParen) => {
                self.position += 1;
                Ok(inner)
            }
            _ => Err(ParseError::ExpectedCloseParen),
        }
    }
}

/// Parse an already tokenized expression
pub fn parse(tokens: &[Token]) -> Result<Expression, ParseError> {
    Parser::new(tokens).parse()
}

/// Tokenize and parse an expression string
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    let tokens = tokenize(source);
    parse(&tokens)
}
