//! Lexer for arithmetic expressions
//!
//! The lexer never fails. Anything that is not whitespace, a parenthesis or
//! one of the four operators is folded into a literal candidate, and the
//! parser decides later whether that candidate is a valid number.

use std::fmt;

/// Token types recognized by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal candidate, kept as raw source text
    Number(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,

    // Delimiters
    LeftParen,
    RightParen,
}

impl Token {
    /// Map a single delimiter character to its token
    fn delimiter(ch: char) -> Option<Token> {
        match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(text) => write!(f, "{text}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

/// Lexer for tokenizing arithmetic expressions
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self { input: chars, position: 0, current_char }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Accumulate characters up to the next whitespace or delimiter
    fn read_literal(&mut self) -> Token {
        let mut literal = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_whitespace() || Token::delimiter(ch).is_some() {
                break;
            }
            literal.push(ch);
            self.advance();
        }

        Token::Number(literal)
    }

    /// Produce the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();

        let ch = self.current_char?;
        match Token::delimiter(ch) {
            Some(token) => {
                self.advance();
                Some(token)
            }
            None => Some(self.read_literal()),
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Split an expression into its token sequence
pub fn tokenize(expression: &str) -> Vec<Token> {
    Lexer::new(expression).collect()
}
