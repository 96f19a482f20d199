//! Token kinds and the immutable `Token` produced by the lexer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every lexical category the lexer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    EndOfInput,

    // Literals
    Number,
    Bool,
    String,

    // Names
    Identifier,
    DataType,
    Function,

    Assign,

    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,

    // Comparison
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,

    // Logical
    And,
    Or,

    // Punctuation
    OpenParenthesis,
    CloseParenthesis,
    Comma,

    // Control flow
    If,
    Else,
    End,
    While,
}

/// Coarse grouping used for lexer metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Literal,
    Name,
    Operator,
    Punctuation,
    Keyword,
    Special,
}

impl TokenKind {
    /// Variant name, as used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::EndOfInput => "EndOfInput",
            Self::Number => "Number",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Identifier => "Identifier",
            Self::DataType => "DataType",
            Self::Function => "Function",
            Self::Assign => "Assign",
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Remainder => "Remainder",
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::Greater => "Greater",
            Self::GreaterOrEqual => "GreaterOrEqual",
            Self::Less => "Less",
            Self::LessOrEqual => "LessOrEqual",
            Self::And => "And",
            Self::Or => "Or",
            Self::OpenParenthesis => "OpenParenthesis",
            Self::CloseParenthesis => "CloseParenthesis",
            Self::Comma => "Comma",
            Self::If => "If",
            Self::Else => "Else",
            Self::End => "End",
            Self::While => "While",
        }
    }

    pub fn class(&self) -> TokenClass {
        match self {
            Self::Number | Self::Bool | Self::String => TokenClass::Literal,
            Self::Identifier | Self::DataType | Self::Function => TokenClass::Name,
            Self::Assign
            | Self::Plus
            | Self::Minus
            | Self::Multiply
            | Self::Divide
            | Self::Remainder
            | Self::Equal
            | Self::NotEqual
            | Self::Greater
            | Self::GreaterOrEqual
            | Self::Less
            | Self::LessOrEqual
            | Self::And
            | Self::Or => TokenClass::Operator,
            Self::OpenParenthesis | Self::CloseParenthesis | Self::Comma => {
                TokenClass::Punctuation
            }
            Self::If | Self::Else | Self::End | Self::While => TokenClass::Keyword,
            Self::EndOfInput => TokenClass::Special,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Greater
                | Self::GreaterOrEqual
                | Self::Less
                | Self::LessOrEqual
        )
    }

    /// Keywords that open a block closed by `end`
    pub fn is_block_opener(&self) -> bool {
        matches!(self, Self::If | Self::While)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a keyword spelling. `then` and `for` are deliberately absent.
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    match word {
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "end" => Some(TokenKind::End),
        "while" => Some(TokenKind::While),
        _ => None,
    }
}

/// Classify one of the two-character operators
pub fn double_char_operator(first: char, second: char) -> Option<TokenKind> {
    match (first, second) {
        ('&', '&') => Some(TokenKind::And),
        ('|', '|') => Some(TokenKind::Or),
        ('=', '=') => Some(TokenKind::Equal),
        ('!', '=') => Some(TokenKind::NotEqual),
        ('>', '=') => Some(TokenKind::GreaterOrEqual),
        ('<', '=') => Some(TokenKind::LessOrEqual),
        _ => None,
    }
}

/// Classify a single-character operator or punctuation mark
pub fn single_char_operator(ch: char) -> Option<TokenKind> {
    match ch {
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Multiply),
        '/' => Some(TokenKind::Divide),
        '%' => Some(TokenKind::Remainder),
        '(' => Some(TokenKind::OpenParenthesis),
        ')' => Some(TokenKind::CloseParenthesis),
        ',' => Some(TokenKind::Comma),
        '>' => Some(TokenKind::Greater),
        '<' => Some(TokenKind::Less),
        _ => None,
    }
}

/// One lexical unit: kind, literal text and character offset in the source.
///
/// String tokens hold their content without the surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    pub fn end_of_input(offset: usize) -> Self {
        Self::new(TokenKind::EndOfInput, "", offset)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Length of the token's source text in characters. String tokens
    /// include their quotes.
    pub fn source_len(&self) -> usize {
        let len = self.text.chars().count();
        if self.kind == TokenKind::String {
            len + 2
        } else {
            len
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "{} @{}", self.kind, self.offset),
            TokenKind::String => write!(f, "{} \"{}\" @{}", self.kind, self.text, self.offset),
            _ => write!(f, "{} '{}' @{}", self.kind, self.text, self.offset),
        }
    }
}
