//! Character-level lexer for Pug source
//!
//! Single forward pass over the source's characters with one character of
//! lookahead. Offsets are character indices.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::runtime::{BuiltInFunctions, DataType};
use crate::tokens::{
    double_char_operator, keyword_kind, single_char_operator, Token, TokenClass, TokenKind,
};
use crate::utils::SourceMap;
use crate::{log_debug, log_error, log_success};

/// What went wrong during tokenization
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerErrorKind {
    #[error("String not closed")]
    UnterminatedString,

    #[error("Invalid number format: multiple dots")]
    MultipleDots,

    #[error("Invalid number format: {text}")]
    InvalidNumber { text: String },

    #[error("Unexpected character {character}")]
    UnexpectedCharacter { character: char },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("String too large: {size} characters (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

/// A fatal lexical error with the tokens produced before it, the character
/// offset where it happened and the character found there (`None` at end
/// of input).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct LexerError {
    pub kind: LexerErrorKind,
    tokens: Vec<Token>,
    position: usize,
    character: Option<char>,
}

impl LexerError {
    pub fn new(
        kind: LexerErrorKind,
        tokens: Vec<Token>,
        position: usize,
        character: Option<char>,
    ) -> Self {
        Self {
            kind,
            tokens,
            position,
            character,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn character(&self) -> Option<char> {
        self.character
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self.kind {
            LexerErrorKind::UnterminatedString => codes::lexical::UNTERMINATED_STRING,
            LexerErrorKind::MultipleDots | LexerErrorKind::InvalidNumber { .. } => {
                codes::lexical::INVALID_NUMBER
            }
            LexerErrorKind::UnexpectedCharacter { .. } => codes::lexical::UNEXPECTED_CHARACTER,
            LexerErrorKind::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerErrorKind::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerErrorKind::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Per-run lexer statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub literal_tokens: usize,
    pub name_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub keyword_tokens: usize,
    pub comment_count: usize,
    pub max_string_length: usize,
    pub max_identifier_length: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        if !preferences.collect_detailed_metrics {
            return;
        }

        match token.kind.class() {
            TokenClass::Literal => self.literal_tokens += 1,
            TokenClass::Name => self.name_tokens += 1,
            TokenClass::Operator => self.operator_tokens += 1,
            TokenClass::Punctuation => self.punctuation_tokens += 1,
            TokenClass::Keyword => self.keyword_tokens += 1,
            TokenClass::Special => {}
        }
    }
}

/// Lexer with runtime preferences and metrics from the last run
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    tokens: Vec<Token>,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl Lexer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            chars: Vec::new(),
            position: 0,
            tokens: Vec::new(),
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize source text. The result always ends with a single
    /// end-of-input token whose offset is the source length in characters.
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<Token>, LexerError> {
        self.chars = source.chars().collect();
        self.position = 0;
        self.tokens = Vec::new();
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis", "char_count" => self.chars.len());

        if let Err(error) = self.scan() {
            self.report_failure(source, &error);
            return Err(error);
        }

        self.tokens.push(Token::end_of_input(self.position));

        log_success!(
            codes::success::TOKENIZATION_COMPLETE,
            "Tokenization completed",
            "tokens" => self.metrics.total_tokens,
            "chars" => self.chars.len(),
            "comments" => self.metrics.comment_count,
            "max_string_length" => self.metrics.max_string_length
        );

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan(&mut self) -> Result<(), LexerError> {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.skip_whitespace();
                continue;
            }

            if ch == '/' && self.peek_char() == Some('/') {
                self.skip_comment();
                continue;
            }

            let token = if ch.is_alphabetic() {
                self.scan_word()?
            } else if ch == '"' {
                self.scan_string()?
            } else if ch == '=' && self.peek_char() != Some('=') {
                let offset = self.position;
                self.next_char();
                Token::new(TokenKind::Assign, "=", offset)
            } else if ch.is_ascii_digit()
                || (ch == '-' && self.peek_char().is_some_and(|c| c.is_ascii_digit()))
            {
                self.scan_number()?
            } else {
                self.scan_symbol(ch)?
            };

            self.push_token(token)?;
        }

        Ok(())
    }

    fn push_token(&mut self, token: Token) -> Result<(), LexerError> {
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            return Err(self.error_at(
                LexerErrorKind::TooManyTokens {
                    count: self.tokens.len() + 1,
                },
                token.offset,
            ));
        }
        self.metrics.record_token(&token, &self.preferences);
        self.tokens.push(token);
        Ok(())
    }

    /// Identifier, keyword, data type, built-in function name or boolean
    fn scan_word(&mut self) -> Result<Token, LexerError> {
        let offset = self.position;
        let mut word = String::new();

        while let Some(ch) = self.current_char() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            word.push(ch);
            self.next_char();
        }

        let length = self.position - offset;
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(self.error_at(LexerErrorKind::IdentifierTooLong { length }, offset));
        }
        self.metrics.max_identifier_length = self.metrics.max_identifier_length.max(length);

        let kind = if DataType::from_name(&word).is_some() {
            TokenKind::DataType
        } else if BuiltInFunctions::contains(&word) {
            TokenKind::Function
        } else if word == "true" || word == "false" {
            TokenKind::Bool
        } else if let Some(keyword) = keyword_kind(&word) {
            keyword
        } else {
            TokenKind::Identifier
        };

        Ok(Token::new(kind, word, offset))
    }

    fn scan_string(&mut self) -> Result<Token, LexerError> {
        let offset = self.position;
        self.next_char();

        let mut content = String::new();
        let mut size = 0usize;
        loop {
            match self.current_char() {
                Some('"') => break,
                Some(ch) => {
                    size += 1;
                    if size > MAX_STRING_SIZE {
                        return Err(self.error_at(LexerErrorKind::StringTooLarge { size }, offset));
                    }
                    content.push(ch);
                    self.next_char();
                }
                None => {
                    return Err(self.error_at(LexerErrorKind::UnterminatedString, self.position));
                }
            }
        }

        self.next_char();
        self.metrics.max_string_length = self.metrics.max_string_length.max(size);
        Ok(Token::new(TokenKind::String, content, offset))
    }

    fn scan_number(&mut self) -> Result<Token, LexerError> {
        let offset = self.position;
        let mut text = String::new();
        let mut has_dot = false;

        if self.current_char() == Some('-') {
            text.push('-');
            self.next_char();
        }

        while let Some(ch) = self.current_char() {
            if ch == '.' {
                if has_dot {
                    return Err(self.error_at(LexerErrorKind::MultipleDots, self.position));
                }
                has_dot = true;
            } else if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.next_char();
        }

        if has_dot && text.parse::<f64>().is_err() {
            return Err(self.error_at(LexerErrorKind::InvalidNumber { text }, offset));
        }

        Ok(Token::new(TokenKind::Number, text, offset))
    }

    fn scan_symbol(&mut self, ch: char) -> Result<Token, LexerError> {
        let offset = self.position;

        if let Some(next) = self.peek_char() {
            if let Some(kind) = double_char_operator(ch, next) {
                self.next_char();
                self.next_char();
                return Ok(Token::new(kind, format!("{}{}", ch, next), offset));
            }
        }

        match single_char_operator(ch) {
            Some(kind) => {
                self.next_char();
                Ok(Token::new(kind, ch.to_string(), offset))
            }
            None => Err(self.error_at(
                LexerErrorKind::UnexpectedCharacter { character: ch },
                offset,
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    /// Skip a `//` comment including its terminating newline
    fn skip_comment(&mut self) {
        self.metrics.comment_count += 1;
        while let Some(ch) = self.current_char() {
            self.next_char();
            if ch == '\n' {
                break;
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn next_char(&mut self) {
        if self.position < self.chars.len() {
            self.position += 1;
        }
    }

    fn error_at(&self, kind: LexerErrorKind, position: usize) -> LexerError {
        LexerError::new(
            kind,
            self.tokens.clone(),
            position,
            self.chars.get(position).copied(),
        )
    }

    fn report_failure(&self, source: &str, error: &LexerError) {
        let character = error
            .character()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "end of input".to_string());

        if self.preferences.include_position_in_errors {
            let map = SourceMap::new(source);
            let span = map.span_at(error.position(), 1);
            log_error!(error.error_code(), &error.to_string(),
                span = span,
                "character" => character,
                "tokens_processed" => error.tokens().len()
            );
        } else {
            log_error!(error.error_code(), &error.to_string(),
                "character" => character,
                "tokens_processed" => error.tokens().len()
            );
        }
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}
