//! Lexical analysis: source text to a token sequence

pub mod analyzer;

use crate::config::runtime::LexicalPreferences;
use crate::tokens::Token;

pub use analyzer::{Lexer, LexerError, LexerErrorKind, LexicalMetrics};

/// Tokenize source text with default preferences
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new().tokenize(source)
}

/// Tokenize with custom runtime preferences
pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<Vec<Token>, LexerError> {
    Lexer::with_preferences(preferences).tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn test_tokenize_ends_with_single_end_of_input() {
        let tokens = tokenize("int x = 10 while x > 0 x = x - 1 end").unwrap();
        let eof_count = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::EndOfInput)
            .count();

        assert_eq!(eof_count, 1);
        assert_eq!(tokens.last().map(|t| t.offset), Some(36));
    }

    #[test]
    fn test_numeric_literals_round_trip() {
        for literal in ["0", "7", "42", "3.5", "0.25", "-12", "-0.125", "1000000"] {
            let tokens = tokenize(literal).unwrap();
            assert_eq!(tokens[0].kind, TokenKind::Number);
            let parsed: f64 = tokens[0].text.parse().unwrap();
            let expected: f64 = literal.parse().unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn test_preferences_variant() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: false,
            include_position_in_errors: false,
        };
        let tokens = tokenize_with_preferences("pow(2, 3)", preferences).unwrap();
        assert_eq!(tokens.len(), 7);
    }
}
