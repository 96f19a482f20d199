use crate::config::runtime::ConfigError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax::EvalError;
use crate::tokens::Token;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("{0}")]
    Lexical(#[from] LexerError),

    #[error("{0}")]
    Evaluation(#[from] EvalError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::Lexical(e) => e.error_code(),
            Self::Evaluation(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Tokens produced before the failure
    pub fn tokens(&self) -> &[Token] {
        match self {
            Self::Lexical(e) => e.tokens(),
            Self::Evaluation(e) => e.tokens(),
            _ => &[],
        }
    }

    /// Token a front end should highlight. Lexer failures get a synthetic
    /// identifier at the failure offset holding the offending character.
    pub fn current_token(&self) -> Option<Token> {
        match self {
            Self::Lexical(e) => Some(Token::new(
                crate::tokens::TokenKind::Identifier,
                e.character().map(String::from).unwrap_or_default(),
                e.position(),
            )),
            Self::Evaluation(e) => Some(e.token().clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MemoryHost, VariableTable};
    use crate::tokens::TokenKind;

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        match error {
            PipelineError::Pipeline { ref message } => assert_eq!(message, "Test error"),
            _ => panic!("Wrong error type"),
        }
        assert_eq!(error.error_code(), codes::system::INTERNAL_ERROR);
        assert!(error.current_token().is_none());
    }

    #[test]
    fn test_lexical_error_current_token() {
        let error: PipelineError = crate::lexical::tokenize("int x = 1 @").unwrap_err().into();

        assert_eq!(error.to_string(), "Unexpected character @");
        assert_eq!(error.tokens().len(), 4);
        let token = error.current_token().unwrap();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.text, "@");
        assert_eq!(token.offset, 10);
    }

    #[test]
    fn test_evaluation_error_current_token() {
        let tokens = crate::lexical::tokenize("1 + xpto").unwrap();
        let mut variables = VariableTable::new();
        let mut host = MemoryHost::new();
        let error: PipelineError = crate::syntax::evaluate(&mut variables, &tokens, &mut host)
            .unwrap_err()
            .into();

        assert_eq!(error.to_string(), "Unknown identifier: xpto");
        assert_eq!(error.error_code(), codes::evaluation::UNKNOWN_IDENTIFIER);
        assert_eq!(error.current_token().unwrap().text, "xpto");
    }
}
