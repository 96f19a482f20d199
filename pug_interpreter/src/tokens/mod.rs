//! Token system for Pug source
//!
//! The lexer produces a flat `Vec<Token>` terminated by an end-of-input
//! token. The evaluator walks it with a `TokenStream` cursor, which also
//! owns the depth-tracked block skipping used by `if`/`else`/`while`.

pub mod token;
pub mod token_stream;

pub use token::{
    double_char_operator, keyword_kind, single_char_operator, Token, TokenClass, TokenKind,
};
pub use token_stream::TokenStream;
