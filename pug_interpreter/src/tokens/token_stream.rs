//! Cursor over a token sequence, used by the evaluator

use super::token::{Token, TokenKind};

/// Forward cursor with one-token lookahead and saved positions.
///
/// Reads past the end yield a synthetic end-of-input token, so callers
/// never have to handle a missing current token.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    position: usize,
    eof: Token,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let eof_offset = tokens
            .last()
            .map(|t| t.offset + t.source_len())
            .unwrap_or(0);
        Self {
            tokens,
            position: 0,
            eof: Token::end_of_input(eof_offset),
        }
    }

    pub fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Token after the current one
    pub fn peek(&self) -> &Token {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> &Token {
        self.tokens.get(self.position + n).unwrap_or(&self.eof)
    }

    /// Move to the next token, returning the one just passed
    pub fn advance(&mut self) -> &Token {
        let index = self.position;
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        self.tokens.get(index).unwrap_or(&self.eof)
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume the current token if it has the given kind
    pub fn advance_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind, or hand back the token found instead
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.current().clone())
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::EndOfInput)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Jump to a previously saved position
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Skip the body of a block without evaluating it.
    ///
    /// Advances until one of `stops` is found at nesting depth zero and
    /// leaves the cursor on it. Nested `if`/`while` blocks are skipped
    /// whole by counting their `end` tokens. Returns the stop kind found,
    /// or `None` if input ran out first.
    pub fn skip_block(&mut self, stops: &[TokenKind]) -> Option<TokenKind> {
        let mut depth = 0usize;

        loop {
            let kind = self.current_kind();
            match kind {
                TokenKind::EndOfInput => return None,
                k if k.is_block_opener() => depth += 1,
                TokenKind::End if depth > 0 => depth -= 1,
                k if depth == 0 && stops.contains(&k) => return Some(k),
                _ => {}
            }
            self.advance();
        }
    }
}
