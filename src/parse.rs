//! Main parser coordinator.
//!
//! This module provides the [`Parser`] struct and core infrastructure: the
//! token cursor, the shared helper methods, error collection with
//! resynchronization, and the translation-unit driver behind [`parse`].
//!
//! # Parser architecture
//!
//! Recursive descent, with the grammar split across `impl Parser` blocks:
//! - this module: cursor, helpers, recovery, and the driver loop
//! - `expressions`: precedence climbing over the operator table
//! - `types`: type qualifiers, type specifiers, struct bodies
//! - `declarations`: external declarations and functions
//! - `statements`: all statement forms
//!
//! A failed construct is reported into the error list and the cursor
//! resynchronizes at the next `;` or balancing `}`, so one pass collects
//! every error in a file rather than stopping at the first.

use crate::ast::{
    ExternalDeclaration, Identifier, SourceLocation, Span, TranslationUnit, Trivia,
};
use crate::errors::SyntaxError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::types::{primitive_type_name, qualifier_start_text};

/// Outcome of a full parse: the root tree, out-of-band trivia ranges, and
/// every error discovered. A parse with an empty error list contains no
/// error nodes.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub root: TranslationUnit,
    pub trivia: Vec<Trivia>,
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse one GLSL source buffer to completion.
///
/// Purely functional over its input: no I/O, no shared state. Independent
/// parses may run concurrently with zero coordination.
pub fn parse(source: &str) -> ParseResult {
    let lexed = Lexer::new(source).tokenize();
    let mut parser = Parser {
        tokens: lexed.tokens,
        position: 0,
        errors: lexed.errors,
    };
    let root = parser.parse_translation_unit(source.len());
    ParseResult {
        root,
        trivia: lexed.trivia,
        errors: parser.errors,
    }
}

/// Recursive descent parser over the token stream.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) errors: Vec<SyntaxError>,
}

impl Parser {
    /// Top-level loop: external declarations until the input is exhausted.
    pub(crate) fn parse_translation_unit(&mut self, source_len: usize) -> TranslationUnit {
        let mut declarations = Vec::new();

        while !self.is_at_end() {
            if let TokenKind::Error(_) = self.peek().kind {
                // already reported by the lexer
                self.advance();
                continue;
            }

            let start = self.peek().span.start;
            match self.parse_external_declaration() {
                Ok(decl) => declarations.push(decl),
                Err(err) => {
                    self.errors.push(err);
                    let end = self.resynchronize(false);
                    declarations.push(ExternalDeclaration::Error {
                        span: Span::new(start, end.max(start)),
                    });
                }
            }
        }

        TranslationUnit {
            declarations,
            span: Span::new(0, source_len),
        }
    }

    /// Skip tokens until a plausible construct boundary: past the next `;`
    /// at bracket depth zero, up to (not past, when `stop_before_rbrace`) a
    /// balancing `}`, or up to a token that can begin a new declaration or
    /// statement, so a missing `;` does not swallow the construct after it.
    /// Returns the byte offset where recovery stopped.
    pub(crate) fn resynchronize(&mut self, stop_before_rbrace: bool) -> usize {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match &self.peek().kind {
                TokenKind::Semicolon if depth == 0 => {
                    let end = self.peek().span.end;
                    self.advance();
                    return end;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        let span = self.peek().span;
                        if stop_before_rbrace {
                            return span.start;
                        }
                        self.advance();
                        return span.end;
                    }
                    depth -= 1;
                }
                _ if depth == 0 && self.at_construct_start() => {
                    return self.peek().span.start;
                }
                _ => {}
            }
            self.advance();
        }
        self.previous_span().end
    }

    /// Identifiers that can begin a declaration or statement. Plain
    /// identifiers are excluded: a user-defined type name only reveals
    /// itself in context and would cut recovery short on ordinary
    /// expression junk.
    fn at_construct_start(&self) -> bool {
        match self.ident_text() {
            Some(text) => {
                matches!(
                    text,
                    "if" | "switch"
                        | "case"
                        | "default"
                        | "while"
                        | "do"
                        | "for"
                        | "continue"
                        | "break"
                        | "return"
                        | "discard"
                        | "struct"
                        | "precision"
                ) || primitive_type_name(text).is_some()
                    || qualifier_start_text(text)
            }
            None => false,
        }
    }

    /// Map an at-EOF failure to `Unterminated`, pointing at the delimiter
    /// opened at `open_location`. Failures before EOF pass through.
    pub(crate) fn unterminated_if_eof(
        &self,
        err: SyntaxError,
        construct: &'static str,
        open_location: SourceLocation,
    ) -> SyntaxError {
        if self.is_at_end() {
            SyntaxError::Unterminated {
                construct,
                location: open_location,
            }
        } else {
            err
        }
    }

    // ===== Cursor helpers =====

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.position].kind
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.position + n).map(|t| &t.kind)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), SyntaxError> {
        if self.match_kind(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Build an `UnexpectedToken` error at the current position.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            found: self.peek().to_string(),
            expected: expected.to_string(),
            location: self.current_location(),
        }
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.previous().span
    }

    /// Span from `start` through the end of the last consumed token.
    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous_span().end.max(start))
    }

    // ===== Identifier/keyword helpers =====
    //
    // The lexer reserves nothing, so `if`, `vec3`, and `uniform` arrive as
    // identifier tokens and are matched by text here.

    pub(crate) fn ident_text(&self) -> Option<&str> {
        match self.peek_kind() {
            TokenKind::Ident(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.ident_text() == Some(keyword)
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<(), SyntaxError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", keyword)))
        }
    }

    pub(crate) fn expect_identifier(&mut self, expected: &str) -> Result<Identifier, SyntaxError> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.current_span();
                self.advance();
                Ok(Identifier { name, span })
            }
            _ => Err(self.unexpected(expected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Declaration;

    #[test]
    fn test_empty_source() {
        let result = parse("");
        assert!(result.is_ok());
        assert!(result.root.declarations.is_empty());
    }

    #[test]
    fn test_clean_parse_has_no_error_nodes() {
        let result = parse("uniform vec3 color;\nvoid main() { }\n");
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        assert_eq!(result.root.declarations.len(), 2);
        assert!(!result
            .root
            .declarations
            .iter()
            .any(|d| matches!(d, ExternalDeclaration::Error { .. })));
    }

    #[test]
    fn test_root_span_covers_input() {
        let source = "  void main() { }  ";
        let result = parse(source);
        assert_eq!(result.root.span, Span::new(0, source.len()));
    }

    #[test]
    fn test_recovery_keeps_parsing() {
        // missing semicolon in the middle declaration
        let source = "float a = 1.0;\nfloat b = 2.0\nfloat c = 3.0;";
        let result = parse(source);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0],
            SyntaxError::UnexpectedToken { .. }
        ));
        // both neighbors survive intact around one error node
        assert_eq!(result.root.declarations.len(), 3);
        assert!(matches!(
            result.root.declarations[0],
            ExternalDeclaration::Declaration(Declaration::InitDeclaratorList { .. })
        ));
        assert!(matches!(
            result.root.declarations[1],
            ExternalDeclaration::Error { .. }
        ));
        let ExternalDeclaration::Declaration(Declaration::InitDeclaratorList {
            declarators, ..
        }) = &result.root.declarations[2]
        else {
            panic!("expected the trailing declaration to survive");
        };
        assert_eq!(declarators[0].declarator.name.name, "c");
    }

    #[test]
    fn test_error_spans_are_recorded() {
        let source = "float = ;";
        let result = parse(source);
        assert!(!result.errors.is_empty());
        let err_node = result
            .root
            .declarations
            .iter()
            .find_map(|d| match d {
                ExternalDeclaration::Error { span } => Some(*span),
                _ => None,
            })
            .expect("expected an error node");
        assert!(result.root.span.contains(err_node));
    }
}
