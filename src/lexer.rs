//! Lexer (tokenizer) for GLSL source text.
//!
//! Converts raw source into a flat [`Token`] stream consumed by the parser,
//! plus out-of-band [`Trivia`] ranges (comments, preprocessor lines,
//! whitespace) kept for round-trip fidelity. Preprocessor directives are
//! recognized lexically as one opaque line each and never interpreted.
//!
//! There are no keywords at this level: `if`, `vec3`, and `uniform` all lex
//! as identifiers, and the grammar layers match them by text. This avoids
//! reserving the ~110-name builtin type vocabulary and lets user code shadow
//! builtin names where that is legal.

use crate::ast::{FloatSuffix, NumberKind, SourceLocation, Span, Trivia, TriviaKind};
use crate::errors::SyntaxError;
use std::fmt;

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number { raw: String, kind: NumberKind },

    // Punctuation
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Semicolon,
    Comma,
    Dot,
    Question,
    Colon,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Update
    PlusPlus,   // ++
    MinusMinus, // --

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    Shl,   // <<
    Shr,   // >>

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    ShlEq,     // <<=
    ShrEq,     // >>=
    AmpEq,     // &=
    CaretEq,   // ^=
    PipeEq,    // |=

    /// An unrecognized character; the lexer records the error and resumes.
    Error(char),

    Eof,
}

/// One token: classification plus its byte span and line/column position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub location: SourceLocation,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Number { raw, .. } => write!(f, "number '{}'", raw),
            TokenKind::Error(c) => write!(f, "character {:?}", c),
            TokenKind::Eof => write!(f, "end of file"),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

impl TokenKind {
    /// Literal spelling of fixed tokens; empty for the variable-text kinds.
    pub fn text(&self) -> &'static str {
        match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::ShlEq => "<<=",
            TokenKind::ShrEq => ">>=",
            TokenKind::AmpEq => "&=",
            TokenKind::CaretEq => "^=",
            TokenKind::PipeEq => "|=",
            TokenKind::Ident(_) | TokenKind::Number { .. } | TokenKind::Error(_) | TokenKind::Eof => {
                ""
            }
        }
    }
}

/// Everything the lexer produces in one pass.
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub trivia: Vec<Trivia>,
    pub errors: Vec<SyntaxError>,
}

/// Lexer for GLSL source text.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    byte_pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            byte_pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. Never fails: unrecognized characters
    /// become [`TokenKind::Error`] tokens plus recorded errors.
    pub fn tokenize(mut self) -> LexOutput {
        let mut out = LexOutput::default();

        loop {
            self.scan_trivia(&mut out);

            if self.is_at_end() {
                out.tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(self.byte_pos, self.byte_pos),
                    location: self.current_location(),
                });
                break;
            }

            let token = self.next_token(&mut out.errors);
            out.tokens.push(token);
        }

        out
    }

    fn next_token(&mut self, errors: &mut Vec<SyntaxError>) -> Token {
        let start = self.byte_pos;
        let location = self.current_location();
        // scan_trivia guarantees a character is available here
        let ch = self.advance().unwrap_or('\0');

        let kind = match ch {
            '0'..='9' => self.number(ch),
            '.' => {
                if matches!(self.peek(), Some('0'..='9')) {
                    self.number(ch)
                } else {
                    TokenKind::Dot
                }
            }
            'a'..='z' | 'A'..='Z' | '_' => self.identifier(ch),

            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                // comments were consumed as trivia before this point
                if self.eat('=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            // longest match first: <<= before << before <=
            '<' => {
                if self.peek() == Some('<') {
                    self.advance();
                    if self.eat('=') {
                        TokenKind::ShlEq
                    } else {
                        TokenKind::Shl
                    }
                } else if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('>') {
                    self.advance();
                    if self.eat('=') {
                        TokenKind::ShrEq
                    } else {
                        TokenKind::Shr
                    }
                } else if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else if self.eat('=') {
                    TokenKind::AmpEq
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else if self.eat('=') {
                    TokenKind::PipeEq
                } else {
                    TokenKind::Pipe
                }
            }
            '^' => {
                if self.eat('=') {
                    TokenKind::CaretEq
                } else {
                    TokenKind::Caret
                }
            }

            other => {
                errors.push(SyntaxError::Lexical {
                    found: other,
                    location,
                });
                TokenKind::Error(other)
            }
        };

        Token {
            kind,
            span: Span::new(start, self.byte_pos),
            location,
        }
    }

    /// Numeric literal starting with `first` (a digit, or `.` with a digit
    /// following). Dispatch is most-specific-first: hex prefix before octal,
    /// digit-dot before decimal integer.
    fn number(&mut self, first: char) -> TokenKind {
        let mut raw = String::new();
        raw.push(first);

        if first == '.' {
            self.digits(&mut raw);
            let (exponent, suffix) = self.float_tail(&mut raw);
            return TokenKind::Number {
                raw,
                kind: NumberKind::Float { exponent, suffix },
            };
        }

        // `0x` with no digit after it is not a hex literal; leave the `x`
        // for the identifier scanner.
        if first == '0'
            && matches!(self.peek(), Some('x') | Some('X'))
            && matches!(self.peek_ahead(1), Some(c) if c.is_ascii_hexdigit())
        {
            raw.push(self.advance().unwrap_or('x'));
            while let Some(ch) = self.peek() {
                if ch.is_ascii_hexdigit() {
                    raw.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            let unsigned = self.unsigned_suffix(&mut raw);
            return TokenKind::Number {
                raw,
                kind: NumberKind::Hex { unsigned },
            };
        }

        self.digits(&mut raw);

        if self.peek() == Some('.') {
            raw.push('.');
            self.advance();
            self.digits(&mut raw);
            let (exponent, suffix) = self.float_tail(&mut raw);
            return TokenKind::Number {
                raw,
                kind: NumberKind::Float { exponent, suffix },
            };
        }

        let unsigned = self.unsigned_suffix(&mut raw);
        let kind = if first == '0' {
            NumberKind::Octal { unsigned }
        } else {
            NumberKind::Decimal { unsigned }
        };
        TokenKind::Number { raw, kind }
    }

    fn digits(&mut self, raw: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                raw.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Optional exponent and `f`/`lf` suffix after the fractional part.
    fn float_tail(&mut self, raw: &mut String) -> (bool, Option<FloatSuffix>) {
        let mut exponent = false;
        if matches!(self.peek(), Some('e') | Some('E')) {
            // exponent requires at least one digit, optionally signed
            let digit_at = |c: Option<char>| matches!(c, Some(d) if d.is_ascii_digit());
            let signed = matches!(self.peek_ahead(1), Some('+') | Some('-'));
            let ok = if signed {
                digit_at(self.peek_ahead(2))
            } else {
                digit_at(self.peek_ahead(1))
            };
            if ok {
                exponent = true;
                raw.push(self.advance().unwrap_or('e'));
                if signed {
                    raw.push(self.advance().unwrap_or('+'));
                }
                self.digits(raw);
            }
        }

        let suffix = if matches!(self.peek(), Some('l') | Some('L'))
            && matches!(self.peek_ahead(1), Some('f') | Some('F'))
        {
            raw.push(self.advance().unwrap_or('l'));
            raw.push(self.advance().unwrap_or('f'));
            Some(FloatSuffix::Lf)
        } else if matches!(self.peek(), Some('f') | Some('F')) {
            raw.push(self.advance().unwrap_or('f'));
            Some(FloatSuffix::F)
        } else {
            None
        };

        (exponent, suffix)
    }

    fn unsigned_suffix(&mut self, raw: &mut String) -> bool {
        if matches!(self.peek(), Some('u') | Some('U')) {
            raw.push(self.advance().unwrap_or('u'));
            true
        } else {
            false
        }
    }

    fn identifier(&mut self, first: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Ident(ident)
    }

    /// Consume whitespace, comments, and preprocessor lines, recording each
    /// run as a trivia range.
    fn scan_trivia(&mut self, out: &mut LexOutput) {
        loop {
            let start = self.byte_pos;
            match self.peek() {
                Some(' ') | Some('\t') | Some('\x0b') | Some('\x0c') | Some('\r') | Some('\n') => {
                    while matches!(
                        self.peek(),
                        Some(' ') | Some('\t') | Some('\x0b') | Some('\x0c') | Some('\r') | Some('\n')
                    ) {
                        self.advance();
                    }
                    out.trivia.push(Trivia {
                        kind: TriviaKind::Whitespace,
                        span: Span::new(start, self.byte_pos),
                    });
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    self.line_comment();
                    out.trivia.push(Trivia {
                        kind: TriviaKind::LineComment,
                        span: Span::new(start, self.byte_pos),
                    });
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    let location = self.current_location();
                    if !self.block_comment() {
                        out.errors.push(SyntaxError::Unterminated {
                            construct: "block comment",
                            location,
                        });
                    }
                    out.trivia.push(Trivia {
                        kind: TriviaKind::BlockComment,
                        span: Span::new(start, self.byte_pos),
                    });
                }
                Some('#') => {
                    // opaque directive line, no macro interpretation
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    out.trivia.push(Trivia {
                        kind: TriviaKind::Preprocessor,
                        span: Span::new(start, self.byte_pos),
                    });
                }
                _ => break,
            }
        }
    }

    /// `//` to end of line, honoring trailing-`\` line continuation.
    fn line_comment(&mut self) {
        self.advance(); // '/'
        self.advance(); // '/'

        let mut last = '\0';
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                if last == '\\' {
                    // continuation: the newline belongs to the comment
                    self.advance();
                    last = '\0';
                    continue;
                }
                break;
            }
            last = ch;
            self.advance();
        }
    }

    /// `/* ... */`; returns false when the comment never closes (the rest
    /// of the input is consumed).
    fn block_comment(&mut self) -> bool {
        self.advance(); // '/'
        self.advance(); // '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return true;
            }
            self.advance();
        }
        false
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Consume the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;
        self.byte_pos += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
