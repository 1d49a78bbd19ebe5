//! # Introduction
//!
//! glsl-syntax parses GLSL shader source into a structured, queryable syntax
//! tree.  The whole grammar is hand-written recursive descent over a
//! keyword-free token stream: `if`, `vec3`, and `uniform` all lex as plain
//! identifiers, and the grammar layers match them by text.
//!
//! ## Parsing pipeline
//!
//! ```text
//! Source → Lexer → Tokens + Trivia → Parser → TranslationUnit + Errors
//! ```
//!
//! 1. [`lexer`] — tokenises the source; comments, preprocessor lines, and
//!    whitespace are kept out-of-band as [`ast::Trivia`] spans that, together
//!    with the token spans, tile the input exactly.
//! 2. [`parse`] — the recursive descent driver. [`parse::parse`] never
//!    panics and never stops at the first problem: errors are collected and
//!    the parser resynchronizes at `;` / `}`, leaving explicit error nodes.
//! 3. [`ast`] — the typed tree, plus a uniform reflection surface
//!    ([`ast::NodeRef`]) exposing every node's kind, span, and named fields.
//!
//! ## Scope
//!
//! The full GLSL declaration, statement, and expression grammar: functions
//! and prototypes, init-declarator lists, interface blocks, struct and
//! precision declarations, layout/storage/interpolation qualifiers, the
//! 14-level expression precedence ladder, and constructor calls.  Semantic
//! analysis (name resolution, type checking) and preprocessor expansion are
//! out of scope; `#` lines are retained as trivia.

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parse;

mod declarations;
mod expressions;
mod statements;
mod types;

pub use ast::{NodeKind, NodeRef, SourceLocation, Span, TranslationUnit};
pub use errors::SyntaxError;
pub use parse::{parse, ParseResult};
