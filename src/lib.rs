//! # Talon Compiler Front End
//!
//! The parser front end for the Talon scripting language.
//!
//! Talon is a C-family scripting language of the Pawn lineage. Two
//! declaration syntaxes coexist in it, a legacy `tag:` prefix form and a
//! C-like type-prefix form, and the parser resolves the resulting
//! ambiguities with bounded look-ahead while building a typed,
//! position-annotated AST for the later name binding, type checking, and
//! emission phases.
//!
//! ## Pipeline
//!
//! ```text
//! Source -> Lexer -> Parser -> AST -> Name Binding -> Type Check -> Emit
//! ```
//!
//! This crate covers the first three stages. The AST is pure data: nodes
//! live in an append-only pool and refer to each other by index, so later
//! passes walk the tree without touching the parser.
//!
//! ## Quick Start
//!
//! ```rust
//! use talonc::Parser;
//!
//! let source = r#"
//! enum Color { Red, Green, Blue }
//!
//! int clamp(int v, int lo, int hi) {
//!     if (v < lo) return lo;
//!     if (v > hi) return hi;
//!     return v;
//! }
//! "#;
//!
//! let mut parser = Parser::new(source);
//! match parser.parse_program() {
//!     Ok(tree) => {
//!         assert_eq!(tree.decls.len(), 2);
//!     }
//!     Err(errors) => {
//!         for error in errors {
//!             eprintln!("{}", error);
//!         }
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! The parser reports numbered diagnostics into a sink and keeps going;
//! recovery is local (skip to the next terminator or line end). Use
//! [`DiagnosticEmitter`] to render them with source snippets:
//!
//! ```rust
//! use talonc::{DiagnosticEmitter, Parser};
//!
//! let source = "int x = ;";
//! let mut parser = Parser::new(source);
//!
//! if let Err(errors) = parser.parse_program() {
//!     let emitter = DiagnosticEmitter::new("example.tl", source);
//!     emitter.emit_all(&errors);
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`ast`] - AST node types and the node pool
//! - [`const_eval`] - compile-time constant expression evaluation
//! - [`diagnostics`] - numbered diagnostics and rendering
//! - [`lexer`] - tokenization
//! - [`parser`] - the recursive descent parser
//! - [`span`] - source location tracking
//! - [`types`] - the type tag table

pub mod ast;
pub mod const_eval;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod types;

// Re-export commonly used types.
pub use ast::{Ast, ExprId, StmtId, Symbol};
pub use diagnostics::{Diagnostic, DiagnosticEmitter, DiagnosticKind, ErrorCode};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseOptions, ParseTree, Parser, TerminatorPolicy};
pub use span::{Span, Spanned};
pub use types::{Tag, TagTable};
