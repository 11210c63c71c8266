//! Parser for Talon.
//!
//! This module implements a hand-written recursive descent parser for the
//! Talon scripting language. Talon descends from the Pawn family, which
//! leaves the grammar with two coexisting declaration syntaxes (the legacy
//! `tag:` prefix form and the C-like type-prefix form), optional statement
//! terminators, and a handful of places where a bare identifier can open
//! either a declaration or an expression. The parser resolves these with
//! bounded look-ahead and token push-back rather than a wider grammar.
//!
//! # Parser Architecture
//!
//! The grammar is split across several submodules:
//!
//! - `expr` - the tiered operator-precedence expression grammar
//! - `stmt` - statements and control flow
//! - `decl` - declarator parsing for both declaration styles
//! - `item` - top-level declarations
//!
//! The token adapter lives here: a pushback stack over the lexer with
//! `peek`/`try_match`/`expect` primitives, statement terminator handling,
//! and the folding of `ident:` pairs into tag labels when the grammar
//! permits them.
//!
//! Top-level declarations are handed to the caller in source order, each
//! one delivered before the next is parsed (see
//! [`Parser::parse_program_with`]); later declarations may depend on names
//! the caller has resolved from earlier ones.
//!
//! # Example
//!
//! ```rust
//! use talonc::Parser;
//!
//! let mut parser = Parser::new("int answer = 41 + 1;");
//! let tree = parser.parse_program().expect("parse failed");
//! assert_eq!(tree.decls.len(), 1);
//! ```
//!
//! # Error Recovery
//!
//! Errors are appended to a diagnostic sink and parsing continues at the
//! nearest plausible point: the next terminator, closing brace, or line
//! end. At most one error is reported per statement. The parser never
//! guesses intent; where a node is required after an unrecoverable
//! mismatch it produces an explicit error node.

mod decl;
mod expr;
mod item;
mod stmt;

#[cfg(test)]
mod tests;

use crate::ast::{Ast, Cell, StmtId};
use crate::const_eval;
use crate::diagnostics::{Diagnostic, DiagnosticKind, ErrorCode, EvalError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::{Span, Spanned};
use crate::types::{Tag, TagTable};
use serde::{Deserialize, Serialize};
use string_interner::DefaultStringInterner;

use crate::ast::Symbol;

/// Per-construct statement terminator policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorPolicy {
    /// Only a semicolon terminates.
    Semicolon,
    /// A semicolon or the end of the line terminates.
    NewlineOrSemicolon,
}

/// Translation-unit options that affect parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Require `;` to terminate statements. When false, a line break
    /// terminates as well.
    pub need_semicolon: bool,
    /// Diagnose legacy tag-prefix declarations and casts.
    pub require_newdecls: bool,
    /// Tab size for the loose-indentation warning; 0 disables the check.
    pub tab_size: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            need_semicolon: false,
            require_newdecls: false,
            tab_size: 8,
        }
    }
}

/// The scoped parser flags. Every mutation goes through a `with_*` helper
/// that restores the previous value when the production returns, so the bag
/// always equals its entry value after any production.
#[derive(Debug, Clone, Copy)]
struct ParserFlags {
    /// `break`/`continue` are legal here.
    in_loop: bool,
    /// Inside a condition expression; `=` draws a warning.
    in_test: bool,
    /// `ident:` may fold into a tag label here.
    allow_tags: bool,
    /// Report at most one error per statement.
    one_error_per_statement: bool,
}

impl Default for ParserFlags {
    fn default() -> Self {
        Self {
            in_loop: false,
            in_test: false,
            allow_tags: true,
            one_error_per_statement: false,
        }
    }
}

/// The parsed output of one translation unit: the node pool plus the
/// top-level declarations in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    pub ast: Ast,
    pub decls: Vec<StmtId>,
}

/// The Talon parser.
pub struct Parser<'src> {
    /// The source text (for extracting lexemes).
    source: &'src str,
    /// The lexer producing raw tokens.
    lexer: Lexer<'src>,
    /// One-token raw lookahead used by label folding.
    raw_peeked: Option<Token>,
    /// Push-back stack; the declaration disambiguation needs depth two.
    pushed: Vec<Token>,
    /// Most recently consumed token.
    prev: Token,
    /// The token consumed before `prev`, so a push-back can rewind.
    prev2: Token,
    /// Identifier interner.
    interner: DefaultStringInterner,
    /// The tag table.
    pub(crate) tags: TagTable,
    /// The node pool under construction.
    pub(crate) ast: Ast,
    /// Accumulated diagnostics, errors and warnings both.
    errors: Vec<Diagnostic>,
    options: ParseOptions,
    flags: ParserFlags,
    /// An error has already been reported for the current statement.
    stmt_error: bool,
}

impl<'src> Parser<'src> {
    /// Create a parser with default options.
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: &'src str, options: ParseOptions) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            raw_peeked: None,
            pushed: Vec::new(),
            prev: Token::dummy(TokenKind::Error),
            prev2: Token::dummy(TokenKind::Error),
            interner: DefaultStringInterner::new(),
            tags: TagTable::new(),
            ast: Ast::new(),
            errors: Vec::new(),
            options,
            flags: ParserFlags::default(),
            stmt_error: false,
        }
    }

    /// Parse a complete translation unit.
    #[must_use = "parsing has no effect if the result is not used"]
    pub fn parse_program(&mut self) -> Result<ParseTree, Vec<Diagnostic>> {
        self.parse_program_with(&mut |_, _| {})
    }

    /// Parse a complete translation unit, invoking `process` on each
    /// top-level declaration as soon as it is parsed and before parsing
    /// resumes. Callers that bind names incrementally rely on this
    /// ordering.
    pub fn parse_program_with(
        &mut self,
        process: &mut dyn FnMut(&Ast, StmtId),
    ) -> Result<ParseTree, Vec<Diagnostic>> {
        let mut decls = Vec::new();

        self.with_one_error_per_statement(true, |p| {
            while !p.peek(TokenKind::Eof) {
                p.stmt_error = false;

                let tok = p.next_token();
                let decl = match tok.kind {
                    TokenKind::Ident
                    | TokenKind::Int
                    | TokenKind::Object
                    | TokenKind::Char
                    | TokenKind::Void
                    | TokenKind::Label
                    | TokenKind::Operator => {
                        p.push_back(tok);
                        p.parse_unknown_decl(tok)
                    }
                    TokenKind::New
                    | TokenKind::Static
                    | TokenKind::Public
                    | TokenKind::Stock
                    | TokenKind::Native
                    | TokenKind::Forward => p.parse_unknown_decl(tok),
                    TokenKind::StaticAssert => p.parse_static_assert(),
                    TokenKind::Funcenum | TokenKind::Functag => {
                        p.report(ErrorCode::FuncenumRemoved, tok.span);
                        p.drop_line();
                        None
                    }
                    TokenKind::Typedef => p.parse_typedef(),
                    TokenKind::Typeset => p.parse_typeset(),
                    TokenKind::Struct => p.parse_pstruct(),
                    TokenKind::Const => p.parse_const(crate::ast::VarClass::Global),
                    TokenKind::Enum => {
                        if p.try_match(TokenKind::Struct) {
                            p.parse_enum_struct()
                        } else {
                            p.parse_enum(crate::ast::VarClass::Global)
                        }
                    }
                    TokenKind::Methodmap => p.parse_methodmap(),
                    TokenKind::Using => p.parse_using(),
                    TokenKind::RBrace => {
                        p.report(ErrorCode::UnmatchedClosingBrace, tok.span);
                        None
                    }
                    TokenKind::LBrace => {
                        p.report(ErrorCode::BodyWithoutHeader, tok.span);
                        None
                    }
                    _ => {
                        p.report(ErrorCode::InvalidDeclaration, tok.span);
                        p.drop_line();
                        None
                    }
                };

                if let Some(decl) = decl {
                    process(&p.ast, decl);
                    decls.push(decl);
                }
            }
        });

        if self.has_errors() {
            Err(std::mem::take(&mut self.errors))
        } else {
            Ok(ParseTree {
                ast: std::mem::take(&mut self.ast),
                decls,
            })
        }
    }

    /// True when any error (not warning) has been reported.
    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|d| d.kind == DiagnosticKind::Error)
    }

    /// All diagnostics reported so far, warnings included.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Take ownership of the identifier interner. Atoms in the parsed tree
    /// resolve through it, so it must outlive the tree.
    pub fn take_interner(&mut self) -> DefaultStringInterner {
        std::mem::take(&mut self.interner)
    }

    /// Take ownership of the tag table.
    pub fn take_tags(&mut self) -> TagTable {
        std::mem::take(&mut self.tags)
    }

    /// Resolve a symbol back to its text.
    pub fn symbol_text(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol).unwrap_or("")
    }

    // ============================================================
    // Token handling
    // ============================================================

    /// Pull the next raw token, folding line breaks into the
    /// `first_on_line` flag and reporting unrecognized characters.
    fn raw_next(&mut self) -> Token {
        if let Some(tok) = self.raw_peeked.take() {
            return tok;
        }
        loop {
            match self.lexer.next() {
                Some(tok) if tok.kind == TokenKind::Error => {
                    self.report(ErrorCode::InvalidCharacter, tok.span);
                }
                Some(tok) if tok.kind == TokenKind::UnclosedBlockComment => {
                    self.report_msg(
                        ErrorCode::InvalidCharacter,
                        tok.span,
                        "unterminated block comment".to_string(),
                    );
                }
                Some(tok) => return tok,
                None => {
                    let end = self.source.len();
                    return Token::new(TokenKind::Eof, Span::new(end, end, 0, 0), true);
                }
            }
        }
    }

    /// Consume and return the next token. An identifier directly adjacent
    /// to a `:` folds into a [`TokenKind::Label`] while tags are allowed.
    pub(crate) fn next_token(&mut self) -> Token {
        let tok = if let Some(tok) = self.pushed.pop() {
            tok
        } else {
            let tok = self.raw_next();
            if self.flags.allow_tags
                && (tok.kind == TokenKind::Ident || tok.kind == TokenKind::Underscore)
            {
                let colon = self.raw_next();
                if colon.kind == TokenKind::Colon && colon.span.start == tok.span.end {
                    Token::new(TokenKind::Label, tok.span, tok.first_on_line)
                } else {
                    self.raw_peeked = Some(colon);
                    tok
                }
            } else {
                tok
            }
        };
        self.prev2 = self.prev;
        self.prev = tok;
        tok
    }

    /// Return a token to the stream. The stack runs as deep as the
    /// declaration disambiguation needs.
    pub(crate) fn push_back(&mut self, tok: Token) {
        self.pushed.push(tok);
        self.prev = self.prev2;
    }

    /// Look at the next token without consuming it.
    pub(crate) fn peek_token(&mut self) -> Token {
        let tok = self.next_token();
        self.push_back(tok);
        tok
    }

    /// Check whether the next token has the given kind.
    pub(crate) fn peek(&mut self, kind: TokenKind) -> bool {
        self.peek_token().kind == kind
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn try_match(&mut self, kind: TokenKind) -> bool {
        if self.peek(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume a token of the expected kind, or report error 1 and leave
    /// the stream untouched.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.try_match(kind) {
            true
        } else {
            self.error_expected(kind.description());
            false
        }
    }

    /// Consume an identifier, if one is next.
    pub(crate) fn match_symbol(&mut self) -> Option<Spanned<Symbol>> {
        let tok = self.peek_token();
        if tok.kind == TokenKind::Ident {
            self.next_token();
            let symbol = self.intern_span(tok.span);
            Some(Spanned::new(symbol, tok.span))
        } else {
            None
        }
    }

    /// Consume an identifier or report error 1.
    pub(crate) fn need_symbol(&mut self) -> Option<Spanned<Symbol>> {
        let sym = self.match_symbol();
        if sym.is_none() {
            self.error_expected("identifier");
        }
        sym
    }

    /// The most recently consumed token.
    pub(crate) fn prev_token(&self) -> Token {
        self.prev
    }

    /// Position of the most recently consumed token.
    pub(crate) fn current_pos(&self) -> Span {
        self.prev.span
    }

    /// Get the source text of a span.
    pub(crate) fn text(&self, span: Span) -> &'src str {
        &self.source[span.start..span.end]
    }

    /// Intern the text of a span.
    pub(crate) fn intern_span(&mut self, span: Span) -> Symbol {
        let text = &self.source[span.start..span.end];
        self.interner.get_or_intern(text)
    }

    pub(crate) fn intern(&mut self, text: &str) -> Symbol {
        self.interner.get_or_intern(text)
    }

    // ============================================================
    // Statement terminators
    // ============================================================

    /// Consume a statement terminator if one is present: a semicolon, or
    /// (when semicolons are optional) a line break or the end of file.
    /// Line breaks are not tokens, so matching one consumes nothing.
    pub(crate) fn try_match_term(&mut self) -> bool {
        if self.try_match(TokenKind::Semi) {
            return true;
        }
        if !self.options.need_semicolon {
            let tok = self.peek_token();
            if tok.kind == TokenKind::Eof || tok.first_on_line {
                return true;
            }
        }
        false
    }

    /// Require a statement terminator, reporting error 1 when absent.
    pub(crate) fn expect_term(&mut self) -> bool {
        if self.try_match_term() {
            true
        } else {
            self.error_expected(TokenKind::Semi.description());
            false
        }
    }

    /// Enforce a terminator policy at the end of a construct, then verify
    /// nothing else remains on the line.
    pub(crate) fn require_newline(&mut self, policy: TerminatorPolicy) {
        let semi = self.try_match(TokenKind::Semi);
        if !semi && policy == TerminatorPolicy::Semicolon {
            self.expect(TokenKind::Semi);
            return;
        }
        let next = self.peek_token();
        if next.kind != TokenKind::Eof && !next.first_on_line {
            self.report(ErrorCode::ExtraCharactersOnLine, next.span);
        }
    }

    /// Drop the remainder of the current source line. Used to resynchronize
    /// after an unrecoverable token mismatch.
    pub(crate) fn drop_line(&mut self) {
        loop {
            let tok = self.peek_token();
            if tok.kind == TokenKind::Eof || tok.first_on_line {
                break;
            }
            self.next_token();
        }
    }

    // ============================================================
    // Error reporting
    // ============================================================

    pub(crate) fn report(&mut self, code: ErrorCode, span: Span) {
        self.report_msg(code, span, code.description().to_string());
    }

    pub(crate) fn report_msg(&mut self, code: ErrorCode, span: Span, message: String) {
        if !code.is_warning() {
            if self.flags.one_error_per_statement && self.stmt_error {
                return;
            }
            self.stmt_error = true;
        }
        self.errors.push(Diagnostic::new(code, span, message));
    }

    fn error_expected(&mut self, expected: &str) {
        let found = self.peek_token();
        self.report_msg(
            ErrorCode::ExpectedToken,
            found.span,
            format!("expected {}, but found {}", expected, found.kind.description()),
        );
    }

    // ============================================================
    // Scoped flags
    // ============================================================

    pub(crate) fn with_in_loop<R>(&mut self, value: bool, body: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.flags.in_loop, value);
        let result = body(self);
        self.flags.in_loop = saved;
        result
    }

    pub(crate) fn with_in_test<R>(&mut self, value: bool, body: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.flags.in_test, value);
        let result = body(self);
        self.flags.in_test = saved;
        result
    }

    pub(crate) fn with_allow_tags<R>(
        &mut self,
        value: bool,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = std::mem::replace(&mut self.flags.allow_tags, value);
        let result = body(self);
        self.flags.allow_tags = saved;
        result
    }

    pub(crate) fn with_one_error_per_statement<R>(
        &mut self,
        value: bool,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = std::mem::replace(&mut self.flags.one_error_per_statement, value);
        let result = body(self);
        self.flags.one_error_per_statement = saved;
        result
    }

    // ============================================================
    // Literal parsing
    // ============================================================

    /// Parse an integer literal to its cell value. Out-of-range values wrap
    /// to cell width.
    pub(crate) fn parse_int_literal(&self, text: &str) -> Cell {
        let text = text.replace('_', "");
        let (digits, radix) = if let Some(rest) = text.strip_prefix("0x") {
            (rest.to_string(), 16)
        } else if let Some(rest) = text.strip_prefix("0o") {
            (rest.to_string(), 8)
        } else if let Some(rest) = text.strip_prefix("0b") {
            (rest.to_string(), 2)
        } else {
            (text, 10)
        };
        i64::from_str_radix(&digits, radix).map(|v| v as Cell).unwrap_or(0)
    }

    /// Parse a rational literal.
    pub(crate) fn parse_rational_literal(&self, text: &str) -> f64 {
        text.replace('_', "").parse().unwrap_or(0.0)
    }

    /// Parse a character literal to its cell value.
    pub(crate) fn parse_char_literal(&self, text: &str) -> Cell {
        let inner = &text[1..text.len() - 1];
        let mut chars = inner.chars();
        let value = match chars.next() {
            Some('\\') => match chars.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('\\') => '\\',
                Some('\'') => '\'',
                Some('"') => '"',
                Some('0') => '\0',
                Some(c) => c,
                None => '\0',
            },
            Some(c) => c,
            None => '\0',
        };
        value as Cell
    }

    /// Parse a string literal, processing escape sequences.
    pub(crate) fn parse_string_literal(&self, text: &str) -> String {
        let inner = &text[1..text.len() - 1];
        let mut result = String::new();
        let mut chars = inner.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('\'') => result.push('\''),
                Some('"') => result.push('"'),
                Some('0') => result.push('\0'),
                Some('x') => {
                    let mut hex = String::new();
                    for _ in 0..2 {
                        if let Some(h) = chars.next() {
                            hex.push(h);
                        }
                    }
                    if let Ok(n) = u8::from_str_radix(&hex, 16) {
                        result.push(n as char);
                    }
                }
                Some(c) => result.push(c),
                None => {}
            }
        }

        result
    }

    // ============================================================
    // Constant expressions
    // ============================================================

    /// Parse an expression that must be a compile-time constant. Returns
    /// the value, the value's tag, and whether it was in fact constant.
    /// Non-constant expressions are reported as error 8.
    pub(crate) fn parse_const_expr(&mut self) -> (Cell, Tag, bool) {
        let expr = self.parse_assignment();
        let tag = self.infer_const_tag(expr);
        match const_eval::eval(&self.ast, expr) {
            Ok(value) => (value, tag, true),
            Err(EvalError::NotConstant { span }) => {
                self.report(ErrorCode::MustBeConstant, span);
                (0, tag, false)
            }
            Err(EvalError::DivisionByZero { span }) => {
                self.report(ErrorCode::DivisionByZero, span);
                (0, tag, true)
            }
        }
    }

    fn infer_const_tag(&self, expr: crate::ast::ExprId) -> Tag {
        match &self.ast[expr].kind {
            crate::ast::ExprKind::Rational(_) => Tag::FLOAT,
            crate::ast::ExprKind::Cast { tag, .. } => *tag,
            _ => Tag::INT,
        }
    }
}
