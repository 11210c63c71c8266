//! Lexical analysis for Talon.
//!
//! This module tokenizes Talon source code into a stream of tokens. It
//! handles all lexical elements of the language:
//!
//! - Keywords and identifiers
//! - Integer literals (decimal, hex, octal, binary) and character literals
//! - Rational (floating-point) literals
//! - String literals with escape sequences
//! - Operators and punctuation, including the compound assignment family
//! - Comments (line and block)
//!
//! Newlines are significant to the language's statement terminator rules
//! (a statement may end at a line break when semicolons are optional), so
//! the lexer does not silently discard them: each emitted [`Token`] records
//! whether it is the first token on its line.
//!
//! Tag labels (`Float:` and friends) are *not* produced here. Whether an
//! identifier directly followed by a colon forms a label depends on parser
//! state, so the parser's token adapter folds the pair into a
//! [`TokenKind::Label`] when labels are permitted.
//!
//! # Example
//!
//! ```rust
//! use talonc::{Lexer, TokenKind};
//!
//! let source = "int x = 42;";
//! let tokens: Vec<_> = Lexer::new(source).collect();
//!
//! assert_eq!(tokens[0].kind, TokenKind::Int);
//! assert_eq!(tokens[1].kind, TokenKind::Ident);
//! assert_eq!(tokens[2].kind, TokenKind::Assign);
//! assert_eq!(tokens[3].kind, TokenKind::IntLit);
//! assert_eq!(tokens[4].kind, TokenKind::Semi);
//! ```

use crate::span::{LineIndex, Span};
use logos::Logos;

/// Token kinds for the Talon lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    // ============================================================
    // Keywords
    // ============================================================
    #[token("assert")]
    Assert,
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("char")]
    Char,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("decl")]
    Decl,
    #[token("default")]
    Default,
    #[token("defined")]
    Defined,
    #[token("delete")]
    Delete,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("enum")]
    Enum,
    #[token("exit")]
    Exit,
    #[token("for")]
    For,
    #[token("forward")]
    Forward,
    #[token("funcenum")]
    Funcenum,
    #[token("functag")]
    Functag,
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("int")]
    Int,
    #[token("methodmap")]
    Methodmap,
    #[token("native")]
    Native,
    #[token("new")]
    New,
    #[token("null")]
    Null,
    #[token("object")]
    Object,
    #[token("operator")]
    Operator,
    #[token("property")]
    Property,
    #[token("public")]
    Public,
    #[token("return")]
    Return,
    #[token("sizeof")]
    Sizeof,
    #[token("static")]
    Static,
    #[token("static_assert")]
    StaticAssert,
    #[token("stock")]
    Stock,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("this")]
    This,
    #[token("typedef")]
    Typedef,
    #[token("typeset")]
    Typeset,
    #[token("using")]
    Using,
    #[token("view_as")]
    ViewAs,
    #[token("void")]
    Void,
    #[token("while")]
    While,
    #[token("__nullable__")]
    Nullable,

    // ============================================================
    // Literals
    // ============================================================
    /// Integer literal (decimal, hex, octal, or binary).
    #[regex(r"[0-9][0-9_]*")]
    #[regex(r"0x[0-9a-fA-F][0-9a-fA-F_]*")]
    #[regex(r"0o[0-7][0-7_]*")]
    #[regex(r"0b[01][01_]*")]
    IntLit,

    /// Rational literal.
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    RationalLit,

    /// Character literal; evaluates to the character's cell value.
    #[regex(r"'([^'\\\n]|\\.)'")]
    CharLit,

    /// String literal.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLit,

    // ============================================================
    // Identifiers
    // ============================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// The argument placeholder `_`.
    #[token("_", priority = 10)]
    Underscore,

    /// A tag label: an identifier directly followed by `:`. Synthesized by
    /// the parser's token adapter, never produced by logos. The span covers
    /// the identifier only.
    Label,

    // ============================================================
    // Operators
    // ============================================================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,

    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,

    #[token("&&")]
    LogicAnd,
    #[token("||")]
    LogicOr,
    #[token("!")]
    Not,

    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    Shru,

    #[token("=")]
    Assign,
    #[token("+=")]
    AssignAdd,
    #[token("-=")]
    AssignSub,
    #[token("*=")]
    AssignMul,
    #[token("/=")]
    AssignDiv,
    #[token("%=")]
    AssignMod,
    #[token("&=")]
    AssignAnd,
    #[token("|=")]
    AssignOr,
    #[token("^=")]
    AssignXor,
    #[token("<<=")]
    AssignShl,
    #[token(">>=")]
    AssignShr,
    #[token(">>>=")]
    AssignShru,

    // ============================================================
    // Punctuation
    // ============================================================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,
    #[token("?")]
    Question,

    // ============================================================
    // Comments and layout (handled specially)
    // ============================================================
    /// Line break. Consumed by the [`Lexer`] iterator, which sets the
    /// `first_on_line` flag of the next emitted token instead.
    #[token("\n")]
    Newline,

    /// Line comment (skipped).
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    /// Block comment, scanned by callback so an unterminated comment can be
    /// surfaced as an error token instead of garbage.
    #[token("/*", block_comment)]
    BlockComment,

    /// Unterminated block comment (error token).
    UnclosedBlockComment,

    // ============================================================
    // Special
    // ============================================================
    /// End of file marker, emitted once by the [`Lexer`] wrapper.
    Eof,

    /// Lexer error (unrecognized character).
    Error,
}

/// Callback scanning to the end of a block comment.
fn block_comment(lexer: &mut logos::Lexer<TokenKind>) -> logos::Filter<TokenKind> {
    let remainder = lexer.remainder();
    let mut chars = remainder.chars().peekable();
    let mut consumed = 0;

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'/') {
            chars.next();
            lexer.bump(consumed + 2);
            return logos::Filter::Skip;
        }
        consumed += c.len_utf8();
    }

    lexer.bump(consumed);
    logos::Filter::Emit(TokenKind::UnclosedBlockComment)
}

impl TokenKind {
    /// Returns a human-readable description of the token kind.
    pub fn description(&self) -> &'static str {
        match self {
            TokenKind::Assert => "keyword `assert`",
            TokenKind::Break => "keyword `break`",
            TokenKind::Case => "keyword `case`",
            TokenKind::Char => "keyword `char`",
            TokenKind::Const => "keyword `const`",
            TokenKind::Continue => "keyword `continue`",
            TokenKind::Decl => "keyword `decl`",
            TokenKind::Default => "keyword `default`",
            TokenKind::Defined => "keyword `defined`",
            TokenKind::Delete => "keyword `delete`",
            TokenKind::Do => "keyword `do`",
            TokenKind::Else => "keyword `else`",
            TokenKind::Enum => "keyword `enum`",
            TokenKind::Exit => "keyword `exit`",
            TokenKind::For => "keyword `for`",
            TokenKind::Forward => "keyword `forward`",
            TokenKind::Funcenum => "keyword `funcenum`",
            TokenKind::Functag => "keyword `functag`",
            TokenKind::Function => "keyword `function`",
            TokenKind::If => "keyword `if`",
            TokenKind::Int => "keyword `int`",
            TokenKind::Methodmap => "keyword `methodmap`",
            TokenKind::Native => "keyword `native`",
            TokenKind::New => "keyword `new`",
            TokenKind::Null => "keyword `null`",
            TokenKind::Object => "keyword `object`",
            TokenKind::Operator => "keyword `operator`",
            TokenKind::Property => "keyword `property`",
            TokenKind::Public => "keyword `public`",
            TokenKind::Return => "keyword `return`",
            TokenKind::Sizeof => "keyword `sizeof`",
            TokenKind::Static => "keyword `static`",
            TokenKind::StaticAssert => "keyword `static_assert`",
            TokenKind::Stock => "keyword `stock`",
            TokenKind::Struct => "keyword `struct`",
            TokenKind::Switch => "keyword `switch`",
            TokenKind::This => "keyword `this`",
            TokenKind::Typedef => "keyword `typedef`",
            TokenKind::Typeset => "keyword `typeset`",
            TokenKind::Using => "keyword `using`",
            TokenKind::ViewAs => "keyword `view_as`",
            TokenKind::Void => "keyword `void`",
            TokenKind::While => "keyword `while`",
            TokenKind::Nullable => "keyword `__nullable__`",
            TokenKind::IntLit => "integer literal",
            TokenKind::RationalLit => "rational literal",
            TokenKind::CharLit => "character literal",
            TokenKind::StringLit => "string literal",
            TokenKind::Ident => "identifier",
            TokenKind::Underscore => "`_`",
            TokenKind::Label => "tag label",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Inc => "`++`",
            TokenKind::Dec => "`--`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::Le => "`<=`",
            TokenKind::Ge => "`>=`",
            TokenKind::LogicAnd => "`&&`",
            TokenKind::LogicOr => "`||`",
            TokenKind::Not => "`!`",
            TokenKind::Ampersand => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Tilde => "`~`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::Shru => "`>>>`",
            TokenKind::Assign => "`=`",
            TokenKind::AssignAdd => "`+=`",
            TokenKind::AssignSub => "`-=`",
            TokenKind::AssignMul => "`*=`",
            TokenKind::AssignDiv => "`/=`",
            TokenKind::AssignMod => "`%=`",
            TokenKind::AssignAnd => "`&=`",
            TokenKind::AssignOr => "`|=`",
            TokenKind::AssignXor => "`^=`",
            TokenKind::AssignShl => "`<<=`",
            TokenKind::AssignShr => "`>>=`",
            TokenKind::AssignShru => "`>>>=`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Semi => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::DoubleColon => "`::`",
            TokenKind::Dot => "`.`",
            TokenKind::DotDot => "`..`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::Question => "`?`",
            TokenKind::Newline => "end of line",
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::UnclosedBlockComment => "unterminated block comment",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "unrecognized character",
        }
    }
}

/// A token with its kind, source span, and line placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// True when this is the first token on its source line. The statement
    /// terminator rules treat such a break as an implicit terminator when
    /// semicolons are optional.
    pub first_on_line: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, first_on_line: bool) -> Self {
        Self {
            kind,
            span,
            first_on_line,
        }
    }

    pub fn dummy(kind: TokenKind) -> Self {
        Self {
            kind,
            span: Span::dummy(),
            first_on_line: false,
        }
    }
}

/// The lexer for Talon source code.
#[derive(Clone)]
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    line_index: LineIndex,
    /// Set when a line break has been seen since the last emitted token.
    pending_newline: bool,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            line_index: LineIndex::new(source),
            pending_newline: true,
            finished: false,
        }
    }

    /// Get the source text for a span.
    pub fn slice(&self, span: &Span) -> &'src str {
        &self.source[span.start..span.end]
    }

    fn span_at(&self, range: std::ops::Range<usize>) -> Span {
        let (line, col) = self.line_index.line_col(range.start);
        Span::new(range.start, range.end, line, col)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.inner.next() {
                Some(Ok(TokenKind::Newline)) => {
                    self.pending_newline = true;
                }
                Some(Ok(kind)) => {
                    let span = self.span_at(self.inner.span());
                    let first = std::mem::replace(&mut self.pending_newline, false);
                    return Some(Token::new(kind, span, first));
                }
                Some(Err(())) => {
                    let span = self.span_at(self.inner.span());
                    let first = std::mem::replace(&mut self.pending_newline, false);
                    return Some(Token::new(TokenKind::Error, span, first));
                }
                None => {
                    self.finished = true;
                    let span = self.span_at(self.source.len()..self.source.len());
                    return Some(Token::new(TokenKind::Eof, span, true));
                }
            }
        }
    }
}
