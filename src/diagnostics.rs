//! Diagnostic reporting infrastructure.
//!
//! The parser reports problems through numbered diagnostics appended to a
//! sink; it never unwinds. Code numbers follow the language's historical
//! numbering scheme:
//!
//! - **1-199**: errors
//! - **200-299**: warnings
//!
//! An error suppresses further errors for the remainder of the statement
//! (the parser's one-error-per-statement rule); warnings are never
//! suppressed. [`DiagnosticEmitter`] renders diagnostics to stderr with
//! source snippets.

use crate::span::Span;
use ariadne::{Color, Label, Report, ReportKind, Source};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numbered diagnostic codes.
///
/// Codes in the 200 range are warnings; everything below is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    // ============================================================
    // Errors
    // ============================================================
    /// Expected one token, found another.
    ExpectedToken = 1,
    /// A `case` label may be followed by only a single statement.
    InvalidCaseStatement = 2,
    /// Local declarations must appear inside a compound block.
    LocalDeclarationNotAllowed = 3,
    /// Expression is not a compile-time constant.
    MustBeConstant = 8,
    /// Invalid function or declaration.
    InvalidDeclaration = 10,
    /// `case` or `default` outside of a `switch` statement.
    NotInSwitch = 14,
    /// The `default` case must be the last case in a switch statement.
    DefaultMustBeLast = 15,
    /// Multiple `default` cases in one switch statement.
    MultipleDefaults = 16,
    /// `break` or `continue` outside of a loop.
    LoopControlOutsideLoop = 24,
    /// Unrecognized character in the input.
    InvalidCharacter = 27,
    /// Invalid expression.
    InvalidExpression = 29,
    /// Compound block not closed at end of file.
    CompoundBlockNotClosed = 30,
    /// Empty statement.
    EmptyStatement = 36,
    /// Extra characters on line after the end of a construct.
    ExtraCharactersOnLine = 38,
    /// Positional call arguments must precede all named arguments.
    PositionalAfterNamed = 44,
    /// Too many array dimensions.
    TooManyDimensions = 53,
    /// Unmatched closing brace.
    UnmatchedClosingBrace = 54,
    /// Start of function body without a function header.
    BodyWithoutHeader = 55,
    /// Division or modulo by zero in a constant expression.
    DivisionByZero = 93,
    /// Invalid type expression.
    InvalidType = 122,
    /// A new-style declaration must not carry the `new` keyword.
    NewStyleDeclarationWithNew = 143,
    /// Array dimensions are not allowed on enumeration fields.
    EnumFieldDimensions = 153,
    /// The `using` form is restricted to `__intrinsics__.Handle`.
    InvalidUsing = 156,
    /// `funcenum` and `functag` have been removed from the language.
    FuncenumRemoved = 163,
    /// A construct that requires parentheses was written without them.
    MissingParentheses = 243,

    // ============================================================
    // Warnings (200-240)
    // ============================================================
    /// Possibly unintended assignment inside a test expression.
    PossiblyUnintendedAssignment = 211,
    /// Statement indentation does not match the surrounding block.
    LooseIndentation = 217,
    /// Enumeration increment specifiers are deprecated.
    DeprecatedEnumIncrement = 228,
    /// Legacy tag cast used while new-style declarations are required.
    LegacyCast = 240,
}

impl ErrorCode {
    /// The numeric code, as printed in diagnostics.
    pub fn number(&self) -> u16 {
        *self as u16
    }

    /// Warnings occupy the 200-240 range.
    pub fn is_warning(&self) -> bool {
        (200..=240).contains(&self.number())
    }

    /// Get a human-readable description of the diagnostic.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ExpectedToken => "unexpected token",
            ErrorCode::InvalidCaseStatement => {
                "only a single statement (or expression) can follow each \"case\""
            }
            ErrorCode::LocalDeclarationNotAllowed => {
                "declaration of a local variable must appear in a compound block"
            }
            ErrorCode::MustBeConstant => "must be a constant expression; assumed zero",
            ErrorCode::InvalidDeclaration => "invalid function or declaration",
            ErrorCode::NotInSwitch => "invalid statement; not in switch",
            ErrorCode::DefaultMustBeLast => {
                "\"default\" case must be the last case in switch statement"
            }
            ErrorCode::MultipleDefaults => "multiple defaults in \"switch\"",
            ErrorCode::LoopControlOutsideLoop => "\"break\" or \"continue\" is out of context",
            ErrorCode::InvalidCharacter => "unrecognized character in input",
            ErrorCode::InvalidExpression => "invalid expression, assumed zero",
            ErrorCode::CompoundBlockNotClosed => {
                "compound block not closed at the end of file"
            }
            ErrorCode::EmptyStatement => "empty statement",
            ErrorCode::ExtraCharactersOnLine => "extra characters on line",
            ErrorCode::PositionalAfterNamed => {
                "positional parameters must precede all named parameters"
            }
            ErrorCode::TooManyDimensions => "exceeding maximum number of array dimensions",
            ErrorCode::UnmatchedClosingBrace => "unmatched closing brace (\"}\")",
            ErrorCode::BodyWithoutHeader => "start of function body without function header",
            ErrorCode::DivisionByZero => "division by zero in a constant expression",
            ErrorCode::InvalidType => "invalid type expression",
            ErrorCode::NewStyleDeclarationWithNew => {
                "new-style declarations should not have \"new\""
            }
            ErrorCode::EnumFieldDimensions => {
                "array dimensions are not allowed on enumeration fields"
            }
            ErrorCode::InvalidUsing => {
                "\"using\" is limited to the __intrinsics__.Handle form"
            }
            ErrorCode::FuncenumRemoved => {
                "\"funcenum\" and \"functag\" are no longer supported"
            }
            ErrorCode::MissingParentheses => "parentheses are required here",
            ErrorCode::PossiblyUnintendedAssignment => "possibly unintended assignment",
            ErrorCode::LooseIndentation => "loose indentation",
            ErrorCode::DeprecatedEnumIncrement => {
                "enumeration increment specifiers are deprecated"
            }
            ErrorCode::LegacyCast => {
                "legacy tag cast used while new-style declarations are required"
            }
        }
    }
}

/// The kind of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An error that fails the parse.
    Error,
    /// A warning; the parse still succeeds.
    Warning,
}

impl DiagnosticKind {
    fn to_report_kind(self) -> ReportKind<'static> {
        match self {
            DiagnosticKind::Error => ReportKind::Error,
            DiagnosticKind::Warning => ReportKind::Warning,
        }
    }

    fn color(self) -> Color {
        match self {
            DiagnosticKind::Error => Color::Red,
            DiagnosticKind::Warning => Color::Yellow,
        }
    }
}

/// A single reported diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: ErrorCode,
    /// The rendered message. Defaults to the code's description when the
    /// report site has nothing more specific to say.
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// Create a diagnostic for the given code; the kind follows the code's
    /// number range.
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        let kind = if code.is_warning() {
            DiagnosticKind::Warning
        } else {
            DiagnosticKind::Error
        };
        Self {
            kind,
            code,
            message: message.into(),
            span,
        }
    }

    /// Create a diagnostic carrying the code's stock description.
    pub fn from_code(code: ErrorCode, span: Span) -> Self {
        Self::new(code, span, code.description())
    }

    /// The `error 044`-style prefix used when rendering.
    pub fn prefix(&self) -> String {
        match self.kind {
            DiagnosticKind::Error => format!("error {:03}", self.code.number()),
            DiagnosticKind::Warning => format!("warning {:03}", self.code.number()),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} on line {}: {}",
            self.prefix(),
            self.span.line,
            self.message
        )
    }
}

/// Renders diagnostics to stderr with source snippets.
pub struct DiagnosticEmitter<'a> {
    filename: &'a str,
    source: &'a str,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(filename: &'a str, source: &'a str) -> Self {
        Self { filename, source }
    }

    /// Emit a diagnostic to stderr.
    pub fn emit(&self, diagnostic: &Diagnostic) {
        let report = Report::build(
            diagnostic.kind.to_report_kind(),
            self.filename,
            diagnostic.span.start,
        )
        .with_message(format!("[{}] {}", diagnostic.prefix(), diagnostic.message))
        .with_label(
            Label::new((self.filename, diagnostic.span.start..diagnostic.span.end))
                .with_color(diagnostic.kind.color())
                .with_message(&diagnostic.message),
        )
        .finish();

        report
            .eprint((self.filename, Source::from(self.source)))
            .expect("failed to write diagnostic");
    }

    /// Emit a batch of diagnostics in order.
    pub fn emit_all(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }
}

/// Failures of compile-time constant evaluation.
///
/// These are produced by [`crate::const_eval`] and reported by the parser
/// as error 8 or error 93 at the offending expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("expression is not a compile-time constant")]
    NotConstant { span: Span },

    #[error("division by zero in a constant expression")]
    DivisionByZero { span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::NotConstant { span } => *span,
            EvalError::DivisionByZero { span } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_range() {
        assert!(!ErrorCode::ExpectedToken.is_warning());
        assert!(!ErrorCode::FuncenumRemoved.is_warning());
        assert!(ErrorCode::PossiblyUnintendedAssignment.is_warning());
        assert!(ErrorCode::LooseIndentation.is_warning());
    }

    #[test]
    fn test_diagnostic_kind_follows_code() {
        let err = Diagnostic::from_code(ErrorCode::EmptyStatement, Span::dummy());
        assert_eq!(err.kind, DiagnosticKind::Error);
        let warn = Diagnostic::from_code(ErrorCode::LegacyCast, Span::dummy());
        assert_eq!(warn.kind, DiagnosticKind::Warning);
    }

    #[test]
    fn test_prefix_format() {
        let d = Diagnostic::from_code(ErrorCode::PositionalAfterNamed, Span::dummy());
        assert_eq!(d.prefix(), "error 044");
    }
}
