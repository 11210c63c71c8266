//! Declarator parsing.
//!
//! Talon carries two declaration syntaxes. The legacy form puts an
//! optional tag label before the name (`Float:x`, `pos[3]`); the newer form
//! puts a type first (`float x`, `int pos[3]`). Which form a fragment uses
//! is a structural question, answered by peeking a token or two and pushing
//! them back, and the answer is recorded on the resulting type reference
//! (`is_new`).
//!
//! [`Parser::parse_decl`] is the single entry point; it routes to the
//! old-style or new-style declarator parser based on its flag word and what
//! it sees. It returns false only when no name could be parsed at all;
//! every other problem is reported and parsing continues with whatever was
//! recovered.

use super::Parser;
use crate::ast::{
    DeclFlags, Declinfo, FunctionType, FunctionTypeArg, IdentKind, TypeRef, DIMEN_MAX,
};
use crate::diagnostics::ErrorCode;
use crate::lexer::{Token, TokenKind};
use crate::parser::TerminatorPolicy;
use crate::span::Spanned;
use crate::types::Tag;

/// Operator tokens accepted by `operator` declarators.
const OPERATOR_TOKENS: &[TokenKind] = &[
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::Percent,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Shl,
    TokenKind::Shr,
    TokenKind::Shru,
    TokenKind::Ampersand,
    TokenKind::Pipe,
    TokenKind::Caret,
    TokenKind::EqEq,
    TokenKind::NotEq,
    TokenKind::Lt,
    TokenKind::Le,
    TokenKind::Gt,
    TokenKind::Ge,
    TokenKind::Not,
    TokenKind::Tilde,
    TokenKind::Inc,
    TokenKind::Dec,
];

impl<'src> Parser<'src> {
    /// Parse a declarator under the given context flags.
    ///
    /// Returns false only if a name could not be parsed; all other problems
    /// emit a diagnostic and return true so higher productions can
    /// continue.
    pub(crate) fn parse_decl(&mut self, decl: &mut Declinfo, flags: DeclFlags) -> bool {
        if self.try_match(TokenKind::Const) {
            decl.type_ref.is_const = true;
        }

        // Callers sometimes know the style up front (`new` forces the
        // legacy form, a leading type keyword the new form).
        if flags.contains(DeclFlags::OLD) {
            return self.parse_old_decl(decl, flags);
        }
        if flags.contains(DeclFlags::NEW) {
            return self.parse_new_decl(decl, None, flags);
        }

        // A reference or packed-dimension marker can only open a legacy
        // argument declarator.
        if flags.contains(DeclFlags::ARGUMENT)
            && (self.peek(TokenKind::Ampersand) || self.peek(TokenKind::LBrace))
        {
            return self.parse_old_decl(decl, flags);
        }

        // A tag label or an operator keyword is a dead giveaway.
        if self.peek(TokenKind::Label) || self.peek(TokenKind::Operator) {
            return self.parse_old_decl(decl, flags);
        }

        let tok = self.peek_token();
        if tok.kind == TokenKind::Ident {
            self.next_token();

            if self.peek(TokenKind::Ident)
                || self.peek(TokenKind::Operator)
                || self.peek(TokenKind::Ampersand)
                || self.peek(TokenKind::Ellipsis)
            {
                // Two identifiers in a row (or a name-position token after
                // one): the first was a type.
                return self.parse_new_decl(decl, Some(tok), flags);
            }

            if flags.intersects(DeclFlags::NAMED_MASK) && self.try_match(TokenKind::LBracket) {
                // Dimensions before we know the style. Either `x[] y`
                // (new-style, dims belong to the type) or `y[3]`
                // (old-style post-dims).
                self.parse_post_dims(&mut decl.type_ref, flags);

                if self.peek(TokenKind::Ident) || self.peek(TokenKind::Ampersand) {
                    decl.type_ref.has_postdims = false;
                    return self.parse_new_decl(decl, Some(tok), flags);
                }

                // Plain `y[3]`: the identifier was the name.
                decl.type_ref.tag = Tag::INT;
                decl.type_ref.is_new = false;
                decl.type_ref.has_postdims = true;
                decl.type_ref.ident = IdentKind::Array;
                let symbol = self.intern_span(tok.span);
                decl.name = Some(Spanned::new(symbol, tok.span));
                return true;
            }

            // A lone identifier: an untagged legacy declarator.
            self.push_back(tok);
            return self.parse_old_decl(decl, flags);
        }

        // Anything else (a type keyword, usually) opens a new-style
        // declarator.
        self.parse_new_decl(decl, None, flags)
    }

    /// Parse a legacy `[tag:] name [dims]` declarator. The leading `const`,
    /// if any, was consumed by `parse_decl`.
    pub(crate) fn parse_old_decl(&mut self, decl: &mut Declinfo, flags: DeclFlags) -> bool {
        decl.type_ref.is_new = false;

        if self.try_match(TokenKind::Const) {
            decl.type_ref.is_const = true;
        }

        if flags.contains(DeclFlags::ARGUMENT) && self.try_match(TokenKind::Ampersand) {
            decl.type_ref.ident = IdentKind::Reference;
        }

        let tok = self.peek_token();
        if tok.kind == TokenKind::Label {
            self.next_token();
            let name = self.text(tok.span).to_string();
            decl.type_ref.tag = self.tags.add_tag(&name);
        } else {
            decl.type_ref.tag = Tag::INT;
        }

        // A type keyword in name position means a new-style declaration
        // that kept its `new`.
        let tok = self.peek_token();
        if matches!(
            tok.kind,
            TokenKind::Int | TokenKind::Char | TokenKind::Void | TokenKind::Object
        ) {
            self.next_token();
            self.report(ErrorCode::NewStyleDeclarationWithNew, tok.span);
            return self.parse_new_decl(decl, Some(tok), flags);
        }

        if !self.parse_decl_name(decl, flags) {
            return false;
        }
        self.parse_optional_postdims(decl, flags);
        true
    }

    /// Parse a `type name [dims]` declarator. `prefetched` carries the type
    /// token when the caller already consumed it during disambiguation.
    pub(crate) fn parse_new_decl(
        &mut self,
        decl: &mut Declinfo,
        prefetched: Option<Token>,
        flags: DeclFlags,
    ) -> bool {
        decl.type_ref.is_new = true;

        if prefetched.is_none() && self.try_match(TokenKind::Const) {
            decl.type_ref.is_const = true;
        }

        let tok = match prefetched {
            Some(tok) => tok,
            None => self.next_token(),
        };
        decl.type_ref.tag = self.parse_new_typename(tok).unwrap_or(Tag::INT);

        if flags.contains(DeclFlags::ARGUMENT) && self.try_match(TokenKind::Ampersand) {
            decl.type_ref.ident = IdentKind::Reference;
        }

        // Dimensions written on the type: `int[] x`. Extents belong on the
        // name in this position, so only empty brackets are accepted.
        while self.try_match(TokenKind::LBracket) {
            if decl.type_ref.numdim() >= DIMEN_MAX {
                self.report(ErrorCode::TooManyDimensions, self.current_pos());
            } else {
                decl.type_ref.dims.push(0);
                decl.type_ref.dim_exprs.push(None);
            }
            self.expect(TokenKind::RBracket);
        }
        if !decl.type_ref.dims.is_empty() {
            decl.type_ref.ident = IdentKind::Array;
        }

        if !self.parse_decl_name(decl, flags) {
            return false;
        }
        self.parse_optional_postdims(decl, flags);
        true
    }

    /// Re-parse the name-and-dims part after a comma in a multi-declarator
    /// new-style declaration: the type is kept, the dims are not.
    pub(crate) fn reparse_new_decl(&mut self, decl: &mut Declinfo, flags: DeclFlags) {
        decl.name = None;
        decl.type_ref.dims.clear();
        decl.type_ref.dim_exprs.clear();
        decl.type_ref.has_postdims = false;
        if decl.type_ref.ident == IdentKind::Array {
            decl.type_ref.ident = IdentKind::Scalar;
        }

        if !self.parse_decl_name(decl, flags) {
            return;
        }
        self.parse_optional_postdims(decl, flags);
    }

    /// Re-parse a whole declarator after a comma in a multi-declarator
    /// legacy declaration; each name carries its own tag.
    pub(crate) fn reparse_old_decl(&mut self, decl: &mut Declinfo, flags: DeclFlags) {
        let is_const = decl.type_ref.is_const;
        *decl = Declinfo::default();
        decl.type_ref.is_const = is_const;
        self.parse_old_decl(decl, flags);
    }

    /// Parse the declarator's name: a symbol, an operator designation, a
    /// variadic marker, or nothing where the context allows.
    fn parse_decl_name(&mut self, decl: &mut Declinfo, flags: DeclFlags) -> bool {
        if flags.contains(DeclFlags::MAYBE_FUNCTION) && self.try_match(TokenKind::Operator) {
            let oper_span = self.current_pos();
            let tok = self.peek_token();
            if OPERATOR_TOKENS.contains(&tok.kind) {
                self.next_token();
                decl.opertok = Some(tok.kind);
                let name = format!("operator{}", self.text(tok.span));
                let symbol = self.intern(&name);
                decl.name = Some(Spanned::new(symbol, oper_span.merge(tok.span)));
                return true;
            }
            self.report(ErrorCode::InvalidDeclaration, tok.span);
            return false;
        }

        if let Some(name) = self.match_symbol() {
            decl.name = Some(name);
            return true;
        }

        if flags.contains(DeclFlags::ARGUMENT) && self.try_match(TokenKind::Ellipsis) {
            decl.is_variadic = true;
            return true;
        }

        if flags.contains(DeclFlags::MAYBE_NAMED) {
            return true;
        }

        self.error_expected("identifier");
        false
    }

    /// Parse `[dims]` after the name if present, including the legacy
    /// packed form `{dims}` for arguments.
    fn parse_optional_postdims(&mut self, decl: &mut Declinfo, flags: DeclFlags) {
        if !flags.intersects(DeclFlags::NAMED_MASK) {
            return;
        }
        if self.try_match(TokenKind::LBracket) {
            self.parse_post_dims(&mut decl.type_ref, flags);
            decl.type_ref.has_postdims = true;
            decl.type_ref.ident = IdentKind::Array;
        } else if flags.contains(DeclFlags::ARGUMENT) && self.try_match(TokenKind::LBrace) {
            // Legacy packed-string argument: `name{}` or `name{N}`.
            if !self.try_match(TokenKind::RBrace) {
                let extent = self.parse_assignment();
                decl.type_ref.dim_exprs.push(Some(extent));
                self.expect(TokenKind::RBrace);
            } else {
                decl.type_ref.dim_exprs.push(None);
            }
            decl.type_ref.dims.push(0);
            decl.type_ref.has_postdims = true;
            decl.type_ref.ident = IdentKind::Array;
        }
    }

    /// Parse array dimensions; the first `[` has been consumed. Each
    /// dimension is either empty or an extent expression. At most
    /// [`DIMEN_MAX`] dimensions are kept.
    pub(crate) fn parse_post_dims(&mut self, type_ref: &mut TypeRef, _flags: DeclFlags) {
        loop {
            if type_ref.numdim() >= DIMEN_MAX {
                self.report(ErrorCode::TooManyDimensions, self.current_pos());
                // Swallow the rest of the dimension so the stream realigns.
                if !self.try_match(TokenKind::RBracket) {
                    self.parse_assignment();
                    self.expect(TokenKind::RBracket);
                }
                break;
            }

            if self.try_match(TokenKind::RBracket) {
                type_ref.dims.push(0);
                type_ref.dim_exprs.push(None);
            } else {
                let extent = self.parse_assignment();
                type_ref.dims.push(0);
                type_ref.dim_exprs.push(Some(extent));
                self.expect(TokenKind::RBracket);
            }

            if !self.try_match(TokenKind::LBracket) {
                break;
            }
        }
    }

    /// Resolve a type token to its tag: one of the builtin type keywords or
    /// an identifier interned through the tag table.
    pub(crate) fn parse_new_typename(&mut self, tok: Token) -> Option<Tag> {
        match tok.kind {
            TokenKind::Int => Some(Tag::INT),
            TokenKind::Char => Some(Tag::CHAR),
            TokenKind::Void => Some(Tag::VOID),
            TokenKind::Object => Some(Tag::OBJECT),
            TokenKind::Ident => {
                let name = self.text(tok.span).to_string();
                Some(self.tags.add_tag(&name))
            }
            TokenKind::Label => {
                self.report(ErrorCode::InvalidType, tok.span);
                Some(Tag::INT)
            }
            _ => {
                self.report(ErrorCode::InvalidType, tok.span);
                None
            }
        }
    }

    /// Parse a `function RetType (args)` type, as used by `typedef` and
    /// `typeset`. Ends with the construct's line terminator.
    pub(crate) fn parse_function_type(&mut self) -> FunctionType {
        let pos = self.peek_token().span;
        self.expect(TokenKind::Function);

        let mut ret = TypeRef {
            is_new: true,
            ..TypeRef::default()
        };
        let tok = self.next_token();
        ret.tag = self.parse_new_typename(tok).unwrap_or(Tag::INT);

        let mut args = Vec::new();
        self.expect(TokenKind::LParen);
        if !self.try_match(TokenKind::RParen) {
            loop {
                let mut decl = Declinfo::default();
                self.parse_decl(
                    &mut decl,
                    DeclFlags::ARGUMENT | DeclFlags::MAYBE_NAMED | DeclFlags::NEW,
                );
                args.push(FunctionTypeArg {
                    type_ref: decl.type_ref,
                    name: decl.name,
                });
                if !self.try_match(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen);
        }

        self.require_newline(TerminatorPolicy::NewlineOrSemicolon);

        FunctionType {
            ret,
            args,
            span: pos,
        }
    }
}
