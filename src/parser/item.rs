//! Top-level declaration parsing.
//!
//! The dispatcher in `parse_program_with` routes here. Most of the grammar
//! is keyword-directed; the interesting production is the *unknown*
//! declaration, where a declarator has been parsed and the parser must
//! decide between a global variable and a function from structure alone:
//! post-fix dimensions, a missing `(`, constness, or a leading `new` all
//! mark it as a variable.

use super::Parser;
use crate::ast::{
    ArgDecl, ConstDecl, DeclFlags, Declinfo, EnumDecl, EnumField, EnumStructDecl, ExprId,
    FunctionDecl, FunctionKind, IdentKind, MethodmapDecl, MethodmapMethod, MethodmapProperty,
    PropertyAccessor, PstructDecl, StmtId, StmtKind, StructField, TypeRef, TypedefDecl,
    TypesetDecl, VarClass, VarDecl,
};
use crate::diagnostics::ErrorCode;
use crate::lexer::{Token, TokenKind};
use crate::parser::TerminatorPolicy;
use crate::span::{Span, Spanned};
use crate::types::{Tag, TagKind};

/// Attributes of a variable declaration being built.
pub(super) struct VarParams {
    pub vclass: VarClass,
    pub is_public: bool,
    pub is_static: bool,
    pub is_stock: bool,
    pub autozero: bool,
}

impl<'src> Parser<'src> {
    /// A declaration that starts with an identifier, type keyword, or
    /// storage attribute; variable or function is decided after the
    /// declarator. `first` is the routing token (still in the stream for
    /// the identifier/type/label group, consumed for the attribute group).
    pub(super) fn parse_unknown_decl(&mut self, first: Token) -> Option<StmtId> {
        let mut decl = Declinfo::default();

        if first.kind == TokenKind::Native || first.kind == TokenKind::Forward {
            let kind = if first.kind == TokenKind::Native {
                FunctionKind::Native
            } else {
                FunctionKind::Forward
            };
            if !self.parse_decl(&mut decl, DeclFlags::MAYBE_FUNCTION) {
                self.drop_line();
                return Some(self.add_stmt(StmtKind::Error, first.span));
            }
            return self.parse_function(decl, kind, false, false, false);
        }

        let pos = first.span;

        let mut is_public = false;
        let mut is_static = false;
        let mut is_stock = false;
        match first.kind {
            TokenKind::Public => is_public = true,
            TokenKind::Stock => {
                is_stock = true;
                if self.try_match(TokenKind::Static) {
                    is_static = true;
                }
            }
            TokenKind::Static => {
                is_static = true;
                // "stock" should come first, but both orders are accepted.
                if self.try_match(TokenKind::Stock) {
                    is_stock = true;
                }
            }
            _ => {}
        }

        let mut flags = DeclFlags::MAYBE_FUNCTION | DeclFlags::VARIABLE | DeclFlags::ENUMROOT;
        if first.kind == TokenKind::New {
            flags |= DeclFlags::OLD;
        }

        if !self.parse_decl(&mut decl, flags) {
            self.drop_line();
            return Some(self.add_stmt(StmtKind::Error, pos));
        }

        // Structural hints that this is a variable rather than a function.
        let probably_variable = first.kind == TokenKind::New
            || decl.type_ref.has_postdims
            || !self.peek(TokenKind::LParen)
            || decl.type_ref.is_const;

        if decl.opertok.is_none() && probably_variable {
            if first.kind == TokenKind::New && decl.type_ref.is_new {
                self.report(ErrorCode::NewStyleDeclarationWithNew, pos);
            }

            if self.tags.kind(decl.type_ref.tag) == TagKind::Struct {
                return Some(self.parse_struct_var(decl, pos, is_public));
            }

            let params = VarParams {
                vclass: VarClass::Global,
                is_public,
                is_static,
                is_stock,
                autozero: true,
            };
            return Some(self.parse_var(decl, params));
        }

        match self.parse_function(decl, FunctionKind::Normal, is_public, is_static, is_stock) {
            Some(func) => Some(func),
            None => {
                self.report(ErrorCode::InvalidDeclaration, pos);
                self.drop_line();
                None
            }
        }
    }

    /// A global of struct type takes a struct initializer. Without an
    /// initializer the declaration is an implied stock.
    fn parse_struct_var(&mut self, decl: Declinfo, pos: Span, is_public: bool) -> StmtId {
        let init = if self.try_match(TokenKind::Assign) {
            self.expect(TokenKind::LBrace);
            Some(self.parse_struct_init())
        } else {
            None
        };
        self.try_match(TokenKind::Semi);

        let name = self.decl_name_or_empty(&decl, pos);
        let has_init = init.is_some();
        self.add_stmt(
            StmtKind::Var(VarDecl {
                name,
                type_ref: decl.type_ref,
                vclass: VarClass::Global,
                is_public: is_public && has_init,
                is_static: false,
                is_stock: !has_init,
                autozero: true,
                init,
            }),
            pos,
        )
    }

    fn decl_name_or_empty(&mut self, decl: &Declinfo, pos: Span) -> Spanned<crate::ast::Symbol> {
        match decl.name {
            Some(name) => name,
            None => Spanned::new(self.intern(""), pos),
        }
    }

    /// Parse the comma-separated declarator list of one variable
    /// declaration statement, then the terminator.
    pub(super) fn parse_var(&mut self, mut decl: Declinfo, params: VarParams) -> StmtId {
        let mut vars = Vec::new();

        loop {
            let pos = decl.name.map(|n| n.span).unwrap_or_else(|| self.current_pos());
            let name = self.decl_name_or_empty(&decl, pos);

            let init = if self.try_match(TokenKind::Assign) {
                Some(self.parse_var_init())
            } else {
                None
            };

            vars.push(self.add_stmt(
                StmtKind::Var(VarDecl {
                    name,
                    type_ref: decl.type_ref.clone(),
                    vclass: params.vclass,
                    is_public: params.is_public,
                    is_static: params.is_static,
                    is_stock: params.is_stock,
                    autozero: params.autozero,
                    init,
                }),
                pos,
            ));

            if !self.try_match(TokenKind::Comma) {
                break;
            }

            let flags = DeclFlags::VARIABLE | DeclFlags::ENUMROOT;
            if decl.type_ref.is_new {
                self.reparse_new_decl(&mut decl, flags);
            } else {
                self.reparse_old_decl(&mut decl, flags);
            }
        }

        self.expect_term();

        if vars.len() == 1 {
            vars[0]
        } else {
            let span = self.ast[vars[0]].span;
            self.add_stmt(StmtKind::StmtList(vars), span)
        }
    }

    /// A variable initializer: a brace-enclosed array literal (recursively),
    /// a string, or an expression.
    pub(super) fn parse_var_init(&mut self) -> ExprId {
        if self.try_match(TokenKind::LBrace) {
            let pos = self.current_pos();
            let mut elems = Vec::new();
            let mut ellipsis = false;
            loop {
                if self.peek(TokenKind::RBrace) {
                    break;
                }
                if self.try_match(TokenKind::Ellipsis) {
                    ellipsis = true;
                    break;
                }
                elems.push(self.parse_var_init());
                if !self.try_match(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace);
            return self.add_expr(crate::ast::ExprKind::Array { elems, ellipsis }, pos);
        }

        let tok = self.peek_token();
        if tok.kind == TokenKind::StringLit {
            self.next_token();
            let value = self.parse_string_literal(self.text(tok.span));
            return self.add_expr(crate::ast::ExprKind::String(value), tok.span);
        }

        // Constness of non-local initializers is checked semantically.
        self.parse_assignment()
    }

    // ============================================================
    // Functions
    // ============================================================

    /// Parse the arguments and body (or terminator) of a function whose
    /// declarator has been parsed.
    pub(super) fn parse_function(
        &mut self,
        decl: Declinfo,
        kind: FunctionKind,
        is_public: bool,
        is_static: bool,
        is_stock: bool,
    ) -> Option<StmtId> {
        let pos = decl.name.map(|n| n.span).unwrap_or_else(|| self.current_pos());
        let name = self.decl_name_or_empty(&decl, pos);

        if !self.expect(TokenKind::LParen) {
            self.drop_line();
            return None;
        }
        let args = self.parse_function_args();

        let mut alias = None;
        let body = match kind {
            FunctionKind::Normal => {
                if !self.try_match(TokenKind::LBrace) {
                    return None;
                }
                let brace = self.current_pos();
                Some(self.parse_compound(brace))
            }
            FunctionKind::Native | FunctionKind::Forward => {
                // A native stub may bind to a differently-named
                // implementation.
                if self.try_match(TokenKind::Assign) {
                    alias = self.need_symbol();
                }
                self.expect_term();
                None
            }
        };

        Some(self.add_stmt(
            StmtKind::Function(FunctionDecl {
                name,
                type_ref: decl.type_ref,
                kind,
                args,
                body,
                is_public,
                is_static,
                is_stock,
                opertok: decl.opertok,
                alias,
            }),
            pos,
        ))
    }

    /// The argument list of a function declarator; the `(` has been
    /// consumed and the `)` is consumed on exit.
    pub(super) fn parse_function_args(&mut self) -> Vec<ArgDecl> {
        let mut args = Vec::new();

        if self.try_match(TokenKind::RParen) {
            return args;
        }

        loop {
            if self.peek(TokenKind::Eof) {
                break;
            }

            if self.try_match(TokenKind::Ellipsis) {
                // An untyped variadic tail.
                args.push(ArgDecl {
                    name: None,
                    type_ref: TypeRef::default(),
                    is_variadic: true,
                    default: None,
                });
            } else {
                let mut decl = Declinfo::default();
                self.parse_decl(&mut decl, DeclFlags::ARGUMENT);
                let default = if self.try_match(TokenKind::Assign) {
                    Some(self.parse_var_init())
                } else {
                    None
                };
                args.push(ArgDecl {
                    name: decl.name,
                    type_ref: decl.type_ref,
                    is_variadic: decl.is_variadic,
                    default,
                });
            }

            if !self.try_match(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen);
        args
    }

    // ============================================================
    // Enumerations
    // ============================================================

    pub(super) fn parse_enum(&mut self, vclass: VarClass) -> Option<StmtId> {
        let pos = self.current_pos();

        let label = if self.peek(TokenKind::Label) {
            let tok = self.next_token();
            let symbol = self.intern_span(tok.span);
            Some(Spanned::new(symbol, tok.span))
        } else {
            None
        };

        let name = self.match_symbol();
        if let Some(name) = name {
            let text = self.symbol_text(name.node).to_string();
            self.tags.add_tag_with_kind(&text, TagKind::Enum);
        }

        let mut increment = 1;
        let mut multiplier = 1;
        if self.try_match(TokenKind::LParen) {
            self.report(ErrorCode::DeprecatedEnumIncrement, self.current_pos());
            if self.try_match(TokenKind::AssignAdd) {
                increment = self.parse_const_expr().0;
            } else if self.try_match(TokenKind::AssignMul) {
                multiplier = self.parse_const_expr().0;
            } else if self.try_match(TokenKind::AssignShl) {
                let mut shift = self.parse_const_expr().0;
                while shift > 0 {
                    multiplier *= 2;
                    shift -= 1;
                }
            }
            self.expect(TokenKind::RParen);
        }

        let mut fields = Vec::new();
        self.expect(TokenKind::LBrace);
        loop {
            if self.peek(TokenKind::RBrace) || self.peek(TokenKind::Eof) {
                break;
            }

            if self.peek(TokenKind::Label) {
                let tok = self.next_token();
                self.report(ErrorCode::EnumFieldDimensions, tok.span);
            }

            let field_name = self.need_symbol();

            if self.try_match(TokenKind::LBracket) {
                // Sized fields went out with the tag era.
                self.report(ErrorCode::EnumFieldDimensions, self.current_pos());
                self.parse_const_expr();
                self.expect(TokenKind::RBracket);
            }

            let value = if self.try_match(TokenKind::Assign) {
                Some(self.parse_assignment())
            } else {
                None
            };

            if let Some(field_name) = field_name {
                fields.push(EnumField {
                    name: field_name,
                    value,
                });
            }

            if !self.try_match(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        self.try_match(TokenKind::Semi);

        Some(self.add_stmt(
            StmtKind::Enum(EnumDecl {
                label,
                name,
                vclass,
                increment,
                multiplier,
                fields,
            }),
            pos,
        ))
    }

    // ============================================================
    // Structs
    // ============================================================

    pub(super) fn parse_pstruct(&mut self) -> Option<StmtId> {
        let pos = self.current_pos();

        let name = self.need_symbol();
        if let Some(name) = name {
            let text = self.symbol_text(name.node).to_string();
            self.tags.add_tag_with_kind(&text, TagKind::Struct);
        }

        let mut fields = Vec::new();
        self.expect(TokenKind::LBrace);
        loop {
            if self.peek(TokenKind::RBrace) {
                break;
            }
            if self.peek(TokenKind::Eof) {
                self.report(ErrorCode::CompoundBlockNotClosed, pos);
                break;
            }

            self.expect(TokenKind::Public);

            let mut decl = Declinfo {
                type_ref: TypeRef {
                    ident: IdentKind::Scalar,
                    ..TypeRef::default()
                },
                ..Declinfo::default()
            };
            if !self.parse_new_decl(&mut decl, None, DeclFlags::FIELD) {
                self.drop_line();
                continue;
            }

            if let Some(field_name) = decl.name {
                fields.push(StructField {
                    name: field_name,
                    type_ref: decl.type_ref,
                });
            }

            self.require_newline(TerminatorPolicy::NewlineOrSemicolon);
        }
        self.expect(TokenKind::RBrace);
        self.try_match(TokenKind::Semi);

        Some(self.add_stmt(StmtKind::Pstruct(PstructDecl { name, fields }), pos))
    }

    // ============================================================
    // Typedefs and typesets
    // ============================================================

    pub(super) fn parse_typedef(&mut self) -> Option<StmtId> {
        let pos = self.current_pos();

        let Some(name) = self.need_symbol() else {
            return Some(self.add_stmt(StmtKind::Error, pos));
        };
        self.expect(TokenKind::Assign);

        let ftype = self.parse_function_type();
        Some(self.add_stmt(StmtKind::Typedef(TypedefDecl { name, ftype }), pos))
    }

    pub(super) fn parse_typeset(&mut self) -> Option<StmtId> {
        let pos = self.current_pos();

        let Some(name) = self.need_symbol() else {
            return Some(self.add_stmt(StmtKind::Error, pos));
        };

        let mut types = Vec::new();
        self.expect(TokenKind::LBrace);
        while !self.try_match(TokenKind::RBrace) {
            if self.peek(TokenKind::Eof) {
                self.report(ErrorCode::CompoundBlockNotClosed, pos);
                break;
            }
            types.push(self.parse_function_type());
        }

        self.require_newline(TerminatorPolicy::NewlineOrSemicolon);
        Some(self.add_stmt(StmtKind::Typeset(TypesetDecl { name, types }), pos))
    }

    // ============================================================
    // Using
    // ============================================================

    pub(super) fn parse_using(&mut self) -> Option<StmtId> {
        let pos = self.current_pos();

        if !self.parse_using_target() {
            self.drop_line();
            return Some(self.add_stmt(StmtKind::Error, pos));
        }

        self.require_newline(TerminatorPolicy::Semicolon);
        Some(self.add_stmt(StmtKind::Using, pos))
    }

    /// Only `__intrinsics__.Handle` may be imported.
    fn parse_using_target(&mut self) -> bool {
        let Some(root) = self.need_symbol() else {
            return false;
        };
        if self.symbol_text(root.node) != "__intrinsics__" {
            self.report(ErrorCode::InvalidUsing, root.span);
            return false;
        }
        if !self.expect(TokenKind::Dot) {
            return false;
        }
        let Some(item) = self.need_symbol() else {
            return false;
        };
        if self.symbol_text(item.node) != "Handle" {
            self.report(ErrorCode::InvalidUsing, item.span);
            return false;
        }
        true
    }

    // ============================================================
    // Constants
    // ============================================================

    /// `const [type] name = value, ...`. The restrictions on constant
    /// declarators are narrow enough that a bit of direct detection beats
    /// the full declarator grammar here.
    pub(super) fn parse_const(&mut self, vclass: VarClass) -> Option<StmtId> {
        let mut decls = Vec::new();

        loop {
            let pos = self.current_pos();

            let mut tag = Tag::INT;
            let mut is_new = false;
            let tok = self.next_token();
            match tok.kind {
                TokenKind::Int | TokenKind::Object | TokenKind::Char => {
                    tag = self.parse_new_typename(tok).unwrap_or(Tag::INT);
                    is_new = true;
                }
                TokenKind::Label => {
                    let text = self.text(tok.span).to_string();
                    tag = self.tags.add_tag(&text);
                }
                TokenKind::Ident => {
                    if self.peek(TokenKind::Ident) {
                        // Two symbols: the first is a type name.
                        tag = self.parse_new_typename(tok).unwrap_or(Tag::INT);
                        is_new = true;
                    } else {
                        // `const X = ...`; give the symbol back as the name.
                        self.push_back(tok);
                    }
                }
                _ => {
                    self.report(ErrorCode::InvalidType, tok.span);
                }
            }

            let name = self.need_symbol();

            self.expect(TokenKind::Assign);
            let (value, value_tag, _) = self.parse_const_expr();

            if let Some(name) = name {
                let type_ref = TypeRef {
                    tag,
                    is_const: true,
                    is_new,
                    ..TypeRef::default()
                };
                decls.push(self.add_stmt(
                    StmtKind::Const(ConstDecl {
                        name,
                        type_ref,
                        vclass,
                        value,
                        value_tag,
                    }),
                    pos,
                ));
            }

            if !self.try_match(TokenKind::Comma) {
                break;
            }
        }

        self.expect_term();

        match decls.len() {
            0 => None,
            1 => Some(decls[0]),
            _ => {
                let span = self.ast[decls[0]].span;
                Some(self.add_stmt(StmtKind::StmtList(decls), span))
            }
        }
    }

    // ============================================================
    // Static assertions
    // ============================================================

    pub(super) fn parse_static_assert(&mut self) -> Option<StmtId> {
        let pos = self.current_pos();

        self.expect(TokenKind::LParen);
        let (value, _, is_const) = self.parse_const_expr();

        let mut message = None;
        if self.try_match(TokenKind::Comma) && self.expect(TokenKind::StringLit) {
            let tok = self.prev_token();
            message = Some(self.parse_string_literal(self.text(tok.span)));
        }

        self.expect(TokenKind::RParen);
        self.require_newline(TerminatorPolicy::NewlineOrSemicolon);

        // A non-constant condition has already been reported; there is
        // nothing to assert.
        if !is_const {
            return None;
        }

        Some(self.add_stmt(StmtKind::StaticAssert { value, message }, pos))
    }

    // ============================================================
    // Methodmaps
    // ============================================================

    pub(super) fn parse_methodmap(&mut self) -> Option<StmtId> {
        let pos = self.current_pos();

        let Some(name) = self.need_symbol() else {
            self.drop_line();
            return Some(self.add_stmt(StmtKind::Error, pos));
        };
        let name_text = self.symbol_text(name.node).to_string();
        let map_tag = self.tags.add_tag_with_kind(&name_text, TagKind::Methodmap);

        let mut nullable = self.try_match(TokenKind::Nullable);
        let parent = if self.try_match(TokenKind::Lt) {
            self.need_symbol()
        } else {
            None
        };
        if !nullable {
            nullable = self.try_match(TokenKind::Nullable);
        }

        let mut methods = Vec::new();
        let mut properties = Vec::new();

        self.expect(TokenKind::LBrace);
        while !self.try_match(TokenKind::RBrace) {
            if self.peek(TokenKind::Eof) {
                self.report(ErrorCode::CompoundBlockNotClosed, pos);
                break;
            }

            if self.try_match(TokenKind::Property) {
                if let Some(property) = self.parse_methodmap_property() {
                    properties.push(property);
                }
                continue;
            }

            if !self.expect(TokenKind::Public) {
                self.next_token();
                self.drop_line();
                continue;
            }

            let is_static = self.try_match(TokenKind::Static);
            let is_native = self.try_match(TokenKind::Native);

            let mut decl = Declinfo::default();
            let tok = self.peek_token();
            if tok.kind == TokenKind::Ident {
                self.next_token();
                if self.peek(TokenKind::LParen) {
                    // A constructor: the method name is the methodmap's
                    // and the return type is implied.
                    let symbol = self.intern_span(tok.span);
                    decl.name = Some(Spanned::new(symbol, tok.span));
                    decl.type_ref.tag = map_tag;
                    decl.type_ref.is_new = true;
                } else {
                    self.push_back(tok);
                    if !self.parse_decl(&mut decl, DeclFlags::MAYBE_FUNCTION | DeclFlags::NEW) {
                        self.drop_line();
                        continue;
                    }
                }
            } else if !self.parse_decl(&mut decl, DeclFlags::MAYBE_FUNCTION | DeclFlags::NEW) {
                self.drop_line();
                continue;
            }

            let kind = if is_native {
                FunctionKind::Native
            } else {
                FunctionKind::Normal
            };
            if let Some(func) = self.parse_function(decl, kind, true, is_static, false) {
                methods.push(MethodmapMethod {
                    is_static,
                    decl: func,
                });
            } else {
                self.drop_line();
            }
        }
        self.try_match(TokenKind::Semi);

        Some(self.add_stmt(
            StmtKind::Methodmap(MethodmapDecl {
                name,
                parent,
                nullable,
                methods,
                properties,
            }),
            pos,
        ))
    }

    fn parse_methodmap_property(&mut self) -> Option<MethodmapProperty> {
        let mut type_ref = TypeRef {
            is_new: true,
            ..TypeRef::default()
        };
        let tok = self.next_token();
        type_ref.tag = self.parse_new_typename(tok).unwrap_or(Tag::INT);

        let name = self.need_symbol()?;

        let mut accessors = Vec::new();
        self.expect(TokenKind::LBrace);
        while !self.try_match(TokenKind::RBrace) {
            if self.peek(TokenKind::Eof) {
                self.report(ErrorCode::CompoundBlockNotClosed, name.span);
                break;
            }

            if !self.expect(TokenKind::Public) {
                self.next_token();
                self.drop_line();
                continue;
            }
            let is_native = self.try_match(TokenKind::Native);

            let Some(accessor_name) = self.need_symbol() else {
                self.drop_line();
                continue;
            };
            let text = self.symbol_text(accessor_name.node);
            if text != "get" && text != "set" {
                self.report(ErrorCode::InvalidDeclaration, accessor_name.span);
            }

            self.expect(TokenKind::LParen);
            let args = self.parse_function_args();

            let body = if is_native {
                self.expect_term();
                None
            } else if self.try_match(TokenKind::LBrace) {
                let brace = self.current_pos();
                Some(self.parse_compound(brace))
            } else {
                self.report(ErrorCode::InvalidDeclaration, accessor_name.span);
                self.drop_line();
                None
            };

            accessors.push(PropertyAccessor {
                name: accessor_name,
                is_native,
                args,
                body,
            });
        }

        Some(MethodmapProperty {
            type_ref,
            name,
            accessors,
        })
    }

    // ============================================================
    // Enum structs
    // ============================================================

    pub(super) fn parse_enum_struct(&mut self) -> Option<StmtId> {
        let pos = self.current_pos();

        let Some(name) = self.need_symbol() else {
            self.drop_line();
            return Some(self.add_stmt(StmtKind::Error, pos));
        };
        let name_text = self.symbol_text(name.node).to_string();
        self.tags.add_tag_with_kind(&name_text, TagKind::EnumStruct);

        let mut fields = Vec::new();
        let mut methods = Vec::new();

        self.expect(TokenKind::LBrace);
        while !self.try_match(TokenKind::RBrace) {
            if self.peek(TokenKind::Eof) {
                self.report(ErrorCode::CompoundBlockNotClosed, pos);
                break;
            }

            let mut decl = Declinfo::default();
            let flags = DeclFlags::NEW | DeclFlags::VARIABLE | DeclFlags::MAYBE_FUNCTION;
            if !self.parse_decl(&mut decl, flags) {
                self.drop_line();
                continue;
            }

            if self.peek(TokenKind::LParen) && decl.opertok.is_none() {
                if let Some(func) =
                    self.parse_function(decl, FunctionKind::Normal, false, false, false)
                {
                    methods.push(func);
                } else {
                    self.drop_line();
                }
            } else {
                if let Some(field_name) = decl.name {
                    fields.push(StructField {
                        name: field_name,
                        type_ref: decl.type_ref,
                    });
                }
                self.require_newline(TerminatorPolicy::NewlineOrSemicolon);
            }
        }
        self.try_match(TokenKind::Semi);

        Some(self.add_stmt(
            StmtKind::EnumStruct(EnumStructDecl {
                name,
                fields,
                methods,
            }),
            pos,
        ))
    }
}
