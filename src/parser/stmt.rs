//! The statement grammar.
//!
//! Statements begin by reading one token. A bare identifier is the
//! interesting case: `MyType x` opens a declaration while `x = 1` opens an
//! expression, and telling them apart takes a peek at the following token
//! (two, for the `x[]` spelling) with push-back. Everything else
//! dispatches directly on the leading token.

use super::Parser;
use crate::ast::{
    ExprKind, LoopControl, LoopKind, Stmt, StmtId, StmtKind, SwitchCase, VarClass,
};
use crate::diagnostics::ErrorCode;
use crate::lexer::TokenKind;
use crate::span::Span;

impl<'src> Parser<'src> {
    pub(crate) fn add_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.ast.alloc_stmt(Stmt { kind, span })
    }

    /// Parse one statement. `last_indent` carries the indentation of the
    /// previous statement in the enclosing block for the loose-indentation
    /// warning; `allow_decl` is false in positions that take a single
    /// statement (loop bodies, case arms).
    pub(crate) fn parse_stmt(
        &mut self,
        last_indent: Option<&mut i32>,
        allow_decl: bool,
    ) -> Option<StmtId> {
        if self.peek(TokenKind::Eof) {
            let span = self.peek_token().span;
            self.report(ErrorCode::EmptyStatement, span);
            return None;
        }

        self.stmt_error = false;

        let tok = self.next_token();

        if let Some(last_indent) = last_indent {
            if tok.kind != TokenKind::Label && self.options.tab_size > 0 {
                let indent = tok.span.col as i32;
                if *last_indent >= 0 && *last_indent != indent {
                    self.report(ErrorCode::LooseIndentation, tok.span);
                }
                *last_indent = indent;
            }
        }

        // Declaration-or-expression disambiguation for a leading
        // identifier: a second identifier, or `[` directly followed by `]`,
        // means a declaration.
        if tok.kind == TokenKind::Ident {
            let mut is_decl = false;
            let next = self.peek_token();
            if next.kind == TokenKind::LBracket {
                self.next_token();
                if self.peek(TokenKind::RBracket) {
                    is_decl = true;
                }
                self.push_back(next);
            } else if next.kind == TokenKind::Ident {
                is_decl = true;
            }

            if is_decl {
                if !allow_decl {
                    self.report(ErrorCode::LocalDeclarationNotAllowed, tok.span);
                    return None;
                }
                self.push_back(tok);
                return self.parse_local_decl(TokenKind::Ident, true);
            }
        }

        match tok.kind {
            TokenKind::Int | TokenKind::Void | TokenKind::Char | TokenKind::Object => {
                if !allow_decl {
                    self.report(ErrorCode::LocalDeclarationNotAllowed, tok.span);
                    return None;
                }
                self.push_back(tok);
                self.parse_local_decl(tok.kind, true)
            }
            TokenKind::Decl | TokenKind::Static | TokenKind::New => {
                if tok.kind == TokenKind::New {
                    // `new Foo(...)` is a constructor call, not a
                    // declaration.
                    let sym = self.peek_token();
                    if sym.kind == TokenKind::Ident {
                        self.next_token();
                        if self.peek(TokenKind::LParen) {
                            self.push_back(sym);
                            self.push_back(tok);
                            return self.parse_expr_stmt();
                        }
                        self.push_back(sym);
                    }
                }
                if !allow_decl {
                    self.report(ErrorCode::LocalDeclarationNotAllowed, tok.span);
                    return None;
                }
                self.parse_local_decl(tok.kind, tok.kind != TokenKind::Decl)
            }
            TokenKind::If => self.parse_if(tok.span),
            TokenKind::Const => self.parse_const(VarClass::Local),
            TokenKind::Enum => self.parse_enum(VarClass::Local),
            TokenKind::Case | TokenKind::Default => {
                self.report(ErrorCode::NotInSwitch, tok.span);
                None
            }
            TokenKind::LBrace => {
                if self.try_match(TokenKind::RBrace) {
                    return Some(self.add_stmt(StmtKind::StmtList(Vec::new()), tok.span));
                }
                Some(self.parse_compound(tok.span))
            }
            TokenKind::Semi => {
                self.report(ErrorCode::EmptyStatement, tok.span);
                None
            }
            TokenKind::Break | TokenKind::Continue => {
                let pos = tok.span;
                self.expect_term();
                if !self.flags.in_loop {
                    self.report(ErrorCode::LoopControlOutsideLoop, pos);
                    return None;
                }
                let which = if tok.kind == TokenKind::Break {
                    LoopControl::Break
                } else {
                    LoopControl::Continue
                };
                Some(self.add_stmt(StmtKind::LoopControl(which), pos))
            }
            TokenKind::Return => {
                let pos = tok.span;
                let expr = if self.try_match_term() {
                    None
                } else {
                    let expr = self.parse_assignment();
                    self.expect_term();
                    Some(expr)
                };
                Some(self.add_stmt(StmtKind::Return(expr), pos))
            }
            TokenKind::Assert => {
                let pos = tok.span;
                let expr = self.parse_comma_expr(true);
                self.expect_term();
                Some(self.add_stmt(StmtKind::Assert(expr), pos))
            }
            TokenKind::Delete => {
                let pos = tok.span;
                let expr = self.parse_comma_expr(false);
                self.expect_term();
                Some(self.add_stmt(StmtKind::Delete(expr), pos))
            }
            TokenKind::Exit => {
                let pos = tok.span;
                let expr = if self.try_match_term() {
                    None
                } else {
                    let expr = self.parse_comma_expr(false);
                    self.expect_term();
                    Some(expr)
                };
                Some(self.add_stmt(StmtKind::Exit(expr), pos))
            }
            TokenKind::Do => {
                let pos = tok.span;
                let body = self.with_in_loop(true, |p| p.parse_stmt(None, false));
                self.expect(TokenKind::While);
                let parens = self.try_match(TokenKind::LParen);
                let cond = self.parse_comma_expr(false);
                if parens {
                    self.expect(TokenKind::RParen);
                } else {
                    self.report(ErrorCode::MissingParentheses, self.current_pos());
                }
                self.expect_term();
                let body = body?;
                Some(self.add_stmt(
                    StmtKind::Loop {
                        kind: LoopKind::Do,
                        cond,
                        body,
                    },
                    pos,
                ))
            }
            TokenKind::While => {
                let pos = tok.span;
                let cond = self.parse_comma_expr(true);
                let body = self.with_in_loop(true, |p| p.parse_stmt(None, false))?;
                Some(self.add_stmt(
                    StmtKind::Loop {
                        kind: LoopKind::While,
                        cond,
                        body,
                    },
                    pos,
                ))
            }
            TokenKind::For => self.parse_for(tok.span),
            TokenKind::Switch => self.parse_switch(tok.span),
            _ => {
                self.push_back(tok);
                self.parse_expr_stmt()
            }
        }
    }

    fn parse_expr_stmt(&mut self) -> Option<StmtId> {
        let expr = self.parse_comma_expr(false);
        self.expect_term();
        let span = self.ast[expr].span;
        Some(self.add_stmt(StmtKind::Expr(expr), span))
    }

    /// Parse a compound block; the `{` has been consumed and `start` is its
    /// span (for the unclosed-block diagnostic).
    pub(crate) fn parse_compound(&mut self, start: Span) -> StmtId {
        let mut stmts = Vec::new();
        let mut indent = -1i32;

        loop {
            if self.try_match(TokenKind::RBrace) {
                break;
            }
            if self.peek(TokenKind::Eof) {
                self.report_msg(
                    ErrorCode::CompoundBlockNotClosed,
                    start,
                    format!(
                        "compound block opened on line {} is not closed at the end of file",
                        start.line
                    ),
                );
                break;
            }
            if let Some(stmt) = self.parse_stmt(Some(&mut indent), true) {
                stmts.push(stmt);
            }
        }

        self.add_stmt(StmtKind::Block(stmts), start)
    }

    /// A local declaration statement. `lead` is the introducing token kind:
    /// `new`/`decl` force the legacy declarator form, a bare identifier the
    /// new form, and type keywords fall through to detection.
    pub(crate) fn parse_local_decl(&mut self, lead: TokenKind, autozero: bool) -> Option<StmtId> {
        use crate::ast::DeclFlags;

        let mut flags = DeclFlags::VARIABLE | DeclFlags::ENUMROOT;
        match lead {
            TokenKind::New | TokenKind::Decl => flags |= DeclFlags::OLD,
            TokenKind::Ident => flags |= DeclFlags::NEW,
            _ => {}
        }

        let mut decl = crate::ast::Declinfo::default();
        if !self.parse_decl(&mut decl, flags) {
            self.drop_line();
            return Some(self.add_stmt(StmtKind::Error, self.current_pos()));
        }

        let vclass = if lead == TokenKind::Static {
            VarClass::Static
        } else {
            VarClass::Local
        };
        Some(self.parse_var(
            decl,
            super::item::VarParams {
                vclass,
                is_public: false,
                is_static: false,
                is_stock: false,
                autozero,
            },
        ))
    }

    fn parse_if(&mut self, pos: Span) -> Option<StmtId> {
        let if_indent = pos.col as i32;
        let cond = self.parse_comma_expr(true);
        let on_true = self.parse_stmt(None, false);

        let mut on_false = None;
        if self.try_match(TokenKind::Else) {
            // A dangling else with a shallower indent than its `if` is
            // probably bound to the wrong one.
            let else_indent = self.current_pos().col as i32;
            if else_indent < if_indent && self.options.tab_size > 0 {
                self.report(ErrorCode::LooseIndentation, self.current_pos());
            }
            on_false = Some(self.parse_stmt(None, false)?);
        }

        let on_true = on_true?;
        Some(self.add_stmt(
            StmtKind::If {
                cond,
                on_true,
                on_false,
            },
            pos,
        ))
    }

    fn parse_for(&mut self, pos: Span) -> Option<StmtId> {
        let paren = self.try_match(TokenKind::LParen);
        // Without a parenthesis the loop head has no reliable shape; `do`
        // becomes the recovery pivot for the advance clause.
        let end_tok = if paren {
            TokenKind::RParen
        } else {
            self.report(ErrorCode::MissingParentheses, self.current_pos());
            TokenKind::Do
        };

        let mut init = None;
        if !self.try_match(TokenKind::Semi) {
            let tok = self.next_token();
            match tok.kind {
                TokenKind::Int | TokenKind::Char | TokenKind::Object | TokenKind::Void => {
                    self.push_back(tok);
                    init = self.parse_local_decl(tok.kind, true);
                }
                TokenKind::New => {
                    init = self.parse_local_decl(TokenKind::New, true);
                }
                TokenKind::Ident => {
                    // Same look-ahead as the statement dispatcher.
                    let mut is_decl = false;
                    let next = self.peek_token();
                    if next.kind == TokenKind::LBracket {
                        self.next_token();
                        if self.peek(TokenKind::RBracket) {
                            is_decl = true;
                        }
                        self.push_back(next);
                    } else if next.kind == TokenKind::Ident {
                        is_decl = true;
                    }

                    self.push_back(tok);
                    if is_decl {
                        init = self.parse_local_decl(TokenKind::Ident, true);
                    } else {
                        let expr = self.parse_comma_expr(false);
                        let span = self.ast[expr].span;
                        init = Some(self.add_stmt(StmtKind::Expr(expr), span));
                        self.expect(TokenKind::Semi);
                    }
                }
                _ => {
                    self.push_back(tok);
                    let expr = self.parse_comma_expr(false);
                    let span = self.ast[expr].span;
                    init = Some(self.add_stmt(StmtKind::Expr(expr), span));
                    self.expect(TokenKind::Semi);
                }
            }
        }

        let mut cond = None;
        if !self.try_match(TokenKind::Semi) {
            cond = Some(self.parse_comma_expr(false));
            self.expect(TokenKind::Semi);
        }

        let mut advance = None;
        if !self.try_match(end_tok) {
            advance = Some(self.parse_comma_expr(false));
            self.expect(end_tok);
        }

        let body = self.with_in_loop(true, |p| p.parse_stmt(None, false))?;
        Some(self.add_stmt(
            StmtKind::For {
                init,
                cond,
                advance,
                body,
            },
            pos,
        ))
    }

    fn parse_switch(&mut self, pos: Span) -> Option<StmtId> {
        let paren = self.try_match(TokenKind::LParen);
        let end_tok = if paren {
            TokenKind::RParen
        } else {
            self.report(ErrorCode::MissingParentheses, self.current_pos());
            TokenKind::Do
        };

        let cond = self.parse_comma_expr(false);
        self.expect(end_tok);

        let mut cases = Vec::new();
        let mut default_case = None;

        self.expect(TokenKind::LBrace);
        loop {
            let tok = self.next_token();
            match tok.kind {
                TokenKind::Case => {
                    if default_case.is_some() {
                        self.report(ErrorCode::DefaultMustBeLast, tok.span);
                    }
                    self.parse_case(&mut cases);
                }
                TokenKind::Default => {
                    self.expect(TokenKind::Colon);
                    if let Some(stmt) = self.parse_stmt(None, false) {
                        if default_case.is_some() {
                            self.report(ErrorCode::MultipleDefaults, tok.span);
                        } else {
                            default_case = Some(stmt);
                        }
                    }
                }
                TokenKind::RBrace => break,
                _ => {
                    self.report(ErrorCode::InvalidCaseStatement, tok.span);
                    break;
                }
            }
        }

        Some(self.add_stmt(
            StmtKind::Switch {
                cond,
                cases,
                default_case,
            },
            pos,
        ))
    }

    /// One `case expr, expr, ... :` arm. Commas separate case labels, so
    /// labels parse at assignment level, and tag labels are disabled
    /// against the trailing `:`.
    fn parse_case(&mut self, cases: &mut Vec<SwitchCase>) {
        let mut exprs = Vec::new();
        loop {
            let expr = self.with_allow_tags(false, |p| p.parse_assignment());
            if !matches!(self.ast[expr].kind, ExprKind::Error) {
                exprs.push(expr);
            }
            // Case ranges were never adopted; diagnose the attempt.
            if self.try_match(TokenKind::DotDot) {
                let span = self.current_pos();
                self.report_msg(
                    ErrorCode::ExpectedToken,
                    span,
                    "expected \":\", but found \"..\"".to_string(),
                );
            }
            if !self.try_match(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::Colon);

        let stmt = self.parse_stmt(None, false);
        if let Some(body) = stmt {
            if !exprs.is_empty() {
                cases.push(SwitchCase { exprs, body });
            }
        }
    }
}
