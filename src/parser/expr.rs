//! The expression grammar.
//!
//! Expressions are parsed by tiered recursive descent: one function per
//! precedence level, from assignment at the bottom to the postfix chain and
//! primaries at the top. The left-associative binary tiers share a single
//! climb helper parameterized by their operator set; the relational tier
//! folds a whole run of comparisons into one chained node so that
//! `a < b < c` keeps all of its terms.

use super::Parser;
use crate::ast::{
    BinOp, CallArg, CastKind, CompareKind, CompareOp, Expr, ExprId, ExprKind, FieldSep, IncDecOp,
    LogicalOp, Rational, StructInitField, UnaryOp,
};
use crate::diagnostics::ErrorCode;
use crate::lexer::TokenKind;
use crate::span::Span;
use crate::types::Tag;

/// Operator sets for the left-associative binary tiers.
const OPS_LOGIC_OR: &[TokenKind] = &[TokenKind::LogicOr];
const OPS_LOGIC_AND: &[TokenKind] = &[TokenKind::LogicAnd];
const OPS_BIT_OR: &[TokenKind] = &[TokenKind::Pipe];
const OPS_BIT_XOR: &[TokenKind] = &[TokenKind::Caret];
const OPS_BIT_AND: &[TokenKind] = &[TokenKind::Ampersand];
const OPS_EQUALITY: &[TokenKind] = &[TokenKind::EqEq, TokenKind::NotEq];
const OPS_RELATIONAL: &[TokenKind] = &[TokenKind::Lt, TokenKind::Le, TokenKind::Gt, TokenKind::Ge];
const OPS_SHIFT: &[TokenKind] = &[TokenKind::Shl, TokenKind::Shr, TokenKind::Shru];
const OPS_ADDITIVE: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus];
const OPS_MULTIPLICATIVE: &[TokenKind] = &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent];

/// Map an assignment token to its operator.
fn assign_op(kind: TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Assign => Some(BinOp::Assign),
        TokenKind::AssignAdd => Some(BinOp::AssignAdd),
        TokenKind::AssignSub => Some(BinOp::AssignSub),
        TokenKind::AssignMul => Some(BinOp::AssignMul),
        TokenKind::AssignDiv => Some(BinOp::AssignDiv),
        TokenKind::AssignMod => Some(BinOp::AssignMod),
        TokenKind::AssignAnd => Some(BinOp::AssignAnd),
        TokenKind::AssignOr => Some(BinOp::AssignOr),
        TokenKind::AssignXor => Some(BinOp::AssignXor),
        TokenKind::AssignShl => Some(BinOp::AssignShl),
        TokenKind::AssignShr => Some(BinOp::AssignShr),
        TokenKind::AssignShru => Some(BinOp::AssignShru),
        _ => None,
    }
}

/// Map a binary operator token to its operator.
fn binary_op(kind: TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Sub),
        TokenKind::Star => Some(BinOp::Mul),
        TokenKind::Slash => Some(BinOp::Div),
        TokenKind::Percent => Some(BinOp::Mod),
        TokenKind::Shl => Some(BinOp::Shl),
        TokenKind::Shr => Some(BinOp::Shr),
        TokenKind::Shru => Some(BinOp::Shru),
        TokenKind::Ampersand => Some(BinOp::BitAnd),
        TokenKind::Pipe => Some(BinOp::BitOr),
        TokenKind::Caret => Some(BinOp::BitXor),
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::NotEq => Some(BinOp::Ne),
        _ => None,
    }
}

fn logical_op(kind: TokenKind) -> Option<LogicalOp> {
    match kind {
        TokenKind::LogicAnd => Some(LogicalOp::And),
        TokenKind::LogicOr => Some(LogicalOp::Or),
        _ => None,
    }
}

fn relational_op(kind: TokenKind) -> Option<CompareKind> {
    match kind {
        TokenKind::Lt => Some(CompareKind::Lt),
        TokenKind::Le => Some(CompareKind::Le),
        TokenKind::Gt => Some(CompareKind::Gt),
        TokenKind::Ge => Some(CompareKind::Ge),
        _ => None,
    }
}

impl<'src> Parser<'src> {
    pub(crate) fn add_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.ast.alloc_expr(Expr { kind, span })
    }

    /// Parse one expression at the assignment level. This is the entry
    /// point every other production uses; commas above this level separate
    /// list elements, not expressions.
    pub(crate) fn parse_assignment(&mut self) -> ExprId {
        let node = self.parse_ternary();

        let tok = self.peek_token();
        let Some(op) = assign_op(tok.kind) else {
            return node;
        };
        self.next_token();

        if tok.kind == TokenKind::Assign && self.flags.in_test {
            self.report(ErrorCode::PossiblyUnintendedAssignment, tok.span);
        }

        // Right-associative: the entire remainder is the value.
        let right = self.parse_assignment();
        let span = self.ast[node].span;
        self.add_expr(
            ExprKind::Binary {
                op,
                left: node,
                right,
            },
            span,
        )
    }

    /// The ternary `?:` level, right-associative.
    fn parse_ternary(&mut self) -> ExprId {
        let node = self.parse_logical_or();
        if !self.try_match(TokenKind::Question) {
            return node;
        }

        // Tag labels are ambiguous against the `:` separator here.
        let on_true = self.with_allow_tags(false, |p| p.parse_ternary());
        self.expect(TokenKind::Colon);
        let on_false = self.parse_ternary();

        let span = self.ast[node].span;
        self.add_expr(
            ExprKind::Ternary {
                cond: node,
                on_true,
                on_false,
            },
            span,
        )
    }

    /// Shared climb for the left-associative binary tiers.
    fn parse_binary_tier(
        &mut self,
        ops: &[TokenKind],
        next: fn(&mut Self) -> ExprId,
    ) -> ExprId {
        let mut node = next(self);

        loop {
            let kind = self.peek_token().kind;
            if !ops.contains(&kind) {
                break;
            }
            self.next_token();

            let right = next(self);
            let span = self.ast[node].span;
            if let Some(op) = logical_op(kind) {
                node = self.add_expr(
                    ExprKind::Logical {
                        op,
                        left: node,
                        right,
                    },
                    span,
                );
            } else if let Some(op) = binary_op(kind) {
                node = self.add_expr(
                    ExprKind::Binary {
                        op,
                        left: node,
                        right,
                    },
                    span,
                );
            }
        }

        node
    }

    fn parse_logical_or(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_LOGIC_OR, Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_LOGIC_AND, Self::parse_bit_or)
    }

    fn parse_bit_or(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_BIT_OR, Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_BIT_XOR, Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_BIT_AND, Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_EQUALITY, Self::parse_relational)
    }

    /// The relational tier. A run of comparisons folds into a single
    /// chained node instead of nesting.
    fn parse_relational(&mut self) -> ExprId {
        let first = self.parse_shift();

        if !OPS_RELATIONAL.contains(&self.peek_token().kind) {
            return first;
        }

        let mut ops = Vec::new();
        loop {
            let tok = self.peek_token();
            let Some(op) = relational_op(tok.kind) else {
                break;
            };
            self.next_token();
            let rhs = self.parse_shift();
            ops.push(CompareOp {
                op,
                span: tok.span,
                rhs,
            });
        }

        let span = self.ast[first].span;
        self.add_expr(ExprKind::ChainedCompare { first, ops }, span)
    }

    fn parse_shift(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_SHIFT, Self::parse_addition)
    }

    fn parse_addition(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_ADDITIVE, Self::parse_multiplication)
    }

    fn parse_multiplication(&mut self) -> ExprId {
        self.parse_binary_tier(OPS_MULTIPLICATIVE, Self::parse_unary)
    }

    /// The unary/prefix level, plus the postfix `++`/`--` check.
    fn parse_unary(&mut self) -> ExprId {
        let tok = self.peek_token();
        let pos = tok.span;

        match tok.kind {
            TokenKind::Inc | TokenKind::Dec => {
                self.next_token();
                let op = if tok.kind == TokenKind::Inc {
                    IncDecOp::Inc
                } else {
                    IncDecOp::Dec
                };
                let operand = self.parse_unary();
                return self.add_expr(ExprKind::PreIncDec { op, operand }, pos);
            }
            TokenKind::Tilde | TokenKind::Minus | TokenKind::Not => {
                self.next_token();
                let op = match tok.kind {
                    TokenKind::Tilde => UnaryOp::Invert,
                    TokenKind::Minus => UnaryOp::Neg,
                    _ => UnaryOp::Not,
                };
                let operand = self.parse_unary();
                return self.add_expr(ExprKind::Unary { op, operand }, pos);
            }
            TokenKind::New => {
                self.next_token();
                return self.parse_new_expr(pos);
            }
            TokenKind::Label => {
                self.next_token();
                let name = self.text(tok.span).to_string();
                let tag = self.tags.add_tag(&name);
                if self.options.require_newdecls {
                    self.report_msg(
                        ErrorCode::LegacyCast,
                        tok.span,
                        format!("legacy cast \"{}:\" used; use view_as instead", name),
                    );
                }
                let operand = self.parse_unary();
                return self.add_expr(
                    ExprKind::Cast {
                        kind: CastKind::Label,
                        tag,
                        operand,
                    },
                    pos,
                );
            }
            TokenKind::Defined => {
                self.next_token();
                return self.parse_defined(pos);
            }
            TokenKind::Sizeof => {
                self.next_token();
                return self.parse_sizeof(pos);
            }
            _ => {}
        }

        let node = self.parse_postfix();

        // A terminator ends the expression before any postfix operator is
        // considered; `x` on one line and `++` on the next are separate
        // statements when semicolons are optional.
        let next = self.peek_token();
        if next.kind == TokenKind::Semi {
            return node;
        }
        if !self.options.need_semicolon
            && (next.kind == TokenKind::Eof || next.first_on_line)
        {
            return node;
        }

        if next.kind == TokenKind::Inc || next.kind == TokenKind::Dec {
            self.next_token();
            let op = if next.kind == TokenKind::Inc {
                IncDecOp::Inc
            } else {
                IncDecOp::Dec
            };
            let span = self.ast[node].span;
            return self.add_expr(ExprKind::PostIncDec { op, operand: node }, span);
        }

        node
    }

    /// The postfix chain: field access, indexing, and calls.
    fn parse_postfix(&mut self) -> ExprId {
        let mut base = if self.try_match(TokenKind::ViewAs) {
            let pos = self.current_pos();
            self.parse_view_as(pos)
        } else {
            self.parse_primary()
        };

        loop {
            let tok = self.peek_token();
            match tok.kind {
                TokenKind::Dot | TokenKind::DoubleColon => {
                    self.next_token();
                    let sep = if tok.kind == TokenKind::Dot {
                        FieldSep::Dot
                    } else {
                        FieldSep::DoubleColon
                    };
                    let Some(field) = self.need_symbol() else {
                        break;
                    };
                    let span = self.ast[base].span;
                    base = self.add_expr(
                        ExprKind::FieldAccess {
                            sep,
                            base,
                            field: field.node,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.next_token();
                    let index = self.parse_assignment();
                    self.expect(TokenKind::RBracket);
                    let span = self.ast[base].span;
                    base = self.add_expr(ExprKind::Index { base, index }, span);
                }
                TokenKind::LParen => {
                    self.next_token();
                    base = self.parse_call(base);
                }
                _ => break,
            }
        }

        base
    }

    /// Primaries: parenthesized expression lists, `this`, symbols, and
    /// constants.
    fn parse_primary(&mut self) -> ExprId {
        if self.try_match(TokenKind::LParen) {
            let pos = self.current_pos();
            // Not a test expression inside parentheses, and tag labels are
            // usable again.
            return self.with_in_test(false, |p| {
                p.with_allow_tags(true, |p| {
                    let mut elems = vec![p.parse_assignment()];
                    while p.try_match(TokenKind::Comma) {
                        elems.push(p.parse_assignment());
                    }
                    p.expect(TokenKind::RParen);
                    if elems.len() == 1 {
                        elems[0]
                    } else {
                        p.add_expr(ExprKind::Comma(elems), pos)
                    }
                })
            });
        }

        let tok = self.next_token();
        match tok.kind {
            TokenKind::This => self.add_expr(ExprKind::This, tok.span),
            TokenKind::Ident => {
                let symbol = self.intern_span(tok.span);
                self.add_expr(ExprKind::Symbol(symbol), tok.span)
            }
            _ => {
                self.push_back(tok);
                self.parse_constant()
            }
        }
    }

    /// Literal constants, including `{...}` array literals.
    fn parse_constant(&mut self) -> ExprId {
        let tok = self.next_token();
        let pos = tok.span;
        match tok.kind {
            TokenKind::Null => self.add_expr(ExprKind::Null, pos),
            TokenKind::IntLit => {
                let value = self.parse_int_literal(self.text(pos));
                self.add_expr(ExprKind::Number(value), pos)
            }
            TokenKind::CharLit => {
                let value = self.parse_char_literal(self.text(pos));
                self.add_expr(ExprKind::Number(value), pos)
            }
            TokenKind::RationalLit => {
                let value = self.parse_rational_literal(self.text(pos));
                self.add_expr(ExprKind::Rational(Rational(value)), pos)
            }
            TokenKind::StringLit => {
                let value = self.parse_string_literal(self.text(pos));
                self.add_expr(ExprKind::String(value), pos)
            }
            TokenKind::LBrace => {
                let mut elems = Vec::new();
                let mut ellipsis = false;
                loop {
                    if self.try_match(TokenKind::Ellipsis) {
                        ellipsis = true;
                        break;
                    }
                    elems.push(self.parse_assignment());
                    if !self.try_match(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace);
                self.add_expr(ExprKind::Array { elems, ellipsis }, pos)
            }
            _ => {
                self.report(ErrorCode::InvalidExpression, pos);
                self.add_expr(ExprKind::Error, pos)
            }
        }
    }

    /// The argument list of a call; the opening `(` has been consumed.
    pub(super) fn parse_call(&mut self, target: ExprId) -> ExprId {
        let pos = self.current_pos();
        let mut args = Vec::new();

        if self.try_match(TokenKind::RParen) {
            return self.add_expr(ExprKind::Call { target, args }, pos);
        }

        let mut named = false;
        loop {
            let mut name = None;
            if self.try_match(TokenKind::Dot) {
                named = true;
                let Some(arg_name) = self.need_symbol() else {
                    break;
                };
                self.expect(TokenKind::Assign);
                name = Some(arg_name);
            } else if named {
                let span = self.peek_token().span;
                self.report(ErrorCode::PositionalAfterNamed, span);
            }

            // `_` leaves the argument slot empty.
            let value = if self.try_match(TokenKind::Underscore) {
                None
            } else {
                Some(self.parse_assignment())
            };

            args.push(CallArg { name, value });

            if self.try_match(TokenKind::RParen) {
                break;
            }
            if !self.expect(TokenKind::Comma) {
                break;
            }
            if self.peek(TokenKind::Eof) {
                break;
            }
        }

        self.add_expr(ExprKind::Call { target, args }, pos)
    }

    /// `view_as<T>(expr)`.
    pub(super) fn parse_view_as(&mut self, pos: Span) -> ExprId {
        self.expect(TokenKind::Lt);
        let tag = {
            let tok = self.next_token();
            self.parse_new_typename(tok).unwrap_or(Tag::INT)
        };
        self.expect(TokenKind::Gt);

        let paren = self.expect(TokenKind::LParen);
        let operand = self.parse_assignment();
        if paren {
            self.expect(TokenKind::RParen);
        } else {
            self.try_match(TokenKind::RParen);
        }

        self.add_expr(
            ExprKind::Cast {
                kind: CastKind::ViewAs,
                tag,
                operand,
            },
            pos,
        )
    }

    /// `new Ident(args)` constructor calls and `new T[n]` allocations.
    fn parse_new_expr(&mut self, pos: Span) -> ExprId {
        let tok = self.peek_token();
        if tok.kind == TokenKind::Ident {
            self.next_token();
            if self.try_match(TokenKind::LParen) {
                let symbol = self.intern_span(tok.span);
                let target = self.add_expr(ExprKind::Symbol(symbol), tok.span);
                return self.parse_call(target);
            }
            self.push_back(tok);
        }

        let tag = {
            let tok = self.next_token();
            self.parse_new_typename(tok).unwrap_or(Tag::INT)
        };

        if !self.expect(TokenKind::LBracket) {
            return self.add_expr(ExprKind::Error, pos);
        }
        self.parse_new_array(pos, tag)
    }

    /// The dimension list of `new T[a][b]`; the first `[` is consumed.
    fn parse_new_array(&mut self, pos: Span, tag: Tag) -> ExprId {
        let mut dims = Vec::new();
        loop {
            dims.push(self.parse_assignment());
            self.expect(TokenKind::RBracket);
            if !self.try_match(TokenKind::LBracket) {
                break;
            }
        }
        self.add_expr(ExprKind::NewArray { tag, dims }, pos)
    }

    /// `defined name`, with any number of matched parentheses.
    fn parse_defined(&mut self, pos: Span) -> ExprId {
        let mut parens = 0;
        while self.try_match(TokenKind::LParen) {
            parens += 1;
        }

        let Some(name) = self.need_symbol() else {
            return self.add_expr(ExprKind::Error, pos);
        };

        for _ in 0..parens {
            self.expect(TokenKind::RParen);
        }
        self.add_expr(ExprKind::IsDefined(name.node), pos)
    }

    /// `sizeof name`, `sizeof name[]`, `sizeof name.field`, and the
    /// parenthesized spellings of each.
    fn parse_sizeof(&mut self, pos: Span) -> ExprId {
        let mut parens = 0;
        while self.try_match(TokenKind::LParen) {
            parens += 1;
        }

        let name = if self.try_match(TokenKind::This) {
            self.intern("this")
        } else {
            match self.need_symbol() {
                Some(sym) => sym.node,
                None => return self.add_expr(ExprKind::Error, pos),
            }
        };

        let mut array_levels = 0u32;
        while self.try_match(TokenKind::LBracket) {
            array_levels += 1;
            self.expect(TokenKind::RBracket);
        }

        let mut field = None;
        let mut field_sep = None;
        let tok = self.peek_token();
        if tok.kind == TokenKind::Dot || tok.kind == TokenKind::DoubleColon {
            self.next_token();
            let Some(field_name) = self.need_symbol() else {
                return self.add_expr(ExprKind::Error, pos);
            };
            field = Some(field_name.node);
            field_sep = Some(if tok.kind == TokenKind::Dot {
                FieldSep::Dot
            } else {
                FieldSep::DoubleColon
            });
        }

        for _ in 0..parens {
            self.expect(TokenKind::RParen);
        }

        self.add_expr(
            ExprKind::Sizeof {
                name,
                field,
                field_sep,
                array_levels,
            },
            pos,
        )
    }

    /// A full expression as statements use it: one or more assignment-level
    /// expressions separated by commas. More than one element forms a comma
    /// expression. With `parens`, the expression is a test wrapped in
    /// parentheses.
    pub(crate) fn parse_comma_expr(&mut self, parens: bool) -> ExprId {
        self.with_in_test(parens, |p| {
            if parens {
                p.expect(TokenKind::LParen);
            }

            let mut elems = vec![p.parse_assignment()];
            while p.try_match(TokenKind::Comma) {
                elems.push(p.parse_assignment());
            }

            if parens {
                p.expect(TokenKind::RParen);
            }

            if elems.len() == 1 {
                elems[0]
            } else {
                let span = p.ast[elems[0]].span;
                p.add_expr(ExprKind::Comma(elems), span)
            }
        })
    }

    /// A struct initializer body; the `{` has been consumed. Field values
    /// are restricted to literal constants.
    pub(super) fn parse_struct_init(&mut self) -> ExprId {
        let pos = self.current_pos();
        let mut fields = Vec::new();

        loop {
            let name = self.need_symbol();
            self.expect(TokenKind::Assign);

            let tok = self.next_token();
            let value = match tok.kind {
                TokenKind::StringLit => {
                    let value = self.parse_string_literal(self.text(tok.span));
                    Some(self.add_expr(ExprKind::String(value), tok.span))
                }
                TokenKind::IntLit => {
                    let value = self.parse_int_literal(self.text(tok.span));
                    Some(self.add_expr(ExprKind::Number(value), tok.span))
                }
                TokenKind::CharLit => {
                    let value = self.parse_char_literal(self.text(tok.span));
                    Some(self.add_expr(ExprKind::Number(value), tok.span))
                }
                TokenKind::RationalLit => {
                    let value = self.parse_rational_literal(self.text(tok.span));
                    Some(self.add_expr(ExprKind::Rational(Rational(value)), tok.span))
                }
                _ => {
                    self.report_msg(
                        ErrorCode::ExpectedToken,
                        tok.span,
                        format!(
                            "expected a literal constant, but found {}",
                            tok.kind.description()
                        ),
                    );
                    None
                }
            };

            if let (Some(name), Some(value)) = (name, value) {
                fields.push(StructInitField { name, value });
            }

            if !self.try_match(TokenKind::Comma) || self.peek(TokenKind::RBrace) {
                break;
            }
        }

        self.expect(TokenKind::RBrace);
        self.add_expr(ExprKind::StructInit { fields }, pos)
    }
}
