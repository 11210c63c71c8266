//! Compile-time constant expression evaluation.
//!
//! `const` initializers, `static_assert` conditions, and enumeration
//! increment specifiers must be compile-time constants. This module folds
//! an already-parsed expression tree down to a single cell value. It is
//! deliberately narrow: literals, the arithmetic/bitwise/logical operator
//! set, comparisons, and the ternary operator over constants. Anything that
//! needs name resolution (symbols, calls, indexing) is not constant at this
//! stage and yields [`EvalError::NotConstant`].
//!
//! Rational literals evaluate to their raw 32-bit cell representation, the
//! same bit pattern the emitter stores for them.

use crate::ast::{Ast, BinOp, Cell, ExprId, ExprKind, LogicalOp, UnaryOp};
use crate::diagnostics::EvalError;

/// Evaluate an expression to a cell value.
pub fn eval(ast: &Ast, id: ExprId) -> Result<Cell, EvalError> {
    let expr = ast.expr(id);
    let span = expr.span;

    match &expr.kind {
        ExprKind::Number(v) => Ok(*v),
        ExprKind::Rational(r) => Ok((r.0 as f32).to_bits() as Cell),
        ExprKind::Null => Ok(0),
        ExprKind::Unary { op, operand } => {
            let v = eval(ast, *operand)?;
            Ok(match op {
                UnaryOp::Neg => v.wrapping_neg(),
                UnaryOp::Not => (v == 0) as Cell,
                UnaryOp::Invert => !v,
            })
        }
        ExprKind::Binary { op, left, right } => {
            let lhs = eval(ast, *left)?;
            let rhs = eval(ast, *right)?;
            eval_binary(*op, lhs, rhs, span)
        }
        ExprKind::Logical { op, left, right } => {
            let lhs = eval(ast, *left)?;
            match op {
                LogicalOp::And => {
                    if lhs == 0 {
                        Ok(0)
                    } else {
                        Ok((eval(ast, *right)? != 0) as Cell)
                    }
                }
                LogicalOp::Or => {
                    if lhs != 0 {
                        Ok(1)
                    } else {
                        Ok((eval(ast, *right)? != 0) as Cell)
                    }
                }
            }
        }
        ExprKind::Ternary {
            cond,
            on_true,
            on_false,
        } => {
            if eval(ast, *cond)? != 0 {
                eval(ast, *on_true)
            } else {
                eval(ast, *on_false)
            }
        }
        ExprKind::ChainedCompare { first, ops } => {
            let mut lhs = eval(ast, *first)?;
            for link in ops {
                let rhs = eval(ast, link.rhs)?;
                let holds = match link.op {
                    crate::ast::CompareKind::Lt => lhs < rhs,
                    crate::ast::CompareKind::Le => lhs <= rhs,
                    crate::ast::CompareKind::Gt => lhs > rhs,
                    crate::ast::CompareKind::Ge => lhs >= rhs,
                };
                if !holds {
                    return Ok(0);
                }
                lhs = rhs;
            }
            Ok(1)
        }
        ExprKind::Cast { operand, .. } => eval(ast, *operand),
        ExprKind::Comma(elems) => match elems.last() {
            Some(last) => eval(ast, *last),
            None => Err(EvalError::NotConstant { span }),
        },
        _ => Err(EvalError::NotConstant { span }),
    }
}

fn eval_binary(op: BinOp, lhs: Cell, rhs: Cell, span: crate::span::Span) -> Result<Cell, EvalError> {
    Ok(match op {
        BinOp::Add => lhs.wrapping_add(rhs),
        BinOp::Sub => lhs.wrapping_sub(rhs),
        BinOp::Mul => lhs.wrapping_mul(rhs),
        BinOp::Div => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero { span });
            }
            lhs.wrapping_div(rhs)
        }
        BinOp::Mod => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero { span });
            }
            lhs.wrapping_rem(rhs)
        }
        BinOp::Shl => lhs.wrapping_shl(rhs as u32),
        BinOp::Shr => lhs.wrapping_shr(rhs as u32),
        BinOp::Shru => ((lhs as u32).wrapping_shr(rhs as u32)) as Cell,
        BinOp::BitAnd => lhs & rhs,
        BinOp::BitOr => lhs | rhs,
        BinOp::BitXor => lhs ^ rhs,
        BinOp::Eq => (lhs == rhs) as Cell,
        BinOp::Ne => (lhs != rhs) as Cell,
        // Assignments are never constant.
        _ => return Err(EvalError::NotConstant { span }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareKind, CompareOp, Expr, Rational};
    use crate::span::Span;

    fn num(ast: &mut Ast, v: Cell) -> ExprId {
        ast.alloc_expr(Expr {
            kind: ExprKind::Number(v),
            span: Span::dummy(),
        })
    }

    fn bin(ast: &mut Ast, op: BinOp, l: ExprId, r: ExprId) -> ExprId {
        ast.alloc_expr(Expr {
            kind: ExprKind::Binary { op, left: l, right: r },
            span: Span::dummy(),
        })
    }

    #[test]
    fn test_arithmetic() {
        let mut ast = Ast::new();
        let a = num(&mut ast, 6);
        let b = num(&mut ast, 7);
        let e = bin(&mut ast, BinOp::Mul, a, b);
        assert_eq!(eval(&ast, e), Ok(42));
    }

    #[test]
    fn test_division_by_zero() {
        let mut ast = Ast::new();
        let a = num(&mut ast, 1);
        let b = num(&mut ast, 0);
        let e = bin(&mut ast, BinOp::Div, a, b);
        assert!(matches!(eval(&ast, e), Err(EvalError::DivisionByZero { .. })));
    }

    #[test]
    fn test_logical_right_shift() {
        let mut ast = Ast::new();
        let a = num(&mut ast, -1);
        let b = num(&mut ast, 28);
        let e = bin(&mut ast, BinOp::Shru, a, b);
        assert_eq!(eval(&ast, e), Ok(15));
    }

    #[test]
    fn test_chained_compare() {
        let mut ast = Ast::new();
        let a = num(&mut ast, 1);
        let two = num(&mut ast, 2);
        let three = num(&mut ast, 3);
        let chain = ast.alloc_expr(Expr {
            kind: ExprKind::ChainedCompare {
                first: a,
                ops: vec![
                    CompareOp {
                        op: CompareKind::Lt,
                        span: Span::dummy(),
                        rhs: two,
                    },
                    CompareOp {
                        op: CompareKind::Lt,
                        span: Span::dummy(),
                        rhs: three,
                    },
                ],
            },
            span: Span::dummy(),
        });
        assert_eq!(eval(&ast, chain), Ok(1));
    }

    #[test]
    fn test_symbol_not_constant() {
        let mut ast = Ast::new();
        let mut interner: string_interner::DefaultStringInterner = string_interner::DefaultStringInterner::new();
        let sym = interner.get_or_intern("x");
        let e = ast.alloc_expr(Expr {
            kind: ExprKind::Symbol(sym),
            span: Span::dummy(),
        });
        assert!(matches!(eval(&ast, e), Err(EvalError::NotConstant { .. })));
    }

    #[test]
    fn test_rational_cell_bits() {
        let mut ast = Ast::new();
        let e = ast.alloc_expr(Expr {
            kind: ExprKind::Rational(Rational(1.0)),
            span: Span::dummy(),
        });
        assert_eq!(eval(&ast, e), Ok(0x3f80_0000_u32 as Cell));
    }
}
