//! Parser tests.
//!
//! Most tests parse a small program and pattern-match the resulting node
//! pool. Statement-level constructs are wrapped in a function, since the
//! grammar only admits declarations at the top level.

use super::*;
use crate::ast::*;
use crate::diagnostics::ErrorCode;

fn parse_ok(source: &str) -> ParseTree {
    let mut parser = Parser::new(source);
    match parser.parse_program() {
        Ok(tree) => tree,
        Err(errors) => panic!("unexpected parse errors: {:?}", errors),
    }
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let mut parser = Parser::new(source);
    let errors = parser
        .parse_program()
        .expect_err("expected the parse to fail");
    errors.iter().map(|d| d.code).collect()
}

/// Parse statements inside a wrapper function and return the tree plus the
/// body's statement list.
fn parse_body(body: &str) -> (ParseTree, Vec<StmtId>) {
    let source = format!("void test(int a, int b, int c, int x) {{\n{}\n}}", body);
    let tree = parse_ok(&source);
    assert_eq!(tree.decls.len(), 1);
    let stmts = match &tree.ast[tree.decls[0]].kind {
        StmtKind::Function(f) => match &tree.ast[f.body.expect("missing body")].kind {
            StmtKind::Block(stmts) => stmts.clone(),
            other => panic!("expected a block body, got {:?}", other),
        },
        other => panic!("expected a function, got {:?}", other),
    };
    (tree, stmts)
}

fn expect_var<'a>(tree: &'a ParseTree, id: StmtId) -> &'a VarDecl {
    match &tree.ast[id].kind {
        StmtKind::Var(var) => var,
        other => panic!("expected a variable declaration, got {:?}", other),
    }
}

// ============================================================
// Token adapter
// ============================================================

#[test]
fn test_push_back_returns_same_token() {
    let mut parser = Parser::new("int x");
    let first = parser.next_token();
    parser.push_back(first);
    assert_eq!(parser.next_token(), first);
}

#[test]
fn test_label_folding_requires_adjacency() {
    let mut parser = Parser::new("Float:x Float :x");
    assert_eq!(parser.next_token().kind, TokenKind::Label);
    assert_eq!(parser.next_token().kind, TokenKind::Ident);
    assert_eq!(parser.next_token().kind, TokenKind::Ident);
    assert_eq!(parser.next_token().kind, TokenKind::Colon);
    assert_eq!(parser.next_token().kind, TokenKind::Ident);
    assert_eq!(parser.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_label_folding_respects_allow_tags() {
    let mut parser = Parser::new("Float:x");
    let kinds = parser.with_allow_tags(false, |p| {
        vec![p.next_token().kind, p.next_token().kind, p.next_token().kind]
    });
    assert_eq!(
        kinds,
        vec![TokenKind::Ident, TokenKind::Colon, TokenKind::Ident]
    );
}

#[test]
fn test_flags_restored_after_parse() {
    let mut parser = Parser::new("void f() { for (;;) { break; } }");
    parser.parse_program().expect("parse failed");
    assert!(!parser.flags.in_loop);
    assert!(!parser.flags.in_test);
    assert!(parser.flags.allow_tags);
    assert!(!parser.flags.one_error_per_statement);
}

// ============================================================
// Expressions
// ============================================================

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let tree = parse_ok("int x = 1 + 2 * 3;");
    let var = expect_var(&tree, tree.decls[0]);
    let ExprKind::Binary { op, left, right } = &tree.ast[var.init.unwrap()].kind else {
        panic!("expected a binary initializer");
    };
    assert_eq!(*op, BinOp::Add);
    assert_eq!(tree.ast[*left].kind, ExprKind::Number(1));
    let ExprKind::Binary { op, left, right } = &tree.ast[*right].kind else {
        panic!("expected a nested binary");
    };
    assert_eq!(*op, BinOp::Mul);
    assert_eq!(tree.ast[*left].kind, ExprKind::Number(2));
    assert_eq!(tree.ast[*right].kind, ExprKind::Number(3));
}

#[test]
fn test_compound_assignment_is_right_associative() {
    let (tree, stmts) = parse_body("a += b = 3;");
    let StmtKind::Expr(expr) = &tree.ast[stmts[0]].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Binary { op, right, .. } = &tree.ast[*expr].kind else {
        panic!("expected an assignment");
    };
    assert_eq!(*op, BinOp::AssignAdd);
    let ExprKind::Binary { op, .. } = &tree.ast[*right].kind else {
        panic!("expected a nested assignment");
    };
    assert_eq!(*op, BinOp::Assign);
}

#[test]
fn test_ternary_is_right_associative() {
    let (tree, stmts) = parse_body("return a ? b : c ? a : b;");
    let StmtKind::Return(Some(expr)) = &tree.ast[stmts[0]].kind else {
        panic!("expected a return with a value");
    };
    let ExprKind::Ternary { on_false, .. } = &tree.ast[*expr].kind else {
        panic!("expected a ternary");
    };
    assert!(matches!(
        tree.ast[*on_false].kind,
        ExprKind::Ternary { .. }
    ));
}

#[test]
fn test_relational_run_folds_into_chain() {
    let (tree, stmts) = parse_body("return a < b < c;");
    let StmtKind::Return(Some(expr)) = &tree.ast[stmts[0]].kind else {
        panic!("expected a return with a value");
    };
    let ExprKind::ChainedCompare { ops, .. } = &tree.ast[*expr].kind else {
        panic!("expected a chained comparison");
    };
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].op, CompareKind::Lt);
    assert_eq!(ops[1].op, CompareKind::Lt);
}

#[test]
fn test_equality_stays_binary() {
    let (tree, stmts) = parse_body("return a == b;");
    let StmtKind::Return(Some(expr)) = &tree.ast[stmts[0]].kind else {
        panic!("expected a return with a value");
    };
    assert!(matches!(
        tree.ast[*expr].kind,
        ExprKind::Binary { op: BinOp::Eq, .. }
    ));
}

#[test]
fn test_parenthesized_list_forms_comma_expr() {
    let tree = parse_ok("int x = (1, 2);");
    let var = expect_var(&tree, tree.decls[0]);
    let ExprKind::Comma(elems) = &tree.ast[var.init.unwrap()].kind else {
        panic!("expected a comma expression");
    };
    assert_eq!(elems.len(), 2);

    // A single element stays bare.
    let tree = parse_ok("int y = (7);");
    let var = expect_var(&tree, tree.decls[0]);
    assert_eq!(tree.ast[var.init.unwrap()].kind, ExprKind::Number(7));
}

#[test]
fn test_prefix_and_postfix_increment() {
    let (tree, stmts) = parse_body("++x;\nx++;");
    let StmtKind::Expr(pre) = &tree.ast[stmts[0]].kind else {
        panic!("expected an expression statement");
    };
    assert!(matches!(
        tree.ast[*pre].kind,
        ExprKind::PreIncDec { op: IncDecOp::Inc, .. }
    ));
    let StmtKind::Expr(post) = &tree.ast[stmts[1]].kind else {
        panic!("expected an expression statement");
    };
    assert!(matches!(
        tree.ast[*post].kind,
        ExprKind::PostIncDec { op: IncDecOp::Inc, .. }
    ));
}

#[test]
fn test_postfix_chain() {
    let (tree, stmts) = parse_body("a.b[1](2);");
    let StmtKind::Expr(expr) = &tree.ast[stmts[0]].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Call { target, args } = &tree.ast[*expr].kind else {
        panic!("expected a call");
    };
    assert_eq!(args.len(), 1);
    let ExprKind::Index { base, .. } = &tree.ast[*target].kind else {
        panic!("expected an index below the call");
    };
    assert!(matches!(
        tree.ast[*base].kind,
        ExprKind::FieldAccess { sep: FieldSep::Dot, .. }
    ));
}

#[test]
fn test_constructor_call_statement() {
    let (tree, stmts) = parse_body("new Foo(1, .k = 2);");
    let StmtKind::Expr(expr) = &tree.ast[stmts[0]].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Call { target, args } = &tree.ast[*expr].kind else {
        panic!("expected a call");
    };
    assert!(matches!(tree.ast[*target].kind, ExprKind::Symbol(_)));
    assert_eq!(args.len(), 2);
    assert!(args[0].name.is_none());
    assert!(args[1].name.is_some());
    assert_eq!(tree.ast[args[1].value.unwrap()].kind, ExprKind::Number(2));
}

#[test]
fn test_argument_placeholder_leaves_slot_empty() {
    let (tree, stmts) = parse_body("f(_, 2);");
    let StmtKind::Expr(expr) = &tree.ast[stmts[0]].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Call { args, .. } = &tree.ast[*expr].kind else {
        panic!("expected a call");
    };
    assert!(args[0].value.is_none());
    assert_eq!(tree.ast[args[1].value.unwrap()].kind, ExprKind::Number(2));
}

#[test]
fn test_positional_after_named_is_reported() {
    let codes = error_codes("void g() { f(.a = 1, 2); }");
    assert!(codes.contains(&ErrorCode::PositionalAfterNamed));
}

#[test]
fn test_new_array_allocation() {
    let (tree, stmts) = parse_body("x = new int[3][4];");
    let StmtKind::Expr(expr) = &tree.ast[stmts[0]].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Binary { right, .. } = &tree.ast[*expr].kind else {
        panic!("expected an assignment");
    };
    let ExprKind::NewArray { dims, .. } = &tree.ast[*right].kind else {
        panic!("expected an array allocation");
    };
    assert_eq!(dims.len(), 2);
}

#[test]
fn test_sizeof_variants() {
    let (tree, stmts) = parse_body("return sizeof(arr[][]);");
    let StmtKind::Return(Some(expr)) = &tree.ast[stmts[0]].kind else {
        panic!("expected a return with a value");
    };
    let ExprKind::Sizeof {
        array_levels,
        field,
        ..
    } = &tree.ast[*expr].kind
    else {
        panic!("expected sizeof");
    };
    assert_eq!(*array_levels, 2);
    assert!(field.is_none());

    let (tree, stmts) = parse_body("return sizeof point.origin;");
    let StmtKind::Return(Some(expr)) = &tree.ast[stmts[0]].kind else {
        panic!("expected a return with a value");
    };
    let ExprKind::Sizeof {
        field, field_sep, ..
    } = &tree.ast[*expr].kind
    else {
        panic!("expected sizeof");
    };
    assert!(field.is_some());
    assert_eq!(*field_sep, Some(FieldSep::Dot));
}

#[test]
fn test_view_as_cast() {
    let (tree, stmts) = parse_body("return view_as<int>(1.5);");
    let StmtKind::Return(Some(expr)) = &tree.ast[stmts[0]].kind else {
        panic!("expected a return with a value");
    };
    let ExprKind::Cast { kind, tag, .. } = &tree.ast[*expr].kind else {
        panic!("expected a cast");
    };
    assert_eq!(*kind, CastKind::ViewAs);
    assert_eq!(*tag, crate::types::Tag::INT);
}

#[test]
fn test_defined_expression() {
    let (tree, stmts) = parse_body("return defined MAXPLAYERS;");
    let StmtKind::Return(Some(expr)) = &tree.ast[stmts[0]].kind else {
        panic!("expected a return with a value");
    };
    assert!(matches!(tree.ast[*expr].kind, ExprKind::IsDefined(_)));
}

#[test]
fn test_char_literal_is_a_number() {
    let tree = parse_ok("int x = 'A';");
    let var = expect_var(&tree, tree.decls[0]);
    assert_eq!(tree.ast[var.init.unwrap()].kind, ExprKind::Number(65));
}

#[test]
fn test_legacy_cast_expression() {
    let (tree, stmts) = parse_body("x = Float:1;");
    let StmtKind::Expr(expr) = &tree.ast[stmts[0]].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Binary { right, .. } = &tree.ast[*expr].kind else {
        panic!("expected an assignment");
    };
    assert!(matches!(
        tree.ast[*right].kind,
        ExprKind::Cast { kind: CastKind::Label, .. }
    ));
}

#[test]
fn test_legacy_cast_warns_under_newdecls() {
    let mut parser = Parser::with_options(
        "void f() { int x = Float:1; }",
        ParseOptions {
            require_newdecls: true,
            ..ParseOptions::default()
        },
    );
    parser.parse_program().expect("parse failed");
    assert!(parser
        .diagnostics()
        .iter()
        .any(|d| d.code == ErrorCode::LegacyCast));
}

#[test]
fn test_assignment_in_test_warns() {
    let mut parser = Parser::new("void f(int a) { if (a = 1) a++; }");
    parser.parse_program().expect("parse failed");
    assert!(parser
        .diagnostics()
        .iter()
        .any(|d| d.code == ErrorCode::PossiblyUnintendedAssignment));
}

// ============================================================
// Statements
// ============================================================

#[test]
fn test_if_else_with_chained_condition() {
    let (tree, stmts) = parse_body("if (a < b < c) f(); else g();");
    let StmtKind::If {
        cond,
        on_true,
        on_false,
    } = &tree.ast[stmts[0]].kind
    else {
        panic!("expected an if statement");
    };
    let ExprKind::ChainedCompare { ops, .. } = &tree.ast[*cond].kind else {
        panic!("expected a chained comparison condition");
    };
    assert_eq!(ops.len(), 2);
    assert!(matches!(tree.ast[*on_true].kind, StmtKind::Expr(_)));
    assert!(matches!(
        tree.ast[on_false.unwrap()].kind,
        StmtKind::Expr(_)
    ));
}

#[test]
fn test_for_loop_shape() {
    let (tree, stmts) = parse_body("for (int i = 0; i < x; i++) break;");
    let StmtKind::For {
        init,
        cond,
        advance,
        body,
    } = &tree.ast[stmts[0]].kind
    else {
        panic!("expected a for statement");
    };
    let init_var = expect_var(&tree, init.unwrap());
    assert_eq!(tree.ast[init_var.init.unwrap()].kind, ExprKind::Number(0));
    assert!(matches!(
        tree.ast[cond.unwrap()].kind,
        ExprKind::ChainedCompare { .. }
    ));
    assert!(matches!(
        tree.ast[advance.unwrap()].kind,
        ExprKind::PostIncDec { .. }
    ));
    assert_eq!(
        tree.ast[*body].kind,
        StmtKind::LoopControl(LoopControl::Break)
    );
}

#[test]
fn test_empty_for_heads() {
    let (tree, stmts) = parse_body("for (;;) {}");
    let StmtKind::For {
        init,
        cond,
        advance,
        ..
    } = &tree.ast[stmts[0]].kind
    else {
        panic!("expected a for statement");
    };
    assert!(init.is_none());
    assert!(cond.is_none());
    assert!(advance.is_none());
}

#[test]
fn test_switch_with_case_list_and_default() {
    let (tree, stmts) = parse_body("switch (x) { case 1, 2: f(); default: g(); }");
    let StmtKind::Switch {
        cases,
        default_case,
        ..
    } = &tree.ast[stmts[0]].kind
    else {
        panic!("expected a switch statement");
    };
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].exprs.len(), 2);
    assert_eq!(tree.ast[cases[0].exprs[0]].kind, ExprKind::Number(1));
    assert_eq!(tree.ast[cases[0].exprs[1]].kind, ExprKind::Number(2));
    assert!(default_case.is_some());
}

#[test]
fn test_switch_with_only_default() {
    let (tree, stmts) = parse_body("switch (x) { default: f(); }");
    let StmtKind::Switch {
        cases,
        default_case,
        ..
    } = &tree.ast[stmts[0]].kind
    else {
        panic!("expected a switch statement");
    };
    assert!(cases.is_empty());
    assert!(default_case.is_some());
}

#[test]
fn test_case_after_default_is_reported() {
    let codes = error_codes("void f(int x) { switch (x) { default: f(); case 1: g(); } }");
    assert!(codes.contains(&ErrorCode::DefaultMustBeLast));
}

#[test]
fn test_case_range_is_rejected() {
    let codes = error_codes("void f(int x) { switch (x) { case 1 .. 3: g(); } }");
    assert!(codes.contains(&ErrorCode::ExpectedToken));
}

#[test]
fn test_case_outside_switch_is_reported() {
    let codes = error_codes("void f() { case 1: g(); }");
    assert!(codes.contains(&ErrorCode::NotInSwitch));
}

#[test]
fn test_break_outside_loop_is_reported() {
    let codes = error_codes("void f() { break; }");
    assert!(codes.contains(&ErrorCode::LoopControlOutsideLoop));
}

#[test]
fn test_break_after_loop_is_reported() {
    let codes = error_codes("void f() { for (;;) {} break; }");
    assert!(codes.contains(&ErrorCode::LoopControlOutsideLoop));
}

#[test]
fn test_do_while_loop() {
    let (tree, stmts) = parse_body("do x++; while (x < 10);");
    let StmtKind::Loop { kind, .. } = &tree.ast[stmts[0]].kind else {
        panic!("expected a loop statement");
    };
    assert_eq!(*kind, LoopKind::Do);

    let (tree, stmts) = parse_body("while (x > 0) x--;");
    let StmtKind::Loop { kind, .. } = &tree.ast[stmts[0]].kind else {
        panic!("expected a loop statement");
    };
    assert_eq!(*kind, LoopKind::While);
}

#[test]
fn test_empty_statement_is_reported() {
    let codes = error_codes("void f() { ; }");
    assert!(codes.contains(&ErrorCode::EmptyStatement));
}

#[test]
fn test_unclosed_block_is_reported() {
    let codes = error_codes("void f() {");
    assert!(codes.contains(&ErrorCode::CompoundBlockNotClosed));
}

#[test]
fn test_exit_with_and_without_value() {
    let (tree, stmts) = parse_body("exit;\nexit 1;");
    assert_eq!(tree.ast[stmts[0]].kind, StmtKind::Exit(None));
    let StmtKind::Exit(Some(expr)) = &tree.ast[stmts[1]].kind else {
        panic!("expected exit with a value");
    };
    assert_eq!(tree.ast[*expr].kind, ExprKind::Number(1));
}

#[test]
fn test_assert_and_delete_statements() {
    let (tree, stmts) = parse_body("assert (x > 0);\ndelete x;");
    assert!(matches!(tree.ast[stmts[0]].kind, StmtKind::Assert(_)));
    assert!(matches!(tree.ast[stmts[1]].kind, StmtKind::Delete(_)));
}

#[test]
fn test_return_without_value() {
    let (tree, stmts) = parse_body("return;");
    assert_eq!(tree.ast[stmts[0]].kind, StmtKind::Return(None));
}

#[test]
fn test_local_declaration_disambiguation() {
    // A second identifier means a declaration.
    let (tree, stmts) = parse_body("Handle h = null;");
    let var = expect_var(&tree, stmts[0]);
    assert!(var.type_ref.is_new);
    assert_eq!(var.vclass, VarClass::Local);

    // `[` directly followed by `]` also means a declaration.
    let (tree, stmts) = parse_body("Handle[] hs = x;");
    let var = expect_var(&tree, stmts[0]);
    assert_eq!(var.type_ref.numdim(), 1);

    // Anything else is an expression.
    let (tree, stmts) = parse_body("a(1);");
    assert!(matches!(tree.ast[stmts[0]].kind, StmtKind::Expr(_)));
}

#[test]
fn test_decl_statement_skips_autozero() {
    let (tree, stmts) = parse_body("decl String:buffer[64];");
    let var = expect_var(&tree, stmts[0]);
    assert!(!var.autozero);
    assert!(!var.type_ref.is_new);
    assert!(var.type_ref.has_postdims);
}

#[test]
fn test_static_local_storage_class() {
    let (tree, stmts) = parse_body("static int counter = 0;");
    let var = expect_var(&tree, stmts[0]);
    assert_eq!(var.vclass, VarClass::Static);
}

// ============================================================
// Top-level declarations
// ============================================================

#[test]
fn test_global_variable_with_initializer() {
    let tree = parse_ok("int x = 1 + 2 * 3;");
    let var = expect_var(&tree, tree.decls[0]);
    assert_eq!(var.vclass, VarClass::Global);
    assert!(var.type_ref.is_new);
    assert!(var.init.is_some());
}

#[test]
fn test_multi_declarator_forms_stmt_list() {
    let tree = parse_ok("int x = 1, y = 2;");
    let StmtKind::StmtList(vars) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a declaration list");
    };
    assert_eq!(vars.len(), 2);
    assert!(expect_var(&tree, vars[1]).init.is_some());
}

#[test]
fn test_legacy_global_declarations() {
    let mut parser = Parser::new("new a = 1, Float:b = 2;");
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::StmtList(vars) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a declaration list");
    };
    let first = expect_var(&tree, vars[0]);
    assert!(!first.type_ref.is_new);
    assert_eq!(first.type_ref.tag, crate::types::Tag::INT);
    let second = expect_var(&tree, vars[1]);
    assert_eq!(second.type_ref.tag, crate::types::Tag::FLOAT);
}

#[test]
fn test_new_with_new_style_type_is_reported() {
    let codes = error_codes("new int x = 5;");
    assert!(codes.contains(&ErrorCode::NewStyleDeclarationWithNew));
}

#[test]
fn test_array_type_versus_postdims() {
    // Dims on the type: new-style.
    let tree = parse_ok("MyArr[] clone = src;");
    let var = expect_var(&tree, tree.decls[0]);
    assert!(var.type_ref.is_new);
    assert!(!var.type_ref.has_postdims);
    assert_eq!(var.type_ref.numdim(), 1);

    // Dims on the name: legacy post-dims.
    let tree = parse_ok("table[3] = { 1, 2, 3 };");
    let var = expect_var(&tree, tree.decls[0]);
    assert!(!var.type_ref.is_new);
    assert!(var.type_ref.has_postdims);
    assert_eq!(var.type_ref.numdim(), 1);
}

#[test]
fn test_array_literal_with_trailing_ellipsis() {
    let tree = parse_ok("int a[4] = { 1, 2, ... };");
    let var = expect_var(&tree, tree.decls[0]);
    let ExprKind::Array { elems, ellipsis } = &tree.ast[var.init.unwrap()].kind else {
        panic!("expected an array literal");
    };
    assert!(*ellipsis);
    assert_eq!(elems.len(), 2);
    assert_eq!(tree.ast[elems[1]].kind, ExprKind::Number(2));
}

#[test]
fn test_too_many_dimensions_is_reported() {
    let codes = error_codes("int a[1][2][3][4][5];");
    assert!(codes.contains(&ErrorCode::TooManyDimensions));
}

#[test]
fn test_stock_static_combinations() {
    let mut parser = Parser::new("stock static int a = 1;\nstatic stock int b = 2;");
    let tree = parser.parse_program().expect("parse failed");
    for decl in &tree.decls {
        let var = expect_var(&tree, *decl);
        assert!(var.is_stock);
        assert!(var.is_static);
    }
}

#[test]
fn test_function_with_defaults_and_variadics() {
    let tree = parse_ok("int add(int a, int b = 2, any ...) { return a + b; }");
    let StmtKind::Function(func) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a function");
    };
    assert_eq!(func.kind, FunctionKind::Normal);
    assert_eq!(func.args.len(), 3);
    assert!(func.args[0].default.is_none());
    assert!(func.args[1].default.is_some());
    assert!(func.args[2].is_variadic);
    assert!(func.body.is_some());
}

#[test]
fn test_forward_and_native_stubs() {
    let mut parser =
        Parser::new("forward void OnThing(int client);\nnative float FloatAbs(float value);");
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Function(fwd) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a function stub");
    };
    assert_eq!(fwd.kind, FunctionKind::Forward);
    assert!(fwd.body.is_none());
    let StmtKind::Function(native) = &tree.ast[tree.decls[1]].kind else {
        panic!("expected a function stub");
    };
    assert_eq!(native.kind, FunctionKind::Native);
}

#[test]
fn test_operator_stub() {
    let mut parser = Parser::new("native float operator*(float a, float b) = FloatMul;");
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Function(func) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a function stub");
    };
    assert_eq!(func.opertok, Some(TokenKind::Star));
    assert!(func.alias.is_some());
    assert_eq!(parser.symbol_text(func.name.node), "operator*");
}

#[test]
fn test_public_function() {
    let tree = parse_ok("public void OnPluginStart() { }");
    let StmtKind::Function(func) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a function");
    };
    assert!(func.is_public);
}

// ============================================================
// Enums
// ============================================================

#[test]
fn test_enum_with_fields_and_values() {
    let mut parser = Parser::new("enum Color { Red, Green = 5, Blue }");
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Enum(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected an enum");
    };
    assert_eq!(parser.symbol_text(decl.name.unwrap().node), "Color");
    assert_eq!(decl.fields.len(), 3);
    assert!(decl.fields[0].value.is_none());
    assert_eq!(
        tree.ast[decl.fields[1].value.unwrap()].kind,
        ExprKind::Number(5)
    );
}

#[test]
fn test_enum_with_zero_fields() {
    let tree = parse_ok("enum Empty { };");
    let StmtKind::Enum(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected an enum");
    };
    assert!(decl.fields.is_empty());
}

#[test]
fn test_enum_increment_specifier_warns() {
    let mut parser = Parser::new("enum Flags (<<= 1) { A = 1, B, C }");
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Enum(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected an enum");
    };
    assert_eq!(decl.multiplier, 2);
    assert!(parser
        .diagnostics()
        .iter()
        .any(|d| d.code == ErrorCode::DeprecatedEnumIncrement));
}

#[test]
fn test_enum_field_dimensions_are_reported() {
    let codes = error_codes("enum Sizes { Big[4], Small }");
    assert!(codes.contains(&ErrorCode::EnumFieldDimensions));
}

// ============================================================
// Structs, typedefs, typesets
// ============================================================

#[test]
fn test_pstruct_and_struct_initializer() {
    let source = r#"
struct PluginInfo
{
    public const char[] name;
    public const char[] version;
};

public PluginInfo myinfo = { name = "sample", version = "1.0" };
"#;
    let mut parser = Parser::new(source);
    let tree = parser.parse_program().expect("parse failed");
    assert_eq!(tree.decls.len(), 2);

    let StmtKind::Pstruct(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a struct");
    };
    assert_eq!(decl.fields.len(), 2);
    assert!(decl.fields[0].type_ref.is_const);

    let var = expect_var(&tree, tree.decls[1]);
    assert!(var.is_public);
    let ExprKind::StructInit { fields } = &tree.ast[var.init.unwrap()].kind else {
        panic!("expected a struct initializer");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(
        tree.ast[fields[0].value].kind,
        ExprKind::String("sample".to_string())
    );
}

#[test]
fn test_typedef_function_type() {
    let mut parser = Parser::new("typedef Handler = function int (int client, float delay);");
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Typedef(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a typedef");
    };
    assert_eq!(parser.symbol_text(decl.name.node), "Handler");
    assert_eq!(decl.ftype.args.len(), 2);
}

#[test]
fn test_typeset_collects_function_types() {
    let source = r#"
typeset EventHook
{
    function void (int client);
    function int ();
};
"#;
    let tree = parse_ok(source);
    let StmtKind::Typeset(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a typeset");
    };
    assert_eq!(decl.types.len(), 2);
    assert_eq!(decl.types[0].args.len(), 1);
    assert!(decl.types[1].args.is_empty());
}

// ============================================================
// Constants and static assertions
// ============================================================

#[test]
fn test_legacy_tagged_constant() {
    let mut parser = Parser::new("const Float:pi = 314;");
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Const(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a constant");
    };
    assert_eq!(parser.symbol_text(decl.name.node), "pi");
    assert_eq!(decl.type_ref.tag, crate::types::Tag::FLOAT);
    assert!(decl.type_ref.is_const);
    assert_eq!(decl.value, 314);
}

#[test]
fn test_const_list_shares_keywords() {
    let tree = parse_ok("const int A = 1, B = 2 + 3;");
    let StmtKind::StmtList(decls) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a declaration list");
    };
    let StmtKind::Const(b) = &tree.ast[decls[1]].kind else {
        panic!("expected a constant");
    };
    assert_eq!(b.value, 5);
}

#[test]
fn test_non_constant_initializer_is_reported() {
    let codes = error_codes("const int x = y;");
    assert!(codes.contains(&ErrorCode::MustBeConstant));
}

#[test]
fn test_static_assert_with_message() {
    let tree = parse_ok("static_assert(1 + 1 == 2, \"math is broken\");");
    let StmtKind::StaticAssert { value, message } = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a static assertion");
    };
    assert_eq!(*value, 1);
    assert_eq!(message.as_deref(), Some("math is broken"));
}

#[test]
fn test_static_assert_non_constant_yields_no_node() {
    let mut parser = Parser::new("static_assert(x);");
    let errors = parser.parse_program().expect_err("expected errors");
    assert!(errors.iter().any(|d| d.code == ErrorCode::MustBeConstant));
    assert_eq!(parser.ast.stmt_count(), 0);
}

// ============================================================
// Using, methodmaps, enum structs
// ============================================================

#[test]
fn test_using_intrinsics_handle() {
    let tree = parse_ok("using __intrinsics__.Handle;");
    assert_eq!(tree.ast[tree.decls[0]].kind, StmtKind::Using);
}

#[test]
fn test_using_anything_else_is_reported() {
    let codes = error_codes("using __intrinsics__.Socket;");
    assert!(codes.contains(&ErrorCode::InvalidUsing));
    let codes = error_codes("using stdlib.Handle;");
    assert!(codes.contains(&ErrorCode::InvalidUsing));
}

#[test]
fn test_funcenum_is_fatal() {
    let codes = error_codes("funcenum Callback { };");
    assert!(codes.contains(&ErrorCode::FuncenumRemoved));
}

#[test]
fn test_stray_braces_are_reported() {
    let codes = error_codes("}");
    assert!(codes.contains(&ErrorCode::UnmatchedClosingBrace));
    let codes = error_codes("{");
    assert!(codes.contains(&ErrorCode::BodyWithoutHeader));
}

#[test]
fn test_methodmap_members() {
    let source = r#"
methodmap Menu __nullable__
{
    public native Menu(int style);
    public native bool Display(int client);
    public bool IsValid() {
        return x != null;
    }
    property int ItemCount {
        public native get();
    }
};
"#;
    let mut parser = Parser::new(source);
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Methodmap(map) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a methodmap");
    };
    assert!(map.nullable);
    assert!(map.parent.is_none());
    assert_eq!(map.methods.len(), 3);
    assert_eq!(map.properties.len(), 1);

    // The constructor's return type is the methodmap's own tag.
    let StmtKind::Function(ctor) = &tree.ast[map.methods[0].decl].kind else {
        panic!("expected a method");
    };
    assert_eq!(parser.symbol_text(ctor.name.node), "Menu");
    assert_eq!(ctor.kind, FunctionKind::Native);

    let prop = &map.properties[0];
    assert_eq!(prop.accessors.len(), 1);
    assert!(prop.accessors[0].is_native);
}

#[test]
fn test_methodmap_with_parent() {
    let source = "methodmap DataPack < Handle\n{\n    public native DataPack();\n};";
    let mut parser = Parser::new(source);
    let tree = parser.parse_program().expect("parse failed");
    let StmtKind::Methodmap(map) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected a methodmap");
    };
    assert_eq!(parser.symbol_text(map.parent.unwrap().node), "Handle");
}

#[test]
fn test_enum_struct_fields_and_methods() {
    let source = r#"
enum struct Point
{
    int x;
    int y;

    int Sum() {
        return 0;
    }
}
"#;
    let tree = parse_ok(source);
    let StmtKind::EnumStruct(decl) = &tree.ast[tree.decls[0]].kind else {
        panic!("expected an enum struct");
    };
    assert_eq!(decl.fields.len(), 2);
    assert_eq!(decl.methods.len(), 1);
}

// ============================================================
// Terminators and options
// ============================================================

#[test]
fn test_newline_terminates_when_semicolons_optional() {
    let tree = parse_ok("int x = 1\nint y = 2\n");
    assert_eq!(tree.decls.len(), 2);
}

#[test]
fn test_required_semicolons() {
    let mut parser = Parser::with_options(
        "int x = 1\nint y = 2\n",
        ParseOptions {
            need_semicolon: true,
            ..ParseOptions::default()
        },
    );
    let errors = parser.parse_program().expect_err("expected errors");
    assert!(errors.iter().any(|d| d.code == ErrorCode::ExpectedToken));
}

#[test]
fn test_decls_delivered_in_source_order() {
    let source = "int first = 1;\nenum Color { Red }\nvoid last() { }\n";
    let mut parser = Parser::new(source);
    let mut seen = Vec::new();
    parser
        .parse_program_with(&mut |ast, decl| {
            seen.push(match &ast[decl].kind {
                StmtKind::Var(_) => "var",
                StmtKind::Enum(_) => "enum",
                StmtKind::Function(_) => "function",
                _ => "other",
            });
        })
        .expect("parse failed");
    assert_eq!(seen, vec!["var", "enum", "function"]);
}

#[test]
fn test_one_error_per_statement() {
    // Both mismatches sit in one statement; only the first is reported.
    let mut parser = Parser::new("void f() { g(1 +; }");
    let errors = parser.parse_program().expect_err("expected errors");
    let in_stmt = errors
        .iter()
        .filter(|d| d.code == ErrorCode::InvalidExpression)
        .count();
    assert!(in_stmt <= 1);
}
