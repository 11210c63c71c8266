//! Abstract Syntax Tree for Talon.
//!
//! The AST is a closed tagged union: one enum for expressions, one for
//! statements (declarations are statements, as they may appear in both
//! global and local positions). Nodes live in an [`Ast`] pool owned by the
//! translation unit; children refer to each other through non-owning
//! [`ExprId`]/[`StmtId`] indices into that pool, and the whole tree is
//! dropped as a unit. Identifiers are interned [`Symbol`]s whose interner
//! outlives the tree.
//!
//! # Design Notes
//!
//! - All nodes derive `Debug`, `Clone`, `PartialEq`, and `Eq` for testing.
//! - Rational values are wrapped in [`Rational`] for total ordering and Eq.
//! - Every node records the [`Span`] of its first token.
//! - The parser performs no name binding: a [`ExprKind::Symbol`] is just an
//!   atom, resolved by later passes.

use crate::span::{Span, Spanned};
use crate::types::Tag;
use string_interner::DefaultSymbol;

/// A symbol representing an interned identifier.
pub type Symbol = DefaultSymbol;

/// A machine cell. All integer values in the language are cell-sized.
pub type Cell = i32;

/// Maximum number of array dimensions a declarator may carry.
pub const DIMEN_MAX: usize = 4;

/// Wrapper for f64 rational values providing total ordering and Eq.
///
/// NaN values compare equal to each other so AST nodes can derive `Eq`.
#[derive(Debug, Clone, Copy)]
pub struct Rational(pub f64);

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            return true;
        }
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Rational {}

impl std::hash::Hash for Rational {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for Rational {
    fn from(f: f64) -> Self {
        Rational(f)
    }
}

impl From<Rational> for f64 {
    fn from(f: Rational) -> Self {
        f.0
    }
}

// ============================================================
// Node ids and the node pool
// ============================================================

/// Index of an expression node in the [`Ast`] pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

/// Index of a statement node in the [`Ast`] pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtId(u32);

/// Append-only node pool for one translation unit.
///
/// The pool owns every node; ids are non-owning indices. Allocation is a
/// push, lookup is an index, and the entire tree is freed when the pool is
/// dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ast {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

impl std::ops::Index<ExprId> for Ast {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        self.expr(id)
    }
}

impl std::ops::Index<StmtId> for Ast {
    type Output = Stmt;

    fn index(&self, id: StmtId) -> &Stmt {
        self.stmt(id)
    }
}

// ============================================================
// Type references and declarators
// ============================================================

/// How a declarator's storage is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentKind {
    #[default]
    Scalar,
    Array,
    Reference,
    Function,
}

/// A parsed type reference.
///
/// Carries everything the declarator grammar learns about a type: the tag,
/// the storage shape, constness, whether the declaration used the
/// type-prefix (new) or tag-prefix (legacy) syntax, and the array
/// dimensions. `dims` holds one entry per dimension (constant extents are
/// filled by later passes and stay 0 here); `dim_exprs` holds the parsed
/// extent expression per dimension, when one was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub tag: Tag,
    pub ident: IdentKind,
    pub is_const: bool,
    pub is_new: bool,
    /// True when the dimensions were written after the name.
    pub has_postdims: bool,
    pub dims: Vec<Cell>,
    pub dim_exprs: Vec<Option<ExprId>>,
}

impl Default for TypeRef {
    fn default() -> Self {
        Self {
            tag: Tag::INT,
            ident: IdentKind::Scalar,
            is_const: false,
            is_new: false,
            has_postdims: false,
            dims: Vec::new(),
            dim_exprs: Vec::new(),
        }
    }
}

impl TypeRef {
    pub fn numdim(&self) -> usize {
        self.dims.len()
    }
}

/// A declarator in progress: name, type, and the operator slot for
/// operator overloads. Filled in by the declarator grammar.
#[derive(Debug, Clone, Default)]
pub struct Declinfo {
    pub name: Option<Spanned<Symbol>>,
    pub type_ref: TypeRef,
    /// Set when the declarator names an operator overload.
    pub opertok: Option<crate::lexer::TokenKind>,
    /// Set when an argument declarator is the `...` variadic marker.
    pub is_variadic: bool,
}

bitflags::bitflags! {
    /// Context flags driving the declarator grammar.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeclFlags: u32 {
        /// Accept a `(` following the name as a function signature.
        const MAYBE_FUNCTION = 0x01;
        /// Allow a variable declarator.
        const VARIABLE = 0x02;
        /// Accept enum-rooted extents in array dimensions.
        const ENUMROOT = 0x04;
        /// Force the legacy tag-prefix syntax.
        const OLD = 0x08;
        /// Force the type-prefix syntax.
        const NEW = 0x10;
        /// Declarator is a struct field (no initializer).
        const FIELD = 0x20;
        /// Declarator is a function parameter.
        const ARGUMENT = 0x40;
        /// The name may be omitted.
        const MAYBE_NAMED = 0x80;
    }
}

impl DeclFlags {
    /// Contexts in which a declarator carries a name and may have post-fix
    /// array dimensions.
    pub const NAMED_MASK: DeclFlags = DeclFlags::MAYBE_FUNCTION
        .union(DeclFlags::VARIABLE)
        .union(DeclFlags::FIELD)
        .union(DeclFlags::ARGUMENT)
        .union(DeclFlags::MAYBE_NAMED);
}

/// A function type as written in `typedef` and `typeset` declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub ret: TypeRef,
    pub args: Vec<FunctionTypeArg>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTypeArg {
    pub type_ref: TypeRef,
    pub name: Option<Spanned<Symbol>>,
}

// ============================================================
// Statements and declarations
// ============================================================

/// Storage class of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarClass {
    Global,
    Local,
    /// A local with static storage.
    Static,
}

/// Which loop keyword produced a [`StmtKind::Loop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Do,
    While,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Break,
    Continue,
}

/// How a function declaration was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// An ordinary function with a body.
    Normal,
    /// A `native` stub.
    Native,
    /// A `forward` stub.
    Forward,
}

/// A statement or declaration node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// A flat sequence of statements that does not open a scope (for
    /// example a multi-declarator variable declaration).
    StmtList(Vec<StmtId>),
    /// A `{ ... }` compound block.
    Block(Vec<StmtId>),
    Expr(ExprId),
    If {
        cond: ExprId,
        on_true: StmtId,
        on_false: Option<StmtId>,
    },
    /// `do`/`while` loops; `kind` records which keyword introduced it.
    Loop {
        kind: LoopKind,
        cond: ExprId,
        body: StmtId,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        advance: Option<ExprId>,
        body: StmtId,
    },
    Switch {
        cond: ExprId,
        cases: Vec<SwitchCase>,
        default_case: Option<StmtId>,
    },
    LoopControl(LoopControl),
    Return(Option<ExprId>),
    Assert(ExprId),
    Delete(ExprId),
    Exit(Option<ExprId>),
    StaticAssert {
        value: Cell,
        message: Option<String>,
    },
    Var(VarDecl),
    Const(ConstDecl),
    Enum(EnumDecl),
    Pstruct(PstructDecl),
    Typedef(TypedefDecl),
    Typeset(TypesetDecl),
    Using,
    Function(FunctionDecl),
    Methodmap(MethodmapDecl),
    EnumStruct(EnumStructDecl),
    /// Placeholder produced where a declaration was required but could not
    /// be parsed.
    Error,
}

/// One `case` arm of a switch statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCase {
    /// The comma-separated label expressions. Never empty.
    pub exprs: Vec<ExprId>,
    pub body: StmtId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub name: Spanned<Symbol>,
    pub type_ref: TypeRef,
    pub vclass: VarClass,
    pub is_public: bool,
    pub is_static: bool,
    pub is_stock: bool,
    /// Cleared for `decl` declarations, which skip zero-initialization.
    pub autozero: bool,
    pub init: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecl {
    pub name: Spanned<Symbol>,
    pub type_ref: TypeRef,
    pub vclass: VarClass,
    /// The evaluated constant value.
    pub value: Cell,
    /// The tag of the evaluated initializer.
    pub value_tag: Tag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub label: Option<Spanned<Symbol>>,
    pub name: Option<Spanned<Symbol>>,
    pub vclass: VarClass,
    /// Value step between unvalued fields.
    pub increment: Cell,
    /// Value multiplier between unvalued fields.
    pub multiplier: Cell,
    /// In declaration order; names are not checked for uniqueness here.
    pub fields: Vec<EnumField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumField {
    pub name: Spanned<Symbol>,
    pub value: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PstructDecl {
    pub name: Option<Spanned<Symbol>>,
    pub fields: Vec<StructField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: Spanned<Symbol>,
    pub type_ref: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDecl {
    pub name: Spanned<Symbol>,
    pub ftype: FunctionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesetDecl {
    pub name: Spanned<Symbol>,
    pub types: Vec<FunctionType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: Spanned<Symbol>,
    /// Return type.
    pub type_ref: TypeRef,
    pub kind: FunctionKind,
    pub args: Vec<ArgDecl>,
    pub body: Option<StmtId>,
    pub is_public: bool,
    pub is_static: bool,
    pub is_stock: bool,
    /// The overloaded operator token, for operator declarations.
    pub opertok: Option<crate::lexer::TokenKind>,
    /// Binding alias of a native stub (`native X() = Y;`).
    pub alias: Option<Spanned<Symbol>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDecl {
    /// Absent for the bare `...` variadic marker.
    pub name: Option<Spanned<Symbol>>,
    pub type_ref: TypeRef,
    pub is_variadic: bool,
    pub default: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodmapDecl {
    pub name: Spanned<Symbol>,
    pub parent: Option<Spanned<Symbol>>,
    pub nullable: bool,
    pub methods: Vec<MethodmapMethod>,
    pub properties: Vec<MethodmapProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodmapMethod {
    pub is_static: bool,
    /// A [`StmtKind::Function`] node.
    pub decl: StmtId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodmapProperty {
    pub type_ref: TypeRef,
    pub name: Spanned<Symbol>,
    pub accessors: Vec<PropertyAccessor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAccessor {
    /// `get` or `set`.
    pub name: Spanned<Symbol>,
    pub is_native: bool,
    pub args: Vec<ArgDecl>,
    pub body: Option<StmtId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumStructDecl {
    pub name: Spanned<Symbol>,
    pub fields: Vec<StructField>,
    /// [`StmtKind::Function`] nodes.
    pub methods: Vec<StmtId>,
}

// ============================================================
// Expressions
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Binary operators, including the right-associative assignment family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    /// Logical (unsigned) right shift.
    Shru,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,
    AssignAnd,
    AssignOr,
    AssignXor,
    AssignShl,
    AssignShr,
    AssignShru,
}

impl BinOp {
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinOp::Assign
                | BinOp::AssignAdd
                | BinOp::AssignSub
                | BinOp::AssignMul
                | BinOp::AssignDiv
                | BinOp::AssignMod
                | BinOp::AssignAnd
                | BinOp::AssignOr
                | BinOp::AssignXor
                | BinOp::AssignShl
                | BinOp::AssignShr
                | BinOp::AssignShru
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `~`
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Relational operators; these fold into a chain rather than nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    Lt,
    Le,
    Gt,
    Ge,
}

/// One `<op> rhs` link of a chained comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOp {
    pub op: CompareKind,
    pub span: Span,
    pub rhs: ExprId,
}

/// How a cast expression was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// A legacy `tag:` prefix cast.
    Label,
    /// A `view_as<T>(...)` cast.
    ViewAs,
}

/// Field access separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSep {
    /// `.`
    Dot,
    /// `::`
    DoubleColon,
}

/// One argument of a call. `name` is set for `.name = expr` arguments;
/// `value` is absent for the `_` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    pub name: Option<Spanned<Symbol>>,
    pub value: Option<ExprId>,
}

/// One `name = literal` field of a struct initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInitField {
    pub name: Spanned<Symbol>,
    pub value: ExprId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Number(Cell),
    Rational(Rational),
    String(String),
    Null,
    This,
    Symbol(Symbol),
    /// `{ a, b, ... }` array literal. `ellipsis` marks the trailing
    /// fill-to-end marker.
    Array {
        elems: Vec<ExprId>,
        ellipsis: bool,
    },
    /// `{ .field = literal, ... }` struct initializer.
    StructInit {
        fields: Vec<StructInitField>,
    },
    /// `new T[expr]...` array allocation. `dims` is never empty.
    NewArray {
        tag: Tag,
        dims: Vec<ExprId>,
    },
    /// A parenthesized expression list with more than one element.
    Comma(Vec<ExprId>),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    PreIncDec {
        op: IncDecOp,
        operand: ExprId,
    },
    PostIncDec {
        op: IncDecOp,
        operand: ExprId,
    },
    Binary {
        op: BinOp,
        left: ExprId,
        right: ExprId,
    },
    Logical {
        op: LogicalOp,
        left: ExprId,
        right: ExprId,
    },
    Ternary {
        cond: ExprId,
        on_true: ExprId,
        on_false: ExprId,
    },
    /// `a < b < c` folded into one node; `ops` is never empty.
    ChainedCompare {
        first: ExprId,
        ops: Vec<CompareOp>,
    },
    Cast {
        kind: CastKind,
        tag: Tag,
        operand: ExprId,
    },
    Sizeof {
        name: Symbol,
        field: Option<Symbol>,
        field_sep: Option<FieldSep>,
        array_levels: u32,
    },
    IsDefined(Symbol),
    FieldAccess {
        sep: FieldSep,
        base: ExprId,
        field: Symbol,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    Call {
        target: ExprId,
        args: Vec<CallArg>,
    },
    /// Placeholder produced where an expression was required but could not
    /// be parsed.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_roundtrip() {
        let mut ast = Ast::new();
        let one = ast.alloc_expr(Expr {
            kind: ExprKind::Number(1),
            span: Span::dummy(),
        });
        let two = ast.alloc_expr(Expr {
            kind: ExprKind::Number(2),
            span: Span::dummy(),
        });
        let sum = ast.alloc_expr(Expr {
            kind: ExprKind::Binary {
                op: BinOp::Add,
                left: one,
                right: two,
            },
            span: Span::dummy(),
        });

        assert_eq!(ast.expr_count(), 3);
        match &ast[sum].kind {
            ExprKind::Binary { op, left, right } => {
                assert_eq!(*op, BinOp::Add);
                assert_eq!(ast[*left].kind, ExprKind::Number(1));
                assert_eq!(ast[*right].kind, ExprKind::Number(2));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_rational_eq() {
        assert_eq!(Rational(1.5), Rational(1.5));
        assert_eq!(Rational(f64::NAN), Rational(f64::NAN));
        assert_ne!(Rational(1.0), Rational(2.0));
    }

    #[test]
    fn test_assignment_classification() {
        assert!(BinOp::Assign.is_assignment());
        assert!(BinOp::AssignShru.is_assignment());
        assert!(!BinOp::Add.is_assignment());
    }

    #[test]
    fn test_named_mask() {
        assert!(DeclFlags::NAMED_MASK.contains(DeclFlags::VARIABLE));
        assert!(DeclFlags::NAMED_MASK.contains(DeclFlags::ARGUMENT));
        assert!(!DeclFlags::NAMED_MASK.contains(DeclFlags::OLD));
    }
}
