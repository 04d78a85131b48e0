//! Typed AST nodes for expressions, statements, and right-hand sides
//! (§4.1, §4.4.5).

use crate::ast::item::{Decl, WhereClause};
use crate::ast::pat::Pattern;
use crate::ast::ty::Type;
use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone)]
pub enum Expr {
    Var(VarExpr),
    Con(ConExpr),
    Lit(LitExpr),
    App(AppExpr),
    Infix(InfixExpr),
    Neg(NegExpr),
    Lambda(LambdaExpr),
    Let(LetExpr),
    If(IfExpr),
    Case(CaseExpr),
    Do(DoExpr),
    List(ListExpr),
    Tuple(TupleExpr),
    Paren(ParenExpr),
    ListComp(ListCompExpr),
    EnumFrom(EnumFromExpr),
    EnumFromTo(EnumFromToExpr),
    EnumFromThen(EnumFromThenExpr),
    EnumFromThenTo(EnumFromThenToExpr),
    SectionLeft(SectionLeft),
    SectionRight(SectionRight),
    Typed(TypedExpr),
    RecordCon(RecordConExpr),
    RecordUpdate(RecordUpdateExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::VAR_EXPR => Some(Expr::Var(VarExpr { syntax: node })),
            SyntaxKind::CON_EXPR => Some(Expr::Con(ConExpr { syntax: node })),
            SyntaxKind::LIT_EXPR => Some(Expr::Lit(LitExpr { syntax: node })),
            SyntaxKind::APP_EXPR => Some(Expr::App(AppExpr { syntax: node })),
            SyntaxKind::INFIX_EXPR => Some(Expr::Infix(InfixExpr { syntax: node })),
            SyntaxKind::NEG_EXPR => Some(Expr::Neg(NegExpr { syntax: node })),
            SyntaxKind::LAMBDA_EXPR => Some(Expr::Lambda(LambdaExpr { syntax: node })),
            SyntaxKind::LET_EXPR => Some(Expr::Let(LetExpr { syntax: node })),
            SyntaxKind::IF_EXPR => Some(Expr::If(IfExpr { syntax: node })),
            SyntaxKind::CASE_EXPR => Some(Expr::Case(CaseExpr { syntax: node })),
            SyntaxKind::DO_EXPR => Some(Expr::Do(DoExpr { syntax: node })),
            SyntaxKind::LIST_EXPR => Some(Expr::List(ListExpr { syntax: node })),
            SyntaxKind::TUPLE_EXPR => Some(Expr::Tuple(TupleExpr { syntax: node })),
            SyntaxKind::PAREN_EXPR => Some(Expr::Paren(ParenExpr { syntax: node })),
            SyntaxKind::LIST_COMP_EXPR => Some(Expr::ListComp(ListCompExpr { syntax: node })),
            SyntaxKind::ENUM_FROM_EXPR => Some(Expr::EnumFrom(EnumFromExpr { syntax: node })),
            SyntaxKind::ENUM_FROM_TO_EXPR => {
                Some(Expr::EnumFromTo(EnumFromToExpr { syntax: node }))
            }
            SyntaxKind::ENUM_FROM_THEN_EXPR => {
                Some(Expr::EnumFromThen(EnumFromThenExpr { syntax: node }))
            }
            SyntaxKind::ENUM_FROM_THEN_TO_EXPR => {
                Some(Expr::EnumFromThenTo(EnumFromThenToExpr { syntax: node }))
            }
            SyntaxKind::SECTION_LEFT => Some(Expr::SectionLeft(SectionLeft { syntax: node })),
            SyntaxKind::SECTION_RIGHT => Some(Expr::SectionRight(SectionRight { syntax: node })),
            SyntaxKind::TYPED_EXPR => Some(Expr::Typed(TypedExpr { syntax: node })),
            SyntaxKind::RECORD_CON_EXPR => {
                Some(Expr::RecordCon(RecordConExpr { syntax: node }))
            }
            SyntaxKind::RECORD_UPDATE_EXPR => {
                Some(Expr::RecordUpdate(RecordUpdateExpr { syntax: node }))
            }
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Var(e) => e.syntax(),
            Expr::Con(e) => e.syntax(),
            Expr::Lit(e) => e.syntax(),
            Expr::App(e) => e.syntax(),
            Expr::Infix(e) => e.syntax(),
            Expr::Neg(e) => e.syntax(),
            Expr::Lambda(e) => e.syntax(),
            Expr::Let(e) => e.syntax(),
            Expr::If(e) => e.syntax(),
            Expr::Case(e) => e.syntax(),
            Expr::Do(e) => e.syntax(),
            Expr::List(e) => e.syntax(),
            Expr::Tuple(e) => e.syntax(),
            Expr::Paren(e) => e.syntax(),
            Expr::ListComp(e) => e.syntax(),
            Expr::EnumFrom(e) => e.syntax(),
            Expr::EnumFromTo(e) => e.syntax(),
            Expr::EnumFromThen(e) => e.syntax(),
            Expr::EnumFromThenTo(e) => e.syntax(),
            Expr::SectionLeft(e) => e.syntax(),
            Expr::SectionRight(e) => e.syntax(),
            Expr::Typed(e) => e.syntax(),
            Expr::RecordCon(e) => e.syntax(),
            Expr::RecordUpdate(e) => e.syntax(),
        }
    }
}

fn first_expr(node: &SyntaxNode) -> Option<Expr> {
    node.children().find_map(Expr::cast)
}

fn nth_expr(node: &SyntaxNode, n: usize) -> Option<Expr> {
    node.children().filter_map(Expr::cast).nth(n)
}

ast_node!(VarExpr, VAR_EXPR);

impl VarExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::VAR_ID | SyntaxKind::UNDERSCORE))
    }
}

ast_node!(ConExpr, CON_EXPR);

impl ConExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }
}

ast_node!(LitExpr, LIT_EXPR);

impl LitExpr {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::INT_LITERAL
                        | SyntaxKind::FLOAT_LITERAL
                        | SyntaxKind::CHAR_LITERAL
                        | SyntaxKind::STRING_LITERAL
                )
            })
    }
}

/// A flat function application `f a b c`; `hsc-typeck` folds this
/// left-associatively during inference (§4.4.5).
ast_node!(AppExpr, APP_EXPR);

impl AppExpr {
    pub fn exprs(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }

    pub fn function(&self) -> Option<Expr> {
        self.exprs().next()
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.exprs().skip(1)
    }
}

/// A flat chain of operands and operator tokens: `a op1 b op2 c`, not yet
/// arranged into an associativity tree (`hsc-rename` resolves this once
/// fixity declarations are known, per §4.2/§9).
ast_node!(InfixExpr, INFIX_EXPR);

impl InfixExpr {
    pub fn operands(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }

    pub fn operators(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| matches!(t.kind(), SyntaxKind::VAR_SYM | SyntaxKind::CON_SYM | SyntaxKind::VAR_ID | SyntaxKind::CON_ID))
            .map(|t| t.text().to_string())
            .collect()
    }
}

ast_node!(NegExpr, NEG_EXPR);

impl NegExpr {
    pub fn operand(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(LambdaExpr, LAMBDA_EXPR);

impl LambdaExpr {
    pub fn params(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::PARAM_LIST)
            .into_iter()
            .flat_map(|list| child_nodes(&list).collect::<Vec<_>>())
    }

    pub fn body(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(LetExpr, LET_EXPR);

impl LetExpr {
    pub fn decls(&self) -> impl Iterator<Item = Decl> + '_ {
        self.syntax.children().filter_map(Decl::cast)
    }

    pub fn body(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(IfExpr, IF_EXPR);

impl IfExpr {
    pub fn condition(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn then_branch(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn else_branch(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 2)
    }
}

ast_node!(CaseExpr, CASE_EXPR);

impl CaseExpr {
    pub fn scrutinee(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn arms(&self) -> impl Iterator<Item = MatchArm> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(MatchArm, MATCH_ARM);

impl MatchArm {
    pub fn pattern(&self) -> Option<Pattern> {
        self.syntax.children().find_map(Pattern::cast)
    }

    pub fn rhs(&self) -> Option<Rhs> {
        child_node(&self.syntax)
    }

    pub fn where_clause(&self) -> Option<WhereClause> {
        child_node(&self.syntax)
    }
}

ast_node!(DoExpr, DO_EXPR);

impl DoExpr {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::STMT_LIST)
            .into_iter()
            .flat_map(|list| list.children().filter_map(Stmt::cast).collect::<Vec<_>>())
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Bind(BindStmt),
    Let(LetStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::BIND_STMT => Some(Stmt::Bind(BindStmt { syntax: node })),
            SyntaxKind::LET_STMT => Some(Stmt::Let(LetStmt { syntax: node })),
            SyntaxKind::EXPR_STMT => Some(Stmt::Expr(ExprStmt { syntax: node })),
            _ => None,
        }
    }
}

ast_node!(BindStmt, BIND_STMT);

impl BindStmt {
    pub fn pattern_expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn source(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(LetStmt, LET_STMT);

impl LetStmt {
    pub fn decls(&self) -> impl Iterator<Item = Decl> + '_ {
        self.syntax.children().filter_map(Decl::cast)
    }
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(ListExpr, LIST_EXPR);

impl ListExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(TupleExpr, TUPLE_EXPR);

impl TupleExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(ListCompExpr, LIST_COMP_EXPR);

impl ListCompExpr {
    pub fn result(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn qualifiers(&self) -> impl Iterator<Item = Qualifier> + '_ {
        self.syntax.children().filter_map(Qualifier::cast)
    }
}

#[derive(Debug, Clone)]
pub enum Qualifier {
    Generator(GeneratorQual),
    Filter(FilterQual),
    Let(LetQual),
}

impl Qualifier {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::GENERATOR_QUAL => Some(Qualifier::Generator(GeneratorQual { syntax: node })),
            SyntaxKind::FILTER_QUAL => Some(Qualifier::Filter(FilterQual { syntax: node })),
            SyntaxKind::LET_QUAL => Some(Qualifier::Let(LetQual { syntax: node })),
            _ => None,
        }
    }
}

ast_node!(GeneratorQual, GENERATOR_QUAL);

impl GeneratorQual {
    pub fn pattern_expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn source(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(FilterQual, FILTER_QUAL);

impl FilterQual {
    pub fn expr(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(LetQual, LET_QUAL);

impl LetQual {
    pub fn decls(&self) -> impl Iterator<Item = Decl> + '_ {
        self.syntax.children().filter_map(Decl::cast)
    }
}

ast_node!(EnumFromExpr, ENUM_FROM_EXPR);

impl EnumFromExpr {
    pub fn from(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(EnumFromToExpr, ENUM_FROM_TO_EXPR);

impl EnumFromToExpr {
    pub fn from(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn to(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(EnumFromThenExpr, ENUM_FROM_THEN_EXPR);

impl EnumFromThenExpr {
    pub fn from(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn then(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(EnumFromThenToExpr, ENUM_FROM_THEN_TO_EXPR);

impl EnumFromThenToExpr {
    pub fn from(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn then(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn to(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 2)
    }
}

/// `(expr op)` -- a section missing its right operand.
ast_node!(SectionLeft, SECTION_LEFT);

impl SectionLeft {
    pub fn operand(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn operator(&self) -> Vec<String> {
        operator_tokens(&self.syntax)
    }
}

/// `(op expr)` -- a section missing its left operand.
ast_node!(SectionRight, SECTION_RIGHT);

impl SectionRight {
    pub fn operand(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn operator(&self) -> Vec<String> {
        operator_tokens(&self.syntax)
    }
}

fn operator_tokens(syntax: &SyntaxNode) -> Vec<String> {
    syntax
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| matches!(t.kind(), SyntaxKind::VAR_SYM | SyntaxKind::CON_SYM))
        .map(|t| t.text().to_string())
        .collect()
}

ast_node!(TypedExpr, TYPED_EXPR);

impl TypedExpr {
    pub fn expr(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn signature(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

ast_node!(RecordConExpr, RECORD_CON_EXPR);

impl RecordConExpr {
    pub fn base(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldBind> + '_ {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::FIELD_BIND_LIST)
            .into_iter()
            .flat_map(|list| child_nodes(&list).collect::<Vec<_>>())
    }
}

ast_node!(RecordUpdateExpr, RECORD_UPDATE_EXPR);

impl RecordUpdateExpr {
    pub fn base(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldBind> + '_ {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::FIELD_BIND_LIST)
            .into_iter()
            .flat_map(|list| child_nodes(&list).collect::<Vec<_>>())
    }
}

ast_node!(FieldBind, FIELD_BIND);

impl FieldBind {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::VAR_ID)
    }

    pub fn value(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

// ── Right-hand sides and guards ─────────────────────────────────────────

ast_node!(Rhs, RHS);

impl Rhs {
    /// The unguarded body, if this `RHS` has no guards.
    pub fn unguarded_body(&self) -> Option<Expr> {
        if self.guarded_rhss().next().is_some() {
            return None;
        }
        first_expr(&self.syntax)
    }

    pub fn guarded_rhss(&self) -> impl Iterator<Item = GuardedRhs> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(GuardedRhs, GUARDED_RHS);

impl GuardedRhs {
    pub fn guards(&self) -> impl Iterator<Item = Guard> + '_ {
        self.syntax.children().filter_map(Guard::cast)
    }

    /// The body expression, always the last `Expr` child (after the guards).
    pub fn body(&self) -> Option<Expr> {
        self.syntax.children().filter_map(Expr::cast).last()
    }
}

#[derive(Debug, Clone)]
pub enum Guard {
    Bool(BoolGuard),
    Pat(PatGuard),
    Let(LetGuard),
}

impl Guard {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::BOOL_GUARD => Some(Guard::Bool(BoolGuard { syntax: node })),
            SyntaxKind::PAT_GUARD => Some(Guard::Pat(PatGuard { syntax: node })),
            SyntaxKind::LET_GUARD => Some(Guard::Let(LetGuard { syntax: node })),
            _ => None,
        }
    }
}

ast_node!(BoolGuard, BOOL_GUARD);

impl BoolGuard {
    pub fn expr(&self) -> Option<Expr> {
        first_expr(&self.syntax)
    }
}

ast_node!(PatGuard, PAT_GUARD);

impl PatGuard {
    pub fn pattern_expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn source(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(LetGuard, LET_GUARD);

impl LetGuard {
    pub fn decls(&self) -> impl Iterator<Item = Decl> + '_ {
        self.syntax.children().filter_map(Decl::cast)
    }
}
