//! Typed AST nodes for the module header and top-level/local declarations.

use crate::ast::expr::Rhs;
use crate::ast::pat::Pattern;
use crate::ast::ty::{Context, Type};
use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode, ModuleName, Name};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

// ── Source file / module header ─────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn module_header(&self) -> Option<ModuleHeader> {
        child_node(&self.syntax)
    }

    pub fn decls(&self) -> impl Iterator<Item = Decl> + '_ {
        self.syntax.children().filter_map(Decl::cast)
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDecl> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(ModuleHeader, MODULE_HEADER);

impl ModuleHeader {
    pub fn name(&self) -> Option<ModuleName> {
        child_node(&self.syntax)
    }

    pub fn exports(&self) -> Option<ExportList> {
        child_node(&self.syntax)
    }
}

ast_node!(ExportList, EXPORT_LIST);

impl ExportList {
    pub fn items(&self) -> impl Iterator<Item = ExportItem> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(ExportItem, EXPORT_ITEM);

impl ExportItem {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::VAR_ID | SyntaxKind::CON_ID))
    }
}

// ── Imports ───────────────────────────────────────────────────────────────

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    pub fn is_qualified(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::QUALIFIED_KW).is_some()
    }

    pub fn module_name(&self) -> Option<ModuleName> {
        child_node(&self.syntax)
    }

    pub fn alias(&self) -> Option<ModuleName> {
        child_nodes::<ModuleName>(&self.syntax).nth(1)
    }

    pub fn is_hiding(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::HIDING_KW).is_some()
    }

    pub fn import_list(&self) -> Option<ImportList> {
        child_node(&self.syntax)
    }
}

ast_node!(ImportList, IMPORT_LIST);

impl ImportList {
    pub fn items(&self) -> impl Iterator<Item = ImportItem> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(ImportItem, IMPORT_ITEM);

impl ImportItem {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::VAR_ID | SyntaxKind::CON_ID))
    }
}

// ── Decl enum ────────────────────────────────────────────────────────────

/// Any declaration that can appear at the top level or in a `where`/`let`
/// block. `hsc-rename` groups `FunBind` clauses sharing a name and turns
/// this flat list into the declaration dependency graph (§4.2).
#[derive(Debug, Clone)]
pub enum Decl {
    TypeSyn(TypeSynDecl),
    Data(DataDecl),
    Newtype(NewtypeDecl),
    Class(ClassDecl),
    Instance(InstanceDecl),
    Fixity(FixityDecl),
    TypeSig(TypeSigDecl),
    Default(DefaultDecl),
    ForeignImport(ForeignImportDecl),
    FunBind(FunBind),
    PatBind(PatBind),
}

impl Decl {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::TYPE_SYN_DECL => Some(Decl::TypeSyn(TypeSynDecl { syntax: node })),
            SyntaxKind::DATA_DECL => Some(Decl::Data(DataDecl { syntax: node })),
            SyntaxKind::NEWTYPE_DECL => Some(Decl::Newtype(NewtypeDecl { syntax: node })),
            SyntaxKind::CLASS_DECL => Some(Decl::Class(ClassDecl { syntax: node })),
            SyntaxKind::INSTANCE_DECL => Some(Decl::Instance(InstanceDecl { syntax: node })),
            SyntaxKind::FIXITY_DECL => Some(Decl::Fixity(FixityDecl { syntax: node })),
            SyntaxKind::TYPE_SIG_DECL => Some(Decl::TypeSig(TypeSigDecl { syntax: node })),
            SyntaxKind::DEFAULT_DECL => Some(Decl::Default(DefaultDecl { syntax: node })),
            SyntaxKind::FOREIGN_IMPORT_DECL => {
                Some(Decl::ForeignImport(ForeignImportDecl { syntax: node }))
            }
            SyntaxKind::FUN_BIND => Some(Decl::FunBind(FunBind { syntax: node })),
            SyntaxKind::PAT_BIND => Some(Decl::PatBind(PatBind { syntax: node })),
            _ => None,
        }
    }
}

// ── type / data / newtype ───────────────────────────────────────────────

ast_node!(TypeSynDecl, TYPE_SYN_DECL);

impl TypeSynDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    pub fn type_vars(&self) -> Vec<String> {
        type_var_names(&self.syntax)
    }

    pub fn rhs(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

fn type_var_names(syntax: &SyntaxNode) -> Vec<String> {
    syntax
        .children()
        .find(|n| n.kind() == SyntaxKind::TYPE_VAR_LIST)
        .map(|list| {
            list.children_with_tokens()
                .filter_map(|it| it.into_token())
                .filter(|t| t.kind() == SyntaxKind::VAR_ID)
                .map(|t| t.text().to_string())
                .collect()
        })
        .unwrap_or_default()
}

ast_node!(DataDecl, DATA_DECL);

impl DataDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    pub fn type_vars(&self) -> Vec<String> {
        type_var_names(&self.syntax)
    }

    pub fn constructors(&self) -> impl Iterator<Item = ConDecl> + '_ {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::CON_DECL_LIST)
            .into_iter()
            .flat_map(|list| child_nodes(&list).collect::<Vec<_>>())
    }

    pub fn deriving(&self) -> Option<DerivingClause> {
        child_node(&self.syntax)
    }
}

ast_node!(NewtypeDecl, NEWTYPE_DECL);

impl NewtypeDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    pub fn type_vars(&self) -> Vec<String> {
        type_var_names(&self.syntax)
    }

    pub fn constructor(&self) -> Option<ConDecl> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::CON_DECL_LIST)
            .and_then(|list| child_node(&list))
    }

    pub fn deriving(&self) -> Option<DerivingClause> {
        child_node(&self.syntax)
    }
}

ast_node!(ConDecl, CON_DECL);

impl ConDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    /// Positional field types, for a plain (non-record, non-GADT) alternative.
    pub fn field_types(&self) -> impl Iterator<Item = Type> + '_ {
        self.syntax
            .children()
            .filter(|n| matches!(n.kind(), SyntaxKind::STRICT_TYPE | SyntaxKind::LAZY_TYPE))
            .filter_map(|n| n.children().next().and_then(Type::cast))
    }

    pub fn record_fields(&self) -> Option<FieldDeclList> {
        child_node(&self.syntax)
    }

    /// The explicit signature of a GADT-style alternative (`Con :: T -> U`).
    pub fn gadt_signature(&self) -> Option<Type> {
        if self.record_fields().is_some() || self.field_types().next().is_some() {
            return None;
        }
        child_node(&self.syntax)
    }
}

ast_node!(FieldDeclList, FIELD_DECL_LIST);

impl FieldDeclList {
    pub fn fields(&self) -> impl Iterator<Item = FieldDecl> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(FieldDecl, FIELD_DECL);

impl FieldDecl {
    pub fn names(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::VAR_ID)
            .map(|t| t.text().to_string())
            .collect()
    }

    pub fn field_type(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

ast_node!(DerivingClause, DERIVING_CLAUSE);

impl DerivingClause {
    pub fn class_names(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::CON_ID)
            .map(|t| t.text().to_string())
            .collect()
    }
}

// ── class / instance ─────────────────────────────────────────────────────

ast_node!(ClassDecl, CLASS_DECL);

impl ClassDecl {
    pub fn superclass_context(&self) -> Option<Context> {
        child_node(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    pub fn type_vars(&self) -> Vec<String> {
        type_var_names(&self.syntax)
    }

    pub fn where_clause(&self) -> Option<WhereClause> {
        child_node(&self.syntax)
    }

    /// Method signatures and default implementations in the class body.
    pub fn body_decls(&self) -> impl Iterator<Item = Decl> + '_ {
        self.where_clause()
            .into_iter()
            .flat_map(|w| w.decls().collect::<Vec<_>>())
    }
}

ast_node!(InstanceDecl, INSTANCE_DECL);

impl InstanceDecl {
    pub fn context(&self) -> Option<Context> {
        child_node(&self.syntax)
    }

    pub fn class_name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    pub fn head_types(&self) -> impl Iterator<Item = Type> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn where_clause(&self) -> Option<WhereClause> {
        child_node(&self.syntax)
    }

    pub fn method_binds(&self) -> impl Iterator<Item = Decl> + '_ {
        self.where_clause()
            .into_iter()
            .flat_map(|w| w.decls().collect::<Vec<_>>())
    }
}

// ── fixity / default / foreign import ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    None,
}

ast_node!(FixityDecl, FIXITY_DECL);

impl FixityDecl {
    pub fn associativity(&self) -> Associativity {
        if child_token(&self.syntax, SyntaxKind::INFIXL_KW).is_some() {
            Associativity::Left
        } else if child_token(&self.syntax, SyntaxKind::INFIXR_KW).is_some() {
            Associativity::Right
        } else {
            Associativity::None
        }
    }

    pub fn precedence(&self) -> Option<u8> {
        child_token(&self.syntax, SyntaxKind::INT_LITERAL)
            .and_then(|t| t.text().parse().ok())
    }

    pub fn operators(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| matches!(t.kind(), SyntaxKind::VAR_SYM | SyntaxKind::CON_SYM))
            .map(|t| t.text().to_string())
            .collect()
    }
}

ast_node!(DefaultDecl, DEFAULT_DECL);

impl DefaultDecl {
    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(ForeignImportDecl, FOREIGN_IMPORT_DECL);

impl ForeignImportDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::VAR_ID)
    }

    pub fn signature(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

// ── signatures / equations ──────────────────────────────────────────────

ast_node!(TypeSigDecl, TYPE_SIG_DECL);

impl TypeSigDecl {
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn signature(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

ast_node!(FunBind, FUN_BIND);

impl FunBind {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn params(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn rhs(&self) -> Option<Rhs> {
        child_node(&self.syntax)
    }

    pub fn where_clause(&self) -> Option<WhereClause> {
        child_node(&self.syntax)
    }
}

ast_node!(PatBind, PAT_BIND);

impl PatBind {
    pub fn pattern(&self) -> Option<Pattern> {
        child_node(&self.syntax)
    }

    pub fn rhs(&self) -> Option<Rhs> {
        child_node(&self.syntax)
    }

    pub fn where_clause(&self) -> Option<WhereClause> {
        child_node(&self.syntax)
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Pattern> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(WhereClause, WHERE_CLAUSE);

impl WhereClause {
    pub fn decls(&self) -> impl Iterator<Item = Decl> + '_ {
        self.syntax.children().filter_map(Decl::cast)
    }
}
