//! Parser integration tests exercising the full lex -> layout -> parse
//! pipeline through the public `hsc_parser::parse` entry point.

use hsc_parser::ast::item::Decl;
use hsc_parser::ast::AstNode;
use hsc_parser::parse;

fn parse_ok(source: &str) -> hsc_parser::Parse {
    let parsed = parse(source);
    assert!(
        parsed.errors.is_empty(),
        "expected no parse errors, got: {:?}",
        parsed.errors
    );
    parsed
}

// ── Module header ────────────────────────────────────────────────────────

#[test]
fn module_with_explicit_exports() {
    let parsed = parse_ok(
        r#"
module Shapes (Shape(..), area) where

area = 0
"#,
    );
    let file = parsed.source_file().unwrap();
    let header = file.module_header().unwrap();
    assert_eq!(header.name().unwrap().text().unwrap(), "Shapes");
    assert_eq!(header.exports().unwrap().items().count(), 2);
}

#[test]
fn module_without_header_has_no_module_name() {
    let parsed = parse_ok("x = 1\n");
    let file = parsed.source_file().unwrap();
    assert!(file.module_header().is_none());
}

// ── Imports ───────────────────────────────────────────────────────────────

#[test]
fn qualified_import_with_alias_and_list() {
    let parsed = parse_ok("import qualified Data.Map as Map (lookup, insert)\n");
    let file = parsed.source_file().unwrap();
    let import = file.imports().next().unwrap();
    assert!(import.is_qualified());
    assert_eq!(import.import_list().unwrap().items().count(), 2);
}

// ── Declarations ──────────────────────────────────────────────────────────

#[test]
fn data_decl_with_record_fields_and_deriving() {
    let parsed = parse_ok("data Point = Point { px :: Int, py :: Int } deriving (Eq, Show)\n");
    let file = parsed.source_file().unwrap();
    match file.decls().next().unwrap() {
        Decl::Data(data) => {
            assert_eq!(data.type_vars().len(), 0);
            let con = data.constructors().next().unwrap();
            let fields: Vec<_> = con.record_fields().unwrap().fields().collect();
            assert_eq!(fields.len(), 2);
            assert_eq!(data.deriving().unwrap().class_names(), vec!["Eq", "Show"]);
        }
        other => panic!("expected DataDecl, got {other:?}"),
    }
}

#[test]
fn newtype_decl() {
    let parsed = parse_ok("newtype Age = Age Int\n");
    let file = parsed.source_file().unwrap();
    assert!(matches!(file.decls().next().unwrap(), Decl::Newtype(_)));
}

#[test]
fn type_synonym() {
    let parsed = parse_ok("type Name = String\n");
    let file = parsed.source_file().unwrap();
    match file.decls().next().unwrap() {
        Decl::TypeSyn(syn) => assert_eq!(syn.name().unwrap().text(), "Name"),
        other => panic!("expected TypeSynDecl, got {other:?}"),
    }
}

#[test]
fn fixity_declaration() {
    let parsed = parse_ok("infixl 6 <+>, <->\n");
    let file = parsed.source_file().unwrap();
    match file.decls().next().unwrap() {
        Decl::Fixity(fx) => {
            assert_eq!(fx.precedence(), Some(6));
            assert_eq!(fx.operators(), vec!["<+>", "<->"]);
        }
        other => panic!("expected FixityDecl, got {other:?}"),
    }
}

#[test]
fn class_with_default_method_and_superclass() {
    let parsed = parse_ok(
        r#"
class Eq a => Ord a where
  compare :: a -> a -> Int
  (<) x y = compare x y < 0
"#,
    );
    let file = parsed.source_file().unwrap();
    match file.decls().next().unwrap() {
        Decl::Class(class) => {
            assert!(class.superclass_context().is_some());
            assert_eq!(class.name().unwrap().text(), "Ord");
            assert_eq!(class.body_decls().count(), 2);
        }
        other => panic!("expected ClassDecl, got {other:?}"),
    }
}

#[test]
fn instance_with_context() {
    let parsed = parse_ok(
        r#"
instance Eq a => Eq [a] where
  (==) xs ys = True
"#,
    );
    let file = parsed.source_file().unwrap();
    match file.decls().next().unwrap() {
        Decl::Instance(inst) => {
            assert!(inst.context().is_some());
            assert_eq!(inst.class_name().unwrap().text(), "Eq");
        }
        other => panic!("expected InstanceDecl, got {other:?}"),
    }
}

// ── Function equations, guards, where ───────────────────────────────────

#[test]
fn guarded_equation_with_where_clause() {
    let parsed = parse_ok(
        r#"
classify n
  | n < 0 = "negative"
  | n == 0 = "zero"
  | otherwise = "positive"
  where otherwise = True
"#,
    );
    let file = parsed.source_file().unwrap();
    match file.decls().next().unwrap() {
        Decl::FunBind(fb) => {
            assert_eq!(fb.name().unwrap().text().unwrap(), "classify");
            let rhs = fb.rhs().unwrap();
            assert!(rhs.unguarded_body().is_none());
            assert_eq!(rhs.guarded_rhss().count(), 3);
            assert!(fb.where_clause().is_some());
        }
        other => panic!("expected FunBind, got {other:?}"),
    }
}

#[test]
fn pattern_binding_with_tuple_pattern() {
    let parsed = parse_ok("(x, y) = (1, 2)\n");
    let file = parsed.source_file().unwrap();
    assert!(matches!(file.decls().next().unwrap(), Decl::PatBind(_)));
}

// ── Expressions ───────────────────────────────────────────────────────────

#[test]
fn infix_expression_stays_flat_for_later_fixity_resolution() {
    let parsed = parse_ok("r = a + b * c - d\n");
    assert!(parsed.source_file().is_some());
}

#[test]
fn lambda_and_application() {
    let parsed = parse_ok("apply f x = f x\nid = \\x -> x\n");
    let file = parsed.source_file().unwrap();
    assert_eq!(file.decls().count(), 2);
}

#[test]
fn nested_do_with_let_and_bind() {
    let parsed = parse_ok(
        r#"
main = do
  let greeting = "hi"
  name <- getLine
  putStrLn (greeting ++ name)
"#,
    );
    assert!(parsed.source_file().is_some());
}

#[test]
fn operator_sections() {
    let parsed = parse_ok("incs = map (+ 1) [1, 2, 3]\ndecs = map (subtract 1) xs\n");
    assert!(parsed.source_file().is_some());
}

#[test]
fn record_construction_expression() {
    let parsed = parse_ok("origin = Point { px = 0, py = 0 }\n");
    assert!(parsed.source_file().is_some());
}

#[test]
fn enumeration_forms() {
    let parsed = parse_ok("a = [1 ..]\nb = [1 .. 10]\nc = [1, 3 ..]\nd = [1, 3 .. 9]\n");
    let file = parsed.source_file().unwrap();
    assert_eq!(file.decls().count(), 4);
}

// ── Error recovery ────────────────────────────────────────────────────────

#[test]
fn missing_rhs_reports_error_but_still_produces_a_tree() {
    let parsed = parse("broken =\n");
    assert!(!parsed.errors.is_empty());
    assert!(parsed.source_file().is_some());
}
