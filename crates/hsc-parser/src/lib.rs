//! Lossless CST and typed AST for the hsc surface grammar (§4.1).
//!
//! [`parse`] runs the lexer (including layout resolution) and the
//! event-based parser, producing a [`Parse`] holding a rowan green tree plus
//! any syntax errors found along the way. The tree is lossless: every byte
//! of the source, including comments and whitespace, round-trips through
//! [`SyntaxNode::text`](rowan::SyntaxNode::text).

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

pub use error::ParseError;

use cst::SyntaxNode;

/// The result of parsing a single source file: a lossless tree plus the
/// syntax errors recovered along the way. Parsing never fails outright --
/// malformed input produces `ERROR_NODE`s and entries in `errors`, so the
/// caller always gets a tree to keep working with (§4.1 "error recovery").
pub struct Parse {
    green: rowan::GreenNode,
    pub errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn source_file(&self) -> Option<ast::item::SourceFile> {
        ast::AstNode::cast(self.syntax())
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn parse(source: &str) -> Parse {
    let tokens = hsc_lexer::Lexer::tokenize(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut p);
    let (green, errors) = p.build_tree();
    Parse { green, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::AstNode;

    fn parse_ok(src: &str) -> Parse {
        let parsed = parse(src);
        assert!(parsed.errors.is_empty(), "unexpected errors: {:?}", parsed.errors);
        parsed
    }

    #[test]
    fn parses_empty_module() {
        let parsed = parse("");
        assert!(parsed.source_file().is_some());
    }

    #[test]
    fn parses_module_header() {
        let parsed = parse_ok(
            r#"
module Main (main) where

main = putStrLn "hello"
"#,
        );
        let file = parsed.source_file().unwrap();
        let header = file.module_header().unwrap();
        assert_eq!(header.name().unwrap().text().unwrap(), "Main");
        assert!(header.exports().is_some());
    }

    #[test]
    fn parses_simple_function_binding() {
        let parsed = parse_ok("add x y = x + y\n");
        let file = parsed.source_file().unwrap();
        let decls: Vec<_> = file.decls().collect();
        assert_eq!(decls.len(), 1);
        match &decls[0] {
            ast::item::Decl::FunBind(fb) => {
                assert_eq!(fb.name().unwrap().text().unwrap(), "add");
                assert_eq!(fb.params().unwrap().params().count(), 2);
            }
            other => panic!("expected FunBind, got {other:?}"),
        }
    }

    #[test]
    fn parses_data_decl_with_constructors() {
        let parsed = parse_ok("data Maybe a = Nothing | Just a\n");
        let file = parsed.source_file().unwrap();
        match file.decls().next().unwrap() {
            ast::item::Decl::Data(data) => {
                assert_eq!(data.name().unwrap().text(), "Maybe");
                assert_eq!(data.type_vars(), vec!["a"]);
                let cons: Vec<_> = data.constructors().collect();
                assert_eq!(cons.len(), 2);
                assert_eq!(cons[0].name().unwrap().text(), "Nothing");
                assert_eq!(cons[1].name().unwrap().text(), "Just");
            }
            other => panic!("expected DataDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_class_and_instance() {
        let parsed = parse_ok(
            r#"
class Eq a where
  (==) :: a -> a -> Bool

instance Eq Int where
  (==) x y = eqInt x y
"#,
        );
        let file = parsed.source_file().unwrap();
        let decls: Vec<_> = file.decls().collect();
        assert!(matches!(decls[0], ast::item::Decl::Class(_)));
        assert!(matches!(decls[1], ast::item::Decl::Instance(_)));
    }

    #[test]
    fn parses_let_and_case_and_do() {
        let parsed = parse_ok(
            r#"
run = do
  let x = 1
  y <- getLine
  case x of
    1 -> putStrLn "one"
    _ -> putStrLn "other"
"#,
        );
        assert!(parsed.source_file().is_some());
    }

    #[test]
    fn parses_list_comprehension() {
        let parsed = parse_ok("squares = [x * x | x <- [1 .. 10], x > 2]\n");
        assert!(parsed.source_file().is_some());
    }

    #[test]
    fn parses_type_signature_with_context() {
        let parsed = parse_ok("member :: Eq a => a -> [a] -> Bool\nmember x xs = True\n");
        let file = parsed.source_file().unwrap();
        assert!(matches!(file.decls().next().unwrap(), ast::item::Decl::TypeSig(_)));
    }

    #[test]
    fn recovers_from_malformed_input() {
        let parsed = parse("data = \n");
        assert!(!parsed.errors.is_empty());
        // We still get a tree back, even if it's full of error nodes.
        assert!(parsed.source_file().is_some());
    }
}
