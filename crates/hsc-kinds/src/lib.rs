//! Kind checking (§4.2): a small, independent pass between parsing and
//! type checking. It assigns every type constructor and class parameter a
//! kind, checks every type expression in the module against it, and
//! defaults whatever is left undetermined to `★`.
//!
//! This crate's unification table is entirely separate from `hsc-typeck`'s
//! meta-type-variable table -- kinds and types are different algebras
//! unified at different times for different reasons (§3).

pub mod check;
pub mod error;
pub mod kind;

pub use check::{decompose_type_app, KindChecker, Tce, TyConInfo};
pub use error::{KindError, KindErrorKind};
pub use kind::{Kind, KindVar};

/// Run the full kind-checking pass over a parsed module: register headers,
/// check every type expression, and default remaining free kind variables
/// to `★`. Returns the finished type constructor environment, the kinds of
/// each class's parameters, and any errors found along the way.
pub fn check_module(
    file: &hsc_parser::ast::item::SourceFile,
) -> (Tce, rustc_hash::FxHashMap<String, Vec<Kind>>, Vec<KindError>) {
    let mut checker = KindChecker::new();
    checker.register_headers(file);
    checker.check_module(file);
    checker.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_module_reports_no_errors_for_well_kinded_program() {
        let parsed = hsc_parser::parse(
            r#"
data Maybe a = Nothing | Just a

class Functor f where
  fmap :: (a -> b) -> f a -> f b

instance Functor Maybe where
  fmap f Nothing = Nothing
  fmap f (Just x) = Just (f x)
"#,
        );
        let file = parsed.source_file().unwrap();
        let (_, _, errors) = check_module(&file);
        assert!(errors.is_empty(), "{errors:?}");
    }
}
