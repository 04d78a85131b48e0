//! Seeds the five environments with the fixed prelude this checker needs
//! to make sense of literals, `if`, list syntax, and the numeric/equality
//! classes the defaulting algorithm (§4.4.9) is defined in terms of.
//!
//! Grounded on `hsc_kinds::check::register_builtins` (the same constructor
//! set, one layer up: this module additionally gives each constructor's
//! constructors a CVE entry and seeds the standard type classes those
//! `default.cc`-derived defaulting rules name by fixed string).

use rustc_hash::FxHashMap;

use crate::env::{ClassEnv, ClassInfo, Cve, Gve, InstanceEnv, InstanceInfo, Tce};
use crate::ty::{PredType, Scheme, Type, TypeCon, TypeVar};
use hsc_kinds::Kind;

/// The standard numeric classes `default.cc`'s eligibility rule checks for
/// ("at least one numeric class among these") (§4.4.9).
pub const NUMERIC_CLASSES: &[&str] = &["Num", "Integral", "Floating", "Fractional", "Real", "RealFloat", "RealFrac"];

/// The full standard-class allowlist defaulting requires every constraint
/// on an ambiguous variable to belong to (§4.4.9).
pub fn is_standard_class(name: &str) -> bool {
    NUMERIC_CLASSES.contains(&name)
        || matches!(name, "Eq" | "Ord" | "Show" | "Read" | "Bounded" | "Enum" | "Ix" | "Functor" | "Monad" | "MonadPlus")
}

/// The module's default-type list if none was declared (§4.4.9).
pub fn default_default_types() -> Vec<Type> {
    vec![con("Int"), con("Double")]
}

fn con(name: &str) -> Type {
    Type::Con(TypeCon::new(name, Kind::Star))
}

fn tv(name: &str) -> TypeVar {
    TypeVar::new(name, Kind::Star)
}

/// The fixed monotype shape of one builtin class method, in terms of the
/// class's own parameter `a` (§4.4.10 "method signature instantiated at the
/// class's own variable", same rule `decls::register_class` applies to a
/// user-written class, hardcoded here since the prelude's classes have no
/// parsed `TypeSig` to elaborate).
///
/// `Ord`'s `compare` returns `Bool` rather than an `Ordering` three-way
/// result: there is no `Ordering` type constructor in this core's fixed
/// TCE (DESIGN.md Open Question), so the comparison methods this checker
/// actually exercises are the boolean ones.
fn builtin_method_ty(class_name: &str, method: &str, a: &Type) -> Type {
    match (class_name, method) {
        ("Num", "+") | ("Num", "*") => Type::curried_fun(vec![a.clone(), a.clone()], a.clone()),
        ("Num", "fromInteger") => Type::fun(con("Integer"), a.clone()),
        ("Eq", "==") => Type::curried_fun(vec![a.clone(), a.clone()], con("Bool")),
        ("Ord", "compare") => Type::curried_fun(vec![a.clone(), a.clone()], con("Bool")),
        ("Show", "show") => Type::fun(a.clone(), Type::list(con("Char"))),
        ("Fractional", "/") => Type::curried_fun(vec![a.clone(), a.clone()], a.clone()),
        ("Fractional", "fromRational") => Type::fun(con("Rational"), a.clone()),
        ("Enum", "succ") | ("Enum", "pred") => Type::fun(a.clone(), a.clone()),
        ("Enum", "toEnum") => Type::fun(con("Int"), a.clone()),
        ("Enum", "fromEnum") => Type::fun(a.clone(), con("Int")),
        _ => a.clone(),
    }
}

pub struct Builtins {
    pub tce: Tce,
    pub cve: Cve,
    pub gve: Gve,
    pub classes: ClassEnv,
    pub instances: InstanceEnv,
}

/// Builds the fixed prelude environments from scratch. Called once before
/// a module's own declarations are registered on top.
pub fn prelude() -> Builtins {
    let mut tce = Tce::new();
    for name in ["Int", "Integer", "Double", "Rational", "Char", "Bool", "()"] {
        tce.insert(TypeCon::new(name, Kind::Star));
    }
    tce.insert(TypeCon::new("[]", Kind::fun(Kind::Star, Kind::Star)));
    tce.insert(TypeCon::new("->", Kind::fun(Kind::Star, Kind::fun(Kind::Star, Kind::Star))));
    tce.insert(TypeCon::new("Maybe", Kind::fun(Kind::Star, Kind::Star)));

    let mut cve = Cve::new();
    cve.insert("True", Scheme::mono(con("Bool")));
    cve.insert("False", Scheme::mono(con("Bool")));
    cve.insert("()", Scheme::mono(con("()")));
    let a = tv("a");
    cve.insert(
        "Nothing",
        Scheme { vars: vec![a.clone()], context: vec![], ty: Type::app(con("Maybe"), vec![Type::Rigid(a.clone())]) },
    );
    cve.insert(
        "Just",
        Scheme {
            vars: vec![a.clone()],
            context: vec![],
            ty: Type::fun(Type::Rigid(a.clone()), Type::app(con("Maybe"), vec![Type::Rigid(a)])),
        },
    );

    let mut gve = Gve::new();
    let mut classes = ClassEnv::new();
    for (name, methods) in [
        ("Eq", &["=="][..]),
        ("Ord", &["compare"][..]),
        ("Show", &["show"][..]),
        ("Num", &["+", "*", "fromInteger"][..]),
        ("Fractional", &["/", "fromRational"][..]),
        ("Enum", &["succ", "pred", "toEnum", "fromEnum"][..]),
    ] {
        let param = tv("a");
        let a_ty = Type::Rigid(param.clone());
        let superclasses = if name == "Ord" {
            vec![PredType::new("Eq", vec![a_ty.clone()])]
        } else if name == "Fractional" {
            vec![PredType::new("Num", vec![a_ty.clone()])]
        } else {
            vec![]
        };
        let own_pred = PredType::new(name, vec![a_ty.clone()]);

        let mut method_schemes = FxHashMap::default();
        for method_name in methods {
            let ty = builtin_method_ty(name, method_name, &a_ty);
            let scheme = Scheme { vars: vec![param.clone()], context: vec![own_pred.clone()], ty };
            gve.insert(*method_name, scheme.clone());
            method_schemes.insert(method_name.to_string(), scheme);
        }

        classes.insert(ClassInfo {
            name: name.to_string(),
            param,
            superclasses,
            methods: method_schemes,
            method_order: methods.iter().map(|m| m.to_string()).collect(),
        });
    }

    let mut instances = InstanceEnv::new();
    for ty_name in ["Int", "Double", "Integer"] {
        instances.insert(InstanceInfo {
            dfun_name: format!("dfun_Num_{ty_name}"),
            vars: vec![],
            context: vec![],
            head: PredType::new("Num", vec![con(ty_name)]),
        });
        instances.insert(InstanceInfo {
            dfun_name: format!("dfun_Eq_{ty_name}"),
            vars: vec![],
            context: vec![],
            head: PredType::new("Eq", vec![con(ty_name)]),
        });
        instances.insert(InstanceInfo {
            dfun_name: format!("dfun_Show_{ty_name}"),
            vars: vec![],
            context: vec![],
            head: PredType::new("Show", vec![con(ty_name)]),
        });
    }
    instances.insert(InstanceInfo {
        dfun_name: "dfun_Fractional_Double".into(),
        vars: vec![],
        context: vec![],
        head: PredType::new("Fractional", vec![con("Double")]),
    });

    Builtins { tce, cve, gve, classes, instances }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_registers_bool_and_maybe() {
        let b = prelude();
        assert!(b.tce.get("Bool").is_some());
        assert!(b.tce.get("Maybe").is_some());
        assert!(b.cve.get("Just").is_some());
    }

    #[test]
    fn prelude_registers_operator_methods_in_gve() {
        let b = prelude();
        let plus = b.gve.get("+").expect("`+` should be in the GVE");
        assert_eq!(plus.context.len(), 1);
        assert_eq!(plus.context[0].class, "Num");
        assert!(b.gve.get("show").is_some());
        assert!(b.gve.get("==").is_some());
    }

    #[test]
    fn numeric_class_membership() {
        assert!(is_standard_class("Num"));
        assert!(is_standard_class("Eq"));
        assert!(!is_standard_class("MyWeirdClass"));
    }
}
