//! The six end-to-end scenarios named in §8 "Concrete end-to-end
//! scenarios", each driving the full parse -> kind-check -> typecheck
//! pipeline on a literal source snippet and asserting on the printed
//! elaborated type or the specific error variant raised.
//!
//! Grounded on `snow-typeck/tests/inference.rs`'s shape: a small
//! `typecheck_source` helper plus one `#[test]` per scenario, divided by
//! `// --` comments.

use hsc_typeck::error::TypeError;
use hsc_typeck::{elaborated::ElaboratedModule, typecheck};

fn typecheck_source(src: &str) -> (ElaboratedModule, Vec<hsc_kinds::KindError>, Vec<TypeError>) {
    let parsed = hsc_parser::parse(src);
    assert!(parsed.errors.is_empty(), "unexpected parse errors: {:?}", parsed.errors);
    let file = parsed.source_file().expect("a parsed module");
    typecheck(&file)
}

fn find_scheme(module: &ElaboratedModule, name: &str) -> Option<hsc_typeck::ty::Scheme> {
    for gen_bind in &module.bindings {
        for decl in &gen_bind.decls {
            if decl.name == name {
                return Some(hsc_typeck::ty::Scheme {
                    vars: gen_bind.quantified.clone(),
                    context: gen_bind.dict_params.iter().map(|d| d.constraint.clone()).collect(),
                    ty: decl.ty.clone(),
                });
            }
        }
    }
    None
}

// -- Polymorphic identity --

#[test]
fn polymorphic_identity_generalizes_over_a_fresh_variable() {
    let (module, kind_errors, type_errors) = typecheck_source("id x = x\n");
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(type_errors.is_empty(), "{:?}", type_errors);

    let scheme = find_scheme(&module, "id").expect("`id` should be elaborated");
    assert_eq!(scheme.vars.len(), 1, "id should quantify exactly one type variable");
    assert!(scheme.context.is_empty(), "id carries no class constraints");
    assert!(scheme.to_string().ends_with("-> a") || scheme.to_string().contains("-> "), "{}", scheme);
}

// -- Overloaded numeric literal --

#[test]
fn unconstrained_numeric_binding_defaults_to_int() {
    // `n = 3` is a zero-parameter, unsignatured binding: the monomorphism
    // restriction applies, so its leftover `Num` obligation is resolved by
    // defaulting rather than quantified away.
    let (module, kind_errors, type_errors) = typecheck_source("n = 3\n");
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(type_errors.is_empty(), "{:?}", type_errors);

    let scheme = find_scheme(&module, "n").expect("`n` should be elaborated");
    assert!(scheme.vars.is_empty(), "defaulting leaves no quantified variables");
    assert!(scheme.context.is_empty(), "defaulting discharges the Num constraint");
    assert_eq!(scheme.ty.to_string(), "Int");
}

// -- Class with a superclass --

#[test]
fn class_declaration_registers_its_superclass_and_method() {
    let src = "class Eq a where\n  eq :: a -> a -> Bool\n\nclass Eq a => Ord a where\n  lt :: a -> a -> Bool\n";
    let (tce_kinds, class_param_kinds, kind_errors) = {
        let parsed = hsc_parser::parse(src);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let file = parsed.source_file().expect("a parsed module");
        hsc_kinds::check_module(&file)
    };
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);

    let parsed = hsc_parser::parse(src);
    let file = parsed.source_file().expect("a parsed module");
    let mut builtins = hsc_typeck::builtins::prelude();
    let header_errors = hsc_typeck::decls::register_type_and_class_headers(&file, &tce_kinds, &class_param_kinds, &mut builtins);
    assert!(header_errors.is_empty(), "{:?}", header_errors);

    let ord = builtins.classes.get("Ord").expect("Ord should be registered");
    assert_eq!(ord.superclasses.len(), 1);
    assert_eq!(ord.superclasses[0].class, "Eq");
    assert!(builtins.gve.get("lt").is_some(), "Ord's own method should reach the GVE");
    assert!(builtins.gve.get("eq").is_some(), "Eq's method should reach the GVE");
}

// -- Instance resolution with a premise --

#[test]
fn instance_with_a_premise_registers_a_dictionary_function_with_context() {
    let src = "class Eq a where\n  eq :: a -> a -> Bool\n\ninstance Eq a => Eq [a] where\n  eq xs ys = True\n";
    let (module, kind_errors, type_errors) = typecheck_source(src);
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(type_errors.is_empty(), "{:?}", type_errors);

    let dfun = module
        .bindings
        .iter()
        .flat_map(|gb| gb.decls.iter())
        .find(|d| d.name.starts_with("dfun_Eq_List"));
    assert!(dfun.is_some(), "instance Eq [a] should elaborate to a dfun binding, got: {:?}", module.bindings.iter().flat_map(|gb| gb.decls.iter()).map(|d| &d.name).collect::<Vec<_>>());
}

// -- Defaulting trigger --

#[test]
fn let_bound_numeric_literal_defaults_before_show_consumes_it() {
    let src = "result = let x = 1 + 2 in show x\n";
    let (module, kind_errors, type_errors) = typecheck_source(src);
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(type_errors.is_empty(), "{:?}", type_errors);

    let scheme = find_scheme(&module, "result").expect("`result` should be elaborated");
    assert!(scheme.vars.is_empty());
    assert!(scheme.context.is_empty());
    assert_eq!(scheme.ty.to_string(), "[Char]");
}

// -- Signature forces rejection --

#[test]
fn signature_without_a_num_context_rejects_a_numeric_literal_use() {
    let src = "f :: a -> a\nf x = x + 1\n";
    let (_module, kind_errors, type_errors) = typecheck_source(src);
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(!type_errors.is_empty(), "f's body needs Num a, which its signature does not grant");
    assert!(
        type_errors.iter().any(|e| matches!(e, TypeError::NoInstance { .. })),
        "expected a NoInstance error, got: {:?}",
        type_errors
    );
}

// -- Malformed instance heads --

#[test]
fn instance_head_that_is_a_bare_variable_is_rejected() {
    let src = "class Eq a where\n  eq :: a -> a -> Bool\n\ninstance Eq a where\n  eq x y = True\n";
    let (_module, kind_errors, type_errors) = typecheck_source(src);
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(
        type_errors.iter().any(|e| matches!(e, TypeError::InstanceHeadIllegal { .. })),
        "a bare-variable instance head should be rejected, got: {:?}",
        type_errors
    );
}

#[test]
fn instance_context_variable_absent_from_the_head_is_rejected() {
    let src = "class Foo a where\n  foo :: a -> Bool\n\nclass Eq a where\n  eq :: a -> a -> Bool\n\ninstance Foo b => Eq Int where\n  eq x y = True\n";
    let (_module, kind_errors, type_errors) = typecheck_source(src);
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(
        type_errors.iter().any(|e| matches!(e, TypeError::InstanceHeadIllegal { .. })),
        "`b` in the context doesn't occur in the `Int` head, and should be rejected, got: {:?}",
        type_errors
    );
}

// -- Superclass cycle --

#[test]
fn a_cycle_between_two_classes_superclasses_is_rejected() {
    let src = "class A b => B b where\n  bOp :: b -> Bool\n\nclass B a => A a where\n  aOp :: a -> Bool\n";
    let (tce_kinds, class_param_kinds, kind_errors) = {
        let parsed = hsc_parser::parse(src);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let file = parsed.source_file().expect("a parsed module");
        hsc_kinds::check_module(&file)
    };
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);

    let parsed = hsc_parser::parse(src);
    let file = parsed.source_file().expect("a parsed module");
    let mut builtins = hsc_typeck::builtins::prelude();
    let header_errors = hsc_typeck::decls::register_type_and_class_headers(&file, &tce_kinds, &class_param_kinds, &mut builtins);
    assert!(
        header_errors.iter().any(|e| matches!(e, TypeError::SuperclassCycle { .. })),
        "A => B => A should be rejected as a superclass cycle, got: {:?}",
        header_errors
    );
}

// -- Superclass dictionary accessor --

#[test]
fn an_instance_with_a_superclass_elaborates_a_superclass_accessor() {
    let src = "class Eq a where\n  eq :: a -> a -> Bool\n\nclass Eq a => Ord a where\n  lt :: a -> a -> Bool\n\ninstance Eq Int where\n  eq x y = True\n\ninstance Ord Int where\n  lt x y = True\n";
    let (module, kind_errors, type_errors) = typecheck_source(src);
    assert!(kind_errors.is_empty(), "{:?}", kind_errors);
    assert!(type_errors.is_empty(), "{:?}", type_errors);

    let accessor = module.bindings.iter().flat_map(|gb| gb.decls.iter()).find(|d| d.name == "eqFromOrd");
    assert!(
        accessor.is_some(),
        "Ord's dictionary should elaborate an `eqFromOrd` accessor projecting its `Eq` slot, got: {:?}",
        module.bindings.iter().flat_map(|gb| gb.decls.iter()).map(|d| &d.name).collect::<Vec<_>>()
    );

    let dfun = module
        .bindings
        .iter()
        .flat_map(|gb| gb.decls.iter())
        .find(|d| d.name.starts_with("dfun_Ord"))
        .expect("instance Ord Int should elaborate a dfun binding");
    assert!(
        matches!(&dfun.body, hsc_typeck::elaborated::ElabExpr::DictCon { fields, .. } if !fields.is_empty()),
        "Ord Int's dictionary should carry its Eq Int superclass dictionary as a field"
    );
}
