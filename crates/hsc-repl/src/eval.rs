//! Elaborates one piece of REPL input against accumulated session source
//! and reports the inferred polytype of the binder it introduced.
//!
//! Grounded on `mesh-repl::jit`'s role in the teacher (compile-and-run one
//! wrapped expression) with the JIT step dropped: there is no codegen or
//! evaluator in this core (§1), so "eval" here means "elaborate and print
//! the type" rather than "execute and print the value" (DESIGN.md).

use hsc_typeck::ty::Scheme;

#[derive(Debug)]
pub struct EvalResult {
    pub binder: String,
    pub scheme: String,
}

/// Parse and typecheck `source`, then look up `binder`'s elaborated
/// polytype among the top-level `GenBind`s. Surfaces parse, kind, and
/// type errors as a single joined error string -- the REPL loop prints
/// whatever it gets and moves on to the next line (§9 "no operation
/// suspends or awaits", and no REPL-level recovery beyond that).
pub fn elaborate(source: &str, binder: &str) -> Result<EvalResult, String> {
    let parsed = hsc_parser::parse(source);
    if !parsed.errors.is_empty() {
        let msgs: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        return Err(msgs.join("\n"));
    }
    let Some(file) = parsed.source_file() else {
        return Err("parsing produced no module".to_string());
    };

    let (module, kind_errors, type_errors) = hsc_typeck::typecheck(&file);

    if !kind_errors.is_empty() {
        let msgs: Vec<String> = kind_errors.iter().map(|e| e.to_string()).collect();
        return Err(msgs.join("\n"));
    }
    if !type_errors.is_empty() {
        let msgs: Vec<String> = type_errors.iter().map(|e| e.to_string()).collect();
        return Err(msgs.join("\n"));
    }

    for gen_bind in &module.bindings {
        for decl in &gen_bind.decls {
            if decl.name == binder {
                let scheme = Scheme {
                    vars: gen_bind.quantified.clone(),
                    context: gen_bind.dict_params.iter().map(|d| d.constraint.clone()).collect(),
                    ty: decl.ty.clone(),
                };
                return Ok(EvalResult { binder: binder.to_string(), scheme: scheme.to_string() });
            }
        }
    }

    Err(format!("`{binder}` was not elaborated (no matching binding group found)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elaborates_identity() {
        let result = elaborate("it = \\x -> x\n", "it").unwrap();
        assert_eq!(result.binder, "it");
        assert!(result.scheme.contains("->"));
    }

    #[test]
    fn reports_type_error() {
        let err = elaborate("it :: a -> a\nit x = x + 1\n", "it").unwrap_err();
        assert!(!err.is_empty());
    }
}
