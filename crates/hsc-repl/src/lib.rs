//! Interactive read-eval-elaborate-print loop for the hsc front end.
//!
//! Grounded on `mesh-repl`/`snow-repl`'s shape -- a [`ReplSession`]
//! accumulating definitions plus a `rustyline`-driven loop -- with the
//! LLVM JIT compilation step dropped: this core has no evaluator or
//! codegen (§1), so each input is elaborated and its inferred polytype is
//! printed rather than executed (see [`eval`]).
//!
//! ## Architecture
//!
//! - [`eval`]: parses and typechecks one piece of input against
//!   accumulated session source, reporting the elaborated polytype.
//! - [`session`]: session state -- accumulated definitions and a counter
//!   for naming one-off expression wrappers.

pub mod eval;
pub mod session;

pub use eval::{elaborate, EvalResult};
pub use session::ReplSession;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Configuration for the REPL.
pub struct ReplConfig {
    /// The primary prompt string (default: `"hsc> "`).
    pub prompt: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self { prompt: "hsc> ".to_string() }
    }
}

/// Run the interactive REPL loop: read a line, decide whether it is a
/// top-level declaration or a bare expression, elaborate it against the
/// session's accumulated definitions, and print the result.
pub fn run_repl(config: &ReplConfig) -> Result<(), String> {
    let mut rl = DefaultEditor::new().map_err(|e| format!("failed to start line editor: {e}"))?;
    let mut session = ReplSession::new();

    loop {
        match rl.readline(&config.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    ":quit" | ":q" => break,
                    ":reset" => {
                        session.reset();
                        println!("session reset");
                        continue;
                    }
                    ":help" | ":h" => {
                        print_help();
                        continue;
                    }
                    _ => {}
                }

                handle_line(&mut session, trimmed);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(format!("readline error: {e}")),
        }
    }

    Ok(())
}

fn print_help() {
    println!(":quit / :q    exit the REPL");
    println!(":reset        discard all accumulated definitions");
    println!(":help / :h    show this message");
    println!("Anything else is elaborated as a declaration (if it defines a");
    println!("name) or as an expression (otherwise), and its inferred type");
    println!("is printed.");
}

/// Decide whether `input` is a top-level declaration (it parses, on its
/// own, as nothing but `FunBind`/`PatBind`/`TypeSig` nodes) or a bare
/// expression, then elaborate it accordingly. A declaration may bind more
/// than one name (a tuple pattern binding); every name it introduces is
/// reported.
fn handle_line(session: &mut ReplSession, input: &str) {
    if let Some(names) = definition_binder_names(input) {
        if names.is_empty() {
            eprintln!("error: declaration binds no names");
            return;
        }
        let mut candidate = session.definitions_source();
        if !candidate.is_empty() {
            candidate.push('\n');
        }
        candidate.push_str(input);
        candidate.push('\n');

        let mut ok = true;
        for name in &names {
            match eval::elaborate(&candidate, name) {
                Ok(result) => {
                    session.record_result(result.binder.clone(), result.scheme.clone());
                    println!("{} :: {}", result.binder, result.scheme);
                }
                Err(e) => {
                    ok = false;
                    eprintln!("error: {e}");
                }
            }
        }
        if ok {
            session.add_definition(input);
        }
        return;
    }

    let (source, wrapper) = session.wrap_expression(input);
    match eval::elaborate(&source, &wrapper) {
        Ok(result) => {
            session.record_result(result.binder, result.scheme.clone());
            println!("it :: {}", result.scheme);
        }
        Err(e) => eprintln!("error: {e}"),
    }
}

/// If `input` parses, on its own, as nothing but value-introducing
/// top-level declarations (`FunBind`/`PatBind`, optionally alongside a
/// `TypeSig`), returns every name bound. Otherwise `None`, meaning the
/// REPL should treat `input` as a bare expression.
fn definition_binder_names(input: &str) -> Option<Vec<String>> {
    let parsed = hsc_parser::parse(input);
    if !parsed.errors.is_empty() {
        return None;
    }
    let file = parsed.source_file()?;
    let mut names = Vec::new();
    let mut saw_binding = false;
    for decl in file.decls() {
        use hsc_parser::ast::item::Decl;
        match decl {
            Decl::FunBind(fb) => {
                saw_binding = true;
                names.push(fb.name()?.text()?);
            }
            Decl::PatBind(pb) => {
                saw_binding = true;
                collect_pattern_var_names(&pb.pattern()?, &mut names);
            }
            Decl::TypeSig(_) => continue,
            _ => return None,
        }
    }
    saw_binding.then_some(names)
}

fn collect_pattern_var_names(pat: &hsc_parser::ast::pat::Pattern, out: &mut Vec<String>) {
    use hsc_parser::ast::pat::Pattern;
    match pat {
        Pattern::Var(v) => {
            if let Some(t) = v.name() {
                out.push(t.text().to_string());
            }
        }
        Pattern::Tuple(t) => {
            for p in t.elements() {
                collect_pattern_var_names(&p, out);
            }
        }
        Pattern::List(l) => {
            for p in l.elements() {
                collect_pattern_var_names(&p, out);
            }
        }
        Pattern::As(a) => {
            if let Some(t) = a.name() {
                out.push(t.text().to_string());
            }
            if let Some(inner) = a.inner() {
                collect_pattern_var_names(&inner, out);
            }
        }
        Pattern::Lazy(p) => {
            if let Some(inner) = p.inner() {
                collect_pattern_var_names(&inner, out);
            }
        }
        Pattern::Bang(p) => {
            if let Some(inner) = p.inner() {
                collect_pattern_var_names(&inner, out);
            }
        }
        Pattern::Paren(p) => {
            if let Some(inner) = p.inner() {
                collect_pattern_var_names(&inner, out);
            }
        }
        Pattern::Con(c) => {
            for p in c.args() {
                collect_pattern_var_names(&p, out);
            }
        }
        Pattern::InfixCon(c) => {
            if let Some(l) = c.left() {
                collect_pattern_var_names(&l, out);
            }
            if let Some(r) = c.right() {
                collect_pattern_var_names(&r, out);
            }
        }
        Pattern::Wildcard(_) | Pattern::Lit(_) | Pattern::Record(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_detects_function_binding() {
        assert_eq!(
            definition_binder_names("double x = x + x"),
            Some(vec!["double".to_string()])
        );
    }

    #[test]
    fn definition_returns_none_for_bare_expression() {
        assert_eq!(definition_binder_names("1 + 2"), None);
    }
}
