//! REPL session state: accumulated top-level definitions and a counter
//! for naming one-off expression evaluations.
//!
//! Grounded on `snow-repl::session::ReplSession`: the same "join prior
//! definitions, wrap the new input, name it uniquely" shape, with the
//! JIT-execution bookkeeping (`results: Vec<(value_repr, type_name)>`)
//! replaced by a plain type-history, since this REPL never evaluates --
//! it only elaborates and reports inferred types (DESIGN.md's note on
//! `hsc-repl` dropping `mesh-repl`'s LLVM JIT step).

/// Persistent state for a REPL session: definitions entered so far plus
/// a monotonic counter for naming ad hoc expression wrappers.
pub struct ReplSession {
    definitions: Vec<String>,
    eval_counter: u64,
    history: Vec<(String, String)>,
}

impl ReplSession {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            eval_counter: 0,
            history: Vec::new(),
        }
    }

    /// Store a top-level declaration so later inputs can reference it.
    pub fn add_definition(&mut self, source: &str) {
        self.definitions.push(source.to_string());
    }

    /// All accumulated definitions, concatenated as one module body.
    pub fn definitions_source(&self) -> String {
        self.definitions.join("\n")
    }

    /// Wrap a bare expression as `__repl_eval_N = <expr>`, appended after
    /// all prior definitions, so it can be elaborated in context without
    /// polluting the persistent definition list. Returns `(full_source,
    /// binder_name)`.
    pub fn wrap_expression(&mut self, expr: &str) -> (String, String) {
        let name = format!("__repl_eval_{}", self.eval_counter);
        self.eval_counter += 1;
        let mut source = self.definitions_source();
        source.push('\n');
        source.push_str(&format!("{name} = {expr}\n"));
        (source, name)
    }

    /// Record a binder name and its printed inferred type.
    pub fn record_result(&mut self, name: String, ty: String) {
        self.history.push((name, ty));
    }

    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    pub fn eval_counter(&self) -> u64 {
        self.eval_counter
    }

    pub fn reset(&mut self) {
        self.definitions.clear();
        self.eval_counter = 0;
        self.history.clear();
    }
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let session = ReplSession::new();
        assert!(session.definitions_source().is_empty());
        assert_eq!(session.eval_counter(), 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn add_definition_accumulates() {
        let mut session = ReplSession::new();
        session.add_definition("x = 1");
        session.add_definition("y = 2");
        assert_eq!(session.definitions_source(), "x = 1\ny = 2");
    }

    #[test]
    fn wrap_expression_names_uniquely_and_includes_definitions() {
        let mut session = ReplSession::new();
        session.add_definition("double x = x + x");
        let (src1, name1) = session.wrap_expression("double 5");
        let (src2, name2) = session.wrap_expression("double 6");
        assert_eq!(name1, "__repl_eval_0");
        assert_eq!(name2, "__repl_eval_1");
        assert!(src1.contains("double x = x + x"));
        assert!(src1.contains("__repl_eval_0 = double 5"));
        assert!(src2.contains("__repl_eval_1 = double 6"));
    }

    #[test]
    fn record_and_reset() {
        let mut session = ReplSession::new();
        session.record_result("it".into(), "Int".into());
        assert_eq!(session.history().len(), 1);
        session.reset();
        assert!(session.history().is_empty());
    }
}
