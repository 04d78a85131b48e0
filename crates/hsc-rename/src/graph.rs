//! Declaration dependency graph and the Tarjan SCC pass that partitions
//! value declarations into binding groups (§4.3).

use rustc_hash::{FxHashMap, FxHashSet};

use hsc_parser::ast::item::{Decl, FunBind, PatBind};

use crate::freevars::{defined_names, free_vars_of_decl};

/// One top-level (or `where`/`let`) value declaration, with a multi-clause
/// function already merged into a single unit: the parser emits one
/// `FUN_BIND` node per equation, but `f 0 = ...` / `f n = ...` clauses for
/// the same `f` are one binding as far as dependency analysis is concerned.
#[derive(Debug, Clone)]
pub enum ValueDecl {
    Fun { name: String, clauses: Vec<FunBind> },
    Pat(PatBind),
}

impl ValueDecl {
    pub fn defined_names(&self) -> Vec<String> {
        match self {
            ValueDecl::Fun { name, .. } => vec![name.clone()],
            ValueDecl::Pat(pb) => defined_names(&Decl::PatBind(pb.clone())),
        }
    }

    pub fn free_vars(&self) -> FxHashSet<String> {
        match self {
            ValueDecl::Fun { clauses, .. } => {
                let mut out = FxHashSet::default();
                for clause in clauses {
                    out.extend(free_vars_of_decl(&Decl::FunBind(clause.clone())));
                }
                out
            }
            ValueDecl::Pat(pb) => free_vars_of_decl(&Decl::PatBind(pb.clone())),
        }
    }
}

/// Merge a flat declaration list's `FunBind`/`PatBind` members into
/// [`ValueDecl`]s, folding consecutive same-named function clauses together.
/// Non-value declarations (signatures, fixity, data, class, instance, ...)
/// are dropped -- callers collect those separately before calling this.
pub fn collect_value_decls<'a>(decls: impl Iterator<Item = &'a Decl>) -> Vec<ValueDecl> {
    let mut out: Vec<ValueDecl> = Vec::new();
    for decl in decls {
        match decl {
            Decl::FunBind(fb) => {
                let name = fb.name().and_then(|n| n.text());
                let Some(name) = name else { continue };
                if let Some(ValueDecl::Fun {
                    name: last_name,
                    clauses,
                }) = out.last_mut()
                {
                    if *last_name == name {
                        clauses.push(fb.clone());
                        continue;
                    }
                }
                out.push(ValueDecl::Fun {
                    name,
                    clauses: vec![fb.clone()],
                });
            }
            Decl::PatBind(pb) => out.push(ValueDecl::Pat(pb.clone())),
            _ => {}
        }
    }
    out
}

/// Partition `decls` into binding groups: strongly connected components of
/// the "mentions an unsignatured sibling" graph, emitted in reverse
/// topological order (dependencies before dependents) so the type checker
/// can process the returned groups in order (§4.3, §4.4.8).
///
/// A declaration with an explicit signature in `signatures` can never
/// receive an incoming edge, so it can never be merged into a larger SCC --
/// this is exactly what makes "a single signatured function declaration is
/// checked separately from the rest" fall out of the graph construction
/// rather than needing a special case here.
pub fn group_value_decls(
    decls: Vec<ValueDecl>,
    signatures: &FxHashSet<String>,
) -> Vec<Vec<ValueDecl>> {
    let n = decls.len();

    let mut name_to_index: FxHashMap<String, usize> = FxHashMap::default();
    for (i, d) in decls.iter().enumerate() {
        for name in d.defined_names() {
            name_to_index.insert(name, i);
        }
    }

    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, d) in decls.iter().enumerate() {
        for free in d.free_vars() {
            if signatures.contains(&free) {
                continue;
            }
            if let Some(&j) = name_to_index.get(&free) {
                if j != i {
                    edges[i].push(j);
                }
            }
        }
    }

    let sccs = tarjan_scc(n, &edges);

    let mut decls: Vec<Option<ValueDecl>> = decls.into_iter().map(Some).collect();
    sccs.into_iter()
        .map(|component| {
            component
                .into_iter()
                .map(|i| decls[i].take().expect("each index appears in exactly one SCC"))
                .collect()
        })
        .collect()
}

/// If `group` is exactly one function declaration with a single clause and
/// an explicit signature, return it -- the type checker must use the
/// "check against the signature" algorithm for this group instead of the
/// general let-generalization case (§4.4.8).
pub fn single_signatured_fun<'a>(
    group: &'a [ValueDecl],
    signatures: &FxHashSet<String>,
) -> Option<&'a FunBind> {
    let [ValueDecl::Fun { name, clauses }] = group else {
        return None;
    };
    if clauses.len() == 1 && signatures.contains(name) {
        clauses.first()
    } else {
        None
    }
}

fn tarjan_scc(n: usize, edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    struct State {
        index_counter: usize,
        stack: Vec<usize>,
        indices: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        on_stack: Vec<bool>,
        sccs: Vec<Vec<usize>>,
    }

    fn strongconnect(v: usize, edges: &[Vec<usize>], s: &mut State) {
        s.indices[v] = Some(s.index_counter);
        s.lowlink[v] = s.index_counter;
        s.index_counter += 1;
        s.stack.push(v);
        s.on_stack[v] = true;

        for &w in &edges[v] {
            if s.indices[w].is_none() {
                strongconnect(w, edges, s);
                s.lowlink[v] = s.lowlink[v].min(s.lowlink[w]);
            } else if s.on_stack[w] {
                s.lowlink[v] = s.lowlink[v].min(s.indices[w].unwrap());
            }
        }

        if s.lowlink[v] == s.indices[v].unwrap() {
            let mut component = Vec::new();
            loop {
                let w = s.stack.pop().unwrap();
                s.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            s.sccs.push(component);
        }
    }

    let mut s = State {
        index_counter: 0,
        stack: Vec::new(),
        indices: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        sccs: Vec::new(),
    };

    for v in 0..n {
        if s.indices[v].is_none() {
            strongconnect(v, edges, &mut s);
        }
    }

    s.sccs
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsc_parser::parse;

    fn value_decls(src: &str) -> Vec<ValueDecl> {
        let parsed = parse(src);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let file = parsed.source_file().unwrap();
        collect_value_decls(file.decls().collect::<Vec<_>>().iter())
    }

    #[test]
    fn independent_decls_form_singleton_groups() {
        let decls = value_decls("x = 1\ny = 2\n");
        let groups = group_value_decls(decls, &FxHashSet::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn mutually_recursive_decls_form_one_group() {
        let decls = value_decls("isEven n = if n == 0 then True else isOdd (n - 1)\nisOdd n = if n == 0 then False else isEven (n - 1)\n");
        let groups = group_value_decls(decls, &FxHashSet::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn signature_breaks_the_cycle() {
        let decls = value_decls("f n = g n\ng n = f n\n");
        let mut sigs = FxHashSet::default();
        sigs.insert("g".to_string());
        let groups = group_value_decls(decls, &sigs);
        // `g` can't receive the edge from `f`, so `f` and `g` both end up
        // as their own singleton groups instead of one 2-cycle.
        assert_eq!(groups.len(), 2);
        for group in &groups {
            assert_eq!(group.len(), 1);
        }
    }

    #[test]
    fn multi_clause_function_is_one_value_decl() {
        let decls = value_decls("fact 0 = 1\nfact n = n\n");
        assert_eq!(decls.len(), 1);
        match &decls[0] {
            ValueDecl::Fun { name, clauses } => {
                assert_eq!(name, "fact");
                assert_eq!(clauses.len(), 2);
            }
            other => panic!("expected Fun, got {other:?}"),
        }
    }

    #[test]
    fn groups_come_out_dependency_first() {
        // `top` depends on `helper`; `helper` must appear in an earlier
        // (or equal-index, if merged) group than `top`.
        let decls = value_decls("helper x = x\ntop y = helper y\n");
        let groups = group_value_decls(decls, &FxHashSet::default());
        assert_eq!(groups.len(), 2);
        let helper_group_idx = groups
            .iter()
            .position(|g| g[0].defined_names() == vec!["helper".to_string()])
            .unwrap();
        let top_group_idx = groups
            .iter()
            .position(|g| g[0].defined_names() == vec!["top".to_string()])
            .unwrap();
        assert!(helper_group_idx < top_group_idx);
    }
}
