//! Fresh binding names for synthesized variables.

use std::collections::{HashMap, HashSet};

use swc_common::DUMMY_SP;
use swc_ecma_ast as ast;
use swc_ecma_visit::{Visit, VisitWith};

/// Hands out identifiers that collide with nothing in the input.
///
/// Names follow the `_hint`, `_hint2`, `_hint3`, ... scheme. The set of taken
/// names is a snapshot of every identifier seen in the input plus every name
/// handed out so far.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
    next_suffix: HashMap<String, u32>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve every identifier that appears anywhere in `node`.
    pub fn reserve_all<N>(&mut self, node: &N)
    where
        N: VisitWith<IdentCollector>,
    {
        let mut collector = IdentCollector::default();
        node.visit_with(&mut collector);
        self.taken.extend(collector.names);
    }

    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Allocate a new identifier derived from `hint`.
    pub fn fresh(&mut self, hint: &str) -> ast::Ident {
        let base = format!("_{hint}");
        let suffix = self.next_suffix.entry(base.clone()).or_insert(1);
        loop {
            let candidate = if *suffix <= 1 {
                base.clone()
            } else {
                format!("{base}{suffix}")
            };
            *suffix += 1;
            if self.taken.insert(candidate.clone()) {
                tracing::trace!(name = %candidate, "allocated binding");
                return ast::Ident::new_no_ctxt(candidate.into(), DUMMY_SP);
            }
        }
    }
}

/// Collects the names of all identifiers in a tree.
#[derive(Default)]
pub struct IdentCollector {
    names: HashSet<String>,
}

impl Visit for IdentCollector {
    fn visit_ident(&mut self, ident: &ast::Ident) {
        self.names.insert(ident.sym.to_string());
    }
}
