//! State shared by the sub-passes while one construct is rewritten.

use ld_ast::DecoratorConfig;
use swc_ecma_ast as ast;

use crate::{
    helpers::{Helper, HelperUsage},
    initializer::InitializerMarker,
    names::NameAllocator,
};

pub(crate) struct RewriteCx {
    pub config: DecoratorConfig,
    pub names: NameAllocator,
    pub helpers: HelperUsage,
    pub marker: InitializerMarker,
    /// Bindings to declare with `var`, one entry per open function scope.
    /// The first entry is the module/script scope and is never popped.
    scopes: Vec<Vec<ast::Ident>>,
}

impl RewriteCx {
    pub fn new(config: DecoratorConfig, marker: InitializerMarker) -> Self {
        Self {
            config,
            names: NameAllocator::new(),
            helpers: HelperUsage::default(),
            marker,
            scopes: vec![vec![]],
        }
    }

    /// Allocate a fresh binding and declare it in the innermost scope.
    pub fn declare(&mut self, hint: &str) -> ast::Ident {
        let id = self.names.fresh(hint);
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(id.clone());
        }
        id
    }

    pub fn helper(&mut self, helper: Helper) -> Box<ast::Expr> {
        self.helpers.reference(helper)
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(vec![]);
    }

    /// Close the innermost scope and return the bindings declared in it.
    pub fn exit_scope(&mut self) -> Vec<ast::Ident> {
        if self.scopes.len() > 1 {
            self.scopes.pop().unwrap_or_default()
        } else {
            self.scopes.last_mut().map(std::mem::take).unwrap_or_default()
        }
    }
}
