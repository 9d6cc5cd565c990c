//! Runtime helpers referenced by the desugared output.
//!
//! The helper implementations are not part of this crate. The output either
//! refers to them as free identifiers or imports them from a configured module.

use std::collections::BTreeSet;

use ld_ast::HelperSource;
use swc_common::DUMMY_SP;
use swc_ecma_ast as ast;

use crate::templates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Helper {
    /// `applyDecoratedDescriptor(target, property, decorators, descriptor, context?)`
    ApplyDecoratedDescriptor,
    /// `initializerDefineProperty(target, property, descriptor, context)`
    InitializerDefineProperty,
    /// `initializerWarningHelper(descriptor, context)`
    InitializerWarningHelper,
    /// `defineProperty(target, property, value)`
    DefineProperty,
}

impl Helper {
    /// The helper's exported name.
    pub fn name(self) -> &'static str {
        match self {
            Helper::ApplyDecoratedDescriptor => "applyDecoratedDescriptor",
            Helper::InitializerDefineProperty => "initializerDefineProperty",
            Helper::InitializerWarningHelper => "initializerWarningHelper",
            Helper::DefineProperty => "defineProperty",
        }
    }

    /// The identifier the output uses to refer to the helper.
    pub fn local_name(self) -> String {
        format!("_{}", self.name())
    }
}

/// Records which helpers a pass emitted references to.
#[derive(Debug, Default)]
pub struct HelperUsage {
    used: BTreeSet<Helper>,
}

impl HelperUsage {
    /// Mark `helper` as used and return a reference to it.
    pub fn reference(&mut self, helper: Helper) -> Box<ast::Expr> {
        self.used.insert(helper);
        templates::named(&helper.local_name())
    }

    /// Forget a helper whose every reference was rewritten away.
    pub fn release(&mut self, helper: Helper) {
        self.used.remove(&helper);
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// The import declaration that brings every used helper into scope, if
    /// helpers come from a module.
    pub fn import_decl(&self, source: &HelperSource) -> Option<ast::ModuleItem> {
        let HelperSource::Module(specifier) = source else {
            return None;
        };
        if self.used.is_empty() {
            return None;
        }

        let specifiers = self
            .used
            .iter()
            .map(|helper| {
                ast::ImportSpecifier::Named(ast::ImportNamedSpecifier {
                    span: DUMMY_SP,
                    local: ast::Ident::new_no_ctxt(helper.local_name().into(), DUMMY_SP),
                    imported: Some(ast::ModuleExportName::Ident(ast::Ident::new_no_ctxt(
                        helper.name().into(),
                        DUMMY_SP,
                    ))),
                    is_type_only: false,
                })
            })
            .collect();

        Some(ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(ast::ImportDecl {
            span: DUMMY_SP,
            specifiers,
            src: Box::new(ast::Str {
                span: DUMMY_SP,
                value: specifier.as_str().into(),
                raw: None,
            }),
            type_only: false,
            with: None,
            phase: Default::default(),
        })))
    }
}
