//! Finishing decorated fields after a class-properties transform.
//!
//! With deferred field initializers, a decorated instance field `x` is left as
//! `x = _initializerWarningHelper(_descriptor, this)` and the call is tagged
//! with the run's [`InitializerMarker`]. A class-properties transform later
//! turns the field into either
//!
//! - `this.x = <marked call>`, or
//! - `_defineProperty(this, "x", <marked call>)`.
//!
//! [`InitializerRewriter`] recognises both shapes and rewrites them to
//! `_initializerDefineProperty(this, "x", _descriptor, this)`.
//!
//! A field still carrying the placeholder (no class-properties transform ran)
//! becomes a private slot whose initializer does the install, so the property
//! is defined at the field's position in the initialization order:
//! `#_descriptor = _initializerDefineProperty(this, "x", _descriptor, this)`.

use std::collections::HashSet;

use ld_ast::HelperSource;
use swc_common::{Mark, SyntaxContext};
use swc_ecma_ast as ast;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::{
    helpers::{Helper, HelperUsage},
    members::property_key,
    templates,
};

/// Tag carried in the `SyntaxContext` of generated placeholder calls.
///
/// Creating a marker requires SWC's `GLOBALS` to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializerMarker(Mark);

impl InitializerMarker {
    pub fn new() -> Self {
        Self(Mark::new())
    }

    pub(crate) fn ctxt(self) -> SyntaxContext {
        SyntaxContext::empty().apply_mark(self.0)
    }

    pub fn is_marked(self, call: &ast::CallExpr) -> bool {
        call.ctxt.outer() == self.0
    }
}

impl Default for InitializerMarker {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites assignments and `defineProperty` calls whose value is a marked
/// placeholder into `initializerDefineProperty` calls.
pub struct InitializerRewriter {
    marker: InitializerMarker,
    helper_source: HelperSource,
    helpers: HelperUsage,
}

impl InitializerRewriter {
    pub fn new(marker: InitializerMarker, helper_source: HelperSource) -> Self {
        Self {
            marker,
            helper_source,
            helpers: HelperUsage::default(),
        }
    }

    /// Continue recording helper references into `helpers`; no import is
    /// inserted, the owner of `helpers` emits it.
    pub(crate) fn with_usage(marker: InitializerMarker, helpers: HelperUsage) -> Self {
        Self {
            marker,
            helper_source: HelperSource::Global,
            helpers,
        }
    }

    pub(crate) fn into_usage(self) -> HelperUsage {
        self.helpers
    }

    /// `x = MARKED(descriptor, context)` as an instance field.
    fn install_field(
        &mut self,
        prop: &ast::ClassProp,
        taken: &mut HashSet<String>,
    ) -> Option<ast::ClassMember> {
        if prop.is_static {
            return None;
        }
        let placeholder = self.marked_call(prop.value.as_deref()?)?;
        let property = property_key(&prop.key, prop.span).ok()?;
        let (descriptor, context) = placeholder_args(placeholder)?;

        let slot = private_slot(&descriptor, taken);
        let install = self.define(templates::this(), property, descriptor, context);
        Some(templates::private_field(&slot, install, prop.span))
    }

    /// `obj.prop = MARKED(descriptor, context)`
    fn rewrite_assignment(&mut self, assign: &ast::AssignExpr) -> Option<Box<ast::Expr>> {
        if assign.op != ast::AssignOp::Assign {
            return None;
        }
        let placeholder = self.marked_call(&assign.right)?;
        let ast::AssignTarget::Simple(ast::SimpleAssignTarget::Member(member)) = &assign.left else {
            return None;
        };
        let property = member_property_name(&member.prop)?;
        let (descriptor, context) = placeholder_args(placeholder)?;

        Some(self.define(member.obj.clone(), property, descriptor, context))
    }

    /// `defineProperty(obj, key, MARKED(descriptor, context))`
    fn rewrite_define_property(&mut self, call: &ast::CallExpr) -> Option<Box<ast::Expr>> {
        let [target, property, value] = call.args.as_slice() else {
            return None;
        };
        let placeholder = self.marked_call(&value.expr)?;

        let ast::Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let ast::Expr::Ident(callee) = &**callee else {
            return None;
        };
        if &*callee.sym != Helper::DefineProperty.local_name().as_str() {
            return None;
        }
        let (descriptor, context) = placeholder_args(placeholder)?;

        Some(self.define(
            target.expr.clone(),
            property.expr.clone(),
            descriptor,
            context,
        ))
    }

    fn marked_call<'a>(&self, expr: &'a ast::Expr) -> Option<&'a ast::CallExpr> {
        match expr {
            ast::Expr::Call(call) if self.marker.is_marked(call) => Some(call),
            _ => None,
        }
    }

    fn define(
        &mut self,
        target: Box<ast::Expr>,
        property: Box<ast::Expr>,
        descriptor: Box<ast::Expr>,
        context: Box<ast::Expr>,
    ) -> Box<ast::Expr> {
        tracing::debug!("rewrote deferred field initializer");
        templates::call(
            self.helpers.reference(Helper::InitializerDefineProperty),
            vec![target, property, descriptor, context],
        )
    }
}

fn placeholder_args(call: &ast::CallExpr) -> Option<(Box<ast::Expr>, Box<ast::Expr>)> {
    match call.args.as_slice() {
        [descriptor, context, ..] => Some((descriptor.expr.clone(), context.expr.clone())),
        _ => None,
    }
}

/// A private name for the install slot, derived from the descriptor binding and
/// distinct from every private name in the class.
fn private_slot(descriptor: &ast::Expr, taken: &mut HashSet<String>) -> String {
    let base = match descriptor {
        ast::Expr::Ident(ident) => ident.sym.to_string(),
        _ => "_init".to_string(),
    };
    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}{suffix}");
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

fn private_names(class: &ast::Class) -> HashSet<String> {
    class
        .body
        .iter()
        .filter_map(|member| match member {
            ast::ClassMember::PrivateProp(prop) => Some(prop.key.name.to_string()),
            ast::ClassMember::PrivateMethod(method) => Some(method.key.name.to_string()),
            ast::ClassMember::AutoAccessor(ast::AutoAccessor {
                key: ast::Key::Private(name),
                ..
            }) => Some(name.name.to_string()),
            _ => None,
        })
        .collect()
}

/// The property name of `obj.name`, `obj["name"]` or `obj[0]` as a string literal.
fn member_property_name(prop: &ast::MemberProp) -> Option<Box<ast::Expr>> {
    match prop {
        ast::MemberProp::Ident(ident) => Some(templates::str_lit(&ident.sym)),
        ast::MemberProp::Computed(computed) => match &*computed.expr {
            ast::Expr::Lit(ast::Lit::Str(s)) => Some(Box::new(ast::Expr::Lit(ast::Lit::Str(
                ast::Str {
                    raw: None,
                    ..s.clone()
                },
            )))),
            ast::Expr::Lit(ast::Lit::Num(n)) => Some(templates::str_lit(&n.value.to_string())),
            _ => None,
        },
        ast::MemberProp::PrivateName(_) => None,
    }
}

impl VisitMut for InitializerRewriter {
    fn visit_mut_module(&mut self, module: &mut ast::Module) {
        module.visit_mut_children_with(self);

        if let Some(import) = self.helpers.import_decl(&self.helper_source) {
            module.body.insert(0, import);
        }
    }

    fn visit_mut_class(&mut self, class: &mut ast::Class) {
        class.visit_mut_children_with(self);

        let mut taken = private_names(class);
        for member in class.body.iter_mut() {
            let ast::ClassMember::ClassProp(prop) = member else {
                continue;
            };
            if let Some(installed) = self.install_field(prop, &mut taken) {
                *member = installed;
            }
        }
    }

    fn visit_mut_expr(&mut self, expr: &mut ast::Expr) {
        expr.visit_mut_children_with(self);

        let replacement = match expr {
            ast::Expr::Assign(assign) => self.rewrite_assignment(assign),
            ast::Expr::Call(call) => self.rewrite_define_property(call),
            _ => None,
        };
        if let Some(replacement) = replacement {
            *expr = *replacement;
        }
    }
}

/// Run the marker rewrite over a module.
pub fn rewrite_marked_initializers(
    mut module: ast::Module,
    marker: InitializerMarker,
    helper_source: &HelperSource,
) -> ast::Module {
    module.visit_mut_with(&mut InitializerRewriter::new(marker, helper_source.clone()));
    module
}
