//! Class-level decorators.
//!
//! `@a @b class C {}` becomes `a(_class = b(_class = class C {}) || _class) || _class`:
//! the last declared decorator is applied first, and any truthy return value
//! replaces the class for the decorators applied after it.

use swc_ecma_ast as ast;

use crate::{construct::Layer, context::RewriteCx};

pub(crate) fn apply_class_decorators(class: &mut ast::Class, cx: &mut RewriteCx) -> Option<Layer> {
    if class.decorators.is_empty() {
        return None;
    }

    let decorators: Vec<Box<ast::Expr>> = class
        .decorators
        .drain(..)
        .map(|decorator| decorator.expr)
        .rev()
        .collect();
    let class_ref = cx.declare("class");

    tracing::debug!(binding = %class_ref.sym, count = decorators.len(), "applied class decorators");
    Some(Layer::Decorate {
        class_ref,
        decorators,
    })
}

pub(crate) fn has_class_decorators(class: &ast::Class) -> bool {
    !class.decorators.is_empty()
}
