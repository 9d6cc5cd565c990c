//! Evaluation ordering for decorator expressions.
//!
//! Decorator expressions that are not bare identifiers are hoisted into fresh
//! bindings, assigned in source order before the construct is evaluated. The
//! later passes may then apply decorators in whatever order they need without
//! re-running any expression.

use swc_ecma_ast as ast;

use crate::{
    construct::{Construct, Layer},
    context::RewriteCx,
    templates,
};

/// Hoist every non-identifier decorator of `construct`, its members and their
/// parameters. Returns `None` when all decorators are already identifiers.
pub(crate) fn ensure_ordering(construct: &mut Construct, cx: &mut RewriteCx) -> Option<Layer> {
    let mut assignments = Vec::new();

    for decorator in decorators_in_source_order(construct) {
        if matches!(*decorator.expr, ast::Expr::Ident(_)) {
            continue;
        }
        let id = cx.declare("dec");
        let expr = std::mem::replace(&mut decorator.expr, templates::ident(&id));
        assignments.push(templates::assign(&id, expr));
    }

    if assignments.is_empty() {
        return None;
    }
    tracing::debug!(count = assignments.len(), "hoisted decorator expressions");
    Some(Layer::Hoist(assignments))
}

/// Class decorators first, then each member's own decorators followed by its
/// parameters' decorators.
fn decorators_in_source_order(construct: &mut Construct) -> Vec<&mut ast::Decorator> {
    let mut out = Vec::new();
    match construct {
        Construct::Class(class) => {
            let class = &mut *class.class;
            out.extend(class.decorators.iter_mut());
            for member in class.body.iter_mut() {
                member_decorators(member, &mut out);
            }
        }
        Construct::Object(object) => {
            for prop in object.props.iter_mut() {
                out.extend(prop.decorators.iter_mut());
            }
        }
    }
    out
}

fn member_decorators<'a>(member: &'a mut ast::ClassMember, out: &mut Vec<&'a mut ast::Decorator>) {
    match member {
        ast::ClassMember::Constructor(ctor) => {
            for param in ctor.params.iter_mut() {
                match param {
                    ast::ParamOrTsParamProp::Param(param) => out.extend(param.decorators.iter_mut()),
                    ast::ParamOrTsParamProp::TsParamProp(prop) => {
                        out.extend(prop.decorators.iter_mut())
                    }
                }
            }
        }
        ast::ClassMember::Method(method) => function_decorators(&mut method.function, out),
        ast::ClassMember::PrivateMethod(method) => function_decorators(&mut method.function, out),
        ast::ClassMember::ClassProp(prop) => out.extend(prop.decorators.iter_mut()),
        ast::ClassMember::PrivateProp(prop) => out.extend(prop.decorators.iter_mut()),
        ast::ClassMember::AutoAccessor(accessor) => out.extend(accessor.decorators.iter_mut()),
        ast::ClassMember::TsIndexSignature(_)
        | ast::ClassMember::Empty(_)
        | ast::ClassMember::StaticBlock(_) => {}
    }
}

fn function_decorators<'a>(function: &'a mut ast::Function, out: &mut Vec<&'a mut ast::Decorator>) {
    out.extend(function.decorators.iter_mut());
    for param in function.params.iter_mut() {
        out.extend(param.decorators.iter_mut());
    }
}
