//! Decorators on methods, accessors, fields and object literal properties.
//!
//! Every decorated member becomes one `applyDecoratedDescriptor` call against
//! its target (the class, its prototype, or the object), all joined into
//! `(_class = CONSTRUCT, call1, call2, _class)`.

use ld_ast::DecoratedProp;
use swc_common::{Span, Spanned};
use swc_ecma_ast as ast;

use crate::{
    construct::{Construct, Layer},
    context::RewriteCx,
    error::DecoratorError,
    helpers::Helper,
    templates,
};

pub(crate) fn apply_member_decorators(
    construct: &mut Construct,
    cx: &mut RewriteCx,
) -> Result<Option<Layer>, DecoratorError> {
    if !has_member_decorators(construct) {
        return Ok(None);
    }

    let binding = cx.declare(if construct.is_class() { "class" } else { "obj" });
    let mut effects = Vec::new();

    match construct {
        Construct::Class(class) => {
            for member in class.class.body.iter_mut() {
                if let Some(effect) = decorate_class_member(member, &binding, cx)? {
                    effects.push(effect);
                }
            }
        }
        Construct::Object(object) => {
            for prop in object.props.iter_mut() {
                if let Some(effect) = decorate_object_prop(prop, &binding, cx)? {
                    effects.push(effect);
                }
            }
        }
    }

    tracing::debug!(binding = %binding.sym, count = effects.len(), "applied member decorators");
    Ok(Some(Layer::Sequence { binding, effects }))
}

fn has_member_decorators(construct: &Construct) -> bool {
    match construct {
        Construct::Class(class) => class.class.body.iter().any(member_has_decorators),
        Construct::Object(object) => object.has_decorators(),
    }
}

pub(crate) fn member_has_decorators(member: &ast::ClassMember) -> bool {
    match member {
        ast::ClassMember::Method(method) => !method.function.decorators.is_empty(),
        ast::ClassMember::PrivateMethod(method) => !method.function.decorators.is_empty(),
        ast::ClassMember::ClassProp(prop) => !prop.decorators.is_empty(),
        ast::ClassMember::PrivateProp(prop) => !prop.decorators.is_empty(),
        ast::ClassMember::AutoAccessor(accessor) => !accessor.decorators.is_empty(),
        ast::ClassMember::Constructor(_)
        | ast::ClassMember::TsIndexSignature(_)
        | ast::ClassMember::Empty(_)
        | ast::ClassMember::StaticBlock(_) => false,
    }
}

fn decorate_class_member(
    member: &mut ast::ClassMember,
    binding: &ast::Ident,
    cx: &mut RewriteCx,
) -> Result<Option<Box<ast::Expr>>, DecoratorError> {
    match member {
        ast::ClassMember::Method(method) => {
            let decorators = take_decorators(&mut method.function.decorators);
            if decorators.is_empty() {
                return Ok(None);
            }
            let property = property_key(&method.key, method.span)?;
            let target = class_target(binding, method.is_static);
            Ok(Some(apply_descriptor(
                cx,
                target.clone(),
                property.clone(),
                decorators,
                templates::get_descriptor(target, property),
            )))
        }
        ast::ClassMember::ClassProp(prop) => {
            let decorators = take_decorators(&mut prop.decorators);
            if decorators.is_empty() {
                return Ok(None);
            }
            let property = property_key(&prop.key, prop.span)?;
            let target = class_target(binding, prop.is_static);

            if prop.is_static {
                let temp = cx.declare("init");
                return Ok(Some(apply_descriptor(
                    cx,
                    target.clone(),
                    property.clone(),
                    decorators,
                    templates::object_initializer_descriptor(&temp, target, property),
                )));
            }

            let descriptor = cx.declare("descriptor");
            let initializer = match prop.value.take() {
                Some(value) => templates::thunk(value),
                None => templates::null_lit(),
            };
            prop.value = Some(deferred_initializer(&descriptor, cx));

            let apply = templates::call(
                cx.helper(Helper::ApplyDecoratedDescriptor),
                vec![
                    target,
                    property,
                    templates::array(decorators),
                    templates::field_descriptor(initializer),
                ],
            );
            Ok(Some(templates::assign(&descriptor, apply)))
        }
        ast::ClassMember::PrivateMethod(method) => {
            unsupported(&method.function.decorators, method.span, "private methods")
        }
        ast::ClassMember::PrivateProp(prop) => {
            unsupported(&prop.decorators, prop.span, "private fields")
        }
        ast::ClassMember::AutoAccessor(accessor) => {
            unsupported(&accessor.decorators, accessor.span, "auto-accessors")
        }
        ast::ClassMember::Constructor(_)
        | ast::ClassMember::TsIndexSignature(_)
        | ast::ClassMember::Empty(_)
        | ast::ClassMember::StaticBlock(_) => Ok(None),
    }
}

fn decorate_object_prop(
    prop: &mut DecoratedProp,
    binding: &ast::Ident,
    cx: &mut RewriteCx,
) -> Result<Option<Box<ast::Expr>>, DecoratorError> {
    let decorators = take_decorators(&mut prop.decorators);
    if decorators.is_empty() {
        return Ok(None);
    }
    let span = prop.span();

    let (property, is_value) = match &prop.prop {
        ast::PropOrSpread::Spread(_) => {
            return Err(DecoratorError::UnsupportedMember {
                span,
                kind: "spread elements",
            })
        }
        ast::PropOrSpread::Prop(p) => match &**p {
            ast::Prop::KeyValue(kv) => (property_key(&kv.key, span)?, true),
            ast::Prop::Shorthand(ident) => (templates::str_lit(&ident.sym), true),
            ast::Prop::Method(method) => (property_key(&method.key, span)?, false),
            ast::Prop::Getter(getter) => (property_key(&getter.key, span)?, false),
            ast::Prop::Setter(setter) => (property_key(&setter.key, span)?, false),
            ast::Prop::Assign(_) => {
                return Err(DecoratorError::UnsupportedMember {
                    span,
                    kind: "assignment properties",
                })
            }
        },
    };

    let target = templates::ident(binding);
    let descriptor = if is_value {
        let temp = cx.declare("init");
        templates::object_initializer_descriptor(&temp, target.clone(), property.clone())
    } else {
        templates::get_descriptor(target.clone(), property.clone())
    };
    Ok(Some(apply_descriptor(
        cx,
        target,
        property,
        decorators,
        descriptor,
    )))
}

/// `applyDecoratedDescriptor(TARGET, PROPERTY, [decorators], DESCRIPTOR, TARGET)`
fn apply_descriptor(
    cx: &mut RewriteCx,
    target: Box<ast::Expr>,
    property: Box<ast::Expr>,
    decorators: Vec<Box<ast::Expr>>,
    descriptor: Box<ast::Expr>,
) -> Box<ast::Expr> {
    templates::call(
        cx.helper(Helper::ApplyDecoratedDescriptor),
        vec![
            target.clone(),
            property,
            templates::array(decorators),
            descriptor,
            target,
        ],
    )
}

/// `initializerWarningHelper(_descriptor, this)`, tagged for the marker rewriter.
/// The rewriter later swaps it for the `initializerDefineProperty` install.
fn deferred_initializer(descriptor: &ast::Ident, cx: &mut RewriteCx) -> Box<ast::Expr> {
    let callee = cx.helper(Helper::InitializerWarningHelper);
    Box::new(ast::Expr::Call(templates::call_expr(
        callee,
        vec![templates::ident(descriptor), templates::this()],
        cx.marker.ctxt(),
    )))
}

fn class_target(binding: &ast::Ident, is_static: bool) -> Box<ast::Expr> {
    if is_static {
        templates::ident(binding)
    } else {
        templates::class_prototype(binding)
    }
}

fn take_decorators(decorators: &mut Vec<ast::Decorator>) -> Vec<Box<ast::Expr>> {
    decorators.drain(..).map(|decorator| decorator.expr).collect()
}

fn unsupported(
    decorators: &[ast::Decorator],
    span: Span,
    kind: &'static str,
) -> Result<Option<Box<ast::Expr>>, DecoratorError> {
    if decorators.is_empty() {
        Ok(None)
    } else {
        Err(DecoratorError::UnsupportedMember { span, kind })
    }
}

/// The property key as a literal: literal keys are kept as written, identifier
/// keys become string literals. Computed keys are rejected.
pub(crate) fn property_key(key: &ast::PropName, span: Span) -> Result<Box<ast::Expr>, DecoratorError> {
    let lit = match key {
        ast::PropName::Ident(ident) => return Ok(templates::str_lit(&ident.sym)),
        ast::PropName::Str(s) => ast::Lit::Str(s.clone()),
        ast::PropName::Num(n) => ast::Lit::Num(n.clone()),
        ast::PropName::BigInt(b) => ast::Lit::BigInt(b.clone()),
        ast::PropName::Computed(_) => return Err(DecoratorError::ComputedKey { span }),
    };
    Ok(Box::new(ast::Expr::Lit(lit)))
}
