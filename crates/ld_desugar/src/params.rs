//! Parameter decorators on methods and constructors.
//!
//! Method parameters: `dec(_class.prototype, "method", index)`, result discarded.
//! Constructor parameters: `_class = dec(_class, undefined, index) || _class`,
//! so a constructor parameter decorator may replace the class.
//!
//! Decorators on one parameter are applied last-declared first. Methods and
//! parameter positions keep source order, and constructor calls follow all
//! method calls.

use swc_ecma_ast as ast;

use crate::{
    construct::Layer, context::RewriteCx, error::DecoratorError, members::property_key,
    templates,
};

pub(crate) fn apply_parameter_decorators(
    class: &mut ast::Class,
    cx: &mut RewriteCx,
) -> Result<Option<Layer>, DecoratorError> {
    if !has_parameter_decorators(class) {
        return Ok(None);
    }

    let binding = cx.declare("class");
    let mut method_calls = Vec::new();
    let mut constructor_calls = Vec::new();

    for member in class.body.iter_mut() {
        match member {
            ast::ClassMember::Method(method) => {
                if !method.function.params.iter().any(|p| !p.decorators.is_empty()) {
                    continue;
                }
                let name = property_key(&method.key, method.span)?;
                for (index, param) in method.function.params.iter_mut().enumerate() {
                    for decorator in take_reversed(&mut param.decorators) {
                        method_calls.push(templates::method_parameter_decorator(
                            decorator,
                            &binding,
                            name.clone(),
                            index,
                        ));
                    }
                }
            }
            ast::ClassMember::Constructor(ctor) => {
                if !constructor_calls.is_empty() {
                    continue;
                }
                for (index, param) in ctor.params.iter_mut().enumerate() {
                    let decorators = match param {
                        ast::ParamOrTsParamProp::Param(param) => &mut param.decorators,
                        ast::ParamOrTsParamProp::TsParamProp(prop) => &mut prop.decorators,
                    };
                    for decorator in take_reversed(decorators) {
                        constructor_calls.push(templates::constructor_parameter_decorator(
                            decorator, &binding, index,
                        ));
                    }
                }
            }
            ast::ClassMember::PrivateMethod(method) => {
                if method.function.params.iter().any(|p| !p.decorators.is_empty()) {
                    return Err(DecoratorError::UnsupportedMember {
                        span: method.span,
                        kind: "parameters of private methods",
                    });
                }
            }
            _ => {}
        }
    }

    let mut effects = method_calls;
    effects.extend(constructor_calls);

    tracing::debug!(binding = %binding.sym, count = effects.len(), "applied parameter decorators");
    Ok(Some(Layer::Sequence { binding, effects }))
}

pub(crate) fn has_parameter_decorators(class: &ast::Class) -> bool {
    class.body.iter().any(|member| match member {
        ast::ClassMember::Method(method) => {
            method.function.params.iter().any(|p| !p.decorators.is_empty())
        }
        ast::ClassMember::PrivateMethod(method) => {
            method.function.params.iter().any(|p| !p.decorators.is_empty())
        }
        ast::ClassMember::Constructor(ctor) => ctor.params.iter().any(|p| match p {
            ast::ParamOrTsParamProp::Param(param) => !param.decorators.is_empty(),
            ast::ParamOrTsParamProp::TsParamProp(prop) => !prop.decorators.is_empty(),
        }),
        _ => false,
    })
}

fn take_reversed(decorators: &mut Vec<ast::Decorator>) -> Vec<Box<ast::Expr>> {
    decorators.drain(..).rev().map(|decorator| decorator.expr).collect()
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{assert_contains, desugar, position};

    const SOURCE: &str = "class C {\n  constructor(@x first, @y @z second) {}\n  m(@a @b p, @c q) {}\n}";

    #[test]
    fn method_parameters_are_registered_against_the_prototype() {
        let out = desugar(SOURCE);
        assert_contains(
            &out,
            "b(_class.prototype, \"m\", 0), a(_class.prototype, \"m\", 0), c(_class.prototype, \"m\", 1)",
        );
    }

    #[test]
    fn constructor_parameters_may_replace_the_class() {
        let out = desugar(SOURCE);
        assert_contains(
            &out,
            "_class = x(_class, undefined, 0) || _class, \
             _class = z(_class, undefined, 1) || _class, \
             _class = y(_class, undefined, 1) || _class, _class);",
        );
    }

    #[test]
    fn method_calls_come_before_constructor_calls() {
        let out = desugar(SOURCE);
        assert!(position(&out, "c(_class.prototype") < position(&out, "x(_class, undefined, 0)"));
        assert_contains(&out, "class C { constructor(first, second) {} m(p, q) {} }");
    }

    #[test]
    fn parameter_properties_are_decorated_too() {
        let out = desugar("class Greeter { constructor(@Inject(Sentinel) private sentinel) {} }");
        assert_contains(&out, "_dec = Inject(Sentinel)");
        assert_contains(&out, "_class = _dec(_class, undefined, 0) || _class");
    }

    #[test]
    fn member_decorators_wrap_parameter_decorators() {
        let out = desugar("class C { @validate greet(@required name) {} }");
        assert_contains(
            &out,
            "let C = (_class = (_class2 = class C { greet(name) {} }, \
             required(_class2.prototype, \"greet\", 0), _class2), \
             _applyDecoratedDescriptor(_class.prototype, \"greet\", [validate]",
        );
    }
}
