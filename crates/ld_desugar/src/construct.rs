//! Decoratable constructs and the rewrite layers produced for them.

use ld_ast::DecoratedObjectLit;
use swc_ecma_ast as ast;

use crate::templates;

/// A construct whose decorators the passes consume.
pub enum Construct {
    Class(ast::ClassExpr),
    Object(DecoratedObjectLit),
}

impl Construct {
    pub fn is_class(&self) -> bool {
        matches!(self, Construct::Class(_))
    }

    /// The plain expression for the construct once its decorators are consumed.
    pub fn into_expr(self) -> Box<ast::Expr> {
        match self {
            Construct::Class(class) => Box::new(ast::Expr::Class(class)),
            Construct::Object(object) => Box::new(ast::Expr::Object(object.into_object_lit())),
        }
    }
}

/// One sub-pass's contribution, wrapped around everything produced after it.
#[derive(Debug)]
pub enum Layer {
    /// `(_dec = e1, _dec2 = e2, INNER)`
    Hoist(Vec<Box<ast::Expr>>),
    /// `dN(_class = ... d1(_class = INNER) || _class ...) || _class`,
    /// with `decorators` listed innermost first.
    Decorate {
        class_ref: ast::Ident,
        decorators: Vec<Box<ast::Expr>>,
    },
    /// `(_class = INNER, effect1, effect2, _class)`
    Sequence {
        binding: ast::Ident,
        effects: Vec<Box<ast::Expr>>,
    },
}

impl Layer {
    pub fn wrap(self, inner: Box<ast::Expr>) -> Box<ast::Expr> {
        match self {
            Layer::Hoist(mut assignments) => {
                assignments.push(inner);
                templates::seq(assignments)
            }
            Layer::Decorate {
                class_ref,
                decorators,
            } => templates::paren(decorators.into_iter().fold(inner, |acc, decorator| {
                templates::class_decorator(decorator, &class_ref, acc)
            })),
            Layer::Sequence { binding, effects } => {
                let mut exprs = Vec::with_capacity(effects.len() + 2);
                exprs.push(templates::assign(&binding, inner));
                exprs.extend(effects);
                exprs.push(templates::ident(&binding));
                templates::seq(exprs)
            }
        }
    }
}
