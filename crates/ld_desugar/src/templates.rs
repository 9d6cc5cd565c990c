//! Small fixed AST snippets used by the decorator passes.
//!
//! Each template takes its holes as already-built expressions, e.g.
//! `class_decorator(DECORATOR, CLASS_REF, INNER)` builds
//! `DECORATOR(CLASS_REF = INNER) || CLASS_REF`.

use swc_common::{Span, SyntaxContext, DUMMY_SP};
use swc_ecma_ast as ast;

pub(crate) fn ident(id: &ast::Ident) -> Box<ast::Expr> {
    Box::new(ast::Expr::Ident(id.clone()))
}

pub(crate) fn named(sym: &str) -> Box<ast::Expr> {
    Box::new(ast::Expr::Ident(ast::Ident::new_no_ctxt(sym.into(), DUMMY_SP)))
}

pub(crate) fn str_lit(value: &str) -> Box<ast::Expr> {
    Box::new(ast::Expr::Lit(ast::Lit::Str(ast::Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    })))
}

pub(crate) fn num_lit(value: usize) -> Box<ast::Expr> {
    Box::new(ast::Expr::Lit(ast::Lit::Num(ast::Number {
        span: DUMMY_SP,
        value: value as f64,
        raw: None,
    })))
}

pub(crate) fn bool_lit(value: bool) -> Box<ast::Expr> {
    Box::new(ast::Expr::Lit(ast::Lit::Bool(ast::Bool {
        span: DUMMY_SP,
        value,
    })))
}

pub(crate) fn null_lit() -> Box<ast::Expr> {
    Box::new(ast::Expr::Lit(ast::Lit::Null(ast::Null { span: DUMMY_SP })))
}

pub(crate) fn this() -> Box<ast::Expr> {
    Box::new(ast::Expr::This(ast::ThisExpr { span: DUMMY_SP }))
}

pub(crate) fn call(callee: Box<ast::Expr>, args: Vec<Box<ast::Expr>>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Call(call_expr(callee, args, SyntaxContext::empty())))
}

/// Build a call node directly, tagging it with `ctxt`.
pub(crate) fn call_expr(
    callee: Box<ast::Expr>,
    args: Vec<Box<ast::Expr>>,
    ctxt: SyntaxContext,
) -> ast::CallExpr {
    ast::CallExpr {
        span: DUMMY_SP,
        ctxt,
        callee: ast::Callee::Expr(callee),
        args: args
            .into_iter()
            .map(|expr| ast::ExprOrSpread { spread: None, expr })
            .collect(),
        type_args: None,
        ..Default::default()
    }
}

pub(crate) fn member(obj: Box<ast::Expr>, prop: &str) -> Box<ast::Expr> {
    Box::new(ast::Expr::Member(ast::MemberExpr {
        span: DUMMY_SP,
        obj,
        prop: ast::MemberProp::Ident(ast::IdentName::new(prop.into(), DUMMY_SP)),
    }))
}

pub(crate) fn assign(target: &ast::Ident, value: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Assign(ast::AssignExpr {
        span: DUMMY_SP,
        op: ast::AssignOp::Assign,
        left: ast::AssignTarget::Simple(ast::SimpleAssignTarget::Ident(target.clone().into())),
        right: value,
    }))
}

pub(crate) fn or(left: Box<ast::Expr>, right: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Bin(ast::BinExpr {
        span: DUMMY_SP,
        op: ast::BinaryOp::LogicalOr,
        left,
        right,
    }))
}

pub(crate) fn paren(expr: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Paren(ast::ParenExpr {
        span: DUMMY_SP,
        expr,
    }))
}

/// `(a, b, ..., z)`, parenthesized so it can sit in any expression slot.
pub(crate) fn seq(exprs: Vec<Box<ast::Expr>>) -> Box<ast::Expr> {
    paren(Box::new(ast::Expr::Seq(ast::SeqExpr {
        span: DUMMY_SP,
        exprs,
    })))
}

pub(crate) fn array(elems: Vec<Box<ast::Expr>>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Array(ast::ArrayLit {
        span: DUMMY_SP,
        elems: elems
            .into_iter()
            .map(|expr| Some(ast::ExprOrSpread { spread: None, expr }))
            .collect(),
    }))
}

pub(crate) fn object(props: Vec<(&str, Box<ast::Expr>)>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Object(ast::ObjectLit {
        span: DUMMY_SP,
        props: props
            .into_iter()
            .map(|(key, value)| {
                ast::PropOrSpread::Prop(Box::new(ast::Prop::KeyValue(ast::KeyValueProp {
                    key: ast::PropName::Ident(ast::IdentName::new(key.into(), DUMMY_SP)),
                    value,
                })))
            })
            .collect(),
    }))
}

/// `function () { return VALUE; }`
pub(crate) fn thunk(value: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Fn(ast::FnExpr {
        ident: None,
        function: Box::new(ast::Function {
            params: vec![],
            decorators: vec![],
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            body: Some(ast::BlockStmt {
                span: DUMMY_SP,
                ctxt: SyntaxContext::empty(),
                stmts: vec![ast::Stmt::Return(ast::ReturnStmt {
                    span: DUMMY_SP,
                    arg: Some(value),
                })],
            }),
            is_generator: false,
            is_async: false,
            type_params: None,
            return_type: None,
        }),
    }))
}

/// `DECORATOR(CLASS_REF = INNER) || CLASS_REF`
pub(crate) fn class_decorator(
    decorator: Box<ast::Expr>,
    class_ref: &ast::Ident,
    inner: Box<ast::Expr>,
) -> Box<ast::Expr> {
    or(call(decorator, vec![assign(class_ref, inner)]), ident(class_ref))
}

/// `CLASS_REF = DECORATOR(CLASS_REF, undefined, INDEX) || CLASS_REF`
pub(crate) fn constructor_parameter_decorator(
    decorator: Box<ast::Expr>,
    class_ref: &ast::Ident,
    index: usize,
) -> Box<ast::Expr> {
    assign(
        class_ref,
        or(
            call(
                decorator,
                vec![ident(class_ref), named("undefined"), num_lit(index)],
            ),
            ident(class_ref),
        ),
    )
}

/// `DECORATOR(CLASS_REF.prototype, METHOD, INDEX)`
pub(crate) fn method_parameter_decorator(
    decorator: Box<ast::Expr>,
    class_ref: &ast::Ident,
    method: Box<ast::Expr>,
    index: usize,
) -> Box<ast::Expr> {
    call(
        decorator,
        vec![class_prototype(class_ref), method, num_lit(index)],
    )
}

/// `CLASS_REF.prototype`
pub(crate) fn class_prototype(class_ref: &ast::Ident) -> Box<ast::Expr> {
    member(ident(class_ref), "prototype")
}

/// `Object.getOwnPropertyDescriptor(TARGET, PROPERTY)`
pub(crate) fn get_descriptor(target: Box<ast::Expr>, property: Box<ast::Expr>) -> Box<ast::Expr> {
    call(
        member(named("Object"), "getOwnPropertyDescriptor"),
        vec![target, property],
    )
}

/// ```js
/// (TEMP = Object.getOwnPropertyDescriptor(TARGET, PROPERTY), (TEMP = TEMP ? TEMP.value : undefined), {
///     enumerable: true,
///     configurable: true,
///     writable: true,
///     initializer: function () { return TEMP; }
/// })
/// ```
pub(crate) fn object_initializer_descriptor(
    temp: &ast::Ident,
    target: Box<ast::Expr>,
    property: Box<ast::Expr>,
) -> Box<ast::Expr> {
    let current_value = Box::new(ast::Expr::Cond(ast::CondExpr {
        span: DUMMY_SP,
        test: ident(temp),
        cons: member(ident(temp), "value"),
        alt: named("undefined"),
    }));

    seq(vec![
        assign(temp, get_descriptor(target, property)),
        paren(assign(temp, current_value)),
        object(vec![
            ("enumerable", bool_lit(true)),
            ("configurable", bool_lit(true)),
            ("writable", bool_lit(true)),
            ("initializer", thunk(ident(temp))),
        ]),
    ])
}

/// The materialized descriptor of an instance field:
/// `{ configurable: true, enumerable: true, writable: true, initializer: INITIALIZER }`
pub(crate) fn field_descriptor(initializer: Box<ast::Expr>) -> Box<ast::Expr> {
    object(vec![
        ("configurable", bool_lit(true)),
        ("enumerable", bool_lit(true)),
        ("writable", bool_lit(true)),
        ("initializer", initializer),
    ])
}

/// `#NAME = VALUE;` as an instance field.
pub(crate) fn private_field(name: &str, value: Box<ast::Expr>, span: Span) -> ast::ClassMember {
    ast::ClassMember::PrivateProp(ast::PrivateProp {
        span,
        ctxt: SyntaxContext::empty(),
        key: ast::PrivateName {
            span: DUMMY_SP,
            name: name.into(),
        },
        value: Some(value),
        type_ann: None,
        is_static: false,
        decorators: vec![],
        accessibility: None,
        is_optional: false,
        is_override: false,
        readonly: false,
        definite: false,
    })
}

/// `let NAME = INIT;`
pub(crate) fn let_binding(name: ast::Ident, init: Box<ast::Expr>) -> ast::Decl {
    ast::Decl::Var(Box::new(ast::VarDecl {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        kind: ast::VarDeclKind::Let,
        declare: false,
        decls: vec![ast::VarDeclarator {
            span: DUMMY_SP,
            name: ast::Pat::Ident(name.into()),
            init: Some(init),
            definite: false,
        }],
    }))
}

/// `var a, b, c;`
pub(crate) fn var_declarations(names: Vec<ast::Ident>) -> ast::Stmt {
    ast::Stmt::Decl(ast::Decl::Var(Box::new(ast::VarDecl {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        kind: ast::VarDeclKind::Var,
        declare: false,
        decls: names
            .into_iter()
            .map(|name| ast::VarDeclarator {
                span: DUMMY_SP,
                name: ast::Pat::Ident(name.into()),
                init: None,
                definite: false,
            })
            .collect(),
    })))
}

/// `export { LOCAL as default };`
pub(crate) fn export_as_default(local: ast::Ident) -> ast::ModuleItem {
    ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportNamed(ast::NamedExport {
        span: DUMMY_SP,
        specifiers: vec![ast::ExportSpecifier::Named(ast::ExportNamedSpecifier {
            span: DUMMY_SP,
            orig: ast::ModuleExportName::Ident(local),
            exported: Some(ast::ModuleExportName::Ident(ast::Ident::new_no_ctxt(
                "default".into(),
                DUMMY_SP,
            ))),
            is_type_only: false,
        })],
        src: None,
        type_only: false,
        with: None,
    }))
}
