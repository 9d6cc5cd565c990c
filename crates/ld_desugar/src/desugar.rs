//! Top-level desugaring entry point.
//!
//! Walks a parsed module bottom-up and rewrites every decorated class. Each
//! construct goes through the sub-passes in priority order (ordering, class,
//! member, parameter); the first one that fires contributes a layer and the
//! construct is tried again until no pass fires.

use ld_ast::{DecoratedObjectLit, DecoratorConfig, FieldInitializers};
use swc_common::{util::take::Take, Globals, GLOBALS};
use swc_ecma_ast as ast;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::{
    class_decorators::{apply_class_decorators, has_class_decorators},
    construct::{Construct, Layer},
    context::RewriteCx,
    error::DecoratorError,
    helpers::Helper,
    initializer::{InitializerMarker, InitializerRewriter},
    members::{apply_member_decorators, member_has_decorators},
    ordering::ensure_ordering,
    params::{apply_parameter_decorators, has_parameter_decorators},
    templates,
};

/// Desugar all legacy decorators in a module.
///
/// With [`FieldInitializers::Deferred`] the decorated fields keep their marked
/// placeholders. Hosts wanting that mode drive [`DecoratorPass`] themselves
/// and pass [`DecoratorPass::marker`] to [`rewrite_marked_initializers`] after
/// their class-properties transform. Sets up SWC's `GLOBALS` if the caller has
/// not.
///
/// [`rewrite_marked_initializers`]: crate::initializer::rewrite_marked_initializers
pub fn desugar_module(
    module: ast::Module,
    config: &DecoratorConfig,
) -> Result<ast::Module, DecoratorError> {
    with_globals(|| {
        let mut module = module;
        let mut pass = DecoratorPass::new(config.clone());
        module.visit_mut_with(&mut pass);
        pass.finish()?;
        Ok(module)
    })
}

pub(crate) fn with_globals<T>(f: impl FnOnce() -> T) -> T {
    if GLOBALS.is_set() {
        f()
    } else {
        GLOBALS.set(&Globals::new(), f)
    }
}

/// Whether a class carries decorators on itself, its members or their
/// parameters. Nested classes are not considered.
pub fn class_has_decorators(class: &ast::Class) -> bool {
    has_class_decorators(class)
        || class.body.iter().any(member_has_decorators)
        || has_parameter_decorators(class)
}

/// The decorator desugaring visitor.
///
/// Must be created while SWC's `GLOBALS` are set. After visiting, call
/// [`DecoratorPass::finish`] to learn whether an unsupported construct was
/// hit. A construct that fails to desugar is left as it was, decorators
/// included.
pub struct DecoratorPass {
    cx: RewriteCx,
    error: Option<DecoratorError>,
}

impl DecoratorPass {
    pub fn new(config: DecoratorConfig) -> Self {
        Self {
            cx: RewriteCx::new(config, InitializerMarker::new()),
            error: None,
        }
    }

    /// The marker tagging deferred field initializers emitted by this pass.
    pub fn marker(&self) -> InitializerMarker {
        self.cx.marker
    }

    /// Reserve names so synthesized bindings never shadow them.
    pub fn reserve_names<N>(&mut self, node: &N)
    where
        N: swc_ecma_visit::VisitWith<crate::names::IdentCollector>,
    {
        self.cx.names.reserve_all(node);
    }

    /// The first error hit while visiting, if any.
    pub fn finish(self) -> Result<(), DecoratorError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Desugar a decorated object literal, including decorated classes nested
    /// in its property values.
    ///
    /// Bindings it needs are declared in the outermost scope; collect them
    /// with [`DecoratorPass::take_declarations`]. On error the object is
    /// consumed.
    pub fn rewrite_object(
        &mut self,
        mut object: DecoratedObjectLit,
    ) -> Result<Box<ast::Expr>, DecoratorError> {
        for prop in object.props.iter() {
            self.cx.names.reserve_all(&prop.decorators);
            self.cx.names.reserve_all(&prop.prop);
        }
        for prop in object.props.iter_mut() {
            prop.prop.visit_mut_with(self);
        }
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let mut expr = self.rewrite_construct(Construct::Object(object))?;
        self.install_field_initializers(&mut *expr);
        Ok(expr)
    }

    /// `var ...;` for the bindings declared in the current scope.
    pub fn take_declarations(&mut self) -> Option<ast::Stmt> {
        let names = self.cx.exit_scope();
        if names.is_empty() {
            None
        } else {
            Some(templates::var_declarations(names))
        }
    }

    /// Import declaration for the helpers used so far, when helpers come from a module.
    pub fn helper_import(&self) -> Option<ast::ModuleItem> {
        self.cx.helpers.import_decl(&self.cx.config.helpers)
    }

    fn rewrite_construct(&mut self, mut construct: Construct) -> Result<Box<ast::Expr>, DecoratorError> {
        let mut layers = Vec::new();
        while let Some(layer) = self.next_layer(&mut construct)? {
            layers.push(layer);
        }
        Ok(layers
            .into_iter()
            .rev()
            .fold(construct.into_expr(), |inner, layer| layer.wrap(inner)))
    }

    /// The first sub-pass with something to do wins.
    fn next_layer(&mut self, construct: &mut Construct) -> Result<Option<Layer>, DecoratorError> {
        let cx = &mut self.cx;
        if let Some(layer) = ensure_ordering(construct, cx) {
            return Ok(Some(layer));
        }
        if let Construct::Class(class) = construct {
            if let Some(layer) = apply_class_decorators(&mut class.class, cx) {
                return Ok(Some(layer));
            }
        }
        if let Some(layer) = apply_member_decorators(construct, cx)? {
            return Ok(Some(layer));
        }
        match construct {
            Construct::Class(class) => apply_parameter_decorators(&mut class.class, cx),
            Construct::Object(_) => Ok(None),
        }
    }

    /// `class X {}` → `let X = class X {};` when the class is decorated.
    fn lower_decl(&mut self, decl: ast::Decl) -> ast::Decl {
        if self.error.is_some() {
            return decl;
        }
        match decl {
            ast::Decl::Class(ast::ClassDecl {
                ident,
                class,
                declare: false,
            }) if class_has_decorators(&class) => templates::let_binding(
                ident.clone(),
                Box::new(ast::Expr::Class(ast::ClassExpr {
                    ident: Some(ident),
                    class,
                })),
            ),
            decl => decl,
        }
    }

    /// `export default class X {}` → `let X = class X {}; export { X as default };`
    fn lower_default_export(&mut self, item: ast::ModuleItem, out: &mut Vec<ast::ModuleItem>) {
        match item {
            ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDefaultDecl(ast::ExportDefaultDecl {
                decl: ast::DefaultDecl::Class(class),
                ..
            })) if self.error.is_none() && class_has_decorators(&class.class) => {
                let name = match &class.ident {
                    Some(ident) => ident.clone(),
                    None => self.cx.names.fresh("class"),
                };
                out.push(ast::ModuleItem::Stmt(ast::Stmt::Decl(templates::let_binding(
                    name.clone(),
                    Box::new(ast::Expr::Class(class)),
                ))));
                out.push(templates::export_as_default(name));
            }
            ast::ModuleItem::Stmt(ast::Stmt::Decl(decl)) => {
                out.push(ast::ModuleItem::Stmt(ast::Stmt::Decl(self.lower_decl(decl))));
            }
            ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDecl(export)) => {
                out.push(ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDecl(
                    ast::ExportDecl {
                        span: export.span,
                        decl: self.lower_decl(export.decl),
                    },
                )));
            }
            item => out.push(item),
        }
    }

    /// Swap the marked field placeholders for private install slots.
    fn install_field_initializers<N>(&mut self, node: &mut N)
    where
        N: VisitMutWith<InitializerRewriter>,
    {
        if self.cx.config.field_initializers != FieldInitializers::Install {
            return;
        }
        let usage = std::mem::take(&mut self.cx.helpers);
        let mut rewriter = InitializerRewriter::with_usage(self.cx.marker, usage);
        node.visit_mut_with(&mut rewriter);
        self.cx.helpers = rewriter.into_usage();
        self.cx.helpers.release(Helper::InitializerWarningHelper);
    }

    /// Close a function scope, returning `var` for the bindings declared in it.
    fn exit_function_scope(&mut self) -> Option<ast::Stmt> {
        let names = self.cx.exit_scope();
        if names.is_empty() {
            None
        } else {
            Some(templates::var_declarations(names))
        }
    }

    fn declare_in_block(&mut self, body: Option<&mut ast::BlockStmt>) {
        let decl = self.exit_function_scope();
        if let (Some(body), Some(decl)) = (body, decl) {
            let at = directive_prologue_len(&body.stmts);
            body.stmts.insert(at, decl);
        }
    }
}

impl VisitMut for DecoratorPass {
    fn visit_mut_module(&mut self, module: &mut ast::Module) {
        self.cx.names.reserve_all(&*module);
        module.visit_mut_children_with(self);
        self.install_field_initializers(&mut module.body);

        if let Some(decl) = self.take_declarations() {
            let at = module
                .body
                .iter()
                .position(|item| {
                    !matches!(item, ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(_)))
                })
                .unwrap_or(module.body.len());
            module.body.insert(at, ast::ModuleItem::Stmt(decl));
        }
        if let Some(import) = self.helper_import() {
            module.body.insert(0, import);
        }
    }

    fn visit_mut_script(&mut self, script: &mut ast::Script) {
        self.cx.names.reserve_all(&*script);
        script.visit_mut_children_with(self);
        self.install_field_initializers(&mut script.body);

        if let Some(decl) = self.take_declarations() {
            let at = directive_prologue_len(&script.body);
            script.body.insert(at, decl);
        }
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ast::ModuleItem>) {
        let mut out = Vec::with_capacity(items.len());
        for item in items.drain(..) {
            self.lower_default_export(item, &mut out);
        }
        *items = out;

        items.visit_mut_children_with(self);
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<ast::Stmt>) {
        let lowered: Vec<ast::Stmt> = stmts
            .drain(..)
            .map(|stmt| match stmt {
                ast::Stmt::Decl(decl) => ast::Stmt::Decl(self.lower_decl(decl)),
                stmt => stmt,
            })
            .collect();
        *stmts = lowered;

        stmts.visit_mut_children_with(self);
    }

    fn visit_mut_expr(&mut self, expr: &mut ast::Expr) {
        expr.visit_mut_children_with(self);

        if self.error.is_some() {
            return;
        }
        let ast::Expr::Class(class) = &*expr else {
            return;
        };
        if !class_has_decorators(&class.class) {
            return;
        }
        match self.rewrite_construct(Construct::Class(class.clone())) {
            Ok(replacement) => *expr = *replacement,
            Err(err) => {
                tracing::debug!(error = %err, "decorator desugaring failed");
                self.error = Some(err);
            }
        }
    }

    fn visit_mut_function(&mut self, function: &mut ast::Function) {
        self.cx.enter_scope();
        function.visit_mut_children_with(self);
        self.declare_in_block(function.body.as_mut());
    }

    fn visit_mut_constructor(&mut self, ctor: &mut ast::Constructor) {
        self.cx.enter_scope();
        ctor.visit_mut_children_with(self);
        self.declare_in_block(ctor.body.as_mut());
    }

    fn visit_mut_getter_prop(&mut self, getter: &mut ast::GetterProp) {
        self.cx.enter_scope();
        getter.visit_mut_children_with(self);
        self.declare_in_block(getter.body.as_mut());
    }

    fn visit_mut_setter_prop(&mut self, setter: &mut ast::SetterProp) {
        self.cx.enter_scope();
        setter.visit_mut_children_with(self);
        self.declare_in_block(setter.body.as_mut());
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ast::ArrowExpr) {
        self.cx.enter_scope();
        arrow.visit_mut_children_with(self);

        let Some(decl) = self.exit_function_scope() else {
            return;
        };
        match &mut *arrow.body {
            ast::BlockStmtOrExpr::BlockStmt(block) => {
                let at = directive_prologue_len(&block.stmts);
                block.stmts.insert(at, decl);
            }
            ast::BlockStmtOrExpr::Expr(value) => {
                let value = Box::new(value.as_mut().take());
                *arrow.body = ast::BlockStmtOrExpr::BlockStmt(ast::BlockStmt {
                    span: arrow.span,
                    ctxt: Default::default(),
                    stmts: vec![
                        decl,
                        ast::Stmt::Return(ast::ReturnStmt {
                            span: arrow.span,
                            arg: Some(value),
                        }),
                    ],
                });
            }
        }
    }
}

/// Number of leading `"use strict"`-style directives.
fn directive_prologue_len(stmts: &[ast::Stmt]) -> usize {
    stmts
        .iter()
        .take_while(|stmt| {
            matches!(
                stmt,
                ast::Stmt::Expr(ast::ExprStmt { expr, .. })
                    if matches!(&**expr, ast::Expr::Lit(ast::Lit::Str(_)))
            )
        })
        .count()
}

#[cfg(test)]
mod tests {
    use ld_ast::{
        DecoratedObjectLit, DecoratedProp, DecoratorConfig, FieldInitializers, HelperSource,
    };
    use swc_common::DUMMY_SP;
    use swc_ecma_ast as ast;

    use super::*;
    use crate::test_utils::{assert_contains, desugar, emit, position, squash, try_desugar_with};

    #[test]
    fn undecorated_code_is_untouched() {
        let out = desugar("class Plain { m() {} }\nconst x = 1;");
        assert_contains(&out, "class Plain { m() {} }");
        assert!(!out.contains("var"), "unexpected declarations in {out}");
    }

    #[test]
    fn bindings_are_declared_after_imports() {
        let out = desugar("import { dec } from './dec';\nclass A { @dec m() {} }");
        assert_contains(&out, "import { dec } from './dec'; var _class; let A =");
    }

    #[test]
    fn generated_names_avoid_existing_identifiers() {
        let out = desugar("const _class = 1;\nclass A { @dec m() {} }");
        assert_contains(&out, "var _class2;");
        assert_contains(&out, "let A = (_class2 = class A");
    }

    #[test]
    fn exported_class_becomes_exported_let() {
        let out = desugar("export class Store { @action load() {} }");
        assert_contains(&out, "export let Store = (_class = class Store { load() {} },");
    }

    #[test]
    fn default_export_is_split_into_binding_and_export() {
        let out = desugar("export default class Store { @action load() {} }");
        assert_contains(&out, "let Store = (_class = class Store { load() {} },");
        assert_contains(&out, "export { Store as default };");
    }

    #[test]
    fn anonymous_default_export_gets_a_fresh_name() {
        let out = desugar("export default class { @action load() {} }");
        assert_contains(&out, "var _class2;");
        assert_contains(&out, "let _class = (_class2 = class { load() {} },");
        assert_contains(&out, "export { _class as default };");
    }

    #[test]
    fn bindings_are_declared_in_the_enclosing_function() {
        let out = desugar("function make() {\n  'use strict';\n  return class { @dec m() {} };\n}");
        assert_contains(&out, "function make() { 'use strict'; var _class; return (_class = class {");
        assert!(position(&out, "var _class") > position(&out, "function make"));
    }

    #[test]
    fn arrow_expression_bodies_become_blocks() {
        let out = desugar("const make = () => class { @dec m() {} };");
        assert_contains(&out, "const make = () => { var _class; return (_class = class {");
    }

    #[test]
    fn nested_classes_are_rewritten_inside_out() {
        let out = desugar(
            "class Outer {\n  @dec m() {\n    return class Inner { @dec n() {} };\n  }\n}",
        );
        assert_contains(&out, "m() { var _class; return (_class = class Inner { n() {} },");
        assert_contains(&out, "var _class2; let Outer = (_class2 = class Outer");
    }

    #[test]
    fn helpers_can_be_imported_from_a_module() {
        let config = DecoratorConfig {
            helpers: HelperSource::Module("decorator-helpers".into()),
            ..Default::default()
        };
        let out = try_desugar_with("class A { @dec m() {} }", &config).unwrap();
        assert!(out.starts_with(&squash(
            "import { applyDecoratedDescriptor as _applyDecoratedDescriptor } from \"decorator-helpers\";"
        )));
    }

    #[test]
    fn installed_fields_share_the_helper_import() {
        let config = DecoratorConfig {
            helpers: HelperSource::Module("decorator-helpers".into()),
            ..Default::default()
        };
        let out = try_desugar_with("class A { @observable count = 0; }", &config).unwrap();
        assert!(out.starts_with(&squash(
            "import { applyDecoratedDescriptor as _applyDecoratedDescriptor, \
             initializerDefineProperty as _initializerDefineProperty } from \"decorator-helpers\";"
        )));
        assert!(!out.contains("initializerWarningHelper"), "unused helper in {out}");
    }

    #[test]
    fn deferred_fields_wait_for_the_marker_rewrite() {
        let config = DecoratorConfig {
            field_initializers: FieldInitializers::Deferred,
            ..Default::default()
        };
        let out = try_desugar_with("class A { @observable count = 0; }", &config).unwrap();
        assert_contains(&out, "count = _initializerWarningHelper(_descriptor, this);");
        assert!(!out.contains("_initializerDefineProperty"));
    }

    #[test]
    fn failed_classes_are_left_intact() {
        let parsed = ld_parser::parse_decorated("class A { @dec [key]() {} }", "input.ts").unwrap();
        let mut module = parsed.module;
        let err = with_globals(|| {
            let mut pass = DecoratorPass::new(DecoratorConfig::default());
            module.visit_mut_with(&mut pass);
            pass.finish().unwrap_err()
        });
        assert!(matches!(err, DecoratorError::ComputedKey { .. }));

        let class = module
            .body
            .iter()
            .find_map(|item| match item {
                ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(var))) => {
                    match var.decls[0].init.as_deref() {
                        Some(ast::Expr::Class(class)) => Some(class),
                        _ => None,
                    }
                }
                _ => None,
            })
            .expect("the original class expression");
        let ast::ClassMember::Method(method) = &class.class.body[0] else {
            panic!("expected the method");
        };
        assert_eq!(method.function.decorators.len(), 1);
    }

    #[test]
    fn first_error_stops_the_pass() {
        let err = try_desugar_with(
            "class A { @dec [key]() {} }\nclass B { @dec [other] = 1; }",
            &DecoratorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DecoratorError::ComputedKey { .. }));
    }

    fn decorated(name: &str, prop: ast::Prop) -> DecoratedProp {
        DecoratedProp {
            decorators: vec![ast::Decorator {
                span: DUMMY_SP,
                expr: templates::named(name),
            }],
            prop: ast::PropOrSpread::Prop(Box::new(prop)),
        }
    }

    fn key_value(key: &str, value: Box<ast::Expr>) -> ast::Prop {
        ast::Prop::KeyValue(ast::KeyValueProp {
            key: ast::PropName::Ident(ast::IdentName::new(key.into(), DUMMY_SP)),
            value,
        })
    }

    fn rewrite(object: DecoratedObjectLit) -> Result<String, DecoratorError> {
        with_globals(|| {
            let mut pass = DecoratorPass::new(DecoratorConfig::default());
            let expr = pass.rewrite_object(object)?;
            let mut body = Vec::new();
            if let Some(decl) = pass.take_declarations() {
                body.push(ast::ModuleItem::Stmt(decl));
            }
            body.push(ast::ModuleItem::Stmt(ast::Stmt::Expr(ast::ExprStmt {
                span: DUMMY_SP,
                expr,
            })));
            Ok(squash(&emit(&ast::Module {
                span: DUMMY_SP,
                body,
                shebang: None,
            })))
        })
    }

    #[test]
    fn object_literal_properties_are_decorated() {
        let object = DecoratedObjectLit {
            span: DUMMY_SP,
            props: vec![
                decorated("readonly", key_value("name", templates::str_lit("x"))),
                DecoratedProp {
                    decorators: vec![],
                    prop: ast::PropOrSpread::Prop(Box::new(key_value(
                        "plain",
                        templates::num_lit(1),
                    ))),
                },
            ],
        };
        let out = rewrite(object).unwrap();
        assert_contains(&out, "var _obj, _init;");
        assert_contains(&out, "(_obj = { name: \"x\", plain: 1 },");
        assert_contains(
            &out,
            "_applyDecoratedDescriptor(_obj, \"name\", [readonly], \
             (_init = Object.getOwnPropertyDescriptor(_obj, \"name\"), \
             (_init = _init ? _init.value : undefined), \
             { enumerable: true, configurable: true, writable: true, \
             initializer: function() { return _init; }",
        );
        assert_contains(&out, "_obj);");
    }

    #[test]
    fn object_literal_methods_use_their_own_descriptor() {
        let method = ast::Prop::Method(ast::MethodProp {
            key: ast::PropName::Ident(ast::IdentName::new("run".into(), DUMMY_SP)),
            function: Box::new(ast::Function {
                body: Some(ast::BlockStmt::default()),
                ..Default::default()
            }),
        });
        let out = rewrite(DecoratedObjectLit {
            span: DUMMY_SP,
            props: vec![decorated("log", method)],
        })
        .unwrap();
        assert_contains(
            &out,
            "_applyDecoratedDescriptor(_obj, \"run\", [log], \
             Object.getOwnPropertyDescriptor(_obj, \"run\"), _obj)",
        );
    }

    #[test]
    fn classes_nested_in_object_values_are_desugared() {
        let parsed =
            ld_parser::parse_decorated("({ Store: class { @action load() {} } });", "input.ts")
                .unwrap();
        let ast::ModuleItem::Stmt(ast::Stmt::Expr(stmt)) = &parsed.module.body[0] else {
            panic!("expected an expression statement");
        };
        let ast::Expr::Paren(paren) = &*stmt.expr else {
            panic!("expected a parenthesized object");
        };
        let ast::Expr::Object(object) = &*paren.expr else {
            panic!("expected an object literal");
        };
        let mut object = DecoratedObjectLit::from(object.clone());
        object.props[0].decorators.push(ast::Decorator {
            span: DUMMY_SP,
            expr: templates::named("registered"),
        });

        let out = rewrite(object).unwrap();
        assert_contains(&out, "var _class, _obj, _init;");
        assert_contains(
            &out,
            "(_obj = { Store: (_class = class { load() {} }, \
             _applyDecoratedDescriptor(_class.prototype, \"load\", [action]",
        );
        assert_contains(&out, "_applyDecoratedDescriptor(_obj, \"Store\", [registered]");
    }

    #[test]
    fn object_bindings_avoid_names_in_the_object() {
        let object = DecoratedObjectLit {
            span: DUMMY_SP,
            props: vec![decorated("dec", key_value("x", templates::named("_obj")))],
        };
        let out = rewrite(object).unwrap();
        assert_contains(&out, "var _obj2, _init;");
        assert_contains(&out, "(_obj2 = { x: _obj },");
    }

    #[test]
    fn decorated_spread_is_rejected() {
        let spread = DecoratedProp {
            decorators: vec![ast::Decorator {
                span: DUMMY_SP,
                expr: templates::named("dec"),
            }],
            prop: ast::PropOrSpread::Spread(ast::SpreadElement {
                dot3_token: DUMMY_SP,
                expr: templates::named("rest"),
            }),
        };
        let err = rewrite(DecoratedObjectLit {
            span: DUMMY_SP,
            props: vec![spread],
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DecoratorError::UnsupportedMember { kind: "spread elements", .. }
        ));
    }
}
