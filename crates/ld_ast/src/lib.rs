//! ECMAScript/TypeScript AST for legacy decorator desugaring.
//!
//! Re-exports the standard SWC AST and adds:
//! - `DecoratedObjectLit`, an object literal whose properties carry decorators
//!   (SWC's own `ObjectLit` has no slot for them)
//! - `DecoratorConfig`, the options controlling the desugaring output

pub use swc_ecma_ast::*;

use serde::{Deserialize, Serialize};
use swc_common::{Span, Spanned};

/// An object literal with legacy property decorators.
///
/// `{ @readonly name: "x", @log run() {} }` is represented as one
/// `DecoratedProp` per property, each holding its decorators in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedObjectLit {
    pub span: Span,
    pub props: Vec<DecoratedProp>,
}

/// A single object literal property together with its decorators.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedProp {
    pub decorators: Vec<Decorator>,
    pub prop: PropOrSpread,
}

impl DecoratedObjectLit {
    pub fn has_decorators(&self) -> bool {
        self.props.iter().any(|p| !p.decorators.is_empty())
    }

    /// Drop the decorator slots and return the plain SWC object literal.
    pub fn into_object_lit(self) -> ObjectLit {
        ObjectLit {
            span: self.span,
            props: self.props.into_iter().map(|p| p.prop).collect(),
        }
    }
}

impl From<ObjectLit> for DecoratedObjectLit {
    fn from(lit: ObjectLit) -> Self {
        Self {
            span: lit.span,
            props: lit
                .props
                .into_iter()
                .map(|prop| DecoratedProp {
                    decorators: vec![],
                    prop,
                })
                .collect(),
        }
    }
}

impl Spanned for DecoratedProp {
    fn span(&self) -> Span {
        self.prop.span()
    }
}

/// How the declared initializer of a decorated instance field reaches the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldInitializers {
    /// The field is replaced by a private slot whose initializer installs the
    /// decorated descriptor with `initializerDefineProperty`, at the field's
    /// original position in the initialization order.
    #[default]
    Install,
    /// The field keeps a tagged `initializerWarningHelper` placeholder. A
    /// class-properties transform turns it into an assignment or
    /// `defineProperty` call, which `rewrite_marked_initializers` then
    /// finishes.
    Deferred,
}

/// Where the runtime helpers referenced by the output come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HelperSource {
    /// Helpers are free identifiers provided by the environment.
    #[default]
    Global,
    /// Helpers are imported by name from the given module specifier.
    Module(String),
}

/// Options for the decorator desugaring pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecoratorConfig {
    pub field_initializers: FieldInitializers,
    pub helpers: HelperSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_install_and_global() {
        let cfg = DecoratorConfig::default();
        assert_eq!(cfg.field_initializers, FieldInitializers::Install);
        assert_eq!(cfg.helpers, HelperSource::Global);
    }

    #[test]
    fn config_reads_camel_case_json() {
        let cfg: DecoratorConfig = serde_json::from_str(
            r#"{ "fieldInitializers": "deferred", "helpers": { "module": "@legacy/helpers" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.field_initializers, FieldInitializers::Deferred);
        assert_eq!(cfg.helpers, HelperSource::Module("@legacy/helpers".into()));

        let empty: DecoratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, DecoratorConfig::default());
    }
}
