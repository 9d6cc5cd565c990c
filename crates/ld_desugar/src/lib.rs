//! Desugaring pass that rewrites legacy decorators into plain JavaScript.
//!
//! Transforms:
//! - `@a @b class C {}`     → `a(_class = b(_class = class C {}) || _class) || _class`
//! - `@dec method() {}`     → `_applyDecoratedDescriptor(_class.prototype, "method", [dec], ...)`
//! - `@dec field = v`       → a descriptor with `initializer: function () { return v; }`,
//!   installed on each instance by `_initializerDefineProperty`
//! - `m(@dec p) {}`         → `dec(_class.prototype, "m", 0)`
//! - `constructor(@dec p)`  → `_class = dec(_class, undefined, 0) || _class`
//! - `@f() x`               → `_dec = f()` hoisted so decorator expressions run once, in order

mod class_decorators;
mod construct;
mod context;
pub mod desugar;
pub mod error;
pub mod helpers;
pub mod initializer;
mod members;
pub mod names;
mod ordering;
mod params;
mod templates;

#[cfg(test)]
mod test_utils;

pub use desugar::{class_has_decorators, desugar_module, DecoratorPass};
pub use error::DecoratorError;
pub use initializer::{rewrite_marked_initializers, InitializerMarker, InitializerRewriter};
