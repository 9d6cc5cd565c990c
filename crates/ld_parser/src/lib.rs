//! Parser front end for legacy decorators.
//!
//! Wraps the standard SWC parser with decorator syntax switched on, so that
//! classes, class members and parameters come back with their `decorators`
//! populated:
//!
//! - TypeScript (`.ts`, `.mts`, `.cts`, `.tsx`) uses SWC's TS decorator grammar
//! - JavaScript (`.js`, `.mjs`, `.cjs`, `.jsx`) uses the legacy proposal grammar,
//!   with decorators allowed before `export`

pub mod parse;

pub use parse::{parse_decorated, ParseResult, SourceKind};
