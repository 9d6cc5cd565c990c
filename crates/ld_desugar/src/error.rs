//! Errors raised while desugaring decorators.

use swc_common::Span;
use thiserror::Error;

/// A decorated construct the pass cannot express.
///
/// Fatal for the file being desugared; the span points at the offending
/// member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoratorError {
    /// A decorated method or property whose key is computed (`[key]`).
    #[error("Computed method/property decorators are not yet supported.")]
    ComputedKey { span: Span },

    /// A decorated member of a kind legacy decorators have no meaning for.
    #[error("Decorators are not supported on {kind}.")]
    UnsupportedMember { span: Span, kind: &'static str },
}

impl DecoratorError {
    pub fn span(&self) -> Span {
        match self {
            DecoratorError::ComputedKey { span } => *span,
            DecoratorError::UnsupportedMember { span, .. } => *span,
        }
    }
}
