use super::instantiate::InstantiateErrorKind;
use crate::token::{Chain, Token};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Dependency not found: {token} (requested by {chain})")]
    DependencyNotFound { token: Token, chain: Chain },
    #[error("Circular dependency detected: {chain} -> {token}")]
    CircularDependency { token: Token, chain: Chain },
    #[error("Incorrect provides type for {token}. Expected: {expected}")]
    IncorrectType { token: Token, expected: &'static str },
    #[error("Factory for {token} takes {expected} arguments, but {declared} dependencies are declared")]
    ArgumentCount { token: Token, declared: usize, expected: usize },
    #[error("Instantiation of {token} failed: {source}")]
    Instantiate {
        token: Token,
        #[source]
        source: InstantiateErrorKind,
    },
}

impl ResolveErrorKind {
    /// Token the error was raised for.
    #[inline]
    #[must_use]
    pub const fn token(&self) -> &Token {
        match self {
            Self::DependencyNotFound { token, .. }
            | Self::CircularDependency { token, .. }
            | Self::IncorrectType { token, .. }
            | Self::ArgumentCount { token, .. }
            | Self::Instantiate { token, .. } => token,
        }
    }
}
