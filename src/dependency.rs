use crate::token::Token;

/// Dependency declared by a factory provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dependency {
    pub token: Token,
    pub optional: bool,
}

impl Dependency {
    #[inline]
    #[must_use]
    pub fn required(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            optional: false,
        }
    }

    /// An absent provider resolves to `None` instead of failing.
    #[inline]
    #[must_use]
    pub fn optional(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            optional: true,
        }
    }
}

impl From<Token> for Dependency {
    fn from(token: Token) -> Self {
        Self::required(token)
    }
}

impl From<&'static str> for Dependency {
    fn from(key: &'static str) -> Self {
        Self::required(key)
    }
}
