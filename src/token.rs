use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

use crate::any::TypeInfo;

/// Key under which a provider is registered and a dependency is requested.
///
/// Two type tokens are equal only if they name the same type, and two key tokens
/// only if their strings are equal. A type token never equals a key token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    Type(TypeInfo),
    Key(Cow<'static, str>),
}

impl Token {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    #[inline]
    #[must_use]
    pub fn key(key: impl Into<Cow<'static, str>>) -> Self {
        Self::Key(key.into())
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> Option<&TypeInfo> {
        match self {
            Self::Type(type_info) => Some(type_info),
            Self::Key(_) => None,
        }
    }
}

impl From<&'static str> for Token {
    fn from(key: &'static str) -> Self {
        Self::key(key)
    }
}

impl From<String> for Token {
    fn from(key: String) -> Self {
        Self::key(key)
    }
}

impl From<TypeInfo> for Token {
    fn from(type_info: TypeInfo) -> Self {
        Self::Type(type_info)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(type_info) => Display::fmt(type_info, f),
            Self::Key(key) => write!(f, "{key:?}"),
        }
    }
}

/// Ordered tokens of the resolutions that were in flight when an error was raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain(pub Box<[Token]>);

impl Chain {
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (index, token) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
