use std::borrow::Cow;

/// Failure reported by user code: a factory closure or [`crate::Injectable::init`].
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("{0}")]
    Message(Cow<'static, str>),
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl InstantiateErrorKind {
    #[inline]
    #[must_use]
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Message(message.into())
    }
}

impl From<&'static str> for InstantiateErrorKind {
    fn from(message: &'static str) -> Self {
        Self::message(message)
    }
}

impl From<String> for InstantiateErrorKind {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}
