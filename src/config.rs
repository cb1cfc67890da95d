/// Config for an injector
/// ## Fields
/// - `replace_policy`:
///   What happens to an already memoized value when the provider of its token is replaced.
///   See [`ReplacePolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub replace_policy: ReplacePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplacePolicy {
    /// The memoized value survives and keeps being returned, the new provider is only used
    /// if the token wasn't resolved yet.
    #[default]
    KeepMemoized,
    /// The memoized value is dropped, the next resolution uses the new provider.
    ///
    /// Values already injected into other singletons aren't affected.
    Invalidate,
}
