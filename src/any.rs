use std::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Type-erased, shareable singleton value.
pub type Instance = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Type name without the module path, e.g. `ServiceA` for `app::services::ServiceA`.
    /// Only the leading path is stripped: generic arguments keep their full paths, and names of
    /// tuples, references and slices are kept as-is.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let path_len = self
            .name
            .find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == ':'))
            .unwrap_or(self.name.len());
        match self.name[..path_len].rsplit_once("::") {
            Some((path, _)) => &self.name[path.len() + 2..],
            None => self.name,
        }
    }
}
