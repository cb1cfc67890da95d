use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use crate::{
    any::{Instance, TypeInfo},
    autowire::Injectable,
    dependency::Dependency,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    injector::Injector,
    instantiator::{boxed_factory, BoxedFactory, Factory, FromArguments},
};

/// Description of how the value for a token is produced.
///
/// A provider is never the produced value itself: values are memoized by the registry entry
/// the provider is registered in.
#[derive(Clone)]
pub enum Provider {
    Value(ValueProvider),
    Factory(FactoryProvider),
    Class(ClassProvider),
}

impl Provider {
    /// Provider returning `value` as-is.
    #[inline]
    #[must_use]
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Value(ValueProvider {
            value: Arc::new(value),
            type_info: TypeInfo::of::<T>(),
        })
    }

    /// Provider calling `factory` with the values of `dependencies`, resolved in declared order.
    ///
    /// The factory arguments are positional: the first argument receives the first dependency and so on.
    /// The number of arguments is checked against the number of dependencies on resolution.
    /// The factory returns [`InstantiateErrorKind`], other errors convert into it with `?`.
    #[inline]
    #[must_use]
    pub fn factory<F, Args, I>(dependencies: I, factory: F) -> Self
    where
        F: Factory<Args, Error = InstantiateErrorKind>,
        Args: FromArguments,
        I: IntoIterator,
        I::Item: Into<Dependency>,
    {
        Self::Factory(FactoryProvider {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            arity: Args::ARITY,
            factory: boxed_factory(factory),
            type_info: TypeInfo::of::<F::Provides>(),
        })
    }

    /// Provider constructing `T` with its autowired members.
    #[inline]
    #[must_use]
    pub fn class<T: Injectable + Default>() -> Self {
        Self::Class(ClassProvider {
            type_info: TypeInfo::of::<T>(),
            construct: construct_instance::<T>,
        })
    }

    /// Type of the value the provider produces.
    #[inline]
    #[must_use]
    pub const fn provides(&self) -> &TypeInfo {
        match self {
            Self::Value(ValueProvider { type_info, .. })
            | Self::Factory(FactoryProvider { type_info, .. })
            | Self::Class(ClassProvider { type_info, .. }) => type_info,
        }
    }
}

#[derive(Clone)]
pub struct ValueProvider {
    pub(crate) value: Instance,
    type_info: TypeInfo,
}

#[derive(Clone)]
pub struct FactoryProvider {
    pub(crate) dependencies: Box<[Dependency]>,
    pub(crate) arity: usize,
    pub(crate) factory: BoxedFactory,
    type_info: TypeInfo,
}

impl FactoryProvider {
    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

#[derive(Clone)]
pub struct ClassProvider {
    type_info: TypeInfo,
    pub(crate) construct: fn(&Injector) -> Result<Instance, ResolveErrorKind>,
}

fn construct_instance<T: Injectable + Default>(injector: &Injector) -> Result<Instance, ResolveErrorKind> {
    injector.construct::<T>().map(|instance| Arc::new(instance) as Instance)
}

impl Debug for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(ValueProvider { type_info, .. }) => f.debug_tuple("Value").field(&type_info.name).finish(),
            Self::Factory(FactoryProvider {
                dependencies, type_info, ..
            }) => f
                .debug_struct("Factory")
                .field("provides", &type_info.name)
                .field("dependencies", dependencies)
                .finish(),
            Self::Class(ClassProvider { type_info, .. }) => f.debug_tuple("Class").field(&type_info.name).finish(),
        }
    }
}
