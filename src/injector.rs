use parking_lot::ReentrantMutex;
use std::{
    any::type_name,
    cell::RefCell,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};
use tracing::{debug, debug_span, error, info_span};

use crate::{
    any::Instance,
    autowire::{self, Injectable, MemberInfo},
    config::Config,
    errors::ResolveErrorKind,
    instantiator::downcast,
    metadata::MetadataCache,
    provider::Provider,
    registry::Registry,
    resolver::{self, ResolutionStack},
    token::{Chain, Token},
};

pub(crate) struct State {
    pub(crate) registry: Registry,
    pub(crate) stack: ResolutionStack,
}

/// Registry of providers and their memoized singletons.
///
/// Every injector is independent: providers, singletons and the resolution stack aren't shared between injectors.
///
/// The injector is [`Send`] and [`Sync`]. A resolution (or a manual construction) holds the injector for its whole
/// duration, so resolutions from different threads are serialized, while nested resolutions on the same thread
/// (factory dependencies, autowired members) re-enter it.
pub struct Injector {
    pub(crate) state: ReentrantMutex<RefCell<State>>,
    metadata: MetadataCache,
    config: Config,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[inline]
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(State {
                registry: Registry::new(),
                stack: ResolutionStack::new(),
            })),
            metadata: MetadataCache::new(),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Registers `provider` for `token`, replacing the provider registered before.
    ///
    /// # Warning
    /// If `token` was already resolved, its memoized value is kept by default, so the new provider isn't used.
    /// See [`crate::ReplacePolicy`].
    pub fn provide(&self, token: impl Into<Token>, provider: Provider) -> &Self {
        let token = token.into();
        self.state
            .lock()
            .borrow_mut()
            .registry
            .provide(token, provider, self.config.replace_policy);
        self
    }

    /// Registers `T` as a class provider under its own type token.
    #[inline]
    pub fn provide_class<T: Injectable + Default>(&self) -> &Self {
        self.provide(Token::of::<T>(), Provider::class::<T>())
    }

    /// Resolves the singleton registered for `token`.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::DependencyNotFound`] if `token` or one of its required dependencies isn't provided
    /// - [`ResolveErrorKind::CircularDependency`] if `token` depends on itself
    /// - [`ResolveErrorKind::IncorrectType`] if the value isn't a `T`
    /// - [`ResolveErrorKind::ArgumentCount`] and [`ResolveErrorKind::Instantiate`] if a factory or an `init` failed
    pub fn resolve<T: Send + Sync + 'static>(&self, token: impl Into<Token>) -> Result<Arc<T>, ResolveErrorKind> {
        let token = token.into();
        let span = info_span!("resolve", %token, dependency = type_name::<T>());
        let _guard = span.enter();

        match self.resolve_instance(&token, false)? {
            Some(instance) => downcast(&token, instance).map_err(|err| self.fail(err)),
            None => Err(self.fail(ResolveErrorKind::DependencyNotFound {
                token,
                chain: Chain::default(),
            })),
        }
    }

    /// Resolves the singleton registered for `token`, or `None` if nothing is registered.
    ///
    /// # Errors
    /// The same as [`Self::resolve`], except that an unregistered `token` isn't an error.
    /// Missing dependencies of a registered `token` are still errors.
    pub fn resolve_optional<T: Send + Sync + 'static>(&self, token: impl Into<Token>) -> Result<Option<Arc<T>>, ResolveErrorKind> {
        let token = token.into();
        let span = info_span!("resolve_optional", %token, dependency = type_name::<T>());
        let _guard = span.enter();

        self.resolve_instance(&token, true)?
            .map(|instance| downcast(&token, instance).map_err(|err| self.fail(err)))
            .transpose()
    }

    /// Resolves the type-erased singleton registered for `token`.
    ///
    /// # Errors
    /// See [`Self::resolve`]
    #[inline]
    pub fn resolve_instance(&self, token: &Token, optional: bool) -> Result<Option<Instance>, ResolveErrorKind> {
        resolver::resolve(self, token, optional)
    }

    /// Resolves the singleton registered under the type token of `T`.
    ///
    /// # Errors
    /// See [`Self::resolve`]
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.resolve(Token::of::<T>())
    }

    /// Constructs a new `T` from [`Default`] with its autowired members. The instance isn't memoized.
    ///
    /// # Errors
    /// See [`Self::construct_with`]
    #[inline]
    pub fn construct<T: Injectable + Default>(&self) -> Result<T, ResolveErrorKind> {
        self.construct_with(T::default)
    }

    /// Constructs a new `T` from `allocate` with its autowired members, then runs [`Injectable::init`].
    /// The instance isn't memoized, but its members are resolved as singletons.
    ///
    /// # Errors
    /// - Any error of resolving an autowired member, see [`Self::resolve`]
    /// - [`ResolveErrorKind::Instantiate`] if [`Injectable::init`] failed
    pub fn construct_with<T: Injectable>(&self, allocate: impl FnOnce() -> T) -> Result<T, ResolveErrorKind> {
        let span = debug_span!("construct", r#type = type_name::<T>());
        let _guard = span.enter();

        // Held until all members are resolved
        let _state = self.state.lock();

        let members = self.metadata.members::<T>();
        let mut instance = allocate();

        let result = autowire::apply(self, &mut instance, &members).and_then(|()| {
            instance.init().map_err(|source| ResolveErrorKind::Instantiate {
                token: Token::of::<T>(),
                source,
            })
        });
        match result {
            Ok(()) => {
                debug!("Constructed");
                Ok(instance)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Autowired members of `T`, in the order they're assigned.
    #[must_use]
    pub fn members<T: Injectable>(&self) -> Vec<MemberInfo> {
        self.metadata.members::<T>().iter().cloned().collect()
    }

    /// Discards all providers and memoized singletons, and clears the resolution stack.
    pub fn reset(&self) {
        let state = self.state.lock();
        let mut state = state.borrow_mut();
        state.registry.reset();
        state.stack.clear();

        debug!("Injector reset");
    }

    #[must_use]
    pub fn contains(&self, token: impl Into<Token>) -> bool {
        self.state.lock().borrow().registry.contains(&token.into())
    }

    /// Whether a value is memoized for `token`.
    #[must_use]
    pub fn is_resolved(&self, token: impl Into<Token>) -> bool {
        self.state
            .lock()
            .borrow()
            .registry
            .get(&token.into())
            .is_some_and(|entry| entry.value.is_some())
    }

    /// Number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().borrow().registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of resolutions in flight. Zero outside of a resolution, including after a failed one.
    #[must_use]
    pub fn resolution_depth(&self) -> usize {
        self.state.lock().borrow().stack.len()
    }

    fn fail(&self, err: ResolveErrorKind) -> ResolveErrorKind {
        self.state.lock().borrow_mut().stack.clear();
        error!("{}", err);
        err
    }
}

impl Debug for Injector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("providers", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
