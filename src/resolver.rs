use std::cell::RefCell;
use tracing::{debug, debug_span, error, warn};

use crate::{
    any::Instance,
    dependency::Dependency,
    errors::ResolveErrorKind,
    injector::{Injector, State},
    instantiator::Arguments,
    provider::{ClassProvider, FactoryProvider, Provider, ValueProvider},
    registry::EntryId,
    token::{Chain, Token},
};

struct Frame {
    id: EntryId,
    token: Token,
}

/// Registry entries whose resolution is in flight, innermost last.
#[derive(Default)]
pub(crate) struct ResolutionStack {
    frames: Vec<Frame>,
}

impl ResolutionStack {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    #[inline]
    #[must_use]
    fn contains(&self, id: EntryId) -> bool {
        self.frames.iter().any(|frame| frame.id == id)
    }

    #[inline]
    fn push(&mut self, id: EntryId, token: Token) {
        self.frames.push(Frame { id, token });
    }

    /// Removes the frame of `id` and every frame above it.
    /// Nothing is removed if the frame is already gone, e.g. after the stack was cleared by a nested error.
    fn pop(&mut self, id: EntryId) {
        if let Some(position) = self.frames.iter().rposition(|frame| frame.id == id) {
            self.frames.truncate(position);
        }
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    fn chain(&self) -> Chain {
        Chain(self.frames.iter().map(|frame| frame.token.clone()).collect())
    }
}

/// Clears the stack if a factory or `init` panics, so later resolutions don't see stale frames.
struct UnwindGuard<'a> {
    state: &'a RefCell<State>,
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut state) = self.state.try_borrow_mut() {
                state.stack.clear();
            }
        }
    }
}

/// Resolves `token`, instantiating and memoizing its value on first use.
///
/// Returns `Ok(None)` only if `optional` is set and no provider is registered for `token`.
/// Any error clears the whole resolution stack before it's returned.
pub(crate) fn resolve(injector: &Injector, token: &Token, optional: bool) -> Result<Option<Instance>, ResolveErrorKind> {
    let span = debug_span!("resolve", %token, optional);
    let _span_guard = span.enter();

    // Held until the whole resolution completes, nested resolutions re-enter it
    let state = injector.state.lock();

    let (id, provider) = {
        let mut guard = state.borrow_mut();
        let State { registry, stack } = &mut *guard;

        let Some(entry) = registry.get(token) else {
            if optional {
                debug!("Not provided, resolved as absent");
                return Ok(None);
            }

            let err = ResolveErrorKind::DependencyNotFound {
                token: token.clone(),
                chain: stack.chain(),
            };
            stack.clear();
            error!("{}", err);
            return Err(err);
        };

        // Must precede the memoization check: an in-flight entry has no value yet
        if stack.contains(entry.id) {
            let err = ResolveErrorKind::CircularDependency {
                token: token.clone(),
                chain: stack.chain(),
            };
            stack.clear();
            error!("{}", err);
            return Err(err);
        }

        if let Some(value) = &entry.value {
            debug!("Found memoized");
            return Ok(Some(value.clone()));
        }

        stack.push(entry.id, token.clone());
        debug!(depth = stack.len(), "Resolution started");

        (entry.id, entry.provider.clone())
    };

    let result = {
        let _unwind_guard = UnwindGuard { state: &*state };
        instantiate(injector, token, provider)
    };

    let mut guard = state.borrow_mut();
    let State { registry, stack } = &mut *guard;
    match result {
        Ok(value) => {
            stack.pop(id);
            if registry.memoize(token, id, value.clone()) {
                debug!("Memoized");
            } else {
                warn!("Entry was removed during resolution, value isn't memoized");
            }
            Ok(Some(value))
        }
        Err(err) => {
            stack.clear();
            error!("{}", err);
            Err(err)
        }
    }
}

fn instantiate(injector: &Injector, token: &Token, provider: Provider) -> Result<Instance, ResolveErrorKind> {
    match provider {
        Provider::Value(ValueProvider { value, .. }) => Ok(value),
        Provider::Factory(FactoryProvider {
            dependencies,
            arity,
            factory,
            ..
        }) => {
            if dependencies.len() != arity {
                return Err(ResolveErrorKind::ArgumentCount {
                    token: token.clone(),
                    declared: dependencies.len(),
                    expected: arity,
                });
            }

            let mut values = Vec::with_capacity(dependencies.len());
            for Dependency {
                token: dependency,
                optional,
            } in dependencies.iter()
            {
                let value = resolve(injector, dependency, *optional)?;
                values.push((dependency.clone(), value));
            }

            factory(Arguments::new(token.clone(), values))
        }
        Provider::Class(ClassProvider { construct, .. }) => construct(injector),
    }
}
