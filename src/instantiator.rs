use std::{any::type_name, sync::Arc, vec::IntoIter};
use tracing::debug;

use crate::{
    any::Instance,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    token::Token,
};

/// Conversion of a resolved (possibly absent) dependency into a typed argument.
///
/// `Arc<T>` requires the dependency to be present, `Option<Arc<T>>` accepts absence.
pub trait FromInstance: Sized {
    /// # Errors
    /// - [`ResolveErrorKind::DependencyNotFound`] if the dependency is absent but required by the argument type
    /// - [`ResolveErrorKind::IncorrectType`] if the value isn't of the argument type
    fn from_instance(token: &Token, instance: Option<Instance>) -> Result<Self, ResolveErrorKind>;
}

impl<T: Send + Sync + 'static> FromInstance for Arc<T> {
    fn from_instance(token: &Token, instance: Option<Instance>) -> Result<Self, ResolveErrorKind> {
        match instance {
            Some(instance) => downcast(token, instance),
            None => Err(ResolveErrorKind::DependencyNotFound {
                token: token.clone(),
                chain: Default::default(),
            }),
        }
    }
}

impl<T: Send + Sync + 'static> FromInstance for Option<Arc<T>> {
    fn from_instance(token: &Token, instance: Option<Instance>) -> Result<Self, ResolveErrorKind> {
        instance.map(|instance| downcast(token, instance)).transpose()
    }
}

pub(crate) fn downcast<T: Send + Sync + 'static>(token: &Token, instance: Instance) -> Result<Arc<T>, ResolveErrorKind> {
    instance.downcast::<T>().map_err(|_| ResolveErrorKind::IncorrectType {
        token: token.clone(),
        expected: type_name::<T>(),
    })
}

/// Positional values of a factory's declared dependencies.
pub struct Arguments {
    pub(crate) token: Token,
    pub(crate) values: Vec<(Token, Option<Instance>)>,
}

impl Arguments {
    #[inline]
    #[must_use]
    pub(crate) fn new(token: Token, values: Vec<(Token, Option<Instance>)>) -> Self {
        Self { token, values }
    }

    fn into_values(self) -> (Token, IntoIter<(Token, Option<Instance>)>) {
        (self.token, self.values.into_iter())
    }
}

pub trait FromArguments: Sized {
    const ARITY: usize;

    /// # Errors
    /// Returns an error if a value can't be converted to its argument type
    fn from_arguments(arguments: Arguments) -> Result<Self, ResolveErrorKind>;
}

macro_rules! impl_from_arguments {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<$($ty,)*> FromArguments for ($($ty,)*)
        where
            $( $ty: FromInstance, )*
        {
            const ARITY: usize = count_idents!($($ty),*);

            fn from_arguments(arguments: Arguments) -> Result<Self, ResolveErrorKind> {
                let declared = arguments.values.len();
                let (token, mut values) = arguments.into_values();
                $(
                    let $ty = match values.next() {
                        Some((dependency, instance)) => $ty::from_instance(&dependency, instance)?,
                        None => {
                            return Err(ResolveErrorKind::ArgumentCount {
                                token,
                                declared,
                                expected: Self::ARITY,
                            })
                        }
                    };
                )*
                Ok(($($ty,)*))
            }
        }
    };
}

all_the_tuples!(impl_from_arguments);

/// Callable producing a value from positional, typed dependencies.
///
/// Implemented for every `Fn(T1, ..., Tn) -> Result<Response, Err>` where each argument is [`FromInstance`].
pub trait Factory<Args>: Send + Sync + 'static {
    type Provides: Send + Sync + 'static;
    type Error: Into<InstantiateErrorKind>;

    fn create(&self, args: Args) -> Result<Self::Provides, Self::Error>;
}

macro_rules! impl_factory {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Factory<($($ty,)*)> for F
        where
            F: Fn($($ty,)*) -> Result<Response, Err> + Send + Sync + 'static,
            Response: Send + Sync + 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: FromInstance, )*
        {
            type Provides = Response;
            type Error = Err;

            #[inline]
            fn create(&self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_factory);

pub(crate) type BoxedFactory = Arc<dyn Fn(Arguments) -> Result<Instance, ResolveErrorKind> + Send + Sync>;

#[must_use]
pub(crate) fn boxed_factory<F, Args>(factory: F) -> BoxedFactory
where
    F: Factory<Args>,
    Args: FromArguments,
{
    Arc::new(move |arguments: Arguments| {
        let token = arguments.token.clone();
        let args = Args::from_arguments(arguments)?;
        match factory.create(args) {
            Ok(value) => {
                debug!("Created");
                Ok(Arc::new(value) as Instance)
            }
            Err(err) => Err(ResolveErrorKind::Instantiate {
                token,
                source: err.into(),
            }),
        }
    })
}
