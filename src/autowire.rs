use std::sync::Arc;
use tracing::debug;

use crate::{
    any::{Instance, TypeInfo},
    errors::{InstantiateErrorKind, ResolveErrorKind},
    injector::Injector,
    instantiator::FromInstance,
    token::Token,
};

/// Type constructible by the injector.
///
/// Construction is two-phase: the instance is allocated (with [`Default`] for class providers),
/// then every member declared in [`Injectable::autowire`] is assigned its resolved dependency,
/// and only then [`Injectable::init`] runs, so `init` can rely on autowired members.
///
/// # Example
/// ```rust
/// use autowire::{Injectable, Injector, Members, Token};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct ServiceA {
///     id: &'static str,
/// }
///
/// impl Injectable for ServiceA {
///     fn init(&mut self) -> Result<(), autowire::InstantiateErrorKind> {
///         self.id = "A";
///         Ok(())
///     }
/// }
///
/// #[derive(Default)]
/// struct ServiceB {
///     a: Option<Arc<ServiceA>>,
/// }
///
/// impl Injectable for ServiceB {
///     fn autowire(members: &mut Members<Self>) {
///         members.field("a", Token::of::<ServiceA>(), |this: &mut Self, a| this.a = Some(a));
///     }
/// }
///
/// let injector = Injector::new();
/// injector.provide_class::<ServiceA>().provide_class::<ServiceB>();
///
/// let b = injector.get::<ServiceB>().unwrap();
/// assert_eq!(b.a.as_ref().unwrap().id, "A");
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Declares the autowired members. Called once per type and injector, the result is cached.
    #[allow(unused_variables)]
    fn autowire(members: &mut Members<Self>) {}

    /// Initialization running after the autowired members are assigned.
    ///
    /// # Errors
    /// Any error aborts the construction, nothing is memoized for the instance
    fn init(&mut self) -> Result<(), InstantiateErrorKind> {
        Ok(())
    }
}

/// Autowired member, as declared by its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: &'static str,
    pub token: Token,
    pub optional: bool,
    /// Type whose [`Injectable::autowire`] introduced the member
    pub declared_by: TypeInfo,
}

type Assign<T> = Arc<dyn Fn(&mut T, &Token, Option<Instance>) -> Result<(), ResolveErrorKind> + Send + Sync>;

pub(crate) struct Member<T> {
    pub(crate) info: MemberInfo,
    assign: Assign<T>,
}

/// Ordered table of the autowired members of `T`.
pub struct Members<T> {
    members: Vec<Member<T>>,
}

impl<T: Injectable> Members<T> {
    #[must_use]
    pub(crate) fn declared() -> Self {
        let mut members = Self { members: Vec::new() };
        T::autowire(&mut members);
        members
    }

    /// Declares a required member: construction fails if `token` can't be resolved.
    ///
    /// `V` is the assigned type, usually `Arc<Dep>`.
    pub fn field<V, F>(&mut self, name: &'static str, token: impl Into<Token>, assign: F) -> &mut Self
    where
        V: FromInstance,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push(name, token.into(), false, assign)
    }

    /// Declares an optional member: an unregistered `token` is passed as absent.
    ///
    /// `V` is the assigned type, usually `Option<Arc<Dep>>`.
    pub fn optional_field<V, F>(&mut self, name: &'static str, token: impl Into<Token>, assign: F) -> &mut Self
    where
        V: FromInstance,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push(name, token.into(), true, assign)
    }

    /// Reuses the members declared by the embedded `B`, keeping `B` as their declaring type.
    pub fn inherit<B: Injectable>(&mut self, project: fn(&mut T) -> &mut B) -> &mut Self {
        for Member { info, assign } in Members::<B>::declared().members {
            self.members.push(Member {
                info,
                assign: Arc::new(move |this: &mut T, token: &Token, instance: Option<Instance>| {
                    assign(project(this), token, instance)
                }),
            });
        }
        self
    }

    fn push<V, F>(&mut self, name: &'static str, token: Token, optional: bool, assign: F) -> &mut Self
    where
        V: FromInstance,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.members.push(Member {
            info: MemberInfo {
                name,
                token,
                optional,
                declared_by: TypeInfo::of::<T>(),
            },
            assign: Arc::new(move |this: &mut T, token: &Token, instance: Option<Instance>| {
                assign(this, V::from_instance(token, instance)?);
                Ok(())
            }),
        });
        self
    }
}

impl<T> Members<T> {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberInfo> {
        self.members.iter().map(|member| &member.info)
    }
}

/// Assigns every declared member of `instance` its value resolved by `injector`, in declaration order.
pub(crate) fn apply<T>(injector: &Injector, instance: &mut T, members: &Members<T>) -> Result<(), ResolveErrorKind> {
    for Member { info, assign } in &members.members {
        let value = injector.resolve_instance(&info.token, info.optional)?;
        assign(instance, &info.token, value)?;

        debug!(member = info.name, token = %info.token, "Autowired");
    }
    Ok(())
}
