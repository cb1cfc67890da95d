#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod autowire;
pub(crate) mod config;
pub(crate) mod dependency;
pub(crate) mod errors;
pub(crate) mod injector;
pub(crate) mod instantiator;
pub(crate) mod metadata;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod token;

pub use any::{Instance, TypeInfo};
pub use autowire::{Injectable, MemberInfo, Members};
pub use config::{Config, ReplacePolicy};
pub use dependency::Dependency;
pub use errors::{InstantiateErrorKind, ResolveErrorKind};
pub use injector::Injector;
pub use instantiator::{Arguments, Factory, FromArguments, FromInstance};
pub use provider::{ClassProvider, FactoryProvider, Provider, ValueProvider};
pub use token::{Chain, Token};
