use autowire::{
    Dependency, Injectable, Injector, InstantiateErrorKind, Members, Provider, ResolveErrorKind, Token, TypeInfo,
};
use std::{sync::Arc, thread};

struct ServiceA {
    id: &'static str,
}

impl Default for ServiceA {
    fn default() -> Self {
        Self { id: "A" }
    }
}

impl Injectable for ServiceA {}

struct ServiceB {
    a: Option<Arc<ServiceA>>,
    id: &'static str,
}

impl Default for ServiceB {
    fn default() -> Self {
        Self { a: None, id: "B" }
    }
}

impl Injectable for ServiceB {
    fn autowire(members: &mut Members<Self>) {
        members.field("a", Token::of::<ServiceA>(), |this: &mut Self, a| this.a = Some(a));
    }
}

#[derive(Default)]
struct ServiceC {
    id: &'static str,
}

impl Injectable for ServiceC {
    fn init(&mut self) -> Result<(), InstantiateErrorKind> {
        self.id = "C";
        Ok(())
    }
}

#[derive(Default)]
#[allow(dead_code)]
struct ServiceD {
    f: Option<Arc<ServiceF>>,
}

impl Injectable for ServiceD {
    fn autowire(members: &mut Members<Self>) {
        members.field("f", "service-f", |this: &mut Self, f| this.f = Some(f));
    }
}

#[derive(Default)]
#[allow(dead_code)]
struct ServiceE {
    d: Option<Arc<ServiceD>>,
}

impl Injectable for ServiceE {
    fn autowire(members: &mut Members<Self>) {
        members.field("d", Token::of::<ServiceD>(), |this: &mut Self, d| this.d = Some(d));
    }
}

#[derive(Default)]
#[allow(dead_code)]
struct ServiceF {
    e: Option<Arc<ServiceE>>,
}

impl Injectable for ServiceF {
    fn autowire(members: &mut Members<Self>) {
        members.field("e", Token::of::<ServiceE>(), |this: &mut Self, e| this.e = Some(e));
    }
}

#[derive(Default)]
struct ServiceG {
    b: Option<Arc<ServiceB>>,
}

impl Injectable for ServiceG {
    fn autowire(members: &mut Members<Self>) {
        members.field("b", Token::of::<ServiceB>(), |this: &mut Self, b| this.b = Some(b));
    }
}

#[derive(Default)]
struct ServiceH {
    g: Option<Arc<ServiceG>>,
    custom_param: String,
}

impl Injectable for ServiceH {
    fn autowire(members: &mut Members<Self>) {
        members.field("g", Token::of::<ServiceG>(), |this: &mut Self, g| this.g = Some(g));
    }
}

/// Token only, registered with the provider of [`ServiceH`]
struct ServiceI;

#[derive(Default)]
struct ServiceJ {
    b: Option<Arc<ServiceB>>,
}

impl Injectable for ServiceJ {}

fn factory_j(b: Arc<ServiceB>) -> Result<ServiceJ, InstantiateErrorKind> {
    Ok(ServiceJ { b: Some(b) })
}

#[derive(Default)]
struct Unit {
    i: Option<Arc<ServiceH>>,
    b: Option<Arc<ServiceB>>,
    c: Option<Arc<ServiceC>>,
    j: Option<Arc<ServiceJ>>,
    j2: Option<Arc<ServiceJ>>,
}

impl Injectable for Unit {
    fn autowire(members: &mut Members<Self>) {
        members
            .field("i", Token::of::<ServiceI>(), |this: &mut Self, i| this.i = Some(i))
            .field("b", Token::of::<ServiceB>(), |this: &mut Self, b| this.b = Some(b))
            .field("c", "my-service", |this: &mut Self, c| this.c = Some(c))
            .field("j", Token::of::<ServiceJ>(), |this: &mut Self, j| this.j = Some(j))
            .field("j2", "service-j", |this: &mut Self, j2| this.j2 = Some(j2));
    }
}

#[derive(Default)]
struct Base {
    a: Option<Arc<ServiceA>>,
    extra: Option<Arc<String>>,
}

impl Injectable for Base {
    fn autowire(members: &mut Members<Self>) {
        members
            .field("a", Token::of::<ServiceA>(), |this: &mut Self, a| this.a = Some(a))
            .optional_field("extra", "extra", |this: &mut Self, extra| this.extra = extra);
    }
}

#[derive(Default)]
struct Derived {
    base: Base,
    b: Option<Arc<ServiceB>>,
    ready: bool,
}

impl Injectable for Derived {
    fn autowire(members: &mut Members<Self>) {
        members
            .inherit::<Base>(|this| &mut this.base)
            .field("b", Token::of::<ServiceB>(), |this: &mut Self, b| this.b = Some(b));
    }

    fn init(&mut self) -> Result<(), InstantiateErrorKind> {
        self.ready = self.base.a.is_some() && self.b.is_some();
        Ok(())
    }
}

fn injector() -> Injector {
    let injector = Injector::new();
    injector
        .provide_class::<ServiceA>()
        .provide_class::<ServiceB>()
        .provide("my-service", Provider::class::<ServiceC>())
        .provide_class::<ServiceD>()
        .provide_class::<ServiceE>()
        .provide("service-f", Provider::class::<ServiceF>())
        .provide_class::<ServiceG>()
        .provide_class::<ServiceH>()
        .provide(Token::of::<ServiceI>(), Provider::class::<ServiceH>())
        .provide(
            Token::of::<ServiceJ>(),
            Provider::factory([Token::of::<ServiceB>()], factory_j),
        )
        .provide("service-j", Provider::class::<ServiceJ>());
    injector
}

fn assert_b(b: &ServiceB) {
    assert_eq!(b.id, "B");
    assert_eq!(b.a.as_ref().unwrap().id, "A");
}

fn assert_g(g: &ServiceG) {
    assert_b(g.b.as_ref().unwrap());
}

#[test]
fn test_direct_injection() {
    let injector = injector();
    let unit = injector.construct::<Unit>().unwrap();

    assert_b(unit.b.as_ref().unwrap());
    assert!(Arc::ptr_eq(unit.b.as_ref().unwrap(), &injector.get::<ServiceB>().unwrap()));
}

#[test]
fn test_key_injection() {
    let injector = injector();
    let unit = injector.construct::<Unit>().unwrap();

    assert_eq!(unit.c.as_ref().unwrap().id, "C");
    assert!(!injector.contains(Token::of::<ServiceC>()));
}

#[test]
fn test_construct_without_provider() {
    let injector = injector();
    let g = injector.construct::<ServiceG>().unwrap();

    assert_g(&g);
    assert!(!Arc::ptr_eq(&Arc::new(g), &injector.get::<ServiceG>().unwrap()));
}

#[test]
fn test_construct_with_custom_param() {
    let injector = injector();
    let h = injector
        .construct_with(|| ServiceH {
            g: None,
            custom_param: "abc".to_owned(),
        })
        .unwrap();

    assert_g(h.g.as_ref().unwrap());
    assert_eq!(h.custom_param, "abc");
}

#[test]
fn test_circular_dependency() {
    let injector = injector();

    let err = injector.construct::<ServiceF>().err().unwrap();
    let ResolveErrorKind::CircularDependency { token, chain } = &err else {
        panic!("unexpected error: {err}");
    };

    assert_eq!(*token, Token::of::<ServiceE>());
    assert_eq!(
        chain.tokens(),
        [Token::of::<ServiceE>(), Token::of::<ServiceD>(), Token::key("service-f")]
    );
    assert_eq!(injector.resolution_depth(), 0);
    assert!(!injector.is_resolved(Token::of::<ServiceE>()));
    assert!(!injector.is_resolved("service-f"));

    assert!(matches!(
        injector.get::<ServiceD>(),
        Err(ResolveErrorKind::CircularDependency { .. })
    ));
    assert_eq!(injector.resolution_depth(), 0);
}

#[test]
fn test_drop_in_replacement() {
    let injector = injector();
    let unit = injector.construct::<Unit>().unwrap();

    assert_g(unit.i.as_ref().unwrap().g.as_ref().unwrap());
    assert!(!Arc::ptr_eq(unit.i.as_ref().unwrap(), &injector.get::<ServiceH>().unwrap()));
    assert!(matches!(
        injector.resolve::<ServiceI>(Token::of::<ServiceI>()),
        Err(ResolveErrorKind::IncorrectType { .. })
    ));
}

#[test]
fn test_factories() {
    let injector = injector();
    let unit = injector.construct::<Unit>().unwrap();

    let j = unit.j.as_ref().unwrap();
    assert_b(j.b.as_ref().unwrap());
    assert!(Arc::ptr_eq(j.b.as_ref().unwrap(), unit.b.as_ref().unwrap()));

    let j2 = unit.j2.as_ref().unwrap();
    assert!(j2.b.is_none());
    assert!(!Arc::ptr_eq(j, j2));
}

#[test]
fn test_manual_provide_value() {
    let injector = injector();

    assert!(injector.resolve_optional::<&str>("A").unwrap().is_none());

    injector.provide("A", Provider::value("abc"));

    assert_eq!(*injector.resolve::<&str>("A").unwrap(), "abc");
}

#[test]
fn test_replace_before_resolution() {
    let injector = injector();
    injector.provide(Token::of::<ServiceJ>(), Provider::class::<ServiceJ>());

    assert!(injector.get::<ServiceJ>().unwrap().b.is_none());
    assert!(!injector.is_resolved(Token::of::<ServiceB>()));
}

#[test]
fn test_inherited_and_optional_members() {
    let injector = injector();
    injector.provide_class::<Derived>();

    let derived = injector.get::<Derived>().unwrap();

    assert!(Arc::ptr_eq(derived.base.a.as_ref().unwrap(), &injector.get::<ServiceA>().unwrap()));
    assert!(derived.base.extra.is_none());
    assert_b(derived.b.as_ref().unwrap());
    assert!(derived.ready);
    assert_eq!(injector.resolution_depth(), 0);

    let members = injector.members::<Derived>();
    assert_eq!(
        members.iter().map(|info| (info.name, info.optional, info.declared_by)).collect::<Vec<_>>(),
        [
            ("a", false, TypeInfo::of::<Base>()),
            ("extra", true, TypeInfo::of::<Base>()),
            ("b", false, TypeInfo::of::<Derived>()),
        ]
    );
}

#[test]
fn test_optional_member_provided_later() {
    let injector = injector();

    assert!(injector.construct::<Derived>().unwrap().base.extra.is_none());

    injector.provide("extra", Provider::value("more".to_owned()));

    let derived = injector.construct::<Derived>().unwrap();
    assert_eq!(derived.base.extra.as_deref().map(String::as_str), Some("more"));
}

#[test]
fn test_inherited_member_missing() {
    let injector = Injector::new();
    injector.provide_class::<Derived>().provide_class::<ServiceB>();

    let err = injector.get::<Derived>().err().unwrap();
    let ResolveErrorKind::DependencyNotFound { token, chain } = &err else {
        panic!("unexpected error: {err}");
    };

    assert_eq!(*token, Token::of::<ServiceA>());
    assert_eq!(chain.tokens(), [Token::of::<Derived>()]);
    assert!(!injector.is_resolved(Token::of::<Derived>()));
    assert_eq!(injector.resolution_depth(), 0);
}

#[test]
fn test_reset() {
    let injector = injector();
    let _ = injector.get::<ServiceG>().unwrap();

    injector.reset();

    assert!(injector.is_empty());
    assert!(matches!(
        injector.get::<ServiceB>(),
        Err(ResolveErrorKind::DependencyNotFound { .. })
    ));
    assert!(matches!(
        injector.construct::<ServiceG>(),
        Err(ResolveErrorKind::DependencyNotFound { .. })
    ));
}

#[test]
fn test_optional_dependencies() {
    let injector = Injector::new();
    injector.provide(
        "greeting",
        Provider::factory(
            [Dependency::required("name"), Dependency::optional("suffix")],
            |name: Arc<String>, suffix: Option<Arc<String>>| {
                Ok(format!("hello {name}{}", suffix.as_deref().map_or("", String::as_str)))
            },
        ),
    );

    assert!(matches!(
        injector.resolve::<String>("greeting"),
        Err(ResolveErrorKind::DependencyNotFound { token, .. }) if token == Token::key("name")
    ));

    injector.provide("name", Provider::value("world".to_owned()));

    assert_eq!(*injector.resolve::<String>("greeting").unwrap(), "hello world");
}

#[test]
fn test_concurrent_get() {
    let injector = Arc::new(injector());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let injector = injector.clone();
            thread::spawn(move || injector.get::<ServiceG>().unwrap())
        })
        .collect();
    let services: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    assert!(services.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_g(&services[0]);
    assert_eq!(injector.resolution_depth(), 0);
}
