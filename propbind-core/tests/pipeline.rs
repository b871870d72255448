use std::sync::Arc;

use propbind_cache::{CacheStrategy, ConcurrentMapCache, WeakKeyCache};
use propbind_core::{
    AccessorDescriptor, AccessorSpec, MapResolver, PropError, PropValue, PropertyBinder,
    TypeKind, TypeRef,
};

type MapCache = ConcurrentMapCache<Arc<AccessorDescriptor>, PropValue>;

fn properties(entries: &[(&str, &str)]) -> Arc<MapResolver> {
    let resolver = MapResolver::new();
    for (name, value) in entries {
        resolver.insert(*name, *value);
    }
    Arc::new(resolver)
}

fn binder_over(resolver: Arc<MapResolver>) -> PropertyBinder {
    PropertyBinder::builder()
        .resolver_arc(resolver)
        .default_converters()
        .build()
}

#[test]
fn test_resolve_and_convert() {
    let binder = binder_over(properties(&[("server.port", "8080")]));
    let port = binder.register(AccessorSpec::new("server.port", TypeRef::new(TypeKind::U16)));

    assert_eq!(binder.invoke(port).unwrap(), PropValue::UInt(8080));
    assert_eq!(binder.get::<u16>(port).unwrap(), 8080);
}

#[test]
fn test_string_accessor_returns_raw_text() {
    let binder = binder_over(properties(&[("app.name", "my-app")]));
    let name = binder.register(AccessorSpec::new("app.name", TypeRef::string()));
    assert_eq!(binder.get::<String>(name).unwrap(), "my-app");
}

#[test]
fn test_name_template_expansion_uses_the_chain() {
    let binder = binder_over(properties(&[
        ("env", "prod"),
        ("prod.host", "prod.example.com"),
    ]));
    let host = binder.register(AccessorSpec::new("${env}.host", TypeRef::string()));
    assert_eq!(binder.get::<String>(host).unwrap(), "prod.example.com");
}

#[test]
fn test_name_template_expansion_failure() {
    let binder = binder_over(properties(&[]));
    let host = binder.register(AccessorSpec::new("${env}.host", TypeRef::string()));
    match binder.invoke(host).unwrap_err() {
        PropError::Expansion { reference } => assert_eq!(reference, "env"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unresolved_without_fallback_names_the_property() {
    let binder = binder_over(properties(&[]));
    let missing = binder.register(AccessorSpec::new("db.url", TypeRef::string()));
    match binder.invoke(missing).unwrap_err() {
        PropError::Unresolved { property } => assert_eq!(property, "db.url"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_typed_fallback_used_without_conversion() {
    let binder = binder_over(properties(&[]));
    let retries = binder.register(
        AccessorSpec::new("client.retries", TypeRef::new(TypeKind::I32))
            .with_fallback(PropValue::Int(3)),
    );
    assert_eq!(binder.get::<i32>(retries).unwrap(), 3);
}

#[test]
fn test_raw_fallback_is_converted() {
    let binder = binder_over(properties(&[]));
    let sizes = binder.register(
        AccessorSpec::new("pool.sizes", TypeRef::list_of(TypeRef::new(TypeKind::U32)))
            .with_raw_fallback("1,2,4"),
    );
    assert_eq!(binder.get::<Vec<u32>>(sizes).unwrap(), vec![1, 2, 4]);
}

#[test]
fn test_fallback_provider_computed_on_demand() {
    let binder = binder_over(properties(&[]));
    let port = binder.register(
        AccessorSpec::new("server.port", TypeRef::new(TypeKind::U16))
            .with_fallback_provider(|| PropValue::UInt(8080)),
    );
    assert_eq!(binder.get::<u16>(port).unwrap(), 8080);
}

#[test]
fn test_resolved_value_beats_fallback() {
    let binder = binder_over(properties(&[("client.retries", "9")]));
    let retries = binder.register(
        AccessorSpec::new("client.retries", TypeRef::new(TypeKind::I32))
            .with_fallback(PropValue::Int(3)),
    );
    assert_eq!(binder.get::<i32>(retries).unwrap(), 9);
}

// ---------------------------------------------------------------------------
// Optional-wrapped accessors
// ---------------------------------------------------------------------------

#[test]
fn test_optional_accessor_swallows_absence() {
    let binder = binder_over(properties(&[]));
    let timeout = binder.register(AccessorSpec::new(
        "client.timeout",
        TypeRef::optional_of(TypeRef::new(TypeKind::I64)),
    ));
    assert_eq!(binder.invoke(timeout).unwrap(), PropValue::Optional(None));
    assert_eq!(binder.get::<Option<i64>>(timeout).unwrap(), None);
}

#[test]
fn test_optional_accessor_resolved_empty_is_present() {
    // "resolved to empty string" must not be conflated with "unresolved".
    let binder = binder_over(properties(&[("banner.text", "")]));
    let banner = binder.register(AccessorSpec::new(
        "banner.text",
        TypeRef::optional_of(TypeRef::string()),
    ));
    assert_eq!(
        binder.invoke(banner).unwrap(),
        PropValue::Optional(Some(Box::new(PropValue::Str(String::new()))))
    );
    assert_eq!(
        binder.get::<Option<String>>(banner).unwrap(),
        Some(String::new())
    );
}

#[test]
fn test_optional_accessor_still_propagates_conversion_failure() {
    let binder = binder_over(properties(&[("client.timeout", "abc")]));
    let timeout = binder.register(AccessorSpec::new(
        "client.timeout",
        TypeRef::optional_of(TypeRef::new(TypeKind::I64)),
    ));
    assert!(matches!(
        binder.invoke(timeout).unwrap_err(),
        PropError::Conversion { .. }
    ));
}

// ---------------------------------------------------------------------------
// Per-accessor directives
// ---------------------------------------------------------------------------

#[test]
fn test_accessor_delimiter_override() {
    let binder = binder_over(properties(&[("paths", "/a;/b")]));
    let paths = binder.register(
        AccessorSpec::new("paths", TypeRef::new(TypeKind::List)).with_delimiter(';'),
    );
    assert_eq!(
        binder.get::<Vec<String>>(paths).unwrap(),
        vec!["/a".to_string(), "/b".to_string()]
    );
}

#[test]
fn test_accessor_strip_empty() {
    let binder = binder_over(properties(&[("tags", "a,,b")]));
    let tags = binder
        .register(AccessorSpec::new("tags", TypeRef::new(TypeKind::List)).strip_empty());
    assert_eq!(
        binder.get::<Vec<String>>(tags).unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Caching
// ---------------------------------------------------------------------------

#[test]
fn test_cached_result_survives_resolver_mutation() {
    let resolver = properties(&[("flag", "first")]);
    let binder = PropertyBinder::builder()
        .resolver_arc(resolver.clone())
        .default_converters()
        .cache(Arc::new(MapCache::new()))
        .build();
    let flag = binder.register(AccessorSpec::new("flag", TypeRef::string()));

    assert_eq!(binder.get::<String>(flag).unwrap(), "first");
    resolver.insert("flag", "second");
    // At most one computation per key while the entry is alive.
    assert_eq!(binder.get::<String>(flag).unwrap(), "first");

    binder.expire(flag);
    assert_eq!(binder.get::<String>(flag).unwrap(), "second");
}

#[test]
fn test_expire_all_clears_every_accessor() {
    let resolver = properties(&[("a", "1"), ("b", "2")]);
    let binder = PropertyBinder::builder()
        .resolver_arc(resolver.clone())
        .default_converters()
        .cache(Arc::new(MapCache::new()))
        .build();
    let a = binder.register(AccessorSpec::new("a", TypeRef::string()));
    let b = binder.register(AccessorSpec::new("b", TypeRef::string()));
    assert_eq!(binder.get::<String>(a).unwrap(), "1");
    assert_eq!(binder.get::<String>(b).unwrap(), "2");

    resolver.insert("a", "10");
    resolver.insert("b", "20");
    binder.expire_all();
    assert_eq!(binder.get::<String>(a).unwrap(), "10");
    assert_eq!(binder.get::<String>(b).unwrap(), "20");
}

#[test]
fn test_weak_key_cache_entry_follows_descriptor_lifetime() {
    let resolver = properties(&[("flag", "first")]);
    let cache: Arc<WeakKeyCache<propbind_core::AccessorDescriptor, PropValue>> =
        Arc::new(WeakKeyCache::new());
    let binder = PropertyBinder::builder()
        .resolver_arc(resolver.clone())
        .default_converters()
        .cache(cache.clone())
        .build();

    let flag = binder.register(AccessorSpec::new("flag", TypeRef::string()));
    assert_eq!(binder.get::<String>(flag).unwrap(), "first");

    let descriptor = binder.descriptor(flag).unwrap();
    assert_eq!(
        cache.get(&descriptor),
        Some(PropValue::Str("first".to_string()))
    );

    // Unregistering drops the last strong reference; the entry is purged on
    // the next cache operation.
    drop(descriptor);
    binder.unregister(flag);
    let ghost = binder.descriptor(flag);
    assert!(ghost.is_none());
}

#[test]
fn test_without_cache_every_invocation_re_resolves() {
    let resolver = properties(&[("flag", "first")]);
    let binder = binder_over(Arc::clone(&resolver));
    let flag = binder.register(AccessorSpec::new("flag", TypeRef::string()));

    assert_eq!(binder.get::<String>(flag).unwrap(), "first");
    resolver.insert("flag", "second");
    assert_eq!(binder.get::<String>(flag).unwrap(), "second");
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn test_unregistered_accessor_is_a_contract_error() {
    let binder = binder_over(properties(&[("a", "1")]));
    let a = binder.register(AccessorSpec::new("a", TypeRef::string()));
    binder.unregister(a);
    assert!(matches!(
        binder.invoke(a).unwrap_err(),
        PropError::Contract(_)
    ));
}

#[test]
fn test_concurrent_invocations_share_the_binder() {
    let binder = binder_over(properties(&[("shared", "same-value")]));
    let shared = binder.register(AccessorSpec::new("shared", TypeRef::string()));

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| binder.get::<String>(shared).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "same-value");
        }
    });
}
