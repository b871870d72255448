use std::sync::Arc;

use propbind_cache::ConcurrentMapCache;
use propbind_core::{
    CachingResolver, EnvResolver, MapResolver, PropError, Resolver, ResolverChain,
};
use serial_test::serial;

fn map_of(entries: &[(&str, &str)]) -> Arc<MapResolver> {
    let resolver = MapResolver::new();
    for (name, value) in entries {
        resolver.insert(*name, *value);
    }
    Arc::new(resolver)
}

#[test]
fn test_chain_first_present_wins() {
    let chain = ResolverChain::of(vec![map_of(&[("a", "1")]), map_of(&[("a", "2")])]);
    assert_eq!(chain.resolve("a").as_deref(), Some("1"));
}

#[test]
fn test_chain_falls_through_to_later_delegates() {
    let chain = ResolverChain::of(vec![map_of(&[("a", "1")]), map_of(&[("b", "2")])]);
    assert_eq!(chain.resolve("b").as_deref(), Some("2"));
}

#[test]
fn test_chain_absent_when_all_delegates_absent() {
    let chain = ResolverChain::of(vec![map_of(&[("a", "1")]), map_of(&[("b", "2")])]);
    assert_eq!(chain.resolve("c"), None);
}

#[test]
fn test_empty_chain_is_absent() {
    let chain = ResolverChain::new();
    assert_eq!(chain.resolve("anything"), None);
}

#[test]
fn test_chain_batch_partitions_names() {
    let chain = ResolverChain::of(vec![map_of(&[("a", "1")]), map_of(&[("a", "9"), ("b", "2")])]);
    let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let batch = chain.resolve_batch(&names);

    assert_eq!(batch.requested(), names.as_slice());
    assert_eq!(batch.find("a"), Some("1")); // first delegate wins
    assert_eq!(batch.find("b"), Some("2"));
    assert_eq!(batch.find("c"), None);
    assert_eq!(batch.unresolved(), ["c".to_string()].as_slice());
    assert!(batch.has_unresolved());
}

#[test]
fn test_batch_require_names_the_missing_property() {
    let chain = ResolverChain::of(vec![map_of(&[("a", "1")])]);
    let names: Vec<String> = vec!["a".to_string(), "missing.key".to_string()];
    let batch = chain.resolve_batch(&names);

    assert_eq!(batch.require("a").unwrap(), "1");
    match batch.require("missing.key").unwrap_err() {
        PropError::Unresolved { property } => assert_eq!(property, "missing.key"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
#[serial]
fn test_env_resolver_exact_name() {
    std::env::set_var("PROPBIND_TEST_EXACT", "from-env");
    assert_eq!(
        EnvResolver.resolve("PROPBIND_TEST_EXACT").as_deref(),
        Some("from-env")
    );
    std::env::remove_var("PROPBIND_TEST_EXACT");
}

#[test]
#[serial]
fn test_env_resolver_mangles_dotted_names() {
    std::env::set_var("PROPBIND_TEST_DATABASE_URL", "postgres://localhost/test");
    assert_eq!(
        EnvResolver
            .resolve("propbind.test.database-url")
            .as_deref(),
        Some("postgres://localhost/test")
    );
    std::env::remove_var("PROPBIND_TEST_DATABASE_URL");
}

#[test]
#[serial]
fn test_env_resolver_absent() {
    assert_eq!(EnvResolver.resolve("propbind.test.not.set"), None);
}

#[test]
fn test_caching_resolver_pins_first_value() {
    let backing = map_of(&[("a", "1")]);
    let caching = CachingResolver::new(
        Arc::clone(&backing) as Arc<dyn Resolver>,
        Arc::new(ConcurrentMapCache::<String, String>::new()),
    );

    assert_eq!(caching.resolve("a").as_deref(), Some("1"));
    backing.insert("a", "2");
    assert_eq!(caching.resolve("a").as_deref(), Some("1"));

    caching.expire("a");
    assert_eq!(caching.resolve("a").as_deref(), Some("2"));
}

#[test]
fn test_caching_resolver_does_not_cache_absence() {
    let backing = Arc::new(MapResolver::new());
    let caching = CachingResolver::new(
        Arc::clone(&backing) as Arc<dyn Resolver>,
        Arc::new(ConcurrentMapCache::<String, String>::new()),
    );

    assert_eq!(caching.resolve("late"), None);
    backing.insert("late", "now-present");
    assert_eq!(caching.resolve("late").as_deref(), Some("now-present"));
}
