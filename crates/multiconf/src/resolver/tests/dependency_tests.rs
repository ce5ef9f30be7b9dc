//! Tests for dependency waits, retries and the nesting threshold.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::Fixture;
use crate::LoadState;
use crate::error::ConfigError;

#[test]
fn test_wait_loads_env_and_dependency_before_retry() {
    let fixture = Fixture::new();
    fixture
        .env_file("ENV=DEV\n")
        .config_file("example.json", r#"{"foo": "bar"}"#);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let conf = fixture
        .builder()
        .with_code_fragment("a-first-config", move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            if ctx.wait_for(["env", "example"]) {
                return Ok(None);
            }
            Ok(Some(json!({
                "foo": "baz",
                "env": ctx.env("ENV")?,
                "example-data": ctx.config_or("example", "")?,
            })))
        })
        .build()
        .unwrap();

    assert_eq!(conf.config("a-first-config.foo").unwrap(), json!("baz"));
    assert_eq!(conf.config("a-first-config.env").unwrap(), json!("DEV"));
    assert_eq!(
        conf.config("a-first-config.example-data.foo").unwrap(),
        json!("bar")
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(conf.state("example"), LoadState::Loaded);
    assert_eq!(conf.state("a-first-config"), LoadState::Loaded);
}

#[test]
fn test_value_returned_while_waiting_is_discarded() {
    let fixture = Fixture::new();
    fixture.config_file("base.json", r#"{"url": "https://base"}"#);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let conf = fixture
        .builder()
        .with_code_fragment("derived", move |ctx| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            ctx.wait_for(["base"]);
            Ok(Some(json!({ "attempt": attempt })))
        })
        .build()
        .unwrap();

    assert_eq!(conf.config("derived.attempt").unwrap(), json!(1));
}

#[test]
fn test_dependency_cycle_fails_with_too_many_nesting() {
    let fixture = Fixture::new();
    let conf = fixture
        .builder()
        .with_code_fragment("a", |ctx| {
            if ctx.wait_for(["b"]) {
                return Ok(None);
            }
            Ok(Some(json!({"x": 1})))
        })
        .with_code_fragment("b", |ctx| {
            if ctx.wait_for(["a"]) {
                return Ok(None);
            }
            Ok(Some(json!({"y": 2})))
        })
        .build()
        .unwrap();

    match conf.config("a.x") {
        Err(ConfigError::TooManyNesting { threshold, .. }) => assert_eq!(threshold, 10),
        other => panic!("expected TooManyNesting, got {:?}", other),
    }
    assert!(matches!(
        conf.config_or("a.x", 0),
        Err(ConfigError::TooManyNesting { .. })
    ));
    assert_eq!(conf.state("a"), LoadState::Failed);
}

#[test]
fn test_self_reference_fails_with_too_many_nesting() {
    let fixture = Fixture::new();
    let conf = fixture
        .builder()
        .with_nesting_threshold(3)
        .with_code_fragment("loop", |ctx| {
            let inner = ctx.config("loop.value")?;
            Ok(Some(json!({ "value": inner })))
        })
        .build()
        .unwrap();

    assert!(matches!(
        conf.config("loop.value"),
        Err(ConfigError::TooManyNesting { threshold: 3, .. })
    ));
}

#[test]
fn test_zero_threshold_allows_no_retry() {
    let fixture = Fixture::new();
    fixture.config_file("base.json", r#"{"k": "v"}"#);
    let build = |threshold| {
        fixture
            .builder()
            .with_nesting_threshold(threshold)
            .with_code_fragment("derived", |ctx| {
                if ctx.wait_for(["base"]) {
                    return Ok(None);
                }
                Ok(Some(json!({"k": ctx.config("base.k")?})))
            })
            .build()
            .unwrap()
    };

    assert!(matches!(
        build(0).config("derived.k"),
        Err(ConfigError::TooManyNesting { .. })
    ));
    assert_eq!(build(1).config("derived.k").unwrap(), json!("v"));
}

#[test]
fn test_waiting_on_unknown_config_is_a_missing_dependency() {
    let fixture = Fixture::new();
    let conf = fixture
        .builder()
        .with_code_fragment("orphan", |ctx| {
            if ctx.wait_for(["ghost"]) {
                return Ok(None);
            }
            Ok(Some(json!({})))
        })
        .build()
        .unwrap();

    match conf.config_or("orphan.key", "fallback") {
        Err(ConfigError::MissingDependency { name, dependency }) => {
            assert_eq!(name, "orphan");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("expected MissingDependency, got {:?}", other),
    }
}

#[test]
fn test_fragment_error_is_wrapped_with_its_stem() {
    let fixture = Fixture::new();
    let conf = fixture
        .builder()
        .with_code_fragment("flaky.default", |_| anyhow::bail!("upstream unavailable"))
        .build()
        .unwrap();

    match conf.config("flaky.key") {
        Err(ConfigError::FragmentFailed { fragment, source }) => {
            assert_eq!(fragment, "flaky.default");
            assert!(source.to_string().contains("upstream unavailable"));
        }
        other => panic!("expected FragmentFailed, got {:?}", other),
    }
}

#[test]
fn test_facade_wait_for_reports_need() {
    let fixture = Fixture::new();
    fixture.config_file("base.json", r#"{"k": "v"}"#);
    let conf = fixture.build();

    assert!(conf.wait_for("derived", ["env", "base"]));
    conf.init(false).unwrap();
    assert!(conf.wait_for("derived", ["base"]));
    conf.config("base.k").unwrap();
    assert!(!conf.wait_for("derived", Vec::<String>::new()));
}

#[test]
fn test_fragment_reads_raw_env_strings() {
    let fixture = Fixture::new();
    fixture.env_file("SOME_JSON=[\"foo\",\"bar\"]\n");
    let conf = fixture
        .builder()
        .with_code_fragment("raw", |ctx| {
            Ok(Some(json!({
                "literal": ctx.env_raw("SOME_JSON")?,
                "decoded": ctx.env("SOME_JSON")?,
            })))
        })
        .build()
        .unwrap();

    assert_eq!(conf.config("raw.literal").unwrap(), json!(r#"["foo","bar"]"#));
    assert_eq!(conf.config("raw.decoded").unwrap(), json!(["foo", "bar"]));
    assert!(matches!(
        conf.config("raw.missing"),
        Err(ConfigError::ConfigKeyNotFound { .. })
    ));
}
