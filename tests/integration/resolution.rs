//! Integration tests for the resolution chain: parent delegation, memoization,
//! provider isolation and the sticky failure latch.

use actx::context::{ActionDataContext, Collaborators, DataContext, MapDataContext};
use actx::error::AbortKind;
use actx::provider::rules::AliasRule;
use actx::provider::{FailingProvider, FnProvider, RuleKind, StaticProvider};
use actx::timestamp::{Timestamp, TimestampSet};
use actx::types::{DataKey, DataValue};
use actx::upgrade::{HandlerEvent, RecordingHandler, RevisionPolicy, RevisionTimestamp};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn revision(key: &str, document: &str, rev: u64) -> Timestamp {
    Timestamp::upgradable(RevisionTimestamp::new(key, document, rev))
}

#[test]
fn test_parent_value_reaches_action() {
    let parent = Arc::new(MapDataContext::new().with("X", DataValue::new(7i64)));
    let ctx = ActionDataContext::builder("ShowUsages", TimestampSet::new(), TimestampSet::new())
        .parent(parent)
        .build()
        .unwrap();

    let value = ctx.resolve(&DataKey::from("X")).unwrap().unwrap();
    assert_eq!(value.downcast_ref::<i64>(), Some(&7));
}

#[test]
fn test_nested_contexts_delegate_through_each_level() {
    let root = Arc::new(MapDataContext::new().with("project", DataValue::text("demo")));
    let outer = ActionDataContext::builder("Outer", TimestampSet::new(), TimestampSet::new())
        .parent(root)
        .build()
        .unwrap();
    let inner = ActionDataContext::builder("Inner", TimestampSet::new(), TimestampSet::new())
        .parent(Arc::new(outer) as Arc<dyn DataContext>)
        .build()
        .unwrap();

    let value = inner.resolve(&DataKey::from("project")).unwrap();
    assert_eq!(value.map(|v| v.describe()), Some("demo".into()));
}

#[test]
fn test_stale_key_aborts_and_latches() {
    let handler = Arc::new(RecordingHandler::new());
    let request = TimestampSet::new().with("Y", revision("Y", "Main.kt", 4));
    let actual = TimestampSet::new().with("Y", revision("Y", "Main.kt", 5));
    let parent = Arc::new(MapDataContext::new().with("Z", DataValue::text("z")));
    let ctx = ActionDataContext::builder("Rename", request, actual)
        .parent(parent)
        .handler(handler.clone())
        .build()
        .unwrap();

    let err = ctx.resolve(&DataKey::from("Y")).unwrap_err();
    assert_eq!(err.kind, AbortKind::Failure);
    assert!(err.message.starts_with("stale"));
    assert_eq!(err.action_id.as_str(), "Rename");

    let err = ctx.resolve(&DataKey::from("Z")).unwrap_err();
    assert_eq!(err.kind, AbortKind::StaleContext);

    assert_eq!(
        handler.events(),
        vec![HandlerEvent::Failure {
            action_id: "Rename".into(),
            message: "stale: Main.kt moved from revision 4 to 5".into(),
        }]
    );
}

#[test]
fn test_follow_latest_uses_current_data() {
    let request = TimestampSet::new().with(
        "selection",
        Timestamp::upgradable(
            RevisionTimestamp::new("selection", "Main.kt", 1)
                .with_data(DataValue::text("old"))
                .with_policy(RevisionPolicy::FollowLatest),
        ),
    );
    let actual = TimestampSet::new().with(
        "selection",
        Timestamp::upgradable(
            RevisionTimestamp::new("selection", "Main.kt", 2).with_data(DataValue::text("new")),
        ),
    );
    let ctx = ActionDataContext::builder("Comment", request, actual)
        .build()
        .unwrap();

    let value = ctx.resolve(&DataKey::from("selection")).unwrap();
    assert_eq!(value.map(|v| v.describe()), Some("new".into()));
    assert!(!ctx.is_failed());
}

#[test]
fn test_failing_provider_then_answering_provider() {
    let collaborators = Collaborators::new()
        .provider(Arc::new(FailingProvider::new("provider1", "boom")))
        .provider(Arc::new(StaticProvider::new("provider2").with("W", DataValue::text("ok"))));
    let ctx = ActionDataContext::builder("Run", TimestampSet::new(), TimestampSet::new())
        .collaborators(collaborators)
        .build()
        .unwrap();

    let value = ctx.resolve(&DataKey::from("W")).unwrap();
    assert_eq!(value.map(|v| v.describe()), Some("ok".into()));
}

#[test]
fn test_provider_rule_aliases_parent_key() {
    let parent = Arc::new(MapDataContext::new().with("virtual.file", DataValue::text("Main.kt")));
    let collaborators = Collaborators::new().rule(Arc::new(AliasRule::new(
        "psi.file",
        "virtual.file",
        RuleKind::Provider,
    )));
    let ctx = ActionDataContext::builder("Run", TimestampSet::new(), TimestampSet::new())
        .parent(parent)
        .collaborators(collaborators)
        .build()
        .unwrap();

    let value = ctx.resolve(&DataKey::from("psi.file")).unwrap();
    assert_eq!(value.map(|v| v.describe()), Some("Main.kt".into()));
}

#[test]
fn test_concurrent_resolvers_observe_one_outcome() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let provider = FnProvider::new("slow", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Some(DataValue::new(vec![1u8, 2, 3])))
    });
    let ctx = Arc::new(
        ActionDataContext::builder("Run", TimestampSet::new(), TimestampSet::new())
            .collaborators(Collaborators::new().provider(Arc::new(provider)))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || ctx.resolve(&DataKey::from("bytes")).unwrap().unwrap())
        })
        .collect();
    let values: Vec<DataValue> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winner = ctx.resolve(&DataKey::from("bytes")).unwrap().unwrap();
    assert!(values.iter().all(|v| v.ptr_eq(&winner)));
    assert!(calls.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_concurrent_failures_notify_once() {
    let handler = Arc::new(RecordingHandler::new());
    let mut request = TimestampSet::new();
    let mut actual = TimestampSet::new();
    for i in 0..8 {
        let key = format!("k{}", i);
        request.insert(key.clone(), revision(&key, "Main.kt", 1));
        actual.insert(key.clone(), revision(&key, "Other.kt", 1));
    }
    let ctx = Arc::new(
        ActionDataContext::builder("Run", request, actual)
            .handler(handler.clone())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || ctx.resolve(&DataKey::from(format!("k{}", i))).is_err())
        })
        .collect();
    assert!(handles.into_iter().all(|h| h.join().unwrap()));

    assert!(ctx.is_failed());
    assert_eq!(handler.count(), 1);
}
