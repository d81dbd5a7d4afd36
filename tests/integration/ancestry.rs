//! Integration tests for anchoring and the component ancestry walk.

use actx::config::ResolverSettings;
use actx::context::{ActionDataContext, Collaborators};
use actx::provider::{DataProvider, FnProvider};
use actx::timestamp::TimestampSet;
use actx::types::{keys, DataKey, DataValue};
use actx::ui::memory::{MemoryComponent, MemoryUiHost};
use actx::ui::{Affinity, Component, UiThread};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

struct Fixture {
    host: Arc<MemoryUiHost>,
    leaf: Arc<dyn Component>,
    depth_seen: Arc<AtomicUsize>,
}

/// frame <- panel <- list, focus on list; only the frame has a provider.
fn fixture() -> Fixture {
    let host = Arc::new(MemoryUiHost::new());
    let frame: Arc<dyn Component> = MemoryComponent::root("frame");
    let panel: Arc<dyn Component> = MemoryComponent::child("panel", frame);
    let leaf: Arc<dyn Component> = MemoryComponent::child("list", panel);
    host.set_focus(Some(Arc::clone(&leaf)));

    let depth_seen = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&depth_seen);
    let weak_host: Weak<MemoryUiHost> = Arc::downgrade(&host);
    let provider: Arc<dyn DataProvider> = Arc::new(FnProvider::new("frame", move |key, _| {
        if let Some(host) = weak_host.upgrade() {
            observed.store(host.suppression_depth(), Ordering::SeqCst);
        }
        Ok((key.name() == "toolwindow.id").then(|| DataValue::text("Project")))
    }));
    host.register_provider("frame", provider);

    Fixture {
        host,
        leaf,
        depth_seen,
    }
}

fn build(fixture: &Fixture, settings: ResolverSettings) -> ActionDataContext {
    ActionDataContext::builder("Collapse", TimestampSet::new(), TimestampSet::new())
        .collaborators(Collaborators::new().ui(fixture.host.clone()))
        .settings(settings)
        .build()
        .unwrap()
}

#[test]
fn test_ancestry_walk_runs_inside_input_suppression() {
    let fixture = fixture();
    let ctx = build(&fixture, ResolverSettings::default());
    let token = UiThread::claim();

    let value = ctx
        .resolve_in(&DataKey::from("toolwindow.id"), Affinity::Ui(&token))
        .unwrap();
    assert_eq!(value.map(|v| v.describe()), Some("Project".into()));
    assert_eq!(fixture.depth_seen.load(Ordering::SeqCst), 1);
    assert_eq!(fixture.host.suppression_depth(), 0);
    assert_eq!(fixture.host.suppressions_started(), 1);
}

#[test]
fn test_background_resolution_skips_ancestry() {
    let fixture = fixture();
    let ctx = build(&fixture, ResolverSettings::default());

    assert!(ctx.resolve(&DataKey::from("toolwindow.id")).unwrap().is_none());
    assert_eq!(fixture.host.suppressions_started(), 0);
}

#[test]
fn test_ancestry_walk_can_be_disabled() {
    let fixture = fixture();
    let settings = ResolverSettings {
        ancestry_walk: false,
        ..ResolverSettings::default()
    };
    let ctx = build(&fixture, settings);
    let token = UiThread::claim();

    let value = ctx
        .resolve_in(&DataKey::from("toolwindow.id"), Affinity::Ui(&token))
        .unwrap();
    assert!(value.is_none());
}

#[test]
fn test_ancestry_walk_respects_depth_limit() {
    let fixture = fixture();
    let settings = ResolverSettings {
        max_ancestry_depth: 2,
        ..ResolverSettings::default()
    };
    let ctx = build(&fixture, settings);
    let token = UiThread::claim();

    let value = ctx
        .resolve_in(&DataKey::from("toolwindow.id"), Affinity::Ui(&token))
        .unwrap();
    assert!(value.is_none());
    assert_eq!(fixture.host.suppression_depth(), 0);
}

#[test]
fn test_context_component_is_the_focus_owner_and_not_cached() {
    let fixture = fixture();
    let ctx = build(&fixture, ResolverSettings::default());

    let value = ctx.resolve(&keys::CONTEXT_COMPONENT).unwrap().unwrap();
    let component = value.downcast_ref::<Arc<dyn Component>>().unwrap();
    assert_eq!(component.name(), "list");
    assert_eq!(ctx.cached_len(), 0);
}

#[test]
fn test_anchor_is_released_with_the_ui() {
    let fixture = fixture();
    let ctx = build(&fixture, ResolverSettings::default());
    assert!(ctx.anchor_component().is_some());

    fixture.host.set_focus(None);
    drop(fixture.leaf);

    assert!(ctx.anchor_component().is_none());
    assert!(ctx.resolve(&keys::CONTEXT_COMPONENT).unwrap().is_none());
}
