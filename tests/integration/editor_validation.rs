//! Integration tests for live-editor revalidation against the anchor.

use actx::config::ResolverSettings;
use actx::context::{ActionDataContext, Collaborators, MapDataContext};
use actx::timestamp::{Timestamp, TimestampSet};
use actx::types::{keys, ControlId, DataValue, TextControlId};
use actx::ui::memory::{MemoryComponent, MemoryEditor, MemoryEditorRegistry, MemoryUiHost};
use actx::ui::{Component, EditorRef};
use actx::upgrade::RevisionTimestamp;
use std::sync::Arc;

struct Fixture {
    editor: Arc<MemoryEditor>,
    registry: Arc<MemoryEditorRegistry>,
    request: TimestampSet,
    parent: Arc<MapDataContext>,
    _content: Arc<dyn Component>,
}

fn fixture(content: Arc<dyn Component>) -> Fixture {
    let id = TextControlId("text-1".into());
    let editor = MemoryEditor::new(Arc::clone(&content));
    let registry = Arc::new(MemoryEditorRegistry::new());
    registry.insert(id.clone(), editor.clone());

    let request = TimestampSet::new().with(
        keys::CONTROL_ID,
        Timestamp::plain(DataValue::new(ControlId::Editor(id))),
    );
    let parent = Arc::new(
        MapDataContext::new().with(keys::EDITOR, DataValue::new(EditorRef(editor.clone()))),
    );
    Fixture {
        editor,
        registry,
        request,
        parent,
        _content: content,
    }
}

fn build(fixture: &Fixture, settings: ResolverSettings) -> ActionDataContext {
    let host = MemoryUiHost::new();
    host.set_focus(Some(MemoryComponent::root("elsewhere")));
    ActionDataContext::builder("GotoLine", fixture.request.clone(), TimestampSet::new())
        .parent(fixture.parent.clone())
        .collaborators(
            Collaborators::new()
                .ui(Arc::new(host))
                .editors(fixture.registry.clone()),
        )
        .settings(settings)
        .build()
        .unwrap()
}

#[test]
fn test_editor_control_anchors_context() {
    let fixture = fixture(MemoryComponent::root("editor-content"));
    let ctx = build(&fixture, ResolverSettings::default());

    assert_eq!(ctx.anchor_component().unwrap().name(), "editor-content");
    let value = ctx.resolve(&keys::EDITOR).unwrap().unwrap();
    assert!(value.is::<EditorRef>());
}

#[test]
fn test_disposed_editor_is_dropped() {
    let fixture = fixture(MemoryComponent::root("editor-content"));
    let ctx = build(&fixture, ResolverSettings::default());
    fixture.editor.dispose();

    assert!(ctx.resolve(&keys::EDITOR).unwrap().is_none());
}

#[test]
fn test_hiding_anchor_drops_editor() {
    let root: Arc<dyn Component> = MemoryComponent::root("frame");
    let fixture = fixture(MemoryComponent::editor_hiding_child("search-field", root));
    let ctx = build(&fixture, ResolverSettings::default());

    assert!(ctx.resolve(&keys::EDITOR).unwrap().is_none());
}

#[test]
fn test_non_editor_value_under_editor_key() {
    let mut fixture = fixture(MemoryComponent::root("editor-content"));
    fixture.parent = Arc::new(MapDataContext::new().with(keys::HOST_EDITOR, DataValue::text("oops")));

    let ctx = build(&fixture, ResolverSettings::default());
    assert!(ctx.resolve(&keys::HOST_EDITOR).unwrap().is_none());

    let settings = ResolverSettings {
        validate_editors: false,
        ..ResolverSettings::default()
    };
    let ctx = build(&fixture, settings);
    assert!(ctx.resolve(&keys::HOST_EDITOR).unwrap().is_some());
}

#[test]
fn test_mutating_control_id_aborts_construction() {
    let request = TimestampSet::new().with(
        keys::CONTROL_ID,
        Timestamp::upgradable(RevisionTimestamp::new(keys::CONTROL_ID, "layout", 3)),
    );
    let actual = TimestampSet::new().with(
        keys::CONTROL_ID,
        Timestamp::upgradable(RevisionTimestamp::new(keys::CONTROL_ID, "layout", 3).mutating()),
    );
    let err = ActionDataContext::builder("GotoLine", request, actual)
        .build()
        .unwrap_err();
    assert!(err.is_retry());
}
