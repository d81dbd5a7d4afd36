//! In-memory UI host for headless embedding and replay.

use super::{Component, EditorHandle, EditorRegistry, UiHost};
use crate::provider::DataProvider;
use crate::types::TextControlId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
pub struct MemoryComponent {
    name: String,
    parent: Option<Arc<dyn Component>>,
    hides_editor_data: bool,
}

impl MemoryComponent {
    pub fn root(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: None,
            hides_editor_data: false,
        })
    }

    pub fn child(name: impl Into<String>, parent: Arc<dyn Component>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: Some(parent),
            hides_editor_data: false,
        })
    }

    /// Like [`MemoryComponent::child`], but hiding editor data from actions.
    pub fn editor_hiding_child(name: impl Into<String>, parent: Arc<dyn Component>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: Some(parent),
            hides_editor_data: true,
        })
    }
}

impl Component for MemoryComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<Arc<dyn Component>> {
        self.parent.clone()
    }

    fn hides_editor_data(&self) -> bool {
        self.hides_editor_data
    }
}

/// UI host whose focus and component providers are set programmatically.
/// Component providers are keyed by component name.
#[derive(Default)]
pub struct MemoryUiHost {
    focus: RwLock<Option<Arc<dyn Component>>>,
    providers: RwLock<HashMap<String, Arc<dyn DataProvider>>>,
    depth: AtomicUsize,
    started: AtomicUsize,
}

impl MemoryUiHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focus(&self, component: Option<Arc<dyn Component>>) {
        *self.focus.write() = component;
    }

    pub fn register_provider(&self, component_name: impl Into<String>, provider: Arc<dyn DataProvider>) {
        self.providers.write().insert(component_name.into(), provider);
    }

    /// Number of currently open suppression sections.
    pub fn suppression_depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Total number of suppression sections ever opened.
    pub fn suppressions_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl UiHost for MemoryUiHost {
    fn focus_owner(&self) -> Option<Arc<dyn Component>> {
        self.focus.read().clone()
    }

    fn data_provider(&self, component: &dyn Component) -> Option<Arc<dyn DataProvider>> {
        self.providers.read().get(component.name()).cloned()
    }

    fn begin_input_suppression(&self, reason: &'static str) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(reason, depth, "Input suppression started");
    }

    fn end_input_suppression(&self) {
        let _ = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1));
    }
}

#[derive(Debug)]
pub struct MemoryEditor {
    content: Arc<dyn Component>,
    disposed: AtomicBool,
}

impl MemoryEditor {
    pub fn new(content: Arc<dyn Component>) -> Arc<Self> {
        Arc::new(Self {
            content,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}

impl EditorHandle for MemoryEditor {
    fn content_component(&self) -> Arc<dyn Component> {
        Arc::clone(&self.content)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MemoryEditorRegistry {
    editors: RwLock<HashMap<TextControlId, Arc<dyn EditorHandle>>>,
}

impl MemoryEditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, control_id: TextControlId, editor: Arc<dyn EditorHandle>) {
        self.editors.write().insert(control_id, editor);
    }

    pub fn remove(&self, control_id: &TextControlId) {
        self.editors.write().remove(control_id);
    }
}

impl EditorRegistry for MemoryEditorRegistry {
    fn find_editor(&self, control_id: &TextControlId) -> Option<Arc<dyn EditorHandle>> {
        self.editors.read().get(control_id).cloned()
    }
}
