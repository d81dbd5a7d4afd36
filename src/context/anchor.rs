//! Component anchoring.
//!
//! A context is anchored to at most one UI component: the content component
//! of the editor the action came from, or else whatever held focus when the
//! context was built. The anchor scopes the ancestry walk and editor
//! validation. It is held weakly since the UI owns its lifecycle.

use crate::error::UpgradeAbort;
use crate::provider::{DataLookup, GuardedProvider, RuleSet};
use crate::types::{ControlId, DataKey, DataValue};
use crate::ui::{Component, EditorRef, EditorRegistry, InputSuppression, UiHost};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Non-owning handle to the anchor component.
#[derive(Default)]
pub struct AnchorRef(Option<Weak<dyn Component>>);

impl AnchorRef {
    pub fn new(component: Option<Arc<dyn Component>>) -> Self {
        AnchorRef(component.as_ref().map(Arc::downgrade))
    }

    /// The component, if one was anchored and it is still alive.
    pub fn get(&self) -> Option<Arc<dyn Component>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }

    pub fn was_anchored(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for AnchorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(component) => write!(f, "AnchorRef({})", component.name()),
            None if self.was_anchored() => f.write_str("AnchorRef(<reclaimed>)"),
            None => f.write_str("AnchorRef(None)"),
        }
    }
}

/// Pick the anchor from the resolved control id, falling back to the focus owner.
pub fn resolve_anchor(
    control_id: Option<&DataValue>,
    editors: &dyn EditorRegistry,
    host: &dyn UiHost,
) -> Option<Arc<dyn Component>> {
    control_component(control_id, editors).or_else(|| host.focus_owner())
}

fn control_component(
    control_id: Option<&DataValue>,
    editors: &dyn EditorRegistry,
) -> Option<Arc<dyn Component>> {
    match control_id?.downcast_ref::<ControlId>()? {
        ControlId::Editor(id) => {
            let editor = editors.find_editor(id);
            if editor.is_none() {
                debug!(control = %id, "No host editor for text control");
            }
            editor.map(|e| e.content_component())
        }
        ControlId::ToolWindow(id) => {
            trace!(tool_window = %id, "Tool window anchors are not supported");
            None
        }
    }
}

/// Walk from `start` to the root, asking each component's own provider.
pub fn walk_ancestry(
    key: &DataKey,
    start: Option<Arc<dyn Component>>,
    host: &dyn UiHost,
    rules: &RuleSet,
    chain: &dyn DataLookup,
    max_depth: usize,
) -> Result<Option<DataValue>, UpgradeAbort> {
    let _suppression = InputSuppression::start(host, "getData");
    let mut current = start;
    let mut depth = 0;
    while let Some(component) = current {
        if depth >= max_depth {
            warn!(key = %key, max_depth, "Component ancestry walk hit depth limit");
            break;
        }
        if let Some(provider) = host.data_provider(component.as_ref()) {
            let source = GuardedProvider {
                provider: provider.as_ref(),
                chain,
            };
            if let Some(value) = rules.provider_and_rules(key, &source)? {
                trace!(key = %key, component = component.name(), "Resolved from component ancestry");
                return Ok(Some(value));
            }
        }
        current = component.parent();
        depth += 1;
    }
    Ok(None)
}

/// Drop editor values that must not reach the action: non-editors, disposed
/// editors, and editors seen through an anchor that hides editor data.
pub fn validate_editor(
    key: &DataKey,
    value: Option<DataValue>,
    anchor: Option<&Arc<dyn Component>>,
) -> Option<DataValue> {
    let value = value?;
    let Some(editor) = value.downcast_ref::<EditorRef>() else {
        warn!(key = %key, actual = value.type_name(), "Editor key resolved to a non-editor value");
        return None;
    };
    if editor.0.is_disposed() {
        debug!(key = %key, "Dropping disposed editor");
        return None;
    }
    if anchor.is_some_and(|c| c.hides_editor_data()) {
        debug!(key = %key, "Anchor component hides editor data");
        return None;
    }
    Some(value)
}
