//! UI collaborator contracts.
//!
//! The engine never owns UI state. Components, focus, component-scoped
//! providers, live editors and input suppression all belong to the host and
//! are reached through the traits below.

use crate::provider::DataProvider;
use crate::types::TextControlId;
use std::fmt;
use std::sync::Arc;

mod affinity;
pub mod memory;
mod suppress;

pub use affinity::{Affinity, UiThread};
pub use suppress::InputSuppression;

/// A node of the host's component tree.
pub trait Component: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn parent(&self) -> Option<Arc<dyn Component>>;

    /// Components may opt out of exposing editor data to actions invoked on them.
    fn hides_editor_data(&self) -> bool {
        false
    }
}

/// Host-side UI services.
pub trait UiHost: Send + Sync {
    /// Component that currently owns input focus.
    fn focus_owner(&self) -> Option<Arc<dyn Component>>;

    /// Provider registered directly on `component`, if any.
    fn data_provider(&self, component: &dyn Component) -> Option<Arc<dyn DataProvider>>;

    /// Start dropping input events; calls nest.
    fn begin_input_suppression(&self, reason: &'static str);

    fn end_input_suppression(&self);
}

/// A live editor on the host.
pub trait EditorHandle: Send + Sync + fmt::Debug {
    fn content_component(&self) -> Arc<dyn Component>;

    fn is_disposed(&self) -> bool;
}

/// Lookup of host editors by the id of the client text control showing them.
pub trait EditorRegistry: Send + Sync {
    fn find_editor(&self, control_id: &TextControlId) -> Option<Arc<dyn EditorHandle>>;
}

/// Value type stored under the editor keys.
#[derive(Debug, Clone)]
pub struct EditorRef(pub Arc<dyn EditorHandle>);

/// Host without any UI: no focus, no component providers.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

impl UiHost for HeadlessHost {
    fn focus_owner(&self) -> Option<Arc<dyn Component>> {
        None
    }

    fn data_provider(&self, _component: &dyn Component) -> Option<Arc<dyn DataProvider>> {
        None
    }

    fn begin_input_suppression(&self, _reason: &'static str) {}

    fn end_input_suppression(&self) {}
}

/// Registry that knows no editors.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEditors;

impl EditorRegistry for NoEditors {
    fn find_editor(&self, _control_id: &TextControlId) -> Option<Arc<dyn EditorHandle>> {
        None
    }
}
