//! UI-thread capability.

use std::marker::PhantomData;

/// Proof that the holder runs on the UI-affine thread.
///
/// The token is `!Send` and `!Sync`, so it cannot leave the thread that
/// claimed it. Component-scoped providers are only invoked while one is
/// presented to the resolver.
#[derive(Debug)]
pub struct UiThread {
    _not_send: PhantomData<*const ()>,
}

impl UiThread {
    /// Claim the capability. The host calls this from its UI thread only.
    pub fn claim() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

/// Thread affinity a resolution runs with.
#[derive(Debug, Clone, Copy, Default)]
pub enum Affinity<'a> {
    #[default]
    Background,
    Ui(&'a UiThread),
}

impl Affinity<'_> {
    pub fn is_ui(&self) -> bool {
        matches!(self, Affinity::Ui(_))
    }
}
