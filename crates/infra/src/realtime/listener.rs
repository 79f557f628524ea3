use std::fmt;
use std::sync::Arc;

use financeflow_domain::PushEvent;
use serde_json::Value;

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Opaque listener handle.
///
/// Identity is the handle itself: clones of one handle are the same
/// listener, two handles built from identical closures are not. Keep the
/// handle around to unsubscribe it later.
#[derive(Clone)]
pub struct Listener {
    callback: Callback,
}

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self { callback: Arc::new(callback) }
    }

    /// Listener receiving the payload classified as a [`PushEvent`].
    pub fn events<F>(callback: F) -> Self
    where
        F: Fn(PushEvent) + Send + Sync + 'static,
    {
        Self::new(move |payload| callback(PushEvent::from_payload(payload)))
    }

    pub fn call(&self, payload: &Value) {
        (self.callback)(payload);
    }

    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.callback), Arc::as_ptr(&other.callback))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &Arc::as_ptr(&self.callback).cast::<()>()).finish()
    }
}
