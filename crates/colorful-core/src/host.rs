//! Host-side state binding.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::props::{ColorfulProps, PropsUpdate};

/// Receives prop updates from the widget.
///
/// Implementations must be callable from the timer that fires deferred
/// closes, which may run on another thread.
pub trait SetProps: Send + Sync {
    fn set_props(&self, update: PropsUpdate);
}

impl<F> SetProps for F
where
    F: Fn(PropsUpdate) + Send + Sync,
{
    fn set_props(&self, update: PropsUpdate) {
        self(update)
    }
}

/// In-memory host holding the props of one picker.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct SharedProps {
    props: Arc<RwLock<ColorfulProps>>,
    revision: Arc<AtomicU64>,
}

impl SharedProps {
    pub fn new(props: ColorfulProps) -> Self {
        Self {
            props: Arc::new(RwLock::new(props)),
            revision: Arc::default(),
        }
    }

    /// Copy of the current props.
    pub fn snapshot(&self) -> ColorfulProps {
        self.props
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Incremented on every update that changed the props.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }
}

impl SetProps for SharedProps {
    fn set_props(&self, update: PropsUpdate) {
        log::debug!("Host update: {:?}", update);
        let changed = self
            .props
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(update);
        if changed {
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
    }
}
