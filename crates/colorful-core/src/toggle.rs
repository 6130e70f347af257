//! Open/closed interaction of the picker.
//!
//! The open state lives in the host's props (`active`). The controller only
//! turns UI events into [`PropsUpdate`]s. Closing after a choice goes through
//! a [`Throttle`] so that a quick series of picks closes the picker once,
//! after the last pick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::error::ColorfulError;
use crate::host::SetProps;
use crate::props::{AnyColor, ColorfulProps, PropsUpdate};
use crate::throttle::{Pending, Throttle, ThrottleBuilder};

/// Turns toggle clicks and color picks into host updates.
pub struct ToggleController {
    host: Arc<dyn SetProps>,
    runtime: Handle,
    /// Rebuilt when the configured delay changes.
    close: Mutex<Option<Throttle<(), ()>>>,
    /// Bumped on every rebuild; a close from an older throttle is skipped.
    generation: Arc<AtomicU64>,
}

impl ToggleController {
    /// Create a controller that schedules deferred closes on the current
    /// tokio runtime.
    pub fn new(host: impl SetProps + 'static) -> Result<Self, ColorfulError> {
        let runtime = Handle::try_current().map_err(|_| ColorfulError::NoRuntime)?;
        Ok(Self::with_runtime(host, runtime))
    }

    /// Create a controller that schedules deferred closes on `runtime`.
    pub fn with_runtime(host: impl SetProps + 'static, runtime: Handle) -> Self {
        Self {
            host: Arc::new(host),
            runtime,
            close: Mutex::new(None),
            generation: Arc::default(),
        }
    }

    /// The toggle affordance was activated.
    ///
    /// Returns false when the picker has no toggle, in which case nothing is
    /// sent to the host.
    pub fn on_toggle(&self, props: &ColorfulProps) -> bool {
        if !props.toggleable {
            log::debug!("Ignoring toggle on a picker without toggle button");
            return false;
        }
        log::debug!("Picker toggled, active = {}", !props.active);
        self.host.set_props(PropsUpdate::active(!props.active));
        true
    }

    /// A color was picked.
    ///
    /// The value always goes to the host right away. With
    /// `toggle_on_choose`, a close is scheduled `toggle_on_choose_delay`
    /// after this pick and the returned handle settles when it has run.
    pub fn on_change(&self, props: &ColorfulProps, color: AnyColor) -> Option<Pending<()>> {
        self.host.set_props(PropsUpdate::value(color));
        if !props.toggle_on_choose {
            return None;
        }
        let delay = props.close_delay();
        log::debug!("Closing picker {:?} after the last pick", delay);
        Some(self.close_throttle(delay).call(()))
    }

    /// Whether a deferred close is waiting to fire.
    pub fn is_closing(&self) -> bool {
        self.close
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Throttle::is_pending)
    }

    fn close_throttle(&self, delay: Duration) -> Throttle<(), ()> {
        let mut close = self.close.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(throttle) = close.as_ref().filter(|t| t.delay() == delay) {
            return throttle.clone();
        }

        // Supersedes any window still open on the previous throttle.
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!("Close delay is now {:?} (generation {})", delay, generation);
        let host = Arc::clone(&self.host);
        let current = Arc::clone(&self.generation);
        let throttle = ThrottleBuilder::new(delay)
            .reset_on_call(true)
            .build_on(self.runtime.clone(), move |()| {
                if current.load(Ordering::Acquire) == generation {
                    host.set_props(PropsUpdate::active(false));
                } else {
                    log::debug!("Skipping close from superseded generation {}", generation);
                }
            });
        *close = Some(throttle.clone());
        throttle
    }
}
