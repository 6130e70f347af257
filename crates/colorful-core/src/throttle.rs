//! Call coalescing for deferred side effects.
//!
//! A [`Throttle`] wraps a function so that a burst of calls collapses into a
//! single execution. Every call returns a [`Pending`] handle. When the
//! function finally runs, it runs once with the arguments of the *last* call
//! and every handle of the burst settles with that one result.
//!
//! ```no_run
//! # async fn demo() -> Result<(), colorful_core::ColorfulError> {
//! use std::time::Duration;
//! use colorful_core::throttle;
//!
//! let measure = throttle(|name: &'static str| name.len(), Duration::from_millis(100), false)?;
//! let first = measure.call("a");
//! let second = measure.call("bcd");
//! assert_eq!(first.await, Ok(3));
//! assert_eq!(second.await, Ok(3));
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{ColorfulError, ThrottleError};

type Outcome<T, E> = Result<T, ThrottleError<E>>;
type Waiter<T, E> = oneshot::Sender<Outcome<T, E>>;
type BoxedFn<A, T, E> = Box<dyn Fn(A) -> Result<T, E> + Send + Sync>;

/// Wrap `func` so that a burst of calls runs it once.
///
/// The run happens `delay` after the first call of the burst, or `delay`
/// after the latest call when `reset_on_call` is set. Must be called from
/// within a tokio runtime.
pub fn throttle<A, T, F>(
    func: F,
    delay: Duration,
    reset_on_call: bool,
) -> Result<Throttle<A, T>, ColorfulError>
where
    F: Fn(A) -> T + Send + Sync + 'static,
    A: Send + 'static,
    T: Clone + Send + 'static,
{
    ThrottleBuilder::new(delay)
        .reset_on_call(reset_on_call)
        .build(func)
}

/// Builder for a [`Throttle`].
#[derive(Debug, Clone, Copy)]
pub struct ThrottleBuilder {
    delay: Duration,
    reset_on_call: bool,
}

impl ThrottleBuilder {
    /// Start a builder with the given delay and a deadline anchored to the
    /// first call of each burst.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            reset_on_call: false,
        }
    }

    /// Push the deadline forward on every call instead of anchoring it to
    /// the first call.
    pub fn reset_on_call(mut self, reset: bool) -> Self {
        self.reset_on_call = reset;
        self
    }

    /// Build around an infallible function, scheduling on the current
    /// runtime.
    pub fn build<A, T, F>(self, func: F) -> Result<Throttle<A, T>, ColorfulError>
    where
        F: Fn(A) -> T + Send + Sync + 'static,
        A: Send + 'static,
        T: Clone + Send + 'static,
    {
        Ok(self.build_on(current_runtime()?, func))
    }

    /// Build around a fallible function, scheduling on the current runtime.
    /// An `Err` rejects every waiter of the burst with
    /// [`ThrottleError::Failed`].
    pub fn try_build<A, T, E, F>(self, func: F) -> Result<Throttle<A, T, E>, ColorfulError>
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        A: Send + 'static,
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        Ok(self.try_build_on(current_runtime()?, func))
    }

    /// Build around an infallible function, scheduling on `runtime`.
    pub fn build_on<A, T, F>(self, runtime: Handle, func: F) -> Throttle<A, T>
    where
        F: Fn(A) -> T + Send + Sync + 'static,
        A: Send + 'static,
        T: Clone + Send + 'static,
    {
        self.try_build_on(runtime, move |args| Ok::<T, Infallible>(func(args)))
    }

    /// Build around a fallible function, scheduling on `runtime`.
    pub fn try_build_on<A, T, E, F>(self, runtime: Handle, func: F) -> Throttle<A, T, E>
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        A: Send + 'static,
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        Throttle {
            shared: Arc::new(Shared {
                func: Box::new(func),
                delay: self.delay,
                reset_on_call: self.reset_on_call,
                state: Mutex::new(State {
                    window: None,
                    epoch: 0,
                }),
            }),
            runtime,
        }
    }
}

fn current_runtime() -> Result<Handle, ColorfulError> {
    Handle::try_current().map_err(|_| ColorfulError::NoRuntime)
}

/// A burst of calls waiting for the single execution.
struct Window<A, T, E> {
    started_at: Instant,
    timer: Option<JoinHandle<()>>,
    waiters: Vec<Waiter<T, E>>,
    latest_args: A,
}

impl<A, T, E> Window<A, T, E> {
    fn open(now: Instant, args: A) -> Self {
        Self {
            started_at: now,
            timer: None,
            waiters: Vec::new(),
            latest_args: args,
        }
    }
}

struct State<A, T, E> {
    window: Option<Window<A, T, E>>,
    /// Bumped on every call; only the timer of the latest call may fire.
    epoch: u64,
}

struct Shared<A, T, E> {
    func: BoxedFn<A, T, E>,
    delay: Duration,
    reset_on_call: bool,
    state: Mutex<State<A, T, E>>,
}

impl<A, T, E> Shared<A, T, E> {
    fn lock(&self) -> MutexGuard<'_, State<A, T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, T: Clone, E: Clone> Shared<A, T, E> {
    fn fire(&self, epoch: u64) {
        let window = {
            let mut state = self.lock();
            if state.epoch != epoch {
                return;
            }
            state.window.take()
        };
        let Some(Window {
            latest_args,
            waiters,
            ..
        }) = window
        else {
            return;
        };

        log::debug!("Executing throttled call for {} waiter(s)", waiters.len());
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (self.func)(latest_args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(ThrottleError::Failed(err)),
            Err(payload) => Err(ThrottleError::Panicked(panic_message(payload.as_ref()))),
        };
        if outcome.is_err() {
            log::warn!(
                "Throttled call did not complete, rejecting {} waiter(s)",
                waiters.len()
            );
        }

        settle(waiters, outcome);
    }
}

impl<A, T, E> Shared<A, T, E> {
    /// Drop the waiters of a window whose timer will never fire, so their
    /// handles resolve to [`ThrottleError::Abandoned`].
    fn abandon(&self, epoch: u64) {
        let window = {
            let mut state = self.lock();
            if state.epoch != epoch {
                return;
            }
            state.window.take()
        };
        if let Some(window) = window {
            log::warn!(
                "Throttle timer dropped before firing, abandoning {} waiter(s)",
                window.waiters.len()
            );
        }
    }
}

/// Owned by a window's timer task. Dropping it without firing, as happens
/// when the runtime shuts down, abandons the window.
struct TimerGuard<A, T, E> {
    shared: Arc<Shared<A, T, E>>,
    epoch: u64,
    fired: bool,
}

impl<A, T: Clone, E: Clone> TimerGuard<A, T, E> {
    fn fire(&mut self) {
        self.fired = true;
        self.shared.fire(self.epoch);
    }
}

impl<A, T, E> Drop for TimerGuard<A, T, E> {
    fn drop(&mut self) {
        if !self.fired {
            self.shared.abandon(self.epoch);
        }
    }
}

/// Deliver one outcome to every waiter, in call order.
fn settle<T: Clone, E: Clone>(mut waiters: Vec<Waiter<T, E>>, outcome: Outcome<T, E>) {
    let Some(last) = waiters.pop() else {
        return;
    };
    for waiter in waiters {
        // A dropped receiver just means nobody is listening.
        let _ = waiter.send(outcome.clone());
    }
    let _ = last.send(outcome);
}

fn remaining_wait(delay: Duration, started_at: Instant, now: Instant) -> Duration {
    delay.saturating_sub(now.saturating_duration_since(started_at))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A function wrapped so that bursts of calls execute it once.
///
/// Cloning is cheap and clones share the same window. Dropping every clone
/// does not cancel an open window: its timer still fires and settles the
/// outstanding [`Pending`] handles.
pub struct Throttle<A, T, E = Infallible> {
    shared: Arc<Shared<A, T, E>>,
    runtime: Handle,
}

impl<A, T, E> Throttle<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Register a call.
    ///
    /// Replaces the arguments of any earlier call in the open window, moves
    /// the single timer, and returns a handle that settles when the window
    /// executes.
    pub fn call(&self, args: A) -> Pending<T, E> {
        let (tx, rx) = oneshot::channel();

        // Timers are aborted and spawned outside the lock: a runtime that
        // has shut down drops the timer future inline, running its guard.
        let (epoch, deadline, stale_timer) = {
            let mut state = self.shared.lock();
            let now = Instant::now();
            state.epoch = state.epoch.wrapping_add(1);
            let epoch = state.epoch;

            let (mut window, stale_timer) = match state.window.take() {
                Some(mut window) => {
                    let stale_timer = window.timer.take();
                    if self.shared.reset_on_call {
                        window.started_at = now;
                    }
                    window.latest_args = args;
                    (window, stale_timer)
                }
                None => {
                    log::debug!("Opening throttle window of {:?}", self.shared.delay);
                    (Window::open(now, args), None)
                }
            };
            window.waiters.push(tx);

            let wait = remaining_wait(self.shared.delay, window.started_at, now);
            log::trace!(
                "Throttled call #{} will run in {:?}",
                window.waiters.len(),
                wait
            );
            state.window = Some(window);
            (epoch, now + wait, stale_timer)
        };

        if let Some(timer) = stale_timer {
            timer.abort();
        }

        let mut guard = TimerGuard {
            shared: Arc::clone(&self.shared),
            epoch,
            fired: false,
        };
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            guard.fire();
        });

        let unclaimed = {
            let mut state = self.shared.lock();
            let current = state.epoch == epoch;
            match state.window.as_mut() {
                Some(window) if current => {
                    window.timer = Some(timer);
                    None
                }
                // Already fired, abandoned or superseded.
                _ => Some(timer),
            }
        };
        if let Some(timer) = unclaimed {
            timer.abort();
        }

        Pending { rx }
    }
}

impl<A, T, E> Throttle<A, T, E> {
    /// Whether a window is open and waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.shared.lock().window.is_some()
    }

    /// Number of calls waiting on the open window.
    pub fn pending_calls(&self) -> usize {
        self.shared
            .lock()
            .window
            .as_ref()
            .map_or(0, |window| window.waiters.len())
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    /// Whether each call pushes the deadline forward.
    pub fn resets_on_call(&self) -> bool {
        self.shared.reset_on_call
    }
}

impl<A, T, E> Clone for Throttle<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            runtime: self.runtime.clone(),
        }
    }
}

impl<A, T, E> fmt::Debug for Throttle<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("delay", &self.shared.delay)
            .field("reset_on_call", &self.shared.reset_on_call)
            .field("pending_calls", &self.pending_calls())
            .finish()
    }
}

/// Handle to the result of a throttled call.
///
/// Resolves once the window it belongs to has executed. Dropping it ignores
/// the result; the execution still happens.
pub struct Pending<T, E = Infallible> {
    rx: oneshot::Receiver<Outcome<T, E>>,
}

impl<T, E> Future for Pending<T, E> {
    type Output = Outcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ThrottleError::Abandoned)))
    }
}

impl<T, E> fmt::Debug for Pending<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_arguments_settle_every_caller() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let throttled = throttle(
            move |arg: &'static str| {
                log.lock().unwrap().push(arg);
                format!("ran with {arg}")
            },
            ms(100),
            false,
        )
        .unwrap();

        let start = Instant::now();
        let first = throttled.call("a");
        sleep(ms(50)).await;
        let second = throttled.call("b");

        assert_eq!(first.await, Ok("ran with b".to_string()));
        assert_eq!(start.elapsed(), ms(100));
        assert_eq!(second.await, Ok("ran with b".to_string()));
        assert_eq!(*seen.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_anchored_window_runs_within_delay_of_first_call() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let throttled = throttle(
            move |n: u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                n * 10
            },
            ms(100),
            false,
        )
        .unwrap();

        let start = Instant::now();
        let mut pending = Vec::new();
        for n in 0..4 {
            if n > 0 {
                sleep(ms(30)).await;
            }
            pending.push(throttled.call(n));
        }
        assert_eq!(throttled.pending_calls(), 4);

        for handle in pending {
            assert_eq!(handle.await, Ok(30));
        }
        assert_eq!(start.elapsed(), ms(100));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!throttled.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_on_call_waits_for_quiet_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let throttled = ThrottleBuilder::new(ms(100))
            .reset_on_call(true)
            .build(move |()| {
                counter.fetch_add(1, Ordering::SeqCst);
                Instant::now()
            })
            .unwrap();
        assert!(throttled.resets_on_call());

        let start = Instant::now();
        let first = throttled.call(());
        sleep(ms(60)).await;
        let _second = throttled.call(());
        sleep(ms(60)).await;
        let third = throttled.call(());

        let ran_at = first.await.unwrap();
        assert_eq!(ran_at - start, ms(220));
        assert_eq!(third.await, Ok(ran_at));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_calls_share_one_timer() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let throttled = throttle(
            move |()| counter.fetch_add(1, Ordering::SeqCst),
            ms(10),
            false,
        )
        .unwrap();

        let first = throttled.call(());
        let second = throttled.call(());
        assert!(throttled.is_pending());
        assert_eq!(throttled.pending_calls(), 2);

        assert_eq!(first.await, Ok(0));
        assert_eq!(second.await, Ok(0));
        sleep(ms(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_window_after_execution() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let throttled = throttle(
            move |n: u8| {
                counter.fetch_add(1, Ordering::SeqCst);
                n
            },
            ms(20),
            false,
        )
        .unwrap();

        assert_eq!(throttled.call(1).await, Ok(1));
        assert_eq!(throttled.call(2).await, Ok(2));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_rejects_every_waiter_and_recovers() {
        let throttled = ThrottleBuilder::new(ms(50))
            .try_build(|n: i32| {
                if n < 0 {
                    Err(format!("negative input {n}"))
                } else {
                    Ok(n)
                }
            })
            .unwrap();

        let first = throttled.call(5);
        let second = throttled.call(-1);
        let expected = Err(ThrottleError::Failed("negative input -1".to_string()));
        assert_eq!(first.await, expected);
        assert_eq!(second.await, expected);
        assert!(!throttled.is_pending());

        assert_eq!(throttled.call(7).await, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_is_contained() {
        let throttled = throttle(
            |n: u32| {
                if n == 0 {
                    panic!("zero is not allowed");
                }
                n
            },
            ms(10),
            true,
        )
        .unwrap();

        let first = throttled.call(3);
        let second = throttled.call(0);
        let expected = Err(ThrottleError::Panicked("zero is not allowed".to_string()));
        assert_eq!(first.await, expected);
        assert_eq!(second.await, expected);

        assert_eq!(throttled.call(4).await, Ok(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_throttle_still_settles() {
        let throttled = throttle(|s: &'static str| s.len(), ms(30), false).unwrap();
        let pending = throttled.call("four");
        drop(throttled);
        assert_eq!(pending.await, Ok(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_wait_saturates() {
        let start = Instant::now();
        assert_eq!(remaining_wait(ms(100), start, start), ms(100));
        assert_eq!(remaining_wait(ms(100), start, start + ms(40)), ms(60));
        assert_eq!(remaining_wait(ms(100), start, start + ms(150)), Duration::ZERO);
    }

    #[test]
    fn test_requires_runtime() {
        let result = throttle(|()| (), ms(10), false);
        assert!(matches!(result, Err(ColorfulError::NoRuntime)));
    }

    #[test]
    fn test_explicit_runtime_handle() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let throttled = ThrottleBuilder::new(ms(5)).build_on(runtime.handle().clone(), |n: u8| n + 1);

        let pending = throttled.call(1);
        assert_eq!(runtime.block_on(pending), Ok(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reset_deadline_never_moves_backwards_under_contention() {
        let throttled = ThrottleBuilder::new(ms(50))
            .reset_on_call(true)
            .build(|()| Instant::now())
            .unwrap();

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let throttled = throttled.clone();
                std::thread::spawn(move || {
                    let called_at = Instant::now();
                    (called_at, throttled.call(()))
                })
            })
            .collect();
        let calls: Vec<_> = threads
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .collect();
        let latest_call = calls.iter().map(|(called_at, _)| *called_at).max().unwrap();

        for (_, pending) in calls {
            let ran_at = pending.await.unwrap();
            assert!(ran_at >= latest_call + ms(50));
        }
    }

    #[test]
    fn test_runtime_shutdown_abandons_waiters() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let throttled = ThrottleBuilder::new(ms(50)).build_on(runtime.handle().clone(), |n: u8| n);

        let first = throttled.call(1);
        let second = throttled.call(2);
        drop(runtime);

        let other = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        other.block_on(async {
            let timeout = ms(1000);
            assert_eq!(
                tokio::time::timeout(timeout, first).await,
                Ok(Err(ThrottleError::Abandoned))
            );
            assert_eq!(
                tokio::time::timeout(timeout, second).await,
                Ok(Err(ThrottleError::Abandoned))
            );
            assert!(!throttled.is_pending());

            // The timer of a later call cannot be spawned at all.
            let late = throttled.call(3);
            assert_eq!(
                tokio::time::timeout(timeout, late).await,
                Ok(Err(ThrottleError::Abandoned))
            );
            assert_eq!(throttled.pending_calls(), 0);
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_execution() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let throttled = throttle(
            move |n: usize| {
                counter.fetch_add(1, Ordering::SeqCst);
                n
            },
            ms(300),
            false,
        )
        .unwrap();

        let threads: Vec<_> = (0..8)
            .map(|n| {
                let throttled = throttled.clone();
                std::thread::spawn(move || throttled.call(n))
            })
            .collect();
        let pending: Vec<_> = threads
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .collect();

        let mut results = Vec::new();
        for handle in pending {
            results.push(handle.await.unwrap());
        }
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
