//! Trailing-edge debounce on top of the tokio timer.
//!
//! Every call to [`debounce`] owns one pending slot. Invoking the returned
//! [`Debounced`] aborts whatever timer task is parked in that slot and
//! schedules the action again, so the action only runs once the caller has
//! been quiet for the whole delay, with the arguments of the last invocation.

use anyhow::{Context, Result};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

/// Wrap `action` so it only runs after `delay` without further calls.
///
/// Must be called from inside a tokio runtime; the timer tasks are spawned on
/// the runtime that was current at construction.
pub fn debounce<A, F>(delay: Duration, action: F) -> Result<Debounced<A>>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    let runtime = Handle::try_current().context("debounce needs a running tokio runtime")?;
    Ok(Debounced {
        inner: Arc::new(Inner {
            delay,
            action: Box::new(action),
            slot: Mutex::new(Slot::default()),
            runtime,
        }),
    })
}

/// Callable returned by [`debounce`]. Clones share the same pending slot.
pub struct Debounced<A> {
    inner: Arc<Inner<A>>,
}

struct Inner<A> {
    delay: Duration,
    action: Box<dyn Fn(A) + Send + Sync>,
    slot: Mutex<Slot>,
    runtime: Handle,
}

/// The timer task currently parked, tagged with the call that scheduled it.
#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("delay", &self.inner.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Restart the quiet period; `args` replaces any previously queued ones.
    pub fn call(&self, args: A) {
        // Held across the spawn so the new task cannot inspect the slot
        // before it has been recorded there.
        let mut slot = self.inner.lock_slot();
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;

        let inner = Arc::clone(&self.inner);
        let handle = self.inner.runtime.spawn(async move {
            tokio::time::sleep(inner.delay).await;
            {
                let mut slot = inner.lock_slot();
                if slot.generation != generation || slot.pending.is_none() {
                    return;
                }
                slot.pending = None;
            }
            (inner.action)(args);
        });

        if let Some(previous) = slot.pending.replace(handle) {
            previous.abort();
            trace!("Superseded pending debounced call");
        }
    }
}

impl<A> Debounced<A> {
    /// Drop the pending call, if any, without running it.
    pub fn cancel(&self) {
        if let Some(previous) = self.inner.lock_slot().pending.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock_slot().pending.is_some()
    }
}

impl<A> Inner<A> {
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{Instant, sleep};

    fn recorder() -> (Arc<StdMutex<Vec<(Duration, u32)>>>, Instant) {
        (Arc::new(StdMutex::new(Vec::new())), Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_with_last_arguments() {
        let (fired, start) = recorder();
        let sink = Arc::clone(&fired);
        let debounced = debounce(Duration::from_millis(300), move |value: u32| {
            sink.lock().unwrap().push((start.elapsed(), value));
        })
        .expect("runtime is running");

        debounced.call(1);
        sleep(Duration::from_millis(50)).await;
        debounced.call(2);
        sleep(Duration::from_millis(50)).await;
        debounced.call(3);

        sleep(Duration::from_millis(299)).await;
        assert!(fired.lock().unwrap().is_empty());
        assert!(debounced.is_pending());

        sleep(Duration::from_secs(1)).await;
        let fired = fired.lock().unwrap().clone();
        assert_eq!(fired, vec![(Duration::from_millis(400), 3)]);
        assert!(!debounced.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn constant_calls_postpone_the_action() {
        let (fired, _) = recorder();
        let sink = Arc::clone(&fired);
        let debounced = debounce(Duration::from_millis(100), move |value: u32| {
            sink.lock().unwrap().push((Duration::ZERO, value));
        })
        .expect("runtime is running");

        for i in 0..20 {
            debounced.call(i);
            sleep(Duration::from_millis(99)).await;
        }
        assert!(fired.lock().unwrap().is_empty());

        sleep(Duration::from_millis(1)).await;
        sleep(Duration::from_millis(1)).await;
        assert_eq!(fired.lock().unwrap().len(), 1);
        assert_eq!(fired.lock().unwrap()[0].1, 19);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_quiet_periods_each_fire() {
        let (fired, _) = recorder();
        let sink = Arc::clone(&fired);
        let debounced = debounce(Duration::from_millis(10), move |value: u32| {
            sink.lock().unwrap().push((Duration::ZERO, value));
        })
        .expect("runtime is running");

        debounced.call(1);
        sleep(Duration::from_millis(50)).await;
        debounced.clone().call(2);
        sleep(Duration::from_millis(50)).await;

        let values: Vec<u32> = fired.lock().unwrap().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_call() {
        let (fired, _) = recorder();
        let sink = Arc::clone(&fired);
        let debounced = debounce(Duration::from_millis(10), move |value: u32| {
            sink.lock().unwrap().push((Duration::ZERO, value));
        })
        .expect("runtime is running");

        debounced.call(7);
        debounced.cancel();
        assert!(!debounced.is_pending());
        sleep(Duration::from_millis(50)).await;
        assert!(fired.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn independent_debouncers_do_not_share_slots() {
        let (fired, _) = recorder();
        let sink_a = Arc::clone(&fired);
        let sink_b = Arc::clone(&fired);
        let a = debounce(Duration::from_millis(20), move |v: u32| {
            sink_a.lock().unwrap().push((Duration::ZERO, v));
        })
        .expect("runtime is running");
        let b = debounce(Duration::from_millis(20), move |v: u32| {
            sink_b.lock().unwrap().push((Duration::ZERO, v));
        })
        .expect("runtime is running");

        a.call(1);
        b.call(2);
        sleep(Duration::from_millis(50)).await;

        let mut values: Vec<u32> = fired.lock().unwrap().iter().map(|(_, v)| *v).collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2]);
    }

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_calls_release_their_timer_tasks() {
        let fired = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&fired);
        let debounced = debounce(Duration::from_secs(10), move |_: DropCounter| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .expect("runtime is running");

        for _ in 0..5 {
            debounced.call(DropCounter(Arc::clone(&dropped)));
        }
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        // The four superseded tasks are gone long before their timers expire.
        assert_eq!(dropped.load(Ordering::SeqCst), 4);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(debounced.is_pending());

        sleep(Duration::from_secs(11)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(dropped.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn construction_outside_runtime_fails() {
        let err = debounce(Duration::from_millis(10), |_: ()| {}).expect_err("no runtime");
        assert!(err.to_string().contains("tokio runtime"));
    }
}
