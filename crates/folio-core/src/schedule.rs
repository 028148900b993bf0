//! Debounce-with-reset scheduling of batched writes

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as WriteGate;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::util::lock;

/// Delay before a reorder burst is written
pub const DEFAULT_REORDER_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Receiver of a debounced payload.
pub trait FlushTarget<P>: Send + Sync + 'static {
    /// Write `payload`. Called at most once per quiet period.
    fn flush(&self, payload: P) -> impl Future<Output = Result<()>> + Send;
}

struct State<P> {
    pending: Option<P>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
    rearm: bool,
}

struct Inner<P, F> {
    target: F,
    delay: Duration,
    state: Mutex<State<P>>,
    gate: Arc<WriteGate<()>>,
}

/// One cancellable timer plus one pending-payload slot.
///
/// Every `schedule` replaces the payload and restarts the delay, so only the
/// latest payload of a burst is written. Writes never overlap: a timer that
/// fires while a write is in flight is re-armed once that write finishes.
/// Requires a Tokio runtime.
pub struct DebouncedSyncScheduler<P, F> {
    inner: Arc<Inner<P, F>>,
}

impl<P, F> Clone for DebouncedSyncScheduler<P, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, F> DebouncedSyncScheduler<P, F>
where
    P: Send + 'static,
    F: FlushTarget<P>,
{
    pub fn new(target: F, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                target,
                delay,
                state: Mutex::new(State {
                    pending: None,
                    timer: None,
                    generation: 0,
                    rearm: false,
                }),
                gate: Arc::new(WriteGate::new(())),
            }),
        }
    }

    pub fn target(&self) -> &F {
        &self.inner.target
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Replace the pending payload and restart the quiet period.
    pub fn schedule(&self, payload: P) {
        let mut state = lock(&self.inner.state);
        state.pending = Some(payload);
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        Inner::arm(&self.inner, &mut state);
    }

    /// Write the pending payload now, waiting for any in-flight write first.
    ///
    /// Returns whether a payload was written.
    pub async fn flush_now(&self) -> Result<bool> {
        {
            let mut state = lock(&self.inner.state);
            state.generation += 1;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }

        let guard = Arc::clone(&self.inner.gate).lock_owned().await;
        let Some(payload) = lock(&self.inner.state).pending.take() else {
            return Ok(false);
        };
        let result = self.inner.target.flush(payload).await;
        drop(guard);
        Inner::finish(&self.inner);
        result.map(|()| true)
    }

    /// Drop the timer and pending payload. An in-flight write still completes.
    pub fn cancel(&self) {
        let mut state = lock(&self.inner.state);
        state.generation += 1;
        state.pending = None;
        state.rearm = false;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.inner.state).pending.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.gate.try_lock().is_err()
    }
}

impl<P, F> Inner<P, F>
where
    P: Send + 'static,
    F: FlushTarget<P>,
{
    fn arm(this: &Arc<Self>, state: &mut State<P>) {
        let inner = Arc::clone(this);
        let generation = state.generation;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            Self::fire(&inner, generation).await;
        }));
    }

    async fn fire(this: &Arc<Self>, generation: u64) {
        let (payload, guard) = {
            let mut state = lock(&this.state);
            if state.generation != generation {
                return;
            }
            // Detach before dispatch so a later schedule cannot abort the write.
            state.timer = None;
            let Ok(guard) = Arc::clone(&this.gate).try_lock_owned() else {
                tracing::debug!("Write in flight, deferring debounced flush");
                state.rearm = true;
                return;
            };
            let Some(payload) = state.pending.take() else {
                return;
            };
            (payload, guard)
        };

        if let Err(error) = this.target.flush(payload).await {
            tracing::error!("Debounced flush failed: {error}");
        }
        drop(guard);
        Self::finish(this);
    }

    fn finish(this: &Arc<Self>) {
        let mut state = lock(&this.state);
        if state.rearm {
            state.rearm = false;
            if state.pending.is_some() && state.timer.is_none() {
                Self::arm(this, &mut state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::{sleep, Instant};

    #[derive(Clone, Default)]
    struct Recorder {
        writes: Arc<Mutex<Vec<(u32, Instant)>>>,
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
        latency: Duration,
        fail: Arc<AtomicBool>,
    }

    impl Recorder {
        fn with_latency(latency: Duration) -> Self {
            Self {
                latency,
                ..Self::default()
            }
        }

        fn payloads(&self) -> Vec<u32> {
            lock(&self.writes).iter().map(|(payload, _)| *payload).collect()
        }
    }

    impl FlushTarget<u32> for Recorder {
        async fn flush(&self, payload: u32) -> Result<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            lock(&self.writes).push((payload, Instant::now()));
            if !self.latency.is_zero() {
                sleep(self.latency).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Storage("offline".to_string()));
            }
            Ok(())
        }
    }

    fn scheduler(recorder: &Recorder) -> DebouncedSyncScheduler<u32, Recorder> {
        DebouncedSyncScheduler::new(recorder.clone(), DEFAULT_REORDER_DEBOUNCE)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_ten_writes_once_with_last_payload() {
        let recorder = Recorder::default();
        let scheduler = scheduler(&recorder);

        for payload in 1..=10 {
            scheduler.schedule(payload);
            sleep(Duration::from_millis(100)).await;
        }
        assert!(recorder.payloads().is_empty());
        assert!(scheduler.is_pending());

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(recorder.payloads(), vec![10]);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn each_schedule_restarts_the_delay() {
        let recorder = Recorder::default();
        let scheduler = scheduler(&recorder);
        let started = Instant::now();

        scheduler.schedule(1);
        sleep(Duration::from_millis(1500)).await;
        scheduler.schedule(2);
        sleep(Duration::from_millis(1500)).await;
        assert!(recorder.payloads().is_empty());

        sleep(Duration::from_millis(1000)).await;
        let writes = lock(&recorder.writes).clone();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, 2);
        assert!(writes[0].1 - started >= Duration::from_millis(3500));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_now_writes_immediately() {
        let recorder = Recorder::default();
        let scheduler = scheduler(&recorder);

        scheduler.schedule(7);
        assert!(scheduler.flush_now().await.unwrap());
        assert_eq!(recorder.payloads(), vec![7]);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(recorder.payloads(), vec![7]);
        assert!(!scheduler.flush_now().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_payload() {
        let recorder = Recorder::default();
        let scheduler = scheduler(&recorder);

        scheduler.schedule(1);
        scheduler.cancel();
        assert!(!scheduler.is_pending());

        sleep(Duration::from_secs(5)).await;
        assert!(recorder.payloads().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_during_in_flight_write_is_rearmed() {
        let recorder = Recorder::with_latency(Duration::from_millis(3000));
        let scheduler = scheduler(&recorder);

        scheduler.schedule(1);
        sleep(Duration::from_millis(2100)).await;
        assert!(scheduler.is_in_flight());

        // Fires at 4.1s while the first write runs until 5s.
        scheduler.schedule(2);
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(recorder.payloads(), vec![1]);

        sleep(Duration::from_millis(5000)).await;
        assert_eq!(recorder.payloads(), vec![1, 2]);
        assert_eq!(recorder.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_does_not_cancel_dispatched_write() {
        let recorder = Recorder::with_latency(Duration::from_millis(1000));
        let scheduler = scheduler(&recorder);

        scheduler.schedule(1);
        sleep(Duration::from_millis(2500)).await;
        scheduler.schedule(2);
        scheduler.cancel();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(recorder.payloads(), vec![1]);
        assert_eq!(recorder.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_flush_clears_pending() {
        let recorder = Recorder::default();
        recorder.fail.store(true, Ordering::SeqCst);
        let scheduler = scheduler(&recorder);

        scheduler.schedule(3);
        assert!(scheduler.flush_now().await.is_err());
        assert!(!scheduler.is_pending());
    }
}
