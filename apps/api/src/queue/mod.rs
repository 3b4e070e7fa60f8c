//! Request Queue — serializes and throttles calls to a rate-limited remote resource.
//!
//! ARCHITECTURAL RULE: every outbound LLM call in Ascent goes through one of
//! these. Callers submit an operation and await their own ticket; the queue
//! guarantees pacing and FIFO dispatch order, nothing else. Retries, fallback
//! values, and user messaging belong to callers.
//!
//! One queue instance per rate-limited resource. Instances are constructed
//! explicitly and carried in `AppState` — nothing here is process-global.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Boxed future produced by a queued operation.
type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Boxed operation. Invoked only when its request reaches the head of the queue.
type Operation<T> = Box<dyn FnOnce() -> BoxFuture<T> + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("request queue is full (capacity {capacity})")]
    Full { capacity: usize },

    #[error("operation exceeded its {}ms deadline", .deadline.as_millis())]
    TimedOut { deadline: Duration },

    #[error("request queue is closed")]
    Closed,
}

/// Tuning knobs for a queue instance.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Minimum gap between consecutive dispatches. The pacing clock restarts
    /// when the previous operation settles, so two dispatches are at least
    /// `min_delay + previous operation latency` apart.
    pub min_delay: Duration,
    /// Max requests waiting for dispatch. `submit` rejects with
    /// [`QueueError::Full`] beyond this instead of growing without bound.
    pub capacity: usize,
    /// Deadline applied to each dispatched operation, so one hung remote call
    /// cannot stall the queue forever. `None` disables it.
    pub operation_timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(10),
            capacity: 32,
            operation_timeout: Some(Duration::from_secs(120)),
        }
    }
}

struct QueuedRequest<T> {
    operation: Operation<T>,
    reply: oneshot::Sender<Result<T, QueueError>>,
}

/// FIFO queue with a single drain task and a minimum inter-dispatch delay.
///
/// At most one operation is in flight per instance, and each caller receives
/// exactly one settlement on its own [`Ticket`]. One operation's failure never
/// affects any other request and never stops the drain task.
pub struct RequestQueue<T> {
    tx: mpsc::Sender<QueuedRequest<T>>,
    capacity: usize,
}

// Manual impl: a derive would demand `T: Clone`, which the queue never needs.
impl<T> Clone for RequestQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T: Send + 'static> RequestQueue<T> {
    /// Creates the queue and spawns its drain task. The task exits once every
    /// handle to the queue has been dropped and the backlog is empty.
    pub fn new(config: QueueConfig) -> Self {
        let capacity = config.capacity;
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(drain(rx, config));
        Self { tx, capacity }
    }

    /// Enqueues an operation and returns a ticket that settles with its result.
    ///
    /// Returns immediately — the caller is never blocked behind other
    /// requests. The operation closure is invoked only at dispatch, in strict
    /// submission order. Rejects with [`QueueError::Full`] when the backlog is
    /// at capacity.
    pub fn submit<F, Fut>(&self, operation: F) -> Result<Ticket<T>, QueueError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let request = QueuedRequest {
            operation: Box::new(move || Box::pin(operation()) as BoxFuture<T>),
            reply,
        };

        match self.tx.try_send(request) {
            Ok(()) => Ok(Ticket { rx }),
            Err(mpsc::error::TrySendError::Full(_)) => Err(QueueError::Full {
                capacity: self.capacity,
            }),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }
}

/// The single consumer. Being the only receiver is what makes "at most one
/// in flight" and FIFO order structural rather than guarded by flags.
async fn drain<T: Send + 'static>(mut rx: mpsc::Receiver<QueuedRequest<T>>, config: QueueConfig) {
    let mut last_dispatch: Option<Instant> = None;

    while let Some(request) = rx.recv().await {
        if let Some(last) = last_dispatch {
            let elapsed = last.elapsed();
            if elapsed < config.min_delay {
                tokio::time::sleep(config.min_delay - elapsed).await;
            }
        }

        debug!("dispatching queued request");
        let operation = (request.operation)();

        let outcome = match config.operation_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, operation).await {
                Ok(value) => Ok(value),
                Err(_) => {
                    warn!(
                        "queued operation exceeded its {}ms deadline, dropping it",
                        deadline.as_millis()
                    );
                    Err(QueueError::TimedOut { deadline })
                }
            },
            None => Ok(operation.await),
        };

        // The pacing clock restarts when the operation settles, not at
        // dispatch. This matches the observed behavior of the system this
        // queue fronts; do not "fix" it to dispatch-start without confirming
        // the provider tolerates the tighter spacing.
        last_dispatch = Some(Instant::now());

        // The caller may have dropped its ticket; the operation already ran,
        // so there is nothing to undo.
        let _ = request.reply.send(outcome);
    }

    debug!("request queue drained and closed");
}

/// A caller's handle to one submitted request. Awaiting it yields the
/// operation's result, or a [`QueueError`] if the deadline fired or the queue
/// went away. Settles exactly once.
pub struct Ticket<T> {
    rx: oneshot::Receiver<Result<T, QueueError>>,
}

impl<T> Future for Ticket<T> {
    type Output = Result<T, QueueError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(QueueError::Closed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn fast_config() -> QueueConfig {
        QueueConfig {
            min_delay: Duration::from_millis(1),
            capacity: 32,
            operation_timeout: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_order_is_fifo_despite_mixed_latencies() {
        let queue: RequestQueue<&'static str> = RequestQueue::new(fast_config());
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        // The slowest operation goes first; if anything reordered, "b" or "c"
        // would be dispatched before "a" finished.
        let o = order.clone();
        let a = queue
            .submit(move || async move {
                o.lock().unwrap().push("a");
                tokio::time::sleep(Duration::from_millis(50)).await;
                "a"
            })
            .unwrap();
        let o = order.clone();
        let b = queue
            .submit(move || async move {
                o.lock().unwrap().push("b");
                tokio::time::sleep(Duration::from_millis(5)).await;
                "b"
            })
            .unwrap();
        let o = order.clone();
        let c = queue
            .submit(move || async move {
                o.lock().unwrap().push("c");
                "c"
            })
            .unwrap();

        assert_eq!(a.await.unwrap(), "a");
        assert_eq!(b.await.unwrap(), "b");
        assert_eq!(c.await.unwrap(), "c");
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_dispatches_are_min_delay_apart() {
        let min_delay = Duration::from_millis(100);
        let queue: RequestQueue<()> = RequestQueue::new(QueueConfig {
            min_delay,
            capacity: 32,
            operation_timeout: None,
        });
        let dispatches: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

        let mut tickets = Vec::new();
        for _ in 0..3 {
            let d = dispatches.clone();
            tickets.push(
                queue
                    .submit(move || async move {
                        d.lock().unwrap().push(Instant::now());
                    })
                    .unwrap(),
            );
        }
        for ticket in tickets {
            ticket.await.unwrap();
        }

        let dispatches = dispatches.lock().unwrap();
        assert_eq!(dispatches.len(), 3);
        for pair in dispatches.windows(2) {
            assert!(
                pair[1] - pair[0] >= min_delay,
                "dispatch gap {:?} is under the {:?} minimum",
                pair[1] - pair[0],
                min_delay
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_does_not_poison_neighbors() {
        let queue: RequestQueue<Result<u32, String>> = RequestQueue::new(fast_config());

        let before = queue.submit(|| async { Ok(1) }).unwrap();
        let failing = queue
            .submit(|| async { Err("quota exceeded".to_string()) })
            .unwrap();
        let after = queue.submit(|| async { Ok(42) }).unwrap();

        assert_eq!(before.await.unwrap(), Ok(1));
        assert_eq!(failing.await.unwrap(), Err("quota exceeded".to_string()));
        assert_eq!(after.await.unwrap(), Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_one_operation_in_flight() {
        let queue: RequestQueue<()> = RequestQueue::new(fast_config());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut tickets = Vec::new();
        for _ in 0..5 {
            let in_flight = in_flight.clone();
            let max_seen = max_seen.clone();
            tickets.push(
                queue
                    .submit(move || async move {
                        let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(current, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .unwrap(),
            );
        }
        for ticket in tickets {
            ticket.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_ticket_settles_with_its_own_result() {
        let queue: RequestQueue<usize> = RequestQueue::new(fast_config());

        let tickets: Vec<_> = (0..16)
            .map(|i| queue.submit(move || async move { i }).unwrap())
            .collect();

        for (i, ticket) in tickets.into_iter().enumerate() {
            assert_eq!(ticket.await.unwrap(), i);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_redrain_after_empty_honors_delay_from_last_dispatch() {
        let min_delay = Duration::from_millis(100);
        let queue: RequestQueue<()> = RequestQueue::new(QueueConfig {
            min_delay,
            capacity: 32,
            operation_timeout: None,
        });
        let dispatches: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

        let d = dispatches.clone();
        queue
            .submit(move || async move {
                d.lock().unwrap().push(Instant::now());
            })
            .unwrap()
            .await
            .unwrap();

        // The queue is now idle. A submission shortly after must still wait
        // out the remainder of the window, not start from a fresh clock.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let d = dispatches.clone();
        queue
            .submit(move || async move {
                d.lock().unwrap().push(Instant::now());
            })
            .unwrap()
            .await
            .unwrap();

        let dispatches = dispatches.lock().unwrap();
        assert_eq!(dispatches.len(), 2);
        assert!(dispatches[1] - dispatches[0] >= min_delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_rejects_when_backlog_is_full() {
        let queue: RequestQueue<u32> = RequestQueue::new(QueueConfig {
            min_delay: Duration::ZERO,
            capacity: 1,
            operation_timeout: None,
        });

        let (started_tx, started_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        // Occupies the drain task until released.
        let first = queue
            .submit(move || async move {
                started_tx.send(()).unwrap();
                release_rx.await.unwrap();
                1
            })
            .unwrap();
        started_rx.await.unwrap();

        // One slot in the backlog, then a hard rejection. `Ticket` has no
        // `Debug`, so pull the error out rather than `unwrap_err`.
        let second = queue.submit(|| async { 2 }).unwrap();
        let err = queue.submit(|| async { 3 }).err().unwrap();
        assert_eq!(err, QueueError::Full { capacity: 1 });

        release_tx.send(()).unwrap();
        assert_eq!(first.await.unwrap(), 1);
        assert_eq!(second.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_operation_times_out_and_queue_continues() {
        let deadline = Duration::from_secs(1);
        let queue: RequestQueue<u32> = RequestQueue::new(QueueConfig {
            min_delay: Duration::from_millis(1),
            capacity: 32,
            operation_timeout: Some(deadline),
        });

        let hung = queue
            .submit(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                0
            })
            .unwrap();
        let healthy = queue.submit(|| async { 7 }).unwrap();

        assert_eq!(hung.await.unwrap_err(), QueueError::TimedOut { deadline });
        assert_eq!(healthy.await.unwrap(), 7);
    }
}
