//! Rotating status messages shown while a generation is pending.
//!
//! A [`StatusBoard`] is the observable side (a `tokio::sync::watch` channel).
//! A [`StatusTicker`] is the writer owned by one in-flight generation: it
//! rotates the message on a fixed period and is torn down when dropped.
//! Every write is tagged with the ticker's id and ignored once another ticker
//! has claimed the board or this one has been dropped, so a finished (or
//! superseded) generation can never publish a stale message.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Phase messages, in the order the pipeline reaches them.
pub const DEFAULT_MESSAGES: [&str; 5] = [
    "AI कलाकार को दिव्य प्रेरणा दी जा रही है...",
    "कैनवास पर ब्रह्मांड के रंग घोले जा रहे हैं...",
    "आपकी कल्पना को एक आध्यात्मिक रूप दिया जा रहा है...",
    "AI को सुलेखन सिखाया जा रहा है...",
    "कलाकृति को अंतिम रूप दिया जा रहा है...",
];

/// Pipeline stage, used to pin the status message when a stage begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planning,
    Synthesizing,
    Analyzing,
    Compositing,
    Finishing,
}

impl Stage {
    fn message_index(self) -> usize {
        match self {
            Stage::Planning => 0,
            Stage::Synthesizing => 1,
            Stage::Analyzing => 2,
            Stage::Compositing => 3,
            Stage::Finishing => 4,
        }
    }
}

/// Snapshot of the status indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub busy: bool,
    pub message: String,
    #[serde(skip)]
    owner: Option<u64>,
}

/// Observable status indicator.
#[derive(Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<Status>>,
}

static NEXT_TICKER_ID: AtomicU64 = AtomicU64::new(1);

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Status::default());
        Self { tx: Arc::new(tx) }
    }

    /// Current status.
    pub fn current(&self) -> Status {
        self.tx.borrow().clone()
    }

    /// Receive every status change.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.tx.subscribe()
    }

    fn claim(&self, id: u64, message: String) {
        self.tx.send_replace(Status {
            busy: true,
            message,
            owner: Some(id),
        });
    }

    /// Publish `message` only while `id` still owns the board.
    fn publish(&self, id: u64, message: &str) -> bool {
        self.tx.send_if_modified(|status| {
            if status.owner != Some(id) || status.message == message {
                return false;
            }
            status.message = message.to_string();
            true
        });
        self.tx.borrow().owner == Some(id)
    }

    fn release(&self, id: u64) {
        self.tx.send_if_modified(|status| {
            if status.owner != Some(id) {
                return false;
            }
            *status = Status::default();
            true
        });
    }
}

/// Periodic message rotation owned by a single generation.
pub struct StatusTicker {
    id: u64,
    board: StatusBoard,
    messages: Arc<[String]>,
    index: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl StatusTicker {
    /// Claim `board`, show the first message and rotate every `period`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(board: StatusBoard, messages: Arc<[String]>, period: Duration) -> Self {
        let id = NEXT_TICKER_ID.fetch_add(1, Ordering::Relaxed);
        let index = Arc::new(AtomicUsize::new(0));
        board.claim(id, messages.first().cloned().unwrap_or_default());

        let task = {
            let board = board.clone();
            let messages = messages.clone();
            let index = index.clone();
            tokio::spawn(async move {
                if messages.is_empty() {
                    return;
                }
                let period = period.max(Duration::from_millis(1));
                let mut interval =
                    tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                loop {
                    interval.tick().await;
                    let next = (index.load(Ordering::SeqCst) + 1) % messages.len();
                    index.store(next, Ordering::SeqCst);
                    if !board.publish(id, &messages[next]) {
                        break;
                    }
                }
            })
        };

        Self {
            id,
            board,
            messages,
            index,
            task,
        }
    }

    /// Jump to the message for `stage`; rotation continues from there.
    pub fn pin(&self, stage: Stage) {
        if self.messages.is_empty() {
            return;
        }
        let i = stage.message_index() % self.messages.len();
        self.index.store(i, Ordering::SeqCst);
        self.board.publish(self.id, &self.messages[i]);
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.task.abort();
        self.board.release(self.id);
    }
}

/// Default message list as a shared slice.
pub fn default_messages() -> Arc<[String]> {
    DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect()
}
