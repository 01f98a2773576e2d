use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Payload-free commit notification consumed by the persistence
/// collaborator. The core calls this after every discrete edit; what to
/// snapshot and when is the listener's business.
pub trait CommitListener: Send + Sync {
    fn state_changed(&self);
}

/// Coalesces a burst of commits into one deferred callback: every commit
/// bumps a generation counter and schedules a check after the quiet
/// period; only the task holding the latest generation actually fires.
/// Fire-and-forget, never blocks the canvas.
pub struct DebouncedAutosave {
    generation: Arc<Mutex<u64>>,
    debounce: Duration,
    callback: Arc<dyn Fn() + Send + Sync>,
    handle: tokio::runtime::Handle,
}

impl DebouncedAutosave {
    /// Must be created inside a tokio runtime; the deferred callbacks are
    /// spawned onto it.
    pub fn new(debounce: Duration, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            generation: Arc::new(Mutex::new(0)),
            debounce,
            callback: Arc::new(callback),
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl CommitListener for DebouncedAutosave {
    fn state_changed(&self) {
        let scheduled = {
            let mut generation = self.generation.lock();
            *generation += 1;
            *generation
        };
        let generation = Arc::clone(&self.generation);
        let callback = Arc::clone(&self.callback);
        let debounce = self.debounce;
        self.handle.spawn(async move {
            tokio::time::sleep(debounce).await;
            if *generation.lock() == scheduled {
                debug!("autosave window closed, invoking persistence callback");
                callback();
            }
        });
    }
}
