use super::{Direction, Fill, Scheduler};
use std::{
    sync::{Arc, Condvar, Mutex},
    thread::{self, JoinHandle},
};
use tracing::{debug, error, trace};

/// Requests waiting for (or being served by) the worker thread.
#[derive(Default)]
struct Pending {
    up: bool,
    down: bool,
    running: bool,
    shutdown: bool,
}

impl Pending {
    const fn idle(&self) -> bool {
        !self.up && !self.down && !self.running
    }
}

struct Shared {
    state: Mutex<Pending>,
    // Signalled when a request arrives or shutdown is requested.
    work: Condvar,
    // Signalled when the worker has nothing left to do.
    idle: Condvar,
}

/// [Scheduler] that serves refills on a dedicated thread.
///
/// Requests coalesce per [Direction]: any number of "up" requests made while an
/// "up" request is still pending result in a single fill. Dropping the worker
/// stops the thread (pending requests are discarded) and joins it.
pub struct Worker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a thread that refills `target` on request.
    pub fn spawn<W: Fill + 'static>(target: Arc<W>) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(Pending::default()),
            work: Condvar::new(),
            idle: Condvar::new(),
        });
        let handle = thread::Builder::new()
            .name("window-fill".into())
            .spawn({
                let shared = shared.clone();
                move || run(&shared, target.as_ref())
            })
            .expect("unable to spawn fill worker");
        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Block until no request is pending or running.
    pub fn wait_idle(&self) {
        let mut pending = self.shared.state.lock().unwrap();
        while !pending.idle() {
            pending = self.shared.idle.wait(pending).unwrap();
        }
    }
}

impl Scheduler for Worker {
    fn request_fill(&self, direction: Direction) {
        let mut pending = self.shared.state.lock().unwrap();
        match direction {
            Direction::Up => pending.up = true,
            Direction::Down => pending.down = true,
        }
        self.shared.work.notify_one();
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        {
            let mut pending = self.shared.state.lock().unwrap();
            pending.shutdown = true;
            self.shared.work.notify_one();
        }
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() && !thread::panicking() {
            panic!("fill worker panicked");
        }
    }
}

fn run<W: Fill>(shared: &Shared, target: &W) {
    debug!("fill worker started");
    let mut pending = shared.state.lock().unwrap();
    loop {
        // Tolerate spurious wake-ups and only proceed once there is work
        while !(pending.up || pending.down || pending.shutdown) {
            pending = shared.work.wait(pending).unwrap();
        }
        if pending.shutdown {
            break;
        }

        // Take all outstanding requests and serve them without holding the lock
        let up = std::mem::take(&mut pending.up);
        let down = std::mem::take(&mut pending.down);
        pending.running = true;
        drop(pending);
        for (requested, direction) in [(up, Direction::Up), (down, Direction::Down)] {
            if !requested {
                continue;
            }
            trace!(?direction, "serving fill request");
            if let Err(err) = target.fill(direction) {
                error!(?err, ?direction, "fill failed");
            }
        }

        // Report idleness to any waiters
        pending = shared.state.lock().unwrap();
        pending.running = false;
        if pending.idle() {
            shared.idle.notify_all();
        }
    }

    // Release anyone waiting for requests that will never be served
    pending.up = false;
    pending.down = false;
    shared.idle.notify_all();
    debug!("fill worker stopped");
}
