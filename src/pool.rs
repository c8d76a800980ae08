//! A bounded thread pool: a FIFO producer-consumer executor for request
//! handlers, built on one mutex and one condition variable.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// A unit of work submitted to the pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Default cap on pending jobs.
pub const DEFAULT_MAX_LOAD: usize = 500;

struct Shared {
    jobs: Mutex<State>,
    condvar: Condvar,
}

struct State {
    queue: VecDeque<Job>,
    stop: bool,
}

/// A bounded FIFO thread pool.
///
/// `add` rejects (returns `false`) once the queue already holds more than
/// `max_load` jobs — deliberately `jobs.len() > max_load`, not `>=`, so
/// with `max_load = N` exactly `N + 1` jobs fit before the first
/// rejection.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    max_load: usize,
}

impl ThreadPool {
    /// Builds a pool with `max_threads` workers (hardware parallelism if
    /// `None`) and the given `max_load`.
    pub fn new(max_threads: Option<usize>, max_load: usize) -> ThreadPool {
        let max_threads = max_threads.unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });
        let shared = Arc::new(Shared {
            jobs: Mutex::new(State { queue: VecDeque::new(), stop: false }),
            condvar: Condvar::new(),
        });
        let workers = (0..max_threads)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(shared))
            })
            .collect();
        ThreadPool { shared, workers, max_load }
    }

    /// A pool with hardware-parallelism threads and the default
    /// `max_load` of 500.
    pub fn default_sized() -> ThreadPool {
        ThreadPool::new(None, DEFAULT_MAX_LOAD)
    }

    /// Enqueues `job`, waking one worker. Returns `false` if the queue
    /// was already over `max_load`. Calling `add` after the pool has
    /// started shutting down is a programming error, not a recoverable
    /// condition, so this panics.
    pub fn add(&self, job: Job) -> bool {
        let mut state = self.shared.jobs.lock().unwrap();
        assert!(!state.stop, "attempted to add a job to a stopped pool");
        if state.queue.len() > self.max_load {
            return false;
        }
        state.queue.push_back(job);
        drop(state);
        self.shared.condvar.notify_one();
        true
    }

    pub fn max_load(&self) -> usize {
        self.max_load
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let mut state = shared.jobs.lock().unwrap();
        while !state.stop && state.queue.is_empty() {
            state = shared.condvar.wait(state).unwrap();
        }
        if state.stop {
            return;
        }
        let job = state.queue.pop_front().expect("queue non-empty under lock");
        drop(state);
        job();
    }
}

impl Drop for ThreadPool {
    /// Signals every worker to stop, wakes them all, and joins them. A
    /// worker already running a job (dequeued before `stop` was set)
    /// finishes that job; anything still sitting in the queue once a
    /// worker observes `stop` is dropped without running.
    fn drop(&mut self) {
        {
            let mut state = self.shared.jobs.lock().unwrap();
            state.stop = true;
        }
        self.shared.condvar.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// A pool where a `Handler` is invoked with each job instead of the job
/// invoking itself. The handler is a property of the pool (set once, at
/// construction), not of any individual job — this just wraps
/// [`ThreadPool`] so the handler closure captures each job before handing
/// a plain `Job` to the base pool's queue.
pub struct HandledThreadPool<J: Send + 'static> {
    inner: ThreadPool,
    handler: Arc<dyn Fn(J) + Send + Sync>,
}

impl<J: Send + 'static> HandledThreadPool<J> {
    pub fn new<H>(max_threads: Option<usize>, max_load: usize, handler: H) -> HandledThreadPool<J>
    where
        H: Fn(J) + Send + Sync + 'static,
    {
        HandledThreadPool { inner: ThreadPool::new(max_threads, max_load), handler: Arc::new(handler) }
    }

    pub fn add(&self, job: J) -> bool {
        let handler = Arc::clone(&self.handler);
        self.inner.add(Box::new(move || handler(job)))
    }

    pub fn max_load(&self) -> usize {
        self.inner.max_load()
    }
}
