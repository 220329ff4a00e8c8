use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of worker threads shared by every region decode.
///
/// The pool is an ordinary value: construct it once, wrap it in an `Arc`
/// and hand it to `World::open`. Work items are queued FIFO and executed
/// by whichever worker becomes free. Dropping the pool closes the queue
/// and joins all workers after in-flight work finishes.
pub struct ThreadPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Creates a pool sized to the available hardware concurrency.
    pub fn new() -> Self {
        let threads = thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1);

        ThreadPool::with_threads(threads)
    }

    /// Creates a pool with an explicit amount of worker threads.
    pub fn with_threads(threads: usize) -> Self {
        let (sender, receiver): (Sender<Job>, Receiver<Job>) = unbounded();
        let mut workers = Vec::with_capacity(threads.max(1));

        for _ in 0..threads.max(1) {
            let receiver = receiver.clone();

            workers.push(thread::spawn(move || {
                // Runs until the queue sender side is dropped.
                while let Ok(job) = receiver.recv() {
                    job();
                }
            }));
        }

        ThreadPool {
            sender: Some(sender),
            workers,
        }
    }

    /// Queues a unit of work and returns a handle to its result.
    pub fn submit<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (done_sender, done_receiver) = bounded(1);

        let job = Box::new(move || {
            // The handle may have been dropped without waiting.
            let _ = done_sender.send(task());
        });

        if let Some(sender) = &self.sender {
            // Workers only quit after this sender is dropped, so the
            // queue is always open here.
            let _ = sender.send(job);
        }

        TaskHandle {
            receiver: done_receiver,
        }
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        ThreadPool::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.sender.take();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Future-like handle returned by `ThreadPool::submit`.
pub struct TaskHandle<T> {
    receiver: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the submitted task has run and yields its result.
    ///
    /// Panics if the task itself panicked on a worker thread.
    pub fn wait(self) -> T {
        match self.receiver.recv() {
            Ok(value) => value,
            Err(_) => panic!("task dropped its result before completion"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::ThreadPool;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_submit_returns_result() {
        let pool = ThreadPool::with_threads(2);
        let handle = pool.submit(|| 2 + 2);

        assert_eq!(handle.wait(), 4);
    }

    #[test]
    fn test_fan_out_join() {
        let pool = ThreadPool::with_threads(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for index in 0..256 {
            let counter = counter.clone();

            handles.push(pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                index
            }));
        }

        for (index, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.wait(), index);
        }

        assert_eq!(counter.load(Ordering::SeqCst), 256);
    }

    #[test]
    fn test_single_worker_runs_fifo() {
        let pool = ThreadPool::with_threads(1);
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut handles = Vec::new();

        for index in 0..16 {
            let order = order.clone();

            handles.push(pool.submit(move || {
                order.lock().unwrap().push(index);
            }));
        }

        for handle in handles {
            handle.wait();
        }

        assert_eq!(*order.lock().unwrap(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_shared_submission() {
        let pool = Arc::new(ThreadPool::with_threads(2));
        let mut threads = Vec::new();

        for _ in 0..4 {
            let pool = pool.clone();

            threads.push(std::thread::spawn(move || {
                let handles: Vec<_> = (0..32).map(|n| pool.submit(move || n * 2)).collect();
                handles.into_iter().map(|h| h.wait()).sum::<i32>()
            }));
        }

        for thread in threads {
            assert_eq!(thread.join().unwrap(), (0..32).map(|n| n * 2).sum());
        }
    }

    #[test]
    fn test_drop_joins_workers() {
        let counter = Arc::new(AtomicUsize::new(0));

        {
            let pool = ThreadPool::with_threads(2);

            for _ in 0..64 {
                let counter = counter.clone();
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        }

        assert_eq!(counter.load(Ordering::SeqCst), 64);
    }
}
