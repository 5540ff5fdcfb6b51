//! Worker pool (ambient, §5): a shared rayon pool for generation and
//! meshing jobs, with crossbeam-channel result delivery and a cooperative
//! stop flag for fast shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::WorldConfig;
use crate::lod::JobToken;

/// Returns a fresh unbounded channel pair, one per job kind per the
/// concurrency design (generation results and mesh results never share a
/// channel).
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    unbounded()
}

/// Wraps a single rayon global pool, matching the teacher's
/// "one shared pool for all CPU-bound work" idiom.
pub struct WorkerPool {
    pool: ThreadPool,
    stop_flag: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(config: &WorldConfig) -> Self {
        let num_threads = config.worker_threads.unwrap_or_else(num_cpus::get);
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("hearth-world-worker-{i}"))
            .build()
            .expect("worker thread pool failed to start");
        WorkerPool {
            pool,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Sets the shared stop flag so every in-flight and future job aborts
    /// at its next cooperative checkpoint.
    pub fn request_stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_stopping(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Submits `work` to the pool, tagging its result with `token` and
    /// posting it to `sender` on completion. `work` receives the stop flag
    /// so it can poll between pipeline phases and abort early.
    pub fn submit<F, T>(&self, token: JobToken, sender: Sender<(JobToken, T)>, work: F)
    where
        F: FnOnce(&AtomicBool) -> T + Send + 'static,
        T: Send + 'static,
    {
        let stop_flag = self.stop_flag.clone();
        self.pool.spawn(move || {
            let output = work(&stop_flag);
            let _ = sender.send((token, output));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn submitted_job_result_arrives_with_its_token() {
        let config = WorldConfig::default();
        let pool = WorkerPool::new(&config);
        let (tx, rx) = channel();
        pool.submit(JobToken(7), tx, |_stop| 41 + 1);
        let (token, value) = rx.recv_timeout(Duration::from_secs(5)).expect("job completes");
        assert_eq!(token, JobToken(7));
        assert_eq!(value, 42);
    }

    #[test]
    fn stop_flag_is_visible_to_in_flight_work() {
        let config = WorldConfig::default();
        let pool = WorkerPool::new(&config);
        let (tx, rx) = channel();
        pool.request_stop();
        pool.submit(JobToken(1), tx, |stop| stop.load(Ordering::Relaxed));
        let (_, observed_stop) = rx.recv_timeout(Duration::from_secs(5)).expect("job completes");
        assert!(observed_stop);
    }
}
